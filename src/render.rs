use crate::layout::RootElement;
use crate::view::{SvgView, View, VmlView};
use anyhow::{Context, Result};
use std::path::Path;

/// Markup dialect a chart is serialized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Svg,
    Vml,
}

impl Backend {
    /// Picks the backend a host supports; hosts without SVG get VML.
    pub fn detect(supports_svg: bool) -> Self {
        if supports_svg { Backend::Svg } else { Backend::Vml }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "svg" => Some(Backend::Svg),
            "vml" => Some(Backend::Vml),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Backend::Svg => "svg",
            Backend::Vml => "html",
        }
    }

    fn view(self, width: f64, height: f64) -> Box<dyn View> {
        match self {
            Backend::Svg => Box::new(SvgView::new(width, height)),
            Backend::Vml => Box::new(VmlView::new(width, height)),
        }
    }
}

/// Emits and serializes a reflowed scene graph. The ids registered during
/// emission stay on `root`.
pub fn render_scene(root: &mut RootElement, backend: Backend) -> String {
    let chart_box = root.chart_box();
    let mut view = backend.view(chart_box.width(), chart_box.height());
    let elements = root.render(view.as_mut());
    let markup = view.render(&elements);
    tracing::debug!(?backend, bytes = markup.len(), "serialized chart");
    markup
}

pub fn write_output(markup: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, markup)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            print!("{markup}");
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, width: f64, height: f64) -> crate::error::Result<()> {
    use crate::error::ChartError;

    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(width as f32, height as f32) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|err| ChartError::Png(err.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| ChartError::Png("failed to allocate pixmap".to_string()))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap
        .save_png(output)
        .map_err(|err| ChartError::Png(err.to_string()))?;
    tracing::debug!(path = %output.display(), "wrote png");
    Ok(())
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::layout::BuildContext;
    use crate::text_metrics::TextMeasurer;

    fn scene(json: &str, backend: Backend) -> (String, RootElement) {
        let config = parse_config(json).expect("config");
        let mut measurer = TextMeasurer::default();
        let mut ctx = BuildContext::new(&mut measurer);
        let mut root = RootElement::new(&mut ctx, &config);
        root.layout();
        let markup = render_scene(&mut root, backend);
        (markup, root)
    }

    #[test]
    fn backend_tokens_and_detection() {
        assert_eq!(Backend::from_token("SVG"), Some(Backend::Svg));
        assert_eq!(Backend::from_token("vml"), Some(Backend::Vml));
        assert_eq!(Backend::from_token("canvas"), None);
        assert_eq!(Backend::detect(false), Backend::Vml);
        assert_eq!(Backend::detect(true), Backend::Svg);
    }

    #[test]
    fn render_svg_basic() {
        let (markup, root) = scene(
            r#"{ "title": { "text": "Q1 <draft>" },
                 "series": [{ "name": "Sales", "type": "column", "data": [3, 5] }] }"#,
            Backend::Svg,
        );
        assert!(markup.starts_with("<svg"));
        assert!(markup.contains("Q1 &lt;draft&gt;"));
        assert!(markup.contains("Sales"));
        assert_eq!(root.ids().len(), 2);
    }

    #[test]
    fn render_vml_basic() {
        let (markup, _) = scene(
            r#"{ "series": [{ "name": "Sales", "type": "line", "data": [3, 5] }] }"#,
            Backend::Vml,
        );
        assert!(markup.starts_with("<div"));
        assert!(markup.ends_with("</div>"));
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_xml(r#"a<b & "c"'"#), "a&lt;b &amp; &quot;c&quot;&apos;");
    }
}
