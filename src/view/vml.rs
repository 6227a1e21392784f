use super::decorators::{Decorator, Definitions, VmlGradientDecorator, VmlOverlayDecorator};
use super::{LinearGradient, Paint, Primitive, ShapeStyle, View, round_half_up, sort_children};
use crate::format::format_number as num;
use crate::render::escape_xml;

/// Serializes primitives as an HTML fragment of legacy vector markup.
///
/// Shapes are absolutely positioned inside a relatively positioned `div`;
/// the host document is expected to register the `kvml` namespace.
pub struct VmlView {
    width: f64,
    height: f64,
    definitions: Definitions,
    decorators: Vec<Box<dyn Decorator>>,
}

impl VmlView {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            definitions: Definitions::default(),
            decorators: vec![Box::new(VmlOverlayDecorator), Box::new(VmlGradientDecorator)],
        }
    }
}

impl View for VmlView {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn decorate(&mut self, primitive: Primitive) -> Primitive {
        let mut primitive = primitive;
        for decorator in &self.decorators {
            primitive = decorator.decorate(primitive, &mut self.definitions);
        }
        primitive
    }

    fn create_gradient(&mut self, gradient: &LinearGradient) -> String {
        gradient_fill(gradient)
    }

    fn render(&mut self, children: &[Primitive]) -> String {
        let mut out = format!(
            "<div style=\"width:{}px; height:{}px; position: relative;\">",
            num(self.width),
            num(self.height)
        );
        render_children(&mut out, children);
        out.push_str("</div>");
        out
    }
}

/// Inline directional fill used in place of a shared gradient definition.
pub fn gradient_fill(gradient: &LinearGradient) -> String {
    let colors: Vec<String> = gradient
        .stops
        .iter()
        .map(|stop| {
            format!(
                "{}% {}",
                num(round_half_up(stop.offset * 100.0)),
                escape_xml(&stop.color)
            )
        })
        .collect();
    format!(
        "<kvml:fill type=\"gradient\" angle=\"{}\" colors=\"{}\" opacity=\"{}\" />",
        num(gradient.rotation),
        colors.join(","),
        num(gradient.opacity)
    )
}

fn render_children(out: &mut String, children: &[Primitive]) {
    for child in sort_children(children) {
        render_primitive(out, child);
    }
}

fn render_primitive(out: &mut String, primitive: &Primitive) {
    match primitive {
        Primitive::Group { style, children } => {
            out.push_str(&format!(
                "<div{} style=\"position: absolute; white-space: nowrap;\">",
                attr("id", style.id.as_deref())
            ));
            render_children(out, children);
            out.push_str("</div>");
        }
        Primitive::Path { points, style } => {
            out.push_str(&format!(
                "<kvml:shape{} style=\"position:absolute; width:1px; height:1px;\" coordorigin=\"0 0\" coordsize=\"1 1\"><kvml:path v=\"{} e\" />{}{}</kvml:shape>",
                attr("id", style.id.as_deref()),
                path_data(points),
                fill(style),
                stroke(style)
            ));
        }
        Primitive::Circle {
            center,
            radius,
            style,
        } => {
            let fill_color = match &style.fill {
                Paint::Color(color) => escape_xml(color),
                _ => String::new(),
            };
            let stroke_weight = if style.stroke_width > 0.0 {
                num(style.stroke_width)
            } else {
                String::new()
            };
            out.push_str(&format!(
                "<kvml:oval{} style=\"position:absolute; width:{}px; height:{}px; top:{}px; left:{}px;\" strokecolor=\"{}\" stroked=\"{}\" strokeweight=\"{}\" fillcolor=\"{}\" filled=\"{}\"></kvml:oval>",
                attr("id", style.id.as_deref()),
                num(radius * 2.0),
                num(radius * 2.0),
                num(center.1 - radius),
                num(center.0 - radius),
                escape_xml(style.stroke.as_deref().unwrap_or_default()),
                style.stroke.as_deref().is_some_and(|stroke| !stroke.is_empty()),
                stroke_weight,
                fill_color,
                !fill_color.is_empty()
            ));
        }
        Primitive::Text { content, style } => {
            out.push_str(&format!(
                "<kvml:textbox{} style=\"position: absolute; left: {}px; top: {}px; font: {}; color: {}\">{}</kvml:textbox>",
                attr("id", style.id.as_deref()),
                num(style.x),
                num(style.y),
                escape_xml(&style.font),
                escape_xml(&style.color),
                escape_xml(content)
            ));
        }
    }
}

fn attr(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) if !value.is_empty() => format!(" {name}=\"{}\"", escape_xml(value)),
        _ => String::new(),
    }
}

fn fill(style: &ShapeStyle) -> String {
    match &style.fill {
        Paint::Inline(markup) => markup.clone(),
        Paint::Color(color) => format!(
            "<kvml:fill on=\"true\" color=\"{}\" opacity=\"{}\" />",
            escape_xml(color),
            num(style.fill_opacity)
        ),
        Paint::None | Paint::Gradient(_) | Paint::Reference(_) => {
            "<kvml:fill on=\"false\" />".to_string()
        }
    }
}

fn stroke(style: &ShapeStyle) -> String {
    match style.stroke.as_deref() {
        Some(color) if !color.is_empty() => {
            let weight = if style.stroke_width > 0.0 {
                format!(" weight=\"{}\"", num(style.stroke_width))
            } else {
                String::new()
            };
            format!(
                "<kvml:stroke on=\"true\" color=\"{}\"{} opacity=\"{}\" />",
                escape_xml(color),
                weight,
                num(style.stroke_opacity)
            )
        }
        _ => "<kvml:stroke on=\"false\" />".to_string(),
    }
}

fn path_data(points: &[(f64, f64)]) -> String {
    let Some((first, rest)) = points.split_first() else {
        return String::new();
    };
    let mut out = format!(
        "m {},{}",
        num(round_half_up(first.0)),
        num(round_half_up(first.1))
    );
    if !rest.is_empty() {
        let tail: Vec<String> = rest
            .iter()
            .map(|(x, y)| format!("{},{}", num(round_half_up(*x)), num(round_half_up(*y))))
            .collect();
        out.push_str(" l ");
        out.push_str(&tail.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GLASS;
    use crate::geometry::Rect;
    use crate::view::TextStyle;

    #[test]
    fn rect_becomes_a_closed_shape() {
        let mut view = VmlView::new(200.0, 100.0);
        let rect = view.create_rect(
            Rect::new(0.0, 0.0, 10.4, 20.0),
            ShapeStyle::filled(Paint::color("#fff")).with_border("#000", 1.0),
        );
        let html = view.render(&[rect]);
        assert!(html.starts_with("<div style=\"width:200px; height:100px; position: relative;\">"));
        assert!(html.contains("v=\"m 0,0 l 10,0, 10,20, 0,20, 0,0 e\""), "{html}");
        assert!(html.contains("<kvml:fill on=\"true\" color=\"#fff\" opacity=\"1\" />"));
        assert!(html.contains("<kvml:stroke on=\"true\" color=\"#000\" weight=\"1\" opacity=\"1\" />"));
    }

    #[test]
    fn glass_overlay_is_inlined() {
        let mut view = VmlView::new(100.0, 100.0);
        let style = ShapeStyle {
            fill: Paint::color("#000000"),
            overlay: Some(GLASS.to_string()),
            normal_angle: 90.0,
            ..ShapeStyle::default()
        };
        let bar = view.create_rect(Rect::new(0.0, 0.0, 10.0, 10.0), style);
        let html = view.render(&[bar]);
        assert!(html.contains(
            "<kvml:fill type=\"gradient\" angle=\"180\" colors=\"0% #000000,10% #000000,25% #666666,92% #000000,100% #000000\" opacity=\"1\" />"
        ), "{html}");
    }

    #[test]
    fn text_uses_absolute_position() {
        let mut view = VmlView::new(100.0, 100.0);
        let text = view.create_text(
            "<b>",
            TextStyle {
                id: Some("k1".to_string()),
                x: 3.5,
                y: 4.0,
                baseline: 10.0,
                font: "12px Arial".to_string(),
                color: "red".to_string(),
                z_index: 0,
            },
        );
        let html = view.render(&[text]);
        assert!(html.contains(
            "<kvml:textbox id=\"k1\" style=\"position: absolute; left: 3.5px; top: 4px; font: 12px Arial; color: red\">&lt;b&gt;</kvml:textbox>"
        ));
    }
}
