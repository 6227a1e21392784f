use super::decorators::{Decorator, Definitions, SvgOverlayDecorator, SvgPaintDecorator};
use super::{
    LinearGradient, Paint, Primitive, ShapeStyle, TextStyle, View, align_to_pixel, round_half_up,
    sort_children,
};
use crate::format::format_number as num;
use crate::render::escape_xml;

/// Serializes primitives as a standalone SVG document.
pub struct SvgView {
    width: f64,
    height: f64,
    definitions: Definitions,
    decorators: Vec<Box<dyn Decorator>>,
}

impl SvgView {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            definitions: Definitions::default(),
            decorators: vec![Box::new(SvgOverlayDecorator), Box::new(SvgPaintDecorator)],
        }
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    fn render_definitions(&mut self) -> String {
        if self.definitions.is_empty() {
            return String::new();
        }
        let gradients: Vec<LinearGradient> = self.definitions.iter().cloned().collect();
        let mut out = String::from("<defs>");
        for gradient in &gradients {
            out.push_str(&self.create_gradient(gradient));
        }
        out.push_str("</defs>");
        out
    }
}

impl View for SvgView {
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
        let mut out = format!(
            "<linearGradient id=\"{}\" gradientTransform=\"rotate({})\">",
            escape_xml(&gradient.id),
            num(gradient.rotation)
        );
        for stop in &gradient.stops {
            out.push_str(&format!(
                "<stop offset=\"{}%\" style=\"stop-color:{};stop-opacity:{}\"/>",
                num(round_half_up(stop.offset * 100.0)),
                escape_xml(&stop.color),
                num(stop.opacity)
            ));
        }
        out.push_str("</linearGradient>");
        out
    }

    fn render(&mut self, children: &[Primitive]) -> String {
        let definitions = self.render_definitions();
        let mut out = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{}px\" height=\"{}px\" style=\"position: relative;\">",
            num(self.width),
            num(self.height)
        );
        out.push_str(&definitions);
        render_children(&mut out, children);
        out.push_str("</svg>");
        out
    }
}

fn render_children(out: &mut String, children: &[Primitive]) {
    for child in sort_children(children) {
        render_primitive(out, child);
    }
}

fn render_primitive(out: &mut String, primitive: &Primitive) {
    match primitive {
        Primitive::Group { style, children } => {
            out.push_str(&format!("<g{}>", attr("id", style.id.as_deref())));
            render_children(out, children);
            out.push_str("</g>");
        }
        Primitive::Path { points, style } => {
            out.push_str(&format!(
                "<path{} d=\"{}\"{}{} stroke-linecap=\"square\" fill-opacity=\"{}\" stroke-opacity=\"{}\" fill=\"{}\"></path>",
                attr("id", style.id.as_deref()),
                path_data(points, style.stroke_width),
                attr("stroke", style.stroke.as_deref()),
                stroke_width(style),
                num(style.fill_opacity),
                num(style.stroke_opacity),
                paint(&style.fill)
            ));
        }
        Primitive::Circle {
            center,
            radius,
            style,
        } => {
            out.push_str(&format!(
                "<circle{} cx=\"{}\" cy=\"{}\" r=\"{}\"{}{} fill=\"{}\"></circle>",
                attr("id", style.id.as_deref()),
                num(center.0),
                num(center.1),
                num(*radius),
                attr("stroke", style.stroke.as_deref()),
                stroke_width(style),
                paint(&style.fill)
            ));
        }
        Primitive::Text { content, style } => out.push_str(&text(content, style)),
    }
}

fn text(content: &str, style: &TextStyle) -> String {
    format!(
        "<text{} x=\"{}\" y=\"{}\" style=\"font: {}\" fill=\"{}\">{}</text>",
        attr("id", style.id.as_deref()),
        num(round_half_up(style.x)),
        num(round_half_up(style.y + style.baseline)),
        escape_xml(&style.font),
        escape_xml(&style.color),
        escape_xml(content)
    )
}

/// Empty values produce no attribute at all.
fn attr(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) if !value.is_empty() => format!(" {name}=\"{}\"", escape_xml(value)),
        _ => String::new(),
    }
}

fn stroke_width(style: &ShapeStyle) -> String {
    if style.stroke_width > 0.0 {
        format!(" stroke-width=\"{}\"", num(style.stroke_width))
    } else {
        String::new()
    }
}

fn paint(fill: &Paint) -> String {
    match fill {
        Paint::Color(color) => escape_xml(color),
        Paint::Reference(id) => format!("url(#{})", escape_xml(id)),
        Paint::None | Paint::Gradient(_) | Paint::Inline(_) => "none".to_string(),
    }
}

/// Odd stroke widths are snapped to pixel centers, everything else to whole pixels.
fn path_data(points: &[(f64, f64)], stroke_width: f64) -> String {
    let align: fn(f64) -> f64 = if stroke_width > 0.0 && stroke_width % 2.0 != 0.0 {
        align_to_pixel
    } else {
        round_half_up
    };
    let mut out = String::new();
    for (idx, (x, y)) in points.iter().enumerate() {
        out.push_str(if idx == 0 { "M" } else { " L" });
        out.push_str(&format!("{} {}", num(align(*x)), num(align(*y))));
    }
    out
}
