use super::{BuildContext, ChartElement, IdScope};
use crate::geometry::{Axis, COORD_PRECISION, Rect, Spacing, round};
use crate::layout_dump::NodeDump;
use crate::text_metrics::TextSize;
use crate::theme::BLACK;
use crate::view::{Paint, Primitive, ShapeStyle, TextStyle, View};

/// Placement of a box inside the space it is offered, along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Left or top edge.
    Start,
    /// Right or bottom edge.
    End,
    Center,
}

impl Align {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "left" | "top" => Some(Self::Start),
            "right" | "bottom" => Some(Self::End),
            "center" => Some(Self::Center),
            _ => None,
        }
    }
}

/// A single run of text, measured once when it is created.
#[derive(Debug, Clone)]
pub struct Text {
    content: String,
    font: String,
    color: String,
    id: Option<String>,
    align: Option<Align>,
    valign: Option<Align>,
    size: TextSize,
    rect: Rect,
}

impl Text {
    /// Left aligned with no vertical alignment, placed at the origin.
    pub fn new(ctx: &mut BuildContext<'_>, content: impl Into<String>, font: &str, color: &str) -> Self {
        let content = content.into();
        let size = ctx.measure(&content, font);
        let mut text = Self {
            content,
            font: font.to_string(),
            color: color.to_string(),
            id: None,
            align: Some(Align::Start),
            valign: None,
            size,
            rect: Rect::default(),
        };
        text.reflow(Rect::default());
        text
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    pub fn set_alignment(&mut self, align: Option<Align>, valign: Option<Align>) {
        self.align = align;
        self.valign = valign;
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn size(&self) -> TextSize {
        self.size
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.rect.translate(dx, dy);
    }

    pub fn rect_mut(&mut self) -> &mut Rect {
        &mut self.rect
    }
}

impl ChartElement for Text {
    /// An unknown alignment leaves that axis of the previous box untouched.
    fn reflow(&mut self, target: Rect) {
        let TextSize { width, height, .. } = self.size;

        match self.align {
            Some(Align::Start) => {
                self.rect = Rect::new(target.x1, target.y1, target.x1 + width, target.y1 + height);
            }
            Some(Align::End) => {
                self.rect = Rect::new(target.x2 - width, target.y1, target.x2, target.y1 + height);
            }
            Some(Align::Center) => {
                let margin = (target.width() - width) / 2.0;
                self.rect = Rect::new(
                    round(target.x1 + margin, COORD_PRECISION),
                    target.y1,
                    round(target.x2 - margin, COORD_PRECISION),
                    target.y1 + height,
                );
            }
            None => {}
        }

        match self.valign {
            Some(Align::Center) => {
                let margin = (target.height() - height) / 2.0;
                self.rect.y1 = target.y1 + margin;
                self.rect.y2 = target.y2 - margin;
            }
            Some(Align::End) => {
                self.rect.y1 = target.y2 - height;
                self.rect.y2 = target.y2;
            }
            Some(Align::Start) => {
                self.rect.y1 = target.y1;
                self.rect.y2 = target.y1 + height;
            }
            None => {}
        }
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn view_elements(&self, view: &mut dyn View, _ids: &mut IdScope) -> Vec<Primitive> {
        vec![view.create_text(
            &self.content,
            TextStyle {
                id: self.id.clone(),
                x: self.rect.x1,
                y: self.rect.y1,
                baseline: self.size.baseline,
                font: self.font.clone(),
                color: self.color.clone(),
                z_index: 0,
            },
        )]
    }

    fn dump(&self) -> NodeDump {
        NodeDump::new("text", self.rect)
            .with_id(self.id.clone())
            .with_label(&self.content)
    }
}

/// Presentation options of a box: the content sits inside padding, border
/// and margin, in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStyle {
    pub id: Option<String>,
    pub align: Option<Align>,
    pub valign: Option<Align>,
    pub margin: Spacing,
    pub padding: Spacing,
    pub border_width: f64,
    pub border_color: String,
    pub background: String,
    /// Content size used when the box has no children.
    pub width: f64,
    pub height: f64,
    pub visible: bool,
    pub opacity: f64,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            id: None,
            align: Some(Align::Start),
            valign: Some(Align::Start),
            margin: Spacing::default(),
            padding: Spacing::default(),
            border_width: 0.0,
            border_color: BLACK.to_string(),
            background: String::new(),
            width: 0.0,
            height: 0.0,
            visible: true,
            opacity: 1.0,
        }
    }
}

/// Box geometry shared by text boxes and marker shapes.
#[derive(Debug, Clone)]
pub struct BoxModel {
    pub style: BoxStyle,
    rect: Rect,
    padding_box: Rect,
}

impl BoxModel {
    pub fn new(style: BoxStyle) -> Self {
        Self {
            style,
            rect: Rect::default(),
            padding_box: Rect::default(),
        }
    }

    /// Grows `content` (or the fixed content size) by padding, border and
    /// margin, aligns the result in `target` and returns the offset that
    /// moves the content into the padding box.
    pub fn layout(&mut self, target: Rect, content: Option<Rect>) -> (f64, f64) {
        let style = &self.style;
        let content = content.unwrap_or(Rect::new(0.0, 0.0, style.width, style.height));
        let border = Spacing::uniform(style.border_width);

        let mut rect = content;
        rect.pad(style.padding).pad(border).pad(style.margin);
        align_axis(&mut rect, &target, Axis::X, style.align);
        align_axis(&mut rect, &target, Axis::Y, style.valign);

        let mut padding_box = rect;
        padding_box.unpad(style.margin).unpad(border);

        self.rect = rect;
        self.padding_box = padding_box;

        (
            rect.x1 - content.x1 + style.margin.left + style.border_width + style.padding.left,
            rect.y1 - content.y1 + style.margin.top + style.border_width + style.padding.top,
        )
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn padding_box(&self) -> Rect {
        self.padding_box
    }

    pub fn shape_style(&self) -> ShapeStyle {
        let style = &self.style;
        ShapeStyle {
            stroke_opacity: style.opacity,
            fill: Paint::color(&style.background),
            fill_opacity: style.opacity,
            ..ShapeStyle::default()
        }
        .with_border(&style.border_color, style.border_width)
    }

    /// Whether the box itself leaves a mark on the drawing.
    fn is_painted(&self) -> bool {
        !self.style.background.is_empty() || self.style.border_width > 0.0
    }
}

fn align_axis(rect: &mut Rect, target: &Rect, axis: Axis, align: Option<Align>) {
    let size = rect.size(axis);
    let start = match align {
        Some(Align::Start) => target.start(axis),
        Some(Align::End) => target.end(axis) - size,
        Some(Align::Center) => target.start(axis) + (target.size(axis) - size) / 2.0,
        None => return,
    };
    rect.set_start(axis, start).set_end(axis, start + size);
}

/// Text wrapped in a box model.
#[derive(Debug, Clone)]
pub struct TextBox {
    model: BoxModel,
    text: Text,
}

impl TextBox {
    /// The box id is carried by the text so that the label itself is the
    /// hit-test target.
    pub fn new(
        ctx: &mut BuildContext<'_>,
        content: impl Into<String>,
        style: BoxStyle,
        font: &str,
        color: &str,
    ) -> Self {
        let mut text = Text::new(ctx, content, font, color).with_id(style.id.clone());
        text.set_alignment(Some(Align::Start), Some(Align::Start));
        let mut text_box = Self {
            model: BoxModel::new(style),
            text,
        };
        text_box.reflow(Rect::default());
        text_box
    }

    pub fn set_alignment(&mut self, align: Option<Align>, valign: Option<Align>) {
        self.model.style.align = align;
        self.model.style.valign = valign;
    }

    pub fn style(&self) -> &BoxStyle {
        &self.model.style
    }

    pub fn text(&self) -> &Text {
        &self.text
    }

    pub fn id(&self) -> Option<&str> {
        self.model.style.id.as_deref()
    }

    pub fn rect_mut(&mut self) -> &mut Rect {
        &mut self.model.rect
    }
}

impl ChartElement for TextBox {
    fn reflow(&mut self, target: Rect) {
        self.text.reflow(target);
        let (dx, dy) = self.model.layout(target, Some(self.text.rect()));
        self.text.translate(dx, dy);
    }

    fn rect(&self) -> Rect {
        self.model.rect()
    }

    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        if !self.model.style.visible {
            return Vec::new();
        }
        let mut elements = Vec::with_capacity(2);
        if self.model.is_painted() {
            elements.push(view.create_rect(self.model.padding_box(), self.model.shape_style()));
        }
        elements.extend(self.text.view_elements(view, ids));
        elements
    }

    fn dump(&self) -> NodeDump {
        NodeDump::new("text-box", self.rect()).with_children(vec![self.text.dump()])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerShape {
    #[default]
    Square,
    Circle,
    Triangle,
}

impl MarkerShape {
    /// Unknown shapes draw as squares.
    pub fn from_token(token: &str) -> Self {
        match token {
            "circle" => Self::Circle,
            "triangle" => Self::Triangle,
            _ => Self::Square,
        }
    }
}

/// A fixed-size box drawn as a marker shape.
#[derive(Debug, Clone)]
pub struct ShapeElement {
    model: BoxModel,
    shape: MarkerShape,
}

impl ShapeElement {
    pub fn new(style: BoxStyle, shape: MarkerShape) -> Self {
        Self {
            model: BoxModel::new(style),
            shape,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.model.style.id.as_deref()
    }

    pub fn style(&self) -> &BoxStyle {
        &self.model.style
    }
}

impl ChartElement for ShapeElement {
    fn reflow(&mut self, target: Rect) {
        self.model.layout(target, None);
    }

    fn rect(&self) -> Rect {
        self.model.rect()
    }

    fn view_elements(&self, view: &mut dyn View, _ids: &mut IdScope) -> Vec<Primitive> {
        if !self.model.style.visible {
            return Vec::new();
        }
        let style = self.model.shape_style().with_id(self.model.style.id.clone());
        let rect = self.model.rect();
        let half_width = rect.width() / 2.0;

        let element = match self.shape {
            MarkerShape::Square => view.create_rect(self.model.padding_box(), style),
            MarkerShape::Triangle => view.create_path(
                vec![
                    (rect.x1 + half_width, rect.y1),
                    (rect.x1, rect.y2),
                    (rect.x2, rect.y2),
                ],
                style,
            ),
            MarkerShape::Circle => view.create_circle(
                (
                    round(rect.x1 + half_width, COORD_PRECISION),
                    round(rect.y1 + rect.height() / 2.0, COORD_PRECISION),
                ),
                half_width,
                style,
            ),
        };
        vec![element]
    }

    fn dump(&self) -> NodeDump {
        NodeDump::new("marker", self.rect()).with_id(self.model.style.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::{TextMeasurer, TextMetrics, FontSpec};
    use approx::assert_abs_diff_eq;

    struct FixedMetrics;

    impl TextMetrics for FixedMetrics {
        fn measure(&mut self, text: &str, _font: &FontSpec) -> TextSize {
            TextSize {
                width: 10.0 * text.chars().count() as f64,
                height: 20.0,
                baseline: 15.0,
            }
        }
    }

    fn measurer() -> TextMeasurer {
        TextMeasurer::new(Box::new(FixedMetrics))
    }

    #[test]
    fn text_alignment_snaps_to_target_edges() {
        let mut measurer = measurer();
        let mut ctx = BuildContext::new(&mut measurer);
        let mut text = Text::new(&mut ctx, "abc", "12px Arial", "#000");
        let target = Rect::new(0.0, 0.0, 100.0, 50.0);

        text.set_alignment(Some(Align::End), Some(Align::End));
        text.reflow(target);
        assert_eq!(text.rect(), Rect::new(70.0, 30.0, 100.0, 50.0));

        text.set_alignment(Some(Align::Center), Some(Align::Center));
        text.reflow(target);
        assert_eq!(text.rect(), Rect::new(35.0, 15.0, 65.0, 35.0));
    }

    #[test]
    fn text_box_insets_content_by_margin_border_and_padding() {
        let mut measurer = measurer();
        let mut ctx = BuildContext::new(&mut measurer);
        let style = BoxStyle {
            margin: Spacing::uniform(5.0),
            padding: Spacing::uniform(2.0),
            border_width: 1.0,
            align: Some(Align::End),
            ..BoxStyle::default()
        };
        let mut text_box = TextBox::new(&mut ctx, "ab", style, "12px Arial", "#000");
        text_box.reflow(Rect::new(0.0, 0.0, 200.0, 100.0));

        let rect = text_box.rect();
        assert_abs_diff_eq!(rect.width(), 20.0 + 16.0);
        assert_abs_diff_eq!(rect.height(), 20.0 + 16.0);
        assert_abs_diff_eq!(rect.x2, 200.0);
        assert_abs_diff_eq!(rect.y1, 0.0);

        let text = text_box.text().rect();
        assert_abs_diff_eq!(text.x1, rect.x1 + 8.0);
        assert_abs_diff_eq!(text.y1, rect.y1 + 8.0);
    }

    #[test]
    fn unknown_alignment_leaves_box_in_place() {
        let mut model = BoxModel::new(BoxStyle {
            align: None,
            valign: Align::from_token("middle"),
            width: 4.0,
            height: 4.0,
            ..BoxStyle::default()
        });
        model.layout(Rect::new(10.0, 10.0, 50.0, 50.0), None);
        assert_eq!(model.rect(), Rect::new(0.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn hidden_marker_emits_nothing() {
        let marker = ShapeElement::new(
            BoxStyle {
                visible: false,
                ..BoxStyle::default()
            },
            MarkerShape::Circle,
        );
        let mut view = crate::view::SvgView::new(10.0, 10.0);
        assert!(marker.view_elements(&mut view, &mut IdScope::default()).is_empty());
    }

    #[test]
    fn circle_marker_is_centered_in_its_box() {
        let mut marker = ShapeElement::new(
            BoxStyle {
                align: Some(Align::Center),
                valign: Some(Align::Center),
                width: 6.0,
                height: 6.0,
                background: "#f00".to_string(),
                ..BoxStyle::default()
            },
            MarkerShape::from_token("circle"),
        );
        marker.reflow(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut view = crate::view::SvgView::new(10.0, 10.0);
        let elements = marker.view_elements(&mut view, &mut IdScope::default());
        assert_eq!(elements.len(), 1);
        match &elements[0] {
            Primitive::Circle { center, radius, .. } => {
                assert_eq!(*center, (5.0, 5.0));
                assert_eq!(*radius, 3.0);
            }
            other => panic!("unexpected primitive {other:?}"),
        }
    }
}
