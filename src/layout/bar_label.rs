use super::{Align, BoxStyle, BuildContext, ChartElement, IdScope, TextBox};
use crate::config::LabelOptions;
use crate::format::{format_number, format_value};
use crate::geometry::Rect;
use crate::layout_dump::NodeDump;
use crate::view::{Primitive, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarLabelPosition {
    /// Inside the bar, against its far end.
    InsideEnd,
    Center,
    /// Inside the bar, against the axis.
    InsideBase,
    /// Beyond the far end of the bar.
    #[default]
    OutsideEnd,
}

impl BarLabelPosition {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "insideEnd" => Some(Self::InsideEnd),
            "center" => Some(Self::Center),
            "insideBase" => Some(Self::InsideBase),
            "outsideEnd" => Some(Self::OutsideEnd),
            _ => None,
        }
    }
}

/// Value label attached to a bar.
#[derive(Debug, Clone)]
pub struct BarLabel {
    text_box: TextBox,
    position: BarLabelPosition,
    vertical: bool,
    above_axis: bool,
}

impl BarLabel {
    pub fn new(
        ctx: &mut BuildContext<'_>,
        value: f64,
        options: &LabelOptions,
        position: BarLabelPosition,
        vertical: bool,
        id: String,
    ) -> Self {
        let content = match &options.format {
            Some(template) => format_value(template, value),
            None => format_number(value),
        };
        let style = BoxStyle {
            id: Some(id),
            margin: options.margin,
            padding: options.padding,
            border_width: options.border.width,
            border_color: options.border.color_or_black().to_string(),
            background: options.background.clone(),
            ..BoxStyle::default()
        };
        Self {
            text_box: TextBox::new(ctx, content, style, &options.font, &options.color),
            position,
            vertical,
            above_axis: true,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.text_box.id()
    }

    pub fn position(&self) -> BarLabelPosition {
        self.position
    }

    pub fn text(&self) -> &str {
        self.text_box.text().content()
    }

    /// Whether the bar grows away from the axis in the positive direction.
    pub fn set_above_axis(&mut self, above_axis: bool) {
        self.above_axis = above_axis;
    }
}

impl ChartElement for BarLabel {
    /// `target` is the bar box.
    fn reflow(&mut self, target: Rect) {
        let label = self.text_box.rect();
        let (width, height) = (label.width(), label.height());
        let above = self.above_axis;
        let mut target = target;

        let (mut align, mut valign) = if self.vertical {
            (Align::Center, Align::Start)
        } else {
            (Align::Start, Align::Center)
        };

        match self.position {
            BarLabelPosition::InsideEnd if self.vertical => {
                if !above && height < target.height() {
                    valign = Align::End;
                }
            }
            BarLabelPosition::InsideEnd => {
                align = if above { Align::End } else { Align::Start };
            }
            BarLabelPosition::Center => {
                align = Align::Center;
                valign = Align::Center;
            }
            BarLabelPosition::InsideBase if self.vertical => {
                valign = if above { Align::End } else { Align::Start };
            }
            BarLabelPosition::InsideBase => {
                align = if above { Align::Start } else { Align::End };
            }
            BarLabelPosition::OutsideEnd if self.vertical => {
                target = if above {
                    Rect::new(target.x1, target.y1 - height, target.x2, target.y1)
                } else {
                    Rect::new(target.x1, target.y2, target.x2, target.y2 + height)
                };
            }
            BarLabelPosition::OutsideEnd => {
                align = Align::Center;
                target = if above {
                    Rect::new(target.x2, target.y1, target.x2 + width, target.y2)
                } else {
                    Rect::new(target.x1 - width, target.y1, target.x1, target.y2)
                };
            }
        }

        self.text_box.set_alignment(Some(align), Some(valign));
        self.text_box.reflow(target);
    }

    fn rect(&self) -> Rect {
        self.text_box.rect()
    }

    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        self.text_box.view_elements(view, ids)
    }

    fn dump(&self) -> NodeDump {
        NodeDump::new("bar-label", self.rect()).with_children(vec![self.text_box.dump()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::text_metrics::TextMeasurer;
    use approx::assert_abs_diff_eq;

    fn label(position: BarLabelPosition, vertical: bool, measurer: &mut TextMeasurer) -> BarLabel {
        let series = parse_config(r#"{ "series": [{ "data": [12] }] }"#)
            .expect("config")
            .resolve_series();
        let mut ctx = BuildContext::new(measurer);
        BarLabel::new(&mut ctx, 12.0, &series[0].labels, position, vertical, "k1".to_string())
    }

    #[test]
    fn outside_end_sits_on_top_of_a_column() {
        let mut measurer = TextMeasurer::default();
        let mut label = label(BarLabelPosition::OutsideEnd, true, &mut measurer);
        let bar = Rect::new(100.0, 50.0, 140.0, 200.0);
        label.reflow(bar);
        let rect = label.rect();
        assert_abs_diff_eq!(rect.y2, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rect.center().0, 120.0, epsilon = 1e-9);

        label.set_above_axis(false);
        label.reflow(bar);
        assert_abs_diff_eq!(label.rect().y1, 200.0, epsilon = 1e-9);
    }

    #[test]
    fn outside_end_follows_a_horizontal_bar() {
        let mut measurer = TextMeasurer::default();
        let mut label = label(BarLabelPosition::OutsideEnd, false, &mut measurer);
        let bar = Rect::new(20.0, 10.0, 220.0, 40.0);
        label.reflow(bar);
        assert_abs_diff_eq!(label.rect().x1, 220.0, epsilon = 1e-9);

        label.set_above_axis(false);
        label.reflow(bar);
        assert_abs_diff_eq!(label.rect().x2, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn inside_positions_stay_within_the_bar() {
        let mut measurer = TextMeasurer::default();
        let bar = Rect::new(100.0, 50.0, 140.0, 200.0);

        let mut end = label(BarLabelPosition::InsideEnd, true, &mut measurer);
        end.reflow(bar);
        assert_abs_diff_eq!(end.rect().y1, 50.0, epsilon = 1e-9);

        let mut base = label(BarLabelPosition::InsideBase, true, &mut measurer);
        base.reflow(bar);
        assert_abs_diff_eq!(base.rect().y2, 200.0, epsilon = 1e-9);

        let mut center = label(BarLabelPosition::Center, true, &mut measurer);
        center.reflow(bar);
        assert_abs_diff_eq!(center.rect().center().1, 125.0, epsilon = 1e-9);
    }

    #[test]
    fn formats_value_with_template() {
        let series = parse_config(
            r#"{ "series": [{ "labels": { "format": "{0:N0} units" }, "data": [1234] }] }"#,
        )
        .expect("config")
        .resolve_series();
        let mut measurer = TextMeasurer::default();
        let mut ctx = BuildContext::new(&mut measurer);
        let label = BarLabel::new(
            &mut ctx,
            1234.0,
            &series[0].labels,
            BarLabelPosition::Center,
            true,
            "k1".to_string(),
        );
        assert_eq!(label.text(), "1,234 units");
        assert_eq!(label.id(), Some("k1"));
    }
}
