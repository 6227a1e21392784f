use super::{Align, BoxStyle, BuildContext, ChartElement, IdScope, TextBox};
use crate::config::TitleOptions;
use crate::geometry::{Axis, Rect, Spacing};
use crate::layout_dump::NodeDump;
use crate::view::{Primitive, View};

/// Chart caption at the top or bottom edge, spanning the full width.
pub struct Title {
    text_box: TextBox,
    rect: Rect,
}

impl Title {
    /// `None` when the title is hidden or has no text.
    pub fn new(ctx: &mut BuildContext<'_>, options: &TitleOptions) -> Option<Self> {
        if !options.visible || options.text.is_empty() {
            return None;
        }
        let style = BoxStyle {
            align: Align::from_token(&options.align),
            valign: Align::from_token(&options.position),
            margin: Spacing::from(options.margin),
            padding: Spacing::from(options.padding),
            border_width: options.border.width,
            border_color: options.border.color_or_black().to_string(),
            background: options.background.clone(),
            ..BoxStyle::default()
        };
        let text_box = TextBox::new(ctx, options.text.clone(), style, &options.font, &options.color);
        let rect = text_box.rect();
        Some(Self { text_box, rect })
    }
}

impl ChartElement for Title {
    fn reflow(&mut self, target: Rect) {
        self.text_box.reflow(target);
        self.rect = self.text_box.rect();
        self.rect.snap_to(&target, Some(Axis::X));
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        self.text_box.view_elements(view, ids)
    }

    fn dump(&self) -> NodeDump {
        NodeDump::new("title", self.rect).with_children(vec![self.text_box.dump()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::TextMeasurer;

    #[test]
    fn empty_or_hidden_title_is_skipped() {
        let mut measurer = TextMeasurer::default();
        let mut ctx = BuildContext::new(&mut measurer);
        assert!(Title::new(&mut ctx, &TitleOptions::default()).is_none());
        let hidden = TitleOptions {
            text: "Sales".to_string(),
            visible: false,
            ..TitleOptions::default()
        };
        assert!(Title::new(&mut ctx, &hidden).is_none());
    }

    #[test]
    fn title_spans_target_width_at_its_edge() {
        let mut measurer = TextMeasurer::default();
        let mut ctx = BuildContext::new(&mut measurer);
        let options = TitleOptions {
            text: "Sales".to_string(),
            position: "bottom".to_string(),
            ..TitleOptions::default()
        };
        let mut title = Title::new(&mut ctx, &options).expect("title");
        let target = Rect::new(0.0, 0.0, 600.0, 400.0);
        title.reflow(target);

        let rect = title.rect();
        assert_eq!(rect.x1, 0.0);
        assert_eq!(rect.x2, 600.0);
        assert_eq!(rect.y2, 400.0);
        assert!(rect.y1 > 350.0);
    }
}
