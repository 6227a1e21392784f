use super::axis::AxisBase;
use super::{Axis, AxisKind, BuildContext, ChartElement, IdScope};
use crate::config::{AxisOptions, CategoryAxisOptions};
use crate::format::format_text;
use crate::geometry::{Axis as Direction, COORD_PRECISION, Rect, round};
use crate::layout_dump::NodeDump;
use crate::view::{Primitive, View};

/// An axis split into one equal band per category.
pub struct CategoryAxis {
    base: AxisBase,
    categories: Vec<String>,
}

impl CategoryAxis {
    pub fn new(
        ctx: &mut BuildContext<'_>,
        categories: Vec<String>,
        options: &CategoryAxisOptions,
        vertical: bool,
    ) -> Self {
        let labels = categories
            .iter()
            .map(|category| match &options.axis.labels.format {
                Some(template) => format_text(template, category),
                None => category.clone(),
            })
            .collect();
        Self {
            base: AxisBase::new(ctx, AxisKind::Category, &options.axis, vertical, labels),
            categories,
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    fn direction(&self) -> Direction {
        if self.base.vertical { Direction::Y } else { Direction::X }
    }

    /// `divisions` equal steps plus the closing edge.
    fn ticks(&self, divisions: usize) -> Vec<f64> {
        let rect = self.base.rect;
        let direction = self.direction();
        let start = rect.start(direction);
        let step = rect.size(direction) / divisions as f64;

        let mut ticks: Vec<f64> = (0..divisions)
            .map(|idx| round(start + idx as f64 * step, COORD_PRECISION))
            .collect();
        ticks.push(rect.end(direction));
        ticks
    }

    fn divisions(&self) -> usize {
        self.categories.len().max(1)
    }

    /// Pixel band of the category at `index`, on the axis edge of the box.
    pub fn slot(&self, index: usize) -> Rect {
        let rect = self.base.rect;
        let direction = self.direction();
        let step = rect.size(direction) / self.divisions() as f64;
        let p1 = rect.start(direction) + index as f64 * step;
        let p2 = p1 + step;
        if self.base.vertical {
            Rect::new(rect.x2, p1, rect.x2, p2)
        } else {
            Rect::new(p1, rect.y1, p2, rect.y1)
        }
    }
}

impl ChartElement for CategoryAxis {
    fn reflow(&mut self, target: Rect) {
        self.base.rect = self.base.axis_box(target);
        let ticks = self.major_ticks();
        self.base.arrange_labels(&ticks, true);
    }

    fn rect(&self) -> Rect {
        self.base.rect
    }

    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        let rect = self.base.rect;
        let line = if self.base.vertical {
            (rect.x2, rect.y1, rect.x2, rect.y2)
        } else {
            (rect.x1, rect.y1, rect.x2, rect.y1)
        };
        self.base
            .view_elements(view, ids, line, &self.major_ticks(), &self.minor_ticks())
    }

    fn dump(&self) -> NodeDump {
        self.base.dump()
    }
}

impl Axis for CategoryAxis {
    fn kind(&self) -> AxisKind {
        AxisKind::Category
    }

    fn options(&self) -> &AxisOptions {
        &self.base.options
    }

    fn is_vertical(&self) -> bool {
        self.base.vertical
    }

    fn major_ticks(&self) -> Vec<f64> {
        self.ticks(self.divisions())
    }

    fn minor_ticks(&self) -> Vec<f64> {
        self.ticks(self.divisions() * 2)
    }

    fn line_box(&self) -> Rect {
        let mut line = self.slot(0);
        line.wrap(&self.slot(self.divisions() - 1));
        line
    }

    /// Vertical category axes run top down, so by default the value axis
    /// crosses after the last category.
    fn crossing_value(&self) -> f64 {
        self.base.options.axis_crossing_value.unwrap_or(if self.base.vertical {
            self.categories.len() as f64
        } else {
            0.0
        })
    }

    fn value_slot(&self, value: Option<f64>) -> Rect {
        let index = value.unwrap_or_else(|| self.crossing_value()).max(0.0);
        self.slot(index as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::TextMeasurer;
    use approx::assert_abs_diff_eq;

    fn categories(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn bands_split_the_axis_evenly() {
        let mut measurer = TextMeasurer::default();
        let mut ctx = BuildContext::new(&mut measurer);
        let mut axis = CategoryAxis::new(
            &mut ctx,
            categories(&["Q1", "Q2", "Q3", "Q4"]),
            &CategoryAxisOptions::default(),
            false,
        );
        axis.reflow(Rect::new(0.0, 200.0, 400.0, 300.0));

        assert_eq!(axis.major_ticks(), vec![0.0, 100.0, 200.0, 300.0, 400.0]);
        assert_eq!(axis.minor_ticks().len(), 9);
        let slot = axis.slot(2);
        assert_eq!((slot.x1, slot.x2), (200.0, 300.0));
        assert_eq!(slot.y1, 200.0);
        assert_eq!(axis.line_box(), Rect::new(0.0, 200.0, 400.0, 200.0));
        assert_eq!(axis.crossing_value(), 0.0);
    }

    #[test]
    fn labels_center_in_their_band() {
        let mut measurer = TextMeasurer::default();
        let mut ctx = BuildContext::new(&mut measurer);
        let mut axis = CategoryAxis::new(
            &mut ctx,
            categories(&["A", "B"]),
            &CategoryAxisOptions::default(),
            false,
        );
        axis.reflow(Rect::new(0.0, 0.0, 200.0, 100.0));
        for (label, center) in axis.base.labels.iter().zip([50.0, 150.0]) {
            assert_abs_diff_eq!(label.rect().center().0, center, epsilon = 1e-3);
        }
    }

    #[test]
    fn vertical_axis_crosses_after_the_last_category() {
        let mut measurer = TextMeasurer::default();
        let mut ctx = BuildContext::new(&mut measurer);
        let mut axis = CategoryAxis::new(
            &mut ctx,
            categories(&["A", "B", "C"]),
            &CategoryAxisOptions::default(),
            true,
        );
        axis.reflow(Rect::new(0.0, 0.0, 300.0, 300.0));
        assert_eq!(axis.crossing_value(), 3.0);
        assert_eq!(axis.value_slot(None).y1, 300.0);
        assert_eq!(axis.value_slot(Some(0.0)).y1, 0.0);
    }

    #[test]
    fn label_format_wraps_category_text() {
        let mut measurer = TextMeasurer::default();
        let mut ctx = BuildContext::new(&mut measurer);
        let mut options = CategoryAxisOptions::default();
        options.axis.labels.format = Some("[{0}]".to_string());
        let axis = CategoryAxis::new(&mut ctx, categories(&["A"]), &options, false);
        assert_eq!(axis.base.labels[0].text().content(), "[A]");
    }
}
