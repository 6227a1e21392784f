use super::{Align, BoxStyle, BuildContext, ChartElement, IdScope, TextBox};
use crate::config::AxisOptions;
use crate::geometry::Rect;
use crate::layout_dump::NodeDump;
use crate::view::{Primitive, ShapeStyle, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    Category,
    Numeric,
}

impl AxisKind {
    fn dump_kind(self) -> &'static str {
        match self {
            AxisKind::Category => "category-axis",
            AxisKind::Numeric => "numeric-axis",
        }
    }
}

/// Maps data coordinates onto one edge of the plot box.
///
/// Tick positions are derived from the current box each time they are asked
/// for, so they always agree with the last reflow.
pub trait Axis: ChartElement {
    fn kind(&self) -> AxisKind;

    fn options(&self) -> &AxisOptions;

    fn is_vertical(&self) -> bool;

    /// Pixel positions of the major ticks, top to bottom or left to right.
    fn major_ticks(&self) -> Vec<f64>;

    fn minor_ticks(&self) -> Vec<f64>;

    /// Zero-thickness box covering the drawn axis line.
    fn line_box(&self) -> Rect;

    /// Value (or category index) at which the other axis crosses this one.
    fn crossing_value(&self) -> f64;

    /// Pixel band for a value or category index, `None` meaning the crossing
    /// value.
    fn value_slot(&self, value: Option<f64>) -> Rect;

    fn major_grid_visible(&self) -> bool {
        self.options()
            .major_grid_lines
            .visible
            .unwrap_or(self.kind() == AxisKind::Numeric)
    }

    fn minor_grid_visible(&self) -> bool {
        self.options().minor_grid_lines.visible.unwrap_or(false)
    }
}

/// State and layout rules shared by both axis kinds.
#[derive(Debug, Clone)]
pub(crate) struct AxisBase {
    pub kind: AxisKind,
    pub options: AxisOptions,
    pub vertical: bool,
    pub labels: Vec<TextBox>,
    pub rect: Rect,
}

impl AxisBase {
    pub fn new(
        ctx: &mut BuildContext<'_>,
        kind: AxisKind,
        options: &AxisOptions,
        vertical: bool,
        label_texts: Vec<String>,
    ) -> Self {
        let label_options = &options.labels;
        let labels = label_texts
            .into_iter()
            .map(|content| {
                let style = BoxStyle {
                    align: Some(if vertical { Align::End } else { Align::Center }),
                    valign: Some(Align::Start),
                    margin: label_options.margin.into(),
                    padding: label_options.padding.into(),
                    ..BoxStyle::default()
                };
                TextBox::new(ctx, content, style, &label_options.font, &label_options.color)
            })
            .collect();
        Self {
            kind,
            options: options.clone(),
            vertical,
            labels,
            rect: Rect::default(),
        }
    }

    /// Longest of the visible tick marks.
    pub fn tick_size(&self) -> f64 {
        let options = &self.options;
        let major = options.major_tick_type != "none";
        let minor = options.minor_tick_type != "none";
        match (major, minor) {
            (true, true) => options.major_tick_size.max(options.minor_tick_size),
            (true, false) => options.major_tick_size,
            (false, true) => options.minor_tick_size,
            (false, false) => 0.0,
        }
    }

    /// The axis box: as wide (or tall) as the widest label plus ticks and
    /// margin, spanning the target along the axis direction.
    pub fn axis_box(&self, target: Rect) -> Rect {
        let space = self.tick_size() + self.options.margin;
        if self.vertical {
            let width = self
                .labels
                .iter()
                .map(|label| label.rect().width())
                .fold(0.0, f64::max);
            Rect::new(target.x1, target.y1, target.x1 + width + space, target.y2)
        } else {
            let height = self
                .labels
                .iter()
                .map(|label| label.rect().height())
                .fold(0.0, f64::max);
            Rect::new(target.x1, target.y1, target.x2, target.y1 + height + space)
        }
    }

    /// Places each label against its tick, or centered between two ticks
    /// when `between_ticks` is set.
    pub fn arrange_labels(&mut self, ticks: &[f64], between_ticks: bool) {
        let tick_size = self.tick_size();
        let margin = self.options.margin;
        let rect = self.rect;
        let count = self.labels.len();

        for (idx, label) in self.labels.iter_mut().enumerate() {
            let tick_idx = if self.vertical { count - 1 - idx } else { idx };
            let label_rect = label.rect();
            let (Some(&tick), next_tick) = (ticks.get(tick_idx), ticks.get(idx + 1)) else {
                continue;
            };

            let target = if self.vertical {
                let size = label_rect.height();
                let label_pos = match (between_ticks, ticks.get(idx), next_tick) {
                    (true, Some(&first), Some(&next)) => first + (next - first) / 2.0 - size / 2.0,
                    _ => tick - size / 2.0,
                };
                let label_x = rect.x2 - margin - tick_size;
                Rect::new(label_x - label_rect.width(), label_pos, label_x, label_pos)
            } else {
                let size = label_rect.width();
                let (first, next) = match (between_ticks, next_tick) {
                    (true, Some(&next)) => (ticks[idx], next),
                    _ => (tick - size / 2.0, tick + size / 2.0),
                };
                let label_y = rect.y1 + tick_size + margin;
                Rect::new(first, label_y, next, label_y)
            };
            label.reflow(target);
        }
    }

    pub fn line_style(&self) -> ShapeStyle {
        ShapeStyle::stroked(&self.options.line.color, self.options.line.width)
    }

    pub fn draws_line(&self) -> bool {
        self.options.line.visible && self.options.line.width > 0.0
    }

    /// Tick marks on the outer side of the axis line. Minor ticks that fall
    /// on a major tick are left out.
    pub fn render_ticks(&self, view: &mut dyn View, major: &[f64], minor: &[f64]) -> Vec<Primitive> {
        let options = &self.options;
        let major_type = options.major_tick_type.to_lowercase();
        let minor_type = options.minor_tick_type.to_lowercase();
        let mut elements = Vec::new();

        if major_type == "outside" {
            for &pos in major {
                elements.push(self.tick(view, pos, options.major_tick_size));
            }
        }
        if minor_type == "outside" {
            for &pos in minor {
                if major_type != "none" && major.contains(&pos) {
                    continue;
                }
                elements.push(self.tick(view, pos, options.minor_tick_size));
            }
        }
        elements
    }

    fn tick(&self, view: &mut dyn View, pos: f64, size: f64) -> Primitive {
        let rect = self.rect;
        let style = self.line_style();
        if self.vertical {
            view.create_line(rect.x2 - size, pos, rect.x2, pos, style)
        } else {
            view.create_line(pos, rect.y1, pos, rect.y1 + size, style)
        }
    }

    /// Axis line, ticks and labels in one group at the axis z-index.
    pub fn view_elements(
        &self,
        view: &mut dyn View,
        ids: &mut IdScope,
        line: (f64, f64, f64, f64),
        major: &[f64],
        minor: &[f64],
    ) -> Vec<Primitive> {
        let mut children = Vec::new();
        if self.draws_line() {
            let (x1, y1, x2, y2) = line;
            children.push(view.create_line(x1, y1, x2, y2, self.line_style()));
            children.extend(self.render_ticks(view, major, minor));
        }
        for label in &self.labels {
            children.extend(label.view_elements(view, ids));
        }
        vec![view.create_group(
            crate::view::GroupStyle {
                id: None,
                z_index: self.options.z_index,
            },
            children,
        )]
    }

    pub fn dump(&self) -> NodeDump {
        NodeDump::new(self.kind.dump_kind(), self.rect)
            .with_children(self.labels.iter().map(|label| label.dump()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::TextMeasurer;

    fn base(options: AxisOptions, vertical: bool, measurer: &mut TextMeasurer) -> AxisBase {
        let mut ctx = BuildContext::new(measurer);
        AxisBase::new(
            &mut ctx,
            AxisKind::Numeric,
            &options,
            vertical,
            vec!["0".to_string(), "50".to_string(), "100".to_string()],
        )
    }

    #[test]
    fn tick_size_follows_visible_tick_types() {
        let mut measurer = TextMeasurer::default();
        let mut options = AxisOptions::default();
        assert_eq!(base(options.clone(), true, &mut measurer).tick_size(), 4.0);

        options.minor_tick_type = "outside".to_string();
        options.minor_tick_size = 6.0;
        assert_eq!(base(options.clone(), true, &mut measurer).tick_size(), 6.0);

        options.major_tick_type = "none".to_string();
        options.minor_tick_size = 3.0;
        assert_eq!(base(options.clone(), true, &mut measurer).tick_size(), 3.0);

        options.minor_tick_type = "none".to_string();
        assert_eq!(base(options, true, &mut measurer).tick_size(), 0.0);
    }

    #[test]
    fn vertical_axis_box_fits_widest_label() {
        let mut measurer = TextMeasurer::default();
        let axis = base(AxisOptions::default(), true, &mut measurer);
        let widest = axis
            .labels
            .iter()
            .map(|label| label.rect().width())
            .fold(0.0, f64::max);
        let rect = axis.axis_box(Rect::new(10.0, 0.0, 500.0, 300.0));
        assert_eq!(rect.x1, 10.0);
        approx::assert_abs_diff_eq!(rect.x2, 10.0 + widest + 9.0, epsilon = 1e-9);
        assert_eq!((rect.y1, rect.y2), (0.0, 300.0));
    }

    #[test]
    fn minor_ticks_on_major_positions_are_skipped() {
        let mut measurer = TextMeasurer::default();
        let options = AxisOptions {
            minor_tick_type: "outside".to_string(),
            ..AxisOptions::default()
        };
        let mut axis = base(options, false, &mut measurer);
        axis.rect = Rect::new(0.0, 100.0, 200.0, 120.0);
        let mut view = crate::view::SvgView::new(200.0, 200.0);
        let ticks = axis.render_ticks(&mut view, &[0.0, 100.0], &[0.0, 50.0, 100.0, 150.0]);
        assert_eq!(ticks.len(), 4);
    }
}
