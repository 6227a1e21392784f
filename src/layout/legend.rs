use super::{BuildContext, ChartElement, IdScope, Text, union_of};
use crate::config::{LegendOptions, SeriesOptions};
use crate::geometry::{Edge, Rect, Spacing};
use crate::layout_dump::NodeDump;
use crate::view::{GroupStyle, Paint, Primitive, ShapeStyle, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    Top,
    Bottom,
    Left,
    Right,
    /// Stacked labels moved by the configured offset only.
    Custom,
}

impl LegendPosition {
    /// Unknown positions lay out like `right`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            "left" => Self::Left,
            "custom" => Self::Custom,
            _ => Self::Right,
        }
    }

    fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// One colored marker and name per series.
pub struct Legend {
    options: LegendOptions,
    position: LegendPosition,
    labels: Vec<Text>,
    colors: Vec<String>,
    rect: Rect,
}

impl Legend {
    pub fn new(ctx: &mut BuildContext<'_>, options: &LegendOptions, series: &[SeriesOptions]) -> Self {
        let labels = series
            .iter()
            .map(|series| Text::new(ctx, series.name.clone(), &options.labels.font, &options.labels.color))
            .collect();
        Self {
            options: options.clone(),
            position: LegendPosition::from_token(&options.position),
            labels,
            colors: series.iter().map(|series| series.color.clone()).collect(),
            rect: Rect::default(),
        }
    }

    /// Half the height of the first label.
    pub fn marker_size(&self) -> f64 {
        self.labels
            .first()
            .map(|label| label.rect().height() / 2.0)
            .unwrap_or(0.0)
    }

    pub fn labels(&self) -> &[Text] {
        &self.labels
    }

    fn translate_labels(&mut self, dx: f64, dy: f64) {
        for label in &mut self.labels {
            label.translate(dx, dy);
        }
    }

    /// Chains the labels along `edge`, starting from the origin.
    fn chain_labels(&mut self, edge: Edge) -> Rect {
        for label in &mut self.labels {
            let size = label.size();
            *label.rect_mut() = Rect::new(0.0, 0.0, size.width, size.height);
        }
        let mut label_box = self.labels[0].rect();
        for idx in 1..self.labels.len() {
            let previous = self.labels[idx - 1].rect();
            label_box.wrap(self.labels[idx].rect_mut().align_to(&previous, edge));
        }
        label_box
    }

    fn vertical_layout(&mut self, target: Rect) {
        let margin = Spacing::from(self.options.margin);
        let marker_space = self.marker_size() * 2.0;
        let mut label_box = self.chain_labels(Edge::Bottom);

        let offset_y = (target.y2 - label_box.height()) / 2.0;
        let offset_x = if self.position == LegendPosition::Left {
            label_box.x2 += marker_space + margin.left + margin.right;
            target.x1 + marker_space + margin.left
        } else {
            let offset_x = target.x2 - label_box.width() - margin.right;
            label_box.translate(offset_x, offset_y);
            label_box.x1 -= marker_space + margin.left;
            offset_x
        };

        self.translate_labels(offset_x + self.options.offset_x, offset_y + self.options.offset_y);

        let width = label_box.width();
        label_box.x1 = target.x1.max(label_box.x1);
        label_box.x2 = label_box.x1 + width;
        label_box.y1 = target.y1;
        label_box.y2 = target.y2;
        self.rect = label_box;
    }

    fn horizontal_layout(&mut self, target: Rect) {
        let margin = Spacing::from(self.options.margin);
        let marker_width = self.marker_size() * 3.0;

        let mut label_box = self.chain_labels(Edge::Right);
        for (idx, label) in self.labels.iter_mut().enumerate() {
            label.translate(idx as f64 * marker_width, 0.0);
        }

        let offset_x = (target.x2 - label_box.width() - marker_width) / 2.0;
        let height = label_box.height();
        let offset_y = if self.position == LegendPosition::Top {
            label_box.y2 = target.y1 + height + margin.top + margin.bottom;
            label_box.y1 = target.y1;
            target.y1 + margin.top
        } else {
            label_box.y1 = target.y2 - height - margin.top - margin.bottom;
            label_box.y2 = target.y2;
            target.y2 - height - margin.bottom
        };

        self.translate_labels(offset_x + self.options.offset_x, offset_y + self.options.offset_y);

        label_box.x1 = target.x1;
        label_box.x2 = target.x2;
        self.rect = label_box;
    }

    fn custom_layout(&mut self, target: Rect) {
        let marker_width = self.marker_size() * 2.0;
        self.chain_labels(Edge::Bottom);
        self.translate_labels(self.options.offset_x + marker_width, self.options.offset_y);
        self.rect = target;
    }
}

impl ChartElement for Legend {
    fn reflow(&mut self, target: Rect) {
        if self.labels.is_empty() {
            self.rect = target;
            return;
        }
        match self.position {
            LegendPosition::Custom => self.custom_layout(target),
            position if position.is_horizontal() => self.horizontal_layout(target),
            _ => self.vertical_layout(target),
        }
        tracing::trace!(rect = ?self.rect, position = ?self.position, "legend reflowed");
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        let marker_size = self.marker_size();
        let mut children = Vec::with_capacity(self.labels.len() * 2 + 1);

        for label in &self.labels {
            children.extend(label.view_elements(view, ids));
        }

        for (label, color) in self.labels.iter().zip(&self.colors) {
            let label_rect = label.rect();
            let x1 = label_rect.x1 - marker_size * 2.0;
            let y1 = if self.position.is_horizontal() {
                label_rect.y1 + marker_size / 2.0
            } else {
                label_rect.y1 + (label_rect.height() - marker_size) / 2.0
            };
            let marker = Rect::new(x1, y1, x1 + marker_size, y1 + marker_size);
            let style = ShapeStyle {
                stroke: Some(color.clone()),
                fill: Paint::color(color),
                ..ShapeStyle::default()
            };
            children.push(view.create_rect(marker, style));
        }

        let border = &self.options.border;
        let painted = !self.options.background.is_empty() || border.width > 0.0;
        if let Some(mut background) = union_of(self.labels.iter().map(|label| label.rect())) {
            if painted {
                let mut padding = Spacing::from(self.options.padding);
                padding.left += marker_size * 2.0;
                background.pad(padding);
                let style = ShapeStyle::filled(Paint::color(&self.options.background))
                    .with_border(border.color_or_black(), border.width);
                children.insert(0, view.create_rect(background, style));
            }
        }

        vec![view.create_group(
            GroupStyle {
                id: None,
                z_index: self.options.z_index,
            },
            children,
        )]
    }

    fn dump(&self) -> NodeDump {
        NodeDump::new("legend", self.rect)
            .with_children(self.labels.iter().map(|label| label.dump()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::text_metrics::TextMeasurer;
    use approx::assert_abs_diff_eq;

    fn series(names: &[&str]) -> Vec<SeriesOptions> {
        let json = format!(
            "{{ \"series\": [{}] }}",
            names
                .iter()
                .map(|name| format!("{{ \"name\": \"{name}\", \"data\": [1] }}"))
                .collect::<Vec<_>>()
                .join(",")
        );
        crate::config::parse_config(&json)
            .expect("config")
            .resolve_series()
    }

    fn legend(position: &str, names: &[&str], measurer: &mut TextMeasurer) -> Legend {
        let mut ctx = BuildContext::new(measurer);
        let options = LegendOptions {
            position: position.to_string(),
            ..ChartConfig::default().legend
        };
        Legend::new(&mut ctx, &options, &series(names))
    }

    #[test]
    fn right_legend_hugs_the_right_edge() {
        let mut measurer = TextMeasurer::default();
        let mut legend = legend("right", &["North", "South"], &mut measurer);
        let target = Rect::new(0.0, 0.0, 600.0, 400.0);
        legend.reflow(target);

        let rect = legend.rect();
        assert_abs_diff_eq!(rect.y1, 0.0);
        assert_abs_diff_eq!(rect.y2, 400.0);
        let labels = legend.labels();
        assert!(labels[1].rect().y1 >= labels[0].rect().y2);
        assert_abs_diff_eq!(
            labels.iter().map(|label| label.rect().x2).fold(0.0, f64::max),
            target.x2 - 10.0,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(rect.x2, target.x2 - 10.0, epsilon = 1e-9);
    }

    #[test]
    fn top_legend_spans_the_width_and_lines_up_labels() {
        let mut measurer = TextMeasurer::default();
        let mut legend = legend("top", &["A", "B", "C"], &mut measurer);
        legend.reflow(Rect::new(0.0, 0.0, 600.0, 400.0));

        let rect = legend.rect();
        assert_eq!((rect.x1, rect.x2, rect.y1), (0.0, 600.0, 0.0));
        let labels = legend.labels();
        assert_eq!(labels[0].rect().y1, labels[2].rect().y1);
        assert!(labels[1].rect().x1 > labels[0].rect().x2);
    }

    #[test]
    fn reflow_is_repeatable() {
        let mut measurer = TextMeasurer::default();
        let mut legend = legend("left", &["A", "B"], &mut measurer);
        let target = Rect::new(0.0, 0.0, 300.0, 200.0);
        legend.reflow(target);
        let first: Vec<Rect> = legend.labels().iter().map(|label| label.rect()).collect();
        legend.reflow(target);
        let second: Vec<Rect> = legend.labels().iter().map(|label| label.rect()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_legend_takes_the_target() {
        let mut measurer = TextMeasurer::default();
        let mut legend = legend("bottom", &[], &mut measurer);
        let target = Rect::new(1.0, 2.0, 3.0, 4.0);
        legend.reflow(target);
        assert_eq!(legend.rect(), target);
    }
}
