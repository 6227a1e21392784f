use super::categorical::traverse_data_points;
use super::{
    Align, Axis, BoxStyle, BuildContext, CategoricalChart, ChartElement, DataPointRef, IdScope,
    MarkerShape, ShapeElement, TextBox, ValueRange,
};
use crate::color::Color;
use crate::config::{BAR_BORDER_BRIGHTNESS, MissingValues, SeriesOptions};
use crate::format::{format_number, format_value};
use crate::geometry::{Edge, Rect};
use crate::layout_dump::NodeDump;
use crate::view::{Paint, Primitive, ShapeStyle, View};

/// Marker and optional label for one value of a line series.
#[derive(Debug, Clone)]
pub struct LinePoint {
    point: DataPointRef,
    plot_value: f64,
    /// Whether the value axis runs horizontally.
    vertical: bool,
    above_axis: bool,
    marker: ShapeElement,
    label: TextBox,
    label_edge: Edge,
    rect: Rect,
}

impl LinePoint {
    pub fn new(
        ctx: &mut BuildContext<'_>,
        point: DataPointRef,
        plot_value: f64,
        series: &SeriesOptions,
        vertical: bool,
    ) -> Self {
        let markers = &series.markers;
        let border_color = markers.border.color.clone().unwrap_or_else(|| {
            Color::parse(&markers.background)
                .brightness(BAR_BORDER_BRIGHTNESS)
                .to_hex()
        });
        let marker = ShapeElement::new(
            BoxStyle {
                id: Some(ctx.next_id()),
                visible: markers.visible,
                align: Some(Align::Center),
                valign: Some(Align::Center),
                width: markers.size,
                height: markers.size,
                background: markers.background.clone(),
                border_color,
                border_width: markers.border.width,
                opacity: markers.opacity,
                ..BoxStyle::default()
            },
            MarkerShape::from_token(&markers.kind),
        );

        let labels = &series.labels;
        let value = point.value.unwrap_or(0.0);
        let content = match &labels.format {
            Some(template) => format_value(template, value),
            None => format_number(value),
        };
        let label_id = ctx.next_id();
        let label = TextBox::new(
            ctx,
            content,
            BoxStyle {
                id: Some(label_id),
                visible: labels.visible,
                align: Some(Align::Center),
                valign: Some(Align::Center),
                margin: labels.margin,
                padding: labels.padding,
                border_width: labels.border.width,
                border_color: labels.border.color_or_black().to_string(),
                background: labels.background.clone(),
                ..BoxStyle::default()
            },
            &labels.font,
            &labels.color,
        );

        Self {
            point,
            plot_value,
            vertical,
            above_axis: true,
            marker,
            label,
            label_edge: Edge::from_token(&labels.position).unwrap_or(Edge::Top),
            rect: Rect::default(),
        }
    }

    /// Value the point is drawn at; the running total on stacked charts.
    pub fn plot_value(&self) -> f64 {
        self.plot_value
    }

    pub fn marker(&self) -> &ShapeElement {
        &self.marker
    }

    pub fn label(&self) -> &TextBox {
        &self.label
    }

    pub fn set_above_axis(&mut self, above_axis: bool) {
        self.above_axis = above_axis;
    }
}

impl ChartElement for LinePoint {
    /// `target` spans from the crossing value to the plotted value. The
    /// marker is centered on the far edge.
    fn reflow(&mut self, target: Rect) {
        self.rect = target;
        let mut child_box = target;
        if self.vertical {
            if self.above_axis {
                child_box.x1 += child_box.width();
            } else {
                child_box.x2 -= child_box.width();
            }
        } else if self.above_axis {
            child_box.y1 -= child_box.height();
        } else {
            child_box.y2 += child_box.height();
        }

        self.marker.reflow(child_box);

        self.label.reflow(child_box);
        let mut label_box = self.label.rect();
        label_box.align_to(&self.marker.rect(), self.label_edge);
        self.label.reflow(label_box);
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        let mut elements = self.marker.view_elements(view, ids);
        if let Some(id) = self.marker.id().filter(|_| self.marker.style().visible) {
            ids.register(id, &self.point);
        }
        elements.extend(self.label.view_elements(view, ids));
        if let Some(id) = self.label.id().filter(|_| self.label.style().visible) {
            ids.register(id, &self.point);
        }
        elements
    }

    fn dump(&self) -> NodeDump {
        NodeDump::new("line-point", self.rect)
            .with_children(vec![self.marker.dump(), self.label.dump()])
    }
}

/// One polyline per line series, with a point per value.
pub struct LineChart {
    vertical: bool,
    stacked: bool,
    series: Vec<SeriesOptions>,
    points: Vec<LinePoint>,
    /// Per series, per category: index into `points`, `None` for gaps.
    series_points: Vec<Vec<Option<usize>>>,
    range: Option<ValueRange>,
    rect: Rect,
}

impl LineChart {
    /// Stacking comes from the first series.
    pub fn new(
        ctx: &mut BuildContext<'_>,
        series: &[SeriesOptions],
        categories: &[String],
        vertical: bool,
    ) -> Self {
        let stacked = series.first().is_some_and(|series| series.stack);
        let mut points: Vec<LinePoint> = Vec::new();
        let mut series_points: Vec<Vec<Option<usize>>> = vec![Vec::new(); series.len()];
        // Running plotted total per category; `None` until a point lands there.
        let mut category_tops: Vec<Option<f64>> = Vec::new();
        let mut category_totals: Vec<Option<f64>> = Vec::new();
        let mut values = Vec::new();

        traverse_data_points(series, |data_point| {
            let series_slot = data_point.series_slot;
            let category_index = data_point.category_index;

            if let Some(value) = data_point.value {
                if stacked {
                    if category_totals.len() <= category_index {
                        category_totals.resize(category_index + 1, None);
                    }
                    let total = category_totals[category_index].unwrap_or(0.0) + value;
                    category_totals[category_index] = Some(total);
                    values.push(total);
                } else {
                    values.push(value);
                }
            }

            let value = match data_point.value {
                Some(value) => value,
                None if stacked || data_point.series.missing_values == MissingValues::Zero => 0.0,
                None => {
                    series_points[series_slot].push(None);
                    return;
                }
            };

            let mut plot_value = value;
            if stacked {
                if category_tops.len() <= category_index {
                    category_tops.resize(category_index + 1, None);
                }
                plot_value += category_tops[category_index].unwrap_or(0.0);
                category_tops[category_index] = Some(plot_value);
            }

            let mut reference = data_point.reference(categories);
            reference.value = Some(value);
            points.push(LinePoint::new(ctx, reference, plot_value, data_point.series, !vertical));
            series_points[series_slot].push(Some(points.len() - 1));
        });

        let range = ValueRange::of(values);
        tracing::debug!(points = points.len(), stacked, ?range, "built line chart");

        Self {
            vertical,
            stacked,
            series: series.to_vec(),
            points,
            series_points,
            range,
            rect: Rect::default(),
        }
    }

    pub fn is_stacked(&self) -> bool {
        self.stacked
    }

    pub fn points(&self) -> &[LinePoint] {
        &self.points
    }

    /// Marker centers of each unbroken run of a series. Gaps split runs
    /// unless the series interpolates across them.
    fn segments(&self, series_slot: usize) -> Vec<Vec<(f64, f64)>> {
        let interpolate = self.series[series_slot].missing_values == MissingValues::Interpolate;
        let mut segments = Vec::new();
        let mut current = Vec::new();

        for entry in &self.series_points[series_slot] {
            match entry {
                Some(idx) => current.push(self.points[*idx].marker.rect().center()),
                None if interpolate => {}
                None => segments.push(std::mem::take(&mut current)),
            }
        }
        segments.push(current);
        segments.retain(|segment| segment.len() > 1);
        segments
    }
}

impl ChartElement for LineChart {
    fn reflow(&mut self, target: Rect) {
        self.rect = target;
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    /// Lines come before the points so the markers draw on top.
    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        let mut elements = Vec::new();
        for (series_slot, series) in self.series.iter().enumerate() {
            for segment in self.segments(series_slot) {
                let style = ShapeStyle {
                    stroke: Some(series.color.clone()),
                    stroke_width: series.width,
                    stroke_opacity: series.opacity,
                    fill: Paint::None,
                    ..ShapeStyle::default()
                };
                elements.push(view.create_path(segment, style));
            }
        }
        for point in &self.points {
            elements.extend(point.view_elements(view, ids));
        }
        elements
    }

    fn dump(&self) -> NodeDump {
        NodeDump::new("line-chart", self.rect)
            .with_children(self.points.iter().map(ChartElement::dump).collect())
    }
}

impl CategoricalChart for LineChart {
    fn value_range(&self) -> Option<ValueRange> {
        self.range
    }

    fn reflow_with_axes(&mut self, target: Rect, axis_x: &dyn Axis, axis_y: &dyn Axis) {
        self.rect = target;
        let value_axis = if self.vertical { axis_y } else { axis_x };
        let crossing = value_axis.crossing_value();

        for series_points in &self.series_points {
            for (category_index, entry) in series_points.iter().enumerate() {
                let Some(idx) = entry else {
                    continue;
                };
                let point = &mut self.points[*idx];
                let value = point.plot_value();
                let category = Some(category_index as f64);
                let (slot_x, slot_y) = if self.vertical {
                    (axis_x.value_slot(category), axis_y.value_slot(Some(value)))
                } else {
                    (axis_x.value_slot(Some(value)), axis_y.value_slot(category))
                };
                point.set_above_axis(value >= crossing);
                point.reflow(Rect::new(slot_x.x1, slot_y.y1, slot_x.x2, slot_y.y2));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryAxisOptions, ValueAxisOptions, parse_config};
    use crate::layout::{CategoryAxis, NumericAxis, categories_count};
    use crate::text_metrics::TextMeasurer;
    use crate::view::SvgView;
    use approx::assert_abs_diff_eq;

    fn build(json: &str, measurer: &mut TextMeasurer) -> (LineChart, NumericAxis) {
        let series = parse_config(json).expect("config").resolve_series();
        let categories: Vec<String> = (0..categories_count(&series))
            .map(|idx| format!("C{idx}"))
            .collect();
        let mut ctx = BuildContext::new(measurer);
        let mut chart = LineChart::new(&mut ctx, &series, &categories, true);
        let range = chart.value_range().unwrap_or(ValueRange::new(0.0, 1.0));
        let mut category_axis =
            CategoryAxis::new(&mut ctx, categories, &CategoryAxisOptions::default(), false);
        let mut value_axis =
            NumericAxis::new(&mut ctx, range.min, range.max, &ValueAxisOptions::default(), true);
        category_axis.reflow(Rect::new(0.0, 300.0, 400.0, 330.0));
        value_axis.reflow(Rect::new(0.0, 0.0, 40.0, 300.0));
        chart.reflow_with_axes(Rect::new(0.0, 0.0, 400.0, 330.0), &category_axis, &value_axis);
        (chart, value_axis)
    }

    fn paths(chart: &LineChart) -> Vec<Vec<(f64, f64)>> {
        let mut view = SvgView::new(400.0, 330.0);
        chart
            .view_elements(&mut view, &mut IdScope::default())
            .into_iter()
            .filter_map(|element| match element {
                Primitive::Path { points, style } if style.fill.is_none() && style.stroke.is_some() => {
                    Some(points)
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn gaps_break_the_line() {
        let mut measurer = TextMeasurer::default();
        let (chart, _) = build(
            r#"{ "series": [{ "type": "line", "markers": { "visible": false }, "data": [1, null, 3] }] }"#,
            &mut measurer,
        );
        assert_eq!(chart.points().len(), 2);
        assert!(paths(&chart).is_empty());
    }

    #[test]
    fn interpolation_bridges_gaps() {
        let mut measurer = TextMeasurer::default();
        let (chart, _) = build(
            r#"{ "series": [{ "type": "line", "missingValues": "interpolate",
                 "markers": { "visible": false }, "data": [1, null, 3] }] }"#,
            &mut measurer,
        );
        let paths = paths(&chart);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 2);
    }

    #[test]
    fn zero_policy_plots_missing_values_at_zero() {
        let mut measurer = TextMeasurer::default();
        let (chart, value_axis) = build(
            r#"{ "series": [{ "type": "line", "missingValues": "zero", "data": [1, null, 3] }] }"#,
            &mut measurer,
        );
        assert_eq!(chart.points().len(), 3);
        let zero = value_axis.value_slot(None).y1;
        assert_abs_diff_eq!(chart.points()[1].marker().rect().center().1, zero, epsilon = 1e-9);
    }

    #[test]
    fn markers_center_on_their_values() {
        let mut measurer = TextMeasurer::default();
        let (chart, value_axis) = build(
            r#"{ "series": [{ "type": "line", "data": [10, 20] }] }"#,
            &mut measurer,
        );
        for (point, value) in chart.points().iter().zip([10.0, 20.0]) {
            let expected = value_axis.value_slot(Some(value)).y1;
            assert_abs_diff_eq!(point.marker().rect().center().1, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn stacked_points_accumulate_per_category() {
        let mut measurer = TextMeasurer::default();
        let (chart, _) = build(
            r#"{ "seriesDefaults": { "stack": true },
                 "series": [{ "type": "line", "data": [1, 2] }, { "type": "line", "data": [3, null] }] }"#,
            &mut measurer,
        );
        let plotted: Vec<f64> = chart.points().iter().map(LinePoint::plot_value).collect();
        assert_eq!(plotted, vec![1.0, 4.0, 2.0, 2.0]);
        assert_eq!(chart.value_range(), Some(ValueRange::new(1.0, 4.0)));
    }

    #[test]
    fn stacked_range_covers_intermediate_totals() {
        let mut measurer = TextMeasurer::default();
        let (chart, value_axis) = build(
            r#"{ "seriesDefaults": { "stack": true },
                 "series": [{ "type": "line", "data": [5] }, { "type": "line", "data": [-10] }] }"#,
            &mut measurer,
        );
        let plotted: Vec<f64> = chart.points().iter().map(LinePoint::plot_value).collect();
        assert_eq!(plotted, vec![5.0, -5.0]);
        assert_eq!(chart.value_range(), Some(ValueRange::new(-5.0, 5.0)));
        let top = value_axis.value_slot(Some(5.0)).y1;
        assert_abs_diff_eq!(chart.points()[0].marker().rect().center().1, top, epsilon = 1e-9);
    }

    #[test]
    fn label_sits_above_the_marker() {
        let mut measurer = TextMeasurer::default();
        let (chart, _) = build(
            r#"{ "series": [{ "type": "line", "labels": { "visible": true }, "data": [5] }] }"#,
            &mut measurer,
        );
        let point = &chart.points()[0];
        assert_abs_diff_eq!(point.label().rect().y2, point.marker().rect().y1, epsilon = 1e-9);
    }
}
