use super::{
    Axis, BarChart, BuildContext, CategoricalChart, CategoryAxis, ChartElement, IdScope,
    LineChart, NumericAxis, ValueRange, categories_count,
};
use crate::config::{ChartConfig, GridLineOptions, PlotAreaOptions, SeriesOptions, SeriesType};
use crate::geometry::{COORD_PRECISION, Rect, Spacing, round};
use crate::layout_dump::NodeDump;
use crate::view::{Paint, Primitive, ShapeStyle, View};

/// The plotting region: one category axis, one value axis and the charts
/// drawn against them.
pub struct PlotArea {
    options: PlotAreaOptions,
    /// Bars run horizontally and the category axis stands on the left.
    inverted: bool,
    category_axis: CategoryAxis,
    value_axis: NumericAxis,
    bar_chart: Option<BarChart>,
    line_chart: Option<LineChart>,
    rect: Rect,
}

impl PlotArea {
    pub fn new(ctx: &mut BuildContext<'_>, config: &ChartConfig, series: &[SeriesOptions]) -> Self {
        let (bar_series, line_series): (Vec<SeriesOptions>, Vec<SeriesOptions>) = series
            .iter()
            .cloned()
            .partition(|series| series.kind != SeriesType::Line);

        let vertical_categories = config.category_axis.orientation.as_deref() == Some("vertical");
        let inverted = bar_series
            .first()
            .map_or(vertical_categories, |series| series.kind == SeriesType::Bar);

        let mut categories: Vec<String> = config
            .category_axis
            .categories
            .iter()
            .map(|category| category.as_text())
            .collect();
        let count = categories_count(series);
        if categories.len() < count {
            categories.resize(count, String::new());
        }

        let mut range = ValueRange::new(0.0, 1.0);
        let bar_chart = (!bar_series.is_empty()).then(|| {
            let chart = BarChart::new(ctx, &bar_series, &categories, !inverted);
            range = chart.value_range().unwrap_or(range);
            chart
        });
        let line_chart = (!line_series.is_empty()).then(|| {
            let chart = LineChart::new(ctx, &line_series, &categories, !inverted);
            range = range.merge(chart.value_range().unwrap_or(range));
            chart
        });

        let category_axis = CategoryAxis::new(ctx, categories, &config.category_axis, inverted);
        let value_axis = NumericAxis::new(ctx, range.min, range.max, &config.value_axis, !inverted);
        tracing::debug!(
            inverted,
            bars = bar_series.len(),
            lines = line_series.len(),
            min = range.min,
            max = range.max,
            "built plot area"
        );

        Self {
            options: config.plot_area.clone(),
            inverted,
            category_axis,
            value_axis,
            bar_chart,
            line_chart,
            rect: Rect::default(),
        }
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn category_axis(&self) -> &CategoryAxis {
        &self.category_axis
    }

    pub fn value_axis(&self) -> &NumericAxis {
        &self.value_axis
    }

    pub fn bar_chart(&self) -> Option<&BarChart> {
        self.bar_chart.as_ref()
    }

    pub fn line_chart(&self) -> Option<&LineChart> {
        self.line_chart.as_ref()
    }

    /// The horizontal axis.
    pub fn axis_x(&self) -> &dyn Axis {
        orient(&self.category_axis, &self.value_axis, self.inverted).0
    }

    /// The vertical axis.
    pub fn axis_y(&self) -> &dyn Axis {
        orient(&self.category_axis, &self.value_axis, self.inverted).1
    }

    fn reflow_axis_x(&mut self, target: Rect) {
        if self.inverted {
            self.value_axis.reflow(target);
        } else {
            self.category_axis.reflow(target);
        }
    }

    fn reflow_axis_y(&mut self, target: Rect) {
        if self.inverted {
            self.category_axis.reflow(target);
        } else {
            self.value_axis.reflow(target);
        }
    }

    /// Moves each axis so that its line passes through the crossing value of
    /// the other one.
    fn align_axes(&mut self) {
        let (axis_x, axis_y) = (self.axis_x(), self.axis_y());
        let cross_y = axis_y.value_slot(None);
        let cross_x = axis_x.value_slot(None);
        let mut box_y = axis_y.rect();
        let mut box_x = axis_x.rect();
        box_y.translate(cross_x.x1 - cross_y.x1, 0.0);
        box_x.translate(0.0, cross_y.y1 - cross_x.y1);

        self.reflow_axis_y(box_y);
        self.reflow_axis_x(box_x);
    }
}

/// Splits the axes into (horizontal, vertical).
fn orient<'a>(
    category_axis: &'a CategoryAxis,
    value_axis: &'a NumericAxis,
    inverted: bool,
) -> (&'a dyn Axis, &'a dyn Axis) {
    if inverted {
        (value_axis, category_axis)
    } else {
        (category_axis, value_axis)
    }
}

/// Grid lines of `axis`, spanning the major ticks of `secondary`. The line
/// that coincides with the crossing axis is left out.
fn render_grid_lines(view: &mut dyn View, axis: &dyn Axis, secondary: &dyn Axis) -> Vec<Primitive> {
    let boundaries = secondary.major_ticks();
    let (Some(&start), Some(&end)) = (boundaries.first(), boundaries.last()) else {
        return Vec::new();
    };
    let vertical = axis.is_vertical();
    let crossing = axis.value_slot(None);
    let crossing_pos = round(if vertical { crossing.y1 } else { crossing.x1 }, COORD_PRECISION);

    let options = axis.options();
    let major_visible = axis.major_grid_visible();
    let major = axis.major_ticks();
    let mut lines: Vec<(f64, &GridLineOptions)> = Vec::new();
    if major_visible {
        lines.extend(major.iter().map(|&pos| (pos, &options.major_grid_lines)));
    }
    if axis.minor_grid_visible() {
        lines.extend(
            axis.minor_ticks()
                .into_iter()
                .filter(|pos| !(major_visible && major.contains(pos)))
                .map(|pos| (pos, &options.minor_grid_lines)),
        );
    }

    lines
        .into_iter()
        .filter(|(pos, _)| round(*pos, COORD_PRECISION) != crossing_pos)
        .map(|(pos, line)| {
            let style = ShapeStyle::stroked(&line.color, line.width);
            if vertical {
                view.create_line(start, pos, end, pos, style)
            } else {
                view.create_line(pos, start, pos, end, style)
            }
        })
        .collect()
}

impl ChartElement for PlotArea {
    fn reflow(&mut self, target: Rect) {
        let mut plot_box = target;
        plot_box.unpad(Spacing::from(self.options.margin));

        self.reflow_axis_y(plot_box);
        self.reflow_axis_x(plot_box);
        self.align_axes();

        // Aligning can push the axes out of the plot box; pull them back in
        // and shorten them by the overflow.
        let box_y = self.axis_y().rect();
        let box_x = self.axis_x().rect();
        let mut axis_box = box_y;
        axis_box.wrap(&box_x);
        let overflow_y = axis_box.height() - plot_box.height();
        let overflow_x = axis_box.width() - plot_box.width();
        let offset_x = plot_box.x1 - axis_box.x1;
        let offset_y = plot_box.y1 - axis_box.y1;

        let mut fitted_y = box_y;
        fitted_y.translate(offset_x, offset_y).shrink(0.0, overflow_y);
        let mut fitted_x = box_x;
        fitted_x.translate(offset_x, offset_y).shrink(overflow_x, 0.0);
        self.reflow_axis_y(fitted_y);
        self.reflow_axis_x(fitted_x);
        self.align_axes();

        let (axis_x, axis_y) = orient(&self.category_axis, &self.value_axis, self.inverted);
        if let Some(chart) = self.bar_chart.as_mut() {
            chart.reflow_with_axes(plot_box, axis_x, axis_y);
        }
        if let Some(chart) = self.line_chart.as_mut() {
            chart.reflow_with_axes(plot_box, axis_x, axis_y);
        }

        let mut rect = axis_x.line_box();
        rect.wrap(&axis_y.line_box());
        self.rect = rect;
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        let (axis_x, axis_y) = (self.axis_x(), self.axis_y());
        let mut elements = render_grid_lines(view, axis_y, axis_x);
        elements.extend(render_grid_lines(view, axis_x, axis_y));

        if let Some(chart) = &self.bar_chart {
            elements.extend(chart.view_elements(view, ids));
        }
        if let Some(chart) = &self.line_chart {
            elements.extend(chart.view_elements(view, ids));
        }
        elements.extend(axis_y.view_elements(view, ids));
        elements.extend(axis_x.view_elements(view, ids));

        if !self.options.background.is_empty() {
            let style = ShapeStyle::filled(Paint::color(&self.options.background)).with_z_index(-1);
            elements.push(view.create_rect(self.rect, style));
        }
        let border = &self.options.border;
        if border.width > 0.0 {
            let style = ShapeStyle::stroked(border.color_or_black(), border.width);
            elements.push(view.create_rect(self.rect, style));
        }
        elements
    }

    fn dump(&self) -> NodeDump {
        let mut children = Vec::new();
        if let Some(chart) = &self.bar_chart {
            children.push(chart.dump());
        }
        if let Some(chart) = &self.line_chart {
            children.push(chart.dump());
        }
        children.push(self.axis_y().dump());
        children.push(self.axis_x().dump());
        NodeDump::new("plot-area", self.rect).with_children(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::text_metrics::TextMeasurer;
    use crate::view::SvgView;
    use approx::assert_abs_diff_eq;

    const TARGET: Rect = Rect::new(0.0, 0.0, 600.0, 400.0);

    fn plot_area(json: &str, measurer: &mut TextMeasurer) -> PlotArea {
        let config = parse_config(json).expect("config");
        let series = config.resolve_series();
        let mut ctx = BuildContext::new(measurer);
        let mut plot_area = PlotArea::new(&mut ctx, &config, &series);
        plot_area.reflow(TARGET);
        plot_area
    }

    #[test]
    fn column_axes_meet_at_zero() {
        let mut measurer = TextMeasurer::default();
        let plot_area = plot_area(
            r#"{ "categoryAxis": { "categories": ["A", "B", "C"] },
                 "series": [{ "type": "column", "data": [-10, 20, 30] }] }"#,
            &mut measurer,
        );
        assert!(!plot_area.is_inverted());
        let value_line = plot_area.value_axis().line_box();
        let category_line = plot_area.category_axis().line_box();
        let zero = plot_area.value_axis().value_slot(Some(0.0));

        assert_abs_diff_eq!(value_line.x1, category_line.x1, epsilon = 1e-6);
        assert_abs_diff_eq!(category_line.y1, zero.y1, epsilon = 1e-6);
    }

    #[test]
    fn axes_stay_inside_the_target() {
        let mut measurer = TextMeasurer::default();
        let plot_area = plot_area(
            r#"{ "categoryAxis": { "categories": ["Jan", "Feb"] },
                 "series": [{ "type": "column", "data": [5, 8] }] }"#,
            &mut measurer,
        );
        for rect in [plot_area.axis_x().rect(), plot_area.axis_y().rect()] {
            assert!(rect.x1 >= TARGET.x1 - 1e-6);
            assert!(rect.y1 >= TARGET.y1 - 1e-6);
            assert!(rect.x2 <= TARGET.x2 + 1e-6);
            assert!(rect.y2 <= TARGET.y2 + 1e-6);
        }
    }

    #[test]
    fn bar_series_invert_the_axes() {
        let mut measurer = TextMeasurer::default();
        let plot_area = plot_area(
            r#"{ "categoryAxis": { "categories": ["A", "B"] },
                 "series": [{ "type": "bar", "data": [1, 2] }] }"#,
            &mut measurer,
        );
        assert!(plot_area.is_inverted());
        assert!(plot_area.category_axis().is_vertical());
        assert!(!plot_area.value_axis().is_vertical());
        assert!(!plot_area.bar_chart().expect("bars").is_vertical());
    }

    #[test]
    fn categories_are_padded_to_the_longest_series() {
        let mut measurer = TextMeasurer::default();
        let plot_area = plot_area(
            r#"{ "categoryAxis": { "categories": ["A"] },
                 "series": [{ "type": "column", "data": [1, 2, 3] }] }"#,
            &mut measurer,
        );
        assert_eq!(plot_area.category_axis().categories(), ["A", "", ""]);
    }

    #[test]
    fn line_range_includes_the_default_floor() {
        let mut measurer = TextMeasurer::default();
        let plot_area = plot_area(
            r#"{ "series": [{ "type": "line", "data": [10, 20] }] }"#,
            &mut measurer,
        );
        assert_eq!(plot_area.value_axis().min(), 0.0);
        assert!(plot_area.value_axis().max() >= 20.0);
        assert!(plot_area.line_chart().is_some());
        assert!(plot_area.bar_chart().is_none());
    }

    #[test]
    fn grid_skips_the_line_under_the_category_axis() {
        let mut measurer = TextMeasurer::default();
        let plot_area = plot_area(
            r#"{ "categoryAxis": { "categories": ["A", "B"] },
                 "series": [{ "type": "column", "data": [5, 10] }] }"#,
            &mut measurer,
        );
        let mut view = SvgView::new(600.0, 400.0);
        let lines = render_grid_lines(&mut view, plot_area.axis_y(), plot_area.axis_x());
        assert_eq!(lines.len(), plot_area.value_axis().major_ticks().len() - 1);

        let category_grid = render_grid_lines(&mut view, plot_area.axis_x(), plot_area.axis_y());
        assert!(category_grid.is_empty());
    }

    #[test]
    fn invisible_background_is_not_drawn() {
        let mut measurer = TextMeasurer::default();
        let plain = plot_area(r#"{ "series": [{ "data": [1] }] }"#, &mut measurer);
        let painted = plot_area(
            r##"{ "plotArea": { "background": "#eee", "border": { "width": 1 } },
                 "series": [{ "data": [1] }] }"##,
            &mut measurer,
        );
        let mut view = SvgView::new(600.0, 400.0);
        let mut ids = IdScope::default();
        let plain_count = plain.view_elements(&mut view, &mut ids).len();
        let painted_count = painted.view_elements(&mut view, &mut ids).len();
        assert_eq!(painted_count, plain_count + 2);
    }
}
