use super::categorical::{StackTotals, traverse_data_points};
use super::{
    Axis, BarLabel, BarLabelPosition, BuildContext, CategoricalChart, ChartElement, ClusterLayout,
    DataPointRef, IdScope, StackLayout, ValueRange, union_of,
};
use crate::color::Color;
use crate::config::{BAR_BORDER_BRIGHTNESS, BorderOptions, SeriesOptions};
use crate::geometry::Rect;
use crate::layout_dump::NodeDump;
use crate::view::{Paint, Primitive, ShapeStyle, View};

/// Growth direction of a bar, in degrees, handed to the overlay effect.
const VERTICAL_NORMAL_ANGLE: f64 = 0.0;
const HORIZONTAL_NORMAL_ANGLE: f64 = 90.0;

/// A single bar or column.
#[derive(Debug, Clone)]
pub struct Bar {
    id: String,
    point: DataPointRef,
    color: String,
    opacity: f64,
    overlay: Option<String>,
    border: BorderOptions,
    vertical: bool,
    label: Option<BarLabel>,
    rect: Rect,
}

impl Bar {
    pub fn new(
        id: String,
        point: DataPointRef,
        series: &SeriesOptions,
        vertical: bool,
        label: Option<BarLabel>,
    ) -> Self {
        Self {
            id,
            point,
            color: series.color.clone(),
            opacity: series.opacity,
            overlay: series.overlay.clone(),
            border: series.border.clone(),
            vertical,
            label,
            rect: Rect::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value(&self) -> Option<f64> {
        self.point.value
    }

    pub fn label(&self) -> Option<&BarLabel> {
        self.label.as_ref()
    }

    pub fn set_above_axis(&mut self, above_axis: bool) {
        if let Some(label) = &mut self.label {
            label.set_above_axis(above_axis);
        }
    }

    fn border_color(&self) -> String {
        match &self.border.color {
            Some(color) => color.clone(),
            None => Color::parse(&self.color)
                .brightness(BAR_BORDER_BRIGHTNESS)
                .to_hex(),
        }
    }
}

impl ChartElement for Bar {
    fn reflow(&mut self, target: Rect) {
        self.rect = target;
        if let Some(label) = &mut self.label {
            label.reflow(target);
        }
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    /// Missing values draw nothing.
    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        if self.point.value.is_none() {
            return Vec::new();
        }

        let style = ShapeStyle {
            id: Some(self.id.clone()),
            fill: Paint::color(&self.color),
            fill_opacity: self.opacity,
            stroke_opacity: self.opacity,
            overlay: self.overlay.clone(),
            normal_angle: if self.vertical {
                VERTICAL_NORMAL_ANGLE
            } else {
                HORIZONTAL_NORMAL_ANGLE
            },
            ..ShapeStyle::default()
        }
        .with_border(&self.border_color(), self.border.width);

        let mut elements = vec![view.create_rect(self.rect, style)];
        ids.register(&self.id, &self.point);

        if let Some(label) = &self.label {
            elements.extend(label.view_elements(view, ids));
            if let Some(id) = label.id() {
                ids.register(id, &self.point);
            }
        }
        elements
    }

    fn dump(&self) -> NodeDump {
        let mut dump = NodeDump::new("bar", self.rect).with_id(Some(self.id.clone()));
        if let Some(label) = &self.label {
            dump = dump.with_children(vec![label.dump()]);
        }
        dump
    }
}

/// Positive bars stacked away from the axis one way, negative bars the other.
#[derive(Debug, Clone)]
pub struct BarStack {
    positive: StackLayout<Bar>,
    negative: StackLayout<Bar>,
    rect: Rect,
}

impl BarStack {
    fn new(vertical: bool) -> Self {
        Self {
            positive: StackLayout::new(vertical, false),
            negative: StackLayout::new(vertical, true),
            rect: Rect::default(),
        }
    }

    fn push(&mut self, bar: Bar) {
        if bar.value().is_some_and(|value| value > 0.0) {
            self.positive.push(bar);
        } else {
            self.negative.push(bar);
        }
    }

    fn stacks(&self) -> impl Iterator<Item = &StackLayout<Bar>> {
        [&self.positive, &self.negative].into_iter()
    }
}

impl ChartElement for BarStack {
    fn reflow(&mut self, target: Rect) {
        for stack in [&mut self.positive, &mut self.negative] {
            if !stack.is_empty() {
                stack.reflow(target);
            }
        }
        self.rect = union_of(
            self.stacks()
                .filter(|stack| !stack.is_empty())
                .map(ChartElement::rect),
        )
        .unwrap_or(target);
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        let mut elements = self.positive.view_elements(view, ids);
        elements.extend(self.negative.view_elements(view, ids));
        elements
    }

    fn dump(&self) -> NodeDump {
        NodeDump::new("bar-stack", self.rect)
            .with_children(self.stacks().map(ChartElement::dump).collect())
    }
}

/// What a category cluster holds: one bar per series, or a single stack.
#[derive(Debug, Clone)]
pub enum BarGroup {
    Single(Bar),
    Stacked(BarStack),
}

impl BarGroup {
    fn bars_mut(&mut self) -> Vec<&mut Bar> {
        match self {
            BarGroup::Single(bar) => vec![bar],
            BarGroup::Stacked(stack) => stack
                .positive
                .children_mut()
                .iter_mut()
                .chain(stack.negative.children_mut().iter_mut())
                .collect(),
        }
    }

    fn as_element(&self) -> &dyn ChartElement {
        match self {
            BarGroup::Single(bar) => bar,
            BarGroup::Stacked(stack) => stack,
        }
    }

    fn as_element_mut(&mut self) -> &mut dyn ChartElement {
        match self {
            BarGroup::Single(bar) => bar,
            BarGroup::Stacked(stack) => stack,
        }
    }
}

impl ChartElement for BarGroup {
    fn reflow(&mut self, target: Rect) {
        self.as_element_mut().reflow(target);
    }

    fn rect(&self) -> Rect {
        self.as_element().rect()
    }

    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        self.as_element().view_elements(view, ids)
    }

    fn dump(&self) -> NodeDump {
        self.as_element().dump()
    }
}

/// Bars for every bar or column series, clustered or stacked per category.
pub struct BarChart {
    vertical: bool,
    stacked: bool,
    clusters: Vec<ClusterLayout<BarGroup>>,
    range: Option<ValueRange>,
    rect: Rect,
}

impl BarChart {
    /// `vertical` draws columns; gap, spacing and stacking come from the
    /// first series.
    pub fn new(
        ctx: &mut BuildContext<'_>,
        series: &[SeriesOptions],
        categories: &[String],
        vertical: bool,
    ) -> Self {
        let first = series.first();
        let stacked = first.is_some_and(|series| series.stack);
        let gap = first.map_or(0.0, |series| series.gap);
        let spacing = first.map_or(0.0, |series| series.spacing);

        let mut clusters: Vec<ClusterLayout<BarGroup>> = Vec::new();
        let mut totals = StackTotals::default();
        let mut values = Vec::new();

        traverse_data_points(series, |point| {
            if clusters.len() <= point.category_index {
                let mut cluster = ClusterLayout::new(!vertical, gap, spacing);
                if stacked {
                    cluster.push(BarGroup::Stacked(BarStack::new(vertical)));
                }
                clusters.push(cluster);
            }

            if let Some(value) = point.value {
                values.push(value);
                if stacked {
                    totals.add(point.category_index, value);
                }
            }

            let id = ctx.next_id();
            let label = Self::create_label(ctx, point.value, point.series, vertical, stacked);
            let bar = Bar::new(id, point.reference(categories), point.series, vertical, label);

            let cluster = &mut clusters[point.category_index];
            match cluster.children_mut().first_mut() {
                Some(BarGroup::Stacked(stack)) => stack.push(bar),
                _ => cluster.push(BarGroup::Single(bar)),
            }
        });

        let range = if values.is_empty() {
            None
        } else if stacked {
            Some(totals.range())
        } else {
            ValueRange::of(values)
        };
        tracing::debug!(
            categories = clusters.len(),
            stacked,
            ?range,
            "built bar chart"
        );

        Self {
            vertical,
            stacked,
            clusters,
            range,
            rect: Rect::default(),
        }
    }

    /// Labels are only made for defined, non-zero values. Outside labels
    /// move inside on stacked bars.
    fn create_label(
        ctx: &mut BuildContext<'_>,
        value: Option<f64>,
        series: &SeriesOptions,
        vertical: bool,
        stacked: bool,
    ) -> Option<BarLabel> {
        let options = &series.labels;
        let value = value.filter(|value| *value != 0.0)?;
        if !options.visible {
            return None;
        }
        let mut position =
            BarLabelPosition::from_token(&options.position).unwrap_or_default();
        if stacked && position == BarLabelPosition::OutsideEnd {
            position = BarLabelPosition::InsideEnd;
        }
        let id = ctx.next_id();
        Some(BarLabel::new(ctx, value, options, position, vertical, id))
    }

    pub fn is_vertical(&self) -> bool {
        self.vertical
    }

    pub fn is_stacked(&self) -> bool {
        self.stacked
    }

    pub fn clusters(&self) -> &[ClusterLayout<BarGroup>] {
        &self.clusters
    }

    /// Every bar in category order.
    pub fn bars(&self) -> Vec<&Bar> {
        self.clusters
            .iter()
            .flat_map(|cluster| cluster.children())
            .flat_map(|group| match group {
                BarGroup::Single(bar) => vec![bar],
                BarGroup::Stacked(stack) => stack
                    .stacks()
                    .flat_map(|stack| stack.children())
                    .collect(),
            })
            .collect()
    }
}

impl ChartElement for BarChart {
    fn reflow(&mut self, target: Rect) {
        self.rect = target;
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        self.clusters
            .iter()
            .flat_map(|cluster| cluster.view_elements(view, ids))
            .collect()
    }

    fn dump(&self) -> NodeDump {
        NodeDump::new("bar-chart", self.rect)
            .with_children(self.clusters.iter().map(ChartElement::dump).collect())
    }
}

impl CategoricalChart for BarChart {
    fn value_range(&self) -> Option<ValueRange> {
        self.range
    }

    fn reflow_with_axes(&mut self, target: Rect, axis_x: &dyn Axis, axis_y: &dyn Axis) {
        self.rect = target;
        let (category_axis, value_axis) = if self.vertical {
            (axis_x, axis_y)
        } else {
            (axis_y, axis_x)
        };
        let crossing = value_axis.crossing_value();

        for (category_index, cluster) in self.clusters.iter_mut().enumerate() {
            let category_slot = category_axis.value_slot(Some(category_index as f64));

            for group in cluster.children_mut() {
                for bar in group.bars_mut() {
                    let value = bar.value();
                    let value_slot = value_axis.value_slot(value);
                    let (slot_x, slot_y) = if self.vertical {
                        (category_slot, value_slot)
                    } else {
                        (value_slot, category_slot)
                    };
                    bar.set_above_axis(value.unwrap_or(crossing) >= crossing);
                    bar.reflow(Rect::new(slot_x.x1, slot_y.y1, slot_x.x2, slot_y.y2));
                }
            }

            cluster.reflow(category_slot);
        }
    }
}
