//! The chart scene graph.
//!
//! Every node is built once from resolved options, receives its box during a
//! single `reflow` pass and then emits drawing primitives. The whole graph is
//! rebuilt on every refresh.

mod axis;
mod bar_chart;
mod bar_label;
mod category_axis;
mod categorical;
mod cluster;
mod element;
mod legend;
mod line_chart;
mod numeric_axis;
mod plot_area;
mod root;
mod title;

pub use axis::{Axis, AxisKind};
pub use bar_chart::{Bar, BarChart, BarGroup, BarStack};
pub use bar_label::{BarLabel, BarLabelPosition};
pub use category_axis::CategoryAxis;
pub use categorical::{CategoricalChart, ValueRange, categories_count};
pub use cluster::{ClusterLayout, StackLayout};
pub use element::{Align, BoxModel, BoxStyle, MarkerShape, ShapeElement, Text, TextBox};
pub use legend::{Legend, LegendPosition};
pub use line_chart::{LineChart, LinePoint};
pub use numeric_axis::{NumericAxis, auto_axis_max, auto_axis_min, auto_major_unit};
pub use plot_area::PlotArea;
pub use root::RootElement;
pub use title::Title;

use crate::geometry::Rect;
use crate::layout_dump::NodeDump;
use crate::text_metrics::{TextMeasurer, TextSize};
use crate::view::{Primitive, View};
use serde::Serialize;
use std::collections::BTreeMap;

/// A node of the scene graph.
pub trait ChartElement {
    /// Computes this node's box from the space offered by the parent.
    fn reflow(&mut self, target: Rect);

    fn rect(&self) -> Rect;

    /// Drawing primitives for this node and its children. Nodes that can be
    /// hit-tested record their ids in `ids` along the way.
    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive>;

    fn dump(&self) -> NodeDump;
}

/// Shared state while one scene graph is being built.
pub struct BuildContext<'a> {
    measurer: &'a mut TextMeasurer,
    next_id: u64,
}

impl<'a> BuildContext<'a> {
    pub fn new(measurer: &'a mut TextMeasurer) -> Self {
        Self {
            measurer,
            next_id: 0,
        }
    }

    pub fn measure(&mut self, text: &str, font: &str) -> TextSize {
        self.measurer.measure(text, font)
    }

    /// Element ids are `k` followed by 16 hex digits, counted per build so
    /// that identical charts produce identical markup.
    pub fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("k{:016x}", self.next_id)
    }
}

/// The data point behind a hit-testable element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPointRef {
    pub value: Option<f64>,
    pub category: Option<String>,
    pub series_index: usize,
    pub series_name: String,
}

/// Element id to data point table filled while primitives are emitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdScope {
    ids: BTreeMap<String, DataPointRef>,
}

impl IdScope {
    pub fn register(&mut self, id: &str, point: &DataPointRef) {
        self.ids.insert(id.to_string(), point.clone());
    }

    pub fn get(&self, id: &str) -> Option<&DataPointRef> {
        self.ids.get(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, DataPointRef> {
        self.ids
    }
}

/// Bounding union of the given boxes, `None` when there are none.
pub(crate) fn union_of(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().fold(None, |acc, rect| match acc {
        None => Some(rect),
        Some(mut union) => {
            union.wrap(&rect);
            Some(union)
        }
    })
}
