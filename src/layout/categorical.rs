use super::{Axis, ChartElement, DataPointRef};
use crate::config::SeriesOptions;
use crate::geometry::Rect;

/// Smallest and largest value a chart plots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Widens the range to cover `value`.
    pub fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn merge(self, other: ValueRange) -> ValueRange {
        ValueRange::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Folds optional values into a range, `None` when every value is missing.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<ValueRange> {
        values.into_iter().fold(None, |range, value| match range {
            None => Some(ValueRange::new(value, value)),
            Some(mut range) => {
                range.include(value);
                Some(range)
            }
        })
    }
}

/// Number of categories the series imply: the length of the longest one.
pub fn categories_count(series: &[SeriesOptions]) -> usize {
    series.iter().map(|series| series.data.len()).max().unwrap_or(0)
}

/// A chart drawn against a category axis and a value axis.
pub trait CategoricalChart: ChartElement {
    /// Range of the plotted values, `None` when the chart has no values.
    fn value_range(&self) -> Option<ValueRange>;

    /// Positions every point against the final axes.
    fn reflow_with_axes(&mut self, target: Rect, axis_x: &dyn Axis, axis_y: &dyn Axis);
}

/// One cell of the category by series matrix.
pub(crate) struct DataPoint<'a> {
    pub value: Option<f64>,
    pub category_index: usize,
    /// Position of the series within the chart's own series list.
    pub series_slot: usize,
    pub series: &'a SeriesOptions,
}

impl DataPoint<'_> {
    pub fn reference(&self, categories: &[String]) -> DataPointRef {
        DataPointRef {
            value: self.value,
            category: categories.get(self.category_index).cloned(),
            series_index: self.series.index,
            series_name: self.series.name.clone(),
        }
    }
}

/// Visits the data matrix category by category, series by series within a
/// category. Short series yield missing values for the trailing categories.
pub(crate) fn traverse_data_points<'a>(
    series: &'a [SeriesOptions],
    mut callback: impl FnMut(DataPoint<'a>),
) {
    for category_index in 0..categories_count(series) {
        for (series_slot, series) in series.iter().enumerate() {
            callback(DataPoint {
                value: series.data.get(category_index).copied().flatten(),
                category_index,
                series_slot,
                series,
            });
        }
    }
}

/// Running positive and negative totals per category, for stacked charts.
#[derive(Debug, Clone, Default)]
pub(crate) struct StackTotals {
    positive: Vec<f64>,
    negative: Vec<f64>,
}

impl StackTotals {
    /// Adds `value` to the positive total of its category when it is above
    /// zero, to the negative one otherwise.
    pub fn add(&mut self, category_index: usize, value: f64) {
        let totals = if value > 0.0 {
            &mut self.positive
        } else {
            &mut self.negative
        };
        if totals.len() <= category_index {
            totals.resize(category_index + 1, 0.0);
        }
        totals[category_index] += value;
    }

    /// Lowest negative total and highest positive total, both bounded by zero.
    pub fn range(&self) -> ValueRange {
        let min = self.negative.iter().copied().fold(0.0, f64::min);
        let max = self.positive.iter().copied().fold(0.0, f64::max);
        ValueRange::new(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn series(json: &str) -> Vec<SeriesOptions> {
        parse_config(json).expect("config").resolve_series()
    }

    #[test]
    fn traversal_walks_category_major_and_pads_short_series() {
        let series = series(r#"{ "series": [{ "data": [1, 2, 3] }, { "data": [4] }] }"#);
        let mut visited = Vec::new();
        traverse_data_points(&series, |point| {
            visited.push((point.category_index, point.series.index, point.value));
        });
        assert_eq!(
            visited,
            vec![
                (0, 0, Some(1.0)),
                (0, 1, Some(4.0)),
                (1, 0, Some(2.0)),
                (1, 1, None),
                (2, 0, Some(3.0)),
                (2, 1, None),
            ]
        );
        assert_eq!(categories_count(&series), 3);
    }

    #[test]
    fn stack_totals_split_by_sign() {
        let mut totals = StackTotals::default();
        totals.add(0, 3.0);
        totals.add(0, -2.0);
        totals.add(1, 4.0);
        totals.add(1, 1.0);
        assert_eq!(totals.range(), ValueRange::new(-2.0, 5.0));
    }

    #[test]
    fn range_of_nothing_is_none() {
        assert_eq!(ValueRange::of(Vec::new()), None);
        assert_eq!(
            ValueRange::of([3.0, -1.0, 2.0]),
            Some(ValueRange::new(-1.0, 3.0))
        );
    }
}
