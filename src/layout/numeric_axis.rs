use super::axis::AxisBase;
use super::{Axis, AxisKind, BuildContext, ChartElement, IdScope};
use crate::config::{AxisOptions, ValueAxisOptions};
use crate::format::{format_number, format_value};
use crate::geometry::{Axis as Direction, COORD_PRECISION, DEFAULT_PRECISION, Rect, ceil_to, floor_to, round};
use crate::layout_dump::NodeDump;
use crate::view::{Primitive, View};

/// Padding added beyond the data range, as a share of the range.
const RANGE_PADDING: f64 = 0.05;
/// Padding used instead when the data straddles zero.
const ZERO_CROSSING_PADDING: f64 = 0.5;
/// Largest relative spread for which a one-signed range is pulled to zero.
const NEAR_ZERO_SPREAD: f64 = 0.2;
const MINOR_DIVISIONS: f64 = 5.0;

/// Extends a one-signed range to zero when its spread is small compared to
/// its magnitude.
fn clamp_near_zero(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        return if min >= 0.0 { (0.0, max) } else { (min, 0.0) };
    }
    if min >= 0.0 && max > 0.0 && (max - min) / max <= NEAR_ZERO_SPREAD {
        return (0.0, max);
    }
    if max <= 0.0 && min < 0.0 && ((max - min) / min).abs() <= NEAR_ZERO_SPREAD {
        return (min, 0.0);
    }
    (min, max)
}

fn range_padding(min: f64, max: f64) -> f64 {
    if min < 0.0 && max > 0.0 {
        ZERO_CROSSING_PADDING
    } else {
        RANGE_PADDING
    }
}

/// Round step between major ticks for the given data range.
pub fn auto_major_unit(min: f64, max: f64) -> f64 {
    let mut diff = max - min;
    if diff == 0.0 {
        if max == 0.0 {
            return 0.1;
        }
        diff = max.abs();
    }

    let scale = 10f64.powf(diff.log10().floor());
    let relative = round(diff / scale, DEFAULT_PRECISION);
    let multiplier = if relative < 1.904762 {
        0.2
    } else if relative < 4.761904 {
        0.5
    } else if relative < 9.523809 {
        1.0
    } else {
        2.0
    };
    round(scale * multiplier, DEFAULT_PRECISION)
}

pub fn auto_axis_max(min: f64, max: f64) -> f64 {
    let (lo, hi) = clamp_near_zero(min, max);
    if lo == 0.0 && hi == 0.0 {
        return 1.0;
    }
    if hi == 0.0 {
        return 0.0;
    }
    let padding = range_padding(lo, hi);
    ceil_to(hi + padding * (hi - lo), auto_major_unit(lo, hi))
}

pub fn auto_axis_min(min: f64, max: f64) -> f64 {
    let (lo, hi) = clamp_near_zero(min, max);
    if lo == 0.0 {
        return 0.0;
    }
    let padding = range_padding(lo, hi);
    floor_to(lo - padding * (hi - lo), auto_major_unit(lo, hi))
}

/// Pulls apart a degenerate range: a positive value gets a zero floor,
/// anything else a ceiling of 1.
fn separate_equal_bounds(min: f64, max: f64) -> (f64, f64) {
    if min != max {
        (min, max)
    } else if min > 0.0 {
        (0.0, max)
    } else {
        (min, 1.0)
    }
}

/// Resolved `(min, max, major_unit)` from the observed data range and any
/// user limits.
fn resolve_scale(series_min: f64, series_max: f64, options: &ValueAxisOptions) -> (f64, f64, f64) {
    let (data_min, data_max) = separate_equal_bounds(series_min, series_max);

    let auto_min = auto_axis_min(data_min, data_max);
    let auto_max = auto_axis_max(data_min, data_max);

    match options.major_unit.filter(|unit| *unit > 0.0) {
        Some(unit) => {
            let (min, max) = separate_equal_bounds(
                options.min.unwrap_or_else(|| floor_to(auto_min, unit)),
                options.max.unwrap_or_else(|| ceil_to(auto_max, unit)),
            );
            (min, max, unit)
        }
        None if options.min.is_some() || options.max.is_some() => {
            let (min, max) = separate_equal_bounds(
                options.min.unwrap_or(auto_min),
                options.max.unwrap_or(auto_max),
            );
            (min, max, auto_major_unit(min, max))
        }
        None => {
            let (lo, hi) = clamp_near_zero(data_min, data_max);
            (auto_min, auto_max, auto_major_unit(lo, hi))
        }
    }
}

/// Number of steps of `step` that fit the range, counting both ends.
fn divisions(range: f64, step: f64) -> usize {
    if range <= 0.0 || step <= 0.0 {
        return 0;
    }
    round(range / step, COORD_PRECISION).floor() as usize + 1
}

/// A linear value axis.
pub struct NumericAxis {
    base: AxisBase,
    min: f64,
    max: f64,
    major_unit: f64,
}

impl NumericAxis {
    pub fn new(
        ctx: &mut BuildContext<'_>,
        series_min: f64,
        series_max: f64,
        options: &ValueAxisOptions,
        vertical: bool,
    ) -> Self {
        let (min, max, major_unit) = resolve_scale(series_min, series_max, options);
        tracing::debug!(min, max, major_unit, "value axis scale");

        let count = divisions(max - min, major_unit);
        let mut labels = Vec::with_capacity(count);
        let mut value = min;
        for _ in 0..count {
            labels.push(match &options.axis.labels.format {
                Some(template) => format_value(template, value),
                None => format_number(value),
            });
            value = round(value + major_unit, DEFAULT_PRECISION);
        }

        Self {
            base: AxisBase::new(ctx, AxisKind::Numeric, &options.axis, vertical, labels),
            min,
            max,
            major_unit,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn major_unit(&self) -> f64 {
        self.major_unit
    }

    fn direction(&self) -> Direction {
        if self.base.vertical { Direction::Y } else { Direction::X }
    }

    fn ticks(&self, unit: f64) -> Vec<f64> {
        let line = self.line_box();
        let range = self.max - self.min;
        let count = divisions(range, unit);
        if count == 0 {
            return Vec::new();
        }
        let step = unit * line.size(self.direction()) / range;

        let mut ticks = Vec::with_capacity(count);
        if self.base.vertical {
            let mut pos = line.y2;
            for _ in 0..count {
                ticks.push(round(pos, COORD_PRECISION));
                pos -= step;
            }
            ticks.reverse();
        } else {
            let mut pos = line.x1;
            for _ in 0..count {
                ticks.push(round(pos, COORD_PRECISION));
                pos += step;
            }
        }
        ticks
    }

    /// Pixel band between two values, each clamped to the axis range. A
    /// missing value stands for the crossing value.
    pub fn slot(&self, a: Option<f64>, b: Option<f64>) -> Rect {
        let crossing = self.crossing_value();
        let (lo, hi) = (self.min.min(self.max), self.max.max(self.min));
        let clamp = |value: Option<f64>| value.unwrap_or(crossing).clamp(lo, hi);
        let (a, b) = (clamp(a), clamp(b));

        let line = self.line_box();
        let range = self.max - self.min;
        let scale = if range == 0.0 {
            0.0
        } else {
            line.size(self.direction()) / range
        };

        let mut slot = Rect::new(line.x1, line.y1, line.x1, line.y1);
        if self.base.vertical {
            slot.y1 = line.y1 + scale * (self.max - a.max(b));
            slot.y2 = line.y1 + scale * (self.max - a.min(b));
        } else {
            slot.x1 = line.x1 + scale * (a.min(b) - self.min);
            slot.x2 = line.x1 + scale * (a.max(b) - self.min);
        }
        slot
    }
}

impl ChartElement for NumericAxis {
    fn reflow(&mut self, target: Rect) {
        self.base.rect = self.base.axis_box(target);
        let ticks = self.major_ticks();
        self.base.arrange_labels(&ticks, false);
    }

    fn rect(&self) -> Rect {
        self.base.rect
    }

    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        let major = self.major_ticks();
        let minor = self.minor_ticks();
        let rect = self.base.rect;
        let (first, last) = (
            minor.first().copied().unwrap_or_default(),
            minor.last().copied().unwrap_or_default(),
        );
        let line = if self.base.vertical {
            (rect.x2, first, rect.x2, last)
        } else {
            (first, rect.y1, last, rect.y1)
        };
        self.base.view_elements(view, ids, line, &major, &minor)
    }

    fn dump(&self) -> NodeDump {
        self.base.dump()
    }
}

impl Axis for NumericAxis {
    fn kind(&self) -> AxisKind {
        AxisKind::Numeric
    }

    fn options(&self) -> &AxisOptions {
        &self.base.options
    }

    fn is_vertical(&self) -> bool {
        self.base.vertical
    }

    fn major_ticks(&self) -> Vec<f64> {
        self.ticks(self.major_unit)
    }

    fn minor_ticks(&self) -> Vec<f64> {
        self.ticks(self.major_unit / MINOR_DIVISIONS)
    }

    /// The axis edge of the box, inset by half of the first and last label so
    /// that the end labels stay inside the box.
    fn line_box(&self) -> Rect {
        let rect = self.base.rect;
        let labels = &self.base.labels;
        let (start, end) = match (labels.first(), labels.last()) {
            (Some(first), Some(last)) if labels.len() > 1 => {
                let direction = self.direction();
                (first.rect().size(direction) / 2.0, last.rect().size(direction) / 2.0)
            }
            _ => (0.0, 0.0),
        };
        if self.base.vertical {
            Rect::new(rect.x2, rect.y1 + start, rect.x2, rect.y2 - end)
        } else {
            Rect::new(rect.x1 + start, rect.y1, rect.x2 - end, rect.y1)
        }
    }

    fn crossing_value(&self) -> f64 {
        self.base.options.axis_crossing_value.unwrap_or(0.0)
    }

    fn value_slot(&self, value: Option<f64>) -> Rect {
        self.slot(value, None)
    }
}
