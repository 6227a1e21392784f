use serde::Serialize;

/// Decimal places kept for pixel coordinates.
pub const COORD_PRECISION: i32 = 3;
/// Decimal places kept for axis values and units.
pub const DEFAULT_PRECISION: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "top" | "above" => Some(Self::Top),
            "bottom" | "below" => Some(Self::Bottom),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Edge::Top | Edge::Bottom => Axis::Y,
            Edge::Left | Edge::Right => Axis::X,
        }
    }
}

/// Independent insets for the four sides of a box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Spacing {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Spacing {
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn negate(self) -> Self {
        Self::new(-self.top, -self.right, -self.bottom, -self.left)
    }
}

impl From<f64> for Spacing {
    fn from(value: f64) -> Self {
        Spacing::uniform(value)
    }
}

/// Axis-aligned box given by two opposite corners.
///
/// No ordering is enforced between the corners: layout code routinely builds
/// boxes whose `x2` lies left of `x1` and relies on the signed width.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn size(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width(),
            Axis::Y => self.height(),
        }
    }

    /// Leading coordinate along `axis` (`x1` or `y1`).
    pub fn start(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x1,
            Axis::Y => self.y1,
        }
    }

    /// Trailing coordinate along `axis` (`x2` or `y2`).
    pub fn end(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x2,
            Axis::Y => self.y2,
        }
    }

    pub fn set_start(&mut self, axis: Axis, value: f64) -> &mut Self {
        match axis {
            Axis::X => self.x1 = value,
            Axis::Y => self.y1 = value,
        }
        self
    }

    pub fn set_end(&mut self, axis: Axis, value: f64) -> &mut Self {
        match axis {
            Axis::X => self.x2 = value,
            Axis::Y => self.y2 = value,
        }
        self
    }

    pub fn translate(&mut self, dx: f64, dy: f64) -> &mut Self {
        self.x1 += dx;
        self.x2 += dx;
        self.y1 += dy;
        self.y2 += dy;
        self
    }

    /// Repositions the leading corner at `(x, y)` keeping the size.
    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        let width = self.width();
        let height = self.height();
        self.x1 = x;
        self.y1 = y;
        self.x2 = x + width;
        self.y2 = y + height;
        self
    }

    /// Expands to the bounding union of both boxes.
    pub fn wrap(&mut self, other: &Rect) -> &mut Self {
        self.x1 = self.x1.min(other.x1);
        self.y1 = self.y1.min(other.y1);
        self.x2 = self.x2.max(other.x2);
        self.y2 = self.y2.max(other.y2);
        self
    }

    /// Copies the extents of `other` along `axis`, or along both axes for `None`.
    pub fn snap_to(&mut self, other: &Rect, axis: Option<Axis>) -> &mut Self {
        if axis != Some(Axis::Y) {
            self.x1 = other.x1;
            self.x2 = other.x2;
        }
        if axis != Some(Axis::X) {
            self.y1 = other.y1;
            self.y2 = other.y2;
        }
        self
    }

    /// Places this box against `edge` of `other`, outside of it, keeping the size.
    pub fn align_to(&mut self, other: &Rect, edge: Edge) -> &mut Self {
        let width = self.width();
        let height = self.height();
        let axis = edge.axis();
        let offset = self.size(axis);
        let start = match edge {
            Edge::Top | Edge::Left => other.start(axis) - offset,
            Edge::Bottom | Edge::Right => other.end(axis),
        };
        self.set_start(axis, start);
        self.x2 = self.x1 + width;
        self.y2 = self.y1 + height;
        self
    }

    pub fn shrink(&mut self, dw: f64, dh: f64) -> &mut Self {
        self.x2 -= dw;
        self.y2 -= dh;
        self
    }

    pub fn expand(&mut self, dw: f64, dh: f64) -> &mut Self {
        self.shrink(-dw, -dh)
    }

    pub fn pad(&mut self, spacing: impl Into<Spacing>) -> &mut Self {
        let spacing = spacing.into();
        self.x1 -= spacing.left;
        self.x2 += spacing.right;
        self.y1 -= spacing.top;
        self.y2 += spacing.bottom;
        self
    }

    pub fn unpad(&mut self, spacing: impl Into<Spacing>) -> &mut Self {
        self.pad(spacing.into().negate())
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.x1 + self.width() / 2.0,
            self.y1 + self.height() / 2.0,
        )
    }

    /// Corner points of the outline, closed back onto the first corner.
    pub fn outline(&self) -> Vec<(f64, f64)> {
        vec![
            (self.x1, self.y1),
            (self.x2, self.y1),
            (self.x2, self.y2),
            (self.x1, self.y2),
            (self.x1, self.y1),
        ]
    }

    /// Largest piece of `self` that is not covered by `taken`.
    ///
    /// Both boxes are split into the nine cells of their shared grid and the
    /// first non-empty cell adjacent to the overlap is returned. Identical boxes
    /// yield `taken` itself.
    pub fn difference(&self, taken: &Rect) -> Option<Rect> {
        let r = self;
        let s = taken;
        if r == s {
            return Some(*s);
        }

        let a = r.x1.min(s.x1);
        let b = r.x1.max(s.x1);
        let c = r.x2.min(s.x2);
        let d = r.x2.max(s.x2);
        let e = r.y1.min(s.y1);
        let f = r.y1.max(s.y1);
        let g = r.y2.min(s.y2);
        let h = r.y2.max(s.y2);

        let mut cells = vec![
            Rect::new(b, e, c, f),
            Rect::new(a, f, b, g),
            Rect::new(c, f, d, g),
            Rect::new(b, g, c, h),
        ];
        let origin_corner = (r.x1 == a && r.y1 == e) || (s.x1 == a && s.y1 == e);
        if origin_corner {
            cells.push(Rect::new(a, e, b, f));
            cells.push(Rect::new(c, g, d, h));
        } else {
            cells.push(Rect::new(c, e, d, f));
            cells.push(Rect::new(a, g, b, h));
        }

        cells
            .into_iter()
            .find(|cell| cell.width() > 0.0 && cell.height() > 0.0)
    }
}

pub fn round(value: f64, precision: i32) -> f64 {
    let power = 10f64.powi(precision);
    (value * power).round() / power
}

/// Rounds `value` up to the next multiple of `step`.
pub fn ceil_to(value: f64, step: f64) -> f64 {
    round((value / step).ceil() * step, DEFAULT_PRECISION)
}

/// Rounds `value` down to the previous multiple of `step`.
pub fn floor_to(value: f64, step: f64) -> f64 {
    round((value / step).floor() * step, DEFAULT_PRECISION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn translate_moves_both_corners() {
        let mut rect = Rect::new(0.0, 0.0, 10.0, 5.0);
        rect.translate(3.0, -2.0);
        assert_eq!(rect, Rect::new(3.0, -2.0, 13.0, 3.0));
    }

    #[test]
    fn move_to_keeps_size() {
        let mut rect = Rect::new(5.0, 5.0, 15.0, 25.0);
        rect.move_to(0.0, 100.0);
        assert_eq!(rect, Rect::new(0.0, 100.0, 10.0, 120.0));
    }

    #[test]
    fn align_to_bottom_stacks_below() {
        let anchor = Rect::new(0.0, 0.0, 50.0, 20.0);
        let mut rect = Rect::new(7.0, 7.0, 17.0, 12.0);
        rect.align_to(&anchor, Edge::Bottom);
        assert_eq!(rect, Rect::new(7.0, 20.0, 17.0, 25.0));
    }

    #[test]
    fn align_to_top_and_left_place_outside() {
        let anchor = Rect::new(10.0, 10.0, 50.0, 20.0);
        let mut above = Rect::new(0.0, 0.0, 4.0, 6.0);
        above.align_to(&anchor, Edge::Top);
        assert_eq!(above.y1, 4.0);
        assert_eq!(above.y2, 10.0);

        let mut left = Rect::new(0.0, 0.0, 4.0, 6.0);
        left.align_to(&anchor, Edge::Left);
        assert_eq!(left.x1, 6.0);
        assert_eq!(left.x2, 10.0);
    }

    #[test]
    fn snap_to_single_axis() {
        let target = Rect::new(100.0, 200.0, 300.0, 400.0);
        let mut rect = Rect::new(0.0, 0.0, 1.0, 1.0);
        rect.snap_to(&target, Some(Axis::X));
        assert_eq!(rect, Rect::new(100.0, 0.0, 300.0, 1.0));
        rect.snap_to(&target, None);
        assert_eq!(rect, target);
    }

    #[test]
    fn pad_uses_independent_insets() {
        let mut rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        rect.pad(Spacing::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(rect, Rect::new(6.0, 9.0, 22.0, 23.0));
    }

    #[test]
    fn difference_takes_space_below_a_header() {
        let full = Rect::new(0.0, 0.0, 600.0, 400.0);
        let header = Rect::new(0.0, 0.0, 600.0, 30.0);
        let rest = full.difference(&header).unwrap();
        assert_eq!(rest, Rect::new(0.0, 30.0, 600.0, 400.0));
    }

    #[test]
    fn difference_takes_space_left_of_a_sidebar() {
        let full = Rect::new(0.0, 0.0, 600.0, 400.0);
        let sidebar = Rect::new(500.0, 0.0, 600.0, 400.0);
        let rest = full.difference(&sidebar).unwrap();
        assert_eq!(rest, Rect::new(0.0, 0.0, 500.0, 400.0));
    }

    #[test]
    fn step_rounding_snaps_outward() {
        assert_abs_diff_eq!(ceil_to(10.5, 5.0), 15.0);
        assert_abs_diff_eq!(floor_to(-2.5, 1.0), -3.0);
        assert_abs_diff_eq!(ceil_to(0.30000000000000004, 0.1), 0.4, epsilon = 1e-12);
    }
}
