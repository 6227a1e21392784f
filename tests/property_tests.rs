use approx::assert_abs_diff_eq;
use chart_rs_renderer::geometry::{Rect, Spacing};
use chart_rs_renderer::layout::{
    ChartElement, ClusterLayout, IdScope, auto_axis_max, auto_axis_min, auto_major_unit,
};
use chart_rs_renderer::layout_dump::NodeDump;
use chart_rs_renderer::view::{Primitive, View};
use proptest::prelude::*;

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (-500.0..500.0f64, -500.0..500.0f64, 0.0..400.0f64, 0.0..400.0f64)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, x + w, y + h))
}

fn spacing_strategy() -> impl Strategy<Value = Spacing> {
    (0.0..50.0f64, 0.0..50.0f64, 0.0..50.0f64, 0.0..50.0f64)
        .prop_map(|(top, right, bottom, left)| Spacing::new(top, right, bottom, left))
}

fn assert_rect_eq(a: Rect, b: Rect) {
    assert_abs_diff_eq!(a.x1, b.x1, epsilon = 1e-9);
    assert_abs_diff_eq!(a.y1, b.y1, epsilon = 1e-9);
    assert_abs_diff_eq!(a.x2, b.x2, epsilon = 1e-9);
    assert_abs_diff_eq!(a.y2, b.y2, epsilon = 1e-9);
}

struct Block(Rect);

impl ChartElement for Block {
    fn reflow(&mut self, target: Rect) {
        self.0 = target;
    }

    fn rect(&self) -> Rect {
        self.0
    }

    fn view_elements(&self, _view: &mut dyn View, _ids: &mut IdScope) -> Vec<Primitive> {
        Vec::new()
    }

    fn dump(&self) -> NodeDump {
        NodeDump::new("block", self.0)
    }
}

proptest! {
    #[test]
    fn unpad_undoes_pad(rect in rect_strategy(), spacing in spacing_strategy()) {
        let mut padded = rect;
        padded.pad(spacing).unpad(spacing);
        assert_rect_eq(padded, rect);
    }

    #[test]
    fn wrap_is_commutative(a in rect_strategy(), b in rect_strategy()) {
        let mut ab = a;
        ab.wrap(&b);
        let mut ba = b;
        ba.wrap(&a);
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn wrap_is_associative(a in rect_strategy(), b in rect_strategy(), c in rect_strategy()) {
        let mut left = a;
        left.wrap(&b).wrap(&c);
        let mut bc = b;
        bc.wrap(&c);
        let mut right = a;
        right.wrap(&bc);
        prop_assert_eq!(left, right);
    }

    #[test]
    fn cluster_fills_its_box(count in 1usize..8, length in 10.0..1000.0f64) {
        let gap = 1.5;
        let spacing = 0.4;
        let mut cluster = ClusterLayout::new(false, gap, spacing);
        for _ in 0..count {
            cluster.push(Block(Rect::default()));
        }
        let target = Rect::new(0.0, 0.0, length, 50.0);
        cluster.reflow(target);

        let children = cluster.children();
        let widths: f64 = children.iter().map(|child| child.rect().width()).sum();
        let gaps: f64 = children
            .windows(2)
            .map(|pair| pair[1].rect().x1 - pair[0].rect().x2)
            .sum();
        let leading = children[0].rect().x1 - target.x1;
        let trailing = target.x2 - children[count - 1].rect().x2;
        assert_abs_diff_eq!(leading + widths + gaps + trailing, length, epsilon = 1e-6);
        assert_abs_diff_eq!(leading, trailing, epsilon = 1e-6);
    }

    #[test]
    fn axis_bounds_cover_the_data(min in -1.0e6..1.0e6f64, spread in 0.001..1.0e6f64) {
        let max = min + spread;
        prop_assert!(auto_axis_min(min, max) <= min);
        prop_assert!(auto_axis_max(min, max) >= max);
        prop_assert!(auto_major_unit(min, max) > 0.0);
    }

    #[test]
    fn narrow_positive_ranges_start_at_zero(max in 1.0..1.0e6f64, share in 0.0..0.19f64) {
        let min = max * (1.0 - share);
        prop_assert_eq!(auto_axis_min(min, max), 0.0);
    }
}

#[test]
fn major_unit_examples() {
    assert_eq!(auto_major_unit(0.0, 0.0), 0.1);
    assert_eq!(auto_major_unit(0.0, 23.0), 5.0);
    assert_eq!(auto_axis_min(95.0, 100.0), 0.0);
}
