use super::{ChartElement, IdScope, union_of};
use crate::geometry::{Axis, Edge, Rect};
use crate::layout_dump::NodeDump;
use crate::view::{Primitive, View};

/// Lays its children side by side in equal slots along one axis.
///
/// With `K` children the available length is split into
/// `K + gap + spacing * (K - 1)` units: half of the gap before the first
/// child, one unit per child and `spacing` units between neighbours. The
/// other axis of each child is left as the child had it.
#[derive(Debug, Clone)]
pub struct ClusterLayout<T> {
    children: Vec<T>,
    vertical: bool,
    gap: f64,
    spacing: f64,
    rect: Rect,
}

impl<T: ChartElement> ClusterLayout<T> {
    pub fn new(vertical: bool, gap: f64, spacing: f64) -> Self {
        Self {
            children: Vec::new(),
            vertical,
            gap,
            spacing,
            rect: Rect::default(),
        }
    }

    pub fn push(&mut self, child: T) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[T] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [T] {
        &mut self.children
    }
}

impl<T: ChartElement> ChartElement for ClusterLayout<T> {
    fn reflow(&mut self, target: Rect) {
        self.rect = target;
        let count = self.children.len();
        if count == 0 {
            return;
        }

        let axis = if self.vertical { Axis::Y } else { Axis::X };
        let slots = count as f64 + self.gap + self.spacing * (count as f64 - 1.0);
        let slot_size = target.size(axis) / slots;
        let mut pos = target.start(axis) + slot_size * (self.gap / 2.0);

        for (idx, child) in self.children.iter_mut().enumerate() {
            let mut child_box = child.rect();
            child_box.set_start(axis, pos).set_end(axis, pos + slot_size);
            child.reflow(child_box);

            if idx + 1 < count {
                pos += slot_size * self.spacing;
            }
            pos += slot_size;
        }
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        self.children
            .iter()
            .flat_map(|child| child.view_elements(view, ids))
            .collect()
    }

    fn dump(&self) -> NodeDump {
        NodeDump::new("cluster", self.rect)
            .with_children(self.children.iter().map(ChartElement::dump).collect())
    }
}

/// Chains its children end to end along the value direction.
///
/// Each child keeps its own length; the first one stays where it is and every
/// following child is placed against the previous one. Reversed stacks grow
/// down (or left) instead of up (or right).
#[derive(Debug, Clone)]
pub struct StackLayout<T> {
    children: Vec<T>,
    vertical: bool,
    reversed: bool,
    rect: Rect,
}

impl<T: ChartElement> StackLayout<T> {
    pub fn new(vertical: bool, reversed: bool) -> Self {
        Self {
            children: Vec::new(),
            vertical,
            reversed,
            rect: Rect::default(),
        }
    }

    pub fn push(&mut self, child: T) {
        self.children.push(child);
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> &[T] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [T] {
        &mut self.children
    }

    fn direction(&self) -> Edge {
        match (self.vertical, self.reversed) {
            (true, false) => Edge::Top,
            (true, true) => Edge::Bottom,
            (false, false) => Edge::Right,
            (false, true) => Edge::Left,
        }
    }
}

impl<T: ChartElement> ChartElement for StackLayout<T> {
    fn reflow(&mut self, target: Rect) {
        let position_axis = if self.vertical { Axis::X } else { Axis::Y };
        let direction = self.direction();

        let mut previous: Option<Rect> = None;
        for child in &mut self.children {
            let mut child_box = child.rect();
            child_box.snap_to(&target, Some(position_axis));
            if let Some(previous) = previous {
                child_box.align_to(&previous, direction);
            }
            child.reflow(child_box);
            previous = Some(child.rect());
        }

        self.rect = union_of(self.children.iter().map(ChartElement::rect)).unwrap_or(target);
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        self.children
            .iter()
            .flat_map(|child| child.view_elements(view, ids))
            .collect()
    }

    fn dump(&self) -> NodeDump {
        NodeDump::new("stack", self.rect)
            .with_children(self.children.iter().map(ChartElement::dump).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[derive(Debug, Clone, Copy)]
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

    #[test]
    fn cluster_slots_fill_the_length_exactly() {
        let mut cluster = ClusterLayout::new(false, 1.5, 0.4);
        for _ in 0..3 {
            cluster.push(Block(Rect::new(0.0, 10.0, 0.0, 90.0)));
        }
        cluster.reflow(Rect::new(0.0, 0.0, 300.0, 100.0));

        let slot = 300.0 / 5.3;
        let blocks = cluster.children();
        assert_abs_diff_eq!(blocks[0].0.x1, slot * 0.75, epsilon = 1e-9);
        for block in blocks {
            assert_abs_diff_eq!(block.0.width(), slot, epsilon = 1e-9);
            assert_eq!((block.0.y1, block.0.y2), (10.0, 90.0));
        }
        assert_abs_diff_eq!(blocks[1].0.x1 - blocks[0].0.x2, slot * 0.4, epsilon = 1e-9);
        assert_abs_diff_eq!(blocks[2].0.x2 + slot * 0.75, 300.0, epsilon = 1e-9);
    }

    #[test]
    fn vertical_cluster_distributes_along_y() {
        let mut cluster = ClusterLayout::new(true, 0.0, 0.0);
        cluster.push(Block(Rect::new(5.0, 0.0, 50.0, 0.0)));
        cluster.push(Block(Rect::new(5.0, 0.0, 80.0, 0.0)));
        cluster.reflow(Rect::new(0.0, 100.0, 100.0, 200.0));
        let blocks = cluster.children();
        assert_eq!(blocks[0].0, Rect::new(5.0, 100.0, 50.0, 150.0));
        assert_eq!(blocks[1].0, Rect::new(5.0, 150.0, 80.0, 200.0));
    }

    #[test]
    fn stack_chains_children_upward() {
        let mut stack = StackLayout::new(true, false);
        stack.push(Block(Rect::new(0.0, 80.0, 0.0, 100.0)));
        stack.push(Block(Rect::new(0.0, 70.0, 0.0, 100.0)));
        stack.reflow(Rect::new(10.0, 0.0, 30.0, 100.0));

        let blocks = stack.children();
        assert_eq!(blocks[0].0, Rect::new(10.0, 80.0, 30.0, 100.0));
        assert_eq!(blocks[1].0, Rect::new(10.0, 50.0, 30.0, 80.0));
        assert_eq!(stack.rect(), Rect::new(10.0, 50.0, 30.0, 100.0));
    }

    #[test]
    fn reversed_horizontal_stack_grows_left() {
        let mut stack = StackLayout::new(false, true);
        stack.push(Block(Rect::new(40.0, 0.0, 50.0, 0.0)));
        stack.push(Block(Rect::new(40.0, 0.0, 60.0, 0.0)));
        stack.reflow(Rect::new(0.0, 5.0, 100.0, 15.0));

        let blocks = stack.children();
        assert_eq!(blocks[0].0, Rect::new(40.0, 5.0, 50.0, 15.0));
        assert_eq!(blocks[1].0, Rect::new(20.0, 5.0, 40.0, 15.0));
    }

    #[test]
    fn empty_stack_takes_the_target() {
        let mut stack: StackLayout<Block> = StackLayout::new(true, true);
        let target = Rect::new(1.0, 2.0, 3.0, 4.0);
        stack.reflow(target);
        assert_eq!(stack.rect(), target);
    }
}
