use super::{BuildContext, ChartElement, IdScope, Legend, PlotArea, Title};
use crate::config::{ChartAreaOptions, ChartConfig};
use crate::geometry::{Rect, Spacing};
use crate::layout_dump::NodeDump;
use crate::view::{Paint, Primitive, ShapeStyle, View};

/// Top of the scene graph. Children take space from the chart box one after
/// another: the title, the legend, then the plot area in what is left.
pub struct RootElement {
    options: ChartAreaOptions,
    children: Vec<Box<dyn ChartElement>>,
    chart_box: Rect,
    rect: Rect,
    ids: IdScope,
}

impl RootElement {
    pub fn new(ctx: &mut BuildContext<'_>, config: &ChartConfig) -> Self {
        let series = config.resolve_series();
        let mut children: Vec<Box<dyn ChartElement>> = Vec::with_capacity(3);
        if let Some(title) = Title::new(ctx, &config.title) {
            children.push(Box::new(title));
        }
        if config.legend.visible {
            children.push(Box::new(Legend::new(ctx, &config.legend, &series)));
        }
        children.push(Box::new(PlotArea::new(ctx, config, &series)));

        let options = config.chart_area.clone();
        let chart_box = Rect::new(0.0, 0.0, options.width, options.height);
        Self {
            options,
            children,
            chart_box,
            rect: chart_box,
            ids: IdScope::default(),
        }
    }

    /// The whole drawing surface.
    pub fn chart_box(&self) -> Rect {
        self.chart_box
    }

    /// Ids registered by the last call to [`RootElement::render`].
    pub fn ids(&self) -> &IdScope {
        &self.ids
    }

    pub fn children(&self) -> &[Box<dyn ChartElement>] {
        &self.children
    }

    /// Lays the graph out over the configured chart size.
    pub fn layout(&mut self) {
        self.reflow(self.chart_box);
    }

    /// Emits the primitives of the whole graph and keeps the ids that were
    /// registered along the way.
    pub fn render(&mut self, view: &mut dyn View) -> Vec<Primitive> {
        let mut ids = IdScope::default();
        let elements = self.view_elements(view, &mut ids);
        tracing::debug!(ids = ids.len(), primitives = elements.len(), "emitted scene");
        self.ids = ids;
        elements
    }
}

impl ChartElement for RootElement {
    /// `target` is taken as the full chart box.
    fn reflow(&mut self, target: Rect) {
        self.chart_box = target;
        let mut current = target;
        current.unpad(Spacing::from(self.options.margin));
        self.rect = current;

        for child in &mut self.children {
            child.reflow(current);
            current = current.difference(&child.rect()).unwrap_or(current);
        }
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn view_elements(&self, view: &mut dyn View, ids: &mut IdScope) -> Vec<Primitive> {
        let border = &self.options.border;
        let mut background = self.rect;
        background
            .pad(Spacing::from(self.options.margin))
            .unpad(border.width);
        let style = ShapeStyle::filled(Paint::color(&self.options.background))
            .with_border(border.color_or_black(), border.width)
            .with_z_index(-1);

        let mut elements = vec![view.create_rect(background, style)];
        for child in &self.children {
            elements.extend(child.view_elements(view, ids));
        }
        elements
    }

    fn dump(&self) -> NodeDump {
        NodeDump::new("root", self.rect)
            .with_children(self.children.iter().map(|child| child.dump()).collect())
    }
}
