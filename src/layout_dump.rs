use crate::geometry::Rect;
use crate::layout::{ChartElement, DataPointRef, RootElement};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Snapshot of a reflowed scene graph, for debugging and golden comparisons.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f64,
    pub height: f64,
    pub root: NodeDump,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data_points: BTreeMap<String, DataPointRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDump {
    pub kind: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDump>,
}

impl NodeDump {
    pub fn new(kind: &str, rect: Rect) -> Self {
        Self {
            kind: kind.to_string(),
            x1: rect.x1,
            y1: rect.y1,
            x2: rect.x2,
            y2: rect.y2,
            id: None,
            label: None,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_children(mut self, children: Vec<NodeDump>) -> Self {
        self.children = children;
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x1, self.y1, self.x2, self.y2)
    }

    /// Depth-first search for the first node of `kind`.
    pub fn find(&self, kind: &str) -> Option<&NodeDump> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(kind))
    }

    pub fn count(&self, kind: &str) -> usize {
        let own = usize::from(self.kind == kind);
        own + self.children.iter().map(|child| child.count(kind)).sum::<usize>()
    }
}

impl LayoutDump {
    pub fn from_root(root: &RootElement) -> Self {
        let rect = root.chart_box();
        LayoutDump {
            width: rect.width(),
            height: rect.height(),
            root: root.dump(),
            data_points: root.ids().clone().into_map(),
        }
    }
}

pub fn write_layout_dump(path: &Path, root: &RootElement) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_root(root);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
