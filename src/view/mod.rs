//! Backend-neutral drawing primitives and the factory contract both markup
//! backends implement.
//!
//! Layout nodes never build markup directly. They ask a [`View`] for
//! primitives, the view runs its decorators over the shapes that need them,
//! and [`View::render`] serializes the finished tree.

pub mod decorators;
pub mod svg;
pub mod vml;

use crate::geometry::Rect;
use serde::Serialize;

pub use decorators::{Decorator, Definitions, overlay_gradient};
pub use svg::SvgView;
pub use vml::VmlView;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearGradient {
    /// Shared definitions are de-duplicated by this id.
    pub id: String,
    pub rotation: f64,
    pub opacity: f64,
    pub stops: Vec<GradientStop>,
}

/// What a shape is filled with.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Paint {
    #[default]
    None,
    Color(String),
    /// Unresolved gradient, replaced by a decorator before serialization.
    Gradient(LinearGradient),
    /// Reference to a shared definition (`url(#id)`).
    Reference(String),
    /// Backend markup emitted in place of the plain fill element.
    Inline(String),
}

impl Paint {
    /// An empty color string means no fill.
    pub fn color(value: &str) -> Self {
        if value.is_empty() {
            Paint::None
        } else {
            Paint::Color(value.to_string())
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Paint::None)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    pub id: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    pub stroke_opacity: f64,
    pub fill: Paint,
    pub fill_opacity: f64,
    pub z_index: i32,
    /// Named overlay effect applied by the overlay decorator.
    pub overlay: Option<String>,
    /// Direction the shape grows in, in degrees; drives overlay rotation.
    pub normal_angle: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            id: None,
            stroke: None,
            stroke_width: 0.0,
            stroke_opacity: 1.0,
            fill: Paint::None,
            fill_opacity: 1.0,
            z_index: 0,
            overlay: None,
            normal_angle: 0.0,
        }
    }
}

impl ShapeStyle {
    pub fn stroked(color: &str, width: f64) -> Self {
        Self {
            stroke: Some(color.to_string()),
            stroke_width: width,
            ..Self::default()
        }
    }

    pub fn filled(paint: Paint) -> Self {
        Self {
            fill: paint,
            ..Self::default()
        }
    }

    /// Sets the stroke only when `width` is positive.
    pub fn with_border(mut self, color: &str, width: f64) -> Self {
        if width > 0.0 {
            self.stroke = Some(color.to_string());
            self.stroke_width = width;
        }
        self
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub id: Option<String>,
    pub x: f64,
    pub y: f64,
    pub baseline: f64,
    pub font: String,
    pub color: String,
    pub z_index: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupStyle {
    pub id: Option<String>,
    pub z_index: i32,
}

/// One node of the drawing tree produced for a single render.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Group {
        style: GroupStyle,
        children: Vec<Primitive>,
    },
    Path {
        points: Vec<(f64, f64)>,
        style: ShapeStyle,
    },
    Circle {
        center: (f64, f64),
        radius: f64,
        style: ShapeStyle,
    },
    Text {
        content: String,
        style: TextStyle,
    },
}

impl Primitive {
    pub fn z_index(&self) -> i32 {
        match self {
            Primitive::Group { style, .. } => style.z_index,
            Primitive::Path { style, .. } | Primitive::Circle { style, .. } => style.z_index,
            Primitive::Text { style, .. } => style.z_index,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Primitive::Group { style, .. } => style.id.as_deref(),
            Primitive::Path { style, .. } | Primitive::Circle { style, .. } => style.id.as_deref(),
            Primitive::Text { style, .. } => style.id.as_deref(),
        }
    }

    pub fn shape_style_mut(&mut self) -> Option<&mut ShapeStyle> {
        match self {
            Primitive::Path { style, .. } | Primitive::Circle { style, .. } => Some(style),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Primitive] {
        match self {
            Primitive::Group { children, .. } => children,
            _ => &[],
        }
    }
}

/// Orders siblings by z-index, keeping insertion order for ties.
pub fn sort_children(children: &[Primitive]) -> Vec<&Primitive> {
    let mut sorted: Vec<&Primitive> = children.iter().collect();
    sorted.sort_by_key(|child| child.z_index());
    sorted
}

/// The primitive factory shared by both markup backends.
///
/// Only rectangles pass through the decorator pipeline; lines, paths and
/// circles are emitted as requested.
pub trait View {
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    /// Runs every decorator of the backend over `primitive`.
    fn decorate(&mut self, primitive: Primitive) -> Primitive;

    /// Serializes a gradient the way this backend writes it.
    fn create_gradient(&mut self, gradient: &LinearGradient) -> String;

    /// Serializes the whole drawing.
    fn render(&mut self, children: &[Primitive]) -> String;

    fn create_rect(&mut self, rect: Rect, style: ShapeStyle) -> Primitive {
        let path = Primitive::Path {
            points: rect.outline(),
            style,
        };
        self.decorate(path)
    }

    fn create_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: ShapeStyle) -> Primitive {
        Primitive::Path {
            points: vec![(x1, y1), (x2, y2)],
            style,
        }
    }

    fn create_path(&mut self, points: Vec<(f64, f64)>, style: ShapeStyle) -> Primitive {
        Primitive::Path { points, style }
    }

    fn create_circle(&mut self, center: (f64, f64), radius: f64, style: ShapeStyle) -> Primitive {
        Primitive::Circle {
            center,
            radius,
            style,
        }
    }

    fn create_text(&mut self, content: &str, style: TextStyle) -> Primitive {
        Primitive::Text {
            content: content.to_string(),
            style,
        }
    }

    fn create_group(&mut self, style: GroupStyle, children: Vec<Primitive>) -> Primitive {
        Primitive::Group { style, children }
    }
}

/// Rounds halves toward positive infinity, matching browser pixel snapping.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Snaps a coordinate to the middle of a device pixel so odd-width strokes
/// stay crisp.
pub(crate) fn align_to_pixel(value: f64) -> f64 {
    round_half_up(value) + 0.5
}
