use super::{GradientStop, GroupStyle, LinearGradient, Paint, Primitive};
use crate::color::blend_gradient;
use crate::config::GLASS;
use crate::theme::WHITE;

/// Post-processing step applied to decorated primitives as they are created.
pub trait Decorator {
    fn decorate(&self, primitive: Primitive, definitions: &mut Definitions) -> Primitive;
}

/// Shared gradient definitions of one drawing, kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    gradients: Vec<LinearGradient>,
}

impl Definitions {
    /// Registers `gradient` unless one with the same id exists; returns the id.
    pub fn register(&mut self, gradient: LinearGradient) -> String {
        let id = gradient.id.clone();
        if !self.gradients.iter().any(|known| known.id == id) {
            self.gradients.push(gradient);
        }
        id
    }

    pub fn is_empty(&self) -> bool {
        self.gradients.is_empty()
    }

    pub fn len(&self) -> usize {
        self.gradients.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinearGradient> {
        self.gradients.iter()
    }
}

/// Looks up a named overlay effect.
pub fn overlay_gradient(name: &str) -> Option<LinearGradient> {
    if name != GLASS {
        return None;
    }
    let stop = |offset: f64, opacity: f64| GradientStop {
        offset,
        color: WHITE.to_string(),
        opacity,
    };
    Some(LinearGradient {
        id: GLASS.to_string(),
        rotation: 0.0,
        opacity: 1.0,
        stops: vec![
            stop(0.0, 0.0),
            stop(0.1, 0.0),
            stop(0.25, 0.4),
            stop(0.92, 0.0),
            stop(1.0, 0.0),
        ],
    })
}

/// Layers a translucent gradient copy over the shape.
///
/// The original keeps its flat fill and loses its id; the copy on top takes
/// the id so hit testing lands on the visible surface.
#[derive(Debug, Default)]
pub struct SvgOverlayDecorator;

impl Decorator for SvgOverlayDecorator {
    fn decorate(&self, mut primitive: Primitive, _definitions: &mut Definitions) -> Primitive {
        let Some(style) = primitive.shape_style_mut() else {
            return primitive;
        };
        let Some(gradient) = style.overlay.as_deref().and_then(overlay_gradient) else {
            return primitive;
        };
        let Some(name) = style.overlay.take() else {
            return primitive;
        };

        let id = style.id.take();
        let rotation = style.normal_angle;
        let z_index = style.z_index;

        let mut overlay = primitive.clone();
        if let Some(style) = overlay.shape_style_mut() {
            style.id = id;
            style.fill = Paint::Gradient(LinearGradient {
                id: format!("{name}{}", crate::format::format_number(rotation)),
                rotation,
                ..gradient
            });
        }

        Primitive::Group {
            style: GroupStyle { id: None, z_index },
            children: vec![primitive, overlay],
        }
    }
}

/// Moves gradient fills into the shared definitions and points at them.
#[derive(Debug, Default)]
pub struct SvgPaintDecorator;

impl Decorator for SvgPaintDecorator {
    fn decorate(&self, primitive: Primitive, definitions: &mut Definitions) -> Primitive {
        match primitive {
            Primitive::Group { style, children } => Primitive::Group {
                style,
                children: children
                    .into_iter()
                    .map(|child| self.decorate(child, definitions))
                    .collect(),
            },
            mut primitive => {
                if let Some(style) = primitive.shape_style_mut() {
                    if let Paint::Gradient(gradient) = &style.fill {
                        style.fill = Paint::Reference(definitions.register(gradient.clone()));
                    }
                }
                primitive
            }
        }
    }
}

/// Bakes the overlay into an opaque gradient fill, since the legacy backend
/// cannot stack a translucent copy on top of the shape.
#[derive(Debug, Default)]
pub struct VmlOverlayDecorator;

impl Decorator for VmlOverlayDecorator {
    fn decorate(&self, mut primitive: Primitive, _definitions: &mut Definitions) -> Primitive {
        let Some(style) = primitive.shape_style_mut() else {
            return primitive;
        };
        let Some(gradient) = style.overlay.as_deref().and_then(overlay_gradient) else {
            return primitive;
        };

        let base = match &style.fill {
            Paint::Color(color) => color.clone(),
            _ => String::new(),
        };
        style.overlay = None;
        style.fill = Paint::Gradient(LinearGradient {
            rotation: 270.0 - style.normal_angle,
            opacity: style.fill_opacity,
            ..blend_gradient(&base, &gradient)
        });
        primitive
    }
}

/// Turns gradient fills into inline directional fill markup.
#[derive(Debug, Default)]
pub struct VmlGradientDecorator;

impl Decorator for VmlGradientDecorator {
    fn decorate(&self, mut primitive: Primitive, _definitions: &mut Definitions) -> Primitive {
        if let Some(style) = primitive.shape_style_mut() {
            if let Paint::Gradient(gradient) = &style.fill {
                style.fill = Paint::Inline(super::vml::gradient_fill(gradient));
            }
        }
        primitive
    }
}
