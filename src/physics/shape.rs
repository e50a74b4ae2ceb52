//! Collision shape types and the external shape-extraction seam.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::scene::Geometry;

/// Requested shape kind for a body. `Auto` lets the builder decide from the
/// geometry; `None` skips shape construction entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ShapeKind {
    #[default]
    Auto,
    Box,
    Sphere,
    Cylinder,
    None,
}

/// Options handed to the shape builder alongside the geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeOptions {
    pub kind: ShapeKind,
    /// Uniform scale applied to extracted dimensions.
    pub fit_scale: f32,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            kind: ShapeKind::Auto,
            fit_scale: 1.0,
        }
    }
}

/// A collision volume, produced by an external builder. The sync layer never
/// inspects these beyond handing them to the solver and the debug sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    Cylinder { radius: f32, half_height: f32 },
}

/// External collaborator mapping an entity's 3D geometry to a collision
/// shape. Returning `None` signals "not ready yet, retry on the next
/// geometry-ready signal" — it is not a failure.
pub trait ShapeBuilder {
    fn build(&self, geometry: &Geometry, options: &ShapeOptions) -> Option<Shape>;
}

/// Builder that fits a primitive to the geometry's bounding half extents.
/// Enough for box/sphere fitting; anything mesh-aware lives outside this
/// crate.
pub struct AabbShapeBuilder;

impl ShapeBuilder for AabbShapeBuilder {
    fn build(&self, geometry: &Geometry, options: &ShapeOptions) -> Option<Shape> {
        let extents = geometry.half_extents * options.fit_scale;
        if extents.cmple(Vec3::ZERO).any() {
            // Geometry has no volume yet (still streaming in).
            return None;
        }
        match options.kind {
            ShapeKind::Auto | ShapeKind::Box => Some(Shape::Box {
                half_extents: extents,
            }),
            ShapeKind::Sphere => Some(Shape::Sphere {
                radius: extents.max_element(),
            }),
            ShapeKind::Cylinder => Some(Shape::Cylinder {
                radius: extents.x.max(extents.z),
                half_height: extents.y,
            }),
            ShapeKind::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(half_extents: Vec3) -> Geometry {
        Geometry {
            mesh_id: "cube".to_string(),
            half_extents,
        }
    }

    #[test]
    fn aabb_builder_fits_box() {
        let shape = AabbShapeBuilder
            .build(&geometry(Vec3::new(0.5, 1.0, 0.25)), &ShapeOptions::default());
        assert_eq!(
            shape,
            Some(Shape::Box {
                half_extents: Vec3::new(0.5, 1.0, 0.25)
            })
        );
    }

    #[test]
    fn zero_volume_geometry_is_not_ready() {
        let shape = AabbShapeBuilder.build(&geometry(Vec3::ZERO), &ShapeOptions::default());
        assert!(shape.is_none());
    }
}
