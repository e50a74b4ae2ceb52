use glam::{Quat, Vec3};

/// Rigid transform (position + unit rotation) used for scene nodes and
/// physics bodies alike.
///
/// Quaternion-producing operations re-normalize their result so repeated
/// composition stays unit-norm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Compose with a child-local transform, producing the child's transform
    /// in this transform's frame (parent-world * local = child-world).
    pub fn transform(&self, local: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * local.position,
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    /// Map a point from this transform's local frame into world space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    /// Exact affine inverse of [`Transform::transform_point`]: map a world
    /// point into this transform's local frame.
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Express a world rotation relative to this transform's frame.
    pub fn rotation_to_local(&self, world: Quat) -> Quat {
        (self.rotation.inverse() * world).normalize()
    }

    /// Express a full world transform relative to this transform's frame.
    /// Inverse of [`Transform::transform`].
    pub fn to_local(&self, world: &Transform) -> Transform {
        Transform {
            position: self.inverse_transform_point(world.position),
            rotation: self.rotation_to_local(world.rotation),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_3;

    const EPS: f32 = 1e-5;

    #[test]
    fn transform_point_round_trips() {
        let parent = Transform::new(
            Vec3::new(3.0, -2.0, 7.5),
            Quat::from_rotation_y(FRAC_PI_3).normalize(),
        );
        let point = Vec3::new(-1.0, 4.0, 0.25);

        let world = parent.transform_point(point);
        let back = parent.inverse_transform_point(world);

        assert!((back - point).length() < EPS, "round trip drifted: {back:?}");
    }

    #[test]
    fn compose_then_to_local_round_trips() {
        let parent = Transform::new(
            Vec3::new(0.5, 10.0, -3.0),
            Quat::from_axis_angle(Vec3::new(1.0, 2.0, -1.0).normalize(), 1.1),
        );
        let local = Transform::new(
            Vec3::new(2.0, 0.0, -1.0),
            Quat::from_rotation_x(0.7),
        );

        let world = parent.transform(&local);
        let back = parent.to_local(&world);

        assert!((back.position - local.position).length() < EPS);
        // q and -q encode the same rotation
        assert!(back.rotation.dot(local.rotation).abs() > 1.0 - EPS);
    }

    #[test]
    fn composition_preserves_unit_norm() {
        let mut t = Transform::IDENTITY;
        let step = Transform::new(
            Vec3::new(0.1, 0.2, 0.3),
            Quat::from_rotation_z(0.3),
        );
        for _ in 0..1000 {
            t = t.transform(&step);
        }
        assert!((t.rotation.length() - 1.0).abs() < EPS);
    }
}
