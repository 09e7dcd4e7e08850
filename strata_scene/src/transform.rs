use glamx::{Affine3A, Quat, Vec3};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a transform within its [`Scene`](crate::Scene).
    pub struct TransformId;
}

/// Translation, rotation and scale of one or more entities.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Transform {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    pub fn rotate(&mut self, rotation: Quat) {
        self.rotation = (rotation * self.rotation).normalize();
    }

    pub fn matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
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

    #[test]
    fn identity_matrix() {
        assert_eq!(Transform::default().matrix(), Affine3A::IDENTITY);
    }

    #[test]
    fn translate_moves_origin() {
        let mut transform = Transform::default();
        transform.translate(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(
            transform.matrix().transform_point3(Vec3::ZERO),
            Vec3::new(1.0, 2.0, 3.0)
        );
    }
}
