use glam::{Quat, Vec3};

use crate::math::frame::CartesianFrame;

/// Interpolation curve between two keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationType {
    #[default]
    Linear,
    /// Eases in and out along a half cosine wave.
    Cosine,
    /// Smoothstep easing.
    Cubic,
}

impl InterpolationType {
    /// Maps a linear factor in [0, 1] onto the curve.
    #[must_use]
    pub fn ease(self, factor: f32) -> f32 {
        let t = factor.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Cosine => (1.0 - (t * std::f32::consts::PI).cos()) * 0.5,
            Self::Cubic => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// A value produced by an animation and consumed by a channel.
///
/// The variant set is closed on purpose: every animatable property of the
/// scene graph is a scalar, a vector, a rotation or a whole frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationValue {
    Scalar(f32),
    Vector(Vec3),
    Rotation(Quat),
    Frame(CartesianFrame),
}

impl AnimationValue {
    #[must_use]
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Self::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vector(&self) -> Option<Vec3> {
        match self {
            Self::Vector(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_rotation(&self) -> Option<Quat> {
        match self {
            Self::Rotation(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_frame(&self) -> Option<CartesianFrame> {
        match self {
            Self::Frame(value) => Some(*value),
            _ => None,
        }
    }

    /// Interpolates between two values of the same variant.
    ///
    /// Mismatched variants cannot be blended; the start value is returned
    /// unchanged and a warning is logged.
    #[must_use]
    pub fn interpolate(start: &Self, end: &Self, factor: f32, curve: InterpolationType) -> Self {
        let t = curve.ease(factor);

        match (start, end) {
            (Self::Scalar(a), Self::Scalar(b)) => Self::Scalar(a + (b - a) * t),
            (Self::Vector(a), Self::Vector(b)) => Self::Vector(a.lerp(*b, t)),
            (Self::Rotation(a), Self::Rotation(b)) => Self::Rotation(a.slerp(*b, t)),
            (Self::Frame(a), Self::Frame(b)) => Self::Frame(CartesianFrame {
                position: a.position.lerp(b.position, t),
                rotation: a.rotation.slerp(b.rotation, t),
                scale: a.scale.lerp(b.scale, t),
            }),
            _ => {
                log::warn!("Cannot interpolate between mismatched animation value types");
                *start
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_linear_midpoint() {
        let a = AnimationValue::Scalar(0.0);
        let b = AnimationValue::Scalar(10.0);
        let v = AnimationValue::interpolate(&a, &b, 0.5, InterpolationType::Linear);
        assert_eq!(v.as_scalar(), Some(5.0));
    }

    #[test]
    fn cosine_ease_hits_endpoints() {
        assert!((InterpolationType::Cosine.ease(0.0)).abs() < 1e-6);
        assert!((InterpolationType::Cosine.ease(1.0) - 1.0).abs() < 1e-6);
        // Half-way, the cosine curve crosses 0.5 exactly.
        assert!((InterpolationType::Cosine.ease(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn mismatched_variants_return_start() {
        let a = AnimationValue::Scalar(1.0);
        let b = AnimationValue::Vector(Vec3::ONE);
        let v = AnimationValue::interpolate(&a, &b, 0.5, InterpolationType::Linear);
        assert_eq!(v.as_scalar(), Some(1.0));
    }
}
