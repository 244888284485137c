use glam::Vec3;

use crate::math::frame::CartesianFrame;

/// Bounded spatial region a modifier acts in, centered on the frame of the
/// entity carrying the modifier.
///
/// Influence is a scalar in [0, 1]: 0 outside the region, up to 1 at the
/// center, per the falloff the shape defines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InfluenceArea {
    /// Axis-aligned (in the area's own frame) box; binary influence, no
    /// falloff.
    Cubic { half_extents: Vec3 },
    /// Sphere with a linear falloff from 1 at `inner_radius` down to 0 at
    /// `outer_radius`.
    Spherical { outer_radius: f32, inner_radius: f32 },
}

impl InfluenceArea {
    /// A cube spanning `size` in every direction.
    #[must_use]
    pub fn cubic(size: f32) -> Self {
        Self::Cubic {
            half_extents: Vec3::splat(size.abs()),
        }
    }

    #[must_use]
    pub fn cubic_with_extents(x_size: f32, y_size: f32, z_size: f32) -> Self {
        Self::Cubic {
            half_extents: Vec3::new(x_size.abs(), y_size.abs(), z_size.abs()),
        }
    }

    /// `inner_radius` is clamped into `[0, outer_radius]`.
    #[must_use]
    pub fn spherical(outer_radius: f32, inner_radius: f32) -> Self {
        let outer = outer_radius.abs();
        Self::Spherical {
            outer_radius: outer,
            inner_radius: inner_radius.clamp(0.0, outer),
        }
    }

    /// Influence of this area, centered on `origin`, over a target at
    /// `target_position` (world space).
    #[must_use]
    pub fn influence(&self, origin: &CartesianFrame, target_position: Vec3) -> f32 {
        match *self {
            Self::Cubic { half_extents } => {
                // Bring the target into the area's own axes.
                let local = origin.rotation.inverse() * (target_position - origin.position);
                let inside = local.x.abs() <= half_extents.x
                    && local.y.abs() <= half_extents.y
                    && local.z.abs() <= half_extents.z;
                if inside { 1.0 } else { 0.0 }
            }
            Self::Spherical {
                outer_radius,
                inner_radius,
            } => {
                let distance = target_position.distance(origin.position);
                if distance >= outer_radius {
                    return 0.0;
                }
                if distance <= inner_radius {
                    return 1.0;
                }

                let span = outer_radius - inner_radius;
                if span <= f32::EPSILON {
                    return 1.0;
                }
                1.0 - (distance - inner_radius) / span
            }
        }
    }
}
