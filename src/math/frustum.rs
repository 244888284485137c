use glam::{Mat4, Vec3, Vec4};

use crate::math::bounds::{BoundingBox, BoundingSphere};

/// Result of testing a volume against the frustum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Outside,
    Intersect,
    Inside,
}

/// A culling plane stored as a normalized `(normal, signed distance)` pair.
///
/// Construction guards against near-zero normals: a degenerate input yields
/// the zero plane, whose signed distance is 0 everywhere. Such a plane never
/// classifies anything as outside, effectively disabling culling against it
/// instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Plane(Vec4);

impl Plane {
    pub const ZERO: Self = Self(Vec4::ZERO);

    /// Normalizes the raw `(a, b, c, d)` plane equation.
    #[must_use]
    pub fn new(raw: Vec4) -> Self {
        let length = raw.truncate().length();
        if length <= f32::EPSILON {
            return Self::ZERO;
        }
        Self(raw / length)
    }

    #[must_use]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.0.x * point.x + self.0.y * point.y + self.0.z * point.z + self.0.w
    }
}

/// Plane indices, in declaration order.
const LEFT: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const NEAR: usize = 4;
const FAR: usize = 5;

/// The 6-plane volume a camera can see, used to cull invisible subtrees.
///
/// The test-disable switch is an instance field owned by whoever performs
/// culling, not process-wide state: with `test_enabled == false` every query
/// reports [`Containment::Inside`], which is useful to rule culling out when
/// chasing visibility bugs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
    test_enabled: bool,
}

impl Frustum {
    /// A frustum of zero planes: classifies everything as inside.
    #[must_use]
    pub fn new() -> Self {
        Self {
            planes: [Plane::ZERO; 6],
            test_enabled: true,
        }
    }

    /// Extracts the planes from a view-projection matrix.
    ///
    /// Gribb-Hartmann row extraction for a `perspective_rh` style matrix
    /// with [0, 1] clip-space depth: the near plane is row 2 alone.
    #[must_use]
    pub fn from_view_projection(matrix: &Mat4) -> Self {
        let mut frustum = Self::new();
        frustum.update(matrix);
        frustum
    }

    /// Recomputes the planes from a view-projection matrix, keeping the
    /// test-enable state.
    pub fn update(&mut self, matrix: &Mat4) {
        let row0 = matrix.row(0);
        let row1 = matrix.row(1);
        let row2 = matrix.row(2);
        let row3 = matrix.row(3);

        self.planes[LEFT] = Plane::new(row3 + row0);
        self.planes[RIGHT] = Plane::new(row3 - row0);
        self.planes[BOTTOM] = Plane::new(row3 + row1);
        self.planes[TOP] = Plane::new(row3 - row1);
        self.planes[NEAR] = Plane::new(row2);
        self.planes[FAR] = Plane::new(row3 - row2);
    }

    pub fn set_test_enabled(&mut self, state: bool) {
        self.test_enabled = state;
    }

    #[must_use]
    pub fn is_test_enabled(&self) -> bool {
        self.test_enabled
    }

    // ========================================================================
    // Containment queries
    // ========================================================================

    /// A point is outside as soon as any plane reports a non-positive signed
    /// distance; there is no intersect state for a point.
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> Containment {
        if !self.test_enabled {
            return Containment::Inside;
        }

        for plane in &self.planes {
            if plane.signed_distance(point) <= 0.0 {
                return Containment::Outside;
            }
        }

        Containment::Inside
    }

    #[must_use]
    pub fn contains_sphere(&self, sphere: &BoundingSphere) -> Containment {
        if !self.test_enabled {
            return Containment::Inside;
        }

        for plane in &self.planes {
            let distance = plane.signed_distance(sphere.center);

            if distance < -sphere.radius {
                return Containment::Outside;
            }

            if distance < sphere.radius {
                return Containment::Intersect;
            }
        }

        Containment::Inside
    }

    /// Approximate box test: samples the midpoint and the 8 corners, and
    /// reports [`Containment::Intersect`] as soon as any sample lands inside.
    ///
    /// This is knowingly imprecise (a large box surrounding the frustum has
    /// no sample inside and reports outside), but it never reports outside
    /// when it should report intersect through a corner, so it errs toward
    /// inclusion. Callers rely on that bias; do not tighten it silently.
    #[must_use]
    pub fn contains_box(&self, box_: &BoundingBox) -> Containment {
        if !self.test_enabled {
            return Containment::Inside;
        }

        if !box_.is_valid() {
            return Containment::Outside;
        }

        if self.contains_point(box_.center()) == Containment::Inside {
            return Containment::Intersect;
        }

        for corner in box_.corners() {
            if self.contains_point(corner) == Containment::Inside {
                return Containment::Intersect;
            }
        }

        Containment::Outside
    }

    /// Tests an axis-aligned cube given by its center and half size.
    ///
    /// A plane rejects the cube only when all 8 corners sit behind it.
    #[must_use]
    pub fn contains_cube(&self, center: Vec3, half_size: f32) -> Containment {
        if !self.test_enabled {
            return Containment::Inside;
        }

        for plane in &self.planes {
            let mut any_in_front = false;

            for dx in [-half_size, half_size] {
                for dy in [-half_size, half_size] {
                    for dz in [-half_size, half_size] {
                        let corner = center + Vec3::new(dx, dy, dz);
                        if plane.signed_distance(corner) > 0.0 {
                            any_in_front = true;
                        }
                    }
                }
            }

            if !any_in_front {
                return Containment::Outside;
            }
        }

        Containment::Inside
    }
}

impl Default for Frustum {
    fn default() -> Self {
        Self::new()
    }
}
