use glam::{Affine3A, Mat3, Quat, Vec3};

/// A principal axis, for the per-axis spatial mutators and animation
/// channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[must_use]
    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Coordinate system a spatial mutation is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformSpace {
    /// Relative to the node's own axes.
    Local,
    /// Relative to the parent node's axes.
    #[default]
    Parent,
    /// Relative to the world axes.
    World,
}

/// A local coordinate system: position, orientation and scale relative to a
/// parent frame.
///
/// World frames are never stored; they are derived by composing local frames
/// from the root down. Composition goes through [`Affine3A`], so a frame
/// rebuilt from a composed matrix loses shear (the decomposition assumes a
/// pure TRS transform).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianFrame {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl CartesianFrame {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Builds the affine matrix mapping this frame's local space into its
    /// parent space.
    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Rebuilds a frame from an affine matrix.
    ///
    /// Shear (from composing rotations with non-uniform scales) is lost in
    /// the decomposition.
    #[must_use]
    pub fn from_affine(matrix: &Affine3A) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Composes `child` under this frame: the result maps the child's local
    /// space into this frame's parent space.
    #[must_use]
    pub fn compose(&self, child: &Self) -> Self {
        Self::from_affine(&(self.to_affine() * child.to_affine()))
    }

    // ========================================================================
    // Axes
    // ========================================================================

    /// Forward axis of the frame (-Z rotated by the orientation).
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    // ========================================================================
    // Mutators
    // ========================================================================

    /// Translates along the frame's own (rotated) axes.
    pub fn translate_local(&mut self, distance: Vec3) {
        self.position += self.rotation * distance;
    }

    /// Rotates around an axis expressed in the frame's own space.
    pub fn rotate_local(&mut self, angle: f32, axis: Vec3) {
        self.rotation = (self.rotation * Quat::from_axis_angle(axis, angle)).normalize();
    }

    /// Rotates around an axis expressed in the parent space.
    pub fn rotate_parent(&mut self, angle: f32, axis: Vec3) {
        self.rotation = (Quat::from_axis_angle(axis, angle) * self.rotation).normalize();
    }

    /// Orients the frame so that its forward axis points at `target`.
    ///
    /// `target` and `up` are expressed in the parent space. Degenerate
    /// configurations (target on the up axis, or at the frame position) leave
    /// the orientation untouched.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let to_target = target - self.position;
        if to_target.length_squared() < 1e-8 {
            return;
        }

        let forward = to_target.normalize();
        if forward.cross(up).length_squared() < 1e-4 {
            return;
        }

        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();

        let rot_mat = Mat3::from_cols(right, new_up, -forward);
        self.rotation = Quat::from_mat3(&rot_mat);
    }
}

impl Default for CartesianFrame {
    fn default() -> Self {
        Self::IDENTITY
    }
}
