use glam::Vec3;

use crate::physics::properties::{EnvironmentProperties, PhysicalObjectProperties};

/// Capability contract for anything that accumulates forces and carries a
/// velocity the physics stepper can integrate.
///
/// The trait only covers the entity-local facet; world-space queries
/// (summed ancestor velocities) live on the tree, which owns the hierarchy.
pub trait Movable {
    fn velocity(&self) -> Vec3;

    /// `reset_acceleration` also clears any accumulated forces.
    fn set_velocity(&mut self, velocity: Vec3, reset_acceleration: bool);

    fn acceleration(&self) -> Vec3;

    fn center_of_mass(&self) -> Vec3;

    fn set_center_of_mass(&mut self, center_of_mass: Vec3);

    /// Adds a force to the accumulated acceleration. The vector's magnitude
    /// is the acceleration in m/s^2.
    fn add_force(&mut self, force: Vec3);

    /// Convenience: a force of `power` along `direction`.
    fn impulse(&mut self, direction: Vec3, power: f32) {
        self.add_force(direction * power);
    }

    /// Deviates the velocity off a surface normal, keeping `bounciness`
    /// (1.0 = no speed loss) of the speed.
    fn deflect(&mut self, surface_normal: Vec3, surface_bounciness: f32);

    fn stop_movement(&mut self);

    fn is_moving(&self) -> bool;

    /// Clears the velocity only; accumulated forces survive.
    fn clear_velocity(&mut self);

    fn speed(&self) -> f32 {
        self.velocity().length()
    }
}

/// Plain-data implementation of [`Movable`] embedded by scene nodes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MovableState {
    velocity: Vec3,
    acceleration: Vec3,
    center_of_mass: Vec3,
}

impl MovableState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the velocity from the accumulated acceleration. In order:
    /// apply gravity (unless `free_fly`), apply drag against the current
    /// velocity, integrate the acceleration into the velocity and reset it.
    ///
    /// Returns the new velocity.
    pub fn update_velocity(
        &mut self,
        environment: &EnvironmentProperties,
        properties: &PhysicalObjectProperties,
        free_fly: bool,
    ) -> Vec3 {
        if !free_fly {
            self.acceleration += environment.gravity;
        }

        // Drag: F = 0.5 * rho * v^2 * Cd * A, opposing the motion.
        let speed_squared = self.velocity.length_squared();
        if speed_squared > 0.0
            && environment.density > 0.0
            && properties.drag_coefficient() > 0.0
            && !properties.is_massless()
        {
            let drag_force = 0.5
                * environment.density
                * speed_squared
                * properties.drag_coefficient()
                * properties.surface();
            let deceleration = drag_force * properties.inverse_mass();
            self.acceleration -= self.velocity.normalize() * deceleration;
        }

        self.velocity += self.acceleration;
        self.acceleration = Vec3::ZERO;

        self.velocity
    }
}

impl Movable for MovableState {
    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3, reset_acceleration: bool) {
        self.velocity = velocity;
        if reset_acceleration {
            self.acceleration = Vec3::ZERO;
        }
    }

    fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    fn center_of_mass(&self) -> Vec3 {
        self.center_of_mass
    }

    fn set_center_of_mass(&mut self, center_of_mass: Vec3) {
        self.center_of_mass = center_of_mass;
    }

    fn add_force(&mut self, force: Vec3) {
        self.acceleration += force;
    }

    fn deflect(&mut self, surface_normal: Vec3, surface_bounciness: f32) {
        let normal = surface_normal.normalize_or_zero();
        if normal == Vec3::ZERO {
            return;
        }

        let reflected = self.velocity - 2.0 * self.velocity.dot(normal) * normal;
        self.velocity = reflected * surface_bounciness;
    }

    fn stop_movement(&mut self) {
        self.velocity = Vec3::ZERO;
        self.acceleration = Vec3::ZERO;
    }

    fn is_moving(&self) -> bool {
        self.velocity.length_squared() > 0.0
    }

    fn clear_velocity(&mut self) {
        self.velocity = Vec3::ZERO;
    }
}
