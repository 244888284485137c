use glam::Vec3;

/// Physical properties of a scene object.
///
/// Mass is cached alongside its inverse so the integrator never divides.
/// A zero mass means the object ignores forces entirely (massless markers,
/// cameras, trigger volumes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalObjectProperties {
    mass: f32,
    inverse_mass: f32,
    surface: f32,
    drag_coefficient: f32,
    bounciness: f32,
    stickiness: f32,
}

impl PhysicalObjectProperties {
    /// `mass` in kilograms, `surface` in square meters.
    #[must_use]
    pub fn new(
        mass: f32,
        surface: f32,
        drag_coefficient: f32,
        bounciness: f32,
        stickiness: f32,
    ) -> Self {
        let mut properties = Self::default();
        properties.set_mass(mass);
        properties.set_surface(surface);
        properties.set_drag_coefficient(drag_coefficient);
        properties.set_bounciness(bounciness);
        properties.set_stickiness(stickiness);
        properties
    }

    /// Returns false (and leaves the value untouched) for negative input.
    pub fn set_mass(&mut self, value: f32) -> bool {
        if value < 0.0 {
            log::warn!("Rejecting negative mass {value}");
            return false;
        }
        self.mass = value;
        self.inverse_mass = if value > 0.0 { 1.0 / value } else { 0.0 };
        true
    }

    #[must_use]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[must_use]
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    #[must_use]
    pub fn is_massless(&self) -> bool {
        self.mass <= 0.0
    }

    pub fn set_surface(&mut self, value: f32) -> bool {
        if value < 0.0 {
            log::warn!("Rejecting negative surface {value}");
            return false;
        }
        self.surface = value;
        true
    }

    #[must_use]
    pub fn surface(&self) -> f32 {
        self.surface
    }

    pub fn set_drag_coefficient(&mut self, value: f32) -> bool {
        if value < 0.0 {
            log::warn!("Rejecting negative drag coefficient {value}");
            return false;
        }
        self.drag_coefficient = value;
        true
    }

    #[must_use]
    pub fn drag_coefficient(&self) -> f32 {
        self.drag_coefficient
    }

    pub fn set_bounciness(&mut self, value: f32) -> bool {
        if !(0.0..=1.0).contains(&value) {
            log::warn!("Rejecting out-of-range bounciness {value}");
            return false;
        }
        self.bounciness = value;
        true
    }

    #[must_use]
    pub fn bounciness(&self) -> f32 {
        self.bounciness
    }

    pub fn set_stickiness(&mut self, value: f32) -> bool {
        if !(0.0..=1.0).contains(&value) {
            log::warn!("Rejecting out-of-range stickiness {value}");
            return false;
        }
        self.stickiness = value;
        true
    }

    #[must_use]
    pub fn stickiness(&self) -> f32 {
        self.stickiness
    }

    /// Merges another property set into this one: masses are summed, the
    /// bigger surface wins, the remaining coefficients are averaged.
    pub fn merge(&mut self, other: &Self) {
        self.set_mass(self.mass + other.mass);
        self.surface = self.surface.max(other.surface);
        self.drag_coefficient = (self.drag_coefficient + other.drag_coefficient) * 0.5;
        self.bounciness = (self.bounciness + other.bounciness) * 0.5;
        self.stickiness = (self.stickiness + other.stickiness) * 0.5;
    }
}

impl Default for PhysicalObjectProperties {
    fn default() -> Self {
        Self {
            mass: 0.0,
            inverse_mass: 0.0,
            surface: 0.0,
            drag_coefficient: 0.0,
            bounciness: 0.5,
            stickiness: 0.5,
        }
    }
}

/// Environment the physics integration runs in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentProperties {
    /// Gravitational acceleration, m/s^2.
    pub gravity: Vec3,
    /// Medium density, kg/m^3 (drag).
    pub density: f32,
}

impl EnvironmentProperties {
    /// Earth surface gravity in sea-level air.
    #[must_use]
    pub fn earth() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.80665, 0.0),
            density: 1.225,
        }
    }

    /// No gravity, no drag. Convenient for tests and space scenes.
    #[must_use]
    pub fn void() -> Self {
        Self {
            gravity: Vec3::ZERO,
            density: 0.0,
        }
    }
}

impl Default for EnvironmentProperties {
    fn default() -> Self {
        Self::earth()
    }
}
