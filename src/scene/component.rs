use std::any::Any;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::animation::{Animatable, AnimationLibrary, AnimationValue, ChannelId};
use crate::math::bounds::{BoundingBox, BoundingSphere};
use crate::math::frame::CartesianFrame;
use crate::physics::{EnvironmentProperties, PhysicalObjectProperties};
use crate::scene::modifier::PushSource;

/// Process-unique integer tag identifying a component type.
///
/// Allocated lazily, once per type, from a global counter. A cheap
/// alternative to full runtime type information when routing notifications
/// or filtering components by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassUid(u64);

static NEXT_CLASS_UID: AtomicU64 = AtomicU64::new(1);

impl ClassUid {
    /// Allocates a fresh uid. Component types call this once through a
    /// `OnceLock` so every instance of a type reports the same tag.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_CLASS_UID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Per-cycle context handed to every component.
#[derive(Debug, Clone, Copy)]
pub struct LogicContext<'a> {
    /// Engine cycle number, for time-dependent effects.
    pub cycle: u64,
    /// Fixed cycle duration, milliseconds.
    pub delta_ms: u64,
    /// World frame of the entity the component is attached to.
    pub parent_world: CartesianFrame,
    pub environment: &'a EnvironmentProperties,
}

/// Outcome of a component's logic step.
///
/// A component that can no longer function reports [`ComponentHealth::Broken`]
/// instead of panicking; the tree unhooks it and emits a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentHealth {
    Sound,
    Broken,
}

/// Shared storage every component carries: name, local bounding volumes,
/// physical properties and animation channels.
///
/// Both volumes default to invalid, which is the correct state for
/// components contributing no visible or physical geometry.
#[derive(Debug)]
pub struct ComponentBase {
    name: String,
    pub bounding_box: BoundingBox,
    pub bounding_sphere: BoundingSphere,
    pub properties: PhysicalObjectProperties,
    pub animations: AnimationLibrary,
}

impl ComponentBase {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounding_box: BoundingBox::EMPTY,
            bounding_sphere: BoundingSphere::EMPTY,
            properties: PhysicalObjectProperties::default(),
            animations: AnimationLibrary::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Base contract for anything attached to a scene node.
///
/// A component belongs to exactly one node for its whole life: it is handed
/// to the tree at attach time and the parent reference never changes.
/// Each cycle the tree calls [`Component::process_logics`]; whenever the
/// owning node moves, [`Component::on_parent_moved`] follows.
pub trait Component: Any + Send + Sync {
    /// Stable string tag of the concrete type.
    fn component_type(&self) -> &'static str;

    /// Integer tag of the concrete type, same value for all instances.
    fn class_uid(&self) -> ClassUid;

    fn base(&self) -> &ComponentBase;

    fn base_mut(&mut self) -> &mut ComponentBase;

    /// Reacts to the owning node having moved; `parent_world` is the node's
    /// new world frame.
    fn on_parent_moved(&mut self, parent_world: &CartesianFrame);

    /// Per-cycle simulation step, including animation playback for
    /// animatable components.
    fn process_logics(&mut self, context: &LogicContext<'_>) -> ComponentHealth;

    /// Force-field snapshot, for components that push movables around.
    /// The default is none: most components exert no force.
    fn push_source(&self, parent_world: &CartesianFrame) -> Option<PushSource> {
        let _ = parent_world;
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    #[must_use]
    fn name(&self) -> &str {
        self.base().name()
    }
}

// ============================================================================
// Weight
// ============================================================================

/// A pure mass with no geometry: both bounding volumes stay invalid, only
/// the physical properties contribute to the owning node.
#[derive(Debug)]
pub struct Weight {
    base: ComponentBase,
}

impl Weight {
    /// Animation channel driving the mass.
    pub const MASS: ChannelId = ChannelId(0);

    #[must_use]
    pub fn new(name: impl Into<String>, mass: f32) -> Self {
        let mut base = ComponentBase::new(name);
        base.properties.set_mass(mass);
        Self { base }
    }

    fn type_uid() -> ClassUid {
        static UID: OnceLock<ClassUid> = OnceLock::new();
        *UID.get_or_init(ClassUid::next)
    }
}

impl Animatable for Weight {
    fn animations(&self) -> &AnimationLibrary {
        &self.base.animations
    }

    fn animations_mut(&mut self) -> &mut AnimationLibrary {
        &mut self.base.animations
    }

    fn play_animation(&mut self, channel: ChannelId, value: &AnimationValue) -> bool {
        match channel {
            Self::MASS => value
                .as_scalar()
                .is_some_and(|mass| self.base.properties.set_mass(mass)),
            _ => false,
        }
    }
}

impl Component for Weight {
    fn component_type(&self) -> &'static str {
        "Weight"
    }

    fn class_uid(&self) -> ClassUid {
        Self::type_uid()
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn on_parent_moved(&mut self, _parent_world: &CartesianFrame) {}

    fn process_logics(&mut self, context: &LogicContext<'_>) -> ComponentHealth {
        self.update_animations(context.cycle);
        ComponentHealth::Sound
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_uid_is_stable_per_type() {
        let a = Weight::new("a", 1.0);
        let b = Weight::new("b", 2.0);
        assert_eq!(a.class_uid(), b.class_uid());
    }

    #[test]
    fn weight_has_invalid_volumes() {
        let weight = Weight::new("ballast", 50.0);
        assert!(!weight.base().bounding_box.is_valid());
        assert!(!weight.base().bounding_sphere.is_valid());
        assert!((weight.base().properties.mass() - 50.0).abs() < 1e-6);
    }

    #[test]
    fn weight_rejects_foreign_channels() {
        let mut weight = Weight::new("ballast", 1.0);
        assert!(!weight.play_animation(ChannelId(99), &AnimationValue::Scalar(1.0)));
        assert!(weight.play_animation(Weight::MASS, &AnimationValue::Scalar(3.0)));
        assert!((weight.base().properties.mass() - 3.0).abs() < 1e-6);
    }
}
