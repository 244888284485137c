use std::any::Any;
use std::sync::OnceLock;

use glam::Vec3;

use crate::animation::{Animatable, AnimationLibrary, AnimationValue, ChannelId};
use crate::math::frame::CartesianFrame;
use crate::scene::NodeKey;
use crate::scene::component::{
    ClassUid, Component, ComponentBase, ComponentHealth, LogicContext,
};
use crate::scene::influence::InfluenceArea;

/// How a push source shapes its force.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PushKind {
    /// Constant direction, set by hand or tracking the carrier's facing.
    Directional { direction: Vec3 },
    /// Radially away from the carrier's origin.
    Radial,
}

/// Per-cycle snapshot of one modifier, taken by the tree before the physics
/// pass so force application never aliases the component storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PushSource {
    /// Node carrying the modifier; that node never pushes itself.
    pub node: NodeKey,
    /// World frame of the carrying node at snapshot time.
    pub frame: CartesianFrame,
    pub kind: PushKind,
    pub magnitude: f32,
    pub area: Option<InfluenceArea>,
}

impl PushSource {
    /// Force this source exerts on a movable at `target` (world space).
    /// Zero outside the influence area, or when the source is degenerate.
    #[must_use]
    pub fn force_on(&self, target_position: Vec3) -> Vec3 {
        let strength = match &self.area {
            Some(area) => area.influence(&self.frame, target_position),
            None => 1.0,
        };

        if strength <= 0.0 || self.magnitude == 0.0 {
            return Vec3::ZERO;
        }

        match self.kind {
            PushKind::Directional { direction } => direction * self.magnitude * strength,
            PushKind::Radial => {
                let offset = target_position - self.frame.position;
                // A target sitting exactly on the origin has no radial
                // direction; push it along the carrier's facing at full
                // strength instead.
                let direction = offset
                    .try_normalize()
                    .unwrap_or_else(|| self.frame.forward());
                direction * self.magnitude * strength
            }
        }
    }
}

// ============================================================================
// DirectionalPushModifier
// ============================================================================

/// Pushes movables along one direction, bounded by an influence area.
///
/// By default the direction tracks the carrying node's forward axis and is
/// refreshed on every move; [`DirectionalPushModifier::set_custom_direction`]
/// freezes it instead.
#[derive(Debug)]
pub struct DirectionalPushModifier {
    base: ComponentBase,
    magnitude: f32,
    direction: Vec3,
    track_parent_facing: bool,
    influence_area: Option<InfluenceArea>,
}

impl DirectionalPushModifier {
    /// Animation channel driving the magnitude.
    pub const MAGNITUDE: ChannelId = ChannelId(0);

    #[must_use]
    pub fn new(name: impl Into<String>, magnitude: f32) -> Self {
        Self {
            base: ComponentBase::new(name),
            magnitude,
            direction: Vec3::NEG_Z,
            track_parent_facing: true,
            influence_area: None,
        }
    }

    fn type_uid() -> ClassUid {
        static UID: OnceLock<ClassUid> = OnceLock::new();
        *UID.get_or_init(ClassUid::next)
    }

    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    pub fn set_magnitude(&mut self, magnitude: f32) {
        self.magnitude = magnitude;
    }

    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Freezes the push direction; the carrier's facing is ignored from now
    /// on.
    pub fn set_custom_direction(&mut self, direction: Vec3) {
        self.direction = direction.normalize_or_zero();
        self.track_parent_facing = false;
    }

    /// Drops the frozen direction and resumes tracking the carrier's
    /// forward axis.
    pub fn clear_custom_direction(&mut self) {
        self.track_parent_facing = true;
    }

    #[must_use]
    pub fn is_tracking_parent_facing(&self) -> bool {
        self.track_parent_facing
    }

    /// Replaces any existing influence area with a cube.
    pub fn create_cubic_influence_area(&mut self, size: f32) -> &InfluenceArea {
        self.influence_area.insert(InfluenceArea::cubic(size))
    }

    /// Replaces any existing influence area with a sphere.
    pub fn create_spherical_influence_area(
        &mut self,
        outer_radius: f32,
        inner_radius: f32,
    ) -> &InfluenceArea {
        self.influence_area
            .insert(InfluenceArea::spherical(outer_radius, inner_radius))
    }

    pub fn remove_influence_area(&mut self) {
        self.influence_area = None;
    }

    #[must_use]
    pub fn influence_area(&self) -> Option<&InfluenceArea> {
        self.influence_area.as_ref()
    }
}

impl Animatable for DirectionalPushModifier {
    fn animations(&self) -> &AnimationLibrary {
        &self.base.animations
    }

    fn animations_mut(&mut self) -> &mut AnimationLibrary {
        &mut self.base.animations
    }

    fn play_animation(&mut self, channel: ChannelId, value: &AnimationValue) -> bool {
        match channel {
            Self::MAGNITUDE => match value.as_scalar() {
                Some(magnitude) => {
                    self.magnitude = magnitude;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}

impl Component for DirectionalPushModifier {
    fn component_type(&self) -> &'static str {
        "DirectionalPushModifier"
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

    fn on_parent_moved(&mut self, parent_world: &CartesianFrame) {
        if self.track_parent_facing {
            self.direction = parent_world.forward();
        }
    }

    fn process_logics(&mut self, context: &LogicContext<'_>) -> ComponentHealth {
        self.update_animations(context.cycle);

        // An animation-driven magnitude can go non-finite.
        if !self.magnitude.is_finite() {
            return ComponentHealth::Broken;
        }

        ComponentHealth::Sound
    }

    fn push_source(&self, parent_world: &CartesianFrame) -> Option<PushSource> {
        Some(PushSource {
            node: NodeKey::default(),
            frame: *parent_world,
            kind: PushKind::Directional {
                direction: self.direction,
            },
            magnitude: self.magnitude,
            area: self.influence_area,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ============================================================================
// SphericalPushModifier
// ============================================================================

/// Pushes movables radially away from the carrying node.
#[derive(Debug)]
pub struct SphericalPushModifier {
    base: ComponentBase,
    magnitude: f32,
    influence_area: Option<InfluenceArea>,
}

impl SphericalPushModifier {
    /// Animation channel driving the magnitude.
    pub const MAGNITUDE: ChannelId = ChannelId(0);

    #[must_use]
    pub fn new(name: impl Into<String>, magnitude: f32) -> Self {
        Self {
            base: ComponentBase::new(name),
            magnitude,
            influence_area: None,
        }
    }

    fn type_uid() -> ClassUid {
        static UID: OnceLock<ClassUid> = OnceLock::new();
        *UID.get_or_init(ClassUid::next)
    }

    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    pub fn set_magnitude(&mut self, magnitude: f32) {
        self.magnitude = magnitude;
    }

    /// Replaces any existing influence area with a cube.
    pub fn create_cubic_influence_area(&mut self, size: f32) -> &InfluenceArea {
        self.influence_area.insert(InfluenceArea::cubic(size))
    }

    /// Replaces any existing influence area with a sphere.
    pub fn create_spherical_influence_area(
        &mut self,
        outer_radius: f32,
        inner_radius: f32,
    ) -> &InfluenceArea {
        self.influence_area
            .insert(InfluenceArea::spherical(outer_radius, inner_radius))
    }

    pub fn remove_influence_area(&mut self) {
        self.influence_area = None;
    }

    #[must_use]
    pub fn influence_area(&self) -> Option<&InfluenceArea> {
        self.influence_area.as_ref()
    }
}

impl Animatable for SphericalPushModifier {
    fn animations(&self) -> &AnimationLibrary {
        &self.base.animations
    }

    fn animations_mut(&mut self) -> &mut AnimationLibrary {
        &mut self.base.animations
    }

    fn play_animation(&mut self, channel: ChannelId, value: &AnimationValue) -> bool {
        match channel {
            Self::MAGNITUDE => match value.as_scalar() {
                Some(magnitude) => {
                    self.magnitude = magnitude;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}

impl Component for SphericalPushModifier {
    fn component_type(&self) -> &'static str {
        "SphericalPushModifier"
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

        if !self.magnitude.is_finite() {
            return ComponentHealth::Broken;
        }

        ComponentHealth::Sound
    }

    fn push_source(&self, parent_world: &CartesianFrame) -> Option<PushSource> {
        Some(PushSource {
            node: NodeKey::default(),
            frame: *parent_world,
            kind: PushKind::Radial,
            magnitude: self.magnitude,
            area: self.influence_area,
        })
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
    fn radial_force_points_away_from_origin() {
        let source = PushSource {
            node: NodeKey::default(),
            frame: CartesianFrame::IDENTITY,
            kind: PushKind::Radial,
            magnitude: 2.0,
            area: None,
        };

        let force = source.force_on(Vec3::new(3.0, 0.0, 0.0));
        assert!((force - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn radial_force_at_the_origin_follows_the_carrier_facing() {
        let source = PushSource {
            node: NodeKey::default(),
            frame: CartesianFrame::IDENTITY,
            kind: PushKind::Radial,
            magnitude: 2.0,
            area: None,
        };

        // Full magnitude, along the carrier's forward axis.
        let force = source.force_on(Vec3::ZERO);
        assert!((force - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-6);
    }

    #[test]
    fn custom_direction_stops_tracking() {
        let mut modifier = DirectionalPushModifier::new("fan", 1.0);
        assert!(modifier.is_tracking_parent_facing());

        modifier.set_custom_direction(Vec3::X);
        assert!(!modifier.is_tracking_parent_facing());

        // A parent move no longer touches the frozen direction.
        let mut frame = CartesianFrame::IDENTITY;
        frame.rotate_parent(std::f32::consts::FRAC_PI_2, Vec3::Y);
        modifier.on_parent_moved(&frame);
        assert!((modifier.direction() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn influence_area_replacement_is_last_write_wins() {
        let mut modifier = SphericalPushModifier::new("blast", 1.0);
        modifier.create_cubic_influence_area(4.0);
        modifier.create_spherical_influence_area(10.0, 0.0);

        assert!(matches!(
            modifier.influence_area(),
            Some(InfluenceArea::Spherical { .. })
        ));
    }
}
