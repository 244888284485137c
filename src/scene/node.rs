use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use bitflags::bitflags;

use crate::animation::{AnimationLibrary, ChannelId};
use crate::math::bounds::{BoundingBox, BoundingSphere};
use crate::math::frame::CartesianFrame;
use crate::physics::{MovableState, PhysicalObjectProperties};
use crate::scene::NodeKey;
use crate::scene::component::Component;

/// Name reserved for the tree root.
pub const ROOT_NODE_NAME: &str = "root";

bitflags! {
    /// Per-node boolean state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        /// At least one attached component carries visible geometry.
        const RENDERABLE          = 1 << 0;
        /// At least one attached component carries physical properties.
        const PHYSICAL            = 1 << 1;
        /// Visibility tests use the bounding sphere instead of the box.
        const SPHERE_COLLISION    = 1 << 2;
        /// The node reacts to forces; cleared on the root.
        const MOVABLE             = 1 << 3;
        /// Physics integration skips this node entirely.
        const SIMULATION_PAUSED   = 1 << 4;
        /// Gravity is ignored for this node.
        const FREE_FLY            = 1 << 5;
        /// The node passes through other physical objects.
        const NO_CLIPPING         = 1 << 6;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::MOVABLE
    }
}

/// A tree element holding a spatial frame and owning zero or more children.
///
/// The parent link is a bare arena key: relation and lookup only, never
/// ownership. Children are owned through the name-keyed map, which is the
/// single strong edge of the hierarchy; names are unique per level by
/// construction.
///
/// Structural mutation happens through `NodeTree`; the node itself only
/// carries data. The one exception is [`Node::discard`], which any thread
/// may call on a shared reference to schedule the node for removal at the
/// next trim pass.
pub struct Node {
    name: String,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: BTreeMap<String, NodeKey>,

    /// Local frame, relative to the parent. The world frame is derived by
    /// the tree, never stored.
    pub frame: CartesianFrame,

    pub(crate) flags: NodeFlags,
    discarded: AtomicBool,

    /// Scene time at creation, milliseconds.
    born_at_ms: u64,
    /// Advanced once per logic cycle.
    pub(crate) lifetime_ms: u64,

    /// Physical facet: force accumulation and velocity.
    pub movable: MovableState,

    /// Animation channels; ids are the `Node::LOCAL_*` / `PARENT_*` /
    /// `WORLD_*` constants.
    pub(crate) animations: AnimationLibrary,

    pub(crate) components: BTreeMap<String, Box<dyn Component>>,

    /// Aggregate of the attached components' local volumes.
    pub(crate) local_bounding_box: BoundingBox,
    pub(crate) local_bounding_sphere: BoundingSphere,
    /// Aggregate of the attached components' physical properties.
    pub(crate) properties: PhysicalObjectProperties,
}

impl Node {
    // ========================================================================
    // Animation channel ids
    // ========================================================================

    /// Replaces the whole local frame.
    pub const LOCAL_FRAME: ChannelId = ChannelId(0);

    pub const LOCAL_POSITION: ChannelId = ChannelId(1);
    pub const LOCAL_X_POSITION: ChannelId = ChannelId(2);
    pub const LOCAL_Y_POSITION: ChannelId = ChannelId(3);
    pub const LOCAL_Z_POSITION: ChannelId = ChannelId(4);
    pub const LOCAL_TRANSLATION: ChannelId = ChannelId(5);
    pub const LOCAL_X_TRANSLATION: ChannelId = ChannelId(6);
    pub const LOCAL_Y_TRANSLATION: ChannelId = ChannelId(7);
    pub const LOCAL_Z_TRANSLATION: ChannelId = ChannelId(8);
    /// Accepted but currently dispatches to nothing (axis-angle vector form).
    pub const LOCAL_ROTATION: ChannelId = ChannelId(9);
    pub const LOCAL_X_ROTATION: ChannelId = ChannelId(10);
    pub const LOCAL_Y_ROTATION: ChannelId = ChannelId(11);
    pub const LOCAL_Z_ROTATION: ChannelId = ChannelId(12);

    pub const PARENT_POSITION: ChannelId = ChannelId(13);
    pub const PARENT_X_POSITION: ChannelId = ChannelId(14);
    pub const PARENT_Y_POSITION: ChannelId = ChannelId(15);
    pub const PARENT_Z_POSITION: ChannelId = ChannelId(16);
    pub const PARENT_TRANSLATION: ChannelId = ChannelId(17);
    pub const PARENT_X_TRANSLATION: ChannelId = ChannelId(18);
    pub const PARENT_Y_TRANSLATION: ChannelId = ChannelId(19);
    pub const PARENT_Z_TRANSLATION: ChannelId = ChannelId(20);
    /// Accepted but currently dispatches to nothing (axis-angle vector form).
    pub const PARENT_ROTATION: ChannelId = ChannelId(21);
    pub const PARENT_X_ROTATION: ChannelId = ChannelId(22);
    pub const PARENT_Y_ROTATION: ChannelId = ChannelId(23);
    pub const PARENT_Z_ROTATION: ChannelId = ChannelId(24);

    pub const WORLD_POSITION: ChannelId = ChannelId(25);
    pub const WORLD_X_POSITION: ChannelId = ChannelId(26);
    pub const WORLD_Y_POSITION: ChannelId = ChannelId(27);
    pub const WORLD_Z_POSITION: ChannelId = ChannelId(28);
    pub const WORLD_TRANSLATION: ChannelId = ChannelId(29);
    pub const WORLD_X_TRANSLATION: ChannelId = ChannelId(30);
    pub const WORLD_Y_TRANSLATION: ChannelId = ChannelId(31);
    pub const WORLD_Z_TRANSLATION: ChannelId = ChannelId(32);
    /// Accepted but currently dispatches to nothing (axis-angle vector form).
    pub const WORLD_ROTATION: ChannelId = ChannelId(33);
    pub const WORLD_X_ROTATION: ChannelId = ChannelId(34);
    pub const WORLD_Y_ROTATION: ChannelId = ChannelId(35);
    pub const WORLD_Z_ROTATION: ChannelId = ChannelId(36);

    pub(crate) fn new(name: impl Into<String>, frame: CartesianFrame, born_at_ms: u64) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: BTreeMap::new(),
            frame,
            flags: NodeFlags::default(),
            discarded: AtomicBool::new(false),
            born_at_ms,
            lifetime_ms: 0,
            movable: MovableState::new(),
            animations: AnimationLibrary::new(),
            components: BTreeMap::new(),
            local_bounding_box: BoundingBox::EMPTY,
            local_bounding_sphere: BoundingSphere::EMPTY,
            properties: PhysicalObjectProperties::default(),
        }
    }

    /// The root node: immovable, no parent.
    pub(crate) fn new_root() -> Self {
        let mut root = Self::new(ROOT_NODE_NAME, CartesianFrame::IDENTITY, 0);
        root.flags.remove(NodeFlags::MOVABLE);
        root
    }

    // ========================================================================
    // Identity & hierarchy
    // ========================================================================

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Holds iff the parent back-reference is unset.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Name-keyed children, ordered by name.
    #[must_use]
    pub fn children(&self) -> &BTreeMap<String, NodeKey> {
        &self.children
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Marks the node for removal at the next trim pass.
    ///
    /// Callable from any thread on a shared reference: the flag is atomic
    /// and nothing structural changes here. The actual unlink happens in
    /// `NodeTree::trim_tree`, on the thread owning the tree. The flag is
    /// ignored on the root, which is never trimmed.
    pub fn discard(&self) {
        self.discarded.store(true, Ordering::Release);
    }

    /// Whether the next trim pass will destroy this node.
    #[must_use]
    pub fn is_discardable(&self) -> bool {
        self.discarded.load(Ordering::Acquire)
    }

    /// Scene time at creation, milliseconds.
    #[must_use]
    pub fn born_at_ms(&self) -> u64 {
        self.born_at_ms
    }

    /// How long this node has existed, in logic-cycle milliseconds.
    #[must_use]
    pub fn lifetime_ms(&self) -> u64 {
        self.lifetime_ms
    }

    // ========================================================================
    // Flags
    // ========================================================================

    #[must_use]
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn enable_sphere_collision(&mut self, state: bool) {
        self.flags.set(NodeFlags::SPHERE_COLLISION, state);
    }

    #[must_use]
    pub fn sphere_collision_is_enabled(&self) -> bool {
        self.flags.contains(NodeFlags::SPHERE_COLLISION)
    }

    pub fn set_moving_ability(&mut self, state: bool) {
        self.flags.set(NodeFlags::MOVABLE, state);
    }

    #[must_use]
    pub fn is_movable(&self) -> bool {
        self.flags.contains(NodeFlags::MOVABLE)
    }

    pub fn pause_simulation(&mut self, state: bool) {
        self.flags.set(NodeFlags::SIMULATION_PAUSED, state);
    }

    #[must_use]
    pub fn is_simulation_paused(&self) -> bool {
        self.flags.contains(NodeFlags::SIMULATION_PAUSED)
    }

    pub fn enable_free_fly_mode(&mut self, state: bool) {
        self.flags.set(NodeFlags::FREE_FLY, state);
    }

    #[must_use]
    pub fn is_free_fly_mode_enabled(&self) -> bool {
        self.flags.contains(NodeFlags::FREE_FLY)
    }

    pub fn enable_no_clipping_mode(&mut self, state: bool) {
        self.flags.set(NodeFlags::NO_CLIPPING, state);
    }

    #[must_use]
    pub fn is_no_clipping_mode_enabled(&self) -> bool {
        self.flags.contains(NodeFlags::NO_CLIPPING)
    }

    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.flags.contains(NodeFlags::RENDERABLE)
    }

    #[must_use]
    pub fn has_physical_properties(&self) -> bool {
        self.flags.contains(NodeFlags::PHYSICAL)
    }

    // ========================================================================
    // Components & volumes
    // ========================================================================

    #[must_use]
    pub fn component(&self, name: &str) -> Option<&dyn Component> {
        self.components.get(name).map(|boxed| &**boxed)
    }

    pub fn component_mut(&mut self, name: &str) -> Option<&mut dyn Component> {
        self.components.get_mut(name).map(|boxed| &mut **boxed)
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Aggregate bounding box of the attached components, in local space.
    /// Invalid when nothing attached carries geometry.
    #[must_use]
    pub fn local_bounding_box(&self) -> &BoundingBox {
        &self.local_bounding_box
    }

    /// Aggregate bounding sphere of the attached components, in local space.
    #[must_use]
    pub fn local_bounding_sphere(&self) -> &BoundingSphere {
        &self.local_bounding_sphere
    }

    /// Aggregate physical properties of the attached components.
    #[must_use]
    pub fn physical_properties(&self) -> &PhysicalObjectProperties {
        &self.properties
    }

    #[must_use]
    pub fn animations(&self) -> &AnimationLibrary {
        &self.animations
    }

    pub fn animations_mut(&mut self) -> &mut AnimationLibrary {
        &mut self.animations
    }

    /// Recomputes the aggregate volumes, properties and flags from the
    /// attached components.
    pub(crate) fn rebuild_aggregates(&mut self) {
        self.local_bounding_box = BoundingBox::EMPTY;
        self.local_bounding_sphere = BoundingSphere::EMPTY;
        self.properties = PhysicalObjectProperties::default();

        let mut renderable = false;

        for component in self.components.values() {
            let base = component.base();
            if base.bounding_box.is_valid() {
                self.local_bounding_box = self.local_bounding_box.union(&base.bounding_box);
                renderable = true;
            }
            if base.bounding_sphere.is_valid() {
                self.local_bounding_sphere =
                    self.local_bounding_sphere.union(&base.bounding_sphere);
            }
            self.properties.merge(&base.properties);
        }

        self.flags.set(NodeFlags::RENDERABLE, renderable);
        self.flags
            .set(NodeFlags::PHYSICAL, !self.properties.is_massless());
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("frame", &self.frame)
            .field("flags", &self.flags)
            .field("discarded", &self.is_discardable())
            .field("lifetime_ms", &self.lifetime_ms)
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
