use glam::{Affine3A, Vec3};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::animation::{Animation, AnimationValue, ChannelId};
use crate::errors::{Result, SylvaError};
use crate::math::bounds::{BoundingBox, BoundingSphere};
use crate::math::frame::{Axis, CartesianFrame, TransformSpace};
use crate::math::frustum::{Containment, Frustum};
use crate::physics::{EnvironmentProperties, Movable};
use crate::scene::NodeKey;
use crate::scene::component::{Component, ComponentHealth, LogicContext};
use crate::scene::events::{EventBus, SceneEvent};
use crate::scene::modifier::PushSource;
use crate::scene::node::{Node, ROOT_NODE_NAME};
use crate::{CYCLE_DURATION_MS, CYCLE_DURATION_SECS};

/// Per-cycle scratch for collected modifier snapshots.
type PushSources = SmallVec<[PushSource; 8]>;

/// The scene node tree: a flat arena of [`Node`]s related by keys.
///
/// The arena is the single owner of every node; parent and child links are
/// bare keys, so ownership cycles are impossible by construction. All
/// structural mutation and traversal happens through `&mut self` on the
/// thread owning the tree. The one deliberate exception is
/// [`NodeTree::discard`], which marks a node through a shared reference and
/// leaves the unlinking to the next [`NodeTree::trim_tree`] pass.
///
/// World-space data is always derived by composing local frames from the
/// root down; nothing world-space is ever stored.
pub struct NodeTree {
    nodes: SlotMap<NodeKey, Node>,
    root: NodeKey,
    events: EventBus,
    cycle: u64,
    scene_time_ms: u64,
}

impl NodeTree {
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new_root());

        Self {
            nodes,
            root,
            events: EventBus::new(),
            cycle: 0,
            scene_time_ms: 0,
        }
    }

    // ========================================================================
    // Access
    // ========================================================================

    #[must_use]
    pub fn root(&self) -> NodeKey {
        self.root
    }

    #[must_use]
    pub fn get(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    #[must_use]
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of nodes in the tree, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_root(&self, key: NodeKey) -> bool {
        key == self.root
    }

    /// Engine cycles processed so far.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Scene time advanced by the logic loop, milliseconds.
    #[must_use]
    pub fn scene_time_ms(&self) -> u64 {
        self.scene_time_ms
    }

    /// Registers an observer; see [`SceneEvent`] for the notifications.
    pub fn subscribe(&mut self) -> flume::Receiver<SceneEvent> {
        self.events.subscribe()
    }

    /// Number of edges between the node and the root.
    #[must_use]
    pub fn depth(&self, key: NodeKey) -> Option<usize> {
        let mut depth = 0;
        let mut cursor = self.nodes.get(key)?.parent;

        while let Some(k) = cursor {
            depth += 1;
            cursor = self.expect_node(k).parent;
        }

        Some(depth)
    }

    /// Fetches a node through a link the tree itself recorded. A dangling
    /// parent or child key means the tree is corrupt: abort.
    fn expect_node(&self, key: NodeKey) -> &Node {
        self.nodes.get(key).map_or_else(
            || unreachable!("key recorded in the tree but missing from the arena"),
            |node| node,
        )
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Creates a child node under `parent`.
    ///
    /// Fails when the name is the reserved root name or already taken among
    /// the current children; the failure is recoverable and the existing
    /// child is unaffected. Emits [`SceneEvent::SubNodeCreating`] and
    /// [`SceneEvent::SubNodeCreated`] around the insertion.
    pub fn create_child(
        &mut self,
        parent: NodeKey,
        name: &str,
        frame: CartesianFrame,
    ) -> Result<NodeKey> {
        if name == ROOT_NODE_NAME {
            log::error!("The node name '{ROOT_NODE_NAME}' is reserved");
            return Err(SylvaError::ReservedNodeName(name.to_owned()));
        }

        let Some(parent_node) = self.nodes.get(parent) else {
            return Err(SylvaError::NodeNotFound);
        };

        if parent_node.children.contains_key(name) {
            log::error!("The node name '{name}' is already used at this level");
            return Err(SylvaError::DuplicateNodeName(name.to_owned()));
        }

        self.events.emit(&SceneEvent::SubNodeCreating {
            parent,
            name: name.to_owned(),
        });

        let mut node = Node::new(name, frame, self.scene_time_ms);
        node.parent = Some(parent);
        let key = self.nodes.insert(node);
        self.nodes[parent].children.insert(name.to_owned(), key);

        self.events
            .emit(&SceneEvent::SubNodeCreated { parent, node: key });

        Ok(key)
    }

    /// Looks up a direct child by name.
    #[must_use]
    pub fn find_child(&self, parent: NodeKey, name: &str) -> Option<NodeKey> {
        self.nodes.get(parent)?.children.get(name).copied()
    }

    /// Immediately detaches and destroys the subtree rooted at the named
    /// child. Returns false if there is no such child.
    pub fn destroy_child(&mut self, parent: NodeKey, name: &str) -> bool {
        let Some(child) = self.find_child(parent, name) else {
            return false;
        };

        self.events.emit(&SceneEvent::SubNodeDeleting { node: child });

        self.nodes[parent].children.remove(name);
        self.remove_subtree(child);

        self.events.emit(&SceneEvent::SubNodeDeleted {
            parent,
            name: name.to_owned(),
        });

        true
    }

    /// Immediately destroys every child subtree of `parent`.
    pub fn destroy_children(&mut self, parent: NodeKey) {
        let Some(node) = self.nodes.get(parent) else {
            return;
        };

        let names: Vec<String> = node.children.keys().cloned().collect();
        for name in names {
            self.destroy_child(parent, &name);
        }
    }

    /// Hard teardown of the whole tree: every descendant of the root is
    /// destroyed immediately (no discard step) and the root is stripped of
    /// its components and animations.
    pub fn destroy_tree(&mut self) {
        self.destroy_children(self.root);

        let root = self.root;
        if let Some(node) = self.nodes.get_mut(root) {
            node.components.clear();
            node.animations.clear();
            node.rebuild_aggregates();
        }
    }

    /// Moves `child` (and its subtree) under `new_parent`.
    ///
    /// Refused when it would detach the root, create a cycle (the new parent
    /// being the child itself or one of its descendants), or collide with a
    /// sibling name.
    pub fn reparent(&mut self, child: NodeKey, new_parent: NodeKey) -> Result<()> {
        if child == self.root {
            return Err(SylvaError::RootIsImmutable("reparent"));
        }
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(new_parent) {
            return Err(SylvaError::NodeNotFound);
        }

        let name = self.nodes[child].name().to_owned();

        // No node may become its own ancestor: walk up from the new parent
        // and make sure the child is not on the path.
        let mut cursor = Some(new_parent);
        while let Some(k) = cursor {
            if k == child {
                log::error!("Attaching node '{name}' here would create a cycle");
                return Err(SylvaError::WouldCreateCycle(name));
            }
            cursor = self.expect_node(k).parent;
        }

        if new_parent != self.nodes[child].parent.unwrap_or(self.root)
            && self.nodes[new_parent].children.contains_key(&name)
        {
            log::error!("The node name '{name}' is already used at this level");
            return Err(SylvaError::DuplicateNodeName(name));
        }

        if let Some(old_parent) = self.nodes[child].parent {
            self.nodes[old_parent].children.remove(&name);
        }
        self.nodes[new_parent].children.insert(name, child);
        self.nodes[child].parent = Some(new_parent);

        self.on_transform(child);

        Ok(())
    }

    /// Removes a subtree from the arena. Links to it must already be gone.
    fn remove_subtree(&mut self, key: NodeKey) {
        let mut stack: SmallVec<[NodeKey; 16]> = SmallVec::new();
        stack.push(key);

        while let Some(k) = stack.pop() {
            let Some(node) = self.nodes.remove(k) else {
                unreachable!("child key recorded in the tree but missing from the arena");
            };
            stack.extend(node.children.values().copied());
        }
    }

    // ========================================================================
    // Deferred destruction
    // ========================================================================

    /// Marks a node for removal at the next [`NodeTree::trim_tree`] pass.
    ///
    /// Thread-safe and non-structural: any thread holding a shared reference
    /// to the tree may call this while another walks it. The root cannot be
    /// discarded.
    pub fn discard(&self, key: NodeKey) {
        if key == self.root {
            log::error!("The root node cannot be discarded");
            return;
        }

        if let Some(node) = self.nodes.get(key) {
            node.discard();
        }
    }

    #[must_use]
    pub fn is_discardable(&self, key: NodeKey) -> bool {
        self.nodes.get(key).is_some_and(Node::is_discardable)
    }

    /// Sweeps the tree and destroys every subtree whose root was discarded.
    ///
    /// Must run on the thread owning the tree; it is the sole consumer of
    /// the discard flags. A discarded node's children are destroyed with it,
    /// never promoted to the grandparent.
    pub fn trim_tree(&mut self) {
        let mut stack: SmallVec<[NodeKey; 16]> = SmallVec::new();
        stack.push(self.root);

        while let Some(k) = stack.pop() {
            let Some(node) = self.nodes.get(k) else {
                continue;
            };

            let mut doomed: SmallVec<[(String, NodeKey); 4]> = SmallVec::new();
            for (name, &child) in &node.children {
                if self.expect_node(child).is_discardable() {
                    doomed.push((name.clone(), child));
                } else {
                    stack.push(child);
                }
            }

            for (name, child) in doomed {
                self.events.emit(&SceneEvent::SubNodeDeleting { node: child });

                self.nodes[k].children.remove(&name);
                self.remove_subtree(child);

                self.events
                    .emit(&SceneEvent::SubNodeDeleted { parent: k, name });
            }
        }
    }

    // ========================================================================
    // World-space queries
    // ========================================================================

    /// Composes local frames from the root down to `key`. O(depth).
    #[must_use]
    pub fn world_matrix(&self, key: NodeKey) -> Option<Affine3A> {
        self.nodes.get(key)?;

        let mut chain: SmallVec<[NodeKey; 16]> = SmallVec::new();
        let mut cursor = Some(key);
        while let Some(k) = cursor {
            chain.push(k);
            cursor = self.expect_node(k).parent;
        }

        let mut matrix = Affine3A::IDENTITY;
        for k in chain.iter().rev() {
            matrix = matrix * self.expect_node(*k).frame.to_affine();
        }

        Some(matrix)
    }

    /// The node's derived world frame. O(depth).
    #[must_use]
    pub fn world_frame(&self, key: NodeKey) -> Option<CartesianFrame> {
        self.world_matrix(key)
            .map(|matrix| CartesianFrame::from_affine(&matrix))
    }

    /// The node's aggregate bounding box, transformed into world space.
    /// Stays invalid for nodes without geometry.
    #[must_use]
    pub fn world_bounding_box(&self, key: NodeKey) -> Option<BoundingBox> {
        let node = self.nodes.get(key)?;
        let matrix = self.world_matrix(key)?;
        Some(node.local_bounding_box().transform(&matrix))
    }

    /// The node's aggregate bounding sphere carried to its world position.
    /// The radius is kept as-is (scale does not grow it).
    #[must_use]
    pub fn world_bounding_sphere(&self, key: NodeKey) -> Option<BoundingSphere> {
        let node = self.nodes.get(key)?;
        let world = self.world_frame(key)?;
        let local = node.local_bounding_sphere();
        Some(BoundingSphere::new(
            world.position + local.center,
            local.radius,
        ))
    }

    /// Whether the node survives frustum culling, using the sphere or box
    /// test per the node's collision flag. Nodes without any volume are
    /// never culled.
    #[must_use]
    pub fn is_visible(&self, key: NodeKey, frustum: &Frustum) -> Option<bool> {
        let node = self.nodes.get(key)?;

        if node.sphere_collision_is_enabled() {
            let sphere = self.world_bounding_sphere(key)?;
            if !sphere.is_valid() {
                return Some(true);
            }
            Some(frustum.contains_sphere(&sphere) != Containment::Outside)
        } else {
            let bounding_box = self.world_bounding_box(key)?;
            if !bounding_box.is_valid() {
                return Some(true);
            }
            Some(frustum.contains_box(&bounding_box) != Containment::Outside)
        }
    }

    /// World velocity: the node's own velocity summed with every ancestor's.
    #[must_use]
    pub fn world_velocity(&self, key: NodeKey) -> Option<Vec3> {
        let node = self.nodes.get(key)?;

        let mut velocity = node.movable.velocity();
        let mut cursor = node.parent;
        while let Some(k) = cursor {
            let ancestor = self.expect_node(k);
            velocity += ancestor.movable.velocity();
            cursor = ancestor.parent;
        }

        Some(velocity)
    }

    #[must_use]
    pub fn world_center_of_mass(&self, key: NodeKey) -> Option<Vec3> {
        let node = self.nodes.get(key)?;
        let world = self.world_frame(key)?;
        Some(world.position + node.movable.center_of_mass())
    }

    /// Distance between two nodes' world positions; 0 for the same node.
    #[must_use]
    pub fn distance(&self, a: NodeKey, b: NodeKey) -> f32 {
        if a == b {
            return 0.0;
        }

        let (Some(frame_a), Some(frame_b)) = (self.world_frame(a), self.world_frame(b)) else {
            return 0.0;
        };

        frame_a.position.distance(frame_b.position)
    }

    /// Penetration depth of two nodes' world bounding spheres; 0 for the
    /// same node.
    #[must_use]
    pub fn intersection_overlap(&self, a: NodeKey, b: NodeKey) -> f32 {
        if a == b {
            return 0.0;
        }

        let (Some(sphere_a), Some(sphere_b)) =
            (self.world_bounding_sphere(a), self.world_bounding_sphere(b))
        else {
            return 0.0;
        };

        BoundingSphere::intersection_overlap(&sphere_a, &sphere_b)
    }

    // ========================================================================
    // Spatial mutators
    // ========================================================================

    /// True when the mutation may proceed; logs and refuses on the root or a
    /// stale key.
    fn check_mutable(&self, key: NodeKey, operation: &'static str) -> bool {
        if key == self.root {
            log::error!("Cannot {operation} the root node");
            return false;
        }
        if !self.nodes.contains_key(key) {
            log::warn!("Cannot {operation} a node that is no longer in the tree");
            return false;
        }
        true
    }

    /// World matrix of the node's parent; identity for children of the root.
    fn parent_world_matrix(&self, key: NodeKey) -> Affine3A {
        self.nodes
            .get(key)
            .and_then(|node| node.parent)
            .and_then(|parent| self.world_matrix(parent))
            .unwrap_or(Affine3A::IDENTITY)
    }

    /// Sets the node's position. `Local` and `Parent` both set the local
    /// frame position (which *is* the position in parent space); `World`
    /// maps the given world position back through the parent chain.
    pub fn move_to(&mut self, key: NodeKey, position: Vec3, space: TransformSpace) {
        if !self.check_mutable(key, "move") {
            return;
        }

        let new_position = match space {
            TransformSpace::Local | TransformSpace::Parent => position,
            TransformSpace::World => self
                .parent_world_matrix(key)
                .inverse()
                .transform_point3(position),
        };

        self.nodes[key].frame.position = new_position;
        self.on_transform(key);
    }

    /// Sets one coordinate of the node's position in the given space.
    pub fn move_axis_to(&mut self, key: NodeKey, axis: Axis, value: f32, space: TransformSpace) {
        if !self.check_mutable(key, "move") {
            return;
        }

        match space {
            TransformSpace::Local | TransformSpace::Parent => {
                self.nodes[key].frame.position[axis.index()] = value;
                self.on_transform(key);
            }
            TransformSpace::World => {
                let Some(world) = self.world_frame(key) else {
                    return;
                };
                let mut position = world.position;
                position[axis.index()] = value;
                self.move_to(key, position, TransformSpace::World);
            }
        }
    }

    /// Translates the node by `distance` expressed in the given space.
    pub fn move_by(&mut self, key: NodeKey, distance: Vec3, space: TransformSpace) {
        if !self.check_mutable(key, "move") {
            return;
        }

        let delta = match space {
            TransformSpace::Local => self.nodes[key].frame.rotation * distance,
            TransformSpace::Parent => distance,
            TransformSpace::World => self
                .parent_world_matrix(key)
                .inverse()
                .transform_vector3(distance),
        };

        self.nodes[key].frame.position += delta;
        self.on_transform(key);
    }

    /// Translates the node along one axis of the given space.
    pub fn move_axis_by(&mut self, key: NodeKey, axis: Axis, shift: f32, space: TransformSpace) {
        self.move_by(key, axis.unit() * shift, space);
    }

    /// Rotates the node around `axis` expressed in the given space.
    pub fn rotate(&mut self, key: NodeKey, angle: f32, axis: Vec3, space: TransformSpace) {
        if !self.check_mutable(key, "rotate") {
            return;
        }

        match space {
            TransformSpace::Local => self.nodes[key].frame.rotate_local(angle, axis),
            TransformSpace::Parent => self.nodes[key].frame.rotate_parent(angle, axis),
            TransformSpace::World => {
                let world_axis = self
                    .parent_world_matrix(key)
                    .inverse()
                    .transform_vector3(axis)
                    .normalize_or_zero();
                if world_axis == Vec3::ZERO {
                    return;
                }
                self.nodes[key].frame.rotate_parent(angle, world_axis);
            }
        }

        self.on_transform(key);
    }

    /// Rotation around the X axis of the given space.
    pub fn pitch(&mut self, key: NodeKey, angle: f32, space: TransformSpace) {
        self.rotate(key, angle, Vec3::X, space);
    }

    /// Rotation around the Y axis of the given space.
    pub fn yaw(&mut self, key: NodeKey, angle: f32, space: TransformSpace) {
        self.rotate(key, angle, Vec3::Y, space);
    }

    /// Rotation around the Z axis of the given space.
    pub fn roll(&mut self, key: NodeKey, angle: f32, space: TransformSpace) {
        self.rotate(key, angle, Vec3::Z, space);
    }

    /// Multiplies the node's local scale.
    pub fn scale(&mut self, key: NodeKey, factor: Vec3) {
        if !self.check_mutable(key, "scale") {
            return;
        }

        self.nodes[key].frame.scale *= factor;
        self.on_transform(key);
    }

    /// Replaces the node's whole local frame.
    pub fn set_local_frame(&mut self, key: NodeKey, frame: CartesianFrame) {
        if !self.check_mutable(key, "transform") {
            return;
        }

        self.nodes[key].frame = frame;
        self.on_transform(key);
    }

    /// Notifies the moved node's components, then every descendant's, of the
    /// new world frames.
    fn on_transform(&mut self, key: NodeKey) {
        let parent_matrix = self.parent_world_matrix(key);

        let mut stack: SmallVec<[(NodeKey, Affine3A); 8]> = SmallVec::new();
        stack.push((key, parent_matrix));

        while let Some((k, parent_matrix)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(k) else {
                continue;
            };

            let world_matrix = parent_matrix * node.frame.to_affine();
            let world_frame = CartesianFrame::from_affine(&world_matrix);

            for component in node.components.values_mut() {
                component.on_parent_moved(&world_frame);
            }

            for &child in node.children.values() {
                stack.push((child, world_matrix));
            }
        }
    }

    // ========================================================================
    // Physics
    // ========================================================================

    /// Adds a forward-facing force scaled by `power` to the node's own
    /// force accumulator.
    pub fn accelerate(&mut self, key: NodeKey, power: f32) {
        let Some(forward) = self.world_frame(key).map(|frame| frame.forward()) else {
            return;
        };

        if let Some(node) = self.nodes.get_mut(key) {
            node.movable.add_force(forward * power);
        }
    }

    /// Deflects the node's velocity off a surface and notifies observers
    /// with the impact speed.
    pub fn hit(&mut self, key: NodeKey, surface_normal: Vec3) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };

        let impact = node.movable.speed();
        let bounciness = node.physical_properties().bounciness();
        node.movable.deflect(surface_normal, bounciness);

        self.events
            .emit(&SceneEvent::NodeCollision { node: key, impact });
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Attaches a component; its name must be free on this node. The
    /// component is immediately synced to the node's current world frame and
    /// its volumes and properties are merged into the node's aggregates.
    pub fn attach_component(&mut self, key: NodeKey, component: Box<dyn Component>) -> Result<()> {
        let world = self.world_frame(key).ok_or(SylvaError::NodeNotFound)?;

        let node = self
            .nodes
            .get_mut(key)
            .unwrap_or_else(|| unreachable!("world frame resolved for a missing node"));

        let name = component.name().to_owned();
        if node.components.contains_key(&name) {
            log::error!("The component name '{name}' is already used on this node");
            return Err(SylvaError::DuplicateComponentName(name));
        }

        let mut component = component;
        component.on_parent_moved(&world);
        node.components.insert(name, component);
        node.rebuild_aggregates();

        Ok(())
    }

    /// Detaches and drops the named component. Returns false if absent.
    pub fn detach_component(&mut self, key: NodeKey, name: &str) -> bool {
        let Some(node) = self.nodes.get_mut(key) else {
            return false;
        };

        if node.components.remove(name).is_none() {
            return false;
        }

        node.rebuild_aggregates();
        true
    }

    // ========================================================================
    // Animation
    // ========================================================================

    /// Binds an animation to one of the node's spatial channels (the
    /// `Node::LOCAL_*` / `PARENT_*` / `WORLD_*` constants), replacing any
    /// animation already on that channel.
    pub fn add_node_animation(
        &mut self,
        key: NodeKey,
        channel: ChannelId,
        animation: Box<dyn Animation>,
    ) -> Result<()> {
        let node = self.nodes.get_mut(key).ok_or(SylvaError::NodeNotFound)?;
        node.animations.add(channel, animation);
        Ok(())
    }

    /// Dispatches one produced animation value into the matching spatial
    /// mutator. Returns false for unknown channels or mismatched value
    /// types.
    ///
    /// Channel numbering: id 0 replaces the whole frame; ids 1..=36 split
    /// into three blocks of 12 (local, parent, world), each block being
    /// position (vector, X, Y, Z), translation (vector, X, Y, Z) and
    /// rotation (vector, X, Y, Z). Position channels *set* the coordinate,
    /// translation channels add to it.
    fn play_node_animation(&mut self, key: NodeKey, channel: ChannelId, value: &AnimationValue) -> bool {
        if channel == Node::LOCAL_FRAME {
            return match value.as_frame() {
                Some(frame) => {
                    self.set_local_frame(key, frame);
                    true
                }
                None => false,
            };
        }

        let id = channel.0;
        if !(1..=36).contains(&id) {
            return false;
        }

        let space = match (id - 1) / 12 {
            0 => TransformSpace::Local,
            1 => TransformSpace::Parent,
            _ => TransformSpace::World,
        };
        let axis = [Axis::X, Axis::Y, Axis::Z];

        match (id - 1) % 12 {
            // Position: set.
            0 => value.as_vector().is_some_and(|position| {
                self.move_to(key, position, space);
                true
            }),
            op @ 1..=3 => value.as_scalar().is_some_and(|coordinate| {
                self.move_axis_to(key, axis[op as usize - 1], coordinate, space);
                true
            }),
            // Translation: add.
            4 => value.as_vector().is_some_and(|distance| {
                self.move_by(key, distance, space);
                true
            }),
            op @ 5..=7 => value.as_scalar().is_some_and(|shift| {
                self.move_axis_by(key, axis[op as usize - 5], shift, space);
                true
            }),
            // Axis-angle vector rotation: accepted, dispatches to nothing.
            8 => true,
            op @ 9..=11 => value.as_scalar().is_some_and(|angle| {
                self.rotate(key, angle, axis[op as usize - 9].unit(), space);
                true
            }),
            _ => unreachable!(),
        }
    }

    // ========================================================================
    // Logic cycle
    // ========================================================================

    /// Runs one engine cycle over the whole tree, top-down:
    ///
    /// 1. advance node lifetimes;
    /// 2. snapshot every modifier component into push sources;
    /// 3. integrate physics on movable nodes (modifier forces, gravity,
    ///    drag) and translate them by their velocity;
    /// 4. advance and dispatch node animation channels;
    /// 5. step every attached component, unhooking the ones that report
    ///    themselves broken;
    /// 6. trim discarded subtrees.
    pub fn process_logics(&mut self, environment: &EnvironmentProperties) {
        self.cycle += 1;
        self.scene_time_ms += CYCLE_DURATION_MS;

        let keys = self.keys_top_down();

        for &key in &keys {
            if let Some(node) = self.nodes.get_mut(key) {
                node.lifetime_ms += CYCLE_DURATION_MS;
            }
        }

        let sources = self.collect_push_sources(&keys);

        self.integrate_physics(&keys, &sources, environment);
        self.dispatch_node_animations(&keys);
        self.process_components(&keys, environment);

        self.trim_tree();
    }

    /// Keys in parent-before-child order.
    fn keys_top_down(&self) -> Vec<NodeKey> {
        let mut keys = Vec::with_capacity(self.nodes.len());
        let mut stack: SmallVec<[NodeKey; 16]> = SmallVec::new();
        stack.push(self.root);

        while let Some(key) = stack.pop() {
            keys.push(key);
            let node = self.expect_node(key);
            stack.extend(node.children.values().copied());
        }

        keys
    }

    /// Snapshots every modifier component before the physics pass, so force
    /// application never aliases component storage (collect first, apply
    /// after).
    fn collect_push_sources(&self, keys: &[NodeKey]) -> PushSources {
        let mut sources = PushSources::new();

        for &key in keys {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            if node.component_count() == 0 {
                continue;
            }

            let Some(world) = self.world_frame(key) else {
                continue;
            };

            for name in node.component_names() {
                if let Some(component) = node.component(name)
                    && let Some(mut source) = component.push_source(&world)
                {
                    source.node = key;
                    sources.push(source);
                }
            }
        }

        sources
    }

    fn integrate_physics(
        &mut self,
        keys: &[NodeKey],
        sources: &PushSources,
        environment: &EnvironmentProperties,
    ) {
        for &key in keys {
            if key == self.root {
                continue;
            }

            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            if !node.is_movable()
                || !node.has_physical_properties()
                || node.is_simulation_paused()
            {
                continue;
            }

            let Some(world) = self.world_frame(key) else {
                continue;
            };
            let free_fly = node.is_free_fly_mode_enabled();
            let properties = *node.physical_properties();

            let mut modifier_force = Vec3::ZERO;
            for source in sources {
                // A modifier never pushes its own carrier.
                if source.node != key {
                    modifier_force += source.force_on(world.position);
                }
            }

            let node = self
                .nodes
                .get_mut(key)
                .unwrap_or_else(|| unreachable!("node vanished during the physics pass"));

            if modifier_force != Vec3::ZERO {
                node.movable.add_force(modifier_force);
            }

            let velocity = node.movable.update_velocity(environment, &properties, free_fly);

            if velocity.length_squared() > 0.0 {
                self.move_by(key, velocity * CYCLE_DURATION_SECS, TransformSpace::World);
            }
        }
    }

    fn dispatch_node_animations(&mut self, keys: &[NodeKey]) {
        for &key in keys {
            let Some(node) = self.nodes.get_mut(key) else {
                continue;
            };
            if node.animations.is_empty() {
                continue;
            }

            let produced = node.animations.advance_all();
            for (channel, value) in produced {
                if !self.play_node_animation(key, channel, &value) {
                    let name = self.nodes.get(key).map_or("?", Node::name);
                    log::warn!(
                        "Node '{name}' dropped an animation value for unknown channel {}",
                        channel.0
                    );
                }
            }
        }
    }

    fn process_components(&mut self, keys: &[NodeKey], environment: &EnvironmentProperties) {
        for &key in keys {
            let Some(world) = self.world_frame(key) else {
                continue;
            };

            let context = LogicContext {
                cycle: self.cycle,
                delta_ms: CYCLE_DURATION_MS,
                parent_world: world,
                environment,
            };

            let Some(node) = self.nodes.get_mut(key) else {
                continue;
            };
            if node.components.is_empty() {
                continue;
            }

            let mut broken: SmallVec<[String; 2]> = SmallVec::new();
            for (name, component) in &mut node.components {
                if component.process_logics(&context) == ComponentHealth::Broken {
                    broken.push(name.clone());
                }
            }

            if broken.is_empty() {
                continue;
            }

            for name in broken {
                node.components.remove(&name);
                log::warn!("Removing broken component '{name}' from node '{}'", node.name());
                self.events.emit(&SceneEvent::RemoveBrokenComponent {
                    node: key,
                    component: name,
                });
            }
            node.rebuild_aggregates();
        }
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}
