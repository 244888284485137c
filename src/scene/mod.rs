//! The scene graph: a tree of spatial frames with parent/child ownership,
//! deferred destruction, frustum visibility queries and per-cycle logic
//! dispatch to attached components.
//!
//! - [`NodeTree`]: the arena holding every node; all structural mutation
//!   goes through it
//! - [`Node`]: per-node data (frame, flags, movable state, animations,
//!   components)
//! - [`Component`]: uniform per-cycle update contract for anything attached
//!   to a node
//! - [`DirectionalPushModifier`] / [`SphericalPushModifier`]: force fields
//!   bounded by an [`InfluenceArea`]
//! - [`SceneEvent`]: outbound notifications for editor tooling / game logic

pub mod component;
pub mod events;
pub mod influence;
pub mod modifier;
pub mod node;
pub mod tree;

pub use component::{ClassUid, Component, ComponentBase, ComponentHealth, LogicContext, Weight};
pub use events::{EventBus, SceneEvent};
pub use influence::InfluenceArea;
pub use modifier::{DirectionalPushModifier, PushKind, PushSource, SphericalPushModifier};
pub use node::{Node, NodeFlags};
pub use tree::NodeTree;

use slotmap::new_key_type;

new_key_type! {
    /// Generational arena key identifying a node.
    ///
    /// Keys are non-owning: holding one never extends a node's lifetime,
    /// and a key whose node was destroyed simply stops resolving.
    pub struct NodeKey;
}
