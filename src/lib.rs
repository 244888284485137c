#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod errors;
pub mod math;
pub mod physics;
pub mod scene;

pub use animation::{Animation, AnimationLibrary, AnimationValue, ChannelId, InterpolationType, Sequence};
pub use errors::SylvaError;
pub use math::{BoundingBox, BoundingSphere, CartesianFrame, Containment, Frustum, TransformSpace};
pub use physics::{EnvironmentProperties, Movable, PhysicalObjectProperties};
pub use scene::{Component, Node, NodeKey, NodeTree, SceneEvent};

/// Fixed frequency of the logic update loop, in cycles per second.
///
/// The scene tree is stepped at this rate: node lifetimes, animation
/// sequences and velocity integration all advance by one cycle worth of
/// time per [`scene::NodeTree::process_logics`] call.
pub const LOGICS_UPDATE_FREQUENCY: u32 = 60;

/// Duration of one logic cycle in milliseconds (truncated).
pub const CYCLE_DURATION_MS: u64 = 1000 / LOGICS_UPDATE_FREQUENCY as u64;

/// Duration of one logic cycle in seconds, for velocity integration.
pub const CYCLE_DURATION_SECS: f32 = 1.0 / LOGICS_UPDATE_FREQUENCY as f32;
