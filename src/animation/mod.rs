//! Timed animation dispatch:
//! - [`AnimationValue`]: the closed set of values a channel can carry
//! - [`Sequence`]: a keyframed timeline sampled once per logic cycle
//! - [`AnimationLibrary`] / [`Animatable`]: channel-id to animation mapping
//!   reused by nodes and components alike

pub mod library;
pub mod sequence;
pub mod value;

pub use library::{Animatable, Animation, AnimationLibrary, ChannelId};
pub use sequence::{KeyFrame, Sequence};
pub use value::{AnimationValue, InterpolationType};
