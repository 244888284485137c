//! Math building blocks shared by the scene graph:
//! - [`CartesianFrame`]: position, orientation and scale relative to a parent
//! - [`BoundingBox`] / [`BoundingSphere`]: axis-aligned bounding volumes
//! - [`Frustum`]: 6-plane culling volume

pub mod bounds;
pub mod frame;
pub mod frustum;

pub use bounds::{BoundingBox, BoundingSphere};
pub use frame::{Axis, CartesianFrame, TransformSpace};
pub use frustum::{Containment, Frustum, Plane};
