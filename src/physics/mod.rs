//! Physical facet of scene entities:
//! - [`PhysicalObjectProperties`]: mass, surface, drag and contact response
//! - [`EnvironmentProperties`]: gravity and medium density for integration
//! - [`Movable`] / [`MovableState`]: force accumulation and velocity updates

pub mod movable;
pub mod properties;

pub use movable::{Movable, MovableState};
pub use properties::{EnvironmentProperties, PhysicalObjectProperties};
