//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`SylvaError`] covers the recoverable failure modes of
//! the scene graph:
//! - Structural conflicts (duplicate or reserved node names)
//! - Lookups of nodes that are no longer in the tree
//! - Rejected mutations (moving the root, re-attaching a node below itself)
//!
//! Hard invariant violations (a child key recorded under a parent but absent
//! from the arena, for instance) are *not* represented here: those are
//! programmer errors and abort via panic instead of propagating.
//!
//! # Usage
//!
//! Fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, SylvaError>`.

use thiserror::Error;

/// The main error type for the Sylva engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SylvaError {
    // ========================================================================
    // Scene Graph Structural Errors
    // ========================================================================
    /// A sibling with the same name already exists at this level.
    #[error("Node name '{0}' is already used at this level")]
    DuplicateNodeName(String),

    /// The root node name is reserved and cannot be given to a child.
    #[error("Node name '{0}' is reserved")]
    ReservedNodeName(String),

    /// The referenced node is not (or no longer) part of the tree.
    #[error("Node not found in the tree")]
    NodeNotFound,

    /// The requested operation is not allowed on the root node.
    #[error("Operation not allowed on the root node: {0}")]
    RootIsImmutable(&'static str),

    /// Re-attaching the node would make it its own ancestor.
    #[error("Attaching node '{0}' here would create a cycle")]
    WouldCreateCycle(String),

    // ========================================================================
    // Component Errors
    // ========================================================================
    /// A component with the same name is already attached to the entity.
    #[error("Component name '{0}' is already used on this entity")]
    DuplicateComponentName(String),
}

/// Alias for `Result<T, SylvaError>`.
pub type Result<T> = std::result::Result<T, SylvaError>;
