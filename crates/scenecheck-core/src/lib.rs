//! Scenecheck Core - Foundational types for scene validation
//!
//! This crate provides the types that every other scenecheck crate depends on:
//! - `NodeId` - Stable scene node identifiers
//! - `Transform`, `Vec3` - Spatial types and matrix helpers
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{Result, SceneCheckError};
pub use id::NodeId;
pub use types::{mat4_approx_eq, mat4_mul, transform_point, Transform, Vec3};
