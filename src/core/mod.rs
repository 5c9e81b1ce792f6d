// src/core/mod.rs

//! Core data structures and types

// Declare modules within core
pub mod error;
pub mod state;

// Re-export public types for convenient access via `qanchor::core::TypeName`
pub use error::{QanchorError, QubitId, Result};
pub use state::StateVector;

pub mod constants;
pub use constants::anchor_constants::{DRIFT_RADIANS_PER_SECOND, PI}; // Re-export
