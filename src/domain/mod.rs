//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - validated abundance vectors and their frequency-count summary (`abundance`)
//! - the estimator registry, result records and run configuration (`types`)

pub mod abundance;
pub mod types;

pub use abundance::*;
pub use types::*;
