//! Numerical utilities: special functions and replicate order statistics.

pub mod special;
pub mod stats;

pub use special::*;
pub use stats::*;
