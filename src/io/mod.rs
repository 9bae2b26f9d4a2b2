//! Input helpers.
//!
//! - counts / CSV-records ingest + validation (`ingest`)

pub mod ingest;

pub use ingest::*;
