//! `unseen` library crate.
//!
//! Estimates how many distinct species (works, types, ...) a population holds
//! when a sample has only seen some of them. The binary (`unseen`) is a thin
//! wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the estimators can be embedded in other tools
//!
//! ```
//! use unseen::{Abundance, DiversityOptions, Method, diversity};
//!
//! let sample = Abundance::new(&[6, 3, 2, 1, 1, 1, 1, 2]).unwrap();
//! let est = diversity(&sample, Method::Chao1, &DiversityOptions::default()).unwrap();
//! assert_eq!(est.value(), 12.0);
//! ```

pub mod accumulation;
pub mod app;
pub mod bootstrap;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod error;
pub mod estimators;
pub mod io;
pub mod math;
pub mod report;
pub mod solver;

pub use domain::{
    Abundance, AccumulationCurve, BootstrapConfig, CancelToken, CurveConfig, CurvePoint, Diversity,
    DiversityOptions, EstimateResult, EstimatorOptions, FrequencyCounts, JackknifeOrder, Method,
    Mode, SamplingInterval, SamplingPlan, SamplingTarget, Segment, SolverConfig, SolverKind,
    SurvivalRatio,
};
pub use engine::{diversity, min_additional_sample, species_accumulation, summarize, survival_ratio};
pub use error::{EngineError, Result};
