//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the estimator, resampler, curve and solver modules
//! - rendered as terminal tables or JSON by the binary
//!
//! Configuration structs carry `Default` impls matching the engine's documented
//! defaults; the CLI layer only overrides what the user asked for.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Registered richness estimators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Method {
    #[serde(rename = "empirical")]
    #[value(name = "empirical")]
    Empirical,
    #[serde(rename = "chao1")]
    #[value(name = "chao1")]
    Chao1,
    #[serde(rename = "ichao1")]
    #[value(name = "ichao1")]
    IChao1,
    #[serde(rename = "ace")]
    #[value(name = "ace")]
    Ace,
    #[serde(rename = "jackknife")]
    #[value(name = "jackknife")]
    Jackknife,
    #[serde(rename = "egghe_proot")]
    #[value(name = "egghe_proot")]
    EggheProot,
    #[serde(rename = "minsample")]
    #[value(name = "minsample")]
    Minsample,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::Empirical,
        Method::Chao1,
        Method::IChao1,
        Method::Ace,
        Method::Jackknife,
        Method::EggheProot,
        Method::Minsample,
    ];

    /// Registry name (what `FromStr` accepts).
    pub fn name(self) -> &'static str {
        match self {
            Method::Empirical => "empirical",
            Method::Chao1 => "chao1",
            Method::IChao1 => "ichao1",
            Method::Ace => "ace",
            Method::Jackknife => "jackknife",
            Method::EggheProot => "egghe_proot",
            Method::Minsample => "minsample",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Method::Empirical => "Empirical",
            Method::Chao1 => "Chao1",
            Method::IChao1 => "iChao1",
            Method::Ace => "ACE",
            Method::Jackknife => "Jackknife",
            Method::EggheProot => "Egghe & Proot",
            Method::Minsample => "Minimum additional sample",
        }
    }

    /// What the estimate counts. `species` only matters for `empirical`.
    pub fn mode(self, species: bool) -> Mode {
        match self {
            Method::Minsample => Mode::Population,
            Method::Empirical if !species => Mode::Population,
            _ => Mode::Species,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Method::ALL
            .into_iter()
            .find(|m| m.name() == needle)
            .ok_or_else(|| EngineError::UnknownMethod(s.to_string()))
    }
}

/// Whether an estimate is a species count or a population (observation) count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Species,
    Population,
}

/// Jackknife order policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JackknifeOrder {
    /// Sequential significance test over orders `1..=max_order`.
    Auto { max_order: usize },
    /// Always use this order (clamped to what the sample supports).
    Fixed(usize),
}

/// Tuning knobs for individual estimators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorOptions {
    /// ACE: species seen at most this many times form the "rare" class.
    pub ace_rare_threshold: u64,
    pub jackknife_order: JackknifeOrder,
    /// Confidence level of the jackknife order test and its analytic interval.
    pub jackknife_confidence: f64,
    /// Egghe & Proot: assumed number of original copies per work.
    pub egghe_proot_copies: f64,
    /// Minsample: expected number of still-undiscovered species considered "done".
    pub minsample_tolerance: f64,
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self {
            ace_rare_threshold: 10,
            jackknife_order: JackknifeOrder::Auto { max_order: 5 },
            jackknife_confidence: 0.95,
            egghe_proot_copies: 150.0,
            minsample_tolerance: 0.1,
        }
    }
}

/// Cooperative cancellation flag shared between a caller and a bootstrap run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Bootstrap settings shared by every interval-producing operation.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub n_iter: usize,
    /// Worker threads; `0` lets rayon pick (all cores), `1` runs inline.
    pub n_jobs: usize,
    pub confidence_level: f64,
    /// Fixed seed for reproducible replicates; `None` draws one from the OS RNG.
    pub seed: Option<u64>,
    pub cancel: Option<CancelToken>,
    /// Species vs. population mode for `empirical`.
    pub species: bool,
    pub estimator: EstimatorOptions,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            n_iter: 1000,
            n_jobs: 1,
            confidence_level: 0.95,
            seed: None,
            cancel: None,
            species: true,
            estimator: EstimatorOptions::default(),
        }
    }
}

impl BootstrapConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_iter == 0 {
            return Err(EngineError::config("n_iter must be >= 1"));
        }
        validate_confidence(self.confidence_level)
    }
}

pub(crate) fn validate_confidence(level: f64) -> Result<()> {
    if !(level.is_finite() && level > 0.0 && level < 1.0) {
        return Err(EngineError::config(format!(
            "confidence level must lie in (0, 1), got {level}"
        )));
    }
    Ok(())
}

/// Options for the `diversity` entry point.
#[derive(Debug, Clone)]
pub struct DiversityOptions {
    pub species: bool,
    /// Request a bootstrap interval instead of a bare point estimate.
    pub ci: bool,
    pub n_iter: usize,
    pub n_jobs: usize,
    pub confidence_level: f64,
    pub seed: Option<u64>,
    pub cancel: Option<CancelToken>,
    pub estimator: EstimatorOptions,
}

impl Default for DiversityOptions {
    fn default() -> Self {
        let b = BootstrapConfig::default();
        Self {
            species: true,
            ci: false,
            n_iter: b.n_iter,
            n_jobs: b.n_jobs,
            confidence_level: b.confidence_level,
            seed: None,
            cancel: None,
            estimator: EstimatorOptions::default(),
        }
    }
}

impl DiversityOptions {
    pub fn bootstrap_config(&self) -> BootstrapConfig {
        BootstrapConfig {
            n_iter: self.n_iter,
            n_jobs: self.n_jobs,
            confidence_level: self.confidence_level,
            seed: self.seed,
            cancel: self.cancel.clone(),
            species: self.species,
            estimator: self.estimator.clone(),
        }
    }
}

/// Point or interval estimate, mirroring the `CI` switch of `diversity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Diversity {
    Point(f64),
    Interval(EstimateResult),
}

impl Diversity {
    pub fn value(&self) -> f64 {
        match self {
            Diversity::Point(v) => *v,
            Diversity::Interval(r) => r.point_estimate,
        }
    }
}

/// Estimate plus (optionally) the replicate distribution it was bracketed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    pub method: Method,
    pub point_estimate: f64,
    pub bootstrap: Option<Vec<f64>>,
    pub lower: f64,
    pub upper: f64,
    pub confidence_level: f64,
}

impl EstimateResult {
    pub fn replicates(&self) -> &[f64] {
        self.bootstrap.as_deref().unwrap_or(&[])
    }

    /// Median of the replicate distribution, if one was computed.
    pub fn median(&self) -> Option<f64> {
        let mut values = self.replicates().to_vec();
        crate::math::sort_floats(&mut values);
        crate::math::quantile_sorted(&values, 0.5)
    }
}

/// Observed fraction of the estimated total (`S_obs / Ŝ` or `n / N̂`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalRatio {
    pub method: Method,
    pub point: f64,
    pub replicates: Vec<f64>,
    pub lower: f64,
    pub upper: f64,
    pub confidence_level: f64,
}

/// Which side of the observed sample size a curve point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Interpolated,
    Extrapolated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub sample_size: u64,
    pub expected_richness: f64,
    pub lower: f64,
    pub upper: f64,
    pub segment: Segment,
}

/// Expected richness as a function of sample size, with bootstrap bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulationCurve {
    pub method: Method,
    pub observed: u64,
    pub sample_size: u64,
    /// Total richness the extrapolated part approaches (`S_obs + f0`).
    pub asymptote: f64,
    pub confidence_level: f64,
    pub points: Vec<CurvePoint>,
}

impl AccumulationCurve {
    pub fn interpolated(&self) -> impl Iterator<Item = &CurvePoint> {
        self.points
            .iter()
            .filter(|p| p.segment == Segment::Interpolated)
    }

    pub fn extrapolated(&self) -> impl Iterator<Item = &CurvePoint> {
        self.points
            .iter()
            .filter(|p| p.segment == Segment::Extrapolated)
    }

    pub fn at(&self, sample_size: u64) -> Option<&CurvePoint> {
        self.points
            .binary_search_by_key(&sample_size, |p| p.sample_size)
            .ok()
            .map(|idx| &self.points[idx])
    }
}

/// Settings for `species_accumulation`.
#[derive(Debug, Clone)]
pub struct CurveConfig {
    /// Largest sample size on the curve (extrapolation stops here).
    pub max_steps: u64,
    /// Grid spacing; `n` and `max_steps` are always included.
    pub step: u64,
    /// Estimator supplying the unseen-species count `f0`.
    pub method: Method,
    pub bootstrap: BootstrapConfig,
}

impl CurveConfig {
    pub fn new(max_steps: u64, n_iter: usize) -> Self {
        Self {
            max_steps,
            step: 1,
            method: Method::Chao1,
            bootstrap: BootstrapConfig {
                n_iter,
                ..BootstrapConfig::default()
            },
        }
    }
}

/// Target richness for the minimum-additional-sampling solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingTarget {
    /// Reach `fraction · Ŝ` species (`0 < fraction <= 1`).
    Fraction(f64),
    /// Reach an absolute number of species.
    Richness(f64),
    /// Leave fewer than `tolerance` species expected to be undiscovered.
    Complete { tolerance: f64 },
}

impl Default for SamplingTarget {
    fn default() -> Self {
        SamplingTarget::Complete { tolerance: 0.1 }
    }
}

/// How the solver inverted the extrapolation curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SolverKind {
    /// Closed-form inversion (falls back to bisection when not finite).
    #[value(name = "closed-form")]
    ClosedForm,
    /// Integer bisection over `[0, upper_search_bound]`.
    Bisection,
}

#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub target: SamplingTarget,
    /// Estimator supplying `Ŝ` and the unseen count.
    pub method: Method,
    pub kind: SolverKind,
    pub upper_search_bound: u64,
    /// Bootstrap the solution when set.
    pub interval: Option<BootstrapConfig>,
    pub estimator: EstimatorOptions,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            target: SamplingTarget::default(),
            method: Method::Chao1,
            kind: SolverKind::ClosedForm,
            upper_search_bound: crate::solver::DEFAULT_UPPER_SEARCH_BOUND,
            interval: None,
            estimator: EstimatorOptions::default(),
        }
    }
}

/// Interval on a solver answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingInterval {
    pub lower: f64,
    pub upper: f64,
    pub confidence_level: f64,
    pub replicates: Vec<f64>,
}

/// Solver output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingPlan {
    pub method: Method,
    pub target_richness: f64,
    pub additional_samples: u64,
    pub total_samples: u64,
    pub solved_by: SolverKind,
    pub interval: Option<SamplingInterval>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_round_trip_through_from_str() {
        for m in Method::ALL {
            assert_eq!(m.name().parse::<Method>().unwrap(), m);
        }
        assert_eq!(" Chao1 ".parse::<Method>().unwrap(), Method::Chao1);
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert_eq!(
            "chao2".parse::<Method>(),
            Err(EngineError::UnknownMethod("chao2".to_string()))
        );
    }

    #[test]
    fn minsample_is_always_population_mode() {
        assert_eq!(Method::Minsample.mode(true), Mode::Population);
        assert_eq!(Method::Empirical.mode(false), Mode::Population);
        assert_eq!(Method::Chao1.mode(false), Mode::Species);
    }

    #[test]
    fn bootstrap_config_validation() {
        let mut cfg = BootstrapConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.n_iter = 0;
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfiguration(_))));
        cfg.n_iter = 10;
        cfg.confidence_level = 1.0;
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfiguration(_))));
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
