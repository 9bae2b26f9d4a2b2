//! Estimator library.
//!
//! Every estimator is a pure function of [`FrequencyCounts`]; [`estimate`]
//! dispatches on the closed [`Method`] registry. Estimates are clamped so that
//! they never fall below what was actually observed and never come back as
//! `NaN`/`Inf`, including for degenerate spectra (`f1 == 0`, `f2 == 0`).

pub mod ace;
pub mod chao;
pub mod egghe_proot;
pub mod jackknife;
pub mod minsample;

pub use ace::ace;
pub use chao::{chao1, chao1_unseen, chao1_variance, ichao1};
pub use egghe_proot::egghe_proot;
pub use jackknife::{JackknifeEstimate, jackknife, jackknife_detailed};
pub use minsample::minsample;

use crate::domain::{EstimatorOptions, FrequencyCounts, Method, Mode, validate_confidence};
use crate::error::{EngineError, Result};

/// Reject option values no estimator can work with.
pub fn validate_options(opts: &EstimatorOptions) -> Result<()> {
    if opts.ace_rare_threshold == 0 {
        return Err(EngineError::config("ACE rare threshold must be >= 1"));
    }
    if !(opts.egghe_proot_copies.is_finite() && opts.egghe_proot_copies > 1.0) {
        return Err(EngineError::config(format!(
            "Egghe & Proot copies per work must be > 1, got {}",
            opts.egghe_proot_copies
        )));
    }
    validate_confidence(opts.jackknife_confidence)
}

/// Run `method` on `counts`.
///
/// `species` selects what `empirical` reports (`S_obs` or `n`); `minsample`
/// always reports a population size.
pub fn estimate(
    method: Method,
    counts: &FrequencyCounts,
    species: bool,
    opts: &EstimatorOptions,
) -> Result<f64> {
    validate_options(opts)?;
    let value = match method {
        Method::Empirical => match method.mode(species) {
            Mode::Species => counts.observed() as f64,
            Mode::Population => counts.sample_size() as f64,
        },
        Method::Chao1 => chao1(counts),
        Method::IChao1 => ichao1(counts),
        Method::Ace => ace(counts, opts.ace_rare_threshold),
        Method::Jackknife => jackknife(counts, opts.jackknife_order, opts.jackknife_confidence),
        Method::EggheProot => egghe_proot(counts, opts.egghe_proot_copies),
        Method::Minsample => minsample(counts, opts.minsample_tolerance)?,
    };

    let floor = match method.mode(species) {
        Mode::Species => counts.observed() as f64,
        Mode::Population => counts.sample_size() as f64,
    };
    if value.is_finite() {
        Ok(value.max(floor))
    } else {
        tracing::warn!(%method, "non-finite estimate clamped to observed value");
        Ok(floor)
    }
}

/// Unseen-species count `Ŝ - S_obs` implied by a species-mode estimator.
///
/// # Errors
/// [`EngineError::InvalidConfiguration`] for population-mode methods, which do
/// not estimate a number of species.
pub fn unseen_species(
    method: Method,
    counts: &FrequencyCounts,
    opts: &EstimatorOptions,
) -> Result<f64> {
    if method.mode(true) == Mode::Population {
        return Err(EngineError::config(format!(
            "{method} estimates a population size, not a species count"
        )));
    }
    let s_hat = estimate(method, counts, true, opts)?;
    Ok((s_hat - counts.observed() as f64).max(0.0))
}
