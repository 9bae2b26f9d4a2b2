//! Minimum additional sampling.
//!
//! Inverts the extrapolation curve: the smallest extra sample `Δ` such that
//! the expected richness at `n + Δ` reaches a target. The closed form is tried
//! first and nudged onto the integer boundary; integer bisection is the
//! fallback.

use crate::accumulation::Extrapolation;
use crate::bootstrap::{self, ResamplingModel, run_replicates};
use crate::domain::{
    Abundance, BootstrapConfig, Mode, SamplingInterval, SamplingPlan, SamplingTarget, SolverConfig,
    SolverKind,
};
use crate::error::{EngineError, Result};
use crate::estimators::{unseen_species, validate_options};

pub const DEFAULT_UPPER_SEARCH_BOUND: u64 = 1_000_000_000_000;

/// Maximum single-step corrections applied to the closed-form answer.
const TIGHTEN_STEPS: usize = 64;

fn closed_form(curve: &Extrapolation, target: f64) -> Option<u64> {
    let log_q = curve.log_decay();
    if log_q >= 0.0 || curve.unseen() <= 0.0 {
        return None;
    }
    let r = 1.0 - (target - curve.observed()) / curve.unseen();
    if !(r > 0.0 && r < 1.0) {
        return None;
    }
    let raw = (r.ln() / log_q).ceil();
    if !raw.is_finite() || raw < 0.0 || raw >= (u64::MAX / 2) as f64 {
        return None;
    }

    let mut delta = raw as u64;
    for _ in 0..TIGHTEN_STEPS {
        if curve.expected_after(delta) < target {
            delta += 1;
        } else if delta > 0 && curve.expected_after(delta - 1) >= target {
            delta -= 1;
        } else {
            return Some(delta);
        }
    }
    None
}

fn bisect(curve: &Extrapolation, target: f64, upper: u64) -> Result<u64> {
    if curve.expected_after(upper) < target {
        return Err(EngineError::Unsolvable(format!(
            "target {target:.3} not reached within {upper} additional observations"
        )));
    }
    // Invariant: E(lo) < target <= E(hi).
    let (mut lo, mut hi) = (0u64, upper);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if curve.expected_after(mid) >= target {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok(hi)
}

/// Smallest `Δ` with `E(n + Δ) >= target`, and the method that found it.
pub(crate) fn invert(
    curve: &Extrapolation,
    target: f64,
    kind: SolverKind,
    upper: u64,
) -> Result<(u64, SolverKind)> {
    if !target.is_finite() {
        return Err(EngineError::config(format!("target richness {target} is not finite")));
    }
    if target <= curve.observed() {
        return Ok((0, kind));
    }
    if target >= curve.asymptote() {
        return Err(EngineError::Unsolvable(format!(
            "target {target:.3} is not below the richness asymptote {:.3}",
            curve.asymptote()
        )));
    }
    if kind == SolverKind::ClosedForm {
        if let Some(delta) = closed_form(curve, target) {
            return Ok((delta, SolverKind::ClosedForm));
        }
        tracing::debug!(target, "closed form not usable; falling back to bisection");
    }
    Ok((bisect(curve, target, upper)?, SolverKind::Bisection))
}

fn validate_target(target: SamplingTarget) -> Result<()> {
    let ok = match target {
        SamplingTarget::Fraction(g) => g.is_finite() && g > 0.0 && g <= 1.0,
        SamplingTarget::Richness(x) => x.is_finite() && x > 0.0,
        SamplingTarget::Complete { tolerance } => tolerance.is_finite() && tolerance > 0.0,
    };
    if ok {
        Ok(())
    } else {
        Err(EngineError::config(format!("invalid sampling target {target:?}")))
    }
}

/// Absolute richness the target asks for, given the estimated total `s_hat`.
pub fn resolve_target(target: SamplingTarget, s_hat: f64) -> f64 {
    match target {
        SamplingTarget::Fraction(g) => g * s_hat,
        SamplingTarget::Richness(x) => x,
        SamplingTarget::Complete { tolerance } => s_hat - tolerance,
    }
}

/// Additional observations needed to reach `cfg.target`.
///
/// # Errors
/// [`EngineError::Unsolvable`] when the target is at or beyond the asymptote
/// (or beyond `upper_search_bound` under bisection);
/// [`EngineError::InvalidConfiguration`] for bad targets, bounds or a
/// population-mode `method`.
pub fn min_additional_sample(abundance: &Abundance, cfg: &SolverConfig) -> Result<SamplingPlan> {
    validate_target(cfg.target)?;
    validate_options(&cfg.estimator)?;
    if cfg.upper_search_bound == 0 {
        return Err(EngineError::config("upper_search_bound must be >= 1"));
    }
    if cfg.method.mode(true) == Mode::Population {
        return Err(EngineError::config(format!(
            "{} does not estimate a species count",
            cfg.method
        )));
    }

    let counts = abundance.summarize();
    let unseen = unseen_species(cfg.method, &counts, &cfg.estimator)?;
    let curve = Extrapolation::new(&counts, unseen);
    let target_richness = resolve_target(cfg.target, curve.asymptote());
    let (delta, solved_by) = invert(&curve, target_richness, cfg.kind, cfg.upper_search_bound)?;
    tracing::debug!(
        method = %cfg.method,
        target_richness,
        delta,
        ?solved_by,
        "solved minimum additional sample"
    );

    let interval = match &cfg.interval {
        Some(bcfg) => Some(sampling_interval(abundance, unseen, cfg, bcfg)?),
        None => None,
    };

    Ok(SamplingPlan {
        method: cfg.method,
        target_richness,
        additional_samples: delta,
        total_samples: counts.sample_size() + delta,
        solved_by,
        interval,
    })
}

fn sampling_interval(
    abundance: &Abundance,
    unseen: f64,
    cfg: &SolverConfig,
    bcfg: &BootstrapConfig,
) -> Result<SamplingInterval> {
    let model = ResamplingModel::fit(abundance, unseen);
    let solved = run_replicates(&model, bcfg, |rep| {
        let fc = rep.summarize();
        let curve = Extrapolation::new(&fc, unseen_species(cfg.method, &fc, &cfg.estimator)?);
        let target = resolve_target(cfg.target, curve.asymptote());
        match invert(&curve, target, cfg.kind, cfg.upper_search_bound) {
            Ok((delta, _)) => Ok(Some(delta as f64)),
            Err(EngineError::Unsolvable(_)) => Ok(None),
            Err(e) => Err(e),
        }
    })?;

    let drawn = solved.len();
    let replicates: Vec<f64> = solved.into_iter().flatten().collect();
    if replicates.len() < drawn {
        tracing::warn!(
            skipped = drawn - replicates.len(),
            drawn,
            "replicates with an unreachable target left out of the interval"
        );
    }
    if replicates.is_empty() {
        return Err(EngineError::Unsolvable(
            "target unreachable in every bootstrap replicate".to_string(),
        ));
    }
    let (lower, upper) = bootstrap::bounds(&replicates, bcfg.confidence_level)?;
    Ok(SamplingInterval {
        lower,
        upper,
        confidence_level: bcfg.confidence_level,
        replicates,
    })
}
