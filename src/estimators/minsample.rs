//! Minimum additional sampling as a population-size lower bound.
//!
//! Extends the sample along the Chao1-driven extrapolation curve until fewer
//! than `tolerance` species are still expected to be undiscovered, and reports
//! the total number of observations that takes (`n + Δ`). Unlike the other
//! registry members the result counts observations, not species.

use crate::accumulation::Extrapolation;
use crate::domain::{FrequencyCounts, SolverKind};
use crate::error::{EngineError, Result};
use crate::estimators::chao::chao1_unseen;
use crate::solver::{DEFAULT_UPPER_SEARCH_BOUND, invert};

/// `n + Δ` with `Δ` the smallest extension leaving `< tolerance` species unseen.
pub fn minsample(counts: &FrequencyCounts, tolerance: f64) -> Result<f64> {
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(EngineError::config(format!(
            "minsample tolerance must be > 0, got {tolerance}"
        )));
    }
    let curve = Extrapolation::new(counts, chao1_unseen(counts));
    let target = curve.asymptote() - tolerance;
    let (delta, _) = invert(&curve, target, SolverKind::ClosedForm, DEFAULT_UPPER_SEARCH_BOUND)?;
    Ok((counts.sample_size() + delta) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::summarize;

    #[test]
    fn no_singletons_needs_no_more_sampling() {
        let fc = summarize(&[2, 4, 9]).unwrap();
        assert_eq!(minsample(&fc, 0.1).unwrap(), 15.0);
    }

    #[test]
    fn leaves_less_than_tolerance_unseen() {
        let fc = summarize(&[6, 3, 2, 1, 1, 1, 1, 2]).unwrap();
        let total = minsample(&fc, 0.1).unwrap();
        assert!(total > 17.0);

        let curve = Extrapolation::new(&fc, chao1_unseen(&fc));
        let extra = total as u64 - 17;
        assert!(curve.asymptote() - curve.expected_after(extra) <= 0.1);
        assert!(curve.asymptote() - curve.expected_after(extra - 1) > 0.1);
    }

    #[test]
    fn tighter_tolerance_needs_more_sampling() {
        let fc = summarize(&[1, 1, 1, 2, 2, 3, 7, 11]).unwrap();
        let loose = minsample(&fc, 1.0).unwrap();
        let tight = minsample(&fc, 0.01).unwrap();
        assert!(tight > loose);
    }

    #[test]
    fn rejects_non_positive_tolerance() {
        let fc = summarize(&[1, 2]).unwrap();
        assert!(matches!(minsample(&fc, 0.0), Err(EngineError::InvalidConfiguration(_))));
    }
}
