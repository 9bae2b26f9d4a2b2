//! Abundance-based Coverage Estimator (Chao & Lee 1992).
//!
//! Species seen at most `k` times (default `k = 10`) form the rare class; the
//! rest are taken as fully detected. Richness is extrapolated from the rare
//! class using its sample coverage and a coefficient-of-variation correction:
//!
//! ```text
//! C    = 1 - f1 / n_rare
//! γ²   = max(S_rare / C · Σ_{i<=k} i(i-1) f_i / (n_rare (n_rare - 1)) - 1, 0)
//! Ŝ    = S_abund + S_rare / C + f1 / C · γ²
//! ```

use crate::domain::FrequencyCounts;

/// ACE with rarity threshold `rare_threshold`.
///
/// Edge cases:
/// - empty rare class: returns `S_obs`;
/// - every rare observation is a singleton (`C <= 0`): the coverage is
///   computed with `f1 - 1` singletons so that `C = 1 / n_rare`.
#[must_use]
pub fn ace(counts: &FrequencyCounts, rare_threshold: u64) -> f64 {
    let s_obs = counts.observed() as f64;
    let k = rare_threshold as usize;

    let mut s_rare = 0.0;
    let mut n_rare = 0.0;
    let mut weighted = 0.0;
    for (i, fi) in counts.spectrum() {
        if i > k {
            break;
        }
        let (i, fi) = (i as f64, fi as f64);
        s_rare += fi;
        n_rare += i * fi;
        weighted += i * (i - 1.0) * fi;
    }
    if s_rare <= 0.0 {
        return s_obs;
    }
    let s_abund = s_obs - s_rare;
    let f1 = counts.singletons() as f64;

    let mut coverage = 1.0 - f1 / n_rare;
    if coverage <= 0.0 {
        tracing::debug!(f1, n_rare, "ACE coverage degenerate; using f1 - 1 singletons");
        coverage = 1.0 - (f1 - 1.0) / n_rare;
    }

    let gamma_sq = if n_rare > 1.0 {
        (s_rare / coverage * weighted / (n_rare * (n_rare - 1.0)) - 1.0).max(0.0)
    } else {
        0.0
    };

    let estimate = s_abund + s_rare / coverage + f1 / coverage * gamma_sq;
    if estimate.is_finite() {
        estimate.max(s_obs)
    } else {
        s_obs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::summarize;
    use proptest::prelude::*;

    #[test]
    fn no_rare_species_returns_observed() {
        let fc = summarize(&[20, 30, 11]).unwrap();
        assert_eq!(ace(&fc, 10), 3.0);
    }

    #[test]
    fn no_singletons_returns_observed() {
        // C = 1 and γ² = max(S_rare · Σ i(i-1)f_i / (n_rare(n_rare-1)) - 1, 0)
        // = max(2 · (2 + 6) / (5 · 4) - 1, 0) = 0.
        let fc = summarize(&[2, 3, 50]).unwrap();
        assert!((ace(&fc, 10) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn reference_value() {
        // rare: [1,1,2,3] -> S_rare = 4, n_rare = 7, f1 = 2, Σ i(i-1)f_i = 2 + 6 = 8
        // C = 1 - 2/7 = 5/7
        // γ² = max(4 / (5/7) · 8 / 42 - 1, 0) = max(5.6 · 0.190476 - 1, 0) = 0.066667
        // Ŝ = 1 + 5.6 + 2 / (5/7) · 0.066667 = 6.786667
        let fc = summarize(&[1, 1, 2, 3, 40]).unwrap();
        let gamma_sq: f64 = 4.0 / (5.0 / 7.0) * 8.0 / 42.0 - 1.0;
        let expected = 1.0 + 4.0 / (5.0 / 7.0) + 2.0 / (5.0 / 7.0) * gamma_sq;
        assert!((ace(&fc, 10) - expected).abs() < 1e-12);
    }

    #[test]
    fn all_singletons_is_clamped_not_infinite() {
        let fc = summarize(&[1, 1, 1, 1]).unwrap();
        let v = ace(&fc, 10);
        assert!(v.is_finite());
        assert!(v >= 4.0);
    }

    #[test]
    fn single_observation_is_finite() {
        let fc = summarize(&[1]).unwrap();
        assert_eq!(ace(&fc, 10), 1.0);
    }

    proptest! {
        #[test]
        fn ace_is_finite_and_at_least_observed(counts in prop::collection::vec(1i64..30, 1..150)) {
            let fc = summarize(&counts).unwrap();
            let v = ace(&fc, 10);
            prop_assert!(v.is_finite());
            prop_assert!(v >= fc.observed() as f64);
        }
    }
}
