//! Egghe & Proot (2007) estimator for lost multi-copy documents.
//!
//! Each work is assumed to have existed in `a` copies, each surviving
//! independently with a small probability. Fitting that success-breakdown
//! model to the ratio of works with two surviving copies to works with one
//! gives the probability that a work left no copy at all:
//!
//! ```text
//! P0 = (1 + 2/(a - 1) · f2/f1)^(-a)
//! S  = S_obs / (1 - P0)
//! ```
//!
//! `f1 == 0` gives `P0 = 0` (nothing was lost). With `f2 == 0` the ratio
//! `f2/f1` is replaced by `1/(f1 - 1)`, the same substitution that turns
//! Chao1's `f1²/(2 f2)` into `f1 (f1 - 1)/2`, so `P0` stays below 1.

use crate::domain::FrequencyCounts;

/// Probability that a work survives in no copy, given `copies` per work.
#[must_use]
pub fn loss_probability(counts: &FrequencyCounts, copies: f64) -> f64 {
    let f1 = counts.singletons() as f64;
    let f2 = counts.doubletons() as f64;
    if f1 == 0.0 || (f1 == 1.0 && f2 == 0.0) {
        return 0.0;
    }
    let ratio = if f2 > 0.0 { f2 / f1 } else { 1.0 / (f1 - 1.0) };
    let p0 = (-copies * (2.0 / (copies - 1.0) * ratio).ln_1p()).exp();
    if p0.is_finite() { p0.clamp(0.0, 1.0) } else { 0.0 }
}

/// Estimated number of original works given `copies` per work (`copies > 1`).
#[must_use]
pub fn egghe_proot(counts: &FrequencyCounts, copies: f64) -> f64 {
    let s_obs = counts.observed() as f64;
    let p0 = loss_probability(counts, copies);
    if p0 >= 1.0 {
        return s_obs;
    }
    let estimate = s_obs / (1.0 - p0);
    if estimate.is_finite() { estimate.max(s_obs) } else { s_obs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::summarize;

    #[test]
    fn reference_sample_with_150_copies() {
        let fc = summarize(&[6, 3, 2, 1, 1, 1, 1, 2]).unwrap();
        let p0 = (1.0 + 2.0 / 149.0 * 0.5_f64).powf(-150.0);
        assert!((loss_probability(&fc, 150.0) - p0).abs() < 1e-12);
        let got = egghe_proot(&fc, 150.0);
        assert!((got - 8.0 / (1.0 - p0)).abs() < 1e-9);
        assert!((got - 12.631).abs() < 1e-3, "{got}");
    }

    #[test]
    fn no_singletons_means_nothing_lost() {
        let fc = summarize(&[3, 3, 7]).unwrap();
        assert_eq!(loss_probability(&fc, 150.0), 0.0);
        assert_eq!(egghe_proot(&fc, 150.0), 3.0);
    }

    #[test]
    fn missing_doubletons_use_bias_corrected_ratio() {
        let fc = summarize(&[1, 1, 1, 5]).unwrap();
        // f2/f1 -> 1/(f1 - 1) = 1/2
        let p0 = (1.0 + 2.0 / 9.0 * 0.5_f64).powf(-10.0);
        let got = egghe_proot(&fc, 10.0);
        assert!(got.is_finite());
        assert!((got - 4.0 / (1.0 - p0)).abs() < 1e-9);

        let lone = summarize(&[1, 4]).unwrap();
        assert_eq!(egghe_proot(&lone, 150.0), 2.0);
    }

    #[test]
    fn more_doubletons_mean_fewer_losses() {
        let few = summarize(&[1, 1, 1, 1, 2, 5]).unwrap();
        let many = summarize(&[1, 1, 1, 1, 2, 2, 2, 5]).unwrap();
        assert!(loss_probability(&many, 150.0) < loss_probability(&few, 150.0));
    }
}
