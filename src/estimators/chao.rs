//! Chao-family estimators: Chao1, improved Chao1 (iChao1) and the Chao1
//! analytic variance.
//!
//! All three read only `S_obs`, `n` and the first four frequency classes.

use crate::domain::FrequencyCounts;

/// Unseen-species component of Chao1: `f1² / (2 f2)`, or the bias-corrected
/// `f1 (f1 - 1) / 2` when there are no doubletons.
#[must_use]
pub fn chao1_unseen(counts: &FrequencyCounts) -> f64 {
    let f1 = counts.singletons() as f64;
    let f2 = counts.doubletons() as f64;
    if f1 <= 0.0 {
        return 0.0;
    }
    if f2 > 0.0 {
        (f1 * f1) / (2.0 * f2)
    } else {
        (f1 * (f1 - 1.0)) / 2.0
    }
}

/// Chao1 lower-bound richness estimator.
///
/// ```text
/// f2 > 0:   S_obs + f1² / (2 f2)
/// f2 == 0:  S_obs + f1 (f1 - 1) / 2
/// ```
///
/// ```
/// use unseen::{estimators::chao1, summarize};
///
/// let fc = summarize(&[6, 3, 2, 1, 1, 1, 1, 2]).unwrap();
/// assert_eq!(chao1(&fc), 12.0);
/// ```
#[must_use]
pub fn chao1(counts: &FrequencyCounts) -> f64 {
    counts.observed() as f64 + chao1_unseen(counts)
}

/// Improved Chao1 (Chiu, Wang, Walther & Chao 2014).
///
/// Adds a correction driven by tripletons and quadrupletons:
///
/// ```text
/// iChao1 = Chao1 + (n-3)/(4n) · f3/f4 · max(f1 - (n-3)/(2(n-1)) · f2·f3/f4, 0)
/// ```
///
/// With `f4 == 0` the ratio uses `f4 = 1`; with `f3 == 0` the correction is zero
/// and the estimate equals Chao1.
#[must_use]
pub fn ichao1(counts: &FrequencyCounts) -> f64 {
    let base = chao1(counts);
    let f1 = counts.singletons() as f64;
    let f2 = counts.doubletons() as f64;
    let f3 = counts.f(3) as f64;
    let f4 = counts.f(4) as f64;
    let n = counts.sample_size() as f64;

    if f3 <= 0.0 || n <= 3.0 {
        return base;
    }
    let f4 = if f4 > 0.0 { f4 } else { 1.0 };

    let lead = (n - 3.0) / (4.0 * n) * (f3 / f4);
    let inner = f1 - (n - 3.0) / (2.0 * (n - 1.0)) * (f2 * f3 / f4);
    let correction = lead * inner.max(0.0);
    if correction.is_finite() {
        base + correction
    } else {
        base
    }
}

/// Analytic variance of Chao1.
///
/// `f2 > 0`: `f2 · (r²/2 + r³ + r⁴/4)` with `r = f1/f2`.
/// `f2 == 0`: `f1(f1-1)/2 + f1(2f1-1)²/4 - f1⁴/(4 Ŝ)`.
#[must_use]
pub fn chao1_variance(counts: &FrequencyCounts) -> f64 {
    let f1 = counts.singletons() as f64;
    let f2 = counts.doubletons() as f64;
    if f1 <= 0.0 {
        return 0.0;
    }
    let var = if f2 > 0.0 {
        let r = f1 / f2;
        f2 * (0.5 * r * r + r * r * r + 0.25 * r * r * r * r)
    } else {
        let s_hat = chao1(counts);
        f1 * (f1 - 1.0) / 2.0 + f1 * (2.0 * f1 - 1.0).powi(2) / 4.0 - f1.powi(4) / (4.0 * s_hat)
    };
    var.max(0.0)
}
