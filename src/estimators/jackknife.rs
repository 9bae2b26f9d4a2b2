//! Burnham–Overton jackknife estimators of orders 1 through 5.
//!
//! Each order `k` is a linear combination of the first `k` frequency classes:
//!
//! ```text
//! N_k = S_obs + Σ_{i<=k} a_{ik}(t) · f_i
//! ```
//!
//! with closed-form coefficients in the number of sampling units `t` (here the
//! number of observations `n`). For large `t` they tend to the binomial pattern
//! `k, -C(k,2), C(k,3), ...`.
//!
//! Order selection (Burnham & Overton 1979) walks up the orders and stops at the
//! first `k` for which `N_{k+1} - N_k` is not significantly different from zero.

use serde::{Deserialize, Serialize};

use crate::domain::{FrequencyCounts, JackknifeOrder};
use crate::math::two_sided_z;

/// Highest order with closed-form coefficients.
pub const MAX_ORDER: usize = 5;

/// Jackknife estimate with its order and analytic interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JackknifeEstimate {
    pub order: usize,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
    pub confidence_level: f64,
}

/// Additive coefficients `a_{1k} .. a_{5k}` (zero beyond `order`).
fn coefficients(order: usize, t: f64) -> [f64; MAX_ORDER] {
    let t1 = t * (t - 1.0);
    let t2 = t1 * (t - 2.0);
    let t3 = t2 * (t - 3.0);
    let t4 = t3 * (t - 4.0);
    match order {
        1 => [(t - 1.0) / t, 0.0, 0.0, 0.0, 0.0],
        2 => [
            (2.0 * t - 3.0) / t,
            -(t - 2.0).powi(2) / t1,
            0.0,
            0.0,
            0.0,
        ],
        3 => [
            (3.0 * t - 6.0) / t,
            -(3.0 * t * t - 15.0 * t + 19.0) / t1,
            (t - 3.0).powi(3) / t2,
            0.0,
            0.0,
        ],
        4 => [
            (4.0 * t - 10.0) / t,
            -(6.0 * t * t - 36.0 * t + 55.0) / t1,
            (4.0 * t.powi(3) - 42.0 * t * t + 148.0 * t - 175.0) / t2,
            -(t - 4.0).powi(4) / t3,
            0.0,
        ],
        _ => [
            (5.0 * t - 15.0) / t,
            -(10.0 * t * t - 70.0 * t + 125.0) / t1,
            (10.0 * t.powi(3) - 120.0 * t * t + 485.0 * t - 660.0) / t2,
            -((t - 4.0).powi(5) - (t - 5.0).powi(5)) / t3,
            (t - 5.0).powi(5) / t4,
        ],
    }
}

fn frequency_prefix(counts: &FrequencyCounts) -> [f64; MAX_ORDER] {
    let mut f = [0.0; MAX_ORDER];
    for (i, slot) in f.iter_mut().enumerate() {
        *slot = counts.f(i + 1) as f64;
    }
    f
}

/// Highest order the sample supports: `min(5, max(1, n - 1))`.
fn usable_max_order(counts: &FrequencyCounts, requested: usize) -> usize {
    let t = counts.sample_size() as usize;
    requested.clamp(1, MAX_ORDER).min(t.saturating_sub(1).max(1))
}

fn order_estimate(counts: &FrequencyCounts, order: usize) -> f64 {
    let t = counts.sample_size() as f64;
    let a = coefficients(order, t);
    let f = frequency_prefix(counts);
    counts.observed() as f64 + a.iter().zip(f.iter()).map(|(a, f)| a * f).sum::<f64>()
}

/// Analytic variance `Σ A_i² f_i - N_k`, with `A_i = 1 + a_{ik}` (`A_i = 1` for `i > k`).
fn order_variance(counts: &FrequencyCounts, order: usize, estimate: f64) -> f64 {
    let t = counts.sample_size() as f64;
    let a = coefficients(order, t);
    let f = frequency_prefix(counts);
    let s = counts.observed() as f64;
    let low_classes: f64 = f.iter().take(order).sum();
    let weighted: f64 = a
        .iter()
        .zip(f.iter())
        .take(order)
        .map(|(a, f)| (1.0 + a).powi(2) * f)
        .sum();
    (weighted + (s - low_classes) - estimate).max(0.0)
}

/// Is `N_{k+1} - N_k` significantly different from zero?
fn step_is_significant(counts: &FrequencyCounts, order: usize, z: f64) -> bool {
    let t = counts.sample_size() as f64;
    let s = counts.observed() as f64;
    if s <= 1.0 {
        return false;
    }
    let lo = coefficients(order, t);
    let hi = coefficients(order + 1, t);
    let f = frequency_prefix(counts);

    let mut diff = 0.0;
    let mut sum_sq = 0.0;
    for i in 0..=order.min(MAX_ORDER - 1) {
        let b = hi[i] - lo[i];
        diff += b * f[i];
        sum_sq += b * b * f[i];
    }
    let var = s / (s - 1.0) * (sum_sq - diff * diff / s);
    if !(var.is_finite() && var > 0.0) {
        return false;
    }
    let stat = diff / var.sqrt();
    stat.abs() > z
}

/// Select the jackknife order according to `policy`.
pub fn select_order(counts: &FrequencyCounts, policy: JackknifeOrder, confidence: f64) -> usize {
    match policy {
        JackknifeOrder::Fixed(order) => usable_max_order(counts, order),
        JackknifeOrder::Auto { max_order } => {
            let max_order = usable_max_order(counts, max_order);
            let z = two_sided_z(confidence);
            let mut order = 1;
            while order < max_order && step_is_significant(counts, order, z) {
                order += 1;
            }
            order
        }
    }
}

/// Jackknife estimate with order selection and analytic interval.
#[must_use]
pub fn jackknife_detailed(
    counts: &FrequencyCounts,
    policy: JackknifeOrder,
    confidence: f64,
) -> JackknifeEstimate {
    let s_obs = counts.observed() as f64;
    let order = select_order(counts, policy, confidence);
    let raw = order_estimate(counts, order);
    let estimate = if raw.is_finite() { raw.max(s_obs) } else { s_obs };
    let half_width = two_sided_z(confidence) * order_variance(counts, order, raw).sqrt();
    tracing::debug!(order, estimate, half_width, "jackknife order selected");

    JackknifeEstimate {
        order,
        estimate,
        lower: (estimate - half_width).max(s_obs),
        upper: estimate + half_width,
        confidence_level: confidence,
    }
}

/// Jackknife point estimate.
#[must_use]
pub fn jackknife(counts: &FrequencyCounts, policy: JackknifeOrder, confidence: f64) -> f64 {
    jackknife_detailed(counts, policy, confidence).estimate
}
