//! Richness extrapolation beyond the observed sample size.
//!
//! For an additional sample of `m*` observations (Chao et al. 2014):
//!
//! ```text
//! S(n + m*) = S_obs + f0 · (1 - (1 - f1 / (n·f0 + f1))^m*)
//! ```
//!
//! which rises monotonically from `S_obs` and saturates at `S_obs + f0`.

use crate::domain::FrequencyCounts;

/// Extrapolation curve anchored at the observed sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrapolation {
    observed: f64,
    unseen: f64,
    singletons: f64,
    sample_size: u64,
}

impl Extrapolation {
    /// Curve for `counts` with `unseen` undetected species (negative or
    /// non-finite values are treated as zero).
    pub fn new(counts: &FrequencyCounts, unseen: f64) -> Self {
        let unseen = if unseen.is_finite() { unseen.max(0.0) } else { 0.0 };
        Self {
            observed: counts.observed() as f64,
            unseen,
            singletons: counts.singletons() as f64,
            sample_size: counts.sample_size(),
        }
    }

    pub fn observed(&self) -> f64 {
        self.observed
    }

    pub fn unseen(&self) -> f64 {
        self.unseen
    }

    pub fn sample_size(&self) -> u64 {
        self.sample_size
    }

    /// `S_obs + f0`, approached as the extra sample grows without bound.
    pub fn asymptote(&self) -> f64 {
        self.observed + self.unseen
    }

    /// `ln(1 - f1 / (n·f0 + f1))`; zero when nothing is left to discover.
    pub(crate) fn log_decay(&self) -> f64 {
        if self.unseen <= 0.0 || self.singletons <= 0.0 {
            return 0.0;
        }
        let n = self.sample_size as f64;
        (-(self.singletons / (n * self.unseen + self.singletons))).ln_1p()
    }

    /// Expected richness after `extra` additional observations.
    pub fn expected_after(&self, extra: u64) -> f64 {
        let ld = self.log_decay();
        if ld == 0.0 || extra == 0 {
            return self.observed;
        }
        // 1 - q^extra, computed as -expm1(extra · ln q).
        self.observed + self.unseen * -(extra as f64 * ld).exp_m1()
    }

    /// Expected richness at total sample size `m >= n`.
    pub fn expected_at(&self, m: u64) -> f64 {
        self.expected_after(m.saturating_sub(self.sample_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::summarize;
    use crate::estimators::chao1_unseen;

    #[test]
    fn starts_at_observed_and_saturates() {
        let fc = summarize(&[6, 3, 2, 1, 1, 1, 1, 2]).unwrap();
        let curve = Extrapolation::new(&fc, chao1_unseen(&fc));
        assert_eq!(curve.expected_after(0), 8.0);
        assert_eq!(curve.asymptote(), 12.0);
        assert!(curve.expected_after(1_000_000) <= 12.0);
        assert!(12.0 - curve.expected_after(1_000_000) < 1e-9);
    }

    #[test]
    fn matches_closed_form() {
        let fc = summarize(&[6, 3, 2, 1, 1, 1, 1, 2]).unwrap();
        let curve = Extrapolation::new(&fc, 4.0);
        // 8 + 4 (1 - (1 - 4 / (17·4 + 4))^10)
        let q: f64 = 1.0 - 4.0 / 72.0;
        let expected = 8.0 + 4.0 * (1.0 - q.powi(10));
        assert!((curve.expected_at(27) - expected).abs() < 1e-12);
    }

    #[test]
    fn flat_without_singletons_or_unseen() {
        let fc = summarize(&[2, 3, 4]).unwrap();
        let curve = Extrapolation::new(&fc, 0.0);
        assert_eq!(curve.expected_after(500), 3.0);

        let no_f1 = Extrapolation::new(&fc, 2.0);
        assert_eq!(no_f1.expected_after(500), 3.0);
    }

    #[test]
    fn is_monotone() {
        let fc = summarize(&[1, 1, 1, 1, 2, 6, 9]).unwrap();
        let curve = Extrapolation::new(&fc, chao1_unseen(&fc));
        let mut prev = curve.expected_after(0);
        for extra in 1..300 {
            let cur = curve.expected_after(extra);
            assert!(cur >= prev);
            prev = cur;
        }
    }
}
