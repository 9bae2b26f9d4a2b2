//! Coverage-adjusted multinomial resampling model (Chao et al. 2014).
//!
//! The empirical relative abundances `X_i / n` overstate how much probability
//! the detected species carry. The model shrinks them towards the estimated
//! sample coverage `Ĉ` and spreads the missing mass `1 - Ĉ` evenly over
//! `⌈f0⌉` undetected cells, so replicates can "discover" species the original
//! sample missed.

use rand::Rng;
use rand_distr::{Binomial, Distribution};

use crate::domain::{Abundance, FrequencyCounts};
use crate::error::{EngineError, Result};

/// Good-Turing style coverage estimate with the Chao & Jost correction.
pub fn sample_coverage(counts: &FrequencyCounts) -> f64 {
    let n = counts.sample_size() as f64;
    let f1 = counts.singletons() as f64;
    let f2 = counts.doubletons() as f64;
    if f1 == 0.0 || n == 0.0 {
        return 1.0;
    }
    let shrink = if f2 > 0.0 {
        (n - 1.0) * f1 / ((n - 1.0) * f1 + 2.0 * f2)
    } else {
        (n - 1.0) * (f1 - 1.0) / ((n - 1.0) * (f1 - 1.0) + 2.0)
    };
    (1.0 - f1 / n * shrink).clamp(0.0, 1.0)
}

/// Cell probabilities for detected species followed by the unseen cells.
#[derive(Debug, Clone, PartialEq)]
pub struct ResamplingModel {
    probabilities: Vec<f64>,
    detected: usize,
    sample_size: u64,
    coverage: f64,
}

impl ResamplingModel {
    /// Fit the model to `abundance`, allotting `unseen` undetected species.
    pub fn fit(abundance: &Abundance, unseen: f64) -> Self {
        let counts = abundance.summarize();
        let n = abundance.total();
        let nf = n as f64;
        let coverage = sample_coverage(&counts);
        let unseen_cells = if unseen.is_finite() && unseen > 0.0 {
            unseen.ceil() as usize
        } else {
            0
        };

        let relative: Vec<f64> = abundance.counts().iter().map(|&x| x as f64 / nf).collect();
        let missing = 1.0 - coverage;

        let mut probabilities = if unseen_cells == 0 || missing <= 0.0 {
            relative
        } else {
            let denom: f64 = relative.iter().map(|&p| p * (1.0 - p).powf(nf)).sum();
            let lambda = if denom > 0.0 { missing / denom } else { 0.0 };
            relative
                .iter()
                .map(|&p| (p * (1.0 - lambda * (1.0 - p).powf(nf))).max(0.0))
                .collect()
        };

        let detected = probabilities.len();
        if unseen_cells > 0 && missing > 0.0 {
            let cell = missing / unseen_cells as f64;
            probabilities.extend(std::iter::repeat_n(cell, unseen_cells));
        }

        Self {
            probabilities,
            detected,
            sample_size: n,
            coverage,
        }
    }

    pub fn coverage(&self) -> f64 {
        self.coverage
    }

    pub fn sample_size(&self) -> u64 {
        self.sample_size
    }

    pub fn unseen_cells(&self) -> usize {
        self.probabilities.len() - self.detected
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Draw one replicate of `n` observations and keep the non-zero cells.
    ///
    /// The multinomial is sampled cell by cell: each cell takes a binomial
    /// share of whatever has not been allocated yet, conditioned on the mass
    /// still left.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Abundance> {
        let mut remaining = self.sample_size;
        let mut mass_left: f64 = self.probabilities.iter().sum();
        let mut drawn = Vec::with_capacity(self.detected);
        let last = self.probabilities.len().saturating_sub(1);

        for (idx, &p) in self.probabilities.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let x = if idx == last || mass_left <= p {
                remaining
            } else {
                let share = (p / mass_left).clamp(0.0, 1.0);
                Binomial::new(remaining, share)
                    .map_err(|e| EngineError::config(format!("binomial draw: {e}")))?
                    .sample(rng)
            };
            if x > 0 {
                drawn.push(x);
            }
            remaining -= x;
            mass_left -= p;
        }

        Abundance::from_positive(drawn)
    }
}
