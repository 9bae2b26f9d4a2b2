//! Abundance vectors and their frequency-count summary.
//!
//! Every estimator in this crate is a *symmetric* functional of the sample: it
//! only depends on how many species were seen once, twice, and so on. The
//! [`FrequencyCounts`] record is therefore the sufficient statistic that the
//! estimator library, the resampler and the curve engine all consume.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Per-species observation counts (one entry per observed species, all `>= 1`).
///
/// Constructed once from raw data and never mutated afterwards. The total
/// `n` is checked to fit in a `u64` at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<u64>", try_from = "Vec<i64>")]
pub struct Abundance(Vec<u64>);

impl TryFrom<Vec<i64>> for Abundance {
    type Error = EngineError;

    fn try_from(counts: Vec<i64>) -> Result<Self> {
        Self::new(&counts)
    }
}

impl From<Abundance> for Vec<u64> {
    fn from(abundance: Abundance) -> Self {
        abundance.0
    }
}

impl Abundance {
    /// Validate signed counts (the shape most data-loading layers produce).
    ///
    /// # Errors
    /// [`EngineError::InvalidInput`] if the vector is empty or has an entry `<= 0`.
    pub fn new(counts: &[i64]) -> Result<Self> {
        if counts.is_empty() {
            return Err(EngineError::input("abundance vector is empty"));
        }
        let mut out = Vec::with_capacity(counts.len());
        for (idx, &c) in counts.iter().enumerate() {
            if c <= 0 {
                return Err(EngineError::input(format!(
                    "abundance[{idx}] = {c}; every species must be observed at least once"
                )));
            }
            out.push(c as u64);
        }
        checked_total(&out)?;
        Ok(Self(out))
    }

    /// Validate floating-point counts, rejecting fractional or non-finite values.
    pub fn from_f64s(counts: &[f64]) -> Result<Self> {
        let mut ints = Vec::with_capacity(counts.len());
        for (idx, &c) in counts.iter().enumerate() {
            if !c.is_finite() || c.fract() != 0.0 || c > i64::MAX as f64 {
                return Err(EngineError::input(format!(
                    "abundance[{idx}] = {c} is not an integer count"
                )));
            }
            ints.push(c as i64);
        }
        Self::new(&ints)
    }

    /// Wrap counts that are already known to be positive (replicate draws).
    pub(crate) fn from_positive(counts: Vec<u64>) -> Result<Self> {
        if counts.is_empty() || counts.contains(&0) {
            return Err(EngineError::input("replicate produced an empty or zero count"));
        }
        checked_total(&counts)?;
        Ok(Self(counts))
    }

    pub fn counts(&self) -> &[u64] {
        &self.0
    }

    /// Number of observed species (`S_obs`).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: an `Abundance` is non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of observations (`n`).
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    pub fn summarize(&self) -> FrequencyCounts {
        FrequencyCounts::from_abundance(self)
    }
}

fn checked_total(counts: &[u64]) -> Result<u64> {
    counts.iter().try_fold(0u64, |acc, &c| {
        acc.checked_add(c)
            .ok_or_else(|| EngineError::input("total observation count overflows u64"))
    })
}

/// Counts-of-counts: `f_k` is the number of species observed exactly `k` times.
///
/// Invariants: `Σ f_k == S_obs` and `Σ k·f_k == n`. Only multiplicities that
/// occur are stored, so the table has at most `S_obs` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyCounts {
    f: BTreeMap<u64, u64>,
    s_obs: u64,
    n: u64,
}

impl FrequencyCounts {
    fn from_abundance(abundance: &Abundance) -> Self {
        let mut f = BTreeMap::new();
        let mut n = 0u64;
        for &c in abundance.counts() {
            *f.entry(c).or_insert(0) += 1;
            // Bounded by the total checked when the Abundance was built.
            n = n.saturating_add(c);
        }
        Self {
            f,
            s_obs: abundance.len() as u64,
            n,
        }
    }

    /// `f_k`, zero for multiplicities that never occur (including `k == 0`).
    #[must_use]
    pub fn f(&self, k: usize) -> u64 {
        self.f.get(&(k as u64)).copied().unwrap_or(0)
    }

    /// `f_1`.
    #[must_use]
    pub fn singletons(&self) -> u64 {
        self.f(1)
    }

    /// `f_2`.
    #[must_use]
    pub fn doubletons(&self) -> u64 {
        self.f(2)
    }

    /// `S_obs`.
    #[must_use]
    pub fn observed(&self) -> u64 {
        self.s_obs
    }

    /// `n`.
    #[must_use]
    pub fn sample_size(&self) -> u64 {
        self.n
    }

    /// Largest multiplicity present.
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.f.keys().next_back().map_or(0, |&k| k as usize)
    }

    /// `(k, f_k)` pairs with `f_k > 0`, in increasing `k`.
    pub fn spectrum(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.f.iter().map(|(&k, &fk)| (k as usize, fk))
    }
}

/// Summarize raw signed counts into [`FrequencyCounts`].
///
/// ```
/// let fc = unseen::summarize(&[6, 3, 2, 1, 1, 1, 1, 2]).unwrap();
/// assert_eq!((fc.singletons(), fc.doubletons()), (4, 2));
/// assert_eq!((fc.observed(), fc.sample_size()), (8, 17));
/// ```
pub fn summarize(abundance: &[i64]) -> Result<FrequencyCounts> {
    Ok(Abundance::new(abundance)?.summarize())
}
