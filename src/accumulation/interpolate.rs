//! Rarefaction: expected richness of a random subsample of size `m <= n`.
//!
//! Drawing `m` of the `n` observations without replacement, a species seen
//! `k` times is missed with probability `C(n-k, m) / C(n, m)`, so
//!
//! ```text
//! E[S_m] = Σ_k f_k · (1 - C(n-k, m) / C(n, m))
//! ```
//!
//! The sum runs over distinct frequency classes, so each point costs
//! `O(#classes)` log-gamma evaluations regardless of `S_obs`.

use crate::domain::FrequencyCounts;
use crate::math::ln_choose;

/// Expected richness at subsample size `m` (clamped to `n`).
///
/// Exactly `S_obs` at `m == n` and `0` at `m == 0`.
pub fn rarefied_richness(counts: &FrequencyCounts, m: u64) -> f64 {
    let n = counts.sample_size();
    if m == 0 {
        return 0.0;
    }
    if m >= n {
        return counts.observed() as f64;
    }

    let ln_all = ln_choose(n, m);
    let mut total = 0.0;
    for (k, fk) in counts.spectrum() {
        let k = k as u64;
        let detect = if n - k < m {
            1.0
        } else {
            (1.0 - (ln_choose(n - k, m) - ln_all).exp()).clamp(0.0, 1.0)
        };
        total += fk as f64 * detect;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::summarize;

    fn brute_force(counts: &[i64], m: u64) -> f64 {
        // Exact product form of C(n-k, m) / C(n, m).
        let n: i64 = counts.iter().sum();
        counts
            .iter()
            .map(|&k| {
                if n - k < m as i64 {
                    return 1.0;
                }
                let mut miss = 1.0;
                for j in 0..m as i64 {
                    miss *= (n - k - j) as f64 / (n - j) as f64;
                }
                1.0 - miss
            })
            .sum()
    }

    #[test]
    fn endpoints_are_exact() {
        let fc = summarize(&[6, 3, 2, 1, 1, 1, 1, 2]).unwrap();
        assert_eq!(rarefied_richness(&fc, 0), 0.0);
        assert_eq!(rarefied_richness(&fc, 17), 8.0);
        assert_eq!(rarefied_richness(&fc, 40), 8.0);
    }

    #[test]
    fn single_draw_sees_one_species() {
        let fc = summarize(&[6, 3, 2, 1, 1, 1, 1, 2]).unwrap();
        assert!((rarefied_richness(&fc, 1) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn matches_exact_product() {
        let counts = [6, 3, 2, 1, 1, 1, 1, 2];
        let fc = summarize(&counts).unwrap();
        for m in 1..17 {
            let got = rarefied_richness(&fc, m);
            let want = brute_force(&counts, m);
            assert!((got - want).abs() < 1e-9, "m={m}: {got} vs {want}");
        }
    }

    #[test]
    fn non_decreasing_in_m() {
        let fc = summarize(&[40, 12, 7, 3, 3, 2, 1, 1, 1, 1, 1]).unwrap();
        let mut prev = 0.0;
        for m in 0..=fc.sample_size() {
            let cur = rarefied_richness(&fc, m);
            assert!(cur + 1e-9 >= prev, "m={m}");
            prev = cur;
        }
    }
}
