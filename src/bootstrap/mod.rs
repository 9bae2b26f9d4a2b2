//! Bootstrap intervals for estimates and survival ratios.

pub mod model;
pub mod runner;

pub use model::{ResamplingModel, sample_coverage};
pub use runner::{replicate_seed, run_replicates};

use crate::domain::{
    Abundance, BootstrapConfig, EstimateResult, FrequencyCounts, Method, Mode, SurvivalRatio,
};
use crate::error::{EngineError, Result};
use crate::estimators::{chao1_unseen, estimate};
use crate::math::{equal_tail_bounds, sort_floats};

/// Fit the resampling model for `method` given its point estimate.
///
/// Species-mode estimators supply their own unseen count; population-mode
/// estimators fall back to Chao1's.
pub(crate) fn fit_model(
    abundance: &Abundance,
    counts: &FrequencyCounts,
    method: Method,
    species: bool,
    point: f64,
) -> ResamplingModel {
    let unseen = match method.mode(species) {
        Mode::Species => point - counts.observed() as f64,
        Mode::Population => chao1_unseen(counts),
    };
    ResamplingModel::fit(abundance, unseen)
}

pub(crate) fn bounds(values: &[f64], confidence_level: f64) -> Result<(f64, f64)> {
    let mut sorted = values.to_vec();
    sort_floats(&mut sorted);
    equal_tail_bounds(&sorted, confidence_level)
        .ok_or_else(|| EngineError::config("no bootstrap replicates to summarize"))
}

/// Point estimate of `method` plus a percentile interval from `cfg.n_iter`
/// replicates. Replicates are kept in draw order.
pub fn bootstrap(abundance: &Abundance, method: Method, cfg: &BootstrapConfig) -> Result<EstimateResult> {
    cfg.validate()?;
    let counts = abundance.summarize();
    let point = estimate(method, &counts, cfg.species, &cfg.estimator)?;
    let model = fit_model(abundance, &counts, method, cfg.species, point);

    let replicates = run_replicates(&model, cfg, |rep| {
        estimate(method, &rep.summarize(), cfg.species, &cfg.estimator)
    })?;
    let (lower, upper) = bounds(&replicates, cfg.confidence_level)?;

    Ok(EstimateResult {
        method,
        point_estimate: point,
        bootstrap: Some(replicates),
        lower,
        upper,
        confidence_level: cfg.confidence_level,
    })
}

fn ratio(observed: f64, total: f64) -> f64 {
    if total.is_finite() && total > 0.0 {
        (observed / total).clamp(f64::MIN_POSITIVE, 1.0)
    } else {
        1.0
    }
}

/// Share of the estimated total that was actually observed.
///
/// The numerator is always the original sample's `S_obs` (or `n` for
/// population-mode methods); only the denominator is resampled.
pub fn survival_ratio(abundance: &Abundance, method: Method, cfg: &BootstrapConfig) -> Result<SurvivalRatio> {
    cfg.validate()?;
    let counts = abundance.summarize();
    let observed = match method.mode(cfg.species) {
        Mode::Species => counts.observed() as f64,
        Mode::Population => counts.sample_size() as f64,
    };

    let point_estimate = estimate(method, &counts, cfg.species, &cfg.estimator)?;
    let point = ratio(observed, point_estimate);
    let model = fit_model(abundance, &counts, method, cfg.species, point_estimate);

    let replicates = run_replicates(&model, cfg, |rep| {
        let total = estimate(method, &rep.summarize(), cfg.species, &cfg.estimator)?;
        Ok(ratio(observed, total))
    })?;
    let (lower, upper) = bounds(&replicates, cfg.confidence_level)?;

    Ok(SurvivalRatio {
        method,
        point,
        replicates,
        lower,
        upper,
        confidence_level: cfg.confidence_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CancelToken;
    use crate::estimators::{chao1, chao1_variance};
    use crate::math::std_dev;

    fn sample() -> Abundance {
        Abundance::new(&[6, 3, 2, 1, 1, 1, 1, 2]).unwrap()
    }

    fn seeded(n_iter: usize, seed: u64) -> BootstrapConfig {
        BootstrapConfig {
            n_iter,
            seed: Some(seed),
            ..BootstrapConfig::default()
        }
    }

    #[test]
    fn returns_one_value_per_replicate() {
        let r = bootstrap(&sample(), Method::Chao1, &seeded(200, 3)).unwrap();
        assert_eq!(r.replicates().len(), 200);
        assert_eq!(r.point_estimate, 12.0);
        assert!(r.replicates().iter().all(|v| v.is_finite() && *v >= 1.0));
    }

    #[test]
    fn interval_brackets_the_median() {
        let r = bootstrap(&sample(), Method::Ace, &seeded(300, 5)).unwrap();
        let median = r.median().unwrap();
        assert!(r.lower <= median && median <= r.upper);
    }

    #[test]
    fn seeded_runs_do_not_depend_on_worker_count() {
        let one = bootstrap(&sample(), Method::IChao1, &seeded(120, 9)).unwrap();
        let four = bootstrap(
            &sample(),
            Method::IChao1,
            &BootstrapConfig {
                n_jobs: 4,
                ..seeded(120, 9)
            },
        )
        .unwrap();
        assert_eq!(one, four);
    }

    #[test]
    fn empirical_population_mode_is_constant() {
        let cfg = BootstrapConfig {
            species: false,
            ..seeded(50, 1)
        };
        let r = bootstrap(&sample(), Method::Empirical, &cfg).unwrap();
        assert_eq!(r.point_estimate, 17.0);
        assert!(r.replicates().iter().all(|&v| v == 17.0));
    }

    #[test]
    fn survival_ratios_are_fractions() {
        for method in [Method::Chao1, Method::Jackknife, Method::Minsample, Method::Empirical] {
            let s = survival_ratio(&sample(), method, &seeded(100, 2)).unwrap();
            assert!(s.point > 0.0 && s.point <= 1.0, "{method}: {}", s.point);
            assert!(s.replicates.iter().all(|&r| r > 0.0 && r <= 1.0));
            assert!(s.lower <= s.upper);
        }
        let s = survival_ratio(&sample(), Method::Chao1, &seeded(10, 2)).unwrap();
        assert!((s.point - 8.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn survival_replicates_divide_observed_by_each_estimate() {
        let cfg = seeded(50, 2);
        let totals = bootstrap(&sample(), Method::Chao1, &cfg).unwrap();
        let s = survival_ratio(&sample(), Method::Chao1, &cfg).unwrap();
        assert_eq!(s.replicates.len(), 50);
        for (ratio, total) in s.replicates.iter().zip(totals.replicates()) {
            assert!((ratio - (8.0 / total).min(1.0)).abs() < 1e-12, "{ratio} vs 8/{total}");
        }
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(
            bootstrap(&sample(), Method::Chao1, &seeded(0, 1)),
            Err(EngineError::InvalidConfiguration(_))
        ));
        let cfg = BootstrapConfig {
            confidence_level: 0.0,
            ..seeded(10, 1)
        };
        assert!(matches!(
            survival_ratio(&sample(), Method::Chao1, &cfg),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn cancellation_surfaces() {
        let token = CancelToken::new();
        token.cancel();
        let cfg = BootstrapConfig {
            cancel: Some(token),
            ..seeded(10, 1)
        };
        assert_eq!(
            bootstrap(&sample(), Method::Chao1, &cfg),
            Err(EngineError::Cancelled)
        );
    }

    #[test]
    fn spread_is_comparable_to_analytic_chao1_variance() {
        // 20 singletons, 10 doubletons and 30 abundant species.
        let mut counts = vec![1i64; 20];
        counts.extend(std::iter::repeat_n(2, 10));
        counts.extend(5..35);
        let a = Abundance::new(&counts).unwrap();
        let fc = a.summarize();
        assert_eq!(chao1(&fc), 60.0 + 20.0);

        let r = bootstrap(&a, Method::Chao1, &seeded(400, 17)).unwrap();
        let sd = std_dev(r.replicates()).unwrap();
        let analytic = chao1_variance(&fc).sqrt();
        let ratio = sd / analytic;
        assert!((0.33..3.0).contains(&ratio), "sd {sd} vs analytic {analytic}");
    }
}
