//! Public entry points.
//!
//! Thin wrappers that tie the estimator library, the resampler, the curve
//! engine and the solver together behind one surface. Everything here is
//! synchronous and stateless; callers that need to stay responsive run these
//! on their own threads and use a [`CancelToken`](crate::domain::CancelToken).

use crate::domain::{
    Abundance, AccumulationCurve, BootstrapConfig, CurveConfig, Diversity, DiversityOptions,
    EstimateResult, FrequencyCounts, Method, SamplingPlan, SolverConfig, SurvivalRatio,
};
use crate::error::Result;

/// Frequency-count summary of a raw abundance vector.
pub fn summarize(abundance: &[i64]) -> Result<FrequencyCounts> {
    crate::domain::summarize(abundance)
}

/// Richness (or population) estimate, optionally with a bootstrap interval.
///
/// Without `ci`, the jackknife still reports its analytic interval (an
/// [`EstimateResult`] with no replicates).
pub fn diversity(abundance: &Abundance, method: Method, opts: &DiversityOptions) -> Result<Diversity> {
    if opts.ci {
        let result = crate::bootstrap::bootstrap(abundance, method, &opts.bootstrap_config())?;
        return Ok(Diversity::Interval(result));
    }
    let counts = abundance.summarize();
    if method == Method::Jackknife {
        crate::estimators::validate_options(&opts.estimator)?;
        let detail = crate::estimators::jackknife_detailed(
            &counts,
            opts.estimator.jackknife_order,
            opts.estimator.jackknife_confidence,
        );
        tracing::debug!(order = detail.order, value = detail.estimate, "jackknife estimate");
        return Ok(Diversity::Interval(EstimateResult {
            method,
            point_estimate: detail.estimate,
            bootstrap: None,
            lower: detail.lower,
            upper: detail.upper,
            confidence_level: detail.confidence_level,
        }));
    }
    let value = crate::estimators::estimate(method, &counts, opts.species, &opts.estimator)?;
    tracing::debug!(%method, value, "point estimate");
    Ok(Diversity::Point(value))
}

/// Fraction of the estimated total that the sample actually contains.
pub fn survival_ratio(abundance: &Abundance, method: Method, cfg: &BootstrapConfig) -> Result<SurvivalRatio> {
    crate::bootstrap::survival_ratio(abundance, method, cfg)
}

/// Rarefaction/extrapolation curve with bootstrap bands.
pub fn species_accumulation(abundance: &Abundance, cfg: &CurveConfig) -> Result<AccumulationCurve> {
    crate::accumulation::species_accumulation(abundance, cfg)
}

/// Additional observations needed to reach a richness target.
pub fn min_additional_sample(abundance: &Abundance, cfg: &SolverConfig) -> Result<SamplingPlan> {
    crate::solver::min_additional_sample(abundance, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EstimatorOptions, JackknifeOrder, SamplingTarget};
    use crate::error::EngineError;

    fn sample() -> Abundance {
        Abundance::new(&[6, 3, 2, 1, 1, 1, 1, 2]).unwrap()
    }

    #[test]
    fn summarize_reports_frequency_counts() {
        let fc = summarize(&[6, 3, 2, 1, 1, 1, 1, 2]).unwrap();
        assert_eq!(fc.singletons(), 4);
        assert_eq!(fc.doubletons(), 2);
        assert_eq!(fc.observed(), 8);
        assert_eq!(fc.sample_size(), 17);
        assert!(matches!(summarize(&[]), Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn point_estimates() {
        let opts = DiversityOptions::default();
        assert_eq!(diversity(&sample(), Method::Chao1, &opts).unwrap(), Diversity::Point(12.0));

        let all_single = Abundance::new(&[1, 1, 1]).unwrap();
        assert_eq!(diversity(&all_single, Method::Chao1, &opts).unwrap().value(), 6.0);
    }

    #[test]
    fn empirical_species_and_population() {
        let species = DiversityOptions::default();
        let population = DiversityOptions {
            species: false,
            ..DiversityOptions::default()
        };
        assert_eq!(diversity(&sample(), Method::Empirical, &species).unwrap().value(), 8.0);
        assert_eq!(diversity(&sample(), Method::Empirical, &population).unwrap().value(), 17.0);
    }

    #[test]
    fn interval_estimates_carry_replicates() {
        let opts = DiversityOptions {
            ci: true,
            n_iter: 150,
            seed: Some(8),
            ..DiversityOptions::default()
        };
        let Diversity::Interval(result) = diversity(&sample(), Method::Chao1, &opts).unwrap() else {
            panic!("expected an interval");
        };
        assert_eq!(result.replicates().len(), 150);
        assert_eq!(result.point_estimate, 12.0);
        let median = result.median().unwrap();
        assert!(result.lower <= median && median <= result.upper);
    }

    #[test]
    fn jackknife_options_reach_the_estimator() {
        let opts = DiversityOptions {
            estimator: EstimatorOptions {
                jackknife_order: JackknifeOrder::Fixed(1),
                ..EstimatorOptions::default()
            },
            ..DiversityOptions::default()
        };
        // First order: S_obs + f1 (n-1)/n
        let expected = 8.0 + 4.0 * 16.0 / 17.0;
        let got = diversity(&sample(), Method::Jackknife, &opts).unwrap().value();
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn jackknife_reports_its_analytic_interval() {
        let Diversity::Interval(result) =
            diversity(&sample(), Method::Jackknife, &DiversityOptions::default()).unwrap()
        else {
            panic!("expected an analytic interval");
        };
        assert!(result.bootstrap.is_none());
        assert!(result.replicates().is_empty());
        assert_eq!(result.confidence_level, 0.95);
        assert!(result.lower >= 8.0);
        assert!(result.lower <= result.point_estimate && result.point_estimate <= result.upper);
        let point = crate::estimators::estimate(
            Method::Jackknife,
            &sample().summarize(),
            true,
            &EstimatorOptions::default(),
        )
        .unwrap();
        assert_eq!(result.point_estimate, point);
    }

    #[test]
    fn every_surface_operation_runs_end_to_end() {
        let boot = BootstrapConfig {
            n_iter: 40,
            seed: Some(3),
            ..BootstrapConfig::default()
        };
        let ratio = survival_ratio(&sample(), Method::Chao1, &boot).unwrap();
        assert!(ratio.point > 0.0 && ratio.point <= 1.0);

        let mut curve_cfg = CurveConfig::new(50, 40);
        curve_cfg.bootstrap.seed = Some(3);
        let curve = species_accumulation(&sample(), &curve_cfg).unwrap();
        assert_eq!(curve.points.last().map(|p| p.sample_size), Some(50));

        let plan = min_additional_sample(
            &sample(),
            &SolverConfig {
                target: SamplingTarget::Fraction(0.75),
                ..SolverConfig::default()
            },
        )
        .unwrap();
        assert!(plan.additional_samples > 0);
    }
}
