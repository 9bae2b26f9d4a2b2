//! Species accumulation curves.
//!
//! The curve is rarefied below the observed sample size and extrapolated above
//! it; both halves meet at `(n, S_obs)`. Bands come from recomputing the whole
//! curve on every bootstrap replicate and taking pointwise quantiles.

pub mod extrapolate;
pub mod interpolate;

pub use extrapolate::Extrapolation;
pub use interpolate::rarefied_richness;

use crate::bootstrap::{self, ResamplingModel, run_replicates};
use crate::domain::{
    Abundance, AccumulationCurve, CurveConfig, CurvePoint, EstimatorOptions, FrequencyCounts,
    Method, Mode, Segment,
};
use crate::error::{EngineError, Result};
use crate::estimators::unseen_species;

/// Sample sizes the curve is evaluated at: `0, step, 2·step, ...` up to
/// `max(n, max_steps)`, always including `n` and the end point.
pub fn sample_grid(n: u64, max_steps: u64, step: u64) -> Vec<u64> {
    let end = n.max(max_steps);
    let step = step.max(1);
    let mut grid: Vec<u64> = (0..=end).step_by(step as usize).collect();
    grid.push(n);
    grid.push(end);
    grid.sort_unstable();
    grid.dedup();
    grid
}

fn curve_values(
    counts: &FrequencyCounts,
    method: Method,
    opts: &EstimatorOptions,
    grid: &[u64],
) -> Result<Vec<f64>> {
    let n = counts.sample_size();
    let extrapolation = Extrapolation::new(counts, unseen_species(method, counts, opts)?);
    Ok(grid
        .iter()
        .map(|&m| {
            if m <= n {
                rarefied_richness(counts, m)
            } else {
                extrapolation.expected_at(m)
            }
        })
        .collect())
}

/// Expected richness over `0..=max(n, max_steps)` with bootstrap bands.
///
/// # Errors
/// [`EngineError::InvalidConfiguration`] for `max_steps == 0`, `step == 0`, a
/// bad bootstrap config, or a population-mode `method`.
pub fn species_accumulation(abundance: &Abundance, cfg: &CurveConfig) -> Result<AccumulationCurve> {
    if cfg.max_steps == 0 {
        return Err(EngineError::config("max_steps must be >= 1"));
    }
    if cfg.step == 0 {
        return Err(EngineError::config("curve step must be >= 1"));
    }
    if cfg.method.mode(true) == Mode::Population {
        return Err(EngineError::config(format!(
            "{} cannot drive an accumulation curve",
            cfg.method
        )));
    }
    cfg.bootstrap.validate()?;

    let counts = abundance.summarize();
    let n = counts.sample_size();
    let opts = &cfg.bootstrap.estimator;
    let unseen = unseen_species(cfg.method, &counts, opts)?;
    let observed = counts.observed() as f64;

    let grid = sample_grid(n, cfg.max_steps, cfg.step);
    let expected = curve_values(&counts, cfg.method, opts, &grid)?;
    tracing::debug!(
        method = %cfg.method,
        points = grid.len(),
        unseen,
        "accumulation curve"
    );

    let model = ResamplingModel::fit(abundance, unseen);
    let replicate_curves = run_replicates(&model, &cfg.bootstrap, |rep| {
        curve_values(&rep.summarize(), cfg.method, opts, &grid)
    })?;

    let mut points = Vec::with_capacity(grid.len());
    let mut column = Vec::with_capacity(replicate_curves.len());
    for (idx, (&m, &value)) in grid.iter().zip(&expected).enumerate() {
        column.clear();
        column.extend(replicate_curves.iter().map(|curve| curve[idx]));
        let (lower, upper) = bootstrap::bounds(&column, cfg.bootstrap.confidence_level)?;
        points.push(CurvePoint {
            sample_size: m,
            expected_richness: value,
            lower,
            upper,
            segment: if m <= n {
                Segment::Interpolated
            } else {
                Segment::Extrapolated
            },
        });
    }

    Ok(AccumulationCurve {
        method: cfg.method,
        observed: counts.observed(),
        sample_size: n,
        asymptote: observed + unseen,
        confidence_level: cfg.bootstrap.confidence_level,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Abundance {
        Abundance::new(&[6, 3, 2, 1, 1, 1, 1, 2]).unwrap()
    }

    fn config(max_steps: u64) -> CurveConfig {
        let mut cfg = CurveConfig::new(max_steps, 50);
        cfg.bootstrap.seed = Some(4);
        cfg
    }

    #[test]
    fn grid_always_contains_n_and_end() {
        assert_eq!(sample_grid(17, 40, 10), vec![0, 10, 17, 20, 30, 40]);
        assert_eq!(sample_grid(5, 3, 1), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(sample_grid(3, 3, 1), vec![0, 1, 2, 3]);
    }

    #[test]
    fn meets_observed_richness_at_sample_size() {
        let curve = species_accumulation(&sample(), &config(40)).unwrap();
        assert_eq!(curve.points[17].sample_size, 17);
        assert_eq!(curve.points[17].expected_richness, 8.0);
        assert_eq!(curve.at(17).map(|p| p.segment), Some(Segment::Interpolated));
        assert_eq!(curve.at(0).map(|p| p.expected_richness), Some(0.0));
        assert_eq!(curve.asymptote, 12.0);
    }

    #[test]
    fn is_non_decreasing_and_bounded_by_asymptote() {
        let curve = species_accumulation(&sample(), &config(200)).unwrap();
        for pair in curve.points.windows(2) {
            assert!(pair[1].expected_richness + 1e-9 >= pair[0].expected_richness);
        }
        assert!(curve.points.iter().all(|p| p.expected_richness <= 12.0 + 1e-9));
        assert!(curve.points.iter().all(|p| p.lower <= p.upper));
        assert_eq!(curve.extrapolated().count(), 200 - 17);
    }

    #[test]
    fn short_horizon_has_no_extrapolated_part() {
        let curve = species_accumulation(&sample(), &config(10)).unwrap();
        assert_eq!(curve.extrapolated().count(), 0);
        assert_eq!(curve.interpolated().count(), 18);
    }

    #[test]
    fn seeded_bands_are_reproducible() {
        let a = species_accumulation(&sample(), &config(30)).unwrap();
        let mut cfg = config(30);
        cfg.bootstrap.n_jobs = 3;
        let b = species_accumulation(&sample(), &cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(matches!(
            species_accumulation(&sample(), &config(0)),
            Err(EngineError::InvalidConfiguration(_))
        ));

        let mut no_iter = config(30);
        no_iter.bootstrap.n_iter = 0;
        assert!(matches!(
            species_accumulation(&sample(), &no_iter),
            Err(EngineError::InvalidConfiguration(_))
        ));

        let mut population = config(30);
        population.method = Method::Minsample;
        assert!(matches!(
            species_accumulation(&sample(), &population),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }
}
