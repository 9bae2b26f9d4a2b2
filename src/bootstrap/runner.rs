//! Replicate scheduling.
//!
//! Replicate `i` always uses an RNG seeded from `(seed, i)`, and results are
//! gathered in index order, so a seeded run returns the same vector whether it
//! runs inline or on any number of worker threads.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::bootstrap::model::ResamplingModel;
use crate::domain::{Abundance, BootstrapConfig};
use crate::error::{EngineError, Result};

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed of replicate `index` under base seed `base`.
pub fn replicate_seed(base: u64, index: u64) -> u64 {
    splitmix64(base.wrapping_add(splitmix64(index)))
}

/// Base seed for a run: the configured one, or a fresh one that gets logged so
/// the run can be reproduced.
pub(crate) fn resolve_seed(cfg: &BootstrapConfig) -> u64 {
    match cfg.seed {
        Some(seed) => seed,
        None => {
            let seed: u64 = rand::thread_rng().r#gen();
            tracing::info!(seed, "no bootstrap seed given; drew one");
            seed
        }
    }
}

/// Draw `cfg.n_iter` replicates from `model` and apply `job` to each.
///
/// Fails with [`EngineError::Cancelled`] if the config's cancel token fires
/// before the run finishes; partial results are dropped.
pub fn run_replicates<T, F>(model: &ResamplingModel, cfg: &BootstrapConfig, job: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(Abundance) -> Result<T> + Sync,
{
    cfg.validate()?;
    let seed = resolve_seed(cfg);
    tracing::debug!(
        n_iter = cfg.n_iter,
        n_jobs = cfg.n_jobs,
        seed,
        unseen_cells = model.unseen_cells(),
        coverage = model.coverage(),
        "bootstrap run"
    );

    let cancelled = || cfg.cancel.as_ref().is_some_and(|c| c.is_cancelled());
    let one = |i: usize| -> Result<T> {
        if cancelled() {
            return Err(EngineError::Cancelled);
        }
        let mut rng = StdRng::seed_from_u64(replicate_seed(seed, i as u64));
        job(model.draw(&mut rng)?)
    };

    let out = if cfg.n_jobs == 1 {
        (0..cfg.n_iter).map(one).collect::<Result<Vec<T>>>()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(cfg.n_jobs)
            .build()
            .map_err(|e| EngineError::config(format!("failed to build worker pool: {e}")))?;
        pool.install(|| (0..cfg.n_iter).into_par_iter().map(one).collect::<Result<Vec<T>>>())
    };

    if cancelled() {
        return Err(EngineError::Cancelled);
    }
    out
}
