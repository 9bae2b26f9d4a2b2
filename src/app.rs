//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the abundance data
//! - runs the requested engine operation
//! - prints text or JSON reports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{
    BootstrapArgs, Command, CurveArgs, EstimateArgs, EstimatorArgs, MinsampleArgs, SummarizeArgs,
    SurvivalArgs,
};
use crate::domain::{
    BootstrapConfig, CurveConfig, DiversityOptions, EstimatorOptions, JackknifeOrder, SamplingTarget,
    SolverConfig,
};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `unseen` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Summarize(args) => handle_summarize(args),
        Command::Estimate(args) => handle_estimate(args),
        Command::Survival(args) => handle_survival(args),
        Command::Curve(args) => handle_curve(args),
        Command::Minsample(args) => handle_minsample(args),
    }
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` for this crate with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "warn,unseen=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_summarize(args: SummarizeArgs) -> Result<(), AppError> {
    let run = pipeline::run_summary(&args.input)?;
    if args.json {
        println!("{}", crate::report::to_json(&run.summary)?);
    } else {
        println!("{}", crate::report::format_summary(&run.summary, &run.sample.source));
    }
    Ok(())
}

fn handle_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let opts = diversity_options_from_args(&args);
    let run = pipeline::run_estimate(&args.input, args.method, &opts)?;
    if args.json {
        println!("{}", crate::report::to_json(&run.result)?);
    } else {
        let label = args.method.display_name();
        print!("{}", crate::report::format_estimate(&run.result, label, &run.sample.source));
    }
    Ok(())
}

fn handle_survival(args: SurvivalArgs) -> Result<(), AppError> {
    let mut cfg = bootstrap_config_from_args(&args.bootstrap, &args.estimator);
    cfg.species = !args.population;
    let ratio = pipeline::run_survival(&args.input, args.method, &cfg)?;
    if args.json {
        println!("{}", crate::report::to_json(&ratio)?);
    } else {
        print!("{}", crate::report::format_survival(&ratio));
    }
    Ok(())
}

fn handle_curve(args: CurveArgs) -> Result<(), AppError> {
    let cfg = curve_config_from_args(&args);
    let curve = pipeline::run_curve(&args.input, &cfg)?;
    if args.json {
        println!("{}", crate::report::to_json(&curve)?);
    } else {
        print!("{}", crate::report::format_curve(&curve));
    }
    Ok(())
}

fn handle_minsample(args: MinsampleArgs) -> Result<(), AppError> {
    let cfg = solver_config_from_args(&args);
    let plan = pipeline::run_minsample(&args.input, &cfg)?;
    if args.json {
        println!("{}", crate::report::to_json(&plan)?);
    } else {
        print!("{}", crate::report::format_plan(&plan));
    }
    Ok(())
}

pub fn estimator_options_from_args(args: &EstimatorArgs) -> EstimatorOptions {
    let defaults = EstimatorOptions::default();
    EstimatorOptions {
        ace_rare_threshold: args.ace_threshold,
        jackknife_order: match args.jackknife_order {
            Some(order) => JackknifeOrder::Fixed(order as usize),
            None => defaults.jackknife_order,
        },
        egghe_proot_copies: args.copies,
        minsample_tolerance: args.minsample_tolerance,
        ..defaults
    }
}

pub fn bootstrap_config_from_args(args: &BootstrapArgs, estimator: &EstimatorArgs) -> BootstrapConfig {
    BootstrapConfig {
        n_iter: args.iterations,
        n_jobs: args.jobs,
        confidence_level: args.confidence,
        seed: args.seed,
        cancel: None,
        species: true,
        estimator: estimator_options_from_args(estimator),
    }
}

pub fn diversity_options_from_args(args: &EstimateArgs) -> DiversityOptions {
    DiversityOptions {
        species: !args.population,
        ci: args.ci,
        n_iter: args.bootstrap.iterations,
        n_jobs: args.bootstrap.jobs,
        confidence_level: args.bootstrap.confidence,
        seed: args.bootstrap.seed,
        cancel: None,
        estimator: estimator_options_from_args(&args.estimator),
    }
}

pub fn curve_config_from_args(args: &CurveArgs) -> CurveConfig {
    CurveConfig {
        max_steps: args.max_steps,
        step: args.step,
        method: args.method,
        bootstrap: bootstrap_config_from_args(&args.bootstrap, &args.estimator),
    }
}

pub fn solver_config_from_args(args: &MinsampleArgs) -> SolverConfig {
    let target = match (args.fraction, args.richness, args.tolerance) {
        (Some(g), _, _) => SamplingTarget::Fraction(g),
        (None, Some(x), _) => SamplingTarget::Richness(x),
        (None, None, Some(tolerance)) => SamplingTarget::Complete { tolerance },
        (None, None, None) => SamplingTarget::default(),
    };
    let bootstrap = bootstrap_config_from_args(&args.bootstrap, &args.estimator);
    SolverConfig {
        target,
        method: args.method,
        kind: args.solver,
        upper_search_bound: args.search_bound,
        interval: args.ci.then(|| bootstrap.clone()),
        estimator: bootstrap.estimator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::SolverKind;

    fn parse(argv: &[&str]) -> Command {
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn estimate_args_map_onto_diversity_options() {
        let Command::Estimate(args) = parse(&[
            "unseen", "estimate", "-i", "x", "--population", "--jackknife-order", "2", "--jobs", "4",
        ]) else {
            panic!("expected estimate");
        };
        let opts = diversity_options_from_args(&args);
        assert!(!opts.species);
        assert!(!opts.ci);
        assert_eq!(opts.n_jobs, 4);
        assert_eq!(opts.estimator.jackknife_order, JackknifeOrder::Fixed(2));
    }

    #[test]
    fn minsample_defaults_to_completeness_target() {
        let Command::Minsample(args) = parse(&["unseen", "minsample", "-i", "x"]) else {
            panic!("expected minsample");
        };
        let cfg = solver_config_from_args(&args);
        assert_eq!(cfg.target, SamplingTarget::Complete { tolerance: 0.1 });
        assert_eq!(cfg.kind, SolverKind::ClosedForm);
        assert!(cfg.interval.is_none());
    }

    #[test]
    fn minsample_ci_carries_bootstrap_settings() {
        let Command::Minsample(args) = parse(&[
            "unseen", "minsample", "-i", "x", "--fraction", "0.8", "--ci", "--iterations", "50",
            "--solver", "bisection",
        ]) else {
            panic!("expected minsample");
        };
        let cfg = solver_config_from_args(&args);
        assert_eq!(cfg.target, SamplingTarget::Fraction(0.8));
        assert_eq!(cfg.kind, SolverKind::Bisection);
        assert_eq!(cfg.interval.map(|b| b.n_iter), Some(50));
    }

    #[test]
    fn curve_args_map_onto_curve_config() {
        let Command::Curve(args) = parse(&[
            "unseen", "curve", "-i", "x", "--max-steps", "400", "--step", "25", "--method", "ace",
        ]) else {
            panic!("expected curve");
        };
        let cfg = curve_config_from_args(&args);
        assert_eq!((cfg.max_steps, cfg.step), (400, 25));
        assert_eq!(cfg.method, crate::domain::Method::Ace);
        assert_eq!(cfg.bootstrap.n_iter, 1000);
    }
}
