//! Command-line parsing for the `unseen` richness estimator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! estimation code; `app` turns these args into engine config structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Method, SolverKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "unseen", version, about = "Unseen-species richness estimation from abundance data")]
pub struct Cli {
    /// Log engine decisions (seeds, jackknife order, solver path) to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the frequency-count summary (S_obs, n, f1, f2, ...).
    Summarize(SummarizeArgs),
    /// Estimate total richness (or population size) with one method.
    Estimate(EstimateArgs),
    /// Bootstrap the observed fraction of the estimated total.
    Survival(SurvivalArgs),
    /// Rarefaction/extrapolation curve with bootstrap bands.
    Curve(CurveArgs),
    /// Additional observations needed to reach a richness target.
    Minsample(MinsampleArgs),
}

/// Where the abundance data comes from.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Counts file (integers separated by whitespace/commas), or `-` for stdin.
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Treat input as a CSV of observations and tally this label column.
    #[arg(long, value_name = "NAME")]
    pub column: Option<String>,
}

/// Shared bootstrap options.
#[derive(Debug, Args, Clone)]
pub struct BootstrapArgs {
    /// Number of bootstrap replicates.
    #[arg(long, default_value_t = 1000)]
    pub iterations: usize,

    /// Worker threads (0 = all cores, 1 = run inline).
    #[arg(long, env = "UNSEEN_JOBS", default_value_t = 1)]
    pub jobs: usize,

    /// Confidence level of the reported interval.
    #[arg(long, default_value_t = 0.95)]
    pub confidence: f64,

    /// Seed for reproducible replicates (random when omitted).
    #[arg(long, env = "UNSEEN_SEED")]
    pub seed: Option<u64>,
}

/// Estimator tuning.
#[derive(Debug, Args, Clone)]
pub struct EstimatorArgs {
    /// ACE: species seen at most this many times count as rare.
    #[arg(long, default_value_t = 10)]
    pub ace_threshold: u64,

    /// Jackknife: fixed order (1-5); selected by significance test when omitted.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub jackknife_order: Option<u8>,

    /// Egghe & Proot: assumed original copies per work.
    #[arg(long, default_value_t = 150.0)]
    pub copies: f64,

    /// Minsample estimator: species allowed to stay undiscovered.
    #[arg(long, default_value_t = 0.1)]
    pub minsample_tolerance: f64,
}

#[derive(Debug, Parser, Clone)]
pub struct SummarizeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Estimator to run.
    #[arg(short, long, value_enum, default_value_t = Method::Chao1)]
    pub method: Method,

    /// Report the number of observations for `empirical` instead of species.
    #[arg(long)]
    pub population: bool,

    /// Add a bootstrap interval.
    #[arg(long)]
    pub ci: bool,

    #[command(flatten)]
    pub bootstrap: BootstrapArgs,

    #[command(flatten)]
    pub estimator: EstimatorArgs,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct SurvivalArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(short, long, value_enum, default_value_t = Method::Chao1)]
    pub method: Method,

    #[arg(long)]
    pub population: bool,

    #[command(flatten)]
    pub bootstrap: BootstrapArgs,

    #[command(flatten)]
    pub estimator: EstimatorArgs,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct CurveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Largest sample size on the curve.
    #[arg(long)]
    pub max_steps: u64,

    /// Grid spacing (n and max-steps are always included).
    #[arg(long, default_value_t = 1)]
    pub step: u64,

    /// Estimator supplying the number of unseen species.
    #[arg(short, long, value_enum, default_value_t = Method::Chao1)]
    pub method: Method,

    #[command(flatten)]
    pub bootstrap: BootstrapArgs,

    #[command(flatten)]
    pub estimator: EstimatorArgs,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct MinsampleArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Reach this fraction of the estimated richness (0 < g <= 1).
    #[arg(long, conflicts_with_all = ["richness", "tolerance"])]
    pub fraction: Option<f64>,

    /// Reach this absolute number of species.
    #[arg(long, conflicts_with = "tolerance")]
    pub richness: Option<f64>,

    /// Leave fewer than this many species expected undiscovered (default 0.1).
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Estimator supplying the richness estimate.
    #[arg(short, long, value_enum, default_value_t = Method::Chao1)]
    pub method: Method,

    /// How to invert the extrapolation curve.
    #[arg(long, value_enum, default_value_t = SolverKind::ClosedForm)]
    pub solver: SolverKind,

    /// Upper bound for the bisection search.
    #[arg(long, default_value_t = crate::solver::DEFAULT_UPPER_SEARCH_BOUND)]
    pub search_bound: u64,

    /// Add a bootstrap interval on the answer.
    #[arg(long)]
    pub ci: bool,

    #[command(flatten)]
    pub bootstrap: BootstrapArgs,

    #[command(flatten)]
    pub estimator: EstimatorArgs,

    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_estimate_with_interval() {
        let cli = Cli::try_parse_from([
            "unseen", "estimate", "--input", "counts.txt", "--method", "egghe_proot", "--ci",
            "--iterations", "200", "--seed", "7",
        ])
        .unwrap();
        let Command::Estimate(args) = cli.command else {
            panic!("expected estimate");
        };
        assert_eq!(args.method, Method::EggheProot);
        assert!(args.ci);
        assert_eq!(args.bootstrap.iterations, 200);
        assert_eq!(args.bootstrap.seed, Some(7));
    }

    #[test]
    fn minsample_targets_are_exclusive() {
        let res = Cli::try_parse_from([
            "unseen", "minsample", "-i", "-", "--fraction", "0.9", "--richness", "40",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn unknown_method_is_rejected() {
        let res = Cli::try_parse_from(["unseen", "estimate", "-i", "x", "--method", "chao2"]);
        assert!(res.is_err());
    }

    #[test]
    fn jackknife_order_is_range_checked() {
        let res = Cli::try_parse_from(["unseen", "estimate", "-i", "x", "--jackknife-order", "6"]);
        assert!(res.is_err());
    }
}
