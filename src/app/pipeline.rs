//! Shared "load then estimate" workflow behind every subcommand.
//!
//! Keeping this in one place avoids duplicating the input handling:
//! input source -> ingest/tally -> Abundance -> engine call
//!
//! The handlers in `app` can then focus on presentation (text vs JSON).

use crate::cli::InputArgs;
use crate::domain::{
    AccumulationCurve, BootstrapConfig, CurveConfig, Diversity, DiversityOptions, Method,
    SamplingPlan, SolverConfig, SurvivalRatio,
};
use crate::error::AppError;
use crate::io::{IngestedSample, InputSource, load_abundance};
use crate::report::{SummaryReport, summary_report};

/// Output of `unseen summarize`.
#[derive(Debug, Clone)]
pub struct SummaryRun {
    pub sample: IngestedSample,
    pub summary: SummaryReport,
}

/// Output of `unseen estimate`.
#[derive(Debug, Clone)]
pub struct EstimateRun {
    pub sample: IngestedSample,
    pub result: Diversity,
}

/// Read and validate the abundance data named by `input`.
pub fn load_input(input: &InputArgs) -> Result<IngestedSample, AppError> {
    let source = InputSource::from_arg(&input.input);
    load_abundance(&source, input.column.as_deref())
}

pub fn run_summary(input: &InputArgs) -> Result<SummaryRun, AppError> {
    let sample = load_input(input)?;
    let summary = summary_report(&sample.abundance.summarize());
    Ok(SummaryRun { sample, summary })
}

pub fn run_estimate(input: &InputArgs, method: Method, opts: &DiversityOptions) -> Result<EstimateRun, AppError> {
    let sample = load_input(input)?;
    let result = crate::engine::diversity(&sample.abundance, method, opts)?;
    Ok(EstimateRun { sample, result })
}

pub fn run_survival(input: &InputArgs, method: Method, cfg: &BootstrapConfig) -> Result<SurvivalRatio, AppError> {
    let sample = load_input(input)?;
    Ok(crate::engine::survival_ratio(&sample.abundance, method, cfg)?)
}

pub fn run_curve(input: &InputArgs, cfg: &CurveConfig) -> Result<AccumulationCurve, AppError> {
    let sample = load_input(input)?;
    Ok(crate::engine::species_accumulation(&sample.abundance, cfg)?)
}

pub fn run_minsample(input: &InputArgs, cfg: &SolverConfig) -> Result<SamplingPlan, AppError> {
    let sample = load_input(input)?;
    Ok(crate::engine::min_additional_sample(&sample.abundance, cfg)?)
}
