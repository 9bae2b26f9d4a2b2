//! Reporting utilities: summary records, terminal tables and JSON output.

use serde::Serialize;

use crate::bootstrap::sample_coverage;
use crate::domain::FrequencyCounts;
use crate::error::AppError;

pub mod format;

pub use format::*;

/// One non-empty frequency class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyClass {
    pub k: usize,
    pub count: u64,
}

/// Printable view of [`FrequencyCounts`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub observed: u64,
    pub sample_size: u64,
    pub singletons: u64,
    pub doubletons: u64,
    pub coverage: f64,
    pub spectrum: Vec<FrequencyClass>,
}

pub fn summary_report(counts: &FrequencyCounts) -> SummaryReport {
    SummaryReport {
        observed: counts.observed(),
        sample_size: counts.sample_size(),
        singletons: counts.singletons(),
        doubletons: counts.doubletons(),
        coverage: sample_coverage(counts),
        spectrum: counts
            .spectrum()
            .map(|(k, count)| FrequencyClass { k, count })
            .collect(),
    }
}

/// Pretty-printed JSON for `--json` output.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::new(4, format!("Failed to serialize JSON output: {e}")))
}
