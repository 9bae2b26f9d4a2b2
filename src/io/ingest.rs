//! Input ingest and normalization.
//!
//! This module is responsible for turning user input into a validated
//! [`Abundance`] vector. Two shapes are accepted:
//!
//! - **Counts**: integers separated by whitespace, commas or newlines (one per
//!   species). Lines starting with `#` are comments.
//! - **Records**: a CSV with headers where one column labels each observation;
//!   observations are tallied per distinct label.
//!
//! Design goals:
//! - **Strict parsing** for counts (clear errors + exit code 2)
//! - **Row-level validation** for records (skip bad rows, but report what happened)
//! - **Deterministic behavior** (labels are tallied in sorted order)

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::domain::Abundance;
use crate::error::AppError;

/// Where input is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` means stdin; anything else is a path.
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(arg.to_path_buf())
        }
    }

    pub fn describe(&self) -> String {
        match self {
            InputSource::Stdin => "<stdin>".to_string(),
            InputSource::File(path) => path.display().to_string(),
        }
    }

    fn open(&self) -> Result<Box<dyn Read>, AppError> {
        match self {
            InputSource::Stdin => Ok(Box::new(std::io::stdin())),
            InputSource::File(path) => {
                let file = File::open(path).map_err(|e| {
                    AppError::new(2, format!("Failed to open input '{}': {e}", path.display()))
                })?;
                Ok(Box::new(file))
            }
        }
    }
}

/// A record row that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the validated abundance vector plus provenance.
#[derive(Debug, Clone)]
pub struct IngestedSample {
    pub abundance: Abundance,
    pub source: String,
    /// Species labels aligned with `abundance` (records mode only).
    pub labels: Option<Vec<String>>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load an abundance vector from `source`, tallying `column` when given.
pub fn load_abundance(source: &InputSource, column: Option<&str>) -> Result<IngestedSample, AppError> {
    let mut reader = source.open()?;
    let sample = match column {
        None => {
            let mut text = String::new();
            reader.read_to_string(&mut text).map_err(|e| {
                AppError::new(2, format!("Failed to read input '{}': {e}", source.describe()))
            })?;
            let counts = parse_counts(&text)?;
            let rows_read = counts.len();
            IngestedSample {
                abundance: Abundance::new(&counts)?,
                source: source.describe(),
                labels: None,
                row_errors: Vec::new(),
                rows_read,
            }
        }
        Some(column) => {
            let tally = tally_records(reader, column)?;
            let counts: Vec<i64> = tally.counts.values().copied().collect();
            IngestedSample {
                abundance: Abundance::new(&counts)?,
                source: source.describe(),
                labels: Some(tally.counts.into_keys().collect()),
                row_errors: tally.row_errors,
                rows_read: tally.rows_read,
            }
        }
    };

    if !sample.row_errors.is_empty() {
        tracing::warn!(
            skipped = sample.row_errors.len(),
            rows = sample.rows_read,
            "some input rows were skipped"
        );
    }
    tracing::debug!(
        species = sample.abundance.len(),
        observations = sample.abundance.total(),
        source = %sample.source,
        "input loaded"
    );
    Ok(sample)
}

/// Parse whitespace/comma separated integer counts.
pub fn parse_counts(text: &str) -> Result<Vec<i64>, AppError> {
    let mut counts = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        let line = line.trim().trim_start_matches('\u{feff}');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
            if token.is_empty() {
                continue;
            }
            let value = token.parse::<i64>().map_err(|_| {
                AppError::new(
                    2,
                    format!("Line {}: `{token}` is not an integer count.", line_idx + 1),
                )
            })?;
            counts.push(value);
        }
    }
    if counts.is_empty() {
        return Err(AppError::new(2, "Input contains no counts."));
    }
    Ok(counts)
}

/// Per-label observation counts from a records CSV.
#[derive(Debug, Clone)]
pub struct RecordTally {
    pub counts: BTreeMap<String, i64>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Count observations per distinct value of `column`.
pub fn tally_records<R: Read>(reader: R, column: &str) -> Result<RecordTally, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    let wanted = normalize_header_name(column);
    let idx = *header_map
        .get(&wanted)
        .ok_or_else(|| AppError::new(2, format!("Missing label column: `{column}`")))?;

    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (i, result) in reader.records().enumerate() {
        // +2: records() starts after the header line and lines are 1-based.
        let line = i + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match label_of(&record, idx) {
            Some(label) => *counts.entry(label.to_string()).or_insert(0) += 1,
            None => row_errors.push(RowError {
                line,
                message: format!("Missing value for `{column}`."),
            }),
        }
    }

    if counts.is_empty() {
        return Err(AppError::new(
            2,
            format!("No labelled observations found in column `{column}`."),
        ));
    }

    Ok(RecordTally {
        counts,
        row_errors,
        rows_read,
    })
}

fn label_of(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_separators_and_comments() {
        let text = "# site A\n5, 3 3\n1,1,1\n\n1 2\n";
        assert_eq!(parse_counts(text).unwrap(), vec![5, 3, 3, 1, 1, 1, 1, 2]);
    }

    #[test]
    fn rejects_non_integer_tokens() {
        let err = parse_counts("3 2.5 1").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("`2.5`"));
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(parse_counts("# nothing\n\n").unwrap_err().exit_code(), 2);
    }

    #[test]
    fn tallies_labels_case_insensitively_by_header() {
        let csv = "\u{feff}Shelfmark,Work\nA1,Tristan\nA2,Perceval\nA3,Tristan\nA4,\nA5,Tristan\n";
        let tally = tally_records(csv.as_bytes(), "work").unwrap();
        assert_eq!(tally.rows_read, 5);
        assert_eq!(tally.counts.get("Tristan"), Some(&3));
        assert_eq!(tally.counts.get("Perceval"), Some(&1));
        assert_eq!(tally.row_errors.len(), 1);
        assert_eq!(tally.row_errors[0].line, 5);
    }

    #[test]
    fn missing_label_column_is_an_input_error() {
        let err = tally_records("a,b\n1,2\n".as_bytes(), "work").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn non_positive_counts_fail_validation() {
        let counts = parse_counts("3 0 1").unwrap();
        let err = AppError::from(Abundance::new(&counts).unwrap_err());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn dash_means_stdin() {
        assert_eq!(InputSource::from_arg(Path::new("-")), InputSource::Stdin);
        assert_eq!(
            InputSource::from_arg(Path::new("counts.txt")),
            InputSource::File(PathBuf::from("counts.txt"))
        );
    }
}
