//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the estimator/resampling code stays clean and testable
//! - output changes are localized

use crate::domain::{AccumulationCurve, Diversity, EstimateResult, SamplingPlan, Segment, SurvivalRatio};
use crate::report::SummaryReport;

/// Frequency-count table for `unseen summarize`.
pub fn format_summary(summary: &SummaryReport, source: &str) -> String {
    let mut out = String::new();

    out.push_str("=== unseen - abundance summary ===\n");
    out.push_str(&format!("Input: {}\n", truncate(source, 60)));
    out.push_str(&format!(
        "S_obs={} | n={} | f1={} | f2={}\n",
        summary.observed, summary.sample_size, summary.singletons, summary.doubletons
    ));
    out.push_str(&format!("Coverage estimate: {:.4}\n", summary.coverage));

    out.push('\n');
    out.push_str(format!("{:>8} {:>10}\n", "k", "f_k").trim_end());
    out.push('\n');
    out.push_str(format!("{:->8} {:->10}\n", "", "").trim_end());
    out.push('\n');
    for class in &summary.spectrum {
        out.push_str(&format!("{:>8} {:>10}\n", class.k, class.count));
    }

    out
}

/// Point or interval estimate for `unseen estimate`.
pub fn format_diversity(result: &Diversity, label: &str) -> String {
    match result {
        Diversity::Point(value) => format!("{label}: {}\n", fmt_num(*value)),
        Diversity::Interval(r) => format_interval(r, label),
    }
}

/// Estimate report for `unseen estimate`, headed by the input it came from.
pub fn format_estimate(result: &Diversity, label: &str, source: &str) -> String {
    let mut out = format!("Input: {}\n", truncate(source, 60));
    out.push_str(&format_diversity(result, label));
    out
}

fn format_interval(r: &EstimateResult, label: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("{label}: {}\n", fmt_num(r.point_estimate)));
    let basis = match &r.bootstrap {
        Some(replicates) => format!("{} replicates", replicates.len()),
        None => "analytic".to_string(),
    };
    out.push_str(&format!(
        "{:.0}% interval: [{}, {}] ({basis})\n",
        r.confidence_level * 100.0,
        fmt_num(r.lower),
        fmt_num(r.upper),
    ));
    if let Some(median) = r.median() {
        out.push_str(&format!("Replicate median: {}\n", fmt_num(median)));
    }
    out
}

/// Survival ratio for `unseen survival`.
pub fn format_survival(ratio: &SurvivalRatio) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Survival ratio ({}): {:.4}\n",
        ratio.method.display_name(),
        ratio.point
    ));
    out.push_str(&format!(
        "{:.0}% interval: [{:.4}, {:.4}] ({} replicates)\n",
        ratio.confidence_level * 100.0,
        ratio.lower,
        ratio.upper,
        ratio.replicates.len()
    ));
    out
}

/// Curve table for `unseen curve`.
pub fn format_curve(curve: &AccumulationCurve) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Accumulation curve ({}): S_obs={} at n={} | asymptote={}\n",
        curve.method.display_name(),
        curve.observed,
        curve.sample_size,
        fmt_num(curve.asymptote)
    ));
    out.push_str(&format!(
        "Bands: {:.0}% pointwise\n\n",
        curve.confidence_level * 100.0
    ));

    out.push_str(
        format!(
            "{:>10} {:>12} {:>12} {:>12} {:<13}\n",
            "m", "E[S_m]", "lower", "upper", "segment"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:->10} {:->12} {:->12} {:->12} {:-<13}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for p in &curve.points {
        let segment = match p.segment {
            Segment::Interpolated => "interpolated",
            Segment::Extrapolated => "extrapolated",
        };
        out.push_str(&format!(
            "{:>10} {:>12.3} {:>12.3} {:>12.3} {segment}\n",
            p.sample_size, p.expected_richness, p.lower, p.upper
        ));
    }

    out
}

/// Solver answer for `unseen minsample`.
pub fn format_plan(plan: &SamplingPlan) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Target richness ({}): {}\n",
        plan.method.display_name(),
        fmt_num(plan.target_richness)
    ));
    out.push_str(&format!(
        "Additional observations: {} (total {}, solved by {:?})\n",
        plan.additional_samples, plan.total_samples, plan.solved_by
    ));
    if let Some(iv) = &plan.interval {
        out.push_str(&format!(
            "{:.0}% interval on additional: [{:.0}, {:.0}] ({} solvable replicates)\n",
            iv.confidence_level * 100.0,
            iv.lower,
            iv.upper,
            iv.replicates.len()
        ));
    }
    out
}

fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.3}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
