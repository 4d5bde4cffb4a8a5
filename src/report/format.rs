//! Formatted terminal output.
//!
//! Formatting lives in one place so the engine stays free of presentation and output
//! changes stay localized.

use chrono::Utc;

use crate::domain::{PredictionResult, ScoredRow};
use crate::features::{FEATURE_SCHEMA, feature_label};
use crate::finance::{AmortizationRow, NPA_BUCKETS, NpaClass};
use crate::models::TrainedForest;
use crate::report::BatchSummary;

/// Full single-applicant report.
pub fn format_prediction(result: &PredictionResult, top: usize) -> String {
    let mut out = String::new();

    out.push_str("=== crisk - Credit Risk Assessment ===\n");
    out.push_str(&format!(
        "Model: {} | scored {}\n",
        result.model_version,
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "Score: {:.0} | PD: {:.2}% | Risk: {} | Decision: {}\n",
        result.credit_score,
        result.risk_probability * 100.0,
        result.risk_level.display_name(),
        result.decision.display_name(),
    ));
    out.push_str(&format!(
        "Confidence: {:.1}% | Baseline PD: {:.2}%\n",
        result.model_confidence * 100.0,
        result.base_value * 100.0
    ));

    if !result.factors.is_empty() {
        out.push_str("\nKey factors:\n");
        for (name, value) in &result.factors {
            out.push_str(&format!("  {:<24} {:>14.2}\n", feature_label(name), value));
        }
    }

    out.push_str("\nTop drivers:\n");
    out.push_str(&format!("{:<4} {:<28} {:>10}\n", "#", "Feature", "Impact(pp)"));
    for (i, c) in result.contributions.iter().take(top).enumerate() {
        out.push_str(&format!(
            "{:<4} {:<28} {:>+10.3}\n",
            i + 1,
            truncate(feature_label(&c.feature), 28),
            c.impact * 100.0
        ));
    }

    out.push_str(&format!("\n{}\n", result.recommendation_text));
    out
}

/// Batch totals plus the failed rows.
pub fn format_batch_summary(summary: &BatchSummary, rows: &[ScoredRow]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Rows: {} | scored: {} | failed: {}\n",
        summary.rows, summary.scored, summary.failed
    ));
    out.push_str(&format!(
        "Approved: {} | Rejected: {}\n",
        summary.approved, summary.rejected
    ));
    out.push_str(&format!(
        "Risk levels: Low {} | Medium {} | High {}\n",
        summary.low, summary.medium, summary.high
    ));
    if let (Some(score), Some(pd)) = (summary.mean_score, summary.mean_probability) {
        out.push_str(&format!("Mean score: {score:.1} | Mean PD: {:.2}%\n", pd * 100.0));
    }

    let failures: Vec<&ScoredRow> = rows.iter().filter(|r| !r.is_ok()).collect();
    if !failures.is_empty() {
        out.push_str("\nFailed rows:\n");
        for row in failures {
            if let Err(err) = &row.outcome {
                out.push_str(&format!(
                    "  line {:<6} {:<12} {err}\n",
                    row.line,
                    row.id.as_deref().unwrap_or("-")
                ));
            }
        }
    }
    out
}

/// Model metadata and per-tree shape.
pub fn format_model_summary(forest: &TrainedForest) -> String {
    let mut out = String::new();

    out.push_str(&format!("Model: {}\n", forest.version_id()));
    out.push_str(&format!(
        "Trained: {}\n",
        forest
            .trained_at()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string())
    ));
    out.push_str(&format!(
        "Schema: {FEATURE_SCHEMA} ({} features)\n",
        forest.feature_names().len()
    ));
    out.push_str(&format!(
        "Trees: {} | base value: {:.6}\n",
        forest.trees().len(),
        forest.base_value()
    ));

    out.push_str(&format!("\n{:<6} {:>6} {:>7} {:>10}\n", "Tree", "Depth", "Leaves", "E[f]"));
    for (i, tree) in forest.trees().iter().enumerate() {
        out.push_str(&format!(
            "{:<6} {:>6} {:>7} {:>10.4}\n",
            i,
            tree.depth(),
            tree.leaf_count(),
            tree.expected_value()
        ));
    }
    out
}

/// Single classification, or the whole table when `days` is `None`.
pub fn format_npa(days: Option<u32>) -> String {
    if let Some(days) = days {
        let class = crate::finance::npa_bucket(days);
        return format!(
            "{days} days overdue: {} ({})\n",
            class.display_name(),
            performing_label(class)
        );
    }

    let mut out = String::new();
    out.push_str(&format!("{:<14} {:>12} {:<16}\n", "Class", "Days", "Status"));
    for bucket in NPA_BUCKETS {
        let range = match bucket.until_days {
            Some(until) => format!("{}-{}", bucket.from_days, until - 1),
            None => format!("{}+", bucket.from_days),
        };
        out.push_str(&format!(
            "{:<14} {:>12} {:<16}\n",
            bucket.class.display_name(),
            range,
            performing_label(bucket.class)
        ));
    }
    out
}

fn performing_label(class: NpaClass) -> &'static str {
    if class.is_non_performing() { "non-performing" } else { "performing" }
}

/// Amortization table with a totals line.
pub fn format_schedule(rows: &[AmortizationRow]) -> String {
    let mut out = String::new();
    let Some(first) = rows.first() else {
        return out;
    };

    out.push_str(&format!("EMI: {:.2} over {} months\n\n", first.emi, rows.len()));
    out.push_str(&format!(
        "{:>5} {:>14} {:>14} {:>14} {:>16}\n",
        "Month", "EMI", "Principal", "Interest", "Balance"
    ));
    for row in rows {
        out.push_str(&format!(
            "{:>5} {:>14.2} {:>14.2} {:>14.2} {:>16.2}\n",
            row.month, row.emi, row.principal, row.interest, row.balance
        ));
    }

    let total_interest: f64 = rows.iter().map(|r| r.interest).sum();
    let total_paid: f64 = rows.iter().map(|r| r.principal + r.interest).sum();
    out.push_str(&format!(
        "\nTotal paid: {total_paid:.2} | total interest: {total_interest:.2}\n"
    ));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('~');
    out
}
