//! Reporting utilities: batch aggregation and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{Decision, RiskLevel, ScoredRow};

/// Aggregate view of a scored batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub rows: usize,
    pub scored: usize,
    pub failed: usize,
    pub approved: usize,
    pub rejected: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    /// `None` when no row scored.
    pub mean_score: Option<f64>,
    pub mean_probability: Option<f64>,
}

/// Count outcomes and average the successful scores.
pub fn summarize_batch(rows: &[ScoredRow]) -> BatchSummary {
    let mut summary = BatchSummary {
        rows: rows.len(),
        ..BatchSummary::default()
    };
    let mut score_sum = 0.0;
    let mut probability_sum = 0.0;

    for row in rows {
        let Ok(result) = &row.outcome else {
            summary.failed += 1;
            continue;
        };
        summary.scored += 1;
        score_sum += result.credit_score;
        probability_sum += result.risk_probability;
        match result.decision {
            Decision::Approved => summary.approved += 1,
            Decision::Rejected => summary.rejected += 1,
            Decision::Pending => {}
        }
        match result.risk_level {
            RiskLevel::Low => summary.low += 1,
            RiskLevel::Medium => summary.medium += 1,
            RiskLevel::High => summary.high += 1,
        }
    }

    if summary.scored > 0 {
        summary.mean_score = Some(score_sum / summary.scored as f64);
        summary.mean_probability = Some(probability_sum / summary.scored as f64);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PolicyConfig;
    use crate::error::RiskError;

    #[test]
    fn counts_levels_decisions_and_failures() {
        let policy = PolicyConfig::default();
        let rows = vec![
            ScoredRow { line: 2, id: None, outcome: Ok(policy.decide("demo", 0.4, 0.1, vec![])) },
            ScoredRow { line: 3, id: None, outcome: Ok(policy.decide("demo", 0.4, 0.5, vec![])) },
            ScoredRow { line: 4, id: None, outcome: Ok(policy.decide("demo", 0.4, 0.9, vec![])) },
            ScoredRow {
                line: 5,
                id: None,
                outcome: Err(RiskError::feature("monthly_income", "required field is missing")),
            },
        ];
        let summary = summarize_batch(&rows);

        assert_eq!(summary.rows, 4);
        assert_eq!(summary.scored, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!((summary.approved, summary.rejected), (1, 2));
        assert_eq!((summary.low, summary.medium, summary.high), (1, 1, 1));
        assert!((summary.mean_probability.unwrap() - 0.5).abs() < 1e-12);
        assert!((summary.mean_score.unwrap() - 575.0).abs() < 1e-9);
    }

    #[test]
    fn empty_batch_has_no_means() {
        let summary = summarize_batch(&[]);
        assert_eq!(summary.rows, 0);
        assert!(summary.mean_score.is_none());
    }
}
