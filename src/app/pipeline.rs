//! Shared scoring pipeline used by every front-end command.
//!
//! One place for the core workflow:
//! raw record -> snapshot -> features -> probability + attributions -> policy decision
//!
//! The CLI can then focus on presentation (printing vs exporting).

use std::path::Path;

use rayon::prelude::*;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::domain::{ApplicantSnapshot, PolicyConfig, PredictionResult, ScoredRow};
use crate::error::{AppError, RiskError};
use crate::features::{build_features, snapshot_from_record};
use crate::io::ApplicantRow;
use crate::io::artifact::read_model;
use crate::models::{TrainedForest, explain, predict_probability};

/// A loaded forest plus the policy it is served under.
///
/// Read-only after construction, so one engine can be shared across threads by reference.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    forest: TrainedForest,
    policy: PolicyConfig,
}

impl ScoringEngine {
    pub fn new(forest: TrainedForest, policy: PolicyConfig) -> Result<Self, RiskError> {
        policy.validate()?;
        Ok(Self { forest, policy })
    }

    /// Load an artifact from disk. Integrity failures abort here, before any request.
    pub fn load(path: &Path, policy: PolicyConfig) -> Result<Self, AppError> {
        let forest = read_model(path)?;
        Ok(Self::new(forest, policy)?)
    }

    /// Score one validated applicant.
    pub fn score(&self, snapshot: &ApplicantSnapshot) -> Result<PredictionResult, RiskError> {
        let vector = build_features(snapshot)?;
        let probability = predict_probability(&self.forest, &vector);
        let contributions = explain(&self.forest, &vector);

        let result = self
            .policy
            .decide(self.forest.version_id(), self.forest.base_value(), probability, contributions)
            .with_factors(vector.key_factors());

        debug!(
            probability,
            score = result.credit_score,
            level = result.risk_level.display_name(),
            "scored applicant"
        );
        Ok(result)
    }

    /// Score a loosely typed record (JSON object or CSV row).
    pub fn score_record(&self, record: &Map<String, Value>) -> Result<PredictionResult, RiskError> {
        let snapshot = snapshot_from_record(record)?;
        self.score(&snapshot)
    }

    /// Score every row in parallel. Output order matches input order; a failing row keeps
    /// its error and the rest of the batch still runs.
    pub fn score_batch(&self, rows: &[ApplicantRow]) -> Vec<ScoredRow> {
        let scored: Vec<ScoredRow> = rows
            .par_iter()
            .map(|row| {
                let outcome = match &row.fields {
                    Ok(fields) => self.score_record(fields),
                    Err(err) => Err(err.clone()),
                };
                if let Err(err) = &outcome {
                    warn!(line = row.line, id = row.id.as_deref().unwrap_or(""), error = %err, "row not scored");
                }
                ScoredRow {
                    line: row.line,
                    id: row.id.clone(),
                    outcome,
                }
            })
            .collect();

        let failed = scored.iter().filter(|r| !r.is_ok()).count();
        info!(rows = scored.len(), failed, "batch scored");
        scored
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::{comfortable_applicant, reference_forest, stretched_applicant};
    use crate::domain::{Decision, RiskLevel};
    use crate::features::FEATURE_COUNT;

    fn engine() -> ScoringEngine {
        ScoringEngine::new(reference_forest().unwrap(), PolicyConfig::default()).unwrap()
    }

    #[test]
    fn stretched_applicant_is_rejected_with_dti_as_main_driver() {
        let result = engine().score(&stretched_applicant()).unwrap();

        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.decision, Decision::Rejected);
        assert!((result.risk_probability - 0.795).abs() < 1e-12);
        assert!((result.credit_score - (850.0 - 0.795 * 550.0)).abs() < 1e-9);
        assert_eq!(result.contributions.len(), FEATURE_COUNT);
        assert_eq!(result.contributions[0].feature, "debt_to_income_ratio");
        assert!(result.contributions[0].impact > 0.0);
        assert_eq!(result.model_version, "demo-2025.1");
        assert!(result.factors.contains_key("debt_to_income_ratio"));
    }

    #[test]
    fn comfortable_applicant_is_approved() {
        let result = engine().score(&comfortable_applicant()).unwrap();
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.decision, Decision::Approved);
        assert!(result.credit_score > 790.0);
    }

    #[test]
    fn contributions_are_additive_and_ranked() {
        let engine = engine();
        for snapshot in [stretched_applicant(), comfortable_applicant()] {
            let result = engine.score(&snapshot).unwrap();
            let sum: f64 = result.contributions.iter().map(|c| c.impact).sum();
            assert!((result.base_value + sum - result.risk_probability).abs() < 1e-6);
            for pair in result.contributions.windows(2) {
                assert!(pair[0].impact.abs() >= pair[1].impact.abs());
            }
        }
    }

    #[test]
    fn invalid_policy_is_rejected_up_front() {
        let policy = PolicyConfig {
            medium_risk_from: 0.7,
            high_risk_from: 0.6,
            ..PolicyConfig::default()
        };
        let err = ScoringEngine::new(reference_forest().unwrap(), policy).unwrap_err();
        assert_eq!(err.field(), Some("high_risk_from"));
    }

    #[test]
    fn record_errors_name_the_field() {
        let record = match json!({ "monthly_income": 50000 }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let err = engine().score_record(&record).unwrap_err();
        assert!(matches!(err, RiskError::FeatureEngineering { .. }));
        assert_eq!(err.field(), Some("existing_emi"));
    }

    #[test]
    fn batch_keeps_order_and_isolates_failures() {
        let good = match serde_json::to_value(stretched_applicant()).unwrap() {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let mut bad = good.clone();
        bad.insert("loan_tenure_months".into(), json!(-12));

        let rows = vec![
            ApplicantRow { line: 1, id: Some("a".into()), fields: Ok(good.clone()) },
            ApplicantRow { line: 2, id: Some("b".into()), fields: Ok(bad) },
            ApplicantRow {
                line: 3,
                id: None,
                fields: Err(RiskError::invalid_input("record", "CSV parse error")),
            },
            ApplicantRow { line: 4, id: Some("d".into()), fields: Ok(good) },
        ];

        let scored = engine().score_batch(&rows);
        let lines: Vec<usize> = scored.iter().map(|r| r.line).collect();
        assert_eq!(lines, [1, 2, 3, 4]);
        assert!(scored[0].is_ok());
        let err = scored[1].outcome.as_ref().unwrap_err();
        assert!(matches!(err, RiskError::InvalidInput { .. }));
        assert_eq!(err.field(), Some("loan_tenure_months"));
        assert!(!scored[2].is_ok());
        assert_eq!(
            scored[0].outcome.as_ref().unwrap().risk_probability.to_bits(),
            scored[3].outcome.as_ref().unwrap().risk_probability.to_bits()
        );
    }
}
