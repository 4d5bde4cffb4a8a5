//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built from JSON records, CSV rows or CLI flags
//! - passed through the scoring pipeline by reference
//! - emitted as JSON for the routing/dashboard collaborators

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RiskError;

/// Employment category as understood by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentType {
    Salaried,
    #[serde(rename = "Self-Employed")]
    SelfEmployed,
    Other,
}

impl EmploymentType {
    /// Parse a free-form label. Unknown labels degrade to `Other` instead of failing.
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "salaried" => EmploymentType::Salaried,
            "selfemployed" => EmploymentType::SelfEmployed,
            "other" => EmploymentType::Other,
            _ => {
                warn!(label, "unseen employment type, mapped to Other");
                EmploymentType::Other
            }
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            EmploymentType::Salaried => "Salaried",
            EmploymentType::SelfEmployed => "Self-Employed",
            EmploymentType::Other => "Other",
        }
    }
}

/// An applicant's financial snapshot plus the loan being requested.
///
/// Owned by the caller; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantSnapshot {
    pub monthly_income: f64,
    /// Pre-existing monthly obligations (other loans).
    pub existing_emi: f64,
    pub years_of_experience: f64,
    pub employment_type: EmploymentType,
    pub loan_amount: f64,
    pub loan_tenure_months: i64,
    /// Annual rate in percent (9.5 means 9.5%).
    pub interest_rate: f64,
    /// Open set; unseen values land in the `purpose_Other` slot.
    pub loan_purpose: String,
    /// Geography tag (Indian state). `None` is treated as "other".
    pub state: Option<String>,
    /// Product type. Carried through for reporting, not a model input.
    pub loan_type: Option<String>,
}

impl ApplicantSnapshot {
    /// Range checks on raw numeric inputs, applied before feature engineering.
    ///
    /// Zero or negative income is allowed on purpose: it is scored as maximal risk.
    pub fn validate(&self) -> Result<(), RiskError> {
        ensure_finite("monthly_income", self.monthly_income)?;
        ensure_non_negative("existing_emi", self.existing_emi)?;
        ensure_non_negative("years_of_experience", self.years_of_experience)?;
        ensure_non_negative("loan_amount", self.loan_amount)?;
        ensure_non_negative("interest_rate", self.interest_rate)?;
        if self.loan_tenure_months <= 0 {
            return Err(RiskError::invalid_input(
                "loan_tenure_months",
                format!("must be > 0, got {}", self.loan_tenure_months),
            ));
        }
        Ok(())
    }
}

fn ensure_finite(field: &str, value: f64) -> Result<(), RiskError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RiskError::invalid_input(field, format!("must be finite, got {value}")))
    }
}

fn ensure_non_negative(field: &str, value: f64) -> Result<(), RiskError> {
    ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(RiskError::invalid_input(field, format!("must be >= 0, got {value}")));
    }
    Ok(())
}

/// Risk tier derived from the default probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn display_name(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

/// Application verdict.
///
/// The engine only ever produces `Approved` or `Rejected`; `Pending` is assigned by the
/// application workflow for cases queued for manual review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
    Pending,
}

impl Decision {
    pub fn display_name(self) -> &'static str {
        match self {
            Decision::Approved => "Approved",
            Decision::Rejected => "Rejected",
            Decision::Pending => "Pending",
        }
    }
}

/// Signed contribution of one feature to the default probability.
///
/// Positive pushes toward default (higher risk), negative toward repayment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub feature: String,
    pub impact: f64,
}

/// Policy knobs. Thresholds are configuration so the tiers can be recalibrated without
/// touching the scoring code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Probabilities at or above this are at least `Medium`.
    pub medium_risk_from: f64,
    /// Probabilities at or above this are `High`.
    pub high_risk_from: f64,
    /// Probabilities at or above this are `Rejected`.
    pub approval_threshold: f64,
    /// How many drivers the recommendation text names.
    pub top_k: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            medium_risk_from: 0.35,
            high_risk_from: 0.65,
            approval_threshold: 0.5,
            top_k: 3,
        }
    }
}

impl PolicyConfig {
    pub fn validate(&self) -> Result<(), RiskError> {
        let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_unit(self.medium_risk_from) {
            return Err(RiskError::invalid_input("medium_risk_from", "must lie in [0, 1]"));
        }
        if !in_unit(self.high_risk_from) || self.high_risk_from < self.medium_risk_from {
            return Err(RiskError::invalid_input(
                "high_risk_from",
                "must lie in [medium_risk_from, 1]",
            ));
        }
        if !in_unit(self.approval_threshold) || self.approval_threshold == 0.0 {
            return Err(RiskError::invalid_input("approval_threshold", "must lie in (0, 1]"));
        }
        if self.top_k == 0 {
            return Err(RiskError::invalid_input("top_k", "must be >= 1"));
        }
        Ok(())
    }
}

/// Everything the engine returns for one application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub credit_score: f64,
    pub risk_probability: f64,
    pub risk_level: RiskLevel,
    #[serde(rename = "status")]
    pub decision: Decision,
    #[serde(rename = "recommendation")]
    pub recommendation_text: String,
    /// Sorted by descending absolute impact, ties in feature declaration order.
    #[serde(rename = "contributors")]
    pub contributions: Vec<Contribution>,
    /// Raw values of the headline affordability factors.
    pub factors: BTreeMap<String, f64>,
    /// `max(p, 1 - p)`.
    pub model_confidence: f64,
    pub base_value: f64,
    pub model_version: String,
}

impl PredictionResult {
    pub fn with_factors(mut self, factors: BTreeMap<String, f64>) -> Self {
        self.factors = factors;
        self
    }
}

/// Outcome of scoring one batch row. A failed row carries its error instead of a result.
#[derive(Debug, Clone)]
pub struct ScoredRow {
    pub line: usize,
    pub id: Option<String>,
    pub outcome: Result<PredictionResult, RiskError>,
}

impl ScoredRow {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ApplicantSnapshot {
        ApplicantSnapshot {
            monthly_income: 85_000.0,
            existing_emi: 5_000.0,
            years_of_experience: 6.0,
            employment_type: EmploymentType::Salaried,
            loan_amount: 1_000_000.0,
            loan_tenure_months: 60,
            interest_rate: 9.5,
            loan_purpose: "Home Purchase".to_string(),
            state: Some("Gujarat".to_string()),
            loan_type: None,
        }
    }

    #[test]
    fn employment_labels_are_lenient() {
        assert_eq!(EmploymentType::from_label("Self-Employed"), EmploymentType::SelfEmployed);
        assert_eq!(EmploymentType::from_label("self_employed"), EmploymentType::SelfEmployed);
        assert_eq!(EmploymentType::from_label(" SALARIED "), EmploymentType::Salaried);
        assert_eq!(EmploymentType::from_label("Freelancer"), EmploymentType::Other);
    }

    #[test]
    fn validate_names_offending_field() {
        let mut s = snapshot();
        s.loan_tenure_months = -6;
        assert_eq!(s.validate().unwrap_err().field(), Some("loan_tenure_months"));

        let mut s = snapshot();
        s.years_of_experience = -1.0;
        assert_eq!(s.validate().unwrap_err().field(), Some("years_of_experience"));

        let mut s = snapshot();
        s.interest_rate = f64::NAN;
        assert_eq!(s.validate().unwrap_err().field(), Some("interest_rate"));
    }

    #[test]
    fn zero_income_is_valid_input() {
        let mut s = snapshot();
        s.monthly_income = 0.0;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn policy_validation() {
        assert!(PolicyConfig::default().validate().is_ok());

        let bad = PolicyConfig { high_risk_from: 0.2, ..PolicyConfig::default() };
        assert_eq!(bad.validate().unwrap_err().field(), Some("high_risk_from"));

        let bad = PolicyConfig { top_k: 0, ..PolicyConfig::default() };
        assert_eq!(bad.validate().unwrap_err().field(), Some("top_k"));

        let bad = PolicyConfig { approval_threshold: 0.0, ..PolicyConfig::default() };
        assert!(bad.validate().is_err());
    }
}
