//! The versioned feature layout shared with the trained model.
//!
//! Slot order is part of the model contract: the artifact records the same names in the
//! same order, and loading fails if the two disagree.

use std::collections::BTreeMap;
use std::ops::Index;

use crate::error::RiskError;

/// Identifier of this layout. Bump whenever a slot is added, removed or reordered.
pub const FEATURE_SCHEMA: &str = "credit-features-v1";

pub const FEATURE_COUNT: usize = 28;

/// Feature names in model order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "monthly_income",
    "years_of_experience",
    "loan_amount",
    "loan_tenure_months",
    "interest_rate",
    "estimated_emi",
    "debt_to_income_ratio",
    "loan_to_income_ratio",
    "high_risk_flag",
    "loan_amount_bucket",
    "tenure_bucket",
    "employment_Salaried",
    "employment_Self-Employed",
    "employment_Other",
    "purpose_Business Expansion",
    "purpose_Debt Consolidation",
    "purpose_Education",
    "purpose_Home Purchase",
    "purpose_Home Renovation",
    "purpose_Medical Emergency",
    "purpose_Vehicle Purchase",
    "purpose_Wedding Expenses",
    "purpose_Other",
    "state_Gujarat",
    "state_Maharashtra",
    "state_Punjab",
    "state_Telangana",
    "state_Other",
];

/// Human-readable labels, index-aligned with [`FEATURE_NAMES`].
const FEATURE_LABELS: [&str; FEATURE_COUNT] = [
    "monthly income",
    "years of experience",
    "loan amount",
    "loan tenure",
    "interest rate",
    "monthly installment",
    "debt-to-income ratio",
    "loan-to-income ratio",
    "affordability red flags",
    "loan size band",
    "tenure band",
    "salaried employment",
    "self-employment",
    "other employment",
    "business-expansion purpose",
    "debt-consolidation purpose",
    "education purpose",
    "home-purchase purpose",
    "home-renovation purpose",
    "medical-emergency purpose",
    "vehicle-purchase purpose",
    "wedding-expenses purpose",
    "other loan purpose",
    "Gujarat residence",
    "Maharashtra residence",
    "Punjab residence",
    "Telangana residence",
    "other-state residence",
];

pub const IDX_MONTHLY_INCOME: usize = 0;
pub const IDX_YEARS_OF_EXPERIENCE: usize = 1;
pub const IDX_LOAN_AMOUNT: usize = 2;
pub const IDX_LOAN_TENURE: usize = 3;
pub const IDX_INTEREST_RATE: usize = 4;
pub const IDX_ESTIMATED_EMI: usize = 5;
pub const IDX_DTI: usize = 6;
pub const IDX_LTI: usize = 7;
pub const IDX_HIGH_RISK_FLAG: usize = 8;
pub const IDX_LOAN_AMOUNT_BUCKET: usize = 9;
pub const IDX_TENURE_BUCKET: usize = 10;
pub const IDX_EMPLOYMENT_START: usize = 11;
pub const IDX_PURPOSE_START: usize = 14;
pub const IDX_STATE_START: usize = 23;

/// Loan purposes registered at training time, in slot order. Anything else is "other".
pub const KNOWN_PURPOSES: [&str; 8] = [
    "Business Expansion",
    "Debt Consolidation",
    "Education",
    "Home Purchase",
    "Home Renovation",
    "Medical Emergency",
    "Vehicle Purchase",
    "Wedding Expenses",
];

/// States registered at training time, in slot order.
pub const KNOWN_STATES: [&str; 4] = ["Gujarat", "Maharashtra", "Punjab", "Telangana"];

/// Label for recommendation text; falls back to the raw name for unknown features.
pub fn feature_label(name: &str) -> &str {
    FEATURE_NAMES
        .iter()
        .position(|n| *n == name)
        .map(|idx| FEATURE_LABELS[idx])
        .unwrap_or(name)
}

/// Check an artifact's declared feature names against this layout.
pub fn check_feature_names(names: &[String]) -> Result<(), RiskError> {
    if names.len() != FEATURE_COUNT {
        return Err(RiskError::integrity(format!(
            "model declares {} features, {FEATURE_SCHEMA} has {FEATURE_COUNT}",
            names.len()
        )));
    }
    for (idx, (got, want)) in names.iter().zip(FEATURE_NAMES.iter()).enumerate() {
        if got != want {
            return Err(RiskError::integrity(format!(
                "feature slot {idx} is `{got}` in the model but `{want}` in {FEATURE_SCHEMA}"
            )));
        }
    }
    Ok(())
}

/// A fully engineered, validated model input.
///
/// Fixed length at the type level; every slot is finite by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Result<Self, RiskError> {
        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(RiskError::feature(
                FEATURE_NAMES[idx],
                format!("engineered value is not finite ({})", values[idx]),
            ));
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES.iter().position(|n| *n == name).map(|idx| self.0[idx])
    }

    /// Headline affordability factors surfaced next to each decision.
    pub fn key_factors(&self) -> BTreeMap<String, f64> {
        [IDX_DTI, IDX_LTI, IDX_MONTHLY_INCOME, IDX_ESTIMATED_EMI]
            .into_iter()
            .map(|idx| (FEATURE_NAMES[idx].to_string(), self.0[idx]))
            .collect()
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, idx: usize) -> &f64 {
        &self.0[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_indices_match_names() {
        assert_eq!(FEATURE_NAMES[IDX_DTI], "debt_to_income_ratio");
        assert_eq!(FEATURE_NAMES[IDX_LTI], "loan_to_income_ratio");
        assert_eq!(FEATURE_NAMES[IDX_EMPLOYMENT_START], "employment_Salaried");
        assert_eq!(FEATURE_NAMES[IDX_PURPOSE_START], "purpose_Business Expansion");
        assert_eq!(FEATURE_NAMES[IDX_PURPOSE_START + KNOWN_PURPOSES.len()], "purpose_Other");
        assert_eq!(FEATURE_NAMES[IDX_STATE_START], "state_Gujarat");
        assert_eq!(FEATURE_NAMES[IDX_STATE_START + KNOWN_STATES.len()], "state_Other");
        assert_eq!(IDX_STATE_START + KNOWN_STATES.len() + 1, FEATURE_COUNT);
    }

    #[test]
    fn one_hot_names_follow_registered_categories() {
        for (i, purpose) in KNOWN_PURPOSES.iter().enumerate() {
            assert_eq!(FEATURE_NAMES[IDX_PURPOSE_START + i], format!("purpose_{purpose}"));
        }
        for (i, state) in KNOWN_STATES.iter().enumerate() {
            assert_eq!(FEATURE_NAMES[IDX_STATE_START + i], format!("state_{state}"));
        }
    }

    #[test]
    fn rejects_non_finite_slot_by_name() {
        let mut values = [0.0; FEATURE_COUNT];
        values[IDX_DTI] = f64::INFINITY;
        let err = FeatureVector::new(values).unwrap_err();
        assert_eq!(err.field(), Some("debt_to_income_ratio"));
    }

    #[test]
    fn feature_name_check_reports_first_mismatch() {
        let mut names: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
        assert!(check_feature_names(&names).is_ok());

        names.swap(6, 7);
        let err = check_feature_names(&names).unwrap_err();
        assert!(err.to_string().contains("slot 6"));

        names.pop();
        assert!(check_feature_names(&names).is_err());
    }

    #[test]
    fn labels_fall_back_to_name() {
        assert_eq!(feature_label("debt_to_income_ratio"), "debt-to-income ratio");
        assert_eq!(feature_label("mystery"), "mystery");
    }
}
