//! Hand-built reference forest and applicants.
//!
//! Used by `crisk demo-model`, the synthetic sampler and the test suites. The trees encode
//! the usual underwriting intuitions (high DTI, thin income, large loans are riskier) so
//! that explanations read sensibly.

use crate::domain::{ApplicantSnapshot, EmploymentType};
use crate::error::RiskError;
use crate::features::{
    IDX_DTI, IDX_EMPLOYMENT_START, IDX_HIGH_RISK_FLAG, IDX_INTEREST_RATE, IDX_LOAN_AMOUNT_BUCKET,
    IDX_LTI, IDX_MONTHLY_INCOME, IDX_STATE_START, IDX_TENURE_BUCKET, IDX_YEARS_OF_EXPERIENCE,
};
use crate::models::{Node, TrainedForest, Tree};

pub const REFERENCE_VERSION: &str = "demo-2025.1";

const IDX_SALARIED: usize = IDX_EMPLOYMENT_START;
const IDX_STATE_OTHER: usize = IDX_STATE_START + 4;

fn split(feature: usize, threshold: f64, left: usize, right: usize, cover: f64) -> Node {
    Node::Split {
        split_feature_index: feature,
        threshold,
        left,
        right,
        cover,
    }
}

fn leaf(value: f64, cover: f64) -> Node {
    Node::Leaf {
        leaf_value: value,
        cover,
    }
}

fn reference_trees() -> Vec<Tree> {
    vec![
        // Affordability: DTI then LTI.
        Tree::new(vec![
            split(IDX_DTI, 50.0, 1, 2, 1000.0),
            split(IDX_LTI, 300.0, 3, 4, 700.0),
            split(IDX_DTI, 80.0, 5, 6, 300.0),
            leaf(0.08, 550.0),
            leaf(0.35, 150.0),
            leaf(0.55, 120.0),
            leaf(0.92, 180.0),
        ]),
        // Income and tenure in the workforce.
        Tree::new(vec![
            split(IDX_MONTHLY_INCOME, 30_000.0, 1, 2, 1000.0),
            split(IDX_HIGH_RISK_FLAG, 0.5, 3, 4, 250.0),
            split(IDX_YEARS_OF_EXPERIENCE, 2.0, 5, 6, 750.0),
            leaf(0.30, 60.0),
            leaf(0.85, 190.0),
            leaf(0.40, 150.0),
            split(IDX_DTI, 45.0, 7, 8, 600.0),
            leaf(0.06, 480.0),
            leaf(0.60, 120.0),
        ]),
        // Loan size, employment and term.
        Tree::new(vec![
            split(IDX_LOAN_AMOUNT_BUCKET, 1.5, 1, 2, 1000.0),
            split(IDX_SALARIED, 0.5, 3, 4, 600.0),
            split(IDX_DTI, 60.0, 5, 6, 400.0),
            leaf(0.28, 250.0),
            leaf(0.10, 350.0),
            split(IDX_TENURE_BUCKET, 0.5, 7, 8, 220.0),
            leaf(0.88, 180.0),
            leaf(0.45, 70.0),
            leaf(0.25, 150.0),
        ]),
        // Pricing and geography.
        Tree::new(vec![
            split(IDX_INTEREST_RATE, 12.0, 1, 2, 1000.0),
            split(IDX_DTI, 55.0, 3, 4, 800.0),
            split(IDX_STATE_OTHER, 0.5, 5, 6, 200.0),
            leaf(0.12, 600.0),
            leaf(0.78, 200.0),
            leaf(0.35, 120.0),
            leaf(0.50, 80.0),
        ]),
    ]
}

/// Four-tree reference ensemble over the `credit-features-v1` layout.
pub fn reference_forest() -> Result<TrainedForest, RiskError> {
    TrainedForest::new(REFERENCE_VERSION, reference_trees())
}

/// Thin-income applicant asking for a large short loan: scores High and is rejected.
pub fn stretched_applicant() -> ApplicantSnapshot {
    ApplicantSnapshot {
        monthly_income: 34_209.0,
        existing_emi: 0.0,
        years_of_experience: 6.0,
        employment_type: EmploymentType::SelfEmployed,
        loan_amount: 3_500_000.0,
        loan_tenure_months: 36,
        interest_rate: 9.5,
        loan_purpose: "Home Renovation".to_string(),
        state: Some("Punjab".to_string()),
        loan_type: Some("Personal".to_string()),
    }
}

/// Well-covered salaried applicant: scores Low and is approved.
pub fn comfortable_applicant() -> ApplicantSnapshot {
    ApplicantSnapshot {
        monthly_income: 120_000.0,
        existing_emi: 5_000.0,
        years_of_experience: 8.0,
        employment_type: EmploymentType::Salaried,
        loan_amount: 500_000.0,
        loan_tenure_months: 60,
        interest_rate: 10.0,
        loan_purpose: "Vehicle Purchase".to_string(),
        state: Some("Maharashtra".to_string()),
        loan_type: Some("Auto".to_string()),
    }
}
