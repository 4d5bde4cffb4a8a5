//! Raw applicant record -> model feature vector.
//!
//! Two steps, both strict:
//!
//! 1. [`snapshot_from_record`] turns a loosely typed key/value record (JSON body, CSV row,
//!    CLI flags) into an [`ApplicantSnapshot`]. Missing or non-numeric required fields fail
//!    with a `FeatureEngineering` error naming the field; nothing is silently defaulted.
//! 2. [`build_features`] derives the affordability metrics, buckets and one-hot slots in
//!    the fixed order of [`FEATURE_NAMES`](super::FEATURE_NAMES).

use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::{ApplicantSnapshot, EmploymentType};
use crate::error::RiskError;
use crate::features::schema::*;
use crate::finance::{dti_ratio, emi, lti_ratio};

/// DTI (%) above which the applicant is flagged.
const FLAG_DTI_PCT: f64 = 50.0;
/// LTI (% of annual income) above which the applicant is flagged (3 years of income).
const FLAG_LTI_PCT: f64 = 300.0;
/// Monthly income below which the applicant is flagged.
const FLAG_MIN_INCOME: f64 = 30_000.0;

/// Upper edges (exclusive) of the small / medium / large loan bands; above is jumbo.
const LOAN_AMOUNT_EDGES: [f64; 3] = [500_000.0, 2_000_000.0, 5_000_000.0];
/// Upper edges (inclusive) of the short / medium tenure bands in months; above is long.
const TENURE_EDGES: [i64; 2] = [24, 60];

/// Engineer the model input for one applicant.
pub fn build_features(snapshot: &ApplicantSnapshot) -> Result<FeatureVector, RiskError> {
    snapshot.validate()?;

    let installment = emi(
        snapshot.loan_amount,
        snapshot.interest_rate,
        snapshot.loan_tenure_months,
    )?;
    let dti = dti_ratio(snapshot.existing_emi + installment, snapshot.monthly_income);
    let lti = lti_ratio(snapshot.loan_amount, snapshot.monthly_income);

    let high_risk = dti > FLAG_DTI_PCT || lti > FLAG_LTI_PCT || snapshot.monthly_income < FLAG_MIN_INCOME;

    let mut slots = [0.0; FEATURE_COUNT];
    slots[IDX_MONTHLY_INCOME] = snapshot.monthly_income;
    slots[IDX_YEARS_OF_EXPERIENCE] = snapshot.years_of_experience;
    slots[IDX_LOAN_AMOUNT] = snapshot.loan_amount;
    slots[IDX_LOAN_TENURE] = snapshot.loan_tenure_months as f64;
    slots[IDX_INTEREST_RATE] = snapshot.interest_rate;
    slots[IDX_ESTIMATED_EMI] = installment;
    slots[IDX_DTI] = dti;
    slots[IDX_LTI] = lti;
    slots[IDX_HIGH_RISK_FLAG] = if high_risk { 1.0 } else { 0.0 };
    slots[IDX_LOAN_AMOUNT_BUCKET] = loan_amount_bucket(snapshot.loan_amount) as f64;
    slots[IDX_TENURE_BUCKET] = tenure_bucket(snapshot.loan_tenure_months) as f64;

    slots[IDX_EMPLOYMENT_START + employment_slot(snapshot.employment_type)] = 1.0;
    slots[IDX_PURPOSE_START + purpose_slot(&snapshot.loan_purpose)] = 1.0;
    slots[IDX_STATE_START + state_slot(snapshot.state.as_deref())] = 1.0;

    FeatureVector::new(slots)
}

/// Ordinal loan-size band: 0 small, 1 medium, 2 large, 3 jumbo.
pub fn loan_amount_bucket(loan_amount: f64) -> usize {
    LOAN_AMOUNT_EDGES
        .iter()
        .position(|&edge| loan_amount < edge)
        .unwrap_or(LOAN_AMOUNT_EDGES.len())
}

/// Ordinal tenure band: 0 short, 1 medium, 2 long.
pub fn tenure_bucket(tenure_months: i64) -> usize {
    TENURE_EDGES
        .iter()
        .position(|&edge| tenure_months <= edge)
        .unwrap_or(TENURE_EDGES.len())
}

fn employment_slot(kind: EmploymentType) -> usize {
    match kind {
        EmploymentType::Salaried => 0,
        EmploymentType::SelfEmployed => 1,
        EmploymentType::Other => 2,
    }
}

fn purpose_slot(purpose: &str) -> usize {
    category_slot(purpose.trim(), &KNOWN_PURPOSES).unwrap_or_else(|| {
        warn!(purpose, "unseen loan purpose, using purpose_Other");
        KNOWN_PURPOSES.len()
    })
}

fn state_slot(state: Option<&str>) -> usize {
    match state.map(str::trim).filter(|s| !s.is_empty()) {
        None => KNOWN_STATES.len(),
        Some(s) => category_slot(s, &KNOWN_STATES).unwrap_or(KNOWN_STATES.len()),
    }
}

fn category_slot(value: &str, known: &[&str]) -> Option<usize> {
    known.iter().position(|k| k.eq_ignore_ascii_case(value))
}

/// Parse a loosely typed record into a snapshot.
///
/// Accepts JSON numbers or numeric strings for numeric fields. `state` may also be given as
/// `geography`. Empty strings count as missing.
pub fn snapshot_from_record(record: &Map<String, Value>) -> Result<ApplicantSnapshot, RiskError> {
    let snapshot = ApplicantSnapshot {
        monthly_income: required_number(record, "monthly_income")?,
        existing_emi: required_number(record, "existing_emi")?,
        years_of_experience: required_number(record, "years_of_experience")?,
        employment_type: EmploymentType::from_label(&required_text(record, "employment_type")?),
        loan_amount: required_number(record, "loan_amount")?,
        loan_tenure_months: required_integer(record, "loan_tenure_months")?,
        interest_rate: required_number(record, "interest_rate")?,
        loan_purpose: required_text(record, "loan_purpose")?,
        state: optional_text(record, "state").or_else(|| optional_text(record, "geography")),
        loan_type: optional_text(record, "loan_type"),
    };
    Ok(snapshot)
}

fn lookup<'a>(record: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    match record.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    }
}

fn required_number(record: &Map<String, Value>, field: &str) -> Result<f64, RiskError> {
    let value = lookup(record, field).ok_or_else(|| RiskError::feature(field, "required field is missing"))?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(RiskError::feature(field, format!("expected a number, got {value}"))),
    }
}

fn required_integer(record: &Map<String, Value>, field: &str) -> Result<i64, RiskError> {
    let v = required_number(record, field)?;
    if v.fract() != 0.0 || v.abs() > i64::MAX as f64 {
        return Err(RiskError::feature(field, format!("expected a whole number of months, got {v}")));
    }
    Ok(v as i64)
}

fn required_text(record: &Map<String, Value>, field: &str) -> Result<String, RiskError> {
    match lookup(record, field) {
        None => Err(RiskError::feature(field, "required field is missing")),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(other) => Err(RiskError::feature(field, format!("expected text, got {other}"))),
    }
}

fn optional_text(record: &Map<String, Value>, field: &str) -> Option<String> {
    match lookup(record, field) {
        Some(Value::String(s)) => Some(s.trim().to_string()),
        _ => None,
    }
}
