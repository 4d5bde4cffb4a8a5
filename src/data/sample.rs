//! Seeded synthetic applicant generation.
//!
//! Produces plausible loan applications for smoke-testing the batch path and for demos.
//! Nothing here runs at inference time.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{LogNormal, Normal};

use crate::domain::{ApplicantSnapshot, EmploymentType};
use crate::error::AppError;
use crate::features::{KNOWN_PURPOSES, KNOWN_STATES};

/// Tenures offered by the product catalogue, in months.
const TENURES: [i64; 7] = [12, 24, 36, 48, 60, 120, 240];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
}

pub fn generate_applicants(config: &SampleConfig) -> Result<Vec<ApplicantSnapshot>, AppError> {
    if config.count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    // Median monthly income around 55k with a long right tail.
    let income = LogNormal::new(55_000f64.ln(), 0.6)
        .map_err(|e| AppError::new(4, format!("Income distribution error: {e}")))?;
    let rate_noise = Normal::new(0.0, 1.5)
        .map_err(|e| AppError::new(4, format!("Rate distribution error: {e}")))?;

    let mut out = Vec::with_capacity(config.count);
    for _ in 0..config.count {
        let monthly_income = round_to(income.sample(&mut rng), 100.0);
        let employment_type = match rng.gen_range(0..10) {
            0..=5 => EmploymentType::Salaried,
            6..=8 => EmploymentType::SelfEmployed,
            _ => EmploymentType::Other,
        };

        // Loan size scales with income; multiple of annual income drawn uniformly.
        let income_multiple = rng.gen_range(0.2..4.0);
        let loan_amount = round_to(monthly_income * 12.0 * income_multiple, 10_000.0).max(10_000.0);

        let existing_emi = if rng.gen_bool(0.4) {
            round_to(monthly_income * rng.gen_range(0.05..0.35), 100.0)
        } else {
            0.0
        };

        let premium = match employment_type {
            EmploymentType::Salaried => 0.0,
            EmploymentType::SelfEmployed => 1.5,
            EmploymentType::Other => 2.5,
        };
        let interest_rate = round_to(10.5 + premium + rate_noise.sample(&mut rng), 0.05).clamp(7.0, 24.0);

        let loan_purpose = if rng.gen_bool(0.9) {
            KNOWN_PURPOSES.choose(&mut rng).copied().unwrap_or("Other").to_string()
        } else {
            "Other".to_string()
        };
        let state = if rng.gen_bool(0.8) {
            KNOWN_STATES.choose(&mut rng).map(|s| s.to_string())
        } else {
            Some("Karnataka".to_string())
        };

        out.push(ApplicantSnapshot {
            monthly_income,
            existing_emi,
            years_of_experience: round_to(rng.gen_range(0.0..30.0), 0.5),
            employment_type,
            loan_amount,
            loan_tenure_months: TENURES.choose(&mut rng).copied().unwrap_or(36),
            interest_rate,
            loan_purpose,
            state,
            loan_type: Some("Personal".to_string()),
        });
    }
    Ok(out)
}

fn round_to(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}
