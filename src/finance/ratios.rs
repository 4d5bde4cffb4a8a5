//! Affordability and portfolio ratios (all expressed in percent).

use tracing::debug;

/// Returned instead of dividing by a zero or negative income.
///
/// Downstream scoring reads it as maximal risk: an applicant with no declared income still
/// gets a (conservative) decision instead of a hard failure.
pub const RATIO_SENTINEL: f64 = 999.0;

/// Debt-to-income: total monthly obligations over monthly income.
pub fn dti_ratio(total_emi: f64, monthly_income: f64) -> f64 {
    if monthly_income.is_nan() || monthly_income <= 0.0 {
        debug!(monthly_income, "non-positive income, DTI set to sentinel");
        return RATIO_SENTINEL;
    }
    total_emi / monthly_income * 100.0
}

/// Loan-to-income: requested principal over annual income.
pub fn lti_ratio(loan_amount: f64, monthly_income: f64) -> f64 {
    if monthly_income.is_nan() || monthly_income <= 0.0 {
        debug!(monthly_income, "non-positive income, LTI set to sentinel");
        return RATIO_SENTINEL;
    }
    loan_amount / (monthly_income * 12.0) * 100.0
}

/// Loan-to-value. No collateral means full exposure (100%).
pub fn ltv_ratio(loan_amount: f64, collateral_value: f64) -> f64 {
    if collateral_value == 0.0 {
        return 100.0;
    }
    loan_amount / collateral_value * 100.0
}

/// Share of the outstanding book that is non-performing.
pub fn npa_ratio(npa_amount: f64, total_outstanding: f64) -> f64 {
    if total_outstanding == 0.0 {
        return 0.0;
    }
    npa_amount / total_outstanding * 100.0
}

/// Share of loans (by count) that have defaulted. An empty book has a 0% rate.
pub fn default_rate(defaulted_loans: u64, total_loans: u64) -> f64 {
    if total_loans == 0 {
        return 0.0;
    }
    defaulted_loans as f64 / total_loans as f64 * 100.0
}
