//! Equated monthly installment (EMI) and amortization.
//!
//! The standard reducing-balance formula:
//!
//! ```text
//! EMI = P · r · (1 + r)^n / ((1 + r)^n - 1),   r = annual_rate_pct / 1200
//! ```
//!
//! evaluated as `P · r / (1 - (1 + r)^-n)`, which tends to `P · r` instead of overflowing
//! for very long tenures. For `r = 0` the limit is `P / n`.

use serde::Serialize;

use crate::error::RiskError;

/// Longest tenure `amortization_schedule` will expand into rows (100 years).
pub const MAX_SCHEDULE_MONTHS: i64 = 1200;

/// Monthly installment for a fully amortizing loan.
pub fn emi(principal: f64, annual_rate_pct: f64, tenure_months: i64) -> Result<f64, RiskError> {
    if tenure_months <= 0 {
        return Err(RiskError::invalid_input(
            "loan_tenure_months",
            format!("must be > 0, got {tenure_months}"),
        ));
    }
    if !principal.is_finite() || principal < 0.0 {
        return Err(RiskError::invalid_input(
            "loan_amount",
            format!("must be a finite amount >= 0, got {principal}"),
        ));
    }
    if !annual_rate_pct.is_finite() || annual_rate_pct < 0.0 {
        return Err(RiskError::invalid_input(
            "interest_rate",
            format!("must be a finite rate >= 0, got {annual_rate_pct}"),
        ));
    }

    let n = tenure_months as f64;
    let r = annual_rate_pct / 1200.0;
    if r == 0.0 {
        return Ok(principal / n);
    }

    // 1 - (1 + r)^-n via ln_1p/exp_m1 keeps precision for small monthly rates.
    let paid_down = -(-n * r.ln_1p()).exp_m1();
    Ok(principal * r / paid_down)
}

/// One month of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub emi: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
}

/// Month-by-month split of each installment into interest and principal.
///
/// The last row absorbs accumulated floating-point drift so the closing balance is exactly 0.
pub fn amortization_schedule(
    principal: f64,
    annual_rate_pct: f64,
    tenure_months: i64,
) -> Result<Vec<AmortizationRow>, RiskError> {
    let installment = emi(principal, annual_rate_pct, tenure_months)?;
    let r = annual_rate_pct / 1200.0;

    if tenure_months > MAX_SCHEDULE_MONTHS {
        return Err(RiskError::invalid_input(
            "loan_tenure_months",
            format!("schedule limited to {MAX_SCHEDULE_MONTHS} months, got {tenure_months}"),
        ));
    }
    let months = tenure_months as u32;

    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = principal;
    for month in 1..=months {
        let interest = balance * r;
        let mut principal_part = installment - interest;
        balance -= principal_part;

        if month == months {
            principal_part += balance;
            balance = 0.0;
        }

        rows.push(AmortizationRow {
            month,
            emi: installment,
            principal: principal_part,
            interest,
            balance: balance.max(0.0),
        });
    }

    Ok(rows)
}
