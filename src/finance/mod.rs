//! Financial metrics: installments, affordability ratios and NPA classification.
//!
//! Everything here is a pure function of its numeric inputs so it can be shared by the
//! feature engineer, the CLI and the portfolio-analytics consumers.

pub mod emi;
pub mod npa;
pub mod ratios;

pub use emi::*;
pub use npa::*;
pub use ratios::*;
