//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the applicant input (`ApplicantSnapshot`, `EmploymentType`)
//! - policy configuration (`PolicyConfig`)
//! - engine outputs (`PredictionResult`, `Contribution`, `RiskLevel`, `Decision`, `ScoredRow`)

pub mod types;

pub use types::*;
