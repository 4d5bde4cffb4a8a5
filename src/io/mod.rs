//! Input/output helpers.
//!
//! - model artifact JSON read/write (`artifact`)
//! - applicant JSON/CSV ingest (`ingest`)
//! - batch result and applicant CSV exports (`export`)

pub mod artifact;
pub mod export;
pub mod ingest;

pub use artifact::*;
pub use export::*;
pub use ingest::*;
