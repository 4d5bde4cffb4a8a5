//! Reference model and synthetic applicants.

pub mod demo;
pub mod sample;

pub use demo::{REFERENCE_VERSION, comfortable_applicant, reference_forest, stretched_applicant};
pub use sample::{SampleConfig, generate_applicants};
