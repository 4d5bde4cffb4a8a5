//! Command-line parsing for the `crisk` scoring tool.
//!
//! Keeps **argument parsing** separate from scoring; `app` turns these structs into
//! engine calls.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};

use crate::domain::PolicyConfig;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "crisk", version, about = "Loan default risk scoring with per-feature explanations")]
pub struct Cli {
    /// Log filter when neither RUST_LOG nor CRISK_LOG is set (e.g. info, debug).
    #[arg(long, global = true, default_value = crate::logging::DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score one applicant from a JSON file or from flags.
    Score(ScoreArgs),
    /// Score a CSV (or JSON array) of applicants.
    Batch(BatchArgs),
    /// Print model metadata and tree statistics.
    Inspect(ModelArgs),
    /// Classify days overdue into an NPA bucket, or print the bucket table.
    Npa(NpaArgs),
    /// Print an EMI amortization schedule.
    Schedule(ScheduleArgs),
    /// Write the built-in reference forest as an artifact.
    DemoModel(DemoModelArgs),
    /// Generate synthetic applicants as CSV.
    Sample(SampleArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Model artifact JSON. Defaults to $CRISK_MODEL.
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,
}

/// Decision policy overrides.
#[derive(Debug, Args, Clone)]
pub struct PolicyArgs {
    /// Probabilities at or above this are at least Medium risk.
    #[arg(long, default_value_t = 0.35)]
    pub medium_risk_from: f64,

    /// Probabilities at or above this are High risk.
    #[arg(long, default_value_t = 0.65)]
    pub high_risk_from: f64,

    /// Probabilities at or above this are rejected.
    #[arg(long, default_value_t = 0.5)]
    pub approval_threshold: f64,

    /// Number of drivers named in the recommendation.
    #[arg(long, default_value_t = 3)]
    pub top_k: usize,
}

impl PolicyArgs {
    pub fn to_policy(&self) -> PolicyConfig {
        PolicyConfig {
            medium_risk_from: self.medium_risk_from,
            high_risk_from: self.high_risk_from,
            approval_threshold: self.approval_threshold,
            top_k: self.top_k,
        }
    }
}

/// Applicant fields given directly on the command line.
#[derive(Debug, Args, Clone, Default)]
pub struct ApplicantArgs {
    #[arg(long)]
    pub monthly_income: Option<f64>,

    /// Installments already being paid each month.
    #[arg(long)]
    pub existing_emi: Option<f64>,

    #[arg(long)]
    pub years_of_experience: Option<f64>,

    /// Salaried, Self-Employed or anything else.
    #[arg(long)]
    pub employment_type: Option<String>,

    #[arg(long)]
    pub loan_amount: Option<f64>,

    #[arg(long)]
    pub loan_tenure_months: Option<i64>,

    /// Annual rate in percent.
    #[arg(long)]
    pub interest_rate: Option<f64>,

    #[arg(long)]
    pub loan_purpose: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub loan_type: Option<String>,
}

impl ApplicantArgs {
    /// Record with only the flags that were given. `existing_emi` defaults to 0.
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                record.insert(key.to_string(), value);
            }
        };
        put("monthly_income", self.monthly_income.map(Value::from));
        put("existing_emi", Some(Value::from(self.existing_emi.unwrap_or(0.0))));
        put("years_of_experience", self.years_of_experience.map(Value::from));
        put("employment_type", self.employment_type.clone().map(Value::from));
        put("loan_amount", self.loan_amount.map(Value::from));
        put("loan_tenure_months", self.loan_tenure_months.map(Value::from));
        put("interest_rate", self.interest_rate.map(Value::from));
        put("loan_purpose", self.loan_purpose.clone().map(Value::from));
        put("state", self.state.clone().map(Value::from));
        put("loan_type", self.loan_type.clone().map(Value::from));
        record
    }
}

#[derive(Debug, Args, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Applicant JSON object. Alternative to the per-field flags.
    #[arg(long, value_name = "JSON", conflicts_with_all = [
        "monthly_income", "existing_emi", "years_of_experience", "employment_type",
        "loan_amount", "loan_tenure_months", "interest_rate", "loan_purpose", "state", "loan_type",
    ])]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub applicant: ApplicantArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Print the result as JSON instead of a report.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Applicants CSV (or a JSON array when the extension is .json).
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// Write per-row results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Print per-row results as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct NpaArgs {
    /// Days past due. Omit to print the full bucket table.
    #[arg(long)]
    pub days: Option<u32>,
}

#[derive(Debug, Args, Clone)]
pub struct ScheduleArgs {
    #[arg(long)]
    pub principal: f64,

    /// Annual rate in percent.
    #[arg(long)]
    pub rate: f64,

    /// Tenure in months.
    #[arg(long)]
    pub tenure: i64,

    /// Print the schedule as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct DemoModelArgs {
    /// Where to write the artifact.
    #[arg(long, value_name = "JSON")]
    pub out: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Number of applicants.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub count: usize,

    /// Random seed; the same seed always yields the same file.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}
