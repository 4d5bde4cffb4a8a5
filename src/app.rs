//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - loads and validates the model
//! - scores applicants and prints reports
//! - writes optional exports

use std::path::{Path, PathBuf};

use clap::Parser;
use serde_json::json;
use tracing::info;

use crate::cli::{
    BatchArgs, Command, DemoModelArgs, ModelArgs, NpaArgs, SampleArgs, ScheduleArgs, ScoreArgs,
};
use crate::data::{SampleConfig, generate_applicants, reference_forest};
use crate::error::AppError;
use crate::finance::amortization_schedule;
use crate::io::{read_applicant_json, read_model, write_applicants_csv, write_model, write_results_csv};

pub mod pipeline;

use pipeline::ScoringEngine;

/// Environment variable naming the default model artifact.
pub const MODEL_ENV: &str = "CRISK_MODEL";

/// Drivers shown in the terminal report.
const REPORT_DRIVERS: usize = 10;

/// Entry point for the `crisk` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let cli = crate::cli::Cli::parse();
    crate::logging::init_tracing(&cli.log_level);

    match cli.command {
        Command::Score(args) => handle_score(args),
        Command::Batch(args) => handle_batch(args),
        Command::Inspect(args) => handle_inspect(args),
        Command::Npa(args) => handle_npa(args),
        Command::Schedule(args) => handle_schedule(args),
        Command::DemoModel(args) => handle_demo_model(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_score(args: ScoreArgs) -> Result<(), AppError> {
    let engine = ScoringEngine::load(&model_path(&args.model)?, args.policy.to_policy())?;

    let record = match &args.input {
        Some(path) => read_applicant_json(path)?,
        None => args.applicant.to_record(),
    };
    let result = engine.score_record(&record)?;

    if args.json {
        println!("{}", to_json(&result)?);
    } else {
        println!("{}", crate::report::format_prediction(&result, REPORT_DRIVERS));
    }
    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let engine = ScoringEngine::load(&model_path(&args.model)?, args.policy.to_policy())?;

    let rows = crate::io::load_applicants(&args.input)?;
    let scored = engine.score_batch(&rows);

    if args.json {
        let items: Vec<serde_json::Value> = scored
            .iter()
            .map(|row| match &row.outcome {
                Ok(result) => json!({ "line": row.line, "id": row.id, "result": result }),
                Err(err) => json!({ "line": row.line, "id": row.id, "error": err.to_string() }),
            })
            .collect();
        println!("{}", to_json(&items)?);
    } else {
        let summary = crate::report::summarize_batch(&scored);
        println!("{}", crate::report::format_batch_summary(&summary, &scored));
    }

    if let Some(path) = &args.export {
        write_results_csv(path, &scored)?;
        info!(path = %path.display(), "results exported");
    }
    Ok(())
}

fn handle_inspect(args: ModelArgs) -> Result<(), AppError> {
    let forest = read_model(&model_path(&args)?)?;
    println!("{}", crate::report::format_model_summary(&forest));
    Ok(())
}

fn handle_npa(args: NpaArgs) -> Result<(), AppError> {
    print!("{}", crate::report::format_npa(args.days));
    Ok(())
}

fn handle_schedule(args: ScheduleArgs) -> Result<(), AppError> {
    let rows = amortization_schedule(args.principal, args.rate, args.tenure)?;
    if args.json {
        println!("{}", to_json(&rows)?);
    } else {
        print!("{}", crate::report::format_schedule(&rows));
    }
    Ok(())
}

fn handle_demo_model(args: DemoModelArgs) -> Result<(), AppError> {
    let forest = reference_forest()?.with_trained_at(chrono::Utc::now());
    write_model(&args.out, &forest)?;
    println!("Wrote {} ({} trees) to {}", forest.version_id(), forest.trees().len(), args.out.display());
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        count: args.count,
        seed: args.seed,
    };
    let applicants = generate_applicants(&config)?;
    write_applicants_csv(&args.out, &applicants)?;
    println!("Wrote {} applicants to {}", applicants.len(), args.out.display());
    Ok(())
}

/// `--model`, else `$CRISK_MODEL`.
fn model_path(args: &ModelArgs) -> Result<PathBuf, AppError> {
    resolve_model_path(args.model.as_deref(), std::env::var(MODEL_ENV).ok())
}

fn resolve_model_path(flag: Option<&Path>, env: Option<String>) -> Result<PathBuf, AppError> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    match env.filter(|v| !v.trim().is_empty()) {
        Some(value) => Ok(PathBuf::from(value)),
        None => Err(AppError::new(
            2,
            format!("No model artifact given: pass --model or set {MODEL_ENV}."),
        )),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::new(2, format!("Failed to encode JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_flag_beats_environment() {
        let path = resolve_model_path(Some(Path::new("flag.json")), Some("env.json".into())).unwrap();
        assert_eq!(path, PathBuf::from("flag.json"));

        let path = resolve_model_path(None, Some("env.json".into())).unwrap();
        assert_eq!(path, PathBuf::from("env.json"));
    }

    #[test]
    fn missing_model_is_an_input_error() {
        let err = resolve_model_path(None, Some("  ".into())).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains(MODEL_ENV));
    }
}
