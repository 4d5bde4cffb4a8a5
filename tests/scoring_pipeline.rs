//! End-to-end: artifact on disk -> engine -> single and batch scoring -> export.

use std::io::Write;

use credit_risk::app::pipeline::ScoringEngine;
use credit_risk::data::{comfortable_applicant, reference_forest, stretched_applicant};
use credit_risk::domain::{Decision, PolicyConfig, RiskLevel};
use credit_risk::io::{load_applicants, write_model, write_results_csv};
use credit_risk::report::summarize_batch;

fn engine_from_disk(dir: &tempfile::TempDir) -> ScoringEngine {
    let path = dir.path().join("model.json");
    write_model(&path, &reference_forest().unwrap()).unwrap();
    ScoringEngine::load(&path, PolicyConfig::default()).unwrap()
}

#[test]
fn rejection_example_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_from_disk(&dir);

    let result = engine.score(&stretched_applicant()).unwrap();
    assert_eq!(result.risk_level, RiskLevel::High);
    assert_eq!(result.decision, Decision::Rejected);
    assert!((300.0..=850.0).contains(&result.credit_score));

    let sum: f64 = result.contributions.iter().map(|c| c.impact).sum();
    assert!((result.base_value + sum - result.risk_probability).abs() < 1e-6);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "Rejected");
    assert_eq!(json["risk_level"], "High");
    assert!(json["contributors"].as_array().unwrap().len() == 28);
    assert!(json["recommendation"].as_str().unwrap().starts_with("High risk"));
}

#[test]
fn low_risk_example_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_from_disk(&dir);

    let result = engine.score(&comfortable_applicant()).unwrap();
    assert_eq!(result.risk_level, RiskLevel::Low);
    assert_eq!(result.decision, Decision::Approved);
}

#[test]
fn batch_csv_records_row_errors_and_keeps_going() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_from_disk(&dir);

    let input = dir.path().join("applicants.csv");
    let mut file = std::fs::File::create(&input).unwrap();
    writeln!(
        file,
        "id,monthly_income,existing_emi,years_of_experience,employment_type,loan_amount,loan_tenure_months,interest_rate,loan_purpose,state"
    )
    .unwrap();
    writeln!(file, "ok-1,34209,0,6,Self-Employed,3500000,36,9.5,Home Renovation,Punjab").unwrap();
    writeln!(file, "bad-tenure,50000,0,3,Salaried,400000,-6,11,Education,Gujarat").unwrap();
    writeln!(file, "bad-income,lots,0,3,Salaried,400000,24,11,Education,Gujarat").unwrap();
    writeln!(file, "ok-2,120000,5000,8,Salaried,500000,60,10,Vehicle Purchase,Maharashtra").unwrap();
    drop(file);

    let rows = load_applicants(&input).unwrap();
    let scored = engine.score_batch(&rows);
    let ids: Vec<&str> = scored.iter().map(|r| r.id.as_deref().unwrap()).collect();
    assert_eq!(ids, ["ok-1", "bad-tenure", "bad-income", "ok-2"]);

    let summary = summarize_batch(&scored);
    assert_eq!((summary.scored, summary.failed), (2, 2));
    assert_eq!((summary.approved, summary.rejected), (1, 1));

    let export = dir.path().join("results.csv");
    write_results_csv(&export, &scored).unwrap();
    let mut reader = csv::Reader::from_path(&export).unwrap();
    let error_col = reader.headers().unwrap().iter().position(|h| h == "error").unwrap();
    let errors: Vec<String> = reader
        .records()
        .map(|r| r.unwrap()[error_col].to_string())
        .collect();
    assert!(errors[0].is_empty());
    assert!(errors[1].contains("loan_tenure_months"));
    assert!(errors[2].contains("monthly_income"));
    assert!(errors[3].is_empty());
}
