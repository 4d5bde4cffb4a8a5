//! CSV exports: batch results and synthetic applicants.
//!
//! Meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use crate::domain::{ApplicantSnapshot, ScoredRow};
use crate::error::AppError;

const RESULT_HEADER: [&str; 12] = [
    "line",
    "id",
    "credit_score",
    "risk_probability",
    "risk_level",
    "status",
    "model_confidence",
    "top_feature",
    "top_impact",
    "model_version",
    "recommendation",
    "error",
];

/// Write one CSV row per input row, in input order. Failed rows leave the score columns
/// empty and fill `error`.
pub fn write_results_csv(path: &Path, rows: &[ScoredRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(RESULT_HEADER)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for row in rows {
        let line = row.line.to_string();
        let id = row.id.clone().unwrap_or_default();
        let record: Vec<String> = match &row.outcome {
            Ok(result) => {
                let (top_feature, top_impact) = result
                    .contributions
                    .first()
                    .map(|c| (c.feature.clone(), format!("{:.6}", c.impact)))
                    .unwrap_or_default();
                vec![
                    line,
                    id,
                    format!("{:.0}", result.credit_score),
                    format!("{:.6}", result.risk_probability),
                    result.risk_level.display_name().to_string(),
                    result.decision.display_name().to_string(),
                    format!("{:.4}", result.model_confidence),
                    top_feature,
                    top_impact,
                    result.model_version.clone(),
                    result.recommendation_text.clone(),
                    String::new(),
                ]
            }
            Err(err) => {
                let mut cells = vec![line, id];
                cells.extend(std::iter::repeat_n(String::new(), RESULT_HEADER.len() - 3));
                cells.push(err.to_string());
                cells
            }
        };
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write applicants with the same column names batch ingest expects.
pub fn write_applicants_csv(path: &Path, applicants: &[ApplicantSnapshot]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create applicant CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    for applicant in applicants {
        writer
            .serialize(applicant)
            .map_err(|e| AppError::new(2, format!("Failed to write applicant CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush applicant CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{comfortable_applicant, stretched_applicant};
    use crate::domain::PolicyConfig;
    use crate::error::RiskError;
    use crate::io::load_applicants;

    #[test]
    fn failed_rows_keep_their_place_and_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let ok = PolicyConfig::default().decide("demo", 0.3, 0.8, vec![]);
        let rows = vec![
            ScoredRow { line: 2, id: Some("A".into()), outcome: Ok(ok) },
            ScoredRow {
                line: 3,
                id: None,
                outcome: Err(RiskError::invalid_input("loan_tenure_months", "must be > 0")),
            },
        ];
        write_results_csv(&path, &rows).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), RESULT_HEADER.len());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][4], "High");
        assert_eq!(&records[0][5], "Rejected");
        assert_eq!(&records[0][11], "");
        assert_eq!(&records[1][0], "3");
        assert_eq!(&records[1][2], "");
        assert!(records[1][11].contains("loan_tenure_months"));
    }

    #[test]
    fn applicant_csv_reads_back_through_ingest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("applicants.csv");
        let applicants = vec![stretched_applicant(), comfortable_applicant()];
        write_applicants_csv(&path, &applicants).unwrap();

        let rows = load_applicants(&path).unwrap();
        assert_eq!(rows.len(), 2);
        let snapshot = crate::features::snapshot_from_record(rows[0].fields.as_ref().unwrap()).unwrap();
        assert_eq!(snapshot, applicants[0]);
    }
}
