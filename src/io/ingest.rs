//! Applicant ingest.
//!
//! Turns a JSON record, a JSON array or a CSV file into loosely typed field maps. Typing and
//! validation happen later in `features::snapshot_from_record`, so one malformed row never
//! stops the rest of a batch.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{AppError, RiskError};

/// Columns a batch CSV must carry. Optional: `id`, `state` (or `geography`), `loan_type`.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "monthly_income",
    "existing_emi",
    "years_of_experience",
    "employment_type",
    "loan_amount",
    "loan_tenure_months",
    "interest_rate",
    "loan_purpose",
];

/// One input row, not yet typed.
#[derive(Debug, Clone)]
pub struct ApplicantRow {
    /// 1-based source line for CSV, 1-based position for JSON arrays.
    pub line: usize,
    pub id: Option<String>,
    /// Parse failures are kept here and surface as that row's error.
    pub fields: Result<Map<String, Value>, RiskError>,
}

/// Read a single applicant JSON object.
pub fn read_applicant_json(path: &Path) -> Result<Map<String, Value>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open applicant JSON '{}': {e}", path.display())))?;
    let value: Value = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid applicant JSON '{}': {e}", path.display())))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::new(
            2,
            format!("Applicant JSON '{}' must contain a single object.", path.display()),
        )),
    }
}

/// Load a batch. `.json` files hold an array of objects; anything else is read as CSV.
pub fn load_applicants(path: &Path) -> Result<Vec<ApplicantRow>, AppError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        load_applicants_json(path)
    } else {
        load_applicants_csv(path)
    }
}

fn load_applicants_json(path: &Path) -> Result<Vec<ApplicantRow>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open applicant JSON '{}': {e}", path.display())))?;
    let value: Value = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid applicant JSON '{}': {e}", path.display())))?;
    let Value::Array(items) = value else {
        return Err(AppError::new(
            2,
            format!("Batch JSON '{}' must contain an array of objects.", path.display()),
        ));
    };

    let rows = items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let line = idx + 1;
            match item {
                Value::Object(map) => ApplicantRow {
                    line,
                    id: record_id(&map),
                    fields: Ok(map),
                },
                other => ApplicantRow {
                    line,
                    id: None,
                    fields: Err(RiskError::invalid_input("record", format!("expected an object, got {other}"))),
                },
            }
        })
        .collect::<Vec<_>>();

    debug!(path = %path.display(), rows = rows.len(), "loaded applicant JSON");
    Ok(rows)
}

fn load_applicants_csv(path: &Path) -> Result<Vec<ApplicantRow>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let names = normalized_headers(&headers);
    ensure_required_columns_exist(&names)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let row = match result {
            Ok(record) => {
                let map = record_to_map(&names, &record);
                ApplicantRow {
                    line,
                    id: record_id(&map),
                    fields: Ok(map),
                }
            }
            Err(e) => ApplicantRow {
                line,
                id: None,
                fields: Err(RiskError::invalid_input("record", format!("CSV parse error: {e}"))),
            },
        };
        rows.push(row);
    }

    debug!(path = %path.display(), rows = rows.len(), "loaded applicant CSV");
    Ok(rows)
}

fn normalized_headers(headers: &StringRecord) -> Vec<String> {
    headers.iter().map(normalize_header_name).collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(names: &[String]) -> Result<(), AppError> {
    let present: HashMap<&str, usize> = names.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !present.contains_key(col))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::new(
            2,
            format!("Missing required column(s): {}", missing.join(", ")),
        ))
    }
}

/// Short rows simply lack the trailing fields; extra cells are ignored.
fn record_to_map(names: &[String], record: &StringRecord) -> Map<String, Value> {
    names
        .iter()
        .zip(record.iter())
        .map(|(name, cell)| (name.clone(), Value::String(cell.to_string())))
        .collect()
}

fn record_id(map: &Map<String, Value>) -> Option<String> {
    ["id", "applicant_id"].iter().find_map(|key| match map.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
