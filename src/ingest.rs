//! Table ingestion from workbooks and JSON record files.
//!
//! Both sources land in the same [`RawTable`]; nothing here knows about the
//! report schema beyond turning cells into [`Cell`] values.
use crate::normalize::from_excel_serial;
use crate::schema::{Cell, RawTable};
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported input extension {0:?} (expected .xlsx, .xlsm, .xlsb, .xls, .ods or .json)")]
    UnsupportedFormat(String),
    #[error("read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("open workbook: {0}")]
    Workbook(String),
    #[error("sheet {0:?} not found in workbook")]
    SheetNotFound(String),
    #[error("workbook has no sheets")]
    NoSheets,
    #[error("parse JSON records: {0}")]
    Json(#[from] serde_json::Error),
    #[error("JSON input must be an array of objects")]
    JsonShape,
}

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Read `path` into a table, choosing the reader by file extension.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<RawTable, IngestError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let table = if extension == "json" {
        let text = fs::read_to_string(path).map_err(|source| IngestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        table_from_json(&text)?
    } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        read_workbook(path, sheet)?
    } else {
        return Err(IngestError::UnsupportedFormat(extension));
    };

    tracing::info!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "table loaded"
    );
    Ok(table)
}

fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<RawTable, IngestError> {
    use calamine::{open_workbook_auto, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| IngestError::Workbook(e.to_string()))?;
    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|candidate| candidate.as_str() == name)
            .cloned()
            .ok_or_else(|| IngestError::SheetNotFound(name.to_string()))?,
        None => sheet_names.first().cloned().ok_or(IngestError::NoSheets)?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IngestError::Workbook(format!("sheet {sheet_name}: {e}")))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|header| header.iter().map(|cell| cell_from_data(cell).to_text()).collect())
        .unwrap_or_default();
    let rows = rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    Ok(RawTable { headers, rows })
}

fn cell_from_data(cell: &calamine::Data) -> Cell {
    use calamine::Data;
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::Error(e) => {
            tracing::debug!(error = ?e, "workbook cell error read as empty");
            Cell::Empty
        }
        Data::DateTime(dt) => from_excel_serial(dt.as_f64())
            .map(Cell::Date)
            .unwrap_or(Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso(s)
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn parse_iso(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|datetime| datetime.date())
        })
}

/// Build a table from a JSON array of objects keyed by column name.
///
/// Columns are the union of keys in first-seen order; missing keys read as
/// empty cells.
pub fn table_from_json(text: &str) -> Result<RawTable, IngestError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let items = value.as_array().ok_or(IngestError::JsonShape)?;

    let mut headers: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(items.len());
    for item in items {
        let object = item.as_object().ok_or(IngestError::JsonShape)?;
        for key in object.keys() {
            if !headers.iter().any(|header| header == key) {
                headers.push(key.clone());
            }
        }
        objects.push(object);
    }

    let rows = objects
        .into_iter()
        .map(|object| {
            headers
                .iter()
                .map(|header| object.get(header).map(cell_from_json).unwrap_or(Cell::Empty))
                .collect()
        })
        .collect();
    Ok(RawTable { headers, rows })
}

fn cell_from_json(value: &serde_json::Value) -> Cell {
    use serde_json::Value;
    match value {
        Value::Null => Cell::Empty,
        Value::String(s) => Cell::Text(s.clone()),
        Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
        Value::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::Text(other.to_string()),
    }
}
