//! Raw table shape and the fixed column-name mapping.
//!
//! Ingestion produces a [`RawTable`]; normalization resolves its headers
//! against [`COLUMN_MAP`] before reading any row.
use chrono::NaiveDate;
use thiserror::Error;

/// One cell of an ingested table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    /// Display text for a cell; empty cells yield an empty string.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::Number(value) => format_number(*value),
            Cell::Date(date) => date.format("%d/%m/%Y").to_string(),
        }
    }

    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Header row plus data rows, as delivered by ingestion.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Canonical record fields every input table must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Organization,
    InitiativeName,
    Status,
    Program,
    Action,
    StartDate,
    EndDate,
    ResultCode,
    Location,
    Theme,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Organization,
        Field::InitiativeName,
        Field::Status,
        Field::Program,
        Field::Action,
        Field::StartDate,
        Field::EndDate,
        Field::ResultCode,
        Field::Location,
        Field::Theme,
    ];

    /// Canonical identifier; also accepted as a header name.
    pub fn canonical(self) -> &'static str {
        match self {
            Field::Organization => "Orgao",
            Field::InitiativeName => "Iniciativa",
            Field::Status => "Status_Informado",
            Field::Program => "Programa",
            Field::Action => "Acao",
            Field::StartDate => "Inicio_Realizado",
            Field::EndDate => "Termino_Realizado",
            Field::ResultCode => "RGS_GGGE",
            Field::Location => "Localizacao_Geografica",
            Field::Theme => "Objetivo_Estrategico",
        }
    }
}

/// Spreadsheet column name → canonical field.
pub const COLUMN_MAP: &[(&str, Field)] = &[
    ("Órgão", Field::Organization),
    ("Iniciativa", Field::InitiativeName),
    ("Status Informado", Field::Status),
    ("Ação", Field::Action),
    ("Programa", Field::Program),
    ("Início Realizado", Field::StartDate),
    ("Término Realizado", Field::EndDate),
    ("RGS-GGGE", Field::ResultCode),
    ("Localização Geográfica", Field::Location),
    ("Objetivo Estratégico", Field::Theme),
];

/// Source column name expected for a canonical field.
pub fn source_name(field: Field) -> &'static str {
    COLUMN_MAP
        .iter()
        .find(|(_, mapped)| *mapped == field)
        .map(|(name, _)| *name)
        .unwrap_or_else(|| field.canonical())
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Column positions for every canonical field of one table.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    positions: [usize; 10],
}

impl ColumnIndex {
    /// Resolve headers through [`COLUMN_MAP`]; fails listing every missing field.
    pub fn resolve(headers: &[String]) -> Result<Self, SchemaError> {
        let mut positions = [usize::MAX; 10];
        for (idx, header) in headers.iter().enumerate() {
            let Some(field) = field_for_header(header.trim()) else {
                continue;
            };
            let slot = &mut positions[field_slot(field)];
            // first matching column wins
            if *slot == usize::MAX {
                *slot = idx;
            }
        }

        let missing: Vec<String> = Field::ALL
            .iter()
            .filter(|field| positions[field_slot(**field)] == usize::MAX)
            .map(|field| source_name(*field).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing));
        }
        Ok(Self { positions })
    }

    /// Cell for `field` in `row`; short rows read as empty.
    pub fn cell<'a>(&self, row: &'a [Cell], field: Field) -> &'a Cell {
        row.get(self.positions[field_slot(field)])
            .unwrap_or(&Cell::Empty)
    }
}

fn field_for_header(header: &str) -> Option<Field> {
    COLUMN_MAP
        .iter()
        .find(|(name, _)| *name == header)
        .map(|(_, field)| *field)
        .or_else(|| {
            Field::ALL
                .iter()
                .copied()
                .find(|field| field.canonical() == header)
        })
}

fn field_slot(field: Field) -> usize {
    Field::ALL
        .iter()
        .position(|candidate| *candidate == field)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn resolves_spreadsheet_headers() {
        let names: Vec<&str> = COLUMN_MAP.iter().map(|(name, _)| *name).collect();
        let index = ColumnIndex::resolve(&headers(&names)).expect("resolve");
        let row: Vec<Cell> = names
            .iter()
            .map(|name| Cell::Text(name.to_string()))
            .collect();
        assert_eq!(
            index.cell(&row, Field::Theme),
            &Cell::Text("Objetivo Estratégico".to_string())
        );
        assert_eq!(index.cell(&row, Field::Action), &Cell::Text("Ação".to_string()));
    }

    #[test]
    fn accepts_canonical_headers_and_padding() {
        let mut names: Vec<String> = Field::ALL
            .iter()
            .map(|field| field.canonical().to_string())
            .collect();
        names[0] = "  Órgão ".to_string();
        names.push("Extra".to_string());
        assert!(ColumnIndex::resolve(&names).is_ok());
    }

    #[test]
    fn reports_every_missing_column() {
        let err = ColumnIndex::resolve(&headers(&["Órgão", "Iniciativa", "Programa"]))
            .expect_err("missing columns");
        let SchemaError::MissingColumns(missing) = err;
        assert_eq!(missing.len(), 7);
        assert!(missing.contains(&"Objetivo Estratégico".to_string()));
        assert!(missing.contains(&"Status Informado".to_string()));
        assert!(!missing.contains(&"Órgão".to_string()));
    }

    #[test]
    fn short_rows_read_as_empty() {
        let names: Vec<&str> = COLUMN_MAP.iter().map(|(name, _)| *name).collect();
        let index = ColumnIndex::resolve(&headers(&names)).expect("resolve");
        let row = vec![Cell::Text("org".to_string())];
        assert_eq!(index.cell(&row, Field::Theme), &Cell::Empty);
    }

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(Cell::Number(1234.0).to_text(), "1234");
        assert_eq!(Cell::Number(12.5).to_text(), "12.5");
        assert!(Cell::Text("  ".to_string()).is_blank());
    }
}
