//! Row normalization: canonical records, status buckets, day-first dates.
use crate::schema::{Cell, ColumnIndex, Field, RawTable, SchemaError};
use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Canonical status bucket after collapsing raw labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    InExecution,
    Completed,
}

impl Status {
    /// Display value shown on the status line.
    pub fn label(self) -> &'static str {
        match self {
            Status::InExecution => "EM EXECUÇÃO",
            Status::Completed => "CONCLUÍDO",
        }
    }
}

/// Whitelisted raw status labels and the bucket each collapses into.
const STATUS_BUCKETS: &[(&str, &str, Status)] = &[
    ("EM EXECUÇÃO", "IN EXECUTION", Status::InExecution),
    ("CONCLUÍDO", "COMPLETED", Status::Completed),
    ("EM LICITAÇÃO", "IN BIDDING", Status::InExecution),
    ("LICITAÇÃO CONCLUÍDA", "BIDDING CONCLUDED", Status::InExecution),
    ("OBRA EM LICITAÇÃO", "WORKS IN BIDDING", Status::InExecution),
];

/// Map a raw status label to its bucket; `None` when not whitelisted.
pub fn parse_status(raw: &str) -> Option<Status> {
    let key = raw.trim().to_uppercase();
    STATUS_BUCKETS
        .iter()
        .find(|(label, alias, _)| *label == key || *alias == key)
        .map(|(_, _, status)| *status)
}

/// One normalized row.
#[derive(Debug, Clone, PartialEq)]
pub struct InitiativeRecord {
    pub row: usize,
    pub organization: String,
    pub initiative_name: String,
    pub status: Status,
    pub program: String,
    pub action: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub result_code: String,
    pub location: String,
    pub theme: Option<String>,
}

/// Counters describing what normalization kept and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub dropped_status: usize,
    pub unparseable_dates: usize,
}

/// Normalized rows plus counters.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub records: Vec<InitiativeRecord>,
    pub stats: NormalizeStats,
}

/// Resolve the schema and normalize every row of `table`.
///
/// Fails only when a required column is missing; per-row defects degrade
/// (bad dates become absent, non-whitelisted statuses drop the row).
pub fn normalize_table(table: &RawTable) -> Result<Normalized, SchemaError> {
    let columns = ColumnIndex::resolve(&table.headers)?;
    let mut stats = NormalizeStats::default();
    let mut records = Vec::new();

    for (idx, row) in table.rows.iter().enumerate() {
        // header occupies row 1
        let row_number = idx + 2;
        stats.rows_read += 1;

        let raw_status = columns.cell(row, Field::Status).to_text();
        let Some(status) = parse_status(&raw_status) else {
            tracing::debug!(row = row_number, status = %raw_status, "status not whitelisted");
            stats.dropped_status += 1;
            continue;
        };

        let start_date = read_date(columns.cell(row, Field::StartDate), row_number, &mut stats);
        let end_date = read_date(columns.cell(row, Field::EndDate), row_number, &mut stats);
        let theme_cell = columns.cell(row, Field::Theme);
        let theme = (!theme_cell.is_blank()).then(|| theme_cell.to_text());

        records.push(InitiativeRecord {
            row: row_number,
            organization: columns.cell(row, Field::Organization).to_text(),
            initiative_name: columns.cell(row, Field::InitiativeName).to_text(),
            status,
            program: columns.cell(row, Field::Program).to_text(),
            action: columns.cell(row, Field::Action).to_text(),
            start_date,
            end_date,
            result_code: columns.cell(row, Field::ResultCode).to_text(),
            location: columns.cell(row, Field::Location).to_text(),
            theme,
        });
    }

    stats.rows_kept = records.len();
    Ok(Normalized { records, stats })
}

fn read_date(cell: &Cell, row: usize, stats: &mut NormalizeStats) -> Option<NaiveDate> {
    if cell.is_blank() {
        return None;
    }
    let parsed = parse_date(cell);
    if parsed.is_none() {
        tracing::debug!(row, value = %cell.to_text(), "unparseable date");
        stats.unparseable_dates += 1;
    }
    parsed
}

const FOUR_DIGIT_YEAR_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];
const FOUR_DIGIT_YEAR_DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];
const TWO_DIGIT_YEAR_FORMATS: &[&str] = &["%d/%m/%y", "%d-%m-%y", "%d.%m.%y"];
const TWO_DIGIT_YEAR_DATETIME_FORMATS: &[&str] = &["%d/%m/%y %H:%M:%S", "%d/%m/%y %H:%M"];

/// Parse a date cell day-first; `None` when it cannot be read as a date.
pub fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Empty => None,
        Cell::Date(date) => Some(*date),
        Cell::Number(serial) => from_excel_serial(*serial),
        Cell::Text(text) => parse_date_text(text.trim()),
    }
}

/// Width of the trailing year field of a day-first date, e.g. 2 for `03/04/24`.
/// `None` when the text does not lead with a day (ISO dates, free text).
fn day_first_year_width(text: &str) -> Option<usize> {
    let date_part = text.split([' ', 'T']).next()?;
    let mut fields = date_part.split(['/', '-', '.']);
    let day = fields.next()?;
    let year = fields.last()?;
    (day.len() <= 2).then_some(year.len())
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    // chrono's %Y also takes short digit runs, so pick the list by year width
    let (dates, datetimes) = match day_first_year_width(text) {
        Some(2) => (TWO_DIGIT_YEAR_FORMATS, TWO_DIGIT_YEAR_DATETIME_FORMATS),
        Some(4) | None => (FOUR_DIGIT_YEAR_FORMATS, FOUR_DIGIT_YEAR_DATETIME_FORMATS),
        Some(_) => return None,
    };
    dates
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            datetimes
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|datetime| datetime.date())
        })
}

/// Excel day serial (1900 date system) to a calendar date.
///
/// Excel counts a 29 February 1900 that never existed: serials up to 59 count
/// from 1899-12-31, serial 60 has no date, later serials from 1899-12-30.
pub fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let day = serial.floor() as u64;
    let epoch = match day {
        ..=59 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        60 => return None,
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };
    epoch.checked_add_days(Days::new(day))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<&str>>) -> RawTable {
        let headers = [
            "Órgão",
            "Iniciativa",
            "Status Informado",
            "Programa",
            "Ação",
            "Início Realizado",
            "Término Realizado",
            "RGS-GGGE",
            "Localização Geográfica",
            "Objetivo Estratégico",
        ];
        RawTable {
            headers: headers.iter().map(|name| name.to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|value| {
                            if value.is_empty() {
                                Cell::Empty
                            } else {
                                Cell::Text(value.to_string())
                            }
                        })
                        .collect()
                })
                .collect(),
        }
    }

    #[test]
    fn collapses_bidding_statuses_into_execution() {
        assert_eq!(parse_status("OBRA EM LICITAÇÃO"), Some(Status::InExecution));
        assert_eq!(parse_status("LICITAÇÃO CONCLUÍDA"), Some(Status::InExecution));
        assert_eq!(parse_status("EM LICITAÇÃO"), Some(Status::InExecution));
        assert_eq!(parse_status("works in bidding"), Some(Status::InExecution));
        assert_eq!(parse_status(" concluído "), Some(Status::Completed));
        assert_eq!(parse_status("CANCELADO"), None);
        assert_eq!(parse_status(""), None);
    }

    #[test]
    fn drops_rows_outside_whitelist() {
        let normalized = normalize_table(&table(vec![
            vec!["A", "I1", "CONCLUÍDO", "P", "X", "", "", "", "", "T"],
            vec!["A", "I2", "PARALISADO", "P", "X", "", "", "", "", "T"],
            vec!["A", "I3", "OBRA EM LICITAÇÃO", "P", "X", "", "", "", "", "T"],
        ]))
        .expect("normalize");
        assert_eq!(normalized.records.len(), 2);
        assert_eq!(normalized.stats.rows_read, 3);
        assert_eq!(normalized.stats.dropped_status, 1);
        assert_eq!(normalized.records[1].status, Status::InExecution);
        assert_eq!(normalized.records[1].row, 4);
    }

    #[test]
    fn parses_dates_day_first_and_degrades_garbage() {
        let normalized = normalize_table(&table(vec![vec![
            "A",
            "I1",
            "EM EXECUÇÃO",
            "P",
            "X",
            "03/04/2024",
            "soon",
            "",
            "",
            "T",
        ]]))
        .expect("normalize");
        let record = &normalized.records[0];
        assert_eq!(record.start_date, NaiveDate::from_ymd_opt(2024, 4, 3));
        assert_eq!(record.end_date, None);
        assert_eq!(normalized.stats.unparseable_dates, 1);
    }

    #[test]
    fn reads_datetime_text_and_excel_serials() {
        assert_eq!(
            parse_date(&Cell::Text("15/03/2024 00:00:00".to_string())),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(
            parse_date(&Cell::Text("2024-03-15".to_string())),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(
            parse_date(&Cell::Number(45385.0)),
            NaiveDate::from_ymd_opt(2024, 4, 3)
        );
        assert_eq!(parse_date(&Cell::Number(-3.0)), None);
    }

    #[test]
    fn two_digit_years_expand_to_full_years() {
        assert_eq!(
            parse_date(&Cell::Text("03/04/24".to_string())),
            NaiveDate::from_ymd_opt(2024, 4, 3)
        );
        assert_eq!(
            parse_date(&Cell::Text("3/4/24 10:30".to_string())),
            NaiveDate::from_ymd_opt(2024, 4, 3)
        );
        assert_eq!(
            parse_date(&Cell::Text("03.04.99".to_string())),
            NaiveDate::from_ymd_opt(1999, 4, 3)
        );
        assert_eq!(
            parse_date(&Cell::Text("03/04/2024".to_string())),
            NaiveDate::from_ymd_opt(2024, 4, 3)
        );
        assert_eq!(parse_date(&Cell::Text("03/04/024".to_string())), None);
    }

    #[test]
    fn early_excel_serials_skip_the_phantom_leap_day() {
        assert_eq!(
            from_excel_serial(1.0),
            NaiveDate::from_ymd_opt(1900, 1, 1)
        );
        assert_eq!(
            from_excel_serial(59.0),
            NaiveDate::from_ymd_opt(1900, 2, 28)
        );
        assert_eq!(from_excel_serial(60.0), None);
        assert_eq!(
            from_excel_serial(61.0),
            NaiveDate::from_ymd_opt(1900, 3, 1)
        );
    }

    #[test]
    fn blank_theme_becomes_absent() {
        let normalized = normalize_table(&table(vec![vec![
            "A", "I1", "CONCLUÍDO", "P", "X", "", "", "", "", "   ",
        ]]))
        .expect("normalize");
        assert_eq!(normalized.records[0].theme, None);
        assert_eq!(normalized.records[0].location, "");
    }

    #[test]
    fn missing_columns_fail_the_table() {
        let raw = RawTable {
            headers: vec!["Órgão".to_string()],
            rows: Vec::new(),
        };
        assert!(matches!(
            normalize_table(&raw),
            Err(SchemaError::MissingColumns(_))
        ));
    }
}
