//! Tabular parsing of uploaded submission files
//!
//! CSV and Excel workbooks are read completely, converted to ordered row
//! records keyed by header name, then truncated to the display limit.

use crate::contract::{ParsedTable, ReportingError};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::io::Cursor;

/// Cell texts read as missing values
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Layout of a stored file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Spreadsheet,
}

impl TableFormat {
    pub fn from_filename(filename: &str) -> Result<Self, ReportingError> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            Ok(Self::Csv)
        } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            Ok(Self::Spreadsheet)
        } else {
            Err(ReportingError::UnsupportedFormat {
                extension: lower
                    .rsplit_once('.')
                    .map(|(_, ext)| format!(".{}", ext))
                    .unwrap_or_else(|| "(none)".to_string()),
            })
        }
    }
}

/// Parse file content into at most `display_limit` row records
pub fn parse_table(
    filename: &str,
    content: &[u8],
    display_limit: usize,
) -> Result<ParsedTable, ReportingError> {
    let (columns, rows) = match TableFormat::from_filename(filename)? {
        TableFormat::Csv => read_csv(content)?,
        TableFormat::Spreadsheet => read_spreadsheet(content)?,
    };
    Ok(truncate(columns, rows, display_limit))
}

fn truncate(
    columns: Vec<String>,
    mut rows: Vec<Map<String, Value>>,
    display_limit: usize,
) -> ParsedTable {
    let total_rows = rows.len();
    let truncated = total_rows > display_limit;
    rows.truncate(display_limit);
    ParsedTable {
        columns,
        displayed_rows: rows.len(),
        rows,
        total_rows,
        truncated,
    }
}

fn parse_error(message: impl ToString) -> ReportingError {
    ReportingError::Parse {
        message: message.to_string(),
    }
}

type Rows = (Vec<String>, Vec<Map<String, Value>>);

fn read_csv(content: &[u8]) -> Result<Rows, ReportingError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(parse_error("No columns to parse from file"));
    }
    let columns = unique_columns(headers);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        let mut row = Map::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            let value = record.get(idx).map(text_value).unwrap_or_else(empty);
            row.insert(column.clone(), value);
        }
        rows.push(row);
    }
    Ok((columns, rows))
}

fn read_spreadsheet(content: &[u8]) -> Result<Rows, ReportingError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(content.to_vec())).map_err(parse_error)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| parse_error("Workbook contains no worksheets"))?
        .map_err(parse_error)?;

    let mut sheet_rows = range.rows();
    let header_row = sheet_rows
        .next()
        .ok_or_else(|| parse_error("No columns to parse from file"))?;
    let headers = header_row
        .iter()
        .map(|cell| match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    let columns = unique_columns(headers);

    let mut rows = Vec::new();
    for cells in sheet_rows {
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let mut row = Map::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            let value = cells.get(idx).map(cell_value).unwrap_or_else(empty);
            row.insert(column.clone(), value);
        }
        rows.push(row);
    }
    Ok((columns, rows))
}

/// Blank headers become `Unnamed: <index>`; repeats get `.1`, `.2`, ...
fn unique_columns(headers: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(idx, header)| {
            let base = if header.trim().is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                header
            };
            let mut candidate = base.clone();
            let mut n = 1;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{}.{}", base, n);
                n += 1;
            }
            candidate
        })
        .collect()
}

fn empty() -> Value {
    Value::String(String::new())
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or_else(empty)
}

/// Text cell to JSON: missing markers become "", numbers become numbers
fn text_value(raw: &str) -> Value {
    if NA_VALUES.contains(&raw.trim()) {
        return empty();
    }
    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Number(i.into());
    }
    if trimmed.chars().any(|c| c.is_ascii_digit()) {
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return float_value(f);
            }
        }
    }
    Value::String(raw.to_string())
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => empty(),
        Data::Int(i) => Value::Number((*i).into()),
        Data::Float(f) => float_value(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) => {
            if NA_VALUES.contains(&s.trim()) {
                empty()
            } else {
                Value::String(s.clone())
            }
        }
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Value::String(naive.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => float_value(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
    }
}
