use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::error::{Result, TradebookError};
use crate::models::{Currency, TradeKind, TransactionRecord};

const OUTPUT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Fixed column layout of the brokerage statement. The format is assumed
/// stable; a reordered spreadsheet is not defended against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    AccountNumber = 0,
    ProcessingDate = 1,
    TransactionDate = 2,
    IaCode = 3,
    Type = 4,
    Symbol = 5,
    Quantity = 6,
    Price = 7,
    Currency = 8,
    Total = 9,
    CashBalance = 10,
}

fn cell(row: &[Data], field: Field) -> &Data {
    row.get(field as usize).unwrap_or(&Data::Empty)
}

pub fn string_field(row: &[Data], field: Field) -> String {
    match cell(row, field) {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Numeric coercion with a zero fallback, so a text cell where a number was
/// expected degrades instead of erroring.
pub fn numeric_field(row: &[Data], field: Field) -> f64 {
    match cell(row, field) {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Date cells are formatted DD/MM/YYYY; a string-typed date passes through
/// unchanged.
pub fn date_field(row: &[Data], field: Field) -> String {
    match cell(row, field) {
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()),
        Data::DateTimeIso(s) => iso_to_date(s).unwrap_or_else(|| s.clone()),
        _ => string_field(row, field),
    }
}

fn excel_serial_to_date(serial: f64) -> String {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    let date = base + chrono::Duration::days(serial as i64);
    date.format(OUTPUT_DATE_FORMAT).to_string()
}

fn iso_to_date(raw: &str) -> Option<String> {
    let date = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .or_else(|_| chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()?;
    Some(date.format(OUTPUT_DATE_FORMAT).to_string())
}

/// Build the typed record for a qualifying row.
pub fn extract_record(row: &[Data], kind: TradeKind) -> Result<TransactionRecord> {
    let account_number = string_field(row, Field::AccountNumber);
    let currency = Currency::from_account_number(&account_number)?;
    Ok(TransactionRecord {
        trade_date: date_field(row, Field::TransactionDate),
        kind,
        symbol: string_field(row, Field::Symbol),
        quantity: numeric_field(row, Field::Quantity),
        price: numeric_field(row, Field::Price),
        account_number,
        currency,
    })
}

/// Open the statement workbook and return the first worksheet's cell range.
pub fn open_statement(path: &Path) -> Result<Range<Data>> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(TradebookError::EmptyWorkbook)?;
    Ok(workbook.worksheet_range(&sheet)?)
}
