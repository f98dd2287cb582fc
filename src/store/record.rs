// ==========================================
// Poultry Ledger - Row record and cell parsing
// ==========================================
// Stores hand back rows as header -> cell text, like a spreadsheet
// `get_all_records`. Cell parsing is lenient in the ways spreadsheets are:
// integers may come back as "10.0", dates in DD/MM/YYYY or ISO form.
// ==========================================

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Date format written to every log
pub const SHEET_DATE_FORMAT: &str = "%d/%m/%Y";

/// Older rows were written as ISO dates
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

// ==========================================
// Record
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from headers and cells in column order.
    /// Missing trailing cells read as empty strings.
    pub fn from_row<H, C>(headers: &[H], cells: &[C]) -> Self
    where
        H: AsRef<str>,
        C: AsRef<str>,
    {
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let value = cells.get(i).map(|c| c.as_ref().to_string()).unwrap_or_default();
                (h.as_ref().to_string(), value)
            })
            .collect();
        Self { fields }
    }

    pub fn with(mut self, header: &str, value: impl Into<String>) -> Self {
        self.insert(header, value);
        self
    }

    pub fn insert(&mut self, header: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(h, _)| h == header) {
            Some((_, v)) => *v = value,
            None => self.fields.push((header.to_string(), value)),
        }
    }

    /// Raw cell text (None if the column is absent)
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed cell text; absent columns read as ""
    pub fn text(&self, header: &str) -> &str {
        self.get(header).map(str::trim).unwrap_or("")
    }

    /// Trimmed cell text, None when empty or absent
    pub fn optional_text(&self, header: &str) -> Option<String> {
        let value = self.text(header);
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    pub fn int(&self, header: &str) -> Result<i64, String> {
        parse_int_cell(self.text(header)).map_err(|e| format!("{}: {}", header, e))
    }

    pub fn decimal(&self, header: &str) -> Result<Decimal, String> {
        parse_decimal_cell(self.text(header)).map_err(|e| format!("{}: {}", header, e))
    }

    pub fn date(&self, header: &str) -> Result<NaiveDate, String> {
        parse_date_cell(self.text(header)).map_err(|e| format!("{}: {}", header, e))
    }

    pub fn optional_date(&self, header: &str) -> Result<Option<NaiveDate>, String> {
        match self.text(header) {
            "" => Ok(None),
            raw => parse_date_cell(raw)
                .map(Some)
                .map_err(|e| format!("{}: {}", header, e)),
        }
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(h, _)| h.as_str())
    }

    /// Cells in column order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ==========================================
// Cell parsing
// ==========================================

/// Parse an integer cell; empty reads as 0, "10.0" reads as 10
pub fn parse_int_cell(raw: &str) -> Result<i64, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    let d = Decimal::from_str(raw).map_err(|_| format!("not a number: {:?}", raw))?;
    if d.fract().is_zero() {
        d.to_i64().ok_or_else(|| format!("out of range: {:?}", raw))
    } else {
        Err(format!("not a whole number: {:?}", raw))
    }
}

/// Parse a decimal cell; empty reads as 0
pub fn parse_decimal_cell(raw: &str) -> Result<Decimal, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(raw).map_err(|_| format!("not a number: {:?}", raw))
}

/// Parse a date cell written as DD/MM/YYYY or YYYY-MM-DD
pub fn parse_date_cell(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, SHEET_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT))
        .map_err(|_| format!("not a date: {:?}", raw))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(SHEET_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_row_pads_missing_cells() {
        let record = Record::from_row(
            &["Date", "Mortality_Count", "Batch_ID", "Reason"],
            &["01/02/2024", "3", "B-01"],
        );
        assert_eq!(record.len(), 4);
        assert_eq!(record.get("Reason"), Some(""));
        assert_eq!(record.optional_text("Reason"), None);
    }

    #[test]
    fn test_insert_replaces_existing_cell() {
        let mut record = Record::new().with("Status", "Pre-Arrival");
        record.insert("Status", "Active");
        assert_eq!(record.text("Status"), "Active");
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_int_cell_accepts_spreadsheet_floats() {
        assert_eq!(parse_int_cell("10"), Ok(10));
        assert_eq!(parse_int_cell("10.0"), Ok(10));
        assert_eq!(parse_int_cell(""), Ok(0));
        assert_eq!(parse_int_cell("-4"), Ok(-4));
        assert!(parse_int_cell("10.5").is_err());
        assert!(parse_int_cell("ten").is_err());
    }

    #[test]
    fn test_decimal_cell() {
        assert_eq!(parse_decimal_cell("420.50"), Ok(Decimal::new(42050, 2)));
        assert_eq!(parse_decimal_cell(" "), Ok(Decimal::ZERO));
        assert!(parse_decimal_cell("₹420").is_err());
    }

    #[test]
    fn test_date_cell_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(parse_date_cell("01/02/2024"), Ok(expected));
        assert_eq!(parse_date_cell("2024-02-01"), Ok(expected));
        assert!(parse_date_cell("2024/02/01").is_err());
        assert_eq!(format_date(expected), "01/02/2024");
    }

    #[test]
    fn test_typed_accessor_errors_name_the_column() {
        let record = Record::new().with("Bags", "many");
        let err = record.int("Bags").unwrap_err();
        assert!(err.starts_with("Bags:"));
    }
}
