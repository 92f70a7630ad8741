use crate::spreadsheet::reference::index_to_reference;
use chrono::DateTime;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::Utc;
use thiserror::Error;

/// Literal display format that marks a numeric cell as a date/time.
pub(crate) const DATETIME_FORMAT: &str = "dd-mm-yyyy hh:mm:ss";

/// Declared kind of a cell as stored in the workbook.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellKind {
    /// Shared or inline string; also used for gaps inside a row
    #[default]
    String,
    /// Stored number with the format code of its style
    Number { format: String },
    /// ISO 8601 date/time value (`t="d"`)
    Date,
    /// Cell carrying a formula; the value is the formula source
    Formula,
    /// Any other stored type, e.g. booleans and error values
    Unknown { tag: String },
}

impl CellKind {
    /// Short type tag used in log output.
    pub fn tag(&self) -> &str {
        match self {
            CellKind::String => "string",
            CellKind::Number { .. } => "numeric",
            CellKind::Date => "date",
            CellKind::Formula => "formula",
            CellKind::Unknown { tag } => tag,
        }
    }
}

/// Failure to read a cell according to its declared kind.
#[derive(Error, Debug, PartialEq)]
pub enum CellError {
    #[error("parse '{0}' to date failed")]
    InvalidDate(String),

    #[error("parse '{value}' with format '{format}' to integer failed")]
    InvalidInteger { value: String, format: String },

    #[error("unknown cell type '{tag}' with value '{value}'")]
    UnknownKind { tag: String, value: String },
}

/// Represents a single cell in a worksheet with position, kind, and raw value.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
    pub kind: CellKind,
    pub value: String,
}

impl Cell {
    /// Creates an empty string cell, used to fill gaps inside a row.
    pub(crate) fn empty(row: usize, col: usize) -> Self {
        Cell {
            row,
            col,
            kind: CellKind::String,
            value: String::new(),
        }
    }

    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Parses an ISO 8601 date cell into a UTC timestamp.
    /// Offsets are converted to UTC, naive values are taken as UTC.
    pub fn to_timestamp(&self) -> Result<DateTime<Utc>, CellError> {
        let value = self.value.trim();
        if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
            return Ok(datetime.with_timezone(&Utc));
        }
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(datetime.and_utc());
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|datetime| datetime.and_utc())
            .ok_or_else(|| CellError::InvalidDate(self.value.to_owned()))
    }

    /// Converts a numeric serial date to a datetime.
    /// Handles the Lotus 1-2-3 leap year bug for the 1900 date system.
    pub fn to_serial_datetime(&self, is_1904: bool) -> Result<NaiveDateTime, CellError> {
        let invalid = || CellError::InvalidDate(self.value.to_owned());
        let serial = self.value.trim().parse::<f64>().map_err(|_| invalid())?;
        if !serial.is_finite() || serial < 0.0 {
            return Err(invalid());
        }
        let days = serial.trunc() as i64;
        let seconds = (serial.fract() * 86_400f64).round() as i64;
        let offset = if is_1904 {
            1_462
        } else if days < 60 {
            1
        } else {
            0
        };
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(invalid)?;
        days.checked_add(offset)
            .and_then(Duration::try_days)
            .zip(Duration::try_seconds(seconds))
            .and_then(|(days, seconds)| epoch.checked_add_signed(days)?.checked_add_signed(seconds))
            .ok_or_else(invalid)
    }

    /// Parses the stored number as a 64-bit signed integer.
    pub fn to_bigint(&self) -> Result<i64, CellError> {
        self.value.trim().parse::<i64>().map_err(|_| CellError::InvalidInteger {
            value: self.value.to_owned(),
            format: match &self.kind {
                CellKind::Number { format } => format.to_owned(),
                _ => String::new(),
            },
        })
    }
}

/// Checks whether a number format code is the literal `dd-mm-yyyy hh:mm:ss` pattern.
/// Escape characters, quotes and sections after the first `;` are ignored.
pub fn is_datetime_format(format: &str) -> bool {
    let section = format.split(';').next().unwrap_or_default();
    let literal: String = section.chars().filter(|c| !matches!(c, '\\' | '"')).collect();
    literal.trim().eq_ignore_ascii_case(DATETIME_FORMAT)
}
