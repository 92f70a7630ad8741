//! # Spreadsheet Reading Module
//!
//! Reads Office Open XML workbooks (`.xlsx`, `.xlsm`) into worksheets of typed
//! cells. Every cell keeps the kind declared by the workbook (string, number
//! with its format code, date, formula or unknown) together with its raw text,
//! leaving interpretation to the normalizer.
use crate::error::SheetSqlError;
use std::ffi::OsStr;
use std::path::Path;
use thiserror::Error;

pub mod cell;
mod excel;
mod reference;
pub mod sheet;
pub mod xlsx;

#[cfg(test)]
pub(crate) mod testing;

pub use cell::{is_datetime_format, Cell, CellError, CellKind};
pub use sheet::Sheet;
pub use xlsx::XlsxSpreadsheet;

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Missing part '{0}' in workbook")]
    FileError(String),

    #[error("Workbook '{0}' contains no worksheets")]
    SpreadsheetEmptyError(String),

    #[error("Worksheet '{0}' not found")]
    SheetNotFoundError(String),

    #[error("Cannot detect file format for '{0}'")]
    UnsupportedFormatError(String),
}

/// A workbook whose worksheets can be read one at a time.
pub trait Spreadsheet {
    /// Returns the file name of this spreadsheet
    fn name(&self) -> String;

    /// Returns worksheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Reads the named worksheet
    fn read_sheet(&mut self, sheet_name: &str) -> Result<Sheet, SheetSqlError>;
}

/// Opens a spreadsheet file, picking the reader from the file extension.
///
/// Supported formats: `.xlsx`, `.xlsm` and their template variants `.xltx`, `.xltm`.
///
/// # Errors
///
/// Returns an error if the extension is not supported or the file cannot be
/// opened and parsed as a workbook.
pub fn open<P>(path: P) -> Result<Box<dyn Spreadsheet>, SheetSqlError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(|extension| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") | Some("xltx") | Some("xltm") => {
            Ok(Box::new(XlsxSpreadsheet::open(&path.to_string_lossy())?))
        }
        _ => Err(SpreadsheetError::UnsupportedFormatError(path.to_string_lossy().to_string()))?,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::testing::WorkbookBuilder;

    #[test]
    fn open_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = WorkbookBuilder::new()
            .sheet("Data", &[r#"<c r="A1"><v>1</v></c>"#])
            .write(dir.path(), "Book.XLSX");

        let spreadsheet = open(&path).unwrap();
        assert_eq!(spreadsheet.sheet_names(), vec!["Data"]);
        assert_eq!(spreadsheet.name(), path.to_string_lossy());
    }

    #[test]
    fn open_rejects_unknown_extension() {
        let error = open("people.csv").err().unwrap();
        assert_eq!(error.to_string(), "Cannot detect file format for 'people.csv'");
    }

    #[test]
    fn open_missing_file() {
        assert!(open("does/not/exist.xlsx").is_err());
    }
}
