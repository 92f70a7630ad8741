//! Turns a worksheet of typed cells into a [`Table`] of strings.
//!
//! Row 0 supplies the column names; every later row is a data row whose cells
//! are rendered according to their declared kind. A cell that cannot be read
//! is logged with its location and replaced by a placeholder, or dropped from
//! the row when `shorten_rows` is set. Nothing here aborts the sheet.

use crate::database::column::ColumnType;
use crate::database::column::Header;
use crate::database::table::Table;
use crate::helpers::string::normalize_key;
use crate::spreadsheet::cell::is_datetime_format;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellError;
use crate::spreadsheet::cell::CellKind;
use crate::spreadsheet::sheet::Sheet;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

/// Output format for numeric cells carrying the date/time display format.
const SERIAL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How unreadable cells are represented in a data row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizeOptions {
    /// Value inserted in place of an unreadable cell
    pub placeholder: String,
    /// Drop unreadable cells instead, shifting later values left
    pub shorten_rows: bool,
}

/// Renders a single cell to its canonical string form.
pub fn normalize_cell(cell: &Cell, is_1904: bool) -> Result<(ColumnType, String), CellError> {
    match &cell.kind {
        CellKind::Date => Ok((ColumnType::Date, cell.to_timestamp()?.to_string())),
        CellKind::Formula | CellKind::String => Ok((ColumnType::String, cell.value.to_owned())),
        CellKind::Number { format } if is_datetime_format(format) => {
            let datetime = cell.to_serial_datetime(is_1904)?;
            Ok((ColumnType::Date, datetime.format(SERIAL_DATETIME_FORMAT).to_string()))
        }
        CellKind::Number { .. } => Ok((ColumnType::Number, cell.to_bigint()?.to_string())),
        CellKind::Unknown { tag } => Err(CellError::UnknownKind {
            tag: tag.to_owned(),
            value: cell.value.to_owned(),
        }),
    }
}

/// Normalizes a worksheet into a template-ready table.
pub fn normalize_sheet(sheet: &Sheet, options: &NormalizeOptions) -> Table {
    let mut headers: Vec<Header> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for (i, row) in sheet.rows().iter().enumerate() {
        if i == 0 {
            headers = row.iter().map(|cell| Header::new(normalize_key(&cell.value))).collect();
            info!(sheet = %sheet.name, "headers of sheet");
            continue;
        }
        if row.is_empty() {
            debug!(sheet = %sheet.name, row = i, "empty row");
        }

        let mut record: Vec<String> = Vec::with_capacity(headers.len());
        for (j, cell) in row.iter().enumerate() {
            let Some(header) = headers.get(j) else {
                warn!(
                    sheet = %sheet.name,
                    row = i,
                    column_index = j,
                    reference = %cell.reference(),
                    value = %cell.value,
                    "cell beyond header columns ignored"
                );
                continue;
            };
            match normalize_cell(cell, sheet.is_1904) {
                Ok((kind, value)) => {
                    trace!(
                        sheet = %sheet.name,
                        row = i,
                        column = %header.name,
                        kind = cell.kind.tag(),
                        column_type = kind.as_str(),
                        "cell normalized"
                    );
                    record.push(value);
                }
                Err(failure) => {
                    log_cell_error(sheet, i, j, header, cell, &failure);
                    if !options.shorten_rows {
                        record.push(options.placeholder.to_owned());
                    }
                }
            }
        }
        if !options.shorten_rows {
            record.resize(headers.len(), String::new());
        }
        rows.push(record);
    }

    if headers.is_empty() {
        warn!(sheet = %sheet.name, "sheet has no header row");
    }
    info!(sheet = %sheet.name, "query is ready");

    let columns: Vec<String> = headers.into_iter().map(|header| header.name).collect();
    info!(columns = ?columns, "columns");
    Table {
        name: normalize_key(&sheet.name),
        columns,
        rows,
    }
}

fn log_cell_error(sheet: &Sheet, row: usize, column_index: usize, header: &Header, cell: &Cell, failure: &CellError) {
    let reference = cell.reference();
    let kind = cell.kind.tag();
    match failure {
        CellError::InvalidDate(_) => error!(
            file = %sheet.file_name,
            sheet = %sheet.name,
            row,
            column_index,
            kind,
            column = %header.name,
            reference = %reference,
            error = %failure,
            "parsing date error"
        ),
        CellError::InvalidInteger { format, .. } => error!(
            file = %sheet.file_name,
            sheet = %sheet.name,
            row,
            column_index,
            format = %format,
            kind,
            column = %header.name,
            reference = %reference,
            error = %failure,
            "parsing integer error"
        ),
        CellError::UnknownKind { value, .. } => error!(
            file = %sheet.file_name,
            sheet = %sheet.name,
            row,
            column_index,
            value = %value,
            kind,
            column = %header.name,
            reference = %reference,
            "unknown cell type"
        ),
    }
}
