//! # sheet_sql
//!
//! Converts spreadsheet data into SQL (or any other text) by rendering one
//! template per worksheet.
//!
//! ## Pipeline
//!
//! - The first row of every worksheet names the columns; names and the sheet
//!   name have spaces replaced by underscores.
//! - Data rows are normalized cell by cell: strings as-is, formulas as their
//!   source text, integers in decimal, ISO dates as `YYYY-MM-DD HH:MM:SS UTC`
//!   and numbers formatted `dd-mm-yyyy hh:mm:ss` as `YYYY-MM-DD HH:MM:SS`.
//! - Cells that cannot be read are logged and replaced by a configurable
//!   placeholder, so rows stay aligned with the columns.
//! - The template receives `Table`, `Columns` and `Rows` and its output is
//!   written to `<Table>.sql`.
//!
//! ## Supported formats
//!
//! Office Open XML workbooks: `.xlsx`, `.xlsm`, `.xltx`, `.xltm`.
pub mod command;
pub mod config;
pub mod database;
pub mod error;
pub mod helpers;
pub mod logging;
pub mod render;
pub mod spreadsheet;
