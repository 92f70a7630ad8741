use crate::error::SheetSqlError;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellKind;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::excel::Package;
use crate::spreadsheet::excel::GENERAL_FORMAT;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::reference::shift_formula;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use tracing::debug;
use zip::read::ZipFile;

// XML tag names for parsing Excel XLSX format
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts"); // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");   // Individual custom number format
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");  // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");         // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr"); // Workbook properties
const TAG_SHEET: QName = QName(b"sheet");             // Worksheet definition
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_FORMULA: QName = QName(b"f");               // Formula source
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content

/// Represents an Excel XLSX workbook
pub struct XlsxSpreadsheet {
    /// File name of the spreadsheet
    pub name: String,
    zip: Package,
    /// Format code per cell style index
    number_formats: Vec<String>,
    /// List of worksheets with (name, zip_path) pairs
    sheets: Vec<(String, String)>,
    is_1904: bool,
    /// Shared string table, loaded on first sheet read
    shared_strings: Option<Vec<String>>,
}

impl XlsxSpreadsheet {
    /// Opens an XLSX workbook and parses its structure
    pub fn open(file_name: &str) -> Result<XlsxSpreadsheet, SheetSqlError> {
        let (zip, number_formats, sheets, is_1904) = excel::open(file_name, load_workbook, load_number_formats)?;
        Ok(XlsxSpreadsheet {
            name: file_name.to_owned(),
            zip,
            number_formats,
            sheets,
            is_1904,
            shared_strings: None,
        })
    }

    /// Loads the shared string table.
    ///
    /// Shared strings are stored in a separate part and referenced by index
    /// to reduce file size when the same string appears multiple times.
    fn load_shared_strings(&mut self) -> Result<Vec<String>, SheetSqlError> {
        let mut shared_strings = Vec::<String>::new();
        let mut reader = match self.zip.xml_reader("xl/sharedStrings.xml")? {
            Some(reader) => reader,
            None => return Ok(shared_strings),
        };

        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
                shared_strings.push(string);
            }
        });
        Ok(shared_strings)
    }
}

impl Spreadsheet for XlsxSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    /// Reads one worksheet into a [`Sheet`] of typed cells.
    ///
    /// Cells without a value and without a formula are skipped; the sheet
    /// layout fills those positions back in as empty strings.
    fn read_sheet(&mut self, sheet_name: &str) -> Result<Sheet, SheetSqlError> {
        let zip_path = self.sheets.iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, path)| path.to_owned())
            .ok_or_else(|| SpreadsheetError::SheetNotFoundError(sheet_name.to_owned()))?;
        if self.shared_strings.is_none() {
            self.shared_strings = Some(self.load_shared_strings()?);
        }
        let shared_strings = self.shared_strings.as_deref().unwrap_or_default();
        let number_formats = &self.number_formats;

        let mut sheet = Sheet::new(&self.name, sheet_name, self.is_1904);
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind_tag = None::<String>;
        let mut style = None::<usize>;
        let mut formula = None::<String>;
        let mut shared_formulas = HashMap::<String, SharedFormula>::new();
        let mut value = String::new();
        let mut reader = self.zip.xml_reader(&zip_path)?
            .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                if let Some(index) = event.parse_attribute_value::<usize>("r")? {
                    row_count = index.saturating_sub(1);
                }
                col_count = 0;
            }
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count, col_count));
                col_count = col + 1;
                kind_tag = event.get_attribute_value("t")?.map(|t| t.to_string());
                style = event.get_attribute_value("s")?
                    .filter(|s| !s.is_empty())
                    .map(|s| s.parse::<usize>())
                    .transpose()?;
                formula = None;
                value.clear();
            }
            Event::Start(event) if event.name() == TAG_FORMULA => {
                let shared_index = match event.get_attribute_value("t")?.as_deref() {
                    Some("shared") => event.get_attribute_value("si")?.map(|si| si.to_string()),
                    _ => None,
                };
                let text = read_string_value(&mut reader, TAG_FORMULA, true)?;
                formula = Some(match shared_index {
                    Some(index) => resolve_shared_formula(&mut shared_formulas, index, text, row, col),
                    None => text,
                });
            }
            Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if event.name() == TAG_CELL => {
                if formula.is_some() || !value.is_empty() {
                    let format = style
                        .and_then(|index| number_formats.get(index))
                        .map(String::as_str)
                        .unwrap_or(GENERAL_FORMAT);
                    let (kind, value) = to_cell_kind(
                        kind_tag.as_deref(),
                        format,
                        formula.take(),
                        std::mem::take(&mut value),
                        shared_strings,
                    );
                    sheet.push(Cell { row, col, kind, value });
                }
            },
        });
        debug!(sheet = sheet_name, cells = sheet.cells.len(), "worksheet read");
        Ok(sheet)
    }
}

/// Formula text of the anchor cell of a shared formula range.
struct SharedFormula {
    text: String,
    row: usize,
    col: usize,
}

/// Returns the formula source of a cell taking part in a shared formula.
///
/// The anchor cell carries the text and registers it under its `si` index;
/// the other cells of the range carry an empty `<f>` and get the anchor's
/// formula with relative references moved by their distance to the anchor.
fn resolve_shared_formula(
    shared_formulas: &mut HashMap<String, SharedFormula>,
    index: String,
    text: String,
    row: usize,
    col: usize,
) -> String {
    if !text.is_empty() {
        shared_formulas.insert(index, SharedFormula { text: text.clone(), row, col });
        return text;
    }
    match shared_formulas.get(&index) {
        Some(anchor) => shift_formula(
            &anchor.text,
            row as isize - anchor.row as isize,
            col as isize - anchor.col as isize,
        ),
        None => text,
    }
}

/// Classifies a stored cell and resolves its raw value.
fn to_cell_kind(
    kind_tag: Option<&str>,
    format: &str,
    formula: Option<String>,
    value: String,
    shared_strings: &[String],
) -> (CellKind, String) {
    if let Some(formula) = formula {
        return (CellKind::Formula, formula);
    }
    match kind_tag {
        Some("s") => match value.trim().parse::<usize>().ok().and_then(|index| shared_strings.get(index)) {
            Some(string) => (CellKind::String, string.to_owned()),
            None => (CellKind::Unknown { tag: "shared string".to_owned() }, value),
        },
        Some("inlineStr") | Some("str") => (CellKind::String, value),
        Some("d") => (CellKind::Date, value),
        Some("n") | None => (CellKind::Number { format: format.to_owned() }, value),
        Some("b") => (CellKind::Unknown { tag: "boolean".to_owned() }, value),
        Some("e") => (CellKind::Unknown { tag: "error".to_owned() }, value),
        Some(other) => (CellKind::Unknown { tag: other.to_owned() }, value),
    }
}

/// Loads worksheet names and paths from the workbook part
///
/// # Returns
/// Tuple of (worksheets, is_1904_date_system) where worksheets are (name, zip_path) pairs
fn load_workbook(zip: &mut Package) -> Result<(Vec<(String, String)>, bool), SheetSqlError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&id.to_string()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value.eq("1") || value.eq("true"))
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Loads the number format code of every cell style from styles.xml
fn load_number_formats(zip: &mut Package) -> Result<Vec<String>, SheetSqlError> {
    let mut reader = match zip.xml_reader("xl/styles.xml")? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut has_custom_formats = false;
    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, String>::new();

    let mut has_format_indexes = false;
    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if !custom_formats_context && event.name() == TAG_CUSTOM_FORMATS => {
            has_custom_formats = true;
            custom_formats_context = true;
        }
        Event::End(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMATS => {
            custom_formats_context = false;
            if has_custom_formats && has_format_indexes {
                break;
            }
        }
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                custom_formats.insert(id.to_string(), format.to_string());
            }
        }

        Event::Start(event) if !format_indexes_context && event.name() == TAG_FORMAT_INDEXES => {
            has_format_indexes = true;
            format_indexes_context = true;
        }
        Event::End(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEXES => {
            format_indexes_context = false;
            if has_custom_formats && has_format_indexes {
                break;
            }
        }
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            let id = event.get_attribute_value("numFmtId")?
                .map(|id| id.to_string())
                .unwrap_or_else(|| "0".to_owned());
            format_indexes.push(id);
        }
    });

    Ok(excel::load_number_formats(format_indexes, custom_formats))
}

/// Reads string value from XML content, handling text and CDATA sections
///
/// Skips phonetic text annotations; `is_text_content` treats the element's
/// own text as the value instead of waiting for a nested `<t>`.
fn read_string_value(
    reader: &mut XmlReader<BufReader<ZipFile<'_, BufReader<File>>>>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, SheetSqlError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
