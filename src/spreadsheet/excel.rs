//! Microsoft Office Excel Helpers
use crate::error::SheetSqlError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use zip::ZipArchive;

/// Workbook package reader
pub(crate) type Package = ZipArchive<BufReader<File>>;

/// XML tag name for relationship elements in Excel files
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Format code used when a style has no number format.
pub(crate) const GENERAL_FORMAT: &str = "General";

/// Opens an Excel package and loads its structure
///
/// # Arguments
/// * `file_name` - Path to the Excel file
/// * `load_workbook` - Function to load worksheet names/paths and the date system
/// * `load_number_formats` - Function to load the format code of every cell style
///
/// # Returns
/// Tuple containing:
/// - Zip archive handle
/// - Number format code per style index
/// - List of sheet names and their paths
/// - Whether the workbook uses the 1904 date system
pub(super) fn open<W, F>(file_name: &str, load_workbook: W, load_number_formats: F) -> Result<(
    Package,
    Vec<String>,
    Vec<(String, String)>,
    bool,
), SheetSqlError>
where
    W: Fn(&mut Package) -> Result<(Vec<(String, String)>, bool), SheetSqlError>,
    F: Fn(&mut Package) -> Result<Vec<String>, SheetSqlError>,
{
    let reader = BufReader::new(File::open(file_name)?);
    let mut zip = ZipArchive::new(reader)?;
    let (sheets, is_1904) = load_workbook(&mut zip)?;
    if sheets.is_empty() {
        Err(SpreadsheetError::SpreadsheetEmptyError(file_name.to_owned()))?
    }

    let number_formats = load_number_formats(&mut zip)?;
    Ok((zip, number_formats, sheets, is_1904))
}

/// Loads worksheet relationships from an Excel file
///
/// # Returns
/// Mapping of relationship IDs to worksheet paths
pub(super) fn load_relationships(zip: &mut Package, path: &str) -> Result<HashMap<String, String>, SheetSqlError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Only process worksheet relationships
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Resolves the format code of every cell style
///
/// # Arguments
/// * `format_ids` - Number format id of each style, in style order
/// * `custom_formats` - Custom format codes declared in the workbook
///
/// # Returns
/// Format code per style index; unknown ids fall back to `General`
pub(super) fn load_number_formats(format_ids: Vec<String>, custom_formats: HashMap<String, String>) -> Vec<String> {
    format_ids
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .map(Clone::clone)
                .or_else(|| builtin_number_format(id).map(str::to_owned))
                .unwrap_or_else(|| GENERAL_FORMAT.to_owned())
        })
        .collect()
}

/// Built-in number formats defined by ECMA-376 for ids below 164.
pub(crate) fn builtin_number_format(id: &str) -> Option<&'static str> {
    match id {
        "0" => Some(GENERAL_FORMAT),
        "1" => Some("0"),
        "2" => Some("0.00"),
        "3" => Some("#,##0"),
        "4" => Some("#,##0.00"),
        "9" => Some("0%"),
        "10" => Some("0.00%"),
        "11" => Some("0.00E+00"),
        "12" => Some("# ?/?"),
        "13" => Some("# ??/??"),
        "14" => Some("mm-dd-yy"),
        "15" => Some("d-mmm-yy"),
        "16" => Some("d-mmm"),
        "17" => Some("mmm-yy"),
        "18" => Some("h:mm AM/PM"),
        "19" => Some("h:mm:ss AM/PM"),
        "20" => Some("h:mm"),
        "21" => Some("h:mm:ss"),
        "22" => Some("m/d/yy h:mm"),
        "37" => Some("#,##0 ;(#,##0)"),
        "38" => Some("#,##0 ;[Red](#,##0)"),
        "39" => Some("#,##0.00;(#,##0.00)"),
        "40" => Some("#,##0.00;[Red](#,##0.00)"),
        "45" => Some("mm:ss"),
        "46" => Some("[h]:mm:ss"),
        "47" => Some("mmss.0"),
        "48" => Some("##0.0E+0"),
        "49" => Some("@"),
        _ => None,
    }
}

/// Normalizes a relationship target to a path inside the zip archive
pub(crate) fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(stripped) = path.strip_prefix("/xl/") {
        format!("xl/{stripped}")
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}
