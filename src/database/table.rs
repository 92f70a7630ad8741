use serde::Serialize;

/// Normalized, template-ready projection of one worksheet.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Table {
    /// Normalized worksheet name
    pub name: String,
    /// Normalized header names, left to right
    pub columns: Vec<String>,
    /// Data rows, positionally aligned with `columns`
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// File name the rendered table is written to.
    pub fn file_name(&self) -> String {
        format!("{}.sql", self.name)
    }
}
