/// Value types a column can carry once normalized.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum ColumnType {
    /// Text, including formula sources
    #[default]
    String,
    /// 64-bit signed integers
    Number,
    /// Date and time values
    Date,
}

impl ColumnType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
        }
    }
}

/// A column header taken from the first row of a worksheet.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    /// Normalized header text
    pub name: String,
    /// Column type; stays at its default, data rows never update it
    pub cell_type: ColumnType,
}

impl Header {
    pub fn new(name: String) -> Self {
        Header {
            name,
            cell_type: ColumnType::default(),
        }
    }
}
