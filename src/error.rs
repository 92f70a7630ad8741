use thiserror::Error;

/// Main error type for the sheet_sql generator.
/// Aggregates errors from the standard library, dependencies and internal modules.
#[derive(Error, Debug)]
pub enum SheetSqlError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error(transparent)]
    StringEncodingError(#[from] std::str::Utf8Error),

    // Third-party library errors
    #[error(transparent)]
    ZipError(#[from] zip::result::ZipError),

    #[error(transparent)]
    XmlError(#[from] quick_xml::Error),

    #[error(transparent)]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error(transparent)]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error(transparent)]
    ConfigError(#[from] serde_yaml::Error),

    #[error(transparent)]
    TemplateError(#[from] minijinja::Error),

    // Helper module errors
    #[error(transparent)]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet module errors
    #[error(transparent)]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Output module errors
    #[error(transparent)]
    RenderError(#[from] crate::render::RenderError),

    // Command errors
    #[error(transparent)]
    CommandError(#[from] crate::command::CommandError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, SheetSqlError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| SheetSqlError::WithContextError(format!("{}: {}", message, e)))
    }
}
