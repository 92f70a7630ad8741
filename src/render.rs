//! Template rendering and `.sql` output.
//!
//! The template sees exactly three bindings: `Table` (the normalized sheet
//! name), `Columns` (header names) and `Rows` (data rows as lists of strings).
use crate::database::table::Table;
use crate::error::SheetSqlError;
use minijinja::context;
use minijinja::Environment;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

const TEMPLATE_NAME: &str = "template";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Read template '{path}' failed: {error}")]
    TemplateReadError { path: String, error: std::io::Error },

    #[error("Write output '{path}' failed: {error}")]
    OutputError { path: String, error: std::io::Error },
}

/// A template loaded once and rendered for every worksheet.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Reads and compiles the template file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SheetSqlError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|error| RenderError::TemplateReadError {
            path: path.display().to_string(),
            error,
        })?;
        Self::from_source(source)
    }

    /// Compiles template source; syntax errors surface here rather than at render time.
    pub fn from_source(source: String) -> Result<Self, SheetSqlError> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.add_template_owned(TEMPLATE_NAME, source)?;
        Ok(Self { env })
    }

    pub fn render(&self, table: &Table) -> Result<String, SheetSqlError> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        let text = template.render(context! {
            Table => &table.name,
            Columns => &table.columns,
            Rows => &table.rows,
        })?;
        debug!(table = %table.name, query = %text, "output generated");
        Ok(text)
    }
}

/// Writes rendered text to `<dir>/<table>.sql`, replacing any existing file.
pub fn write_output(dir: &Path, table: &Table, text: &str) -> Result<PathBuf, SheetSqlError> {
    let path = dir.join(table.file_name());
    let output_error = |error| RenderError::OutputError {
        path: path.display().to_string(),
        error,
    };

    let file = File::create(&path).map_err(output_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(text.as_bytes()).map_err(output_error)?;
    writer.flush().map_err(output_error)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSERT_TEMPLATE: &str = "INSERT INTO {{ Table }} ({{ Columns | join(\", \") }}) VALUES\n\
        {% for row in Rows %}('{{ row | join(\"', '\") }}'){% if not loop.last %},\n{% endif %}{% endfor %};\n";

    fn table() -> Table {
        Table {
            name: "Sign_ups".to_owned(),
            columns: vec!["Name".to_owned(), "Score".to_owned()],
            rows: vec![
                vec!["Alice".to_owned(), "42".to_owned()],
                vec!["Bob".to_owned(), "7".to_owned()],
            ],
        }
    }

    #[test]
    fn render_binds_table_columns_and_rows() {
        let renderer = Renderer::from_source(INSERT_TEMPLATE.to_owned()).unwrap();
        let text = renderer.render(&table()).unwrap();
        assert_eq!(
            text,
            "INSERT INTO Sign_ups (Name, Score) VALUES\n('Alice', '42'),\n('Bob', '7');\n"
        );
    }

    #[test]
    fn render_does_not_escape_values() {
        let renderer = Renderer::from_source("{{ Rows[0][0] }}".to_owned()).unwrap();
        let mut table = table();
        table.rows[0][0] = "<a & b>".to_owned();
        assert_eq!(renderer.render(&table).unwrap(), "<a & b>");
    }

    #[test]
    fn invalid_template_is_rejected_on_load() {
        let result = Renderer::from_source("{% for row in %}".to_owned());
        assert!(matches!(result, Err(SheetSqlError::TemplateError(_))));
    }

    #[test]
    fn missing_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Renderer::load(dir.path().join("template.txt"));
        assert!(matches!(
            result,
            Err(SheetSqlError::RenderError(RenderError::TemplateReadError { .. }))
        ));
    }

    #[test]
    fn load_template_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.txt");
        std::fs::write(&path, "-- {{ Table }}: {{ Columns | length }} columns\n").unwrap();

        let renderer = Renderer::load(&path).unwrap();
        assert_eq!(renderer.render(&table()).unwrap(), "-- Sign_ups: 2 columns\n");
    }

    #[test]
    fn write_output_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("Sign_ups.sql");
        std::fs::write(&existing, "a much longer previous content").unwrap();

        let path = write_output(dir.path(), &table(), "SELECT 1;").unwrap();
        assert_eq!(path, existing);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "SELECT 1;");
    }

    #[test]
    fn write_output_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let error = write_output(&missing, &table(), "SELECT 1;").unwrap_err();
        let message = error.to_string();
        assert!(message.starts_with("Write output '"));
        assert_eq!(format!("{:#}", anyhow::Error::new(error)), message);
        assert!(!missing.join("Sign_ups.sql").exists());
    }
}
