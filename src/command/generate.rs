use crate::command::CommandError;
use crate::config::GenerateConfig;
use crate::database::normalize::normalize_sheet;
use crate::database::normalize::NormalizeOptions;
use crate::error::ResultMessage;
use crate::error::SheetSqlError;
use crate::helpers::string::get_key;
use crate::render::write_output;
use crate::render::Renderer;
use crate::spreadsheet;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Argument naming the input workbook: `-data=<path>`.
pub const DATA_KEY: &str = "data";

/// Renders one `.sql` file per worksheet of the input workbook.
///
/// Written paths are reported on `ui`, one per line, in workbook order.
pub struct GenerateCommand<W: Write> {
    ui: W,
    config: GenerateConfig,
}

impl<W: Write> GenerateCommand<W> {
    pub fn new(ui: W, config: GenerateConfig) -> Self {
        Self { ui, config }
    }

    pub fn into_ui(self) -> W {
        self.ui
    }

    /// Runs the command with the raw arguments following `generate`.
    ///
    /// Unreadable cells never fail the run. A missing `-data` argument, an
    /// unreadable workbook or template, and render or write failures do.
    pub fn run<S: AsRef<str>>(&mut self, args: &[S]) -> Result<Vec<PathBuf>, SheetSqlError> {
        let data = get_key(DATA_KEY, args).ok_or_else(|| CommandError::MissingArgument(DATA_KEY.to_owned()))?;

        let renderer = Renderer::load(&self.config.template)
            .with_prefix(&self.config.template.display().to_string())?;
        let mut spreadsheet = spreadsheet::open(&data).with_prefix(&data)?;
        info!(file = %spreadsheet.name(), sheets = spreadsheet.sheet_names().len(), "workbook opened");

        let options = NormalizeOptions {
            placeholder: self.config.placeholder.to_owned(),
            shorten_rows: self.config.shorten_rows,
        };
        let mut written = Vec::new();
        for sheet_name in spreadsheet.sheet_names() {
            let sheet = spreadsheet.read_sheet(&sheet_name).with_prefix(&sheet_name)?;
            let table = normalize_sheet(&sheet, &options);
            let text = renderer.render(&table).with_prefix(&sheet_name)?;
            let path = write_output(&self.config.output_dir, &table, &text)?;
            writeln!(self.ui, "{}", path.display())?;
            info!(sheet = %sheet_name, path = %path.display(), "output written");
            written.push(path);
        }
        self.ui.flush()?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::testing::WorkbookBuilder;
    use std::path::Path;

    const TEMPLATE: &str = "INSERT INTO {{ Table }} ({{ Columns | join(\", \") }}) VALUES\n\
        {% for row in Rows %}('{{ row | join(\"', '\") }}'){% if not loop.last %},\n{% endif %}{% endfor %};\n";

    fn config(dir: &Path) -> GenerateConfig {
        let template = dir.join("template.txt");
        std::fs::write(&template, TEMPLATE).unwrap();
        GenerateConfig {
            template,
            output_dir: dir.to_path_buf(),
            placeholder: "NULL".to_owned(),
            shorten_rows: false,
        }
    }

    fn workbook(dir: &Path) -> PathBuf {
        WorkbookBuilder::new()
            .shared_strings(&["Name", "Signup Date", "Score", "Alice", "Bob", "Player", "Points"])
            .custom_format(164, "dd\\-mm\\-yyyy\\ hh\\:mm\\:ss;@")
            .styles(&[0, 164, 2])
            .sheet("Sign ups", &[
                r#"<c r="A1" t="s"><v>0</v></c>"#,
                r#"<c r="B1" t="s"><v>1</v></c>"#,
                r#"<c r="C1" t="s"><v>2</v></c>"#,
                r#"<c r="A2" t="s"><v>3</v></c>"#,
                r#"<c r="B2" t="d"><v>2024-01-15T10:30:00Z</v></c>"#,
                r#"<c r="C2"><v>42</v></c>"#,
                r#"<c r="A3" t="s"><v>4</v></c>"#,
                r#"<c r="B3" s="1"><v>45306.5</v></c>"#,
                r#"<c r="C3" s="2"><v>3.14</v></c>"#,
            ])
            .sheet("Scores", &[
                r#"<c r="A1" t="s"><v>5</v></c>"#,
                r#"<c r="B1" t="s"><v>6</v></c>"#,
                r#"<c r="A2" t="s"><v>3</v></c>"#,
                r#"<c r="B2"><f>SUM(C2:C4)</f><v>12</v></c>"#,
            ])
            .write(dir, "people.xlsx")
    }

    #[test]
    fn generates_one_file_per_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let book = workbook(dir.path());
        let args = vec!["-verbose".to_owned(), format!("-data={}", book.display())];

        let mut command = GenerateCommand::new(Vec::new(), config(dir.path()));
        let written = command.run(&args).unwrap();

        let sign_ups = dir.path().join("Sign_ups.sql");
        let scores = dir.path().join("Scores.sql");
        assert_eq!(written, vec![sign_ups.clone(), scores.clone()]);
        assert_eq!(
            std::fs::read_to_string(&sign_ups).unwrap(),
            "INSERT INTO Sign_ups (Name, Signup_Date, Score) VALUES\n\
             ('Alice', '2024-01-15 10:30:00 UTC', '42'),\n\
             ('Bob', '2024-01-15 12:00:00', 'NULL');\n"
        );
        assert_eq!(
            std::fs::read_to_string(&scores).unwrap(),
            "INSERT INTO Scores (Player, Points) VALUES\n('Alice', 'SUM(C2:C4)');\n"
        );

        let ui = String::from_utf8(command.into_ui()).unwrap();
        assert_eq!(ui, format!("{}\n{}\n", sign_ups.display(), scores.display()));
    }

    #[test]
    fn shorten_rows_drops_unreadable_cells() {
        let dir = tempfile::tempdir().unwrap();
        let book = workbook(dir.path());
        let config = GenerateConfig {
            shorten_rows: true,
            ..config(dir.path())
        };

        let mut command = GenerateCommand::new(std::io::sink(), config);
        command.run(&[format!("-data={}", book.display())]).unwrap();

        let text = std::fs::read_to_string(dir.path().join("Sign_ups.sql")).unwrap();
        assert!(text.ends_with("('Bob', '2024-01-15 12:00:00');\n"));
    }

    #[test]
    fn last_data_argument_wins() {
        let dir = tempfile::tempdir().unwrap();
        let book = workbook(dir.path());
        let args = ["-data=missing.xlsx".to_owned(), format!("-data={}", book.display())];

        let mut command = GenerateCommand::new(Vec::new(), config(dir.path()));
        assert_eq!(command.run(&args).unwrap().len(), 2);
    }

    #[test]
    fn missing_data_argument() {
        let dir = tempfile::tempdir().unwrap();
        let mut command = GenerateCommand::new(Vec::new(), config(dir.path()));
        let error = command.run(&["-other=1"]).unwrap_err();
        assert!(matches!(error, SheetSqlError::CommandError(CommandError::MissingArgument(_))));
        assert_eq!(error.to_string(), "Missing required argument '-data=<value>'");
    }

    #[test]
    fn unreadable_workbook_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let book = dir.path().join("broken.xlsx");
        std::fs::write(&book, "not a zip archive").unwrap();

        let mut command = GenerateCommand::new(Vec::new(), config(dir.path()));
        let error = command.run(&[format!("-data={}", book.display())]).unwrap_err();
        assert!(error.to_string().starts_with(&book.display().to_string()));
        assert!(command.into_ui().is_empty());
    }

    #[test]
    fn invalid_template_fails_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let book = workbook(dir.path());
        let config = config(dir.path());
        std::fs::write(&config.template, "{% for row in %}").unwrap();

        let mut command = GenerateCommand::new(Vec::new(), config);
        assert!(command.run(&[format!("-data={}", book.display())]).is_err());
        assert!(!dir.path().join("Sign_ups.sql").exists());
    }
}
