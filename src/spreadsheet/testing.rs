//! Builds small xlsx workbooks on disk for tests.

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

#[derive(Default)]
pub(crate) struct WorkbookBuilder {
    sheets: Vec<(String, String)>,
    shared_strings: Vec<String>,
    custom_formats: Vec<(usize, String)>,
    styles: Vec<usize>,
    date_1904: bool,
}

impl WorkbookBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a worksheet whose cells are given as `<c>` elements; cells are
    /// grouped into `<row>` elements by the row number of their reference.
    pub(crate) fn sheet(self, name: &str, cells: &[&str]) -> Self {
        let mut rows: Vec<(usize, String)> = Vec::new();
        for cell in cells {
            let row = row_of(cell);
            match rows.iter_mut().find(|(number, _)| *number == row) {
                Some((_, xml)) => xml.push_str(cell),
                None => rows.push((row, cell.to_string())),
            }
        }
        let data = rows
            .into_iter()
            .map(|(number, xml)| format!(r#"<row r="{number}">{xml}</row>"#))
            .collect::<String>();
        self.raw_sheet(name, &data)
    }

    /// Adds a worksheet with literal `<sheetData>` content.
    pub(crate) fn raw_sheet(mut self, name: &str, data: &str) -> Self {
        self.sheets.push((name.to_owned(), data.to_owned()));
        self
    }

    /// Shared strings, already XML escaped.
    pub(crate) fn shared_strings(mut self, strings: &[&str]) -> Self {
        self.shared_strings = strings.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Custom number format, given unescaped.
    pub(crate) fn custom_format(mut self, id: usize, code: &str) -> Self {
        self.custom_formats.push((id, code.to_owned()));
        self
    }

    /// Number format id of every cell style, in style index order.
    pub(crate) fn styles(mut self, format_ids: &[usize]) -> Self {
        self.styles = format_ids.to_vec();
        self
    }

    pub(crate) fn date_1904(mut self) -> Self {
        self.date_1904 = true;
        self
    }

    pub(crate) fn write(self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        let file = std::fs::File::create(&path).expect("create workbook");
        let mut zip = ZipWriter::new(file);

        let mut put = |name: &str, content: String| {
            zip.start_file(name, SimpleFileOptions::default()).expect("start part");
            zip.write_all(content.as_bytes()).expect("write part");
        };

        let sheets = self.sheets.iter().enumerate()
            .map(|(index, (name, _))| {
                format!(r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#, escape(name), index + 1, index + 1)
            })
            .collect::<String>();
        put("xl/workbook.xml", format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><workbookPr date1904="{}"/><sheets>{}</sheets></workbook>"#,
            if self.date_1904 { "1" } else { "0" },
            sheets,
        ));

        let relationships = (0..self.sheets.len())
            .map(|index| {
                format!(
                    r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                    index + 1,
                    index + 1,
                )
            })
            .collect::<String>();
        put("xl/_rels/workbook.xml.rels", format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#,
        ));

        for (index, (_, data)) in self.sheets.iter().enumerate() {
            put(&format!("xl/worksheets/sheet{}.xml", index + 1), format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{data}</sheetData></worksheet>"#,
            ));
        }

        if !self.shared_strings.is_empty() {
            let items = self.shared_strings.iter()
                .map(|string| format!("<si><t>{string}</t></si>"))
                .collect::<String>();
            put("xl/sharedStrings.xml", format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">{items}</sst>"#,
            ));
        }

        let formats = self.custom_formats.iter()
            .map(|(id, code)| format!(r#"<numFmt numFmtId="{}" formatCode="{}"/>"#, id, escape(code)))
            .collect::<String>();
        let styles = self.styles.iter()
            .map(|id| format!(r#"<xf numFmtId="{id}" fontId="0" fillId="0" borderId="0" xfId="0"/>"#))
            .collect::<String>();
        put("xl/styles.xml", format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="{}">{}</numFmts><cellXfs count="{}">{}</cellXfs></styleSheet>"#,
            self.custom_formats.len(),
            formats,
            self.styles.len(),
            styles,
        ));

        zip.finish().expect("finish workbook");
        path
    }
}

fn row_of(cell: &str) -> usize {
    cell.split("r=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .map(|reference| reference.trim_start_matches(|c: char| c.is_ascii_alphabetic()))
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(1)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
