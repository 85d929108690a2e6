//! Format handlers for the non-PDF file types

use std::path::Path;

use crate::config::LoaderConfig;
use crate::error::Result;
use crate::pdf::{PdfBackendChoice, PdfLoader};
use crate::types::{DocumentRecord, FileType};

#[cfg(any(not(feature = "docx"), not(feature = "html"), not(feature = "markdown")))]
use crate::error::Error;
#[cfg(any(not(feature = "docx"), not(feature = "html"), not(feature = "markdown")))]
use crate::pdf::backend::feature_install_command;

/// Multi-format file parser
pub struct FileParser;

impl FileParser {
    /// Parse a file as `file_type`
    ///
    /// PDFs go through the default local backend; use
    /// [`FileLoader`](super::FileLoader) to pick another one.
    pub fn parse(path: &Path, file_type: FileType) -> Result<Vec<DocumentRecord>> {
        match file_type {
            FileType::Pdf => {
                PdfLoader::new(path, PdfBackendChoice::default(), &LoaderConfig::default()).load()
            }
            FileType::Txt => Self::parse_text(path),
            FileType::Csv => Self::parse_csv(path),
            FileType::Json => Self::parse_json(path),
            FileType::Docx => Self::parse_docx(path),
            FileType::Html => Self::parse_html(path),
            FileType::Markdown => Self::parse_markdown(path),
        }
    }

    /// Parse plain text
    pub fn parse_text(path: &Path) -> Result<Vec<DocumentRecord>> {
        let content = std::fs::read_to_string(path)?;
        Ok(vec![DocumentRecord::new(content, path, FileType::Txt)])
    }

    /// Parse CSV, one record per data row
    pub fn parse_csv(path: &Path) -> Result<Vec<DocumentRecord>> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result?;
            let content = headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| format!("{}: {}", header.trim(), value.trim()))
                .collect::<Vec<_>>()
                .join("\n");
            records.push(DocumentRecord::new(content, path, FileType::Csv).with_metadata("row", row));
        }

        tracing::debug!("{}: {} CSV rows", path.display(), records.len());
        Ok(records)
    }

    /// Parse JSON into a single pretty-printed record
    pub fn parse_json(path: &Path) -> Result<Vec<DocumentRecord>> {
        let file = std::fs::File::open(path)?;
        let value: serde_json::Value = serde_json::from_reader(std::io::BufReader::new(file))?;
        let content = serde_json::to_string_pretty(&value)?;
        Ok(vec![DocumentRecord::new(content, path, FileType::Json)])
    }

    /// Parse DOCX paragraphs and table rows
    pub fn parse_docx(path: &Path) -> Result<Vec<DocumentRecord>> {
        #[cfg(feature = "docx")]
        {
            let content = docx::extract_text(path)?;
            Ok(vec![DocumentRecord::new(content, path, FileType::Docx)])
        }
        #[cfg(not(feature = "docx"))]
        {
            let _ = path;
            Err(Error::missing_dependency("docx", feature_install_command("docx")))
        }
    }

    /// Parse HTML body text, with the document title as metadata
    pub fn parse_html(path: &Path) -> Result<Vec<DocumentRecord>> {
        #[cfg(feature = "html")]
        {
            let raw = std::fs::read_to_string(path)?;
            let (content, title) = html::extract_text(&raw)?;
            let mut record = DocumentRecord::new(content, path, FileType::Html);
            if let Some(title) = title {
                record = record.with_metadata("title", title);
            }
            Ok(vec![record])
        }
        #[cfg(not(feature = "html"))]
        {
            let _ = path;
            Err(Error::missing_dependency("html", feature_install_command("html")))
        }
    }

    /// Parse Markdown into plain text
    pub fn parse_markdown(path: &Path) -> Result<Vec<DocumentRecord>> {
        #[cfg(feature = "markdown")]
        {
            let raw = std::fs::read_to_string(path)?;
            let content = markdown::to_plain_text(&raw);
            Ok(vec![DocumentRecord::new(content, path, FileType::Markdown)])
        }
        #[cfg(not(feature = "markdown"))]
        {
            let _ = path;
            Err(Error::missing_dependency(
                "markdown",
                feature_install_command("markdown"),
            ))
        }
    }
}

/// Trim lines and drop the empty ones
#[cfg(any(feature = "docx", feature = "markdown"))]
fn clean_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(feature = "docx")]
mod docx {
    use std::path::Path;

    use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};

    use crate::error::{Error, Result};

    pub(super) fn extract_text(path: &Path) -> Result<String> {
        let data = std::fs::read(path)?;
        let docx = docx_rs::read_docx(&data).map_err(|e| Error::backend(e.to_string()))?;

        let mut output = String::new();
        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(paragraph) => {
                    output.push_str(&paragraph_text(paragraph));
                    output.push('\n');
                }
                DocumentChild::Table(table) => {
                    for row in &table.rows {
                        let docx_rs::TableChild::TableRow(tr) = row;
                        let cells: Vec<String> = tr
                            .cells
                            .iter()
                            .map(|cell| {
                                let docx_rs::TableRowChild::TableCell(tc) = cell;
                                tc.children
                                    .iter()
                                    .filter_map(|content| match content {
                                        docx_rs::TableCellContent::Paragraph(p) => {
                                            Some(paragraph_text(p))
                                        }
                                        _ => None,
                                    })
                                    .collect::<Vec<_>>()
                                    .join(" ")
                            })
                            .collect();
                        output.push_str(&cells.join(" | "));
                        output.push('\n');
                    }
                }
                _ => {}
            }
        }

        Ok(super::clean_lines(&output))
    }

    fn paragraph_text(paragraph: &Paragraph) -> String {
        let mut text = String::new();
        for child in &paragraph.children {
            match child {
                ParagraphChild::Run(run) => push_run_text(&run.children, &mut text),
                ParagraphChild::Hyperlink(link) => {
                    for inner in &link.children {
                        if let ParagraphChild::Run(run) = inner {
                            push_run_text(&run.children, &mut text);
                        }
                    }
                }
                _ => {}
            }
        }
        text
    }

    fn push_run_text(children: &[RunChild], out: &mut String) {
        for child in children {
            match child {
                RunChild::Text(t) => out.push_str(&t.text),
                RunChild::Tab(_) => out.push('\t'),
                _ => {}
            }
        }
    }
}

#[cfg(feature = "html")]
mod html {
    use scraper::{Html, Node, Selector};

    use crate::error::{Error, Result};

    /// Elements whose text is never visible
    const HIDDEN: [&str; 4] = ["script", "style", "noscript", "template"];

    fn selector(css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|e| Error::backend(e.to_string()))
    }

    /// Visible body text and the `<title>`, if any
    pub(super) fn extract_text(raw: &str) -> Result<(String, Option<String>)> {
        let document = Html::parse_document(raw);

        let title = document
            .select(&selector("title")?)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        let mut parts: Vec<&str> = Vec::new();
        if let Some(body) = document.select(&selector("body")?).next() {
            for node in body.descendants() {
                let Node::Text(text) = node.value() else {
                    continue;
                };
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|el| HIDDEN.contains(&el.name()))
                });
                if hidden {
                    continue;
                }
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed);
                }
            }
        }

        Ok((parts.join(" "), title))
    }
}

#[cfg(feature = "markdown")]
mod markdown {
    use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

    /// Render Markdown to plain text, one line per block
    pub(super) fn to_plain_text(raw: &str) -> String {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        let mut out = String::new();
        // cells already written in the current table row
        let mut cell = 0usize;

        for event in Parser::new_ext(raw, options) {
            match event {
                Event::Text(text) | Event::Code(text) => out.push_str(&text),
                Event::SoftBreak => out.push(' '),
                Event::HardBreak => out.push('\n'),
                Event::Start(Tag::TableCell) => {
                    if cell > 0 {
                        out.push_str(" | ");
                    }
                    cell += 1;
                }
                Event::End(TagEnd::TableHead | TagEnd::TableRow) => {
                    cell = 0;
                    out.push('\n');
                }
                Event::End(
                    TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock,
                ) => out.push('\n'),
                _ => {}
            }
        }

        super::clean_lines(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "notes.txt", "line one\nline two\n");

        let records = FileParser::parse_text(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "line one\nline two\n");
        assert_eq!(records[0].file_type(), Some("txt"));
    }

    #[test]
    fn test_parse_text_missing_file_is_io_error() {
        let err = FileParser::parse_text(Path::new("/nonexistent/notes.txt")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_parse_csv_one_record_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "people.csv", "name,age\nAlice,30\nBob,25\n");

        let records = FileParser::parse_csv(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content, "name: Alice\nage: 30");
        assert_eq!(records[1].content, "name: Bob\nage: 25");
        assert_eq!(records[0].metadata["row"], 0);
        assert_eq!(records[1].metadata["row"], 1);
        assert!(records.iter().all(|r| r.file_type() == Some("csv")));
    }

    #[test]
    fn test_parse_csv_ragged_row_is_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.csv", "a,b\n1,2,3\n");

        let err = FileParser::parse_csv(&path).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }

    #[test]
    fn test_parse_json_is_single_pretty_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "data.json", r#"{"name":"docparse","tags":["a","b"]}"#);

        let records = FileParser::parse_json(&path).unwrap();
        assert_eq!(records.len(), 1);
        let reparsed: serde_json::Value = serde_json::from_str(&records[0].content).unwrap();
        assert_eq!(reparsed["name"], "docparse");
        assert!(records[0].content.contains('\n'));
        assert_eq!(records[0].file_type(), Some("json"));
    }

    #[test]
    fn test_parse_json_invalid_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "broken.json", "{not json");

        let err = FileParser::parse_json(&path).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_parse_html_skips_scripts_and_keeps_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "page.html",
            "<html><head><title> Release Notes </title><style>p{color:red}</style></head>\
             <body><h1>Version 2</h1><p>Faster parsing.</p>\
             <script>console.log('hidden')</script></body></html>",
        );

        let records = FileParser::parse_html(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "Version 2 Faster parsing.");
        assert_eq!(records[0].metadata["title"], "Release Notes");
        assert_eq!(records[0].file_type(), Some("html"));
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_parse_html_skips_nested_hidden_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "app.html",
            "<html><body><p>Shown</p>\
             <template><div><p>Row template</p></div></template>\
             <noscript><p>Enable JavaScript</p></noscript></body></html>",
        );

        let records = FileParser::parse_html(&path).unwrap();
        assert_eq!(records[0].content, "Shown");
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_parse_html_without_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "frag.htm", "<p>Just a fragment</p>");

        let records = FileParser::parse_html(&path).unwrap();
        assert_eq!(records[0].content, "Just a fragment");
        assert!(!records[0].metadata.contains_key("title"));
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_parse_markdown_to_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "README.md",
            "# Title\n\nSome *emphasis* and `code`.\n\n- first\n- second\n",
        );

        let records = FileParser::parse_markdown(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].content,
            "Title\nSome emphasis and code.\nfirst\nsecond"
        );
        assert_eq!(records[0].file_type(), Some("markdown"));
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_markdown_table_rows() {
        let text = markdown::to_plain_text("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert_eq!(text, "a | b\n1 | 2");
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_markdown_keeps_trailing_pipes_outside_tables() {
        let text = markdown::to_plain_text("Shell pipes look like `ls |`\n\n- keep a|\n");
        assert_eq!(text, "Shell pipes look like ls |\nkeep a|");
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_markdown_empty_table_cell() {
        let text = markdown::to_plain_text("| a | b |\n|---|---|\n|  | 2 |\n");
        assert_eq!(text, "a | b\n| 2");
    }

    #[cfg(feature = "docx")]
    #[test]
    fn test_parse_docx_paragraphs_and_tables() {
        use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.docx");
        let cell = |text: &str| {
            TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
        };

        let file = std::fs::File::create(&path).unwrap();
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Dear reader,")))
            .add_table(Table::new(vec![TableRow::new(vec![cell("Item"), cell("Qty")])]))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Regards")))
            .build()
            .pack(file)
            .unwrap();

        let records = FileParser::parse_docx(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "Dear reader,\nItem | Qty\nRegards");
        assert_eq!(records[0].file_type(), Some("docx"));
    }

    #[cfg(feature = "docx")]
    #[test]
    fn test_parse_docx_corrupt_file_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "broken.docx", "not a zip");

        let err = FileParser::parse_docx(&path).unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
    }

    #[cfg(not(feature = "docx"))]
    #[test]
    fn test_docx_without_feature_is_missing_dependency() {
        let err = FileParser::parse_docx(Path::new("letter.docx")).unwrap_err();
        assert!(err.install_hint().unwrap().contains("--features docx"));
    }

    #[test]
    fn test_parse_dispatches_on_file_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "data.csv", "k,v\nx,1\n");

        let records = FileParser::parse(&path, FileType::Csv).unwrap();
        assert_eq!(records[0].content, "k: x\nv: 1");
    }
}
