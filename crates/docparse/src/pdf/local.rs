//! Local PDF text extraction
//!
//! Reads the page content streams with `lopdf`, one record per page. When
//! every page comes back empty (unusual font encodings, Type3 fonts) the
//! whole document is run through `pdf-extract` instead.

use std::path::Path;

use super::backend::{PdfBackend, PdfLoaderMethod};
use crate::error::Result;
use crate::types::DocumentRecord;

/// Default PDF backend
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalPdfBackend;

impl LocalPdfBackend {
    /// Create a new local backend
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for LocalPdfBackend {
    fn load(&self, path: &Path) -> Result<Vec<DocumentRecord>> {
        #[cfg(feature = "pdf")]
        {
            extract::load_pages(path)
        }
        #[cfg(not(feature = "pdf"))]
        {
            let _ = path;
            Err(crate::error::Error::missing_dependency(
                PdfLoaderMethod::Local.as_str(),
                self.install_command(),
            ))
        }
    }

    fn install_command(&self) -> String {
        PdfLoaderMethod::Local.install_command()
    }
}

#[cfg(feature = "pdf")]
mod extract {
    use std::path::Path;

    use crate::error::{Error, Result};
    use crate::types::{DocumentRecord, FileType};

    pub(super) fn load_pages(path: &Path) -> Result<Vec<DocumentRecord>> {
        let doc = lopdf::Document::load(path).map_err(Error::backend)?;
        let pages = doc.get_pages();
        let total_pages = pages.len();

        let mut records = Vec::with_capacity(total_pages);
        for (index, page_number) in pages.keys().enumerate() {
            let text = doc.extract_text(&[*page_number]).map_err(Error::backend)?;
            let text = clean_text(&text);
            tracing::debug!("{}: page {} -> {} chars", path.display(), page_number, text.len());

            records.push(
                DocumentRecord::new(text, path, FileType::Pdf)
                    .with_metadata("page", index)
                    .with_metadata("total_pages", total_pages),
            );
        }

        if total_pages > 0 && records.iter().all(|r| r.content.trim().is_empty()) {
            tracing::warn!(
                "{}: page streams produced no text, falling back to pdf-extract",
                path.display()
            );
            let text = extract_whole_document(path)?;
            if !text.trim().is_empty() {
                return Ok(vec![whole_document_record(text, path, total_pages)]);
            }
        }

        Ok(records)
    }

    /// Single record standing in for every page, tagged as page 0
    fn whole_document_record(text: String, path: &Path, total_pages: usize) -> DocumentRecord {
        DocumentRecord::new(text, path, FileType::Pdf)
            .with_metadata("page", 0)
            .with_metadata("total_pages", total_pages)
    }

    /// pdf-extract can panic on malformed fonts; surface that as an error
    fn extract_whole_document(path: &Path) -> Result<String> {
        let owned = path.to_path_buf();
        match std::panic::catch_unwind(move || pdf_extract::extract_text(&owned)) {
            Ok(Ok(text)) => Ok(clean_text(&text)),
            Ok(Err(e)) => Err(Error::backend(e)),
            Err(_) => Err(Error::backend(format!(
                "pdf-extract panicked while reading {}",
                path.display()
            ))),
        }
    }

    fn clean_text(text: &str) -> String {
        text.replace('\0', "")
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

}

#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use std::path::Path;

    /// Write a PDF with one page per entry in `pages`
    pub(crate) fn write_pdf(path: &Path, pages: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }
}
