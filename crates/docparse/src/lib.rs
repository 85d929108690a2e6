//! docparse: extension-routed document loading
//!
//! Routes a file to a loader by its suffix (pdf, txt, csv, json, docx, html,
//! markdown) and returns uniform [`DocumentRecord`]s. PDFs go through one of
//! several interchangeable backends: local page-stream extraction, the
//! Unstructured partition API, Google Document AI, or a caller-supplied
//! [`PdfBackend`].
//!
//! ```no_run
//! use docparse::{FileLoader, LoaderConfig, PdfLoaderMethod};
//!
//! let loader = FileLoader::new(LoaderConfig::load(None)?)
//!     .with_pdf_backend(PdfLoaderMethod::Unstructured);
//! for record in loader.load_all(["report.pdf", "notes.md"])? {
//!     println!("{}: {}", record.source().unwrap_or_default(), record.content);
//! }
//! # Ok::<(), docparse::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod ingestion;
pub mod pdf;
pub mod types;

pub use config::{DocumentAiConfig, LoaderConfig, UnstructuredConfig};
pub use error::{Error, Result};
pub use ingestion::{
    discover_files, load_document, load_document_with, route, FileLoader, FileParser,
};
pub use pdf::{
    available_backends, load_pdf, BackendStatus, PdfBackend, PdfBackendChoice, PdfLoader,
    PdfLoaderMethod,
};
pub use types::{DocumentRecord, FileType};
