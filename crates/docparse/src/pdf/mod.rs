//! PDF loading with selectable extraction backends
//!
//! - `local`: page-stream text extraction, no network (default)
//! - `unstructured`: element-level extraction through the Unstructured API
//! - `document-ai`: OCR through Google Document AI
//!
//! Callers may also hand in their own [`PdfBackend`].

pub mod backend;
pub mod document_ai;
#[cfg(feature = "gcp")]
mod gcp_auth;
pub mod loader;
pub mod local;
pub mod unstructured;

pub use backend::{PdfBackend, PdfBackendChoice, PdfLoaderMethod};
pub use document_ai::DocumentAiPdfBackend;
pub use loader::{available_backends, load_pdf, BackendStatus, PdfLoader};
pub use local::LocalPdfBackend;
pub use unstructured::UnstructuredPdfBackend;
