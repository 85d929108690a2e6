//! Routed document loading

use std::path::Path;
use std::sync::Arc;

use super::parser::FileParser;
use super::router::route;
use crate::config::LoaderConfig;
use crate::error::Result;
use crate::pdf::{PdfBackend, PdfBackendChoice, PdfLoader, PdfLoaderMethod};
use crate::types::{DocumentRecord, FileType};

/// Routes paths to their handler and collects the records
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    config: LoaderConfig,
    pdf_method: Option<PdfLoaderMethod>,
    custom_pdf: Option<Arc<dyn PdfBackend>>,
}

impl FileLoader {
    /// Create a loader; PDFs use `config.pdf_backend` unless overridden
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            pdf_method: None,
            custom_pdf: None,
        }
    }

    /// Override the PDF backend
    pub fn with_pdf_backend(self, choice: impl Into<PdfBackendChoice>) -> Self {
        match choice.into() {
            PdfBackendChoice::Method(method) => self.with_pdf_method(method),
            PdfBackendChoice::Custom(backend) => self.with_custom_pdf_backend(backend),
        }
    }

    /// Name a built-in PDF backend
    ///
    /// Ignored while a custom backend is set.
    pub fn with_pdf_method(mut self, method: PdfLoaderMethod) -> Self {
        self.pdf_method = Some(method);
        self
    }

    /// Use a caller-supplied PDF backend
    pub fn with_custom_pdf_backend(mut self, backend: Arc<dyn PdfBackend>) -> Self {
        self.custom_pdf = Some(backend);
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The PDF backend this loader dispatches to
    pub fn pdf_choice(&self) -> PdfBackendChoice {
        match (&self.custom_pdf, self.pdf_method) {
            (Some(backend), _) => PdfBackendChoice::Custom(Arc::clone(backend)),
            (None, Some(method)) => PdfBackendChoice::Method(method),
            (None, None) => PdfBackendChoice::Method(self.config.pdf_backend),
        }
    }

    /// Load one path
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Vec<DocumentRecord>> {
        let path = path.as_ref();
        let file_type = route(path)?;
        tracing::debug!("{}: routed to {} handler", path.display(), file_type.handler_name());

        let records = match file_type {
            FileType::Pdf => PdfLoader::new(path, self.pdf_choice(), &self.config).load()?,
            other => FileParser::parse(path, other)?,
        };

        tracing::info!(
            "{}: loaded {} records ({})",
            path.display(),
            records.len(),
            file_type.display_name()
        );
        Ok(records)
    }

    /// Load every path, concatenating records in input order
    ///
    /// Stops at the first failure.
    pub fn load_all<I, P>(&self, paths: I) -> Result<Vec<DocumentRecord>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut records = Vec::new();
        for path in paths {
            records.extend(self.load(path)?);
        }
        Ok(records)
    }
}

/// Load a document with configuration from the default file and environment
pub fn load_document(path: impl AsRef<Path>) -> Result<Vec<DocumentRecord>> {
    FileLoader::new(LoaderConfig::load(None)?).load(path)
}

/// Load a document, forcing the PDF backend to `choice`
pub fn load_document_with(
    path: impl AsRef<Path>,
    choice: impl Into<PdfBackendChoice>,
) -> Result<Vec<DocumentRecord>> {
    FileLoader::new(LoaderConfig::load(None)?)
        .with_pdf_backend(choice)
        .load(path)
}
