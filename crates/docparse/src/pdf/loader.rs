//! PDF strategy selection

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::backend::{PdfBackend, PdfBackendChoice, PdfLoaderMethod};
use super::document_ai::DocumentAiPdfBackend;
use super::local::LocalPdfBackend;
use super::unstructured::UnstructuredPdfBackend;
use crate::config::LoaderConfig;
use crate::error::Result;
use crate::types::{DocumentRecord, FileType};

/// Loads one PDF through the selected backend
#[derive(Debug, Clone)]
pub struct PdfLoader {
    path: PathBuf,
    backend: Arc<dyn PdfBackend>,
    backend_name: &'static str,
}

impl PdfLoader {
    /// Resolve `choice` into a backend for `path`
    ///
    /// Built-in backends read their settings from `config`; a custom
    /// backend is used as given.
    pub fn new(path: impl Into<PathBuf>, choice: PdfBackendChoice, config: &LoaderConfig) -> Self {
        let backend_name = choice.name();
        let backend: Arc<dyn PdfBackend> = match choice {
            PdfBackendChoice::Custom(backend) => backend,
            PdfBackendChoice::Method(PdfLoaderMethod::Local) => Arc::new(LocalPdfBackend::new()),
            PdfBackendChoice::Method(PdfLoaderMethod::Unstructured) => {
                Arc::new(UnstructuredPdfBackend::new(config.unstructured.clone()))
            }
            PdfBackendChoice::Method(PdfLoaderMethod::DocumentAi) => {
                Arc::new(DocumentAiPdfBackend::new(config.document_ai.clone()))
            }
        };

        Self {
            path: path.into(),
            backend,
            backend_name,
        }
    }

    /// Path this loader reads
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the resolved backend ("custom" for caller-supplied ones)
    pub fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    /// Run the backend and normalize its records
    pub fn load(&self) -> Result<Vec<DocumentRecord>> {
        tracing::info!(
            "[{}] Loading PDF with '{}' backend",
            self.path.display(),
            self.backend_name
        );

        let records: Vec<DocumentRecord> = self
            .backend
            .load(&self.path)?
            .into_iter()
            .map(|record| record.normalize(&self.path, FileType::Pdf))
            .collect();

        tracing::debug!(
            "[{}] '{}' backend returned {} records",
            self.path.display(),
            self.backend_name,
            records.len()
        );
        Ok(records)
    }

    /// Install hint from the resolved backend
    pub fn install_command(&self) -> String {
        self.backend.install_command()
    }
}

/// Load a PDF with an explicit backend
///
/// Built-in backends take their settings from the default config file and
/// the environment (see [`LoaderConfig::load`]).
pub fn load_pdf(path: impl AsRef<Path>, choice: impl Into<PdfBackendChoice>) -> Result<Vec<DocumentRecord>> {
    let config = LoaderConfig::load(None)?;
    PdfLoader::new(path.as_ref(), choice.into(), &config).load()
}

/// Availability of one built-in backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    /// Backend name
    pub name: &'static str,
    /// Compiled in and configured
    pub available: bool,
    /// What the backend is for
    pub purpose: &'static str,
    /// How to get it, when it is not compiled in
    pub install_hint: Option<String>,
    /// Missing configuration, when compiled in but not usable yet
    pub missing_config: Option<String>,
}

/// Report which built-in PDF backends this build can use
pub fn available_backends(config: &LoaderConfig) -> Vec<BackendStatus> {
    PdfLoaderMethod::ALL
        .iter()
        .map(|method| {
            let compiled = method.is_compiled();
            let missing_config = match method {
                PdfLoaderMethod::Local => None,
                PdfLoaderMethod::Unstructured => config
                    .unstructured
                    .missing_api_key()
                    .then(|| crate::config::UNSTRUCTURED_API_KEY_ENV.to_string()),
                PdfLoaderMethod::DocumentAi => {
                    let mut missing = Vec::new();
                    if config.document_ai.processor.is_none() {
                        missing.push(crate::config::DOCUMENT_AI_PROCESSOR_ENV);
                    }
                    if config.document_ai.credentials_path.is_none() {
                        missing.push(crate::config::GOOGLE_CREDENTIALS_ENV);
                    }
                    (!missing.is_empty()).then(|| missing.join(", "))
                }
            };

            BackendStatus {
                name: method.as_str(),
                available: compiled && missing_config.is_none(),
                purpose: method.purpose(),
                install_hint: (!compiled).then(|| method.install_command()),
                missing_config,
            }
        })
        .collect()
}
