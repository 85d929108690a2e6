//! PDF backend capability contract and backend selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::DocumentRecord;

/// Capability contract every PDF backend satisfies, built-in or custom.
///
/// `load` does the extraction; `install_command` tells the caller how to
/// obtain whatever the backend needs when it is missing. Records returned
/// by a backend are normalized by [`PdfLoader`](super::PdfLoader), so a
/// custom implementation may leave `source` and `file_type` unset.
#[cfg_attr(test, mockall::automock)]
pub trait PdfBackend: Send + Sync + fmt::Debug {
    /// Extract records from the PDF at `path`
    fn load(&self, path: &Path) -> Result<Vec<DocumentRecord>>;

    /// How to install this backend's optional dependency
    fn install_command(&self) -> String;
}

/// Built-in PDF backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PdfLoaderMethod {
    /// Direct text extraction from page content streams (lopdf / pdf-extract)
    #[default]
    #[serde(alias = "default-local", alias = "pypdf")]
    Local,
    /// Element-level structural extraction via the Unstructured API
    #[serde(alias = "advanced-structural")]
    Unstructured,
    /// OCR via Google Document AI
    #[serde(alias = "document_ai", alias = "documentai", alias = "cloud-ocr")]
    DocumentAi,
}

impl PdfLoaderMethod {
    /// All built-in methods
    pub const ALL: [PdfLoaderMethod; 3] = [Self::Local, Self::Unstructured, Self::DocumentAi];

    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Unstructured => "unstructured",
            Self::DocumentAi => "document-ai",
        }
    }

    /// Cargo feature that compiles this backend in
    pub fn feature(&self) -> &'static str {
        match self {
            Self::Local => "pdf",
            Self::Unstructured => "unstructured",
            Self::DocumentAi => "gcp",
        }
    }

    /// Whether the backend was compiled into this build
    pub fn is_compiled(&self) -> bool {
        match self {
            Self::Local => cfg!(feature = "pdf"),
            Self::Unstructured => cfg!(feature = "unstructured"),
            Self::DocumentAi => cfg!(feature = "gcp"),
        }
    }

    /// Install hint for this backend
    pub fn install_command(&self) -> String {
        feature_install_command(self.feature())
    }

    /// Short description for status listings
    pub fn purpose(&self) -> &'static str {
        match self {
            Self::Local => "Fast local text extraction from the PDF page streams",
            Self::Unstructured => "Structural element extraction via the Unstructured API",
            Self::DocumentAi => "OCR for scanned documents via Google Document AI",
        }
    }
}

impl fmt::Display for PdfLoaderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PdfLoaderMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" | "default-local" | "pypdf" => Ok(Self::Local),
            "unstructured" | "advanced-structural" => Ok(Self::Unstructured),
            "document-ai" | "document_ai" | "documentai" | "cloud-ocr" => Ok(Self::DocumentAi),
            _ => Err(Error::UnknownBackend {
                name: s.to_string(),
            }),
        }
    }
}

/// Install hint for a Cargo feature of this crate
pub(crate) fn feature_install_command(feature: &str) -> String {
    format!("cargo add docparse --features {}", feature)
}

/// Which PDF backend a load should use
#[derive(Debug, Clone)]
pub enum PdfBackendChoice {
    /// One of the built-in backends
    Method(PdfLoaderMethod),
    /// A caller-supplied backend
    Custom(Arc<dyn PdfBackend>),
}

impl PdfBackendChoice {
    /// Wrap a caller-supplied backend
    pub fn custom(backend: impl PdfBackend + 'static) -> Self {
        Self::Custom(Arc::new(backend))
    }

    /// Name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Method(method) => method.as_str(),
            Self::Custom(_) => "custom",
        }
    }
}

impl Default for PdfBackendChoice {
    fn default() -> Self {
        Self::Method(PdfLoaderMethod::default())
    }
}

impl From<PdfLoaderMethod> for PdfBackendChoice {
    fn from(method: PdfLoaderMethod) -> Self {
        Self::Method(method)
    }
}

impl From<Arc<dyn PdfBackend>> for PdfBackendChoice {
    fn from(backend: Arc<dyn PdfBackend>) -> Self {
        Self::Custom(backend)
    }
}

impl FromStr for PdfBackendChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<PdfLoaderMethod>().map(Self::Method)
    }
}
