//! Configuration for document loading

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::pdf::PdfLoaderMethod;

/// Environment variable naming the default PDF backend
pub const PDF_BACKEND_ENV: &str = "DOCPARSE_PDF_BACKEND";
/// Environment variable holding the Unstructured API key
pub const UNSTRUCTURED_API_KEY_ENV: &str = "UNSTRUCTURED_API_KEY";
/// Environment variable overriding the Unstructured API URL
pub const UNSTRUCTURED_API_URL_ENV: &str = "UNSTRUCTURED_API_URL";
/// Environment variable pointing at a GCP service account key
pub const GOOGLE_CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
/// Environment variable holding the Document AI processor resource name
pub const DOCUMENT_AI_PROCESSOR_ENV: &str = "DOCUMENT_AI_PROCESSOR";

/// Main loader configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// PDF backend used when the caller does not name one
    #[serde(default)]
    pub pdf_backend: PdfLoaderMethod,
    /// Unstructured partition API configuration
    #[serde(default)]
    pub unstructured: UnstructuredConfig,
    /// Google Document AI configuration
    #[serde(default)]
    pub document_ai: DocumentAiConfig,
}

impl LoaderConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| {
            Error::config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Default config file location (`<config dir>/docparse/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docparse").join("config.toml"))
    }

    /// Load from `path`, or the default location when it exists, then apply
    /// environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => {
                    tracing::debug!("Using config file {}", p.display());
                    Self::from_file(p)?
                }
                None => Self::default(),
            },
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay values from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(method) = get(PDF_BACKEND_ENV).filter(|v| !v.is_empty()) {
            self.pdf_backend = method.parse()?;
        }
        if let Some(key) = get(UNSTRUCTURED_API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.unstructured.api_key = Some(key);
        }
        if let Some(url) = get(UNSTRUCTURED_API_URL_ENV).filter(|v| !v.is_empty()) {
            self.unstructured.api_url = url;
        }
        if let Some(path) = get(GOOGLE_CREDENTIALS_ENV).filter(|v| !v.is_empty()) {
            self.document_ai.credentials_path = Some(PathBuf::from(path));
        }
        if let Some(processor) = get(DOCUMENT_AI_PROCESSOR_ENV).filter(|v| !v.is_empty()) {
            self.document_ai.processor = Some(processor);
        }
        Ok(())
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))
    }
}

/// Unstructured partition API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnstructuredConfig {
    /// Partition endpoint (hosted or self-hosted)
    #[serde(default = "default_unstructured_url")]
    pub api_url: String,
    /// API key (hosted API only; self-hosted servers usually need none)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Partition strategy ("auto", "fast", "hi_res", "ocr_only")
    #[serde(default = "default_unstructured_strategy")]
    pub strategy: String,
    /// Request timeout in seconds
    #[serde(default = "default_unstructured_timeout")]
    pub timeout_secs: u64,
}

impl Default for UnstructuredConfig {
    fn default() -> Self {
        Self {
            api_url: default_unstructured_url(),
            api_key: None,
            strategy: default_unstructured_strategy(),
            timeout_secs: default_unstructured_timeout(),
        }
    }
}

impl UnstructuredConfig {
    /// Whether the URL points at the hosted API
    pub fn is_hosted(&self) -> bool {
        self.api_url.contains("unstructured.io") || self.api_url.contains("unstructuredapp.io")
    }

    /// Hosted API selected but no key set
    pub fn missing_api_key(&self) -> bool {
        self.is_hosted() && self.api_key.as_deref().map_or(true, str::is_empty)
    }
}

/// Google Document AI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAiConfig {
    /// Full processor resource name
    /// e.g., "projects/my-project/locations/us/processors/abc123"
    #[serde(default)]
    pub processor: Option<String>,
    /// Path to service account JSON key file
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
    /// Request timeout in seconds
    #[serde(default = "default_document_ai_timeout")]
    pub timeout_secs: u64,
}

impl Default for DocumentAiConfig {
    fn default() -> Self {
        Self {
            processor: None,
            credentials_path: None,
            timeout_secs: default_document_ai_timeout(),
        }
    }
}

fn default_unstructured_url() -> String {
    "https://api.unstructured.io/general/v0/general".to_string()
}

fn default_unstructured_strategy() -> String {
    "auto".to_string()
}

fn default_unstructured_timeout() -> u64 {
    120
}

fn default_document_ai_timeout() -> u64 {
    300
}
