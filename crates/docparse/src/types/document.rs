//! Document record and file type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Metadata key holding the input path
pub const SOURCE_KEY: &str = "source";
/// Metadata key holding the router's file type tag
pub const FILE_TYPE_KEY: &str = "file_type";

/// Supported file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Plain text file
    Txt,
    /// CSV file
    Csv,
    /// JSON document
    Json,
    /// Microsoft Word document (.docx)
    Docx,
    /// HTML document
    Html,
    /// Markdown file
    Markdown,
}

impl FileType {
    /// All supported types, in routing-table order
    pub const ALL: [FileType; 7] = [
        Self::Pdf,
        Self::Txt,
        Self::Csv,
        Self::Json,
        Self::Docx,
        Self::Html,
        Self::Markdown,
    ];

    /// Detect file type from extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" => Some(Self::Txt),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "docx" => Some(Self::Docx),
            "html" | "htm" => Some(Self::Html),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Name of the handler this type is routed to
    pub fn handler_name(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Txt => "txt",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Docx => "docx",
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Txt => "Text File",
            Self::Csv => "CSV",
            Self::Json => "JSON",
            Self::Docx => "Word Document (.docx)",
            Self::Html => "HTML",
            Self::Markdown => "Markdown",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.handler_name())
    }
}

/// Normalized unit of loaded content
///
/// Every record produced by this crate carries a non-empty `source` and a
/// `file_type` tag in its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Extracted text content
    pub content: String,
    /// Source path, file type and loader-specific fields
    pub metadata: HashMap<String, serde_json::Value>,
}

impl DocumentRecord {
    /// Create a record tagged with its source and file type
    pub fn new(content: impl Into<String>, source: &Path, file_type: FileType) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert(
            SOURCE_KEY.to_string(),
            serde_json::json!(source.to_string_lossy()),
        );
        metadata.insert(
            FILE_TYPE_KEY.to_string(),
            serde_json::json!(file_type.handler_name()),
        );
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Create a bare record with no metadata
    ///
    /// Custom PDF backends may return these; the selector fills in the
    /// source and file type before handing them back to the caller.
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Source path recorded in metadata
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).and_then(|v| v.as_str())
    }

    /// File type tag recorded in metadata
    pub fn file_type(&self) -> Option<&str> {
        self.metadata.get(FILE_TYPE_KEY).and_then(|v| v.as_str())
    }

    /// Stamp source (when missing or empty) and file type
    pub(crate) fn normalize(mut self, source: &Path, file_type: FileType) -> Self {
        let has_source = self.source().is_some_and(|s| !s.is_empty());
        if !has_source {
            self.metadata.insert(
                SOURCE_KEY.to_string(),
                serde_json::json!(source.to_string_lossy()),
            );
        }
        self.metadata.insert(
            FILE_TYPE_KEY.to_string(),
            serde_json::json!(file_type.handler_name()),
        );
        self
    }
}
