//! Google Document AI backend for OCR-based PDF extraction
//!
//! Document AI handles scanned documents that have no text layer. Local
//! files are sent inline (base64); `gs://` paths are passed by reference so
//! the PDF never leaves Cloud Storage. Needs a service account key
//! (`GOOGLE_APPLICATION_CREDENTIALS`) and a processor resource name
//! (`DOCUMENT_AI_PROCESSOR`).

#![cfg_attr(not(feature = "gcp"), allow(dead_code))]

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::backend::{PdfBackend, PdfLoaderMethod};
use crate::config::DocumentAiConfig;
use crate::error::Result;
use crate::types::{DocumentRecord, FileType};

/// Document AI-backed PDF loader
#[derive(Debug, Clone, Default)]
pub struct DocumentAiPdfBackend {
    config: DocumentAiConfig,
}

impl DocumentAiPdfBackend {
    /// Create a backend from configuration
    pub fn new(config: DocumentAiConfig) -> Self {
        Self { config }
    }

    /// The configuration this backend uses
    pub fn config(&self) -> &DocumentAiConfig {
        &self.config
    }

    /// Whether both processor and credentials are set
    pub fn is_configured(&self) -> bool {
        self.config.processor.is_some() && self.config.credentials_path.is_some()
    }

    #[cfg(feature = "gcp")]
    fn process(&self, path: &Path) -> Result<ProcessResponse> {
        use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
        use std::time::Duration;

        use super::gcp_auth::GcpAuth;
        use crate::config::{DOCUMENT_AI_PROCESSOR_ENV, GOOGLE_CREDENTIALS_ENV};
        use crate::error::Error;

        let processor = self.config.processor.as_deref().ok_or_else(|| {
            Error::config(format!(
                "Document AI processor not set (set {} or document_ai.processor)",
                DOCUMENT_AI_PROCESSOR_ENV
            ))
        })?;
        let credentials = self.config.credentials_path.as_deref().ok_or_else(|| {
            Error::config(format!(
                "GCP credentials not set (set {} or document_ai.credentials_path)",
                GOOGLE_CREDENTIALS_ENV
            ))
        })?;

        let auth = GcpAuth::from_service_account(credentials)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()?;
        let token = auth.access_token(&client)?;

        let mime_type = mime_guess::from_path(path)
            .first_or(mime_guess::mime::APPLICATION_PDF)
            .to_string();

        let request = match gcs_uri(path) {
            Some(uri) => ProcessRequest {
                raw_document: None,
                gcs_document: Some(GcsDocument {
                    gcs_uri: uri.to_string(),
                    mime_type,
                }),
                skip_human_review: true,
            },
            None => ProcessRequest {
                raw_document: Some(RawDocument {
                    content: BASE64.encode(std::fs::read(path)?),
                    mime_type,
                }),
                gcs_document: None,
                skip_human_review: true,
            },
        };

        tracing::info!(
            "[{}] Sending to Document AI processor: {}",
            path.display(),
            processor
        );

        let response: ProcessResponse = client
            .post(endpoint(processor))
            .bearer_auth(token)
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;

        Ok(response)
    }
}

impl PdfBackend for DocumentAiPdfBackend {
    fn load(&self, path: &Path) -> Result<Vec<DocumentRecord>> {
        #[cfg(feature = "gcp")]
        {
            let response = self.process(path)?;
            let records = response_to_records(response.document, path);
            tracing::info!(
                "[{}] Document AI extracted {} pages",
                path.display(),
                records.len()
            );
            Ok(records)
        }
        #[cfg(not(feature = "gcp"))]
        {
            let _ = path;
            Err(crate::error::Error::missing_dependency(
                PdfLoaderMethod::DocumentAi.as_str(),
                self.install_command(),
            ))
        }
    }

    fn install_command(&self) -> String {
        PdfLoaderMethod::DocumentAi.install_command()
    }
}

/// Cloud Storage URI if the path is one
fn gcs_uri(path: &Path) -> Option<&str> {
    path.to_str().filter(|s| s.starts_with("gs://"))
}

/// API endpoint for a processor resource name
///
/// Format: projects/PROJECT/locations/LOCATION/processors/PROCESSOR_ID
fn endpoint(processor: &str) -> String {
    let location = processor.split('/').nth(3).unwrap_or("us");
    format!(
        "https://{}-documentai.googleapis.com/v1/{}:process",
        location, processor
    )
}

/// One record per page, using the page layout's text anchors
fn response_to_records(document: Document, path: &Path) -> Vec<DocumentRecord> {
    let full_text = document.text.unwrap_or_default();
    let pages = document.pages.unwrap_or_default();

    if pages.is_empty() {
        if full_text.trim().is_empty() {
            return Vec::new();
        }
        return vec![DocumentRecord::new(full_text, path, FileType::Pdf)
            .with_metadata("page", 0)
            .with_metadata("total_pages", 1)];
    }

    let total_pages = pages.len();
    pages
        .iter()
        .enumerate()
        .map(|(index, page)| {
            let text = match page.layout {
                Some(ref layout) => text_from_layout(layout, &full_text),
                None => text_from_paragraphs(page, &full_text),
            };
            DocumentRecord::new(text, path, FileType::Pdf)
                .with_metadata("page", index)
                .with_metadata("total_pages", total_pages)
        })
        .collect()
}

fn text_from_layout(layout: &Layout, full_text: &str) -> String {
    let mut text = String::new();
    let Some(segments) = layout
        .text_anchor
        .as_ref()
        .and_then(|a| a.text_segments.as_ref())
    else {
        return text;
    };

    for segment in segments {
        let start = char_to_byte(full_text, segment.start_index.unwrap_or(0));
        let end = match segment.end_index {
            Some(index) => char_to_byte(full_text, index),
            None => Some(full_text.len()),
        };
        if let Some(slice) = start.zip(end).and_then(|(s, e)| full_text.get(s..e)) {
            text.push_str(slice);
        }
    }
    text
}

/// Byte offset of a character index (text anchors count characters)
fn char_to_byte(text: &str, char_index: i64) -> Option<usize> {
    let char_index = usize::try_from(char_index).ok()?;
    text.char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .nth(char_index)
}

fn text_from_paragraphs(page: &Page, full_text: &str) -> String {
    page.paragraphs
        .iter()
        .flatten()
        .filter_map(|p| p.layout.as_ref())
        .map(|layout| text_from_layout(layout, full_text))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// API Request/Response types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_document: Option<RawDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gcs_document: Option<GcsDocument>,
    skip_human_review: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    content: String,
    mime_type: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GcsDocument {
    gcs_uri: String,
    mime_type: String,
}

#[derive(Deserialize)]
struct ProcessResponse {
    document: Document,
}

#[derive(Deserialize)]
struct Document {
    text: Option<String>,
    pages: Option<Vec<Page>>,
}

#[derive(Deserialize)]
struct Page {
    layout: Option<Layout>,
    paragraphs: Option<Vec<Paragraph>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Layout {
    text_anchor: Option<TextAnchor>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextAnchor {
    text_segments: Option<Vec<TextSegment>>,
}

// Document AI encodes int64 as JSON strings
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextSegment {
    #[serde(default, deserialize_with = "int64_string")]
    start_index: Option<i64>,
    #[serde(default, deserialize_with = "int64_string")]
    end_index: Option<i64>,
}

#[derive(Deserialize)]
struct Paragraph {
    layout: Option<Layout>,
}

fn int64_string<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64 {
        Number(i64),
        Text(String),
    }

    match Option::<Int64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Int64::Number(n)) => Ok(Some(n)),
        Some(Int64::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
