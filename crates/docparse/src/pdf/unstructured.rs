//! Structural PDF extraction via the Unstructured partition API
//!
//! Works against the hosted API (API key required) or a self-hosted
//! `unstructured-api` server. Each element the API returns (title,
//! narrative text, list item, table...) becomes one record.

#![cfg_attr(not(feature = "unstructured"), allow(dead_code))]

use serde::Deserialize;
use std::path::Path;

use super::backend::{PdfBackend, PdfLoaderMethod};
use crate::config::UnstructuredConfig;
use crate::error::Result;
use crate::types::{DocumentRecord, FileType};

/// Unstructured-backed PDF loader
#[derive(Debug, Clone, Default)]
pub struct UnstructuredPdfBackend {
    config: UnstructuredConfig,
}

impl UnstructuredPdfBackend {
    /// Create a backend from configuration
    pub fn new(config: UnstructuredConfig) -> Self {
        Self { config }
    }

    /// The configuration this backend posts with
    pub fn config(&self) -> &UnstructuredConfig {
        &self.config
    }

    #[cfg(feature = "unstructured")]
    fn partition(&self, path: &Path) -> Result<Vec<UnstructuredElement>> {
        use std::time::Duration;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()?;

        let form = reqwest::blocking::multipart::Form::new()
            .text("strategy", self.config.strategy.clone())
            .file("files", path)?;

        let mut request = client.post(&self.config.api_url).multipart(form);
        if let Some(ref api_key) = self.config.api_key {
            request = request.header("unstructured-api-key", api_key);
        }

        tracing::info!(
            "[{}] Sending to Unstructured API: {} (strategy: {})",
            path.display(),
            self.config.api_url,
            self.config.strategy
        );

        let elements: Vec<UnstructuredElement> =
            request.send()?.error_for_status()?.json()?;

        tracing::info!(
            "[{}] Unstructured returned {} elements",
            path.display(),
            elements.len()
        );
        Ok(elements)
    }
}

impl PdfBackend for UnstructuredPdfBackend {
    fn load(&self, path: &Path) -> Result<Vec<DocumentRecord>> {
        #[cfg(feature = "unstructured")]
        {
            let elements = self.partition(path)?;
            Ok(elements_to_records(elements, path))
        }
        #[cfg(not(feature = "unstructured"))]
        {
            let _ = path;
            Err(crate::error::Error::missing_dependency(
                PdfLoaderMethod::Unstructured.as_str(),
                self.install_command(),
            ))
        }
    }

    fn install_command(&self) -> String {
        PdfLoaderMethod::Unstructured.install_command()
    }
}

#[derive(Debug, Deserialize)]
struct UnstructuredElement {
    #[serde(rename = "type")]
    element_type: String,
    #[serde(default)]
    element_id: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    metadata: Option<UnstructuredMetadata>,
}

#[derive(Debug, Deserialize)]
struct UnstructuredMetadata {
    page_number: Option<u32>,
}

/// One record per non-empty element, in API order
fn elements_to_records(elements: Vec<UnstructuredElement>, path: &Path) -> Vec<DocumentRecord> {
    elements
        .into_iter()
        .filter(|element| !element.text.trim().is_empty())
        .map(|element| {
            let mut record = DocumentRecord::new(element.text, path, FileType::Pdf)
                .with_metadata("category", element.element_type);
            if let Some(id) = element.element_id {
                record = record.with_metadata("element_id", id);
            }
            if let Some(page) = element.metadata.and_then(|m| m.page_number) {
                record = record.with_metadata("page_number", page);
            }
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"[
        {"type": "Title", "element_id": "a1", "text": "Quarterly Report",
         "metadata": {"page_number": 1, "filename": "report.pdf"}},
        {"type": "NarrativeText", "element_id": "b2", "text": "Revenue grew.",
         "metadata": {"page_number": 1}},
        {"type": "PageBreak", "element_id": "c3", "text": ""},
        {"type": "ListItem", "text": "Costs fell.", "metadata": {"page_number": 2}}
    ]"#;

    #[test]
    fn test_elements_to_records() {
        let elements: Vec<UnstructuredElement> = serde_json::from_str(RESPONSE).unwrap();
        let records = elements_to_records(elements, Path::new("report.pdf"));

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].content, "Quarterly Report");
        assert_eq!(records[0].metadata["category"], "Title");
        assert_eq!(records[0].metadata["element_id"], "a1");
        assert_eq!(records[0].metadata["page_number"], 1);
        assert_eq!(records[2].metadata["page_number"], 2);
        assert!(!records[2].metadata.contains_key("element_id"));
        assert!(records.iter().all(|r| r.file_type() == Some("pdf")));
        assert!(records.iter().all(|r| r.source() == Some("report.pdf")));
    }

    #[test]
    fn test_keeps_config() {
        let config = UnstructuredConfig {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        let backend = UnstructuredPdfBackend::new(config);
        assert_eq!(backend.config().api_key.as_deref(), Some("test-key"));
    }

    #[test]
    fn test_install_command() {
        let backend = UnstructuredPdfBackend::default();
        assert!(backend.install_command().contains("unstructured"));
    }

    #[cfg(not(feature = "unstructured"))]
    #[test]
    fn test_missing_dependency_without_feature() {
        let err = UnstructuredPdfBackend::default()
            .load(Path::new("test.pdf"))
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::MissingDependency { .. }));
        assert!(!err.install_hint().unwrap_or_default().is_empty());
    }

    /// One-shot HTTP server standing in for the partition endpoint
    #[cfg(feature = "unstructured")]
    mod server {
        use std::io::{ErrorKind, Read, Write};
        use std::net::TcpListener;
        use std::thread::JoinHandle;
        use std::time::Duration;

        /// Answer a single request; the handle yields the raw request text
        pub fn respond_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let url = format!("http://{}/general/v0/general", listener.local_addr().unwrap());

            let handle = std::thread::spawn(move || {
                let (mut stream, _) = listener.accept().unwrap();
                stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

                let mut request = Vec::new();
                let mut buf = [0u8; 4096];
                loop {
                    match stream.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            request.extend_from_slice(&buf[..n]);
                            if is_complete(&request) {
                                break;
                            }
                        }
                        Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => break,
                        Err(e) => panic!("read failed: {e}"),
                    }
                }

                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).unwrap();
                String::from_utf8_lossy(&request).into_owned()
            });

            (url, handle)
        }

        /// The multipart body ends with the closing boundary
        fn is_complete(request: &[u8]) -> bool {
            let text = String::from_utf8_lossy(request);
            let Some(boundary) = text
                .split("boundary=")
                .nth(1)
                .and_then(|rest| rest.split("\r\n").next())
            else {
                return false;
            };
            if !text.contains(&format!("--{}--", boundary.trim())) {
                return false;
            }
            if text.to_ascii_lowercase().contains("transfer-encoding: chunked") {
                return text.ends_with("0\r\n\r\n");
            }
            true
        }
    }

    #[cfg(feature = "unstructured")]
    #[test]
    fn test_partition_posts_file_and_maps_response() {
        let (api_url, server) = server::respond_once("200 OK", RESPONSE);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"%PDF-1.4 fake").unwrap();

        let backend = UnstructuredPdfBackend::new(UnstructuredConfig {
            api_url,
            api_key: Some("test-key".to_string()),
            strategy: "hi_res".to_string(),
            ..Default::default()
        });
        let records = backend.load(&path).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].content, "Quarterly Report");
        assert_eq!(records[1].metadata["category"], "NarrativeText");
        assert_eq!(records[2].metadata["page_number"], 2);
        assert!(records
            .iter()
            .all(|r| r.source() == Some(path.to_string_lossy().as_ref())));

        let request = server.join().unwrap();
        let lowered = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /general/v0/general"));
        assert!(lowered.contains("unstructured-api-key: test-key"));
        assert!(request.contains("name=\"strategy\""));
        assert!(request.contains("hi_res"));
        assert!(request.contains("filename=\"fake.pdf\""));
        assert!(request.contains("%PDF-1.4 fake"));
    }

    #[cfg(feature = "unstructured")]
    #[test]
    fn test_partition_error_status_is_http_error() {
        let (api_url, server) = server::respond_once("401 Unauthorized", r#"{"detail": "bad key"}"#);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"%PDF-1.4 fake").unwrap();

        let backend = UnstructuredPdfBackend::new(UnstructuredConfig {
            api_url,
            ..Default::default()
        });
        let err = backend.load(&path).unwrap_err();
        server.join().unwrap();

        match err {
            crate::error::Error::Http(e) => {
                assert_eq!(e.status(), Some(reqwest::StatusCode::UNAUTHORIZED))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(feature = "unstructured")]
    #[test]
    fn test_missing_file_is_io_error() {
        let err = UnstructuredPdfBackend::default()
            .load(Path::new("/nonexistent/test.pdf"))
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }
}
