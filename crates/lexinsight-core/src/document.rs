//! Case intake: the typed description plus an optional uploaded document.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::error::AnalysisFailure;

pub const DOCUMENT_SEPARATOR: &str = "\n\n--- Uploaded Document Content ---\n";
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

const TEXT_EXTENSIONS: &[&str] = &["txt"];
/// Accepted but not extracted; only a placeholder line reaches the model.
const BINARY_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unsupported document type: {0} (expected .txt, .pdf, .doc or .docx)")]
    Unsupported(String),
    #[error("document is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDocument {
    pub name: String,
    /// What is sent to the model in place of the file.
    pub text: String,
}

impl CaseDocument {
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let is_text = TEXT_EXTENSIONS.contains(&ext.as_str());
        if !is_text && !BINARY_EXTENSIONS.contains(&ext.as_str()) {
            return Err(DocumentError::Unsupported(name));
        }

        let size = std::fs::metadata(path)?.len();
        if size > MAX_DOCUMENT_BYTES {
            return Err(DocumentError::TooLarge {
                size,
                limit: MAX_DOCUMENT_BYTES,
            });
        }

        let text = if is_text {
            let bytes = std::fs::read(path)?;
            String::from_utf8_lossy(&bytes).into_owned()
        } else {
            placeholder(&name)
        };
        info!(category = "analysis", document = %name, size, "loaded case document");
        Ok(Self { name, text })
    }
}

fn placeholder(name: &str) -> String {
    format!("[Document: {name}] - Content will be analyzed")
}

/// Text sent to the model: the description, then the document under a
/// separator when one is attached.
pub fn compose_case_text(case_text: &str, document_text: Option<&str>) -> String {
    match document_text {
        Some(doc) => format!("{case_text}{DOCUMENT_SEPARATOR}{doc}"),
        None => case_text.to_string(),
    }
}

/// One submission as entered by the user.
#[derive(Debug, Clone, Default)]
pub struct CaseInput {
    pub description: String,
    pub document: Option<CaseDocument>,
}

impl CaseInput {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            document: None,
        }
    }

    pub fn with_document(mut self, document: CaseDocument) -> Self {
        self.document = Some(document);
        self
    }

    /// Full prompt text. Blank description without a document is refused
    /// before anything goes over the wire.
    pub fn case_text(&self) -> Result<String, AnalysisFailure> {
        if self.description.trim().is_empty() && self.document.is_none() {
            return Err(AnalysisFailure::EmptyInput);
        }
        Ok(compose_case_text(
            &self.description,
            self.document.as_ref().map(|d| d.text.as_str()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_without_document() {
        assert_eq!(compose_case_text("Cheque bounced", None), "Cheque bounced");
    }

    #[test]
    fn test_compose_with_document() {
        assert_eq!(
            compose_case_text("Cheque bounced", Some("Bank memo")),
            "Cheque bounced\n\n--- Uploaded Document Content ---\nBank memo"
        );
    }

    #[test]
    fn test_blank_input_rejected() {
        assert_eq!(
            CaseInput::new("   \n").case_text(),
            Err(AnalysisFailure::EmptyInput)
        );
    }

    #[test]
    fn test_document_alone_is_enough() {
        let input = CaseInput::new("").with_document(CaseDocument {
            name: "fir.pdf".into(),
            text: placeholder("fir.pdf"),
        });
        let text = input.case_text().unwrap();
        assert!(text.ends_with("[Document: fir.pdf] - Content will be analyzed"));
    }
}
