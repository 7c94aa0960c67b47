//! Plain-text extraction from uploaded resumes.

use bytes::Bytes;

use crate::errors::AppError;

/// Upload formats we know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Detects the format from the declared content type, falling back to the file extension.
    pub fn detect(file_name: Option<&str>, content_type: Option<&str>) -> Option<Self> {
        let content_type = content_type.unwrap_or("").to_lowercase();
        if content_type == "application/pdf" {
            return Some(DocumentKind::Pdf);
        }
        if content_type.starts_with("text/") {
            return Some(DocumentKind::PlainText);
        }

        let extension = file_name
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase())?;
        match extension.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "txt" | "md" | "text" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::PlainText => "txt",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::PlainText => "text/plain",
        }
    }
}

/// Extracts normalized plain text from an uploaded document.
///
/// PDF parsing is CPU-bound and runs on the blocking pool.
pub async fn extract_text(kind: DocumentKind, data: Bytes) -> Result<String, AppError> {
    let raw = match kind {
        DocumentKind::PlainText => String::from_utf8_lossy(&data).into_owned(),
        DocumentKind::Pdf => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&data)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read PDF: {e}")))?,
    };

    let text = normalize_whitespace(&raw);
    if text.is_empty() {
        return Err(AppError::Validation(
            "Uploaded document contains no readable text".to_string(),
        ));
    }
    Ok(text)
}

/// Collapses whitespace runs to single spaces and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
