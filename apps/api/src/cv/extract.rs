//! Upload decoding: PDF and plain-text CV files to raw text.

use thiserror::Error;
use tracing::info;

/// Upload size limit enforced on the request body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Only PDF and TXT files are allowed")]
    UnsupportedType(String),

    #[error("Failed to parse PDF file. Please ensure it contains readable text.")]
    Pdf(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Pdf,
    PlainText,
}

/// Decides the file kind from the declared content type, falling back to the extension.
pub fn detect_kind(file_name: &str, content_type: Option<&str>) -> Result<UploadKind, ExtractError> {
    match content_type.map(|c| c.split(';').next().unwrap_or(c).trim()) {
        Some("application/pdf") => return Ok(UploadKind::Pdf),
        Some("text/plain") => return Ok(UploadKind::PlainText),
        _ => {}
    }

    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        Ok(UploadKind::Pdf)
    } else if lower.ends_with(".txt") {
        Ok(UploadKind::PlainText)
    } else {
        Err(ExtractError::UnsupportedType(
            content_type.unwrap_or("unknown").to_string(),
        ))
    }
}

/// Extracts text from an uploaded file. PDF parsing is CPU-bound and runs on the blocking pool.
pub async fn extract_upload(
    file_name: &str,
    content_type: Option<&str>,
    bytes: Vec<u8>,
) -> Result<String, ExtractError> {
    let kind = detect_kind(file_name, content_type)?;
    info!("Processing uploaded file: {file_name} ({kind:?})");

    let text = match kind {
        UploadKind::PlainText => String::from_utf8_lossy(&bytes).into_owned(),
        UploadKind::Pdf => {
            let extracted =
                tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                    .await
                    .map_err(|e| ExtractError::Pdf(format!("PDF extraction task failed: {e}")))?;
            let text = extracted.map_err(|e| ExtractError::Pdf(e.to_string()))?;
            info!("Extracted {} characters from PDF", text.chars().count());
            text
        }
    };

    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_kind_prefers_content_type() {
        assert_eq!(
            detect_kind("resume.bin", Some("application/pdf")).unwrap(),
            UploadKind::Pdf
        );
        assert_eq!(
            detect_kind("resume", Some("text/plain; charset=utf-8")).unwrap(),
            UploadKind::PlainText
        );
    }

    #[test]
    fn test_detect_kind_falls_back_to_extension() {
        assert_eq!(
            detect_kind("CV.PDF", Some("application/octet-stream")).unwrap(),
            UploadKind::Pdf
        );
        assert_eq!(detect_kind("cv.txt", None).unwrap(), UploadKind::PlainText);
    }

    #[test]
    fn test_detect_kind_rejects_other_types() {
        let err = detect_kind("cv.docx", Some("application/msword")).unwrap_err();
        assert_eq!(err.to_string(), "Only PDF and TXT files are allowed");
    }

    #[tokio::test]
    async fn test_extract_plain_text() {
        let text = extract_upload("cv.txt", Some("text/plain"), b"  hello world \n".to_vec())
            .await
            .unwrap();
        assert_eq!(text, "hello world");
    }

    #[tokio::test]
    async fn test_extract_invalid_pdf_fails() {
        let result = extract_upload("cv.pdf", Some("application/pdf"), b"not a pdf".to_vec()).await;
        assert!(matches!(result, Err(ExtractError::Pdf(_))));
    }
}
