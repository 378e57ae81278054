//! Text extraction for uploaded files and server-side reference files.
//!
//! Supported formats are plain text, Word (`.docx`, read straight from the
//! OOXML package) and PDF. Extraction is CPU-bound, so async callers go
//! through [`extract_uploads`] or [`ReferenceLibrary::load`], which run it on
//! the blocking pool.

mod docx;
mod library;
mod pdf;

pub use library::ReferenceLibrary;

use letterdesk_types::{Document, DocumentFormat, LetterError, Upload};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("{file}: only .docx, .pdf and .txt files are supported")]
    Unsupported { file: String },
    #[error("{file}: file is empty")]
    Empty { file: String },
    #[error("{file}: file is larger than {max} bytes")]
    TooLarge { file: String, max: usize },
    #[error("{file}: {reason}")]
    Unreadable { file: String, reason: String },
}

/// Format of `file_name` if its size is acceptable. Nothing is parsed yet.
pub fn check(file_name: &str, len: usize, max_bytes: usize) -> Result<DocumentFormat, DocumentError> {
    let format = DocumentFormat::from_file_name(file_name)
        .ok_or_else(|| DocumentError::Unsupported { file: file_name.to_string() })?;
    if len == 0 {
        return Err(DocumentError::Empty { file: file_name.to_string() });
    }
    if len > max_bytes {
        return Err(DocumentError::TooLarge { file: file_name.to_string(), max: max_bytes });
    }
    Ok(format)
}

/// Extract the text of one file.
pub fn extract(
    label: String,
    file_name: &str,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<Document, DocumentError> {
    let format = check(file_name, bytes.len(), max_bytes)?;
    let unreadable =
        |reason: String| DocumentError::Unreadable { file: file_name.to_string(), reason };

    let (text, page_count) = match format {
        DocumentFormat::Txt => {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| unreadable("text file is not valid UTF-8".to_string()))?;
            (text.trim_start_matches('\u{feff}').to_string(), None)
        },
        DocumentFormat::Docx => (docx::extract_text(bytes).map_err(unreadable)?, None),
        DocumentFormat::Pdf => {
            let pdf = pdf::extract_text(bytes).map_err(unreadable)?;
            (pdf.text, Some(pdf.page_count))
        },
    };

    tracing::debug!("Extracted {} chars from {} ({})", text.len(), file_name, format);
    Ok(Document { label, format, text, page_count })
}

/// Extract every upload off the async runtime.
///
/// The first failure is reported against the form field it arrived in.
pub async fn extract_uploads(
    uploads: Vec<Upload>,
    max_bytes: usize,
) -> Result<Vec<Document>, LetterError> {
    if uploads.is_empty() {
        return Ok(Vec::new());
    }

    let task = tokio::task::spawn_blocking(move || {
        let mut documents = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match extract(upload.label(), &upload.file_name, &upload.bytes, max_bytes) {
                Ok(document) => documents.push(document),
                Err(e) => return Err((upload.field, e)),
            }
        }
        Ok(documents)
    });

    match task.await {
        Ok(Ok(documents)) => Ok(documents),
        Ok(Err((field, e))) => {
            tracing::info!("Rejected upload in '{}': {}", field, e);
            Err(LetterError::InvalidInput { field, message: e.to_string() })
        },
        Err(e) => Err(LetterError::Internal { message: format!("document extraction failed: {}", e) }),
    }
}
