//! Uploaded files and server-side reference documents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// File formats whose text can be extracted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Txt,
    Docx,
    Pdf,
}

impl DocumentFormat {
    /// Format from the file extension, case-insensitive.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(Self::Txt),
            "docx" => Some(Self::Docx),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Docx => "docx",
            Self::Pdf => "pdf",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Txt => "Text File",
            Self::Docx => "Word Document",
            Self::Pdf => "PDF Document",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file attached to a form submission, before text extraction.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    /// Form field the file arrived in, e.g. `cv_file`
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Label used in prompts: `cv_file` becomes `cv`.
    pub fn label(&self) -> String {
        self.field.strip_suffix("_file").unwrap_or(&self.field).replace('_', " ")
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Extracted text of an upload or reference file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub label: String,
    pub format: DocumentFormat,
    pub text: String,
    /// Set for PDFs.
    pub page_count: Option<usize>,
}

/// Entry of a letter page's reference folder, as listed on the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceFileInfo {
    pub file_name: String,
    pub display_name: String,
    /// `None` for files that cannot be read
    pub format: Option<DocumentFormat>,
    pub size_bytes: u64,
}

impl ReferenceFileInfo {
    pub fn is_supported(&self) -> bool {
        self.format.is_some()
    }

    pub fn type_label(&self) -> &'static str {
        self.format.map_or("Unknown", |f| f.display_name())
    }

    /// `512 B`, `1.5 KB`, `2.0 MB`.
    pub fn size_label(&self) -> String {
        const KB: u64 = 1024;
        match self.size_bytes {
            n if n < KB => format!("{} B", n),
            n if n < KB * KB => format!("{:.1} KB", n as f64 / KB as f64),
            n => format!("{:.1} MB", n as f64 / (KB * KB) as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(DocumentFormat::from_file_name("CV.PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_file_name("letter.final.docx"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_file_name("notes.txt"), Some(DocumentFormat::Txt));
        assert_eq!(DocumentFormat::from_file_name("legacy.doc"), None);
        assert_eq!(DocumentFormat::from_file_name("README"), None);
    }

    #[test]
    fn test_upload_label() {
        let upload = Upload { field: "teaching_eval_file".to_string(), file_name: "e.pdf".to_string(), bytes: vec![] };
        assert_eq!(upload.label(), "teaching eval");
        let upload = Upload { field: "cv".to_string(), ..upload };
        assert_eq!(upload.label(), "cv");
    }

    #[test]
    fn test_size_label() {
        let info = |size_bytes| ReferenceFileInfo {
            file_name: "a.txt".to_string(),
            display_name: "A".to_string(),
            format: Some(DocumentFormat::Txt),
            size_bytes,
        };
        assert_eq!(info(512).size_label(), "512 B");
        assert_eq!(info(1536).size_label(), "1.5 KB");
        assert_eq!(info(2 * 1024 * 1024).size_label(), "2.0 MB");
    }
}
