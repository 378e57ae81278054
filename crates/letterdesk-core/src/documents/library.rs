use std::path::{Path, PathBuf};

use letterdesk_types::models::DocumentsConfig;
use letterdesk_types::{Document, DocumentFormat, LetterKind, ReferenceFileInfo};

use crate::prompt::label;

/// Reference files kept on the server, one folder per letter page:
/// `<root>/<page-slug>/*.{txt,docx,pdf}`.
#[derive(Debug, Clone, Default)]
pub struct ReferenceLibrary {
    root: Option<PathBuf>,
    max_bytes: usize,
}

impl ReferenceLibrary {
    pub fn new(root: Option<PathBuf>, max_bytes: usize) -> Self {
        Self { root, max_bytes }
    }

    pub fn from_config(config: &DocumentsConfig) -> Self {
        Self::new(config.reference_dir.clone(), config.max_document_bytes)
    }

    fn folder(&self, kind: LetterKind) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(kind.page_slug()))
    }

    /// Regular files in the folder of `kind`, sorted by name.
    pub async fn list(&self, kind: LetterKind) -> Vec<ReferenceFileInfo> {
        let Some(folder) = self.folder(kind) else {
            return Vec::new();
        };
        let mut entries = match tokio::fs::read_dir(&folder).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No reference folder for {} at {}", kind, folder.display());
                return Vec::new();
            },
            Err(e) => {
                tracing::warn!("Cannot list reference folder {}: {}", folder.display(), e);
                return Vec::new();
            },
        };

        let mut files = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Error reading {}: {}", folder.display(), e);
                    break;
                },
            };
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            files.push(ReferenceFileInfo {
                display_name: display_name(&file_name),
                format: DocumentFormat::from_file_name(&file_name),
                size_bytes: meta.len(),
                file_name,
            });
        }
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        files
    }

    /// Extracted text of every readable reference file for `kind`.
    ///
    /// Unsupported, oversized or unreadable files are skipped with a warning;
    /// a broken reference file never fails a submission.
    pub async fn load(&self, kind: LetterKind) -> Vec<Document> {
        let Some(folder) = self.folder(kind) else {
            return Vec::new();
        };
        let files = self.list(kind).await;
        if files.is_empty() {
            return Vec::new();
        }

        let max_bytes = self.max_bytes;
        let task = tokio::task::spawn_blocking(move || {
            files.iter().filter_map(|file| read_reference(&folder, file, max_bytes)).collect::<Vec<_>>()
        });
        match task.await {
            Ok(documents) => {
                tracing::debug!("Loaded {} reference files for {}", documents.len(), kind);
                documents
            },
            Err(e) => {
                tracing::warn!("Reference file loading for {} failed: {}", kind, e);
                Vec::new()
            },
        }
    }
}

fn read_reference(folder: &Path, file: &ReferenceFileInfo, max_bytes: usize) -> Option<Document> {
    if !file.is_supported() {
        tracing::debug!("Skipping unsupported reference file {}", file.file_name);
        return None;
    }
    if file.size_bytes > max_bytes as u64 {
        tracing::warn!("Skipping reference file {}: larger than {} bytes", file.file_name, max_bytes);
        return None;
    }
    let path = folder.join(&file.file_name);
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Cannot read reference file {}: {}", path.display(), e);
            return None;
        },
    };
    match super::extract(file.display_name.clone(), &file.file_name, &bytes, max_bytes) {
        Ok(document) => Some(document),
        Err(e) => {
            tracing::warn!("Skipping reference file: {}", e);
            None
        },
    }
}

/// `sample_chair-letter.docx` → `Sample Chair Letter`.
fn display_name(file_name: &str) -> String {
    let stem = Path::new(file_name).file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
    label(stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::test_files;

    fn library_with(files: &[(&str, &[u8])]) -> (tempfile::TempDir, ReferenceLibrary) {
        let root = tempfile::tempdir().unwrap();
        let folder = root.path().join(LetterKind::ChairPromotion.page_slug());
        std::fs::create_dir_all(&folder).unwrap();
        for (name, bytes) in files {
            std::fs::write(folder.join(name), bytes).unwrap();
        }
        std::fs::create_dir(folder.join("drafts")).unwrap();
        let library = ReferenceLibrary::new(Some(root.path().to_path_buf()), 1024 * 1024);
        (root, library)
    }

    #[tokio::test]
    async fn test_list_sorted_with_metadata() {
        let (_root, library) = library_with(&[
            ("style_guide.txt", b"Use a formal tone."),
            ("budget.xlsx", b"\x00\x01"),
            ("sample-letter.docx", &test_files::docx("<w:p><w:r><w:t>Dear committee</w:t></w:r></w:p>")),
        ]);

        let files = library.list(LetterKind::ChairPromotion).await;
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, ["budget.xlsx", "sample-letter.docx", "style_guide.txt"]);
        assert_eq!(files[1].display_name, "Sample Letter");
        assert_eq!(files[1].type_label(), "Word Document");
        assert!(!files[0].is_supported());
        assert_eq!(files[2].size_bytes, 18);
    }

    #[tokio::test]
    async fn test_load_skips_unsupported_and_broken() {
        let (_root, library) = library_with(&[
            ("style_guide.txt", b"Use a formal tone."),
            ("budget.xlsx", b"\x00\x01"),
            ("broken.pdf", b"not a pdf"),
            ("sample-letter.docx", &test_files::docx("<w:p><w:r><w:t>Dear committee</w:t></w:r></w:p>")),
        ]);

        let docs = library.load(LetterKind::ChairPromotion).await;
        let labels: Vec<&str> = docs.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["Sample Letter", "Style Guide"]);
        assert_eq!(docs[0].text, "Dear committee");
        assert_eq!(docs[1].text, "Use a formal tone.");
    }

    #[tokio::test]
    async fn test_missing_folder_or_root_is_empty() {
        let (_root, library) = library_with(&[("style_guide.txt", b"x")]);
        assert!(library.list(LetterKind::PersonalStatement).await.is_empty());
        assert!(library.load(LetterKind::PersonalStatement).await.is_empty());

        let disabled = ReferenceLibrary::default();
        assert!(disabled.list(LetterKind::ChairPromotion).await.is_empty());
    }
}
