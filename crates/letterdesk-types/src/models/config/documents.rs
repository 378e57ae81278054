//! Upload and reference file settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Where reference files live and how large a single document may be.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct DocumentsConfig {
    /// Root of the per-page reference folders (`<dir>/<page-slug>/`); unset disables them
    #[serde(default)]
    pub reference_dir: Option<PathBuf>,
    /// Largest accepted upload or reference file, in bytes
    #[validate(range(min = 1_usize))]
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self { reference_dir: None, max_document_bytes: default_max_document_bytes() }
    }
}

pub const fn default_max_document_bytes() -> usize {
    10 * 1024 * 1024
}
