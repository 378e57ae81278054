//! Letter kinds, submitted fields and generation results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::document::Upload;
use crate::error::LetterError;

/// Submitted form fields. Ordered so prompts are deterministic.
pub type LetterFields = BTreeMap<String, String>;

/// Outcome of a generation call.
pub type LetterResult = Result<GeneratedLetter, LetterError>;

/// The three supported letter pages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum LetterKind {
    /// Letter from a department chair supporting a promotion case
    ChairPromotion,
    /// Letter from a faculty colleague supporting a promotion case
    FacultyPromotion,
    /// Candidate's own personal statement
    PersonalStatement,
}

impl LetterKind {
    pub const ALL: [LetterKind; 3] =
        [Self::ChairPromotion, Self::FacultyPromotion, Self::PersonalStatement];

    /// snake_case name used in the API and store keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChairPromotion => "chair_promotion",
            Self::FacultyPromotion => "faculty_promotion",
            Self::PersonalStatement => "personal_statement",
        }
    }

    /// URL path segment of the form page.
    pub fn page_slug(&self) -> &'static str {
        match self {
            Self::ChairPromotion => "chairs-promotion-letter",
            Self::FacultyPromotion => "faculty-promotion-letter",
            Self::PersonalStatement => "personal-statement",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::ChairPromotion => "Chair's Promotion Letter",
            Self::FacultyPromotion => "Faculty Promotion Letter",
            Self::PersonalStatement => "Personal Statement",
        }
    }

    /// Fields that must be present and non-blank, in the order they are checked.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::ChairPromotion | Self::FacultyPromotion => &["name", "department", "target_rank"],
            Self::PersonalStatement => &["name", "field"],
        }
    }

    /// Known optional fields, rendered in the candidate section when present.
    pub fn optional_fields(&self) -> &'static [&'static str] {
        match self {
            Self::ChairPromotion => {
                &["current_rank", "institution", "chair_name", "achievements", "teaching", "service"]
            }
            Self::FacultyPromotion => {
                &["current_rank", "institution", "writer_name", "relationship", "achievements"]
            }
            Self::PersonalStatement => {
                &["current_rank", "target_rank", "research", "teaching", "service", "goals"]
            }
        }
    }
}

impl fmt::Display for LetterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LetterKind {
    type Err = LetterError;

    /// Accepts `chair_promotion`, `chair-promotion` or the page slug.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized || k.page_slug() == s.trim())
            .ok_or_else(|| LetterError::InvalidInput {
                field: "kind".to_string(),
                message: format!("unknown letter kind '{}'", s),
            })
    }
}

/// One submission of a letter form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterRequest {
    pub kind: LetterKind,
    pub fields: LetterFields,
    /// Files from a multipart submission, not yet extracted
    pub uploads: Vec<Upload>,
}

impl LetterRequest {
    pub fn new(kind: LetterKind, fields: LetterFields) -> Self {
        Self { kind, fields, uploads: Vec::new() }
    }

    pub fn with_uploads(mut self, uploads: Vec<Upload>) -> Self {
        self.uploads = uploads;
        self
    }
}

/// Successful generation output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedLetter {
    pub kind: LetterKind,
    pub text: String,
    /// Upstream model that produced the text; `None` for local summaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_all_spellings() {
        assert_eq!("chair_promotion".parse::<LetterKind>(), Ok(LetterKind::ChairPromotion));
        assert_eq!("faculty-promotion".parse::<LetterKind>(), Ok(LetterKind::FacultyPromotion));
        assert_eq!(
            "chairs-promotion-letter".parse::<LetterKind>(),
            Ok(LetterKind::ChairPromotion)
        );
        assert_eq!("Personal_Statement".parse::<LetterKind>(), Ok(LetterKind::PersonalStatement));
    }

    #[test]
    fn test_parse_unknown_kind() {
        let err = "tenure_review".parse::<LetterKind>().unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_page_slug_roundtrip() {
        for kind in LetterKind::ALL {
            assert_eq!(kind.page_slug().parse::<LetterKind>(), Ok(kind));
        }
        assert!("favicon.ico".parse::<LetterKind>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&LetterKind::PersonalStatement).unwrap();
        assert_eq!(json, "\"personal_statement\"");
    }
}
