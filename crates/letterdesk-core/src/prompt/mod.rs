//! Prompt construction.
//!
//! [`PromptBuilder::build`] is pure: no I/O, no clock, no randomness. Fields
//! are kept in a `BTreeMap` and documents arrive already extracted, so
//! identical input always renders identical text.

mod summary;
mod templates;

use std::fmt;

use letterdesk_types::{Document, LetterError, LetterFields, LetterKind};

pub use templates::{INSTRUCTIONS_KEY, RESERVED_KEYS};

/// Longest accepted value of a single field, in characters.
pub const MAX_FIELD_CHARS: usize = 20_000;

/// Most form fields accepted in one submission.
pub const MAX_FIELDS: usize = 100;

/// Longest document text embedded in a prompt, in characters.
pub const MAX_DOCUMENT_CHARS: usize = 50_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(String),
    #[error("field '{field}' exceeds {max} characters")]
    FieldTooLong { field: String, max: usize },
    #[error("too many fields (at most {max})")]
    TooManyFields { max: usize },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField(field) | Self::FieldTooLong { field, .. } => field,
            Self::TooManyFields { .. } => "fields",
        }
    }
}

impl From<ValidationError> for LetterError {
    fn from(err: ValidationError) -> Self {
        LetterError::InvalidInput { field: err.field().to_string(), message: err.to_string() }
    }
}

/// Rendered prompt, ready to send upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptText(String);

impl PromptText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PromptText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extracted documents that accompany a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachments {
    /// Server-side reference files for the letter page
    pub references: Vec<Document>,
    /// Files uploaded with the form
    pub uploads: Vec<Document>,
}

impl Attachments {
    pub fn is_empty(&self) -> bool {
        self.references.is_empty() && self.uploads.is_empty()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PromptBuilder;

impl PromptBuilder {
    /// Check required keys for `kind`, then render its template.
    pub fn build(
        kind: LetterKind,
        fields: &LetterFields,
        attachments: &Attachments,
    ) -> Result<PromptText, ValidationError> {
        validate(kind, fields)?;
        Ok(PromptText(templates::render(kind, fields, attachments)))
    }

    /// Organized Markdown overview of a submission; no upstream involved.
    pub fn summarize(
        kind: LetterKind,
        fields: &LetterFields,
        attachments: &Attachments,
    ) -> Result<String, ValidationError> {
        validate(kind, fields)?;
        Ok(summary::render(kind, fields, attachments))
    }
}

/// Non-blank trimmed value of `key`.
pub(crate) fn value<'a>(fields: &'a LetterFields, key: &str) -> Option<&'a str> {
    fields.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

pub fn validate(kind: LetterKind, fields: &LetterFields) -> Result<(), ValidationError> {
    if fields.len() > MAX_FIELDS {
        return Err(ValidationError::TooManyFields { max: MAX_FIELDS });
    }
    for key in kind.required_fields() {
        if value(fields, key).is_none() {
            return Err(ValidationError::MissingField((*key).to_string()));
        }
    }
    for (key, v) in fields {
        if v.chars().count() > MAX_FIELD_CHARS {
            return Err(ValidationError::FieldTooLong { field: key.clone(), max: MAX_FIELD_CHARS });
        }
    }
    Ok(())
}

/// First `max` characters of `text`, marked when cut.
pub(crate) fn truncate(text: &str, max: usize) -> std::borrow::Cow<'_, str> {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}... [truncated]", &text[..end]).into(),
        None => text.into(),
    }
}

/// `target_rank` → `Target Rank`.
pub fn label(key: &str) -> String {
    key.split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> LetterFields {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    fn none() -> Attachments {
        Attachments::default()
    }

    fn doc(label: &str, text: &str) -> Document {
        Document {
            label: label.to_string(),
            format: letterdesk_types::DocumentFormat::Txt,
            text: text.to_string(),
            page_count: None,
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let f = fields(&[
            ("name", "A. Lee"),
            ("field", "biology"),
            ("awards", "NSF CAREER"),
            ("hobby", "rowing"),
        ]);
        let first = PromptBuilder::build(LetterKind::PersonalStatement, &f, &none()).unwrap();
        let second = PromptBuilder::build(LetterKind::PersonalStatement, &f.clone(), &none()).unwrap();
        assert_eq!(first.as_str().as_bytes(), second.as_str().as_bytes());
    }

    #[test]
    fn test_missing_name_for_chair_promotion() {
        let f = fields(&[("department", "Physics"), ("target_rank", "Professor")]);
        let err = PromptBuilder::build(LetterKind::ChairPromotion, &f, &none()).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("name".to_string()));
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn test_every_required_key_is_enforced() {
        for kind in LetterKind::ALL {
            let complete: LetterFields = kind
                .required_fields()
                .iter()
                .map(|k| ((*k).to_string(), "value".to_string()))
                .collect();
            assert!(PromptBuilder::build(kind, &complete, &none()).is_ok());

            for missing in kind.required_fields() {
                let mut partial = complete.clone();
                partial.remove(*missing);
                let err = PromptBuilder::build(kind, &partial, &none()).unwrap_err();
                assert_eq!(err.field(), *missing, "kind {}", kind);
            }
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let f = fields(&[("name", "   "), ("field", "biology")]);
        let err = PromptBuilder::build(LetterKind::PersonalStatement, &f, &none()).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("name".to_string()));
    }

    #[test]
    fn test_field_too_long() {
        let long = "x".repeat(MAX_FIELD_CHARS + 1);
        let f = fields(&[("name", "A. Lee"), ("field", "biology"), ("research", &long)]);
        let err = PromptBuilder::build(LetterKind::PersonalStatement, &f, &none()).unwrap_err();
        assert_eq!(err.field(), "research");
    }

    #[test]
    fn test_prompt_embeds_fields() {
        let f = fields(&[
            ("name", "Dr. Rivera"),
            ("department", "Chemistry"),
            ("target_rank", "Full Professor"),
            ("achievements", "42 papers"),
            ("grant_total", "$3.1M"),
            ("instructions", "Keep it under one page."),
            ("page_type", "claude-call"),
        ]);
        let prompt = PromptBuilder::build(LetterKind::ChairPromotion, &f, &none()).unwrap().into_inner();
        assert!(prompt.contains("Dr. Rivera"));
        assert!(prompt.contains("Department: Chemistry"));
        assert!(prompt.contains("Achievements: 42 papers"));
        assert!(prompt.contains("Grant Total: $3.1M"));
        assert!(prompt.trim_end().ends_with("Keep it under one page."));
        assert!(!prompt.contains("claude-call"));
    }

    #[test]
    fn test_kinds_render_differently() {
        let f = fields(&[
            ("name", "A. Lee"),
            ("field", "biology"),
            ("department", "Biology"),
            ("target_rank", "Associate Professor"),
        ]);
        let chair = PromptBuilder::build(LetterKind::ChairPromotion, &f, &none()).unwrap();
        let faculty = PromptBuilder::build(LetterKind::FacultyPromotion, &f, &none()).unwrap();
        let statement = PromptBuilder::build(LetterKind::PersonalStatement, &f, &none()).unwrap();
        assert_ne!(chair, faculty);
        assert_ne!(faculty, statement);
    }

    #[test]
    fn test_too_many_fields() {
        let mut f = fields(&[("name", "A. Lee"), ("field", "biology")]);
        for i in 0..MAX_FIELDS {
            f.insert(format!("extra_{}", i), "x".to_string());
        }
        let err = PromptBuilder::build(LetterKind::PersonalStatement, &f, &none()).unwrap_err();
        assert_eq!(err, ValidationError::TooManyFields { max: MAX_FIELDS });
    }

    #[test]
    fn test_documents_embedded_in_order() {
        let f = fields(&[("name", "A. Lee"), ("field", "biology"), ("instructions", "Be brief.")]);
        let attachments = Attachments {
            references: vec![doc("Sample Letter", "Dear committee, ...")],
            uploads: vec![doc("cv", "Publications: 12")],
        };
        let prompt = PromptBuilder::build(LetterKind::PersonalStatement, &f, &attachments)
            .unwrap()
            .into_inner();

        let references = prompt.find("=== REFERENCE MATERIALS ===").unwrap();
        let uploads = prompt.find("=== UPLOADED DOCUMENTS ===").unwrap();
        assert!(references < uploads);
        assert!(prompt.contains("--- SAMPLE LETTER ---\nDear committee, ..."));
        assert!(prompt.contains("--- CV ---\nPublications: 12"));
        assert!(prompt.trim_end().ends_with("Be brief."));

        let plain = PromptBuilder::build(LetterKind::PersonalStatement, &f, &none()).unwrap();
        assert!(!plain.as_str().contains("REFERENCE MATERIALS"));
        assert!(!plain.as_str().contains("UPLOADED DOCUMENTS"));
    }

    #[test]
    fn test_long_document_truncated() {
        let f = fields(&[("name", "A. Lee"), ("field", "biology")]);
        let attachments = Attachments {
            uploads: vec![doc("cv", &"é".repeat(MAX_DOCUMENT_CHARS + 10))],
            ..Attachments::default()
        };
        let prompt = PromptBuilder::build(LetterKind::PersonalStatement, &f, &attachments).unwrap();
        assert!(prompt.as_str().contains("... [truncated]"));
        assert!(!prompt.as_str().contains(&"é".repeat(MAX_DOCUMENT_CHARS + 1)));
    }

    #[test]
    fn test_label() {
        assert_eq!(label("target_rank"), "Target Rank");
        assert_eq!(label("chair-name"), "Chair Name");
        assert_eq!(label("GPA"), "Gpa");
        assert_eq!(label("teaching eval"), "Teaching Eval");
    }
}
