//! Markdown overview of a submission, rendered without calling upstream.

use std::fmt::Write;

use letterdesk_types::{Document, LetterFields, LetterKind};

use super::templates::RESERVED_KEYS;
use super::{label, truncate, value, Attachments};

/// Characters of each document shown in the overview.
const PREVIEW_CHARS: usize = 500;

pub(super) fn render(kind: LetterKind, fields: &LetterFields, attachments: &Attachments) -> String {
    let title = value(fields, "page_title").unwrap_or(kind.title());
    let mut out = String::new();

    let _ = writeln!(out, "# {}", title);
    out.push('\n');
    let _ = writeln!(out, "## Submitted Information");
    out.push('\n');

    let mut completed = 0usize;
    for (key, _) in fields.iter().filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str())) {
        if let Some(v) = value(fields, key) {
            let _ = writeln!(out, "**{}:** {}", label(key), v);
            completed += 1;
        }
    }

    let missing_optional: Vec<String> = kind
        .optional_fields()
        .iter()
        .filter(|k| value(fields, k).is_none())
        .map(|k| label(k))
        .collect();

    previews(&mut out, "Reference Materials", &attachments.references);
    previews(&mut out, "Uploaded Documents", &attachments.uploads);

    out.push('\n');
    let _ = writeln!(out, "## Summary");
    out.push('\n');
    let _ = writeln!(out, "- **Letter Type:** {}", kind.title());
    let _ = writeln!(out, "- **Form Fields Completed:** {}", completed);
    let _ = writeln!(out, "- **Files Uploaded:** {}", attachments.uploads.len());
    let _ = writeln!(out, "- **Reference Files Loaded:** {}", attachments.references.len());
    if !missing_optional.is_empty() {
        let _ = writeln!(out, "- **Optional Fields Not Provided:** {}", missing_optional.join(", "));
    }

    out
}

fn previews(out: &mut String, heading: &str, docs: &[Document]) {
    if docs.is_empty() {
        return;
    }
    out.push('\n');
    let _ = writeln!(out, "## {}", heading);
    for doc in docs {
        out.push('\n');
        match doc.page_count {
            Some(pages) => {
                let _ = writeln!(
                    out,
                    "### {} ({}, {} pages)",
                    label(&doc.label),
                    doc.format.display_name(),
                    pages
                );
            },
            None => {
                let _ = writeln!(out, "### {} ({})", label(&doc.label), doc.format.display_name());
            },
        }
        out.push('\n');
        let _ = writeln!(out, "{}", truncate(doc.text.trim(), PREVIEW_CHARS));
    }
}
