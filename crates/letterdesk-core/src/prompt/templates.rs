//! Kind-specific prompt skeletons.

use std::fmt::Write;

use letterdesk_types::{Document, LetterFields, LetterKind};

use super::{label, truncate, value, Attachments, MAX_DOCUMENT_CHARS};

/// Free-text guidance appended after the data sections.
pub const INSTRUCTIONS_KEY: &str = "instructions";

/// Form plumbing that never reaches the prompt as data.
pub const RESERVED_KEYS: [&str; 3] = [INSTRUCTIONS_KEY, "page_type", "page_title"];

struct Skeleton {
    role: &'static str,
    task: &'static str,
    closing: &'static str,
}

fn skeleton(kind: LetterKind) -> Skeleton {
    match kind {
        LetterKind::ChairPromotion => Skeleton {
            role: "You are a department chair writing a formal letter to the promotion and tenure committee.",
            task: "Write a promotion recommendation letter, from the chair, for the candidate described below.",
            closing: "Sign the letter as the department chair. Use a formal academic register.",
        },
        LetterKind::FacultyPromotion => Skeleton {
            role: "You are a senior faculty colleague writing a formal letter of support.",
            task: "Write a faculty letter of support for the promotion of the candidate described below.",
            closing: "Sign the letter as the writer named above, or as a faculty colleague if none is given.",
        },
        LetterKind::PersonalStatement => Skeleton {
            role: "You are helping an academic draft their own personal statement.",
            task: "Write a first-person personal statement for the candidate described below.",
            closing: "Write in the first person. Keep claims grounded in the details provided.",
        },
    }
}

pub(super) fn render(kind: LetterKind, fields: &LetterFields, attachments: &Attachments) -> String {
    let sk = skeleton(kind);
    let mut out = String::new();

    let _ = writeln!(out, "{}", sk.role);
    let _ = writeln!(out, "{}", sk.task);
    out.push('\n');

    let _ = writeln!(out, "=== CANDIDATE ===");
    let known = kind.required_fields().iter().chain(kind.optional_fields());
    for key in known.clone() {
        if let Some(v) = value(fields, key) {
            let _ = writeln!(out, "{}: {}", label(key), v);
        }
    }

    let extra: Vec<(&String, &str)> = fields
        .iter()
        .filter(|(k, _)| {
            !RESERVED_KEYS.contains(&k.as_str()) && !known.clone().any(|field| *field == k.as_str())
        })
        .filter_map(|(k, _)| value(fields, k).map(|v| (k, v)))
        .collect();

    if !extra.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "=== ADDITIONAL INFORMATION ===");
        for (k, v) in extra {
            let _ = writeln!(out, "{}: {}", label(k), v);
        }
    }

    documents(&mut out, "REFERENCE MATERIALS", &attachments.references);
    documents(&mut out, "UPLOADED DOCUMENTS", &attachments.uploads);

    out.push('\n');
    let _ = writeln!(out, "{}", sk.closing);

    if let Some(instructions) = value(fields, INSTRUCTIONS_KEY) {
        out.push('\n');
        let _ = writeln!(out, "{}", instructions);
    }

    out
}

fn documents(out: &mut String, heading: &str, docs: &[Document]) {
    if docs.is_empty() {
        return;
    }
    out.push('\n');
    let _ = writeln!(out, "=== {} ===", heading);
    for doc in docs {
        out.push('\n');
        let _ = writeln!(out, "--- {} ---", doc.label.to_uppercase());
        let _ = writeln!(out, "{}", truncate(doc.text.trim(), MAX_DOCUMENT_CHARS));
    }
}
