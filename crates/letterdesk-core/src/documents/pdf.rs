//! Text layer of a PDF, page by page.

pub(super) struct PdfText {
    pub text: String,
    pub page_count: usize,
}

pub(super) fn extract_text(bytes: &[u8]) -> Result<PdfText, String> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| format!("not a readable PDF: {}", e))?;
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();

    let mut sections = Vec::new();
    for number in &pages {
        match doc.extract_text(&[*number]) {
            Ok(text) if !text.trim().is_empty() => {
                sections.push(format!("--- Page {} ---\n{}", number, text.trim()));
            },
            Ok(_) => {},
            Err(e) => tracing::warn!("Skipping unreadable PDF page {}: {}", number, e),
        }
    }

    if sections.is_empty() {
        return Err("no text could be extracted from the PDF".to_string());
    }
    Ok(PdfText { text: sections.join("\n"), page_count: pages.len() })
}
