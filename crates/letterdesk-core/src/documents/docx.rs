//! Body text of a Word (`.docx`) package.
//!
//! Reads `word/document.xml` from the zip container. Paragraphs become lines;
//! table rows become one line with cells joined by ` | `.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

const DOCUMENT_XML: &str = "word/document.xml";

/// Decompressed size cap for the body part.
const MAX_BODY_XML_BYTES: u64 = 64 * 1024 * 1024;

pub(super) fn extract_text(bytes: &[u8]) -> Result<String, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| format!("not a Word document: {}", e))?;
    let body = archive
        .by_name(DOCUMENT_XML)
        .map_err(|_| "Word document has no body part".to_string())?;

    let mut xml = String::new();
    body.take(MAX_BODY_XML_BYTES)
        .read_to_string(&mut xml)
        .map_err(|e| format!("unreadable document body: {}", e))?;
    body_text(&xml)
}

fn body_text(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut lines: Vec<String> = Vec::new();
    let mut paragraph = String::new();
    let mut cell = String::new();
    let mut row: Vec<String> = Vec::new();
    let mut table_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"tbl" => table_depth += 1,
                _ => {},
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => paragraph.push('\t'),
                b"br" | b"cr" => paragraph.push('\n'),
                _ => {},
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| format!("malformed document text: {}", e))?;
                paragraph.push_str(&text);
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let text = paragraph.trim();
                    if !text.is_empty() {
                        if table_depth > 0 {
                            if !cell.is_empty() {
                                cell.push(' ');
                            }
                            cell.push_str(text);
                        } else {
                            lines.push(text.to_string());
                        }
                    }
                    paragraph.clear();
                },
                b"tc" => {
                    if !cell.is_empty() {
                        row.push(std::mem::take(&mut cell));
                    }
                },
                b"tr" => {
                    if !row.is_empty() {
                        lines.push(row.join(" | "));
                        row.clear();
                    }
                },
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {},
            },
            Ok(Event::Eof) => break,
            Ok(_) => {},
            Err(e) => {
                return Err(format!("malformed document XML at {}: {}", reader.buffer_position(), e))
            },
        }
    }

    Ok(lines.join("\n"))
}
