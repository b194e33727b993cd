//! Document loading: file path to page-level text blocks.
//!
//! PDFs yield one block per page. Text and markdown files are split into
//! pages on form feed (`\x0c`), so a plain-text export of a paged document
//! keeps its page boundaries.

use crate::types::{Metadata, PageText};
use docent_core::{AppError, AppResult};
use lopdf::{Dictionary, Document, Object};
use serde_json::Value;
use std::path::Path;

/// Document-info entries copied into page metadata, as (PDF key, metadata key).
const INFO_KEYS: [(&[u8], &str); 8] = [
    (b"Title", "title"),
    (b"Author", "author"),
    (b"Subject", "subject"),
    (b"Keywords", "keywords"),
    (b"Creator", "creator"),
    (b"Producer", "producer"),
    (b"CreationDate", "creationdate"),
    (b"ModDate", "moddate"),
];

/// Page separator for text sources.
pub const FORM_FEED: char = '\x0c';

/// Supported document kinds, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Markdown,
    Text,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("pdf") => Self::Pdf,
            Some("md") | Some("markdown") => Self::Markdown,
            _ => Self::Text,
        }
    }
}

/// Load a document as page-level text blocks.
///
/// Every block carries `source`, `page` (zero-based) and `total_pages`.
/// PDF blocks additionally carry the document-info keys, with `null` for
/// entries the file does not define.
pub fn load_document(path: &Path) -> AppResult<Vec<PageText>> {
    if !path.is_file() {
        return Err(AppError::Document(format!(
            "Document not found: {}",
            path.display()
        )));
    }

    let kind = DocumentKind::from_path(path);
    tracing::debug!("Loading {:?} document {}", kind, path.display());

    let pages = match kind {
        DocumentKind::Pdf => load_pdf(path)?,
        DocumentKind::Markdown => load_text(path, true)?,
        DocumentKind::Text => load_text(path, false)?,
    };

    tracing::info!("Loaded {} pages from {}", pages.len(), path.display());
    Ok(pages)
}

fn base_metadata(path: &Path, page: usize, total_pages: usize) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(
        "source".to_string(),
        Value::String(path.to_string_lossy().to_string()),
    );
    metadata.insert("page".to_string(), Value::from(page));
    metadata.insert("total_pages".to_string(), Value::from(total_pages));
    metadata
}

fn load_pdf(path: &Path) -> AppResult<Vec<PageText>> {
    let doc = Document::load(path).map_err(|e| {
        AppError::Document(format!("Failed to load PDF {}: {}", path.display(), e))
    })?;

    let info = info_dictionary(&doc);
    let pages = doc.get_pages();
    let total_pages = pages.len();

    let mut result = Vec::with_capacity(total_pages);
    for (index, page_number) in pages.keys().enumerate() {
        let text = match doc.extract_text(&[*page_number]) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("No extractable text on page {}: {}", page_number, e);
                String::new()
            }
        };

        let mut metadata = base_metadata(path, index, total_pages);
        for (pdf_key, key) in INFO_KEYS {
            metadata.insert(key.to_string(), info_value(info, pdf_key));
        }

        result.push(PageText::new(text, metadata));
    }

    Ok(result)
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn info_value(info: Option<&Dictionary>, key: &[u8]) -> Value {
    match info.and_then(|dict| dict.get(key).ok()) {
        Some(Object::String(bytes, _)) => Value::String(decode_pdf_string(bytes)),
        _ => Value::Null,
    }
}

/// Decode a PDF text string: UTF-16BE with BOM, else UTF-8, else Latin-1.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn load_text(path: &Path, markdown: bool) -> AppResult<Vec<PageText>> {
    let bytes = std::fs::read(path)?;

    if bytes.contains(&0) {
        return Err(AppError::Document(format!(
            "{} looks like a binary file",
            path.display()
        )));
    }

    let text = String::from_utf8(bytes).map_err(|e| {
        AppError::Document(format!("{} is not valid UTF-8: {}", path.display(), e))
    })?;

    let raw_pages: Vec<&str> = text.split(FORM_FEED).collect();
    let total_pages = raw_pages.len();

    Ok(raw_pages
        .into_iter()
        .enumerate()
        .map(|(index, page)| {
            let content = if markdown {
                clean_markdown(page)
            } else {
                page.to_string()
            };
            PageText::new(content, base_metadata(path, index, total_pages))
        })
        .collect())
}

/// Strip heading markers, fences and horizontal rules; keep paragraph breaks.
fn clean_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let trimmed = line.trim_start_matches('#').trim();

        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }

        result.push_str(trimmed);
        result.push('\n');
    }

    result.trim().to_string()
}
