//! PDF text extraction.
//!
//! Parsing runs on the blocking pool: pdf-extract is CPU bound and may panic on
//! malformed font programs, which surfaces here as a join error instead of
//! taking the worker thread down.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use lopdf::{Document, Object};
use studybuddy_core::ExtractedDocument;

/// PDF magic bytes
const PDF_MAGIC: &[u8] = b"%PDF-";

/// How far into the file the header may start
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Turns binary document content into plain text plus page count and metadata.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, data: Bytes) -> Result<ExtractedDocument>;
}

/// Local extractor backed by pdf-extract (text) and lopdf (structure, info dictionary)
#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    max_pages: usize,
}

impl PdfTextExtractor {
    pub fn new(max_pages: usize) -> Self {
        Self { max_pages }
    }

    fn extract_blocking(data: &[u8], max_pages: usize) -> Result<ExtractedDocument> {
        let offset = header_offset(data)
            .context("Invalid file header: expected a PDF document")?;
        // Cross-reference offsets count from the header, not from the first byte
        let data = &data[offset..];

        let doc = Document::load_mem(data).context("Failed to load PDF structure")?;
        let page_count = doc.get_pages().len();
        if page_count > max_pages {
            anyhow::bail!(
                "PDF has {} pages, exceeding the maximum of {}",
                page_count,
                max_pages
            );
        }

        let metadata = read_info_dictionary(&doc);
        let text = pdf_extract::extract_text_from_mem(data).context("Failed to extract text")?;

        Ok(ExtractedDocument {
            text,
            page_count,
            metadata,
        })
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, data: Bytes) -> Result<ExtractedDocument> {
        let max_pages = self.max_pages;
        let size = data.len();

        let document = tokio::task::spawn_blocking(move || Self::extract_blocking(&data, max_pages))
            .await
            .context("PDF extraction task failed")??;

        if document.is_blank() {
            tracing::warn!(
                size_bytes = size,
                pages = document.page_count,
                "No text extracted from PDF (scanned or image-only document?)"
            );
        } else {
            tracing::debug!(
                size_bytes = size,
                pages = document.page_count,
                chars = document.text.len(),
                "PDF text extracted"
            );
        }

        Ok(document)
    }
}

/// Position of `%PDF-` within the first [`HEADER_SEARCH_WINDOW`] bytes
fn header_offset(data: &[u8]) -> Option<usize> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW + PDF_MAGIC.len())];
    window
        .windows(PDF_MAGIC.len())
        .position(|candidate| candidate == PDF_MAGIC)
        .filter(|&offset| offset < HEADER_SEARCH_WINDOW)
}

/// Collect the trailer's Info dictionary as string pairs, skipping non-string values
fn read_info_dictionary(doc: &Document) -> BTreeMap<String, String> {
    let mut info = BTreeMap::new();

    let Ok(entry) = doc.trailer.get(b"Info") else {
        return info;
    };
    let dict = match entry {
        Object::Reference(id) => match doc.get_dictionary(*id) {
            Ok(dict) => dict,
            Err(_) => return info,
        },
        Object::Dictionary(dict) => dict,
        _ => return info,
    };

    for (key, value) in dict.iter() {
        if let Object::String(bytes, _) = value {
            let text = decode_text_string(bytes);
            if !text.is_empty() {
                info.insert(String::from_utf8_lossy(key).into_owned(), text);
            }
        }
    }

    info
}

/// Decode a PDF text string: UTF-16BE when it carries a BOM, otherwise byte-wise
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFEu8, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
