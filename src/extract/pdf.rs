//! Direct (non-OCR) PDF text extraction.
//!
//! Two extractors run in order: pdf-extract first (layout-aware, best output
//! on well-formed files), then a permissive lopdf page walk for files the
//! first one chokes on. Both failing is not an error here; the caller
//! escalates to OCR.

use super::SourceStage;

/// Extractable text shorter than this marks a PDF as a probable scan.
pub const SCAN_TEXT_FLOOR: usize = 50;

/// Extract text from PDF bytes through the direct-extractor chain.
///
/// Returns the text plus the stage that produced it; empty text with
/// [`SourceStage::Empty`] when both extractors fail.
pub fn extract_direct(bytes: &[u8]) -> (String, SourceStage) {
    match try_pdf_extract(bytes) {
        Some(text) if !text.trim().is_empty() => {
            tracing::debug!(chars = text.chars().count(), "pdf-extract succeeded");
            return (text, SourceStage::PdfLayout);
        }
        _ => {}
    }

    match try_lopdf(bytes) {
        Some(text) if !text.trim().is_empty() => {
            tracing::debug!(chars = text.chars().count(), "lopdf fallback succeeded");
            (text, SourceStage::PdfStructural)
        }
        _ => {
            tracing::debug!("no direct text extracted, PDF is probably a scan");
            (String::new(), SourceStage::Empty)
        }
    }
}

/// Whether a direct extraction result looks like a scanned document.
pub fn looks_scanned(text: &str) -> bool {
    text.trim().chars().count() < SCAN_TEXT_FLOOR
}

fn try_pdf_extract(bytes: &[u8]) -> Option<String> {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::debug!(error = %e, "pdf-extract failed");
            None
        }
    }
}

fn try_lopdf(bytes: &[u8]) -> Option<String> {
    let doc = match lopdf::Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::debug!(error = %e, "lopdf load failed");
            return None;
        }
    };

    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    if pages.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::with_capacity(pages.len());
    for page in pages {
        match doc.extract_text(&[page]) {
            Ok(text) => parts.push(text),
            Err(e) => {
                tracing::debug!(page, error = %e, "lopdf text extraction failed for page");
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_yield_empty_not_panic() {
        let (text, stage) = extract_direct(b"definitely not a pdf");
        assert!(text.is_empty());
        assert_eq!(stage, SourceStage::Empty);
    }

    #[test]
    fn truncated_pdf_header_yields_empty() {
        let (text, stage) = extract_direct(b"%PDF-1.4\n1 0 obj\n<< broken");
        assert!(text.is_empty());
        assert_eq!(stage, SourceStage::Empty);
    }

    #[test]
    fn scan_floor_boundary() {
        assert!(looks_scanned(""));
        assert!(looks_scanned("short fragment"));
        assert!(!looks_scanned(&"a".repeat(SCAN_TEXT_FLOOR)));
    }
}
