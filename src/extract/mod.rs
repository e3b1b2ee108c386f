//! Extraction-fallback engine.
//!
//! Turns raw document bytes into plain text through an ordered chain of
//! strategies: direct PDF extraction, then OCR for scans and images, then
//! charset decoding for everything else. The engine is total: malformed
//! input degrades to empty text, it never errors.

pub mod pdf;

use crate::backends::OcrEngine;
use crate::utils::mime::MediaKind;

/// Raw document bytes plus the media kind inferred from the storage key.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub kind: MediaKind,
}

impl RawDocument {
    pub fn new(bytes: Vec<u8>, storage_key: &str) -> Self {
        Self {
            kind: MediaKind::from_storage_key(storage_key),
            bytes,
        }
    }
}

/// Which strategy produced the final text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStage {
    /// Layout-aware PDF extractor.
    PdfLayout,
    /// Permissive structural PDF extractor.
    PdfStructural,
    /// Optical character recognition.
    Ocr,
    /// Charset decode of plain bytes.
    PlainDecode,
    /// No stage produced text.
    Empty,
}

impl SourceStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PdfLayout => "pdf_layout",
            Self::PdfStructural => "pdf_structural",
            Self::Ocr => "ocr",
            Self::PlainDecode => "plain_decode",
            Self::Empty => "empty",
        }
    }
}

/// Extraction result. `ocr_text` is populated only when OCR actually ran;
/// `text` is the best available candidate and may be empty.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub ocr_text: Option<String>,
    pub stage: SourceStage,
}

impl ExtractedText {
    fn empty() -> Self {
        Self {
            text: String::new(),
            ocr_text: None,
            stage: SourceStage::Empty,
        }
    }
}

/// Run the extraction-fallback chain over a raw document.
///
/// PDF: direct extraction first; blank or scan-short output escalates to
/// OCR, whose text then wins. Image: OCR directly. Plain/unknown: UTF-8
/// decode with a Latin-1 superset fallback. Never errors.
pub async fn extract_text(raw: RawDocument, ocr: &dyn OcrEngine) -> ExtractedText {
    match raw.kind {
        MediaKind::Pdf => extract_pdf(raw.bytes, ocr).await,
        MediaKind::Image => extract_image(raw.bytes, ocr).await,
        MediaKind::Plain | MediaKind::Unknown => decode_plain(&raw.bytes),
    }
}

async fn extract_pdf(bytes: Vec<u8>, ocr: &dyn OcrEngine) -> ExtractedText {
    // PDF parsing is CPU-heavy; keep it off the async loop.
    let (bytes, direct_text, direct_stage) =
        match tokio::task::spawn_blocking(move || {
            let (text, stage) = pdf::extract_direct(&bytes);
            (bytes, text, stage)
        })
        .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "PDF extraction task failed");
                return ExtractedText::empty();
            }
        };

    if !pdf::looks_scanned(&direct_text) {
        return ExtractedText {
            text: direct_text,
            ocr_text: None,
            stage: direct_stage,
        };
    }

    match ocr.ocr_pdf(&bytes).await {
        Ok(outcome) => {
            let ocr_text = outcome.text;
            if ocr_text.trim().is_empty() {
                // OCR ran but found nothing; keep whatever direct text existed.
                ExtractedText {
                    text: direct_text,
                    ocr_text: Some(ocr_text),
                    stage: direct_stage,
                }
            } else {
                ExtractedText {
                    text: ocr_text.clone(),
                    ocr_text: Some(ocr_text),
                    stage: SourceStage::Ocr,
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "OCR escalation failed, keeping direct text");
            ExtractedText {
                text: direct_text,
                ocr_text: None,
                stage: direct_stage,
            }
        }
    }
}

async fn extract_image(bytes: Vec<u8>, ocr: &dyn OcrEngine) -> ExtractedText {
    match ocr.ocr_image(&bytes).await {
        Ok(outcome) => ExtractedText {
            text: outcome.text.clone(),
            ocr_text: Some(outcome.text),
            stage: SourceStage::Ocr,
        },
        Err(e) => {
            tracing::warn!(error = %e, "image OCR failed");
            ExtractedText::empty()
        }
    }
}

fn decode_plain(bytes: &[u8]) -> ExtractedText {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        // Latin-1 superset decode: every byte maps to its code point.
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    };

    let stage = if text.trim().is_empty() {
        SourceStage::Empty
    } else {
        SourceStage::PlainDecode
    };
    ExtractedText {
        text,
        ocr_text: None,
        stage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::SimulatedOcr;

    #[tokio::test]
    async fn plain_utf8_decodes_directly() {
        let ocr = SimulatedOcr::new("eng");
        let raw = RawDocument::new("hello world".as_bytes().to_vec(), "notes.txt");
        let result = extract_text(raw, &ocr).await;
        assert_eq!(result.text, "hello world");
        assert_eq!(result.stage, SourceStage::PlainDecode);
        assert!(result.ocr_text.is_none());
    }

    #[tokio::test]
    async fn invalid_utf8_falls_back_to_latin1() {
        let ocr = SimulatedOcr::new("eng");
        // 0xE9 is 'é' in Latin-1 and invalid standalone UTF-8.
        let raw = RawDocument::new(vec![b'c', b'a', b'f', 0xE9], "notes.txt");
        let result = extract_text(raw, &ocr).await;
        assert_eq!(result.text, "café");
        assert_eq!(result.stage, SourceStage::PlainDecode);
    }

    #[tokio::test]
    async fn empty_bytes_yield_empty_text_without_error() {
        let ocr = SimulatedOcr::new("eng");
        let raw = RawDocument::new(Vec::new(), "blob.bin");
        let result = extract_text(raw, &ocr).await;
        assert!(result.text.is_empty());
        assert_eq!(result.stage, SourceStage::Empty);
    }

    #[tokio::test]
    async fn scanned_pdf_escalates_to_ocr() {
        // Garbage PDF bytes produce no direct text, firing the scan heuristic.
        let ocr = SimulatedOcr::new("eng");
        let raw = RawDocument::new(b"%PDF-1.4 scanned garbage".to_vec(), "scan.pdf");
        let result = extract_text(raw, &ocr).await;
        assert_eq!(result.stage, SourceStage::Ocr);
        let ocr_text = result.ocr_text.expect("ocr text populated");
        assert_eq!(result.text, ocr_text);
        assert!(!ocr_text.is_empty());
    }

    #[tokio::test]
    async fn image_ocr_mirrors_text_into_both_fields() {
        let ocr = SimulatedOcr::new("eng");
        let raw = RawDocument::new(vec![0u8; 16], "page.png");
        let result = extract_text(raw, &ocr).await;
        assert_eq!(result.stage, SourceStage::Ocr);
        assert_eq!(Some(result.text.clone()), result.ocr_text);
    }

    #[tokio::test]
    async fn extraction_is_total_over_arbitrary_inputs() {
        let ocr = SimulatedOcr::new("eng");
        let inputs: Vec<(Vec<u8>, &str)> = vec![
            (vec![0xFF, 0xFE, 0x00], "weird.bin"),
            (b"%PDF".to_vec(), "broken.pdf"),
            (vec![], "empty.png"),
            (vec![0x00; 64], "zeros.txt"),
        ];
        for (bytes, key) in inputs {
            let raw = RawDocument::new(bytes, key);
            // Must return, never panic or error.
            let _ = extract_text(raw, &ocr).await;
        }
    }
}
