//! OCR backends.
//!
//! The real backend shells out to Tesseract (and pdftoppm for PDF page
//! rendering), the way traditional OCR deployments run it. The simulated
//! backend returns fixed, recognizable text so downstream stages always have
//! something to work with.

use std::path::{Path, PathBuf};
use std::process::Command;

use async_trait::async_trait;
use tempfile::TempDir;

use super::{BackendError, BackendMode, OcrEngine};
use crate::models::OcrOutcome;

/// Render DPI for PDF pages before OCR.
const PDF_RENDER_DPI: &str = "300";

/// Simulated OCR backend with deterministic output.
pub struct SimulatedOcr {
    language: String,
}

impl SimulatedOcr {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }
}

#[async_trait]
impl OcrEngine for SimulatedOcr {
    fn mode(&self) -> BackendMode {
        BackendMode::Simulated
    }

    async fn ocr_image(&self, _bytes: &[u8]) -> Result<OcrOutcome, BackendError> {
        Ok(OcrOutcome {
            text: "SCANNED DOCUMENT\n\
                   Registry and Records Office\n\n\
                   Subject: scanned page processed by the simulated OCR backend.\n\
                   No recognition model was invoked for this content.\n"
                .to_string(),
            pages: 1,
            confidence: 0.92,
            language: short_code(&self.language),
        })
    }

    async fn ocr_pdf(&self, _bytes: &[u8]) -> Result<OcrOutcome, BackendError> {
        Ok(OcrOutcome {
            text: "Page 1 - Document header and reference block.\n\
                   Subject: simulated OCR output for a scanned PDF.\n\n\
                   Page 2 - Document body.\n\
                   Content produced by the simulated OCR backend for testing.\n"
                .to_string(),
            pages: 2,
            confidence: 0.88,
            language: short_code(&self.language),
        })
    }
}

/// Tesseract-based OCR backend.
pub struct TesseractOcr {
    language: String,
}

impl TesseractOcr {
    pub fn new(language: String) -> Self {
        Self { language }
    }

    /// Both binaries are needed: tesseract for recognition, pdftoppm for
    /// rendering scanned PDF pages.
    pub fn is_available() -> bool {
        which::which("tesseract").is_ok() && which::which("pdftoppm").is_ok()
    }

    pub fn availability_hint() -> &'static str {
        if which::which("tesseract").is_err() {
            "tesseract not found (install tesseract-ocr)"
        } else if which::which("pdftoppm").is_err() {
            "pdftoppm not found (install poppler-utils)"
        } else {
            "tesseract is available"
        }
    }

    fn run_tesseract(image_path: &Path, language: &str) -> Result<String, BackendError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", language])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(BackendError::Api(format!("tesseract failed: {}", stderr)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BackendError::Unavailable(
                "tesseract not found (install tesseract-ocr)".to_string(),
            )),
            Err(e) => Err(BackendError::Io(e)),
        }
    }

    /// Render every page of a PDF to PNG images, sorted by page order.
    fn render_pdf_pages(pdf_path: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, BackendError> {
        let status = Command::new("pdftoppm")
            .args(["-png", "-r", PDF_RENDER_DPI])
            .arg(pdf_path)
            .arg(output_dir.join("page"))
            .status();

        match status {
            Ok(s) if s.success() => {}
            Ok(_) => {
                return Err(BackendError::Api(
                    "pdftoppm failed to convert PDF".to_string(),
                ))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BackendError::Unavailable(
                    "pdftoppm not found (install poppler-utils)".to_string(),
                ))
            }
            Err(e) => return Err(BackendError::Io(e)),
        }

        let mut images: Vec<PathBuf> = std::fs::read_dir(output_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|ext| ext == "png").unwrap_or(false))
            .collect();
        images.sort();

        if images.is_empty() {
            return Err(BackendError::Api(
                "no images generated from PDF".to_string(),
            ));
        }
        Ok(images)
    }

    fn ocr_image_blocking(bytes: &[u8], language: &str) -> Result<OcrOutcome, BackendError> {
        let dir = TempDir::new()?;
        let image_path = dir.path().join("input.png");
        std::fs::write(&image_path, bytes)?;

        let text = Self::run_tesseract(&image_path, language)?;
        Ok(OcrOutcome {
            text: text.trim().to_string(),
            pages: 1,
            confidence: 0.0,
            language: short_code(language),
        })
    }

    fn ocr_pdf_blocking(bytes: &[u8], language: &str) -> Result<OcrOutcome, BackendError> {
        let dir = TempDir::new()?;
        let pdf_path = dir.path().join("input.pdf");
        std::fs::write(&pdf_path, bytes)?;

        let images = Self::render_pdf_pages(&pdf_path, dir.path())?;
        let pages = images.len() as u32;

        let mut page_texts: Vec<String> = Vec::with_capacity(images.len());
        for (index, image) in images.iter().enumerate() {
            match Self::run_tesseract(image, language) {
                Ok(text) => page_texts.push(text.trim().to_string()),
                Err(e) => {
                    tracing::warn!(page = index + 1, error = %e, "OCR failed for page");
                }
            }
        }

        Ok(OcrOutcome {
            text: page_texts.join("\n\n"),
            pages,
            confidence: 0.0,
            language: short_code(language),
        })
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    fn mode(&self) -> BackendMode {
        BackendMode::Real
    }

    async fn ocr_image(&self, bytes: &[u8]) -> Result<OcrOutcome, BackendError> {
        let bytes = bytes.to_vec();
        let language = self.language.clone();
        tokio::task::spawn_blocking(move || Self::ocr_image_blocking(&bytes, &language))
            .await
            .map_err(|e| BackendError::Api(format!("OCR task failed: {e}")))?
    }

    async fn ocr_pdf(&self, bytes: &[u8]) -> Result<OcrOutcome, BackendError> {
        let bytes = bytes.to_vec();
        let language = self.language.clone();
        tokio::task::spawn_blocking(move || Self::ocr_pdf_blocking(&bytes, &language))
            .await
            .map_err(|e| BackendError::Api(format!("OCR task failed: {e}")))?
    }
}

/// First two letters of a Tesseract language code ("fra" -> "fr").
fn short_code(language: &str) -> String {
    language.chars().take(2).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_image_ocr_is_deterministic() {
        let ocr = SimulatedOcr::new("eng");
        let a = ocr.ocr_image(b"bytes").await.unwrap();
        let b = ocr.ocr_image(b"other bytes").await.unwrap();
        assert_eq!(a.text, b.text);
        assert_eq!(a.pages, 1);
        assert_eq!(a.language, "en");
    }

    #[tokio::test]
    async fn simulated_pdf_ocr_reports_two_pages() {
        let ocr = SimulatedOcr::new("fra");
        let result = ocr.ocr_pdf(b"%PDF-1.4").await.unwrap();
        assert_eq!(result.pages, 2);
        assert_eq!(result.language, "fr");
        assert!(!result.text.is_empty());
    }

    #[test]
    fn language_short_code() {
        assert_eq!(short_code("fra"), "fr");
        assert_eq!(short_code("e"), "e");
    }
}
