//! OCR upload endpoint.

use std::time::Instant;

use axum::extract::multipart::Multipart;
use axum::extract::State;
use axum::response::Response;

use super::{internal, reject, respond_ok, AppState};

const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/tiff",
    "image/bmp",
];
const PDF_TYPE: &str = "application/pdf";

/// `POST /ai/ocr` - extract text from an uploaded image or scanned PDF.
///
/// The upload is streamed and size-checked chunk by chunk, so an oversized
/// body is rejected without buffering it wholesale first.
pub async fn ocr(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let start = Instant::now();
    let max_bytes = state.settings.max_file_size_bytes() as usize;

    let mut upload: Option<(String, Vec<u8>)> = None;
    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "malformed multipart body");
                return reject("malformed multipart body", start);
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .map(|ct| ct.to_ascii_lowercase())
            .unwrap_or_default();
        if content_type.is_empty() {
            return reject("missing Content-Type for the uploaded file", start);
        }
        if content_type != PDF_TYPE && !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
            return reject(
                format!(
                    "unsupported file type: {}. Accepted: images (PNG, JPEG, TIFF, BMP) or PDF",
                    content_type
                ),
                start,
            );
        }

        let mut bytes: Vec<u8> = Vec::new();
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    if bytes.len() + chunk.len() > max_bytes {
                        return reject(
                            format!("file exceeds the {} MB limit", state.settings.max_file_size_mb),
                            start,
                        );
                    }
                    bytes.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(error = %e, "upload read failed");
                    return reject("failed to read the uploaded file", start);
                }
            }
        }

        upload = Some((content_type, bytes));
        break;
    }

    let Some((content_type, bytes)) = upload else {
        return reject("missing multipart field 'file'", start);
    };

    let result = if content_type == PDF_TYPE {
        state.backends.ocr.ocr_pdf(&bytes).await
    } else {
        state.backends.ocr.ocr_image(&bytes).await
    };

    match result {
        Ok(outcome) => {
            let message = format!("OCR completed: {} page(s)", outcome.pages);
            respond_ok(message, outcome, start)
        }
        Err(e) => {
            tracing::error!(error = %e, "OCR failed");
            internal("OCR failed", start)
        }
    }
}
