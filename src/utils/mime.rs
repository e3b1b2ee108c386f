//! Media kind inference and MIME helpers.
//!
//! The storage key extension decides which extraction path a document takes;
//! content sniffing is only used to report mismatches, never to override the
//! declared kind.

use std::path::Path;

/// Broad media kind of a stored document, inferred from its storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Pdf,
    Image,
    Plain,
    Unknown,
}

impl MediaKind {
    /// Infer the media kind from a storage key's extension.
    pub fn from_storage_key(key: &str) -> Self {
        let ext = Path::new(key)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Self::Pdf,
            "png" | "jpg" | "jpeg" | "tiff" | "tif" | "bmp" | "gif" => Self::Image,
            "txt" | "csv" | "md" | "log" | "json" | "xml" | "html" => Self::Plain,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::Plain => "plain",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Guess the MIME type from a storage key's extension.
pub fn mime_from_key(key: &str) -> String {
    mime_guess::from_path(key)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Sniff the MIME type from file content, when recognizable.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.mime_type())
}

/// Report a mismatch between the declared MIME type and the sniffed one.
///
/// Returns the sniffed type when it disagrees with the declared one.
pub fn detect_mime_mismatch(bytes: &[u8], declared: &str) -> Option<&'static str> {
    match sniff_mime(bytes) {
        Some(detected) if detected != declared => Some(detected),
        _ => None,
    }
}
