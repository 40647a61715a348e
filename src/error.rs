//! Error types for the pdf2img library.
//!
//! A single fatal error type, [`ConvertError`], covers every failure mode.
//! A batch either produces all of its artifacts or none of them: a page that
//! fails to render or encode aborts the whole run, and the caller re-triggers
//! the conversion from scratch.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2img library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input was read, but is not a PDF.
    #[error("Input '{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: Vec<u8> },

    // ── Document errors ───────────────────────────────────────────────────
    /// The PDF could not be opened by the rasterizer.
    #[error("Failed to open PDF '{name}': {detail}")]
    OpenFailed { name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{name}'")]
    WrongPassword { name: String },

    /// The document has no pages to put on slides.
    #[error("PDF '{name}' has no pages")]
    EmptyDocument { name: String },

    // ── Request errors ────────────────────────────────────────────────────
    /// The requested page range is empty or outside the document.
    #[error("Invalid page range {start}-{end} (document has {page_count} pages)")]
    InvalidRange {
        start: usize,
        end: usize,
        page_count: usize,
    },

    /// The requested output image format is not PNG or JPEG.
    #[error("Unsupported output format '{0}' (expected PNG or JPEG)")]
    UnsupportedFormat(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pipeline errors ───────────────────────────────────────────────────
    /// The rasterizer failed on a page. `page` is 1-based.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// Image encoding failed for a page. `page` is 1-based.
    #[error("Encoding failed for page {page}: {detail}")]
    EncodeFailed { page: usize, detail: String },

    /// The zip archive could not be assembled.
    #[error("Failed to build zip archive: {0}")]
    ArchiveFailed(String),

    /// The slide deck could not be assembled.
    #[error("Failed to build slide deck: {0}")]
    DeckFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install a pdfium build for your platform, then either:\n\
  • place it on the system library path, or\n\
  • set PDFIUM_LIB_PATH=/path/to/libpdfium (file or containing directory).\n\
Pre-built libraries: https://github.com/bblanchon/pdfium-binaries/releases\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// True for errors caused by the request itself rather than the document
    /// or the environment. UIs show these as validation messages.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ConvertError::InvalidRange { .. }
                | ConvertError::UnsupportedFormat(_)
                | ConvertError::InvalidConfig(_)
        )
    }
}

impl From<zip::result::ZipError> for ConvertError {
    fn from(e: zip::result::ZipError) -> Self {
        ConvertError::ArchiveFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_range_display() {
        let e = ConvertError::InvalidRange {
            start: 5,
            end: 3,
            page_count: 10,
        };
        let msg = e.to_string();
        assert!(msg.contains("5-3"), "got: {msg}");
        assert!(msg.contains("10 pages"), "got: {msg}");
    }

    #[test]
    fn render_failed_display() {
        let e = ConvertError::RenderFailed {
            page: 7,
            detail: "corrupt content stream".into(),
        };
        assert!(e.to_string().contains("page 7"));
        assert!(e.to_string().contains("corrupt content stream"));
    }

    #[test]
    fn unsupported_format_display() {
        let e = ConvertError::UnsupportedFormat("TIFF".into());
        assert!(e.to_string().contains("'TIFF'"));
    }

    #[test]
    fn validation_errors_are_flagged() {
        assert!(ConvertError::UnsupportedFormat("gif".into()).is_validation());
        assert!(ConvertError::InvalidRange {
            start: 2,
            end: 1,
            page_count: 3
        }
        .is_validation());
        assert!(!ConvertError::EncodeFailed {
            page: 1,
            detail: "x".into()
        }
        .is_validation());
    }

    #[test]
    fn zip_error_maps_to_archive_failed() {
        let e: ConvertError = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(e, ConvertError::ArchiveFailed(_)));
    }
}
