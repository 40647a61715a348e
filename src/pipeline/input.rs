//! Input resolution: read a local PDF into memory.
//!
//! The rasterizer opens documents from byte slices, which is also how an
//! uploaded file arrives. Reading the file here lets the pipeline treat both
//! sources the same way. The `%PDF` magic bytes are checked up front so the
//! caller gets a meaningful error instead of an opaque pdfium failure.

use crate::error::ConvertError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Fallback name when the path has no usable final component.
const DEFAULT_SOURCE_NAME: &str = "document.pdf";

/// A PDF held in memory together with the name it was supplied under.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// File name as uploaded (final path component, extension included).
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Read a local PDF, validating existence, permissions and magic bytes.
pub fn read_input(path: &Path) -> Result<SourceDocument, ConvertError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => ConvertError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ConvertError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    let name = source_name(path);
    check_magic(&name, &bytes)?;

    debug!("Read local PDF: {} ({} bytes)", path.display(), bytes.len());
    Ok(SourceDocument { name, bytes })
}

/// Reject anything that does not start with `%PDF`.
pub fn check_magic(name: &str, bytes: &[u8]) -> Result<(), ConvertError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        return Err(ConvertError::NotAPdf {
            name: name.to_string(),
            magic: bytes.iter().take(4).copied().collect(),
        });
    }
    Ok(())
}

/// The name used in archive file names: the final path component.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_SOURCE_NAME)
        .to_string()
}
