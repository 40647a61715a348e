//! Artifacts and statistics produced by a conversion run.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// MIME type of the zip archive.
pub const ZIP_MIME: &str = "application/zip";

/// MIME type of the slide deck.
pub const PPTX_MIME: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// File name of every slide deck.
pub const DECK_FILE_NAME: &str = "converted.pptx";

/// One encoded page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageArtifact {
    /// 1-indexed page number in the source document.
    pub page_num: usize,
    /// `page_{page_num}.{ext}`.
    pub file_name: String,
    /// `image/png` or `image/jpeg`.
    pub mime_type: String,
    /// Encoded image bytes.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ImageArtifact {
    /// `data:` URI suitable for an inline preview.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// Zip of every [`ImageArtifact`] in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveArtifact {
    /// `{source}_pages_{start}_to_{end}.zip`.
    pub file_name: String,
    /// Number of entries in the archive.
    pub entry_count: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ArchiveArtifact {
    pub fn mime_type(&self) -> &'static str {
        ZIP_MIME
    }
}

/// Slide deck with one full-bleed slide per document page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckArtifact {
    /// Always [`DECK_FILE_NAME`].
    pub file_name: String,
    pub slide_count: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl DeckArtifact {
    pub fn mime_type(&self) -> &'static str {
        PPTX_MIME
    }
}

/// Terminal output of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifacts {
    /// Container mode `None`: per-page images in ascending page order plus the zip.
    Images {
        pages: Vec<ImageArtifact>,
        archive: ArchiveArtifact,
    },
    /// Container mode `Pptx`.
    Deck { deck: DeckArtifact },
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub artifacts: Artifacts,
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// Per-page images, empty for a deck.
    pub fn pages(&self) -> &[ImageArtifact] {
        match &self.artifacts {
            Artifacts::Images { pages, .. } => pages,
            Artifacts::Deck { .. } => &[],
        }
    }

    pub fn archive(&self) -> Option<&ArchiveArtifact> {
        match &self.artifacts {
            Artifacts::Images { archive, .. } => Some(archive),
            Artifacts::Deck { .. } => None,
        }
    }

    pub fn deck(&self) -> Option<&DeckArtifact> {
        match &self.artifacts {
            Artifacts::Images { .. } => None,
            Artifacts::Deck { deck } => Some(deck),
        }
    }
}

/// Timing and volume figures for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Page count of the source document.
    pub document_pages: usize,
    /// Pages rendered in this run.
    pub converted_pages: usize,
    /// Time spent inside the rasterizer.
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
    /// Bytes of the terminal artifact (zip or deck).
    pub output_bytes: usize,
}

/// Files written by [`crate::convert::convert_to_dir`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedOutput {
    /// Per-page images first, in page order, then the zip; or just the deck.
    pub files: Vec<PathBuf>,
    pub stats: ConversionStats,
}

/// Document information available without rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}
