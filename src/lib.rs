//! # pdf2img
//!
//! Render a page range of a PDF to PNG or JPEG images, bundled into a zip,
//! or turn the whole document into a slide deck with one image per slide.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    read the file (or take uploaded bytes), check `%PDF`
//!  ├─ 2. Render   rasterise each page via pdfium at the chosen DPI
//!  ├─ 3. Encode   RGB pixels → PNG / JPEG
//!  └─ 4. Package  page_{n}.{ext} entries → {name}_pages_{a}_to_{b}.zip
//!                 or one full-bleed slide per page → converted.pptx
//! ```
//!
//! A batch is all-or-nothing: a page that fails to render or encode aborts
//! the run and no partial archive is returned.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2img::{convert, ConversionConfig, OutputFormat, PageRange};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .format(OutputFormat::Jpeg)
//!         .range(PageRange::new(3, 5))
//!         .build()?;
//!     let output = convert("report.pdf", &config).await?;
//!     for page in output.pages() {
//!         println!("{} ({} bytes)", page.file_name, page.bytes.len());
//!     }
//!     if let Some(zip) = output.archive() {
//!         std::fs::write(&zip.file_name, &zip.bytes)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## PDFium
//!
//! Rendering uses the pdfium shared library through `pdfium-render`. Put it
//! on the system library path or point `PDFIUM_LIB_PATH` at it.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod access;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use access::{AccessCodes, AccessGrant, AuthResult, Session};
pub use config::{
    ContainerMode, ConversionConfig, ConversionConfigBuilder, OutputFormat, PageRange, Resolution,
    DECK_DPI,
};
pub use convert::{
    convert, convert_bytes, convert_sync, convert_to_dir, inspect, inspect_sync, save_output,
    BatchConverter,
};
pub use error::ConvertError;
pub use output::{
    ArchiveArtifact, Artifacts, ConversionOutput, ConversionStats, DeckArtifact,
    DocumentMetadata, ImageArtifact, SavedOutput, DECK_FILE_NAME, PPTX_MIME, ZIP_MIME,
};
pub use pipeline::render::{PageSource, RawImage};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
