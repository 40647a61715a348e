//! Batch conversion: the page-range pipeline and its entry points.
//!
//! [`BatchConverter`] is the synchronous core. It takes any [`PageSource`]
//! and a [`ConversionConfig`] and produces either per-page images plus a zip,
//! or a slide deck. The free functions wrap it for the common sources:
//! in-memory uploads ([`convert_bytes`]), local files ([`convert_sync`]),
//! async callers ([`convert`]) and "write everything to a directory"
//! ([`convert_to_dir`]).

use crate::config::{ContainerMode, ConversionConfig, OutputFormat, PageRange, DECK_DPI};
use crate::error::ConvertError;
use crate::output::{
    ArchiveArtifact, Artifacts, ConversionOutput, ConversionStats, DeckArtifact,
    DocumentMetadata, ImageArtifact, SavedOutput, DECK_FILE_NAME,
};
use crate::pipeline::archive::{archive_file_name, ArchiveBuilder};
use crate::pipeline::deck::{DeckBuilder, Placement};
use crate::pipeline::encode::{encode_page, page_file_name};
use crate::pipeline::input;
use crate::pipeline::render::{bind_pdfium, PageSource, PdfiumDocument};
use crate::progress;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Converts one opened document according to a [`ConversionConfig`].
pub struct BatchConverter<'a> {
    config: &'a ConversionConfig,
}

impl<'a> BatchConverter<'a> {
    pub fn new(config: &'a ConversionConfig) -> Self {
        Self { config }
    }

    /// Run the batch over `source`.
    ///
    /// `source_name` is the uploaded file name; it prefixes the zip name and
    /// titles the deck. Any directory part is dropped.
    ///
    /// # Errors
    /// - [`ConvertError::InvalidRange`] before any page is rendered
    /// - [`ConvertError::RenderFailed`] / [`ConvertError::EncodeFailed`] abort
    ///   the whole batch; nothing is returned for the pages already done
    pub fn run(
        &self,
        source: &dyn PageSource,
        source_name: &str,
    ) -> Result<ConversionOutput, ConvertError> {
        // Only the final component ends up in artifact names.
        let source_name = input::source_name(Path::new(source_name));
        match self.config.container {
            ContainerMode::None => self.convert_range(source, &source_name),
            ContainerMode::Pptx => self.convert_deck(source, &source_name),
        }
    }

    /// Per-page images for the selected range plus a zip bundling them.
    fn convert_range(
        &self,
        source: &dyn PageSource,
        source_name: &str,
    ) -> Result<ConversionOutput, ConvertError> {
        let total_start = Instant::now();
        let page_count = source.page_count();
        let range = self
            .config
            .range
            .unwrap_or_else(|| PageRange::all(page_count));
        range.validate(page_count)?;

        let format = self.config.format;
        let dpi = self.config.resolution.dpi();
        let total = range.len();
        info!(
            "Converting pages {} of '{}' to {} at {} dpi",
            range, source_name, format, dpi
        );

        let callback = self.config.progress_callback.as_ref();
        if let Some(cb) = callback {
            cb.on_conversion_start(total);
        }

        let mut archive = ArchiveBuilder::new();
        let mut pages = Vec::with_capacity(total);
        let mut render_ms = 0u64;

        for (done, idx) in range.indices().enumerate() {
            let page_num = idx + 1;

            let render_start = Instant::now();
            let raw = source.rasterize(idx, dpi)?;
            render_ms += render_start.elapsed().as_millis() as u64;

            let bytes = encode_page(&raw, format, self.config.jpeg_quality).map_err(|e| {
                ConvertError::EncodeFailed {
                    page: page_num,
                    detail: e.to_string(),
                }
            })?;
            drop(raw);

            let file_name = page_file_name(page_num, format);
            archive.add_entry(&file_name, &bytes)?;

            let completed = done + 1;
            if let Some(cb) = callback {
                cb.on_page_complete(page_num, completed, total, bytes.len());
                cb.on_progress(progress::fraction(completed, total));
            }
            debug!("Page {} done ({}/{})", page_num, completed, total);

            pages.push(ImageArtifact {
                page_num,
                file_name,
                mime_type: format.mime_type().to_string(),
                bytes,
            });
        }

        let entry_count = archive.entry_count();
        let archive_bytes = archive.finish()?;
        let archive = ArchiveArtifact {
            file_name: archive_file_name(source_name, range),
            entry_count,
            bytes: archive_bytes,
        };

        let stats = ConversionStats {
            document_pages: page_count,
            converted_pages: pages.len(),
            render_duration_ms: render_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
            output_bytes: archive.bytes.len(),
        };
        info!(
            "Converted {} pages → {} ({} bytes) in {}ms",
            stats.converted_pages, archive.file_name, stats.output_bytes, stats.total_duration_ms
        );

        if let Some(cb) = callback {
            cb.on_conversion_complete(total);
        }

        Ok(ConversionOutput {
            artifacts: Artifacts::Images { pages, archive },
            stats,
        })
    }

    /// One full-bleed slide per document page.
    ///
    /// Covers the whole document at [`DECK_DPI`] whatever range and
    /// resolution are configured.
    fn convert_deck(
        &self,
        source: &dyn PageSource,
        source_name: &str,
    ) -> Result<ConversionOutput, ConvertError> {
        let total_start = Instant::now();
        let page_count = source.page_count();
        if page_count == 0 {
            return Err(ConvertError::EmptyDocument {
                name: source_name.to_string(),
            });
        }
        info!(
            "Building slide deck from all {} pages of '{}' at {} dpi",
            page_count, source_name, DECK_DPI
        );

        let callback = self.config.progress_callback.as_ref();
        if let Some(cb) = callback {
            cb.on_conversion_start(page_count);
        }

        let mut deck = DeckBuilder::new(source_name)?;
        let mut render_ms = 0u64;

        for idx in 0..page_count {
            let render_start = Instant::now();
            let raw = source.rasterize(idx, DECK_DPI)?;
            render_ms += render_start.elapsed().as_millis() as u64;

            let png = encode_page(&raw, OutputFormat::Png, self.config.jpeg_quality).map_err(
                |e| ConvertError::EncodeFailed {
                    page: idx + 1,
                    detail: e.to_string(),
                },
            )?;
            drop(raw);

            deck.add_image_slide(png, Placement::full_slide())?;
        }

        let slide_count = deck.slide_count();
        let bytes = deck.finish()?;
        let stats = ConversionStats {
            document_pages: page_count,
            converted_pages: slide_count,
            render_duration_ms: render_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
            output_bytes: bytes.len(),
        };
        info!(
            "Built {} with {} slides ({} bytes) in {}ms",
            DECK_FILE_NAME, slide_count, stats.output_bytes, stats.total_duration_ms
        );

        if let Some(cb) = callback {
            cb.on_conversion_complete(page_count);
        }

        Ok(ConversionOutput {
            artifacts: Artifacts::Deck {
                deck: DeckArtifact {
                    file_name: DECK_FILE_NAME.to_string(),
                    slide_count,
                    bytes,
                },
            },
            stats,
        })
    }
}

/// Convert an uploaded PDF held in memory.
///
/// This is the upload-shaped entry point: `file_name` is the name the file
/// was uploaded under and prefixes the zip name.
pub fn convert_bytes(
    bytes: &[u8],
    file_name: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    input::check_magic(file_name, bytes)?;
    let pdfium = bind_pdfium()?;
    let document = PdfiumDocument::open(&pdfium, bytes, file_name, config.password.as_deref())?;
    BatchConverter::new(config).run(&document, file_name)
}

/// Convert a local PDF on the current thread.
pub fn convert_sync(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    let source = input::read_input(path.as_ref())?;
    convert_bytes(&source.bytes, &source.name, config)
}

/// Convert a local PDF from async code.
///
/// The whole run happens inside `spawn_blocking`: pdfium is CPU-bound and
/// must not stall the runtime's worker threads.
pub async fn convert(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    let path = path.as_ref().to_path_buf();
    let config = config.clone();

    tokio::task::spawn_blocking(move || convert_sync(&path, &config))
        .await
        .map_err(|e| ConvertError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Convert a PDF and write every artifact into `out_dir`.
///
/// Each file is written to a temporary file in `out_dir` and renamed into
/// place, so an interrupted run never leaves a truncated artifact behind.
pub async fn convert_to_dir(
    path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<SavedOutput, ConvertError> {
    let output = convert(path, config).await?;
    let out_dir = out_dir.as_ref().to_path_buf();

    tokio::task::spawn_blocking(move || save_output(&output, &out_dir))
        .await
        .map_err(|e| ConvertError::Internal(format!("Write task panicked: {}", e)))?
}

/// Write the artifacts of `output` into `out_dir`.
pub fn save_output(output: &ConversionOutput, out_dir: &Path) -> Result<SavedOutput, ConvertError> {
    std::fs::create_dir_all(out_dir).map_err(|e| ConvertError::OutputWriteFailed {
        path: out_dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    match &output.artifacts {
        Artifacts::Images { pages, archive } => {
            for page in pages {
                files.push(write_atomic(out_dir, &page.file_name, &page.bytes)?);
            }
            files.push(write_atomic(out_dir, &archive.file_name, &archive.bytes)?);
        }
        Artifacts::Deck { deck } => {
            files.push(write_atomic(out_dir, &deck.file_name, &deck.bytes)?);
        }
    }

    Ok(SavedOutput {
        files,
        stats: output.stats.clone(),
    })
}

fn write_atomic(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ConvertError> {
    let path = dir.join(file_name);
    let write_err = |source: std::io::Error| ConvertError::OutputWriteFailed {
        path: path.clone(),
        source,
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(&path).map_err(|e| write_err(e.error))?;

    debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

/// Read PDF metadata without rendering any page.
pub async fn inspect(path: impl AsRef<Path>) -> Result<DocumentMetadata, ConvertError> {
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || inspect_sync(&path, None))
        .await
        .map_err(|e| ConvertError::Internal(format!("Metadata task panicked: {}", e)))?
}

/// Blocking counterpart of [`inspect`], with an optional password.
pub fn inspect_sync(path: &Path, password: Option<&str>) -> Result<DocumentMetadata, ConvertError> {
    let source = input::read_input(path)?;
    let pdfium = bind_pdfium()?;
    let document = PdfiumDocument::open(&pdfium, &source.bytes, &source.name, password)?;
    Ok(document.metadata())
}
