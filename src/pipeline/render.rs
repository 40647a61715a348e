//! PDF rasterisation: render pages to RGB pixel buffers via pdfium.
//!
//! The batch converter only sees the [`PageSource`] trait. [`PdfiumDocument`]
//! is the production implementation; tests substitute synthetic documents.
//!
//! pdfium is not async-safe and keeps thread-local state, so everything in
//! this module is blocking. Async callers go through
//! [`crate::convert::convert`], which moves the whole run onto
//! `spawn_blocking`.

use crate::error::ConvertError;
use crate::output::DocumentMetadata;
use image::RgbImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// Environment variable pointing at a pdfium library file or its directory.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Points per inch in PDF user space.
const POINTS_PER_INCH: f32 = 72.0;

/// A rasterised page: tightly packed RGB8, no alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    /// `width * height * 3` bytes, row-major.
    pub pixels: Vec<u8>,
}

impl RawImage {
    /// Bytes the pixel buffer should hold for its declared dimensions.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

impl From<RgbImage> for RawImage {
    fn from(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }
}

/// An opened, page-addressable document.
pub trait PageSource {
    /// Number of pages; pages are addressed `0..page_count()`.
    fn page_count(&self) -> usize;

    /// Rasterise page `index` (0-based) at `dpi` dots per inch.
    fn rasterize(&self, index: usize, dpi: u32) -> Result<RawImage, ConvertError>;
}

/// Bind to the pdfium shared library.
///
/// `PDFIUM_LIB_PATH` wins when set; it may name the library file itself or
/// the directory containing it. Otherwise the system library path is searched.
pub fn bind_pdfium() -> Result<Pdfium, ConvertError> {
    let bindings = match std::env::var(PDFIUM_LIB_PATH_ENV) {
        Ok(p) if !p.is_empty() => {
            let path = PathBuf::from(p);
            let lib = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path
            };
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib)
        }
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ConvertError::PdfiumBindingFailed(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

/// A PDF opened through pdfium.
pub struct PdfiumDocument<'a> {
    name: String,
    document: PdfDocument<'a>,
}

impl<'a> PdfiumDocument<'a> {
    /// Open a document from memory.
    ///
    /// `name` is only used in error messages.
    pub fn open(
        pdfium: &'a Pdfium,
        bytes: &'a [u8],
        name: &str,
        password: Option<&'a str>,
    ) -> Result<Self, ConvertError> {
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    if password.is_some() {
                        ConvertError::WrongPassword {
                            name: name.to_string(),
                        }
                    } else {
                        ConvertError::PasswordRequired {
                            name: name.to_string(),
                        }
                    }
                } else {
                    ConvertError::OpenFailed {
                        name: name.to_string(),
                        detail: err_str,
                    }
                }
            })?;

        info!("PDF loaded: {} ({} pages)", name, document.pages().len());
        Ok(Self {
            name: name.to_string(),
            document,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Document information dictionary plus page count and version.
    pub fn metadata(&self) -> DocumentMetadata {
        let metadata = self.document.metadata();

        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };

        DocumentMetadata {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
            modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
            page_count: self.page_count(),
            pdf_version: format!("{:?}", self.document.version()),
        }
    }
}

impl PageSource for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn rasterize(&self, index: usize, dpi: u32) -> Result<RawImage, ConvertError> {
        let render_err = |detail: String| ConvertError::RenderFailed {
            page: index + 1,
            detail,
        };

        let page_index = u16::try_from(index)
            .map_err(|_| render_err(format!("page index {index} exceeds pdfium's limit")))?;
        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|e| render_err(format!("{:?}", e)))?;

        let scale = dpi as f32 / POINTS_PER_INCH;
        let width = ((page.width().value * scale).round() as i32).max(1);
        let height = ((page.height().value * scale).round() as i32).max(1);

        let render_config = PdfRenderConfig::new()
            .set_target_width(width)
            .set_target_height(height);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| render_err(format!("{:?}", e)))?;

        let image = bitmap.as_image().to_rgb8();
        debug!(
            "Rendered {} page {} at {} dpi → {}x{} px",
            self.name(),
            index + 1,
            dpi,
            image.width(),
            image.height()
        );

        Ok(RawImage::from(image))
    }
}
