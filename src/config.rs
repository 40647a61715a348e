//! Configuration types for page-range conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The builder validates everything that
//! can be checked without opening the document; the page range is checked
//! again against the real page count when the batch starts.

use crate::error::ConvertError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rasterisation density used for every slide of a deck, whatever the
/// configured [`Resolution`]. Slides are scaled to a fixed 10 × 7.5 in page.
pub const DECK_DPI: u32 = 150;

/// Default JPEG quality, matching the usual encoder default.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Configuration for a batch conversion.
///
/// # Example
/// ```rust
/// use pdf2img::{ConversionConfig, OutputFormat, PageRange, Resolution};
///
/// let config = ConversionConfig::builder()
///     .format(OutputFormat::Jpeg)
///     .resolution(Resolution::High)
///     .range(PageRange::new(3, 5))
///     .build()
///     .unwrap();
/// assert_eq!(config.resolution.dpi(), 600);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Encoded image format for per-page artifacts. Default: PNG.
    pub format: OutputFormat,

    /// Rasterisation density for per-page artifacts. Default: [`Resolution::Normal`].
    ///
    /// Ignored in [`ContainerMode::Pptx`], which always renders at [`DECK_DPI`].
    pub resolution: Resolution,

    /// Whether to produce loose images plus a zip, or a slide deck. Default: None.
    pub container: ContainerMode,

    /// Inclusive 1-based page range. `None` selects every page.
    ///
    /// Ignored in [`ContainerMode::Pptx`], which always covers the whole document.
    pub range: Option<PageRange>,

    /// JPEG quality, 1–100. Default: 75. Has no effect on PNG output.
    pub jpeg_quality: u8,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Receives per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            resolution: Resolution::default(),
            container: ContainerMode::default(),
            range: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("format", &self.format)
            .field("resolution", &self.resolution)
            .field("container", &self.container)
            .field("range", &self.range)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.config.resolution = resolution;
        self
    }

    /// Shorthand for `resolution(Resolution::Custom(dpi))`.
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.resolution = Resolution::from_dpi(dpi);
        self
    }

    pub fn container(mut self, mode: ContainerMode) -> Self {
        self.config.container = mode;
        self
    }

    pub fn range(mut self, range: PageRange) -> Self {
        self.config.range = Some(range);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.resolution.dpi() == 0 {
            return Err(ConvertError::InvalidConfig(
                "Resolution must be a positive DPI".into(),
            ));
        }
        if !(1..=100).contains(&c.jpeg_quality) {
            return Err(ConvertError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        // Decks always cover the whole document, so their range is never read.
        if let (Some(range), ContainerMode::None) = (c.range, c.container) {
            if range.start < 1 || range.start > range.end {
                return Err(ConvertError::InvalidRange {
                    start: range.start,
                    end: range.end,
                    page_count: 0,
                });
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Encoded image format of per-page artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Lossless PNG. (default)
    #[default]
    Png,
    /// Baseline JPEG at [`ConversionConfig::jpeg_quality`].
    Jpeg,
}

impl OutputFormat {
    /// Lowercase format name, used both as file extension and MIME subtype.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }

    /// `image/png` or `image/jpeg`.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" => Ok(OutputFormat::Jpeg),
            _ => Err(ConvertError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Png => f.write_str("PNG"),
            OutputFormat::Jpeg => f.write_str("JPEG"),
        }
    }
}

/// Rasterisation density tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    /// 300 DPI. (default)
    #[default]
    Normal,
    /// 600 DPI.
    High,
    /// Any other density.
    Custom(u32),
}

impl Resolution {
    pub fn dpi(self) -> u32 {
        match self {
            Resolution::Normal => 300,
            Resolution::High => 600,
            Resolution::Custom(dpi) => dpi,
        }
    }

    /// Map a DPI value back onto a named tier where one matches.
    pub fn from_dpi(dpi: u32) -> Self {
        match dpi {
            300 => Resolution::Normal,
            600 => Resolution::High,
            other => Resolution::Custom(other),
        }
    }
}

/// What the batch produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContainerMode {
    /// Per-page images for the selected range plus a zip bundling them. (default)
    #[default]
    None,
    /// One `.pptx` deck covering every page of the document.
    Pptx,
}

/// Inclusive, 1-based page span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The whole document.
    pub fn all(page_count: usize) -> Self {
        Self {
            start: 1,
            end: page_count,
        }
    }

    /// Check `1 ≤ start ≤ end ≤ page_count`.
    pub fn validate(&self, page_count: usize) -> Result<(), ConvertError> {
        if self.start < 1 || self.start > self.end || self.end > page_count {
            return Err(ConvertError::InvalidRange {
                start: self.start,
                end: self.end,
                page_count,
            });
        }
        Ok(())
    }

    /// Number of pages in the span. Only meaningful once validated.
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero-based page indices in ascending order.
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        (self.start - 1)..=(self.end - 1)
    }
}

impl FromStr for PageRange {
    type Err = ConvertError;

    /// Parse `"3-5"` or a single page `"4"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConvertError::InvalidConfig(format!("Invalid page range '{s}'"));
        let s = s.trim();
        let (start, end) = match s.split_once('-') {
            Some((a, b)) => (a.trim(), b.trim()),
            None => (s, s),
        };
        let start: usize = start.parse().map_err(|_| invalid())?;
        let end: usize = end.parse().map_err(|_| invalid())?;
        Ok(PageRange::new(start, end))
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
