//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline finishes each page. Events are delivered
//! synchronously on the thread running the batch, after the page's image has
//! been appended to the archive.
//!
//! # Example
//!
//! ```rust
//! use pdf2img::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Recorder {
//!     fractions: Mutex<Vec<f64>>,
//! }
//!
//! impl ConversionProgressCallback for Recorder {
//!     fn on_progress(&self, fraction: f64) {
//!         self.fractions.lock().unwrap().push(fraction);
//!     }
//! }
//!
//! let recorder = Arc::new(Recorder::default());
//! let config = ConversionConfig::builder()
//!     .progress_callback(recorder.clone() as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `Send + Sync` lets the config travel into the
/// blocking task used by [`crate::convert::convert`].
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after validation, before any page is rendered.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages this run will process
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after a page has been rendered, encoded and archived.
    ///
    /// # Arguments
    /// * `page_num`   — 1-indexed page number in the source document
    /// * `completed`  — pages finished so far in this run, including this one
    /// * `total`      — pages this run will process
    /// * `byte_len`   — size of the encoded image
    fn on_page_complete(&self, page_num: usize, completed: usize, total: usize, byte_len: usize) {
        let _ = (page_num, completed, total, byte_len);
    }

    /// Called right after [`Self::on_page_complete`] with `completed / total`.
    ///
    /// Strictly increasing within a run and exactly `1.0` after the last page.
    fn on_progress(&self, fraction: f64) {
        let _ = fraction;
    }

    /// Called once after the run's output has been finalised.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages the run processed
    fn on_conversion_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// Progress after `completed` of `total` units, in `[0, 1]`.
pub fn fraction(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 1.0;
    }
    completed as f64 / total as f64
}
