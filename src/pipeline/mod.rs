//! Pipeline stages for page-range conversion.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the rasterizer can be swapped for a synthetic one.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ archive   (container mode None)
//! (bytes)   (pdfium)   (png/jpeg) └─▶ deck  (container mode Pptx)
//! ```
//!
//! 1. [`input`]   — read the PDF and check its magic bytes
//! 2. [`render`]  — bind pdfium and rasterise pages to RGB pixel buffers
//! 3. [`encode`]  — PNG/JPEG-encode a pixel buffer and name the artifact
//! 4. [`archive`] — bundle the encoded pages into an in-memory zip
//! 5. [`deck`]    — assemble a PresentationML deck with one image per slide

pub mod archive;
pub mod deck;
pub mod encode;
pub mod input;
pub mod render;
