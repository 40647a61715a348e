//! Image encoding: RGB pixel buffer → PNG or JPEG bytes.

use crate::config::OutputFormat;
use crate::pipeline::render::RawImage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::error::{ParameterError, ParameterErrorKind};
use image::{ExtendedColorType, ImageEncoder, ImageError};
use tracing::debug;

/// Artifact name for a 1-indexed page: `page_{n}.{ext}`.
pub fn page_file_name(page_num: usize, format: OutputFormat) -> String {
    format!("page_{}.{}", page_num, format.extension())
}

/// Encode a rasterised page in the requested format.
///
/// `jpeg_quality` is ignored for PNG.
pub fn encode_page(
    raw: &RawImage,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<Vec<u8>, ImageError> {
    if raw.pixels.len() != raw.expected_len() {
        return Err(ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        )));
    }

    let mut buf = Vec::new();
    match format {
        OutputFormat::Png => PngEncoder::new(&mut buf).write_image(
            &raw.pixels,
            raw.width,
            raw.height,
            ExtendedColorType::Rgb8,
        )?,
        OutputFormat::Jpeg => JpegEncoder::new_with_quality(&mut buf, jpeg_quality).write_image(
            &raw.pixels,
            raw.width,
            raw.height,
            ExtendedColorType::Rgb8,
        )?,
    }

    debug!(
        "Encoded {}x{} page → {} bytes {}",
        raw.width,
        raw.height,
        buf.len(),
        format
    );
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn red_square() -> RawImage {
        RawImage::from(RgbImage::from_pixel(10, 10, Rgb([255, 0, 0])))
    }

    #[test]
    fn png_output_decodes_to_same_size() {
        let bytes = encode_page(&red_square(), OutputFormat::Png, 75).expect("encode");
        assert!(bytes.starts_with(b"\x89PNG"));
        let decoded = image::load_from_memory(&bytes).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (10, 10));
    }

    #[test]
    fn jpeg_output_has_soi_marker() {
        let bytes = encode_page(&red_square(), OutputFormat::Jpeg, 90).expect("encode");
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn short_buffer_is_an_error() {
        let raw = RawImage {
            width: 10,
            height: 10,
            pixels: vec![0; 12],
        };
        assert!(encode_page(&raw, OutputFormat::Png, 75).is_err());
    }

    #[test]
    fn page_names_use_lowercase_extension() {
        assert_eq!(page_file_name(3, OutputFormat::Jpeg), "page_3.jpeg");
        assert_eq!(page_file_name(12, OutputFormat::Png), "page_12.png");
    }
}
