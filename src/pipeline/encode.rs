//! Image preparation for OCR: crop to the title band, then base64 PNG.
//!
//! Only the top of a header page carries the title, so sending the band
//! instead of the full page keeps the request small and stops the model from
//! transcribing checklist rows.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Keep the top `fraction` of the page (full width). `fraction` is clamped
/// to `(0, 1]` and the band is at least one pixel tall.
pub fn crop_title_band(img: &DynamicImage, fraction: f32) -> DynamicImage {
    let fraction = fraction.clamp(f32::EPSILON, 1.0);
    let height = ((img.height() as f32 * fraction).round() as u32).clamp(1, img.height().max(1));
    img.crop_imm(0, 0, img.width(), height)
}

/// Encode an image as a base64 PNG ready for a vision API.
pub fn encode_page(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded title band → {} bytes base64", b64.len());

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}
