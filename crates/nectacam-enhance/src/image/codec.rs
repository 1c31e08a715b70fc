// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Codec adapter — moves between compressed image bytes and decoded 8-bit RGB
// pixel buffers using the `image` crate.

use image::{DynamicImage, ImageFormat, RgbImage};
use nectacam_core::config::MAX_JPEG_QUALITY;
use nectacam_core::error::{NectacamError, Result};
use nectacam_core::types::PixelBuffer;
use tracing::{debug, instrument};

/// Quality used for saved captures unless reconfigured.
pub const DEFAULT_JPEG_QUALITY: u8 = MAX_JPEG_QUALITY;

/// Decode compressed bytes (JPEG, PNG, ...) into an RGB pixel buffer.
///
/// Alpha, if present, is dropped. Fails with `DecodeError` on empty,
/// malformed, or unsupported input.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode(data: &[u8]) -> Result<PixelBuffer> {
    if data.is_empty() {
        return Err(NectacamError::DecodeError("no image data".into()));
    }
    let image = image::load_from_memory(data).map_err(|err| {
        NectacamError::DecodeError(format!("failed to decode image: {}", err))
    })?;
    debug!(
        width = image.width(),
        height = image.height(),
        "Image decoded from bytes"
    );
    from_dynamic(image)
}

/// Convert an already-decoded image into an RGB pixel buffer.
pub fn from_dynamic(image: DynamicImage) -> Result<PixelBuffer> {
    let rgb = image.into_rgb8();
    let (width, height) = rgb.dimensions();
    PixelBuffer::new(width, height, rgb.into_raw())
        .map_err(|err| NectacamError::DecodeError(format!("decoded image unusable: {}", err)))
}

/// Copy a pixel buffer into an `image` crate RGB image.
pub fn to_rgb_image(buffer: &PixelBuffer) -> Result<RgbImage> {
    RgbImage::from_raw(buffer.width(), buffer.height(), buffer.samples().to_vec()).ok_or_else(
        || NectacamError::EncodeError("pixel buffer does not fill its dimensions".into()),
    )
}

/// Encode a pixel buffer as baseline JPEG.
///
/// `quality` is on the 0-100 scale; values below the encoder's minimum of 1
/// are raised to 1 and values above 100 lowered to 100.
#[instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn encode(buffer: &PixelBuffer, quality: u8) -> Result<Vec<u8>> {
    let quality = quality.clamp(1, MAX_JPEG_QUALITY);
    let rgb = to_rgb_image(buffer)?;

    let mut out = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
    rgb.write_with_encoder(encoder).map_err(|err| {
        NectacamError::EncodeError(format!("JPEG encoding failed: {}", err))
    })?;

    debug!(encoded_len = out.len(), quality, "JPEG encoded");
    Ok(out)
}

/// Encode a pixel buffer as lossless PNG.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let rgb = to_rgb_image(buffer)?;
    let mut out = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut out);
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| NectacamError::EncodeError(format!("PNG encoding failed: {}", err)))?;
    Ok(out)
}
