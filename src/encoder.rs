// SPDX-License-Identifier: GPL-3.0-only

//! Capacity-constrained JPEG encoding
//!
//! Callers hand over a target canvas and a byte budget and always get bytes
//! back. Quality degrades before resolution, resolution degrades before
//! truncation, and truncation is the absolute last resort for a budget no
//! encoding can meet.

use crate::constants::MAX_IMAGE_DIMENSION;
use crate::constants::jpeg::{
    FALLBACK_HEIGHT, FALLBACK_QUALITY, FALLBACK_WIDTH, LETTERBOX_FILL, MIN_QUALITY,
    PREFERRED_QUALITY,
};
use crate::errors::EngineError;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage, imageops};
use tracing::{debug, error, warn};

/// Encode an image as JPEG at a fixed quality
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>, EngineError> {
    let mut buf = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
        .map_err(|e| EngineError::ProcessingFailed(e.to_string()))?;
    Ok(buf)
}

/// Letterbox-fit the source onto a target canvas and encode it within a
/// byte budget
///
/// The output is at most `capacity` bytes whenever any encoding of the
/// fitted image satisfies that, found by a binary search over quality in
/// `[MIN_QUALITY, PREFERRED_QUALITY]`. An unsatisfiable budget gets the
/// lowest-quality encoding truncated to exactly `capacity` bytes. A failed
/// full-size encode retries once at reduced resolution and quality before
/// giving up with an empty buffer.
pub fn encode_to_capacity(
    img: &RgbImage,
    target_w: u32,
    target_h: u32,
    capacity: usize,
) -> Vec<u8> {
    let fitted = fit_into(img, target_w, target_h);
    match encode_search(&fitted, capacity) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Full-size encode failed, retrying at reduced resolution");
            let reduced = fit_into(img, FALLBACK_WIDTH, FALLBACK_HEIGHT);
            match encode_jpeg(&reduced, FALLBACK_QUALITY) {
                Ok(mut bytes) => {
                    bytes.truncate(bytes.len().min(capacity));
                    bytes
                }
                Err(e) => {
                    error!(error = %e, "Reduced-resolution encode failed");
                    Vec::new()
                }
            }
        }
    }
}

fn encode_search(img: &RgbImage, capacity: usize) -> Result<Vec<u8>, EngineError> {
    let first = encode_jpeg(img, PREFERRED_QUALITY)?;
    if first.len() <= capacity {
        return Ok(first);
    }
    debug!(
        len = first.len(),
        capacity, "Preferred quality over budget, searching"
    );

    let mut lo = MIN_QUALITY;
    let mut hi = PREFERRED_QUALITY - 1;
    let mut best: Option<Vec<u8>> = None;
    let mut smallest = first;
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        let bytes = encode_jpeg(img, mid)?;
        if bytes.len() <= capacity {
            best = Some(bytes);
            lo = mid + 1;
        } else {
            if bytes.len() < smallest.len() {
                smallest = bytes;
            }
            if mid == MIN_QUALITY {
                break;
            }
            hi = mid - 1;
        }
    }

    match best {
        Some(bytes) => Ok(bytes),
        None => {
            // When nothing fits the search bottoms out at the minimum
            // quality, so `smallest` holds the minimum-quality encoding.
            warn!(
                len = smallest.len(),
                capacity, "Budget unsatisfiable, truncating"
            );
            let mut bytes = smallest;
            bytes.truncate(capacity);
            Ok(bytes)
        }
    }
}

/// Scale the source uniformly to fit the target canvas and center it on a
/// dark fill
fn fit_into(src: &RgbImage, target_w: u32, target_h: u32) -> RgbImage {
    let target_w = target_w.clamp(1, MAX_IMAGE_DIMENSION);
    let target_h = target_h.clamp(1, MAX_IMAGE_DIMENSION);
    let (w, h) = src.dimensions();
    if (w, h) == (target_w, target_h) {
        return src.clone();
    }
    if w == 0 || h == 0 {
        return RgbImage::from_pixel(target_w, target_h, Rgb(LETTERBOX_FILL));
    }
    let scale = (target_w as f64 / w as f64).min(target_h as f64 / h as f64);
    let sw = ((w as f64 * scale).round() as u32).clamp(1, target_w);
    let sh = ((h as f64 * scale).round() as u32).clamp(1, target_h);
    let scaled = imageops::resize(src, sw, sh, imageops::FilterType::Triangle);
    let mut canvas = RgbImage::from_pixel(target_w, target_h, Rgb(LETTERBOX_FILL));
    let x = (target_w - sw) / 2;
    let y = (target_h - sh) / 2;
    imageops::replace(&mut canvas, &scaled, x as i64, y as i64);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(w: u32, h: u32) -> RgbImage {
        let mut state = 0x1234_5678u32;
        RgbImage::from_fn(w, h, move |_, _| {
            let mut px = [0u8; 3];
            for c in &mut px {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                *c = (state >> 24) as u8;
            }
            Rgb(px)
        })
    }

    #[test]
    fn test_flat_image_fits_generous_budget() {
        let src = RgbImage::from_pixel(320, 240, Rgb([90, 90, 90]));
        let bytes = encode_to_capacity(&src, 320, 240, 50_000);
        assert!(!bytes.is_empty());
        assert!(bytes.len() <= 50_000);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 320);
        assert_eq!(decoded.height(), 240);
    }

    #[test]
    fn test_tight_budget_is_respected() {
        let bytes = encode_to_capacity(&noise(256, 256), 256, 256, 5_000);
        assert!(bytes.len() <= 5_000);
    }

    #[test]
    fn test_unsatisfiable_budget_truncates_exactly() {
        // 64 bytes is below any JPEG of this size, so the lowest-quality
        // encoding is cut to the budget.
        let bytes = encode_to_capacity(&noise(256, 256), 256, 256, 64);
        assert_eq!(bytes.len(), 64);
    }

    #[test]
    fn test_letterbox_centers_and_fills() {
        let src = RgbImage::from_pixel(100, 100, Rgb([200, 10, 10]));
        let out = fit_into(&src, 200, 100);
        assert_eq!(out.dimensions(), (200, 100));
        assert_eq!(out.get_pixel(0, 50), &Rgb(LETTERBOX_FILL));
        assert_eq!(out.get_pixel(199, 50), &Rgb(LETTERBOX_FILL));
        assert_eq!(out.get_pixel(100, 50), &Rgb([200, 10, 10]));
    }

    #[test]
    fn test_oversized_target_is_bounded() {
        let src = RgbImage::from_pixel(64, 64, Rgb([1, 2, 3]));
        let out = fit_into(&src, 10_000, 10_000);
        assert_eq!(
            out.dimensions(),
            (MAX_IMAGE_DIMENSION, MAX_IMAGE_DIMENSION)
        );
    }

    #[test]
    fn test_encode_jpeg_roundtrip() {
        let src = RgbImage::from_pixel(16, 16, Rgb([0, 128, 255]));
        let bytes = encode_jpeg(&src, PREFERRED_QUALITY).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (16, 16));
    }
}
