// SPDX-License-Identifier: GPL-3.0-only

//! Brightness/contrast enhancement with glare avoidance

use crate::constants::enhance::{GAIN, HIGH_LUMA_THRESHOLD, OFFSET, SAMPLE_DIM};
use image::{Rgb, RgbImage, imageops};
use tracing::debug;

/// Apply the fixed brightness/contrast boost to a transformed image
///
/// When the sampled average luma is already high the boost is skipped and
/// an exact copy is returned, so bright scenes are not visibly blown out.
pub fn enhance(src: &RgbImage) -> RgbImage {
    if is_high_luminance(src) {
        debug!("Skipping enhancement due to glare avoidance");
        return src.clone();
    }
    let mut out = src.clone();
    for Rgb(px) in out.pixels_mut() {
        for c in px.iter_mut() {
            *c = (*c as f32 * GAIN + OFFSET).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Average BT.601 luma over a small sampling grid, compared against the
/// glare threshold
pub fn is_high_luminance(src: &RgbImage) -> bool {
    let (w, h) = src.dimensions();
    if w == 0 || h == 0 {
        return false;
    }
    let sw = SAMPLE_DIM.min(w);
    let sh = SAMPLE_DIM.min(h);
    let sample = if (sw, sh) == (w, h) {
        src.clone()
    } else {
        imageops::resize(src, sw, sh, imageops::FilterType::Triangle)
    };
    let mut sum: u64 = 0;
    for Rgb([r, g, b]) in sample.pixels() {
        sum += ((66 * *r as u32 + 129 * *g as u32 + 25 * *b as u32 + 128) >> 8) as u64;
    }
    let avg = sum as f32 / (sw * sh) as f32;
    let high = avg > HIGH_LUMA_THRESHOLD;
    debug!(avg_luma = avg, high, "Sampled luminance");
    high
}
