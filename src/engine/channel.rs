// SPDX-License-Identifier: GPL-3.0-only

//! Per-channel synthetic image state

use super::{enhance, transform};
use crate::constants::{placeholder, selfie, storage, zoom};
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// One of the three independent synthetic-image slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    Front,
    Back,
    Selfie,
}

impl ChannelKind {
    /// All channels, in load order
    pub const ALL: [ChannelKind; 3] = [ChannelKind::Front, ChannelKind::Back, ChannelKind::Selfie];

    /// Get display name for the channel
    pub fn display_name(&self) -> &'static str {
        match self {
            ChannelKind::Front => "front",
            ChannelKind::Back => "back",
            ChannelKind::Selfie => "selfie",
        }
    }

    /// Override file name under the images directory
    pub fn file_name(&self) -> &'static str {
        match self {
            ChannelKind::Front => storage::FRONT_FILE,
            ChannelKind::Back => storage::BACK_FILE,
            ChannelKind::Selfie => storage::SELFIE_FILE,
        }
    }

    /// Logical asset name for the bundled default, if the channel has one
    pub fn asset_name(&self) -> Option<&'static str> {
        match self {
            ChannelKind::Selfie => Some(selfie::ASSET_NAME),
            _ => None,
        }
    }

    /// Solid color used when neither an override nor an asset is available
    pub fn placeholder_color(&self) -> [u8; 3] {
        match self {
            ChannelKind::Front => placeholder::FRONT_COLOR,
            ChannelKind::Back => placeholder::BACK_COLOR,
            ChannelKind::Selfie => placeholder::SELFIE_COLOR,
        }
    }

    /// Solid placeholder frame at the default placeholder size
    pub fn placeholder_image(&self) -> RgbImage {
        RgbImage::from_pixel(
            placeholder::WIDTH,
            placeholder::HEIGHT,
            image::Rgb(self.placeholder_color()),
        )
    }
}

/// Raw image plus transform parameters plus the derived enhanced image
///
/// Invariant: `enhanced` is always `enhance(transform(raw, params))`.
/// Every mutating method recomputes it before returning, so no reader can
/// observe a stale derived image.
#[derive(Debug, Clone)]
pub struct Channel {
    raw: Option<RgbImage>,
    rotation_degrees: u32,
    flipped: bool,
    zoom: f32,
    enhanced: Option<RgbImage>,
}

impl Channel {
    /// Channel with no image loaded yet
    pub fn empty() -> Self {
        Self {
            raw: None,
            rotation_degrees: 0,
            flipped: false,
            zoom: 1.0,
            enhanced: None,
        }
    }

    /// Replace the raw image wholesale and reset the transform to identity
    ///
    /// The old buffers are dropped; the enhanced image is recomputed from
    /// the new raw image before this returns.
    pub fn replace_raw(&mut self, img: RgbImage) {
        self.raw = Some(img);
        self.rotation_degrees = 0;
        self.flipped = false;
        self.zoom = 1.0;
        self.recompute();
    }

    /// Set rotation and flip in one step (used on front-facing device open)
    pub fn set_orientation(&mut self, rotation_degrees: u32, flipped: bool) {
        self.rotation_degrees = rotation_degrees % 360;
        self.flipped = flipped;
        self.recompute();
    }

    /// Apply a rotation delta, normalized to [0, 360)
    pub fn rotate(&mut self, delta: i32) {
        let rotated = self.rotation_degrees as i64 + delta as i64;
        self.rotation_degrees = rotated.rem_euclid(360) as u32;
        self.recompute();
    }

    /// Toggle the horizontal flip
    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
        self.recompute();
    }

    /// Multiply the zoom by the in-step, clamped to the upper bound
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * zoom::STEP_IN).min(zoom::MAX_ZOOM);
        self.recompute();
    }

    /// Multiply the zoom by the out-step, clamped to the lower bound
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom * zoom::STEP_OUT).max(zoom::MIN_ZOOM);
        self.recompute();
    }

    pub fn raw(&self) -> Option<&RgbImage> {
        self.raw.as_ref()
    }

    pub fn enhanced(&self) -> Option<&RgbImage> {
        self.enhanced.as_ref()
    }

    pub fn rotation_degrees(&self) -> u32 {
        self.rotation_degrees
    }

    pub fn flipped(&self) -> bool {
        self.flipped
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    fn recompute(&mut self) {
        self.enhanced = self.raw.as_ref().map(|raw| {
            let transformed = transform::apply(raw, self.rotation_degrees, self.flipped, self.zoom);
            enhance::enhance(&transformed)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn channel_with_image() -> Channel {
        let mut ch = Channel::empty();
        ch.replace_raw(RgbImage::from_pixel(16, 8, Rgb([60, 60, 60])));
        ch
    }

    #[test]
    fn test_empty_channel_has_no_enhanced_image() {
        let ch = Channel::empty();
        assert!(ch.raw().is_none());
        assert!(ch.enhanced().is_none());
    }

    #[test]
    fn test_replace_raw_resets_transform() {
        let mut ch = channel_with_image();
        ch.rotate(90);
        ch.flip();
        ch.zoom_in();
        ch.replace_raw(RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])));
        assert_eq!(ch.rotation_degrees(), 0);
        assert!(!ch.flipped());
        assert!((ch.zoom() - 1.0).abs() < 1e-6);
        assert_eq!(ch.enhanced().unwrap().dimensions(), (4, 4));
    }

    #[test]
    fn test_rotation_deltas_accumulate_mod_360() {
        let mut a = channel_with_image();
        a.rotate(250);
        a.rotate(200);
        let mut b = channel_with_image();
        b.rotate(450);
        assert_eq!(a.rotation_degrees(), 90);
        assert_eq!(a.rotation_degrees(), b.rotation_degrees());
    }

    #[test]
    fn test_negative_rotation_normalizes() {
        let mut ch = channel_with_image();
        ch.rotate(-90);
        assert_eq!(ch.rotation_degrees(), 270);
        ch.rotate(-270);
        assert_eq!(ch.rotation_degrees(), 0);
    }

    #[test]
    fn test_double_flip_restores_state() {
        let mut ch = channel_with_image();
        let before = ch.enhanced().unwrap().clone();
        ch.flip();
        ch.flip();
        assert!(!ch.flipped());
        assert_eq!(ch.enhanced().unwrap(), &before);
    }

    #[test]
    fn test_zoom_in_then_out_is_identity_before_clamp() {
        let mut ch = channel_with_image();
        let before = ch.zoom();
        ch.zoom_in();
        ch.zoom_out();
        assert!((ch.zoom() - before).abs() < 1e-5);
    }

    #[test]
    fn test_zoom_clamps_at_bounds() {
        let mut ch = channel_with_image();
        for _ in 0..40 {
            ch.zoom_in();
        }
        assert!((ch.zoom() - zoom::MAX_ZOOM).abs() < 1e-6);
        for _ in 0..80 {
            ch.zoom_out();
        }
        assert!((ch.zoom() - zoom::MIN_ZOOM).abs() < 1e-6);
    }

    #[test]
    fn test_enhanced_tracks_rotation() {
        let mut ch = channel_with_image();
        assert_eq!(ch.enhanced().unwrap().dimensions(), (16, 8));
        ch.rotate(90);
        assert_eq!(ch.enhanced().unwrap().dimensions(), (8, 16));
    }
}
