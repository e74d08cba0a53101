// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic image engine
//!
//! Three independent channels (front, back, selfie) plus the device-facing
//! state that decides which one is active. All channel data lives behind a
//! single lock; derived images are recomputed before the lock is released,
//! so every reader sees a consistent raw/transform/enhanced triple.

pub mod channel;
pub mod enhance;
pub mod transform;

pub use channel::{Channel, ChannelKind};

use crate::constants::MAX_IMAGE_DIMENSION;
use crate::storage::{AssetSource, ChannelStore};
use image::{RgbImage, imageops};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Direction for [`SubstitutionEngine::apply_zoom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

#[derive(Debug)]
struct Channels {
    front: Channel,
    back: Channel,
    selfie: Channel,
    selfie_mode: bool,
    front_side: bool,
}

impl Channels {
    fn active_kind(&self) -> ChannelKind {
        if self.selfie_mode {
            ChannelKind::Selfie
        } else if self.front_side {
            ChannelKind::Front
        } else {
            ChannelKind::Back
        }
    }

    fn get(&self, kind: ChannelKind) -> &Channel {
        match kind {
            ChannelKind::Front => &self.front,
            ChannelKind::Back => &self.back,
            ChannelKind::Selfie => &self.selfie,
        }
    }

    fn get_mut(&mut self, kind: ChannelKind) -> &mut Channel {
        match kind {
            ChannelKind::Front => &mut self.front,
            ChannelKind::Back => &mut self.back,
            ChannelKind::Selfie => &mut self.selfie,
        }
    }
}

/// The three channels, the active-channel state and the persistence hook
#[derive(Debug)]
pub struct SubstitutionEngine {
    inner: Mutex<Channels>,
    store: Option<ChannelStore>,
    selfie_rotation_offset: u32,
}

impl SubstitutionEngine {
    /// Engine with empty channels; call [`load_channels`](Self::load_channels)
    /// to populate them
    pub fn new(selfie_rotation_offset: u32, store: Option<ChannelStore>) -> Self {
        Self {
            inner: Mutex::new(Channels {
                front: Channel::empty(),
                back: Channel::empty(),
                selfie: Channel::empty(),
                selfie_mode: false,
                front_side: true,
            }),
            store,
            selfie_rotation_offset,
        }
    }

    // Mutators leave the channel set consistent even if one panics, so a
    // poisoned lock carries no torn state worth dying over.
    fn lock(&self) -> MutexGuard<'_, Channels> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Populate every channel from the persisted override, the bundled
    /// asset or the placeholder, in that order
    pub fn load_channels(&self, assets: &dyn AssetSource) {
        for kind in ChannelKind::ALL {
            let img = match &self.store {
                Some(store) => store.load(kind, assets),
                None => kind.placeholder_image(),
            };
            let (w, h) = img.dimensions();
            debug!(channel = kind.display_name(), w, h, "Loaded channel image");
            self.lock().get_mut(kind).replace_raw(img);
        }
        info!("All channels loaded");
    }

    /// Enhanced image of the active channel, as an owned copy
    pub fn current_image(&self) -> Option<RgbImage> {
        let channels = self.lock();
        let kind = channels.active_kind();
        channels.get(kind).enhanced().cloned()
    }

    /// Replace a channel's raw image and persist the replacement
    ///
    /// The image is bounded to [`MAX_IMAGE_DIMENSION`] first; the transform
    /// resets to identity. Persistence failures are logged, never surfaced,
    /// so an unwritable disk cannot undo an in-memory replacement.
    pub fn set_image(&self, kind: ChannelKind, img: RgbImage) {
        let img = bound_image(img);
        let persisted = img.clone();
        self.lock().get_mut(kind).replace_raw(img);
        info!(channel = kind.display_name(), "Replaced channel image");
        if let Some(store) = &self.store {
            if let Err(e) = store.save(kind, &persisted) {
                warn!(
                    channel = kind.display_name(),
                    error = %e,
                    "Failed to persist channel image"
                );
            }
        }
    }

    /// Rotate the active channel by a delta in degrees
    pub fn apply_rotation(&self, delta: i32) {
        let mut channels = self.lock();
        let kind = channels.active_kind();
        let ch = channels.get_mut(kind);
        ch.rotate(delta);
        debug!(
            channel = kind.display_name(),
            rotation = ch.rotation_degrees(),
            "Applied rotation"
        );
    }

    /// Toggle the horizontal flip of the active channel
    pub fn apply_flip(&self) {
        let mut channels = self.lock();
        let kind = channels.active_kind();
        let ch = channels.get_mut(kind);
        ch.flip();
        debug!(
            channel = kind.display_name(),
            flipped = ch.flipped(),
            "Applied flip"
        );
    }

    /// Step the active channel's zoom in the given direction
    pub fn apply_zoom(&self, direction: ZoomDirection) {
        let mut channels = self.lock();
        let kind = channels.active_kind();
        let ch = channels.get_mut(kind);
        match direction {
            ZoomDirection::In => ch.zoom_in(),
            ZoomDirection::Out => ch.zoom_out(),
        }
        debug!(
            channel = kind.display_name(),
            zoom = ch.zoom(),
            "Applied zoom"
        );
    }

    /// Front-facing device opened: switch to the selfie channel and orient
    /// it to match the display
    pub fn on_front_open(&self, display_rotation: u32) {
        let rotation = (display_rotation + self.selfie_rotation_offset) % 360;
        let mut channels = self.lock();
        channels.selfie_mode = true;
        channels.front_side = true;
        channels.selfie.set_orientation(rotation, true);
        info!(rotation, "Front-facing device opened, selfie mode on");
    }

    /// Back-facing device opened: leave selfie mode
    pub fn on_back_open(&self) {
        let mut channels = self.lock();
        channels.selfie_mode = false;
        channels.front_side = true;
        info!("Back-facing device opened, selfie mode off");
    }

    pub fn is_selfie_mode(&self) -> bool {
        self.lock().selfie_mode
    }

    pub fn is_front_side(&self) -> bool {
        self.lock().front_side
    }
}

/// Shrink an image so neither dimension exceeds [`MAX_IMAGE_DIMENSION`],
/// preserving the aspect ratio
pub(crate) fn bound_image(img: RgbImage) -> RgbImage {
    let (w, h) = img.dimensions();
    let largest = w.max(h);
    if largest <= MAX_IMAGE_DIMENSION || largest == 0 {
        return img;
    }
    let scale = MAX_IMAGE_DIMENSION as f64 / largest as f64;
    let nw = ((w as f64 * scale).round() as u32).max(1);
    let nh = ((h as f64 * scale).round() as u32).max(1);
    debug!(from_w = w, from_h = h, to_w = nw, to_h = nh, "Bounding oversized image");
    imageops::resize(&img, nw, nh, imageops::FilterType::Triangle)
}
