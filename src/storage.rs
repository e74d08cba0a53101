// SPDX-License-Identifier: MPL-2.0

//! Per-channel image persistence and bundled-asset fallback
//!
//! Each channel persists as one JPEG under the application cache directory.
//! Loading never fails: a missing or unreadable override falls back to the
//! channel's bundled asset when it has one, and to a solid placeholder
//! otherwise.

use crate::constants::jpeg::PERSIST_QUALITY;
use crate::constants::storage::{DIR_NAME, IMAGES_SUBDIR, LOAD_DOWNSAMPLE};
use crate::encoder;
use crate::engine::ChannelKind;
use crate::errors::StorageError;
use image::{RgbImage, imageops};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Read access to assets bundled with the host application
pub trait AssetSource: Send + Sync {
    /// Bytes of the named asset, or `None` when the host ships no such asset
    fn load_asset(&self, name: &str) -> Option<Vec<u8>>;
}

/// Asset source backed by a plain directory
#[derive(Debug, Clone)]
pub struct DirAssets {
    dir: PathBuf,
}

impl DirAssets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl AssetSource for DirAssets {
    fn load_asset(&self, name: &str) -> Option<Vec<u8>> {
        std::fs::read(self.dir.join(name)).ok()
    }
}

/// Asset source that ships nothing
#[derive(Debug, Clone, Copy)]
pub struct NoAssets;

impl AssetSource for NoAssets {
    fn load_asset(&self, _name: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Filesystem home of the per-channel override images
#[derive(Debug, Clone)]
pub struct ChannelStore {
    images_dir: PathBuf,
}

impl ChannelStore {
    pub fn new(images_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
        }
    }

    /// Store rooted at the platform cache directory
    pub fn default_dir() -> Result<Self, StorageError> {
        let base = dirs::cache_dir().ok_or(StorageError::NoDirectory)?;
        Ok(Self::new(base.join(DIR_NAME).join(IMAGES_SUBDIR)))
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    fn override_path(&self, kind: ChannelKind) -> PathBuf {
        self.images_dir.join(kind.file_name())
    }

    /// Load a channel image through the fallback chain: persisted override,
    /// bundled asset, placeholder
    pub fn load(&self, kind: ChannelKind, assets: &dyn AssetSource) -> RgbImage {
        let path = self.override_path(kind);
        match self.load_override(&path) {
            Ok(Some(img)) => {
                info!(
                    channel = kind.display_name(),
                    path = %path.display(),
                    "Loaded override image"
                );
                return img;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Ignoring unreadable override image"
                );
            }
        }

        if let Some(name) = kind.asset_name() {
            if let Some(bytes) = assets.load_asset(name) {
                match decode_bounded(&bytes) {
                    Ok(img) => {
                        info!(channel = kind.display_name(), asset = name, "Loaded bundled asset");
                        return img;
                    }
                    Err(e) => {
                        warn!(asset = name, error = %e, "Ignoring undecodable asset");
                    }
                }
            }
        }

        debug!(channel = kind.display_name(), "Using placeholder image");
        kind.placeholder_image()
    }

    fn load_override(&self, path: &Path) -> Result<Option<RgbImage>, StorageError> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)?;
        Ok(Some(decode_bounded(&bytes)?))
    }

    /// Persist a channel image as JPEG at the fixed persist quality
    pub fn save(&self, kind: ChannelKind, img: &RgbImage) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.images_dir)?;
        let bytes = encoder::encode_jpeg(img, PERSIST_QUALITY)
            .map_err(|e| StorageError::Encode(e.to_string()))?;
        let path = self.override_path(kind);
        std::fs::write(&path, &bytes)?;
        info!(
            path = %path.display(),
            len = bytes.len(),
            "Persisted channel image"
        );
        Ok(())
    }
}

/// Decode image bytes with a 2:1 load-time downsample, bounded to the
/// global dimension cap
pub(crate) fn decode_bounded(bytes: &[u8]) -> Result<RgbImage, StorageError> {
    let decoded = image::load_from_memory(bytes)?.to_rgb8();
    let (w, h) = decoded.dimensions();
    let img = if w >= 2 * LOAD_DOWNSAMPLE && h >= 2 * LOAD_DOWNSAMPLE {
        imageops::resize(
            &decoded,
            w / LOAD_DOWNSAMPLE,
            h / LOAD_DOWNSAMPLE,
            imageops::FilterType::Triangle,
        )
    } else {
        decoded
    };
    Ok(crate::engine::bound_image(img))
}
