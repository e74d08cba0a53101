// SPDX-License-Identifier: GPL-3.0-only

//! Capture-site substitution
//!
//! Two independent call shapes arrive here. The callback shape suppresses
//! the real capture entirely and drives the caller's callbacks itself. The
//! buffer shape runs after the real acquisition and overwrites the
//! caller-owned plane in place, which is why it must never write past the
//! plane's fixed capacity.

use crate::constants::MAX_IMAGE_DIMENSION;
use crate::encoder;
use crate::engine::SubstitutionEngine;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Facing attribute of an opening capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Front,
    Back,
}

/// Callback slots supplied by a callback-delivery capture call
///
/// Slots left as `None` are simply skipped; the invocation order of the
/// rest is fixed: shutter, raw, postview, final image.
#[derive(Default)]
pub struct CallbackCapture<'a> {
    pub shutter: Option<Box<dyn FnMut() + 'a>>,
    pub raw: Option<Box<dyn FnMut(Option<&[u8]>) + 'a>>,
    pub postview: Option<Box<dyn FnMut(Option<&[u8]>) + 'a>>,
    pub jpeg: Option<Box<dyn FnMut(Option<&[u8]>) + 'a>>,
    /// Requested output dimensions; zero means "use the source size"
    pub target_width: u32,
    pub target_height: u32,
}

/// Pixel layout of an acquired image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Single compressed plane (JPEG)
    Compressed,
    /// Raw planar layout; substitution is skipped for these
    Planar,
}

/// One fixed-capacity buffer plane owned by the caller
#[derive(Debug)]
pub struct Plane<'a> {
    /// Full backing buffer; its length is the plane's capacity
    pub data: &'a mut [u8],
    /// Bytes of `data` currently holding valid content
    pub len: usize,
}

/// Caller-owned image object returned by the real acquisition call
#[derive(Debug)]
pub struct AcquiredImage<'a> {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub planes: Vec<Plane<'a>>,
}

/// Substitutes synthetic bytes at both capture call shapes and keeps the
/// device-facing state current
pub struct CaptureInterceptor {
    engine: Arc<SubstitutionEngine>,
}

impl CaptureInterceptor {
    pub fn new(engine: Arc<SubstitutionEngine>) -> Self {
        Self { engine }
    }

    /// Callback-delivery capture: drive the caller's callbacks in the real
    /// subsystem's order, real call suppressed
    ///
    /// Raw and postview stages receive no payload; the final stage gets the
    /// encoded synthetic image, or nothing when no channel image is loaded.
    pub fn on_picture_callbacks(&self, mut capture: CallbackCapture<'_>) {
        let bytes = self.encoded_for(capture.target_width, capture.target_height, usize::MAX);
        if let Some(cb) = capture.shutter.as_mut() {
            cb();
        }
        if let Some(cb) = capture.raw.as_mut() {
            cb(None);
        }
        if let Some(cb) = capture.postview.as_mut() {
            cb(None);
        }
        if let Some(cb) = capture.jpeg.as_mut() {
            cb(bytes.as_deref());
        }
        info!(
            len = bytes.as_ref().map(Vec::len).unwrap_or(0),
            "Delivered callback capture"
        );
    }

    /// Buffer-acquisition capture: overwrite the first plane in place
    ///
    /// Only compressed images are substituted. Planar layouts stay
    /// untouched; writing a differently-sized payload into one plane of a
    /// planar image would corrupt its neighbors.
    pub fn on_image_acquired(&self, image: &mut AcquiredImage<'_>) {
        match image.format {
            PixelFormat::Compressed => self.substitute_compressed(image),
            PixelFormat::Planar => debug!("Skipping substitution for planar format"),
        }
    }

    fn substitute_compressed(&self, image: &mut AcquiredImage<'_>) {
        let Some(plane) = image.planes.first_mut() else {
            warn!("Acquired image has no planes");
            return;
        };
        let capacity = plane.data.len();
        let Some(bytes) = self.encoded_for(image.width, image.height, capacity) else {
            return;
        };
        plane.data[..bytes.len()].copy_from_slice(&bytes);
        plane.len = bytes.len();
        debug!(len = bytes.len(), capacity, "Substituted compressed plane");
    }

    /// Capture-device open: update the facing state
    pub fn on_device_open(&self, facing: Facing, display_rotation: u32) {
        match facing {
            Facing::Front => self.engine.on_front_open(display_rotation),
            Facing::Back => self.engine.on_back_open(),
        }
    }

    fn encoded_for(&self, width: u32, height: u32, capacity: usize) -> Option<Vec<u8>> {
        let Some(img) = self.engine.current_image() else {
            warn!("No channel image loaded, skipping substitution");
            return None;
        };
        let (src_w, src_h) = img.dimensions();
        let tw = if width == 0 { src_w } else { width }.min(MAX_IMAGE_DIMENSION);
        let th = if height == 0 { src_h } else { height }.min(MAX_IMAGE_DIMENSION);
        Some(encoder::encode_to_capacity(&img, tw, th, capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::selfie;
    use crate::storage::NoAssets;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn interceptor() -> CaptureInterceptor {
        let engine = Arc::new(SubstitutionEngine::new(
            selfie::DEFAULT_ROTATION_OFFSET,
            None,
        ));
        engine.load_channels(&NoAssets);
        CaptureInterceptor::new(engine)
    }

    #[test]
    fn test_final_only_capture_gets_one_nonempty_invocation() {
        let ic = interceptor();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let seen = calls.clone();
        ic.on_picture_callbacks(CallbackCapture {
            jpeg: Some(Box::new(move |bytes| {
                seen.borrow_mut().push(bytes.map(<[u8]>::to_vec));
            })),
            ..Default::default()
        });
        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        let bytes = calls[0].as_ref().unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_callbacks_run_in_fixed_order() {
        let ic = interceptor();
        let order = Rc::new(RefCell::new(Vec::new()));
        let (a, b, c, d) = (order.clone(), order.clone(), order.clone(), order.clone());
        ic.on_picture_callbacks(CallbackCapture {
            shutter: Some(Box::new(move || a.borrow_mut().push("shutter"))),
            raw: Some(Box::new(move |bytes| {
                assert!(bytes.is_none());
                b.borrow_mut().push("raw");
            })),
            postview: Some(Box::new(move |bytes| {
                assert!(bytes.is_none());
                c.borrow_mut().push("postview");
            })),
            jpeg: Some(Box::new(move |bytes| {
                assert!(bytes.is_some());
                d.borrow_mut().push("jpeg");
            })),
            ..Default::default()
        });
        assert_eq!(*order.borrow(), vec!["shutter", "raw", "postview", "jpeg"]);
    }

    #[test]
    fn test_target_dimensions_shape_the_payload() {
        let ic = interceptor();
        let decoded = Rc::new(RefCell::new(None));
        let out = decoded.clone();
        ic.on_picture_callbacks(CallbackCapture {
            jpeg: Some(Box::new(move |bytes| {
                let img = image::load_from_memory(bytes.unwrap()).unwrap();
                *out.borrow_mut() = Some((img.width(), img.height()));
            })),
            target_width: 320,
            target_height: 240,
            ..Default::default()
        });
        assert_eq!(decoded.borrow().unwrap(), (320, 240));
    }

    #[test]
    fn test_compressed_plane_is_overwritten_within_capacity() {
        let ic = interceptor();
        let mut buf = vec![0u8; 60_000];
        let mut image = AcquiredImage {
            format: PixelFormat::Compressed,
            width: 640,
            height: 480,
            planes: vec![Plane {
                data: &mut buf,
                len: 0,
            }],
        };
        ic.on_image_acquired(&mut image);
        let plane = &image.planes[0];
        assert!(plane.len > 0);
        assert!(plane.len <= plane.data.len());
        assert_eq!(&plane.data[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_planar_image_is_left_untouched() {
        let ic = interceptor();
        let mut buf = vec![7u8; 1024];
        let mut image = AcquiredImage {
            format: PixelFormat::Planar,
            width: 640,
            height: 480,
            planes: vec![Plane {
                data: &mut buf,
                len: 1024,
            }],
        };
        ic.on_image_acquired(&mut image);
        assert_eq!(image.planes[0].len, 1024);
        assert!(image.planes[0].data.iter().all(|&b| b == 7));
    }

    #[test]
    fn test_tiny_plane_never_overflows() {
        let ic = interceptor();
        let mut buf = vec![0u8; 128];
        let mut image = AcquiredImage {
            format: PixelFormat::Compressed,
            width: 640,
            height: 480,
            planes: vec![Plane {
                data: &mut buf,
                len: 0,
            }],
        };
        ic.on_image_acquired(&mut image);
        assert_eq!(image.planes[0].len, 128);
    }

    #[test]
    fn test_device_open_switches_facing_state() {
        let engine = Arc::new(SubstitutionEngine::new(
            selfie::DEFAULT_ROTATION_OFFSET,
            None,
        ));
        engine.load_channels(&NoAssets);
        let ic = CaptureInterceptor::new(engine.clone());
        ic.on_device_open(Facing::Front, 0);
        assert!(engine.is_selfie_mode());
        ic.on_device_open(Facing::Back, 0);
        assert!(!engine.is_selfie_mode());
        assert!(engine.is_front_side());
    }
}
