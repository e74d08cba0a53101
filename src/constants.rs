// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Maximum width or height for any image held in memory
///
/// Everything loaded or set by the caller is bounded to this dimension
/// before it reaches a channel, so a single oversized source cannot blow
/// up every derived buffer downstream.
pub const MAX_IMAGE_DIMENSION: u32 = 1920;

/// Maximum byte size of any single pixel buffer (RGB, 3 bytes per pixel)
pub const MAX_PIXEL_BYTES: usize = 50 * 1024 * 1024;

/// JPEG encoding constants
pub mod jpeg {
    /// Quality used for the first encoding attempt
    pub const PREFERRED_QUALITY: u8 = 85;

    /// Lowest quality the capacity search will try
    pub const MIN_QUALITY: u8 = 30;

    /// Quality used when persisting channel images to disk
    pub const PERSIST_QUALITY: u8 = 85;

    /// Quality used when re-encoding a picked image before delivery
    pub const PICKER_QUALITY: u8 = 95;

    /// Reduced resolution used when a full-size encode fails
    pub const FALLBACK_WIDTH: u32 = 800;
    pub const FALLBACK_HEIGHT: u32 = 600;

    /// Quality used for the reduced-resolution retry
    pub const FALLBACK_QUALITY: u8 = 50;

    /// Background fill for letterboxed output (near-black)
    pub const LETTERBOX_FILL: [u8; 3] = [0x10, 0x10, 0x10];
}

/// Zoom step and bounds
pub mod zoom {
    /// Multiplicative step per zoom-in action
    pub const STEP_IN: f32 = 1.15;

    /// Multiplicative step per zoom-out action (exact inverse of STEP_IN)
    pub const STEP_OUT: f32 = 1.0 / STEP_IN;

    /// Minimum zoom factor
    pub const MIN_ZOOM: f32 = 0.33;

    /// Maximum zoom factor
    pub const MAX_ZOOM: f32 = 3.0;
}

/// Enhancement ("verification boost") constants
pub mod enhance {
    /// Linear gain applied per RGB channel
    pub const GAIN: f32 = 1.05;

    /// Constant offset added per RGB channel
    pub const OFFSET: f32 = 2.0;

    /// Side length of the luma sampling grid
    pub const SAMPLE_DIM: u32 = 32;

    /// Average luma above which enhancement is skipped (glare avoidance)
    pub const HIGH_LUMA_THRESHOLD: f32 = 180.0;
}

/// Selfie channel defaults
pub mod selfie {
    /// Rotation added to the display rotation when a front-facing device opens
    pub const DEFAULT_ROTATION_OFFSET: u32 = 90;

    /// Logical asset name for the bundled selfie default
    pub const ASSET_NAME: &str = "fake_selfie.jpg";
}

/// Placeholder images used when no override or asset is available
pub mod placeholder {
    pub const WIDTH: u32 = 800;
    pub const HEIGHT: u32 = 600;

    pub const FRONT_COLOR: [u8; 3] = [0x80, 0x80, 0x80];
    pub const BACK_COLOR: [u8; 3] = [0xA0, 0xA0, 0xA0];
    pub const SELFIE_COLOR: [u8; 3] = [0x40, 0x40, 0x80];
}

/// Persistence layout
pub mod storage {
    /// Directory name under the platform cache directory
    pub const DIR_NAME: &str = "fauxcam";

    /// Subdirectory holding per-channel override images
    pub const IMAGES_SUBDIR: &str = "images";

    /// Per-channel file names
    pub const FRONT_FILE: &str = "front.jpg";
    pub const BACK_FILE: &str = "back.jpg";
    pub const SELFIE_FILE: &str = "selfie.jpg";

    /// Settings file name
    pub const SETTINGS_FILE: &str = "fauxcam.json";

    /// Decode-time downsampling divisor for persisted images
    pub const LOAD_DOWNSAMPLE: u32 = 2;
}

/// Launch request actions and extras recognised by the substitution policy
pub mod launch {
    /// Still-image capture request
    pub const ACTION_IMAGE_CAPTURE: &str = "capture.image";

    /// Video capture request
    pub const ACTION_VIDEO_CAPTURE: &str = "capture.video";

    /// Extra carrying the requested device facing ("0" = back, "1" = front)
    pub const EXTRA_CAMERA_FACING: &str = "camera-facing";

    /// Extra carrying a boolean front-camera hint
    pub const EXTRA_USE_FRONT_CAMERA: &str = "use-front-camera";
}

/// Remote-control action strings
pub mod control {
    pub const ACTION_ROTATE_CLOCKWISE: &str = "fauxcam.ACTION_ROTATE_CLOCKWISE";
    pub const ACTION_ROTATE_COUNTERCLOCKWISE: &str = "fauxcam.ACTION_ROTATE_COUNTERCLOCKWISE";
    pub const ACTION_FLIP_HORIZONTALLY: &str = "fauxcam.ACTION_FLIP_HORIZONTALLY";
    pub const ACTION_ZOOM_IN: &str = "fauxcam.ACTION_ZOOM_IN";
    pub const ACTION_ZOOM_OUT: &str = "fauxcam.ACTION_ZOOM_OUT";

    /// Rotation step applied per rotate action
    pub const ROTATE_STEP_DEGREES: i32 = 90;
}
