// SPDX-License-Identifier: GPL-3.0-only

//! Interception provider capability
//!
//! Physically rewriting the host's call dispatch (trampolines, dispatch
//! table patching, instrumentation wrapping) is not part of this crate.
//! The host supplies an [`InterceptionProvider`] with two primitives:
//! arming a call site, and delivering a result back to a caller whose
//! original call was vetoed. Once a site is armed, the host's glue code
//! forwards intercepted calls to the matching entry point on
//! [`crate::runtime::Runtime`].

use crate::errors::InstallError;
use std::path::PathBuf;
use uuid::Uuid;

/// Call sites the core expects the host to arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallSite {
    /// "Start a new screen/activity" entry point
    Launch,
    /// Callback-delivery capture call (shutter/raw/postview/final handles)
    PictureCallbacks,
    /// Buffer-acquisition capture call (caller-owned plane buffers)
    ImageAcquire,
    /// Capture-device open call (facing detection)
    DeviceOpen,
}

impl CallSite {
    /// All sites armed by a full install, in installation order
    pub const ALL: [CallSite; 4] = [
        CallSite::Launch,
        CallSite::PictureCallbacks,
        CallSite::ImageAcquire,
        CallSite::DeviceOpen,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            CallSite::Launch => "launch",
            CallSite::PictureCallbacks => "picture-callbacks",
            CallSite::ImageAcquire => "image-acquire",
            CallSite::DeviceOpen => "device-open",
        }
    }
}

/// Result handed back to a launch caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchResult {
    /// Inline image bytes, when the caller asked for data in the result
    pub data: Option<Vec<u8>>,
    /// Destination the image was written to, when the caller supplied one
    pub output: Option<PathBuf>,
}

/// Outcome delivered to the original caller of a vetoed launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveredOutcome {
    /// The capture flow produced a result
    Success(LaunchResult),
    /// The capture flow was abandoned or produced nothing
    Cancelled,
}

/// Host-supplied interception capability
pub trait InterceptionProvider: Send + Sync {
    /// Arm a call site so intercepted calls reach this crate
    ///
    /// Failure affects only the given site; the caller continues with the
    /// remaining sites.
    fn install_hook(&self, site: CallSite) -> Result<(), InstallError>;

    /// Deliver an outcome to the original caller of a vetoed launch,
    /// keyed by the request's correlation id, through the same
    /// result-delivery mechanism the real call would have used.
    fn deliver_result(
        &self,
        correlation_id: Uuid,
        outcome: DeliveredOutcome,
    ) -> Result<(), InstallError>;
}
