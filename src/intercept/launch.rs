// SPDX-License-Identifier: GPL-3.0-only

//! Capture-launch substitution policy
//!
//! Vetoes image- and video-capture launch requests and redirects them to a
//! local picker flow. The verdict is always a veto rather than a direct
//! replacement: the synthetic result does not exist yet at dispatch time
//! and is delivered later, once the picker completes.

use super::chain::{Decision, LaunchPolicy, LaunchRequest};
use crate::constants::jpeg::PICKER_QUALITY;
use crate::constants::launch::{
    ACTION_IMAGE_CAPTURE, ACTION_VIDEO_CAPTURE, EXTRA_CAMERA_FACING, EXTRA_USE_FRONT_CAMERA,
};
use crate::encoder;
use crate::errors::HookError;
use crate::provider::{DeliveredOutcome, InterceptionProvider, LaunchResult};
use image::imageops;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};
use uuid::Uuid;

/// Fire-and-forget image selection flow started when a capture launch is
/// vetoed
///
/// The implementation eventually hands its result to
/// [`LaunchSubstitutionPolicy::complete`]; if it never does, the original
/// caller simply never receives one. There is no timeout.
pub trait PickerFlow: Send + Sync {
    fn start(&self, output: Option<&Path>, front_facing: bool);
}

#[derive(Debug, Clone)]
struct Pending {
    caller: String,
    correlation_id: Uuid,
    output: Option<PathBuf>,
    front_facing: bool,
}

/// Chain policy that redirects capture launches to the picker flow
pub struct LaunchSubstitutionPolicy {
    provider: Arc<dyn InterceptionProvider>,
    picker: Arc<dyn PickerFlow>,
    pending: Mutex<Option<Pending>>,
}

impl LaunchSubstitutionPolicy {
    pub fn new(provider: Arc<dyn InterceptionProvider>, picker: Arc<dyn PickerFlow>) -> Self {
        Self {
            provider,
            picker,
            pending: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Pending>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand the picker's result to the vetoed caller
    ///
    /// `picked` carries encoded image bytes, or `None` when the user
    /// abandoned the flow. The pending record is cleared before delivery,
    /// so a later unrelated request can never be answered with stale state.
    pub fn complete(&self, picked: Option<Vec<u8>>) {
        let Some(pending) = self.lock().take() else {
            warn!("Picker completion with no pending capture request");
            return;
        };
        let outcome = match picked {
            Some(bytes) => match finish(&pending, bytes) {
                Ok(result) => DeliveredOutcome::Success(result),
                Err(e) => {
                    warn!(caller = %pending.caller, error = %e, "Failed to finalize picked image");
                    DeliveredOutcome::Cancelled
                }
            },
            None => {
                info!(caller = %pending.caller, "Picker cancelled");
                DeliveredOutcome::Cancelled
            }
        };
        if let Err(e) = self.provider.deliver_result(pending.correlation_id, outcome) {
            warn!(caller = %pending.caller, error = %e, "Result delivery failed");
        }
    }
}

impl LaunchPolicy for LaunchSubstitutionPolicy {
    fn name(&self) -> &str {
        "launch-substitution"
    }

    fn on_launch(&self, request: &LaunchRequest) -> Result<Decision, HookError> {
        if !is_capture_action(&request.action) {
            return Ok(Decision::Pass);
        }
        let front_facing = front_facing_hint(request);
        {
            let mut pending = self.lock();
            if pending.is_some() {
                warn!("Replacing stale pending capture request");
            }
            *pending = Some(Pending {
                caller: request.caller.clone(),
                correlation_id: request.correlation_id,
                output: request.output.clone(),
                front_facing,
            });
        }
        info!(
            caller = %request.caller,
            action = %request.action,
            front_facing,
            "Vetoing capture launch, starting picker"
        );
        self.picker.start(request.output.as_deref(), front_facing);
        Ok(Decision::Veto)
    }
}

fn is_capture_action(action: &str) -> bool {
    action == ACTION_IMAGE_CAPTURE || action == ACTION_VIDEO_CAPTURE
}

/// Facing requested by the launch extras, defaulting to back
fn front_facing_hint(request: &LaunchRequest) -> bool {
    if let Some(facing) = request.extras.int(EXTRA_CAMERA_FACING) {
        return facing == 1;
    }
    request
        .extras
        .flag(EXTRA_USE_FRONT_CAMERA)
        .unwrap_or(false)
}

/// Mirror front-facing picks, then route bytes to the recorded destination
fn finish(pending: &Pending, bytes: Vec<u8>) -> Result<LaunchResult, HookError> {
    let bytes = if pending.front_facing {
        let img = image::load_from_memory(&bytes)
            .map_err(|e| HookError::Other(e.to_string()))?
            .to_rgb8();
        let mirrored = imageops::flip_horizontal(&img);
        encoder::encode_jpeg(&mirrored, PICKER_QUALITY)?
    } else {
        bytes
    };
    match &pending.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| HookError::Other(e.to_string()))?;
            }
            std::fs::write(path, &bytes).map_err(|e| HookError::Other(e.to_string()))?;
            info!(path = %path.display(), len = bytes.len(), "Wrote picked image");
            Ok(LaunchResult {
                data: None,
                output: Some(path.clone()),
            })
        }
        None => Ok(LaunchResult {
            data: Some(bytes),
            output: None,
        }),
    }
}
