// SPDX-License-Identifier: GPL-3.0-only

//! Remote-control action routing
//!
//! A thin surface for notification- or broadcast-driven control: the host
//! passes the received action string and the matching transform is applied
//! to the active channel of the installed runtime.

use crate::constants::control::{
    ACTION_FLIP_HORIZONTALLY, ACTION_ROTATE_CLOCKWISE, ACTION_ROTATE_COUNTERCLOCKWISE,
    ACTION_ZOOM_IN, ACTION_ZOOM_OUT, ROTATE_STEP_DEGREES,
};
use crate::engine::ZoomDirection;
use crate::runtime;
use tracing::{debug, info};

/// Apply the transform a control action names
///
/// Returns whether the action was recognized. Unknown actions are ignored,
/// so the host can route its whole action stream through here.
pub fn handle_action(action: &str) -> bool {
    match action {
        ACTION_ROTATE_CLOCKWISE => runtime::apply_rotation(ROTATE_STEP_DEGREES),
        ACTION_ROTATE_COUNTERCLOCKWISE => runtime::apply_rotation(-ROTATE_STEP_DEGREES),
        ACTION_FLIP_HORIZONTALLY => runtime::apply_flip(),
        ACTION_ZOOM_IN => runtime::apply_zoom(ZoomDirection::In),
        ACTION_ZOOM_OUT => runtime::apply_zoom(ZoomDirection::Out),
        _ => {
            debug!(action, "Ignoring unknown control action");
            return false;
        }
    }
    info!(action, "Handled control action");
    true
}
