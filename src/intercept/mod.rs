// SPDX-License-Identifier: GPL-3.0-only

//! Call interception: the policy chain and the capture-site interceptors

pub mod capture;
pub mod chain;
pub mod launch;

pub use capture::{AcquiredImage, CallbackCapture, CaptureInterceptor, Facing, PixelFormat, Plane};
pub use chain::{Decision, DispatchOutcome, ExtraValue, Extras, InterceptionChain, LaunchPolicy, LaunchRequest};
pub use launch::{LaunchSubstitutionPolicy, PickerFlow};
