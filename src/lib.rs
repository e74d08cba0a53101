// SPDX-License-Identifier: MPL-2.0

//! fauxcam - capture-call interception and synthetic image substitution
//!
//! This library lets a host process intercept "start a new screen" and
//! "capture an image" calls and substitute operator-controlled synthetic
//! results while preserving each caller's contract (callback order, buffer
//! layout, result delivery).
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`engine`]: Per-channel synthetic images, transforms and enhancement
//! - [`encoder`]: Capacity-constrained JPEG encoding
//! - [`intercept`]: The policy chain and the capture-site interceptors
//! - [`provider`]: The host-supplied interception capability
//! - [`runtime`]: Process-wide install/teardown and the accessor surface
//! - [`storage`]: Per-channel persistence and asset fallback
//! - [`control`]: Remote-control action routing
//! - [`config`]: Settings loaded once at install time
//!
//! How call dispatch is physically rewritten is out of scope here; the
//! host supplies that as an [`provider::InterceptionProvider`] and
//! forwards intercepted calls to [`runtime::Runtime`].

pub mod config;
pub mod constants;
pub mod control;
pub mod encoder;
pub mod engine;
pub mod errors;
pub mod intercept;
pub mod provider;
pub mod runtime;
pub mod storage;

pub use config::Settings;
pub use engine::{Channel, ChannelKind, SubstitutionEngine, ZoomDirection};
pub use errors::{HookError, HookResult};
pub use intercept::{
    CaptureInterceptor, Decision, DispatchOutcome, InterceptionChain, LaunchPolicy,
    LaunchRequest, LaunchSubstitutionPolicy, PickerFlow,
};
pub use provider::{CallSite, DeliveredOutcome, InterceptionProvider, LaunchResult};
pub use runtime::{Runtime, install, installed, teardown};
pub use storage::{AssetSource, ChannelStore, DirAssets, NoAssets};
