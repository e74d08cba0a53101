// SPDX-License-Identifier: GPL-3.0-only

//! Process-wide runtime lifecycle
//!
//! [`install`] wires everything together exactly once per process: load
//! settings, populate the channels, build the chain and the interceptor,
//! arm the call sites. The host's glue code then forwards intercepted
//! calls to the entry points on [`Runtime`], and UI surfaces drive the
//! engine through the free-function accessors at the bottom of this
//! module.

use crate::config::Settings;
use crate::engine::{ChannelKind, SubstitutionEngine, ZoomDirection};
use crate::intercept::capture::{AcquiredImage, CallbackCapture, CaptureInterceptor, Facing};
use crate::intercept::chain::{DispatchOutcome, InterceptionChain, LaunchRequest};
use crate::intercept::launch::{LaunchSubstitutionPolicy, PickerFlow};
use crate::provider::{CallSite, InterceptionProvider};
use crate::storage::{AssetSource, ChannelStore};
use image::RgbImage;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, info, warn};

static RUNTIME: OnceLock<Mutex<Option<Arc<Runtime>>>> = OnceLock::new();

fn slot() -> MutexGuard<'static, Option<Arc<Runtime>>> {
    RUNTIME
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Everything the interception machinery needs, wired together
pub struct Runtime {
    settings: Settings,
    engine: Arc<SubstitutionEngine>,
    chain: InterceptionChain,
    interceptor: CaptureInterceptor,
    policy: Arc<LaunchSubstitutionPolicy>,
}

impl Runtime {
    fn create(
        provider: Arc<dyn InterceptionProvider>,
        picker: Arc<dyn PickerFlow>,
        assets: &dyn AssetSource,
        settings_path: Option<&Path>,
    ) -> Arc<Self> {
        let settings = Settings::load_or_default(settings_path);

        let store = match &settings.data_dir {
            Some(dir) => Some(ChannelStore::new(dir)),
            None => match ChannelStore::default_dir() {
                Ok(store) => Some(store),
                Err(e) => {
                    warn!(error = %e, "No persistence directory, channel images will not survive restarts");
                    None
                }
            },
        };

        let engine = Arc::new(SubstitutionEngine::new(
            settings.selfie_rotation_offset,
            store,
        ));
        engine.load_channels(assets);

        let chain = InterceptionChain::new(Arc::clone(&provider));
        let policy = Arc::new(LaunchSubstitutionPolicy::new(
            Arc::clone(&provider),
            picker,
        ));
        chain.register(policy.clone());

        for site in [
            CallSite::PictureCallbacks,
            CallSite::ImageAcquire,
            CallSite::DeviceOpen,
        ] {
            if let Err(e) = provider.install_hook(site) {
                warn!(
                    site = site.display_name(),
                    error = %e,
                    "Failed to arm call site, continuing with the rest"
                );
            }
        }

        let interceptor = CaptureInterceptor::new(Arc::clone(&engine));
        Arc::new(Self {
            settings,
            engine,
            chain,
            interceptor,
            policy,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn engine(&self) -> &Arc<SubstitutionEngine> {
        &self.engine
    }

    pub fn chain(&self) -> &InterceptionChain {
        &self.chain
    }

    /// Entry point for an intercepted launch call
    pub fn dispatch_launch(&self, request: &LaunchRequest) -> DispatchOutcome {
        self.chain.dispatch(request)
    }

    /// Entry point for an intercepted callback-delivery capture call
    pub fn picture_callbacks(&self, capture: CallbackCapture<'_>) {
        self.interceptor.on_picture_callbacks(capture);
    }

    /// Entry point for an intercepted buffer-acquisition capture call
    pub fn image_acquired(&self, image: &mut AcquiredImage<'_>) {
        self.interceptor.on_image_acquired(image);
    }

    /// Entry point for an intercepted capture-device open
    pub fn device_open(&self, facing: Facing, display_rotation: u32) {
        self.interceptor.on_device_open(facing, display_rotation);
    }

    /// Completion callback for the picker flow
    pub fn picker_complete(&self, picked: Option<Vec<u8>>) {
        self.policy.complete(picked);
    }
}

/// Install the runtime; only the first call per process has effect
pub fn install(
    provider: Arc<dyn InterceptionProvider>,
    picker: Arc<dyn PickerFlow>,
    assets: &dyn AssetSource,
    settings_path: Option<&Path>,
) -> Arc<Runtime> {
    init_logging();
    let mut slot = slot();
    if let Some(rt) = slot.as_ref() {
        debug!("Runtime already installed");
        return Arc::clone(rt);
    }
    info!("Installing runtime");
    let rt = Runtime::create(provider, picker, assets, settings_path);
    *slot = Some(Arc::clone(&rt));
    rt
}

/// Drop the installed runtime, if any
///
/// Existing `Arc<Runtime>` handles stay valid; only the global slot is
/// cleared, so a later [`install`] builds a fresh runtime.
pub fn teardown() {
    if slot().take().is_some() {
        info!("Runtime torn down");
    }
}

/// Currently installed runtime, if any
pub fn installed() -> Option<Arc<Runtime>> {
    slot().clone()
}

/// Structured logging to stderr, filtered by `RUST_LOG`
///
/// Safe to call when the host already installed a subscriber; the second
/// initialization is simply ignored.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .try_init();
}

/// Replace a channel image on the installed runtime
pub fn set_image(kind: ChannelKind, img: RgbImage) {
    if let Some(rt) = installed() {
        rt.engine().set_image(kind, img);
    } else {
        warn!("set_image before install");
    }
}

/// Rotate the active channel on the installed runtime
pub fn apply_rotation(delta: i32) {
    if let Some(rt) = installed() {
        rt.engine().apply_rotation(delta);
    }
}

/// Flip the active channel on the installed runtime
pub fn apply_flip() {
    if let Some(rt) = installed() {
        rt.engine().apply_flip();
    }
}

/// Zoom the active channel on the installed runtime
pub fn apply_zoom(direction: ZoomDirection) {
    if let Some(rt) = installed() {
        rt.engine().apply_zoom(direction);
    }
}

/// Enhanced image of the active channel on the installed runtime
pub fn current_image() -> Option<RgbImage> {
    installed().and_then(|rt| rt.engine().current_image())
}

pub fn is_selfie_mode() -> bool {
    installed().is_some_and(|rt| rt.engine().is_selfie_mode())
}

pub fn is_front_side() -> bool {
    installed().is_some_and(|rt| rt.engine().is_front_side())
}
