// SPDX-License-Identifier: MPL-2.0

//! Integration test for the process-wide runtime lifecycle
//!
//! The runtime is a per-process singleton, so the whole lifecycle runs in
//! one test function instead of racing across parallel test threads.

use fauxcam::constants::{control, launch};
use fauxcam::intercept::Facing;
use fauxcam::{
    CallSite, ChannelKind, DeliveredOutcome, DispatchOutcome, InterceptionProvider,
    LaunchRequest, PickerFlow,
};
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
struct RecordingProvider {
    armed: Mutex<Vec<CallSite>>,
    delivered: Mutex<Vec<(Uuid, DeliveredOutcome)>>,
}

impl InterceptionProvider for RecordingProvider {
    fn install_hook(&self, site: CallSite) -> Result<(), fauxcam::errors::InstallError> {
        self.armed.lock().unwrap().push(site);
        Ok(())
    }

    fn deliver_result(
        &self,
        correlation_id: Uuid,
        outcome: DeliveredOutcome,
    ) -> Result<(), fauxcam::errors::InstallError> {
        self.delivered.lock().unwrap().push((correlation_id, outcome));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingPicker {
    started: Mutex<Vec<(Option<PathBuf>, bool)>>,
}

impl PickerFlow for RecordingPicker {
    fn start(&self, output: Option<&Path>, front_facing: bool) {
        self.started
            .lock()
            .unwrap()
            .push((output.map(Path::to_path_buf), front_facing));
    }
}

#[test]
fn test_install_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("fauxcam.json");
    std::fs::write(
        &settings_path,
        format!(
            r#"{{ "data_dir": {:?} }}"#,
            dir.path().join("images").to_string_lossy()
        ),
    )
    .unwrap();

    let provider = Arc::new(RecordingProvider::default());
    let picker = Arc::new(RecordingPicker::default());

    let rt = fauxcam::install(
        provider.clone(),
        picker.clone(),
        &fauxcam::NoAssets,
        Some(&settings_path),
    );
    assert!(fauxcam::installed().is_some(), "Runtime should be installed");
    assert_eq!(
        provider.armed.lock().unwrap().len(),
        CallSite::ALL.len(),
        "All call sites should be armed on install"
    );

    // A second install is a no-op returning the same runtime.
    let again = fauxcam::install(
        provider.clone(),
        picker.clone(),
        &fauxcam::NoAssets,
        Some(&settings_path),
    );
    assert!(Arc::ptr_eq(&rt, &again), "Install must be idempotent");
    assert_eq!(provider.armed.lock().unwrap().len(), CallSite::ALL.len());

    // Free-function surface drives the engine.
    fauxcam::runtime::set_image(
        ChannelKind::Front,
        RgbImage::from_pixel(100, 50, Rgb([10, 10, 10])),
    );
    let img = fauxcam::runtime::current_image().expect("front image should be loaded");
    assert_eq!(img.dimensions(), (100, 50));

    // Control actions route to the active channel.
    assert!(fauxcam::control::handle_action(control::ACTION_ROTATE_CLOCKWISE));
    let img = fauxcam::runtime::current_image().unwrap();
    assert_eq!(img.dimensions(), (50, 100), "Rotate action should apply");

    // Persisted override survives under the configured data_dir.
    assert!(
        dir.path().join("images").join("front.jpg").exists(),
        "set_image should persist the override file"
    );

    // Device-open detection flows through the runtime entry point.
    rt.device_open(Facing::Front, 0);
    assert!(fauxcam::runtime::is_selfie_mode());
    rt.device_open(Facing::Back, 0);
    assert!(!fauxcam::runtime::is_selfie_mode());
    assert!(fauxcam::runtime::is_front_side());

    // Launch interception end to end.
    let out = dir.path().join("picked.jpg");
    let request =
        LaunchRequest::new(launch::ACTION_IMAGE_CAPTURE, "com.example.app").with_output(&out);
    assert!(matches!(rt.dispatch_launch(&request), DispatchOutcome::Vetoed));
    assert_eq!(picker.started.lock().unwrap().len(), 1);
    rt.picker_complete(Some(vec![0xFF, 0xD8, 0xFF, 0xD9]));
    {
        let delivered = provider.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, request.correlation_id);
        assert!(matches!(delivered[0].1, DeliveredOutcome::Success(_)));
    }

    // A completion with nothing pending delivers nothing.
    rt.picker_complete(Some(vec![1]));
    assert_eq!(provider.delivered.lock().unwrap().len(), 1);

    fauxcam::teardown();
    assert!(fauxcam::installed().is_none(), "Teardown should clear the slot");
    assert!(
        fauxcam::runtime::current_image().is_none(),
        "No image is served without an installed runtime"
    );
}
