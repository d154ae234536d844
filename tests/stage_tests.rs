//! Stage tests: loading flow, frame driving and resize, run headless
//! against a counting renderer and a fake surface.

mod common;

use std::path::Path;
use std::time::Duration;

use motion_stage::app::input::Input;
use motion_stage::config::StageConfig;
use motion_stage::gui::PanelEvent;
use motion_stage::helper::HelperFeature;
use motion_stage::renderer::{FrameRenderer, OutputSurface, RenderNode, Viewport};
use motion_stage::scene::{Camera, Scene};
use motion_stage::stage::StageContext;

const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Default)]
struct CountingRenderer {
    frames: usize,
    last_background: Option<[u8; 3]>,
}

impl FrameRenderer for CountingRenderer {
    fn render(&mut self, scene: &Scene, _camera: &Camera, _overlays: &mut [&mut dyn RenderNode]) {
        self.frames += 1;
        self.last_background = Some(scene.background.to_srgb_u8());
    }
}

#[derive(Default)]
struct FakeSurface {
    sizes: Vec<(u32, u32)>,
}

impl OutputSurface for FakeSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.sizes.push((width, height));
    }
}

fn config(root: &Path, motions: &[&str]) -> StageConfig {
    let mut config = StageConfig::default();
    config.assets.root = root.to_string_lossy().into_owned();
    config.assets.model = "alicia.gltf".to_string();
    config.assets.motions = motions.iter().map(|m| (*m).to_string()).collect();
    config
}

fn loaded_stage(dir: &Path, motion_count: usize) -> StageContext {
    common::write_model(dir, "alicia.gltf");
    let names: Vec<String> = (0..motion_count).map(|i| format!("loop_step_{i}.gltf")).collect();
    for name in &names {
        common::write_motion(dir, name, "hip", 1.0);
    }
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();

    let mut stage = StageContext::new(&config(dir, &refs), Viewport::new(800.0, 600.0, 1.0)).unwrap();
    stage.start_loading();
    stage.wait_for_loads(TIMEOUT);
    stage
}

#[test]
fn full_load_attaches_clips_and_builds_panel() {
    let dir = tempfile::tempdir().unwrap();
    let stage = loaded_stage(dir.path(), 3);

    let key = stage.model().expect("model loaded");
    assert_eq!(stage.clip_count(), 3);
    assert_eq!(stage.pending_loads(), 0);

    let panel = stage.panel().expect("panel built");
    assert!(!panel.state().animation);
    assert_eq!(panel.controller().model(), key);

    // Nothing plays until the user asks.
    assert_eq!(stage.helper.mixer(key).unwrap().running_count(), 0);

    let model = stage.scene.model(key).unwrap();
    let root = stage.scene.get_node(model.root).unwrap();
    assert!((root.transform.position.y - (-10.0)).abs() < f32::EPSILON);
}

#[test]
fn missing_model_leaves_empty_stage() {
    let dir = tempfile::tempdir().unwrap();
    let mut stage =
        StageContext::new(&config(dir.path(), &["a.gltf"]), Viewport::new(800.0, 600.0, 1.0)).unwrap();
    stage.start_loading();
    stage.wait_for_loads(TIMEOUT);

    assert!(stage.model().is_none());
    assert!(stage.panel().is_none());
    assert!(stage.scene.grid.is_some());

    let mut renderer = CountingRenderer::default();
    let input = Input::new();
    for expected in 1..=3 {
        stage.tick(1.0 / 60.0, &input, &mut renderer, &mut []);
        assert_eq!(renderer.frames, expected);
    }
    assert_eq!(renderer.last_background, Some([0x00, 0x0f, 0x1e]));
}

#[test]
fn failed_motions_leave_model_without_panel() {
    let dir = tempfile::tempdir().unwrap();
    common::write_model(dir.path(), "alicia.gltf");
    let mut stage = StageContext::new(
        &config(dir.path(), &["gone_1.gltf", "gone_2.gltf"]),
        Viewport::new(800.0, 600.0, 1.0),
    )
    .unwrap();
    stage.start_loading();
    stage.wait_for_loads(TIMEOUT);

    assert!(stage.model().is_some());
    assert_eq!(stage.clip_count(), 0);
    assert!(stage.panel().is_none());

    // Panel events are dropped without a panel.
    stage.apply_panel_events([PanelEvent::ChangeMotion]);
    assert!(stage.panel().is_none());
}

#[test]
fn resize_uses_pixel_ratio_and_skips_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut stage =
        StageContext::new(&config(dir.path(), &[]), Viewport::new(640.0, 480.0, 1.0)).unwrap();
    let mut surface = FakeSurface::default();

    stage.resize(Viewport::new(800.0, 600.0, 2.0), &mut surface);
    assert_eq!(surface.sizes, vec![(1600, 1200)]);
    assert!((stage.camera.aspect - 4.0 / 3.0).abs() < 1e-5);
    assert_eq!(stage.viewport(), Viewport::new(800.0, 600.0, 2.0));

    stage.resize(Viewport::new(800.0, 0.0, 2.0), &mut surface);
    assert_eq!(surface.sizes.len(), 1);
    assert!((stage.camera.aspect - 4.0 / 3.0).abs() < 1e-5);
}

#[test]
fn panel_events_drive_motion_and_background() {
    let dir = tempfile::tempdir().unwrap();
    let mut stage = loaded_stage(dir.path(), 3);
    let key = stage.model().unwrap();

    for k in 1..=4 {
        stage.apply_panel_events([PanelEvent::ChangeMotion]);
        let panel = stage.panel().unwrap();
        assert_eq!(panel.controller().motion_index(), k % 3);
        assert!(panel.state().animation);
        assert_eq!(stage.helper.mixer(key).unwrap().running_count(), 1);
    }
    assert!(stage.helper.is_enabled(HelperFeature::Animation));

    stage.apply_panel_events([
        PanelEvent::ToggleAnimation(false),
        PanelEvent::BackgroundColor(motion_stage::Color::from_hex(0xff0000)),
    ]);
    assert!(!stage.helper.is_enabled(HelperFeature::Animation));
    assert_eq!(stage.scene.background.to_hex(), 0xff0000);

    let mut renderer = CountingRenderer::default();
    stage.tick(1.0 / 60.0, &Input::new(), &mut renderer, &mut []);
    assert_eq!(renderer.frames, 1);
    assert_eq!(renderer.last_background, Some([0xff, 0x00, 0x00]));
}

#[test]
fn malformed_motion_is_dropped_and_playback_continues() {
    let dir = tempfile::tempdir().unwrap();
    common::write_model(dir.path(), "alicia.gltf");
    let half = std::f32::consts::FRAC_1_SQRT_2;
    common::write_rotation_keys(
        dir.path(),
        "bad.gltf",
        "hip",
        &[0.0, 0.5, 1.0],
        &[[0.0, 0.0, 0.0, 1.0], [0.0, half, 0.0, half]],
    );
    common::write_motion(dir.path(), "good.gltf", "hip", 1.0);

    let mut config = config(dir.path(), &["bad.gltf", "good.gltf"]);
    config.assets.ordering = motion_stage::ClipOrdering::Requested;
    let mut stage = StageContext::new(&config, Viewport::new(800.0, 600.0, 1.0)).unwrap();
    stage.start_loading();
    stage.wait_for_loads(TIMEOUT);
    assert_eq!(stage.clip_count(), 1);

    let mut renderer = CountingRenderer::default();
    let input = Input::new();
    for _ in 0..3 {
        stage.apply_panel_events([PanelEvent::ChangeMotion]);
        stage.tick(0.25, &input, &mut renderer, &mut []);
    }
    assert_eq!(renderer.frames, 3);
    assert_eq!(stage.panel().unwrap().controller().motion_index(), 0);
}
