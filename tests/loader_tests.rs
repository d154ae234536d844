//! Asset loading tests: glTF decoding and the background loader.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use motion_stage::assets::{
    AssetLoader, AssetReader, ClipOrdering, FileAssetReader, LoadEvent, load_model, load_motion,
};
use motion_stage::errors::{Error, Result};
use motion_stage::scene::Scene;

const TIMEOUT: Duration = Duration::from_secs(10);

/// Reads through to the filesystem, holding each read open for a while and
/// recording how many overlap.
struct SlowReader {
    inner: FileAssetReader,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl AssetReader for SlowReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _ = tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_millis(30))).await;
        let bytes = self.inner.read_bytes(uri).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        bytes
    }
}

/// Loads six motions through a [`SlowReader`] and returns the peak overlap.
fn peak_concurrent_reads(max_concurrent: Option<usize>) -> usize {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<String> = (0..6).map(|i| format!("m{i}.gltf")).collect();
    for path in &paths {
        common::write_motion(dir.path(), path, "hip", 1.0);
    }

    let peak = Arc::new(AtomicUsize::new(0));
    let reader = SlowReader {
        inner: FileAssetReader::new(dir.path()),
        active: Arc::new(AtomicUsize::new(0)),
        peak: peak.clone(),
    };
    let mut loader = AssetLoader::with_reader(reader, ClipOrdering::Completion, max_concurrent).unwrap();
    loader.request_motions(&paths);

    let mut loaded = 0;
    while loaded < paths.len() {
        match loader.wait_event(TIMEOUT) {
            Some(LoadEvent::Motion { result, .. }) => {
                assert!(result.is_ok());
                loaded += 1;
            }
            Some(LoadEvent::Model { .. }) => panic!("no model was requested"),
            None => panic!("timed out with {loaded} motions loaded"),
        }
    }
    peak.load(Ordering::SeqCst)
}

#[test]
fn concurrency_bound_limits_overlapping_fetches() {
    let bounded = peak_concurrent_reads(Some(2));
    assert!((1..=2).contains(&bounded), "peak {bounded}");

    let unbounded = peak_concurrent_reads(None);
    assert!(unbounded > 2, "peak {unbounded}");
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Runtime::new().unwrap().block_on(future)
}

#[test]
fn decodes_model_hierarchy() {
    let dir = tempfile::tempdir().unwrap();
    common::write_model(dir.path(), "alicia.gltf");
    let reader = FileAssetReader::new(dir.path());

    let data = block_on(load_model(&reader, "alicia.gltf")).unwrap();
    assert_eq!(data.name, "alicia");
    assert_eq!(data.nodes.len(), 3);
    assert_eq!(data.primitives.len(), 1);

    let mut scene = Scene::new();
    let model = data.instantiate(&mut scene);
    assert_eq!(scene.get_node(model.root).unwrap().name, "alicia");
    assert!(scene.find_node_by_name(model.root, "hair_tip").is_some());
    // Instantiating does not register the model.
    assert!(scene.models.is_empty());
}

#[test]
fn missing_files_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let reader = FileAssetReader::new(dir.path());
    assert!(matches!(
        block_on(load_model(&reader, "nope.gltf")),
        Err(Error::IoError(_))
    ));
    assert!(block_on(load_motion(&reader, "nope.gltf")).is_err());
}

#[test]
fn empty_documents_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    common::write_empty(dir.path(), "empty.gltf");
    let reader = FileAssetReader::new(dir.path());

    assert!(matches!(
        block_on(load_model(&reader, "empty.gltf")),
        Err(Error::EmptyModel(_))
    ));
    assert!(matches!(
        block_on(load_motion(&reader, "empty.gltf")),
        Err(Error::NoAnimation(_))
    ));
}

#[test]
fn motion_is_one_clip_named_after_file() {
    let dir = tempfile::tempdir().unwrap();
    common::write_motion(dir.path(), "motions/loop_step_1.gltf", "hip", 2.0);
    let reader = FileAssetReader::new(dir.path());

    let clip = block_on(load_motion(&reader, "motions/loop_step_1.gltf")).unwrap();
    assert_eq!(clip.name, "loop_step_1");
    assert_eq!(clip.track_count(), 1);
    assert!((clip.duration - 2.0).abs() < 1e-5);
}

#[test]
fn mismatched_sampler_counts_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let half = std::f32::consts::FRAC_1_SQRT_2;
    common::write_rotation_keys(
        dir.path(),
        "short.gltf",
        "hip",
        &[0.0, 0.5, 1.0],
        &[[0.0, 0.0, 0.0, 1.0], [0.0, half, 0.0, half]],
    );
    let reader = FileAssetReader::new(dir.path());

    assert!(matches!(
        block_on(load_motion(&reader, "short.gltf")),
        Err(Error::NoAnimation(_))
    ));
}

#[test]
fn loader_delivers_one_event_per_motion() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<String> = (0..4).map(|i| format!("m{i}.gltf")).collect();
    for path in &paths {
        common::write_motion(dir.path(), path, "hip", 1.0);
    }

    let mut loader = AssetLoader::new(dir.path(), ClipOrdering::Completion, None).unwrap();
    loader.request_motions(&paths);
    assert_eq!(loader.pending(), 4);

    let mut seen = Vec::new();
    while let Some(event) = loader.wait_event(TIMEOUT) {
        match event {
            LoadEvent::Motion { index, result, .. } => {
                assert!(result.is_ok());
                seen.push(index);
            }
            LoadEvent::Model { .. } => panic!("no model was requested"),
        }
        if seen.len() == paths.len() {
            break;
        }
    }
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3]);
    assert_eq!(loader.pending(), 0);
}

#[test]
fn requested_ordering_releases_in_request_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths: Vec<String> = (0..5).map(|i| format!("m{i}.gltf")).collect();
    for path in &paths {
        common::write_motion(dir.path(), path, "hip", 1.0);
    }
    // One request fails; its slot still settles.
    paths[2] = "missing.gltf".to_string();

    let mut loader = AssetLoader::new(dir.path(), ClipOrdering::Requested, Some(2)).unwrap();
    assert_eq!(loader.ordering(), ClipOrdering::Requested);
    loader.request_motions(&paths);

    let mut order = Vec::new();
    let mut failed = Vec::new();
    while order.len() < paths.len() {
        let Some(event) = loader.wait_event(TIMEOUT) else {
            break;
        };
        if let LoadEvent::Motion { index, result, .. } = event {
            if result.is_err() {
                failed.push(index);
            }
            order.push(index);
        }
    }
    assert_eq!(order, vec![0, 1, 2, 3, 4]);
    assert_eq!(failed, vec![2]);
}

#[test]
fn model_event_carries_path() {
    let dir = tempfile::tempdir().unwrap();
    common::write_model(dir.path(), "model.gltf");

    let mut loader = AssetLoader::new(dir.path(), ClipOrdering::Completion, None).unwrap();
    loader.request_model("model.gltf");
    match loader.wait_event(TIMEOUT) {
        Some(LoadEvent::Model { path, result }) => {
            assert_eq!(path, "model.gltf");
            assert!(result.is_ok());
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(loader.poll_events().is_empty());
}
