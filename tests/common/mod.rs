//! glTF fixtures written to temporary directories.
//!
//! Buffers are embedded as base64 data URIs so each fixture is a single
//! `.gltf` file.

#![allow(dead_code)]

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;

fn data_uri(bytes: &[u8]) -> String {
    format!("data:application/octet-stream;base64,{}", STANDARD.encode(bytes))
}

fn floats(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// A single triangle on node "hip" with a "hair_1" child bone.
pub fn write_model(dir: &Path, file: &str) {
    let positions = floats(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    let doc = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "hip", "mesh": 0, "children": [1] },
            { "name": "hair_1", "translation": [0.0, 5.0, 0.0], "children": [2] },
            { "name": "hair_tip", "translation": [1.0, 0.0, 0.0] }
        ],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
        "buffers": [{ "byteLength": positions.len(), "uri": data_uri(&positions) }],
        "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": positions.len() }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 1.0, 0.0]
        }]
    });
    write_json(dir, file, &doc);
}

/// One rotation channel on a node named `bone`, lasting `duration` seconds.
pub fn write_motion(dir: &Path, file: &str, bone: &str, duration: f32) {
    let half = std::f32::consts::FRAC_1_SQRT_2;
    write_rotation_keys(
        dir,
        file,
        bone,
        &[0.0, duration],
        &[[0.0, 0.0, 0.0, 1.0], [0.0, half, 0.0, half]],
    );
}

/// One linear rotation channel with the given key times and values. The
/// two counts are written as given, even when they disagree.
pub fn write_rotation_keys(dir: &Path, file: &str, bone: &str, times: &[f32], rotations: &[[f32; 4]]) {
    let mut bytes = floats(times);
    let times_len = bytes.len();
    bytes.extend(floats(&rotations.concat()));
    let end = times.last().copied().unwrap_or(0.0);

    let doc = json!({
        "asset": { "version": "2.0" },
        "nodes": [{ "name": bone }],
        "buffers": [{ "byteLength": bytes.len(), "uri": data_uri(&bytes) }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": times_len },
            { "buffer": 0, "byteOffset": times_len, "byteLength": bytes.len() - times_len }
        ],
        "accessors": [
            {
                "bufferView": 0,
                "componentType": 5126,
                "count": times.len(),
                "type": "SCALAR",
                "min": [0.0],
                "max": [end]
            },
            { "bufferView": 1, "componentType": 5126, "count": rotations.len(), "type": "VEC4" }
        ],
        "animations": [{
            "name": "take",
            "samplers": [{ "input": 0, "output": 1, "interpolation": "LINEAR" }],
            "channels": [{ "sampler": 0, "target": { "node": 0, "path": "rotation" } }]
        }]
    });
    write_json(dir, file, &doc);
}

/// A valid glTF without meshes or animations.
pub fn write_empty(dir: &Path, file: &str) {
    write_json(dir, file, &json!({ "asset": { "version": "2.0" }, "nodes": [{ "name": "lonely" }] }));
}

fn write_json(dir: &Path, file: &str, doc: &serde_json::Value) {
    let path = dir.join(file);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture dir");
    }
    std::fs::write(path, serde_json::to_vec_pretty(doc).expect("serialize fixture"))
        .expect("write fixture");
}
