//! Asset Loading Tests
//!
//! Tests for:
//! - LoadProgress percentage and indicator text, including unknown totals
//! - ModelLoader: glTF with an embedded buffer, skins and named clips
//! - Error reporting for missing files and malformed documents
//! - Animation channels whose value count does not match their times
//! - LoadTask: background load drained through `poll`/`wait`

use std::path::PathBuf;

use base64::Engine;

use avatar_stage::animation::AnimationClip;
use avatar_stage::assets::{LOADING_TEXT, LoadEvent, LoadProgress, ModelLoader};
use avatar_stage::errors::StageError;
use avatar_stage::scene::Scene;

// ============================================================================
// LoadProgress
// ============================================================================

#[test]
fn progress_percent_rounds() {
    assert_eq!(LoadProgress::new(1, Some(3)).percent(), Some(33));
    assert_eq!(LoadProgress::new(2, Some(3)).percent(), Some(67));
    assert_eq!(LoadProgress::new(1, Some(200)).percent(), Some(1));
    assert_eq!(LoadProgress::new(50, Some(100)).percent(), Some(50));
}

#[test]
fn progress_percent_bounds() {
    assert_eq!(LoadProgress::new(0, Some(10)).percent(), Some(0));
    assert_eq!(LoadProgress::new(10, Some(10)).percent(), Some(100));
    // More bytes than announced never reads above 100
    assert_eq!(LoadProgress::new(15, Some(10)).percent(), Some(100));
}

#[test]
fn progress_unknown_or_zero_total_has_no_percent() {
    assert_eq!(LoadProgress::new(123, None).percent(), None);
    assert_eq!(LoadProgress::new(0, Some(0)).percent(), None);
    assert_eq!(LoadProgress::new(5, Some(0)).percent(), None);
}

#[test]
fn progress_loading_text() {
    assert_eq!(LoadProgress::new(42, Some(100)).loading_text(), "Loading.. 42%");
    assert_eq!(LoadProgress::new(7, None).loading_text(), LOADING_TEXT);
    assert_eq!(LoadProgress::new(0, Some(0)).loading_text(), "Loading..");
}

// ============================================================================
// Fixture: skinned triangle with two clips
// ============================================================================

/// Binary layout, in bytes:
/// positions 0..36, joints 36..60, weights 60..108, inverse bind 108..172,
/// times 172..180, rotations 180..212, translations 212..236
fn fixture_buffer() -> Vec<u8> {
    let mut bytes = Vec::new();

    let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let joints: [u16; 12] = [0; 12];
    let weights: [f32; 12] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
    let inverse_bind = glam::Mat4::IDENTITY.to_cols_array();
    let times: [f32; 2] = [0.0, 1.0];
    let half = std::f32::consts::FRAC_1_SQRT_2;
    let rotations: [f32; 8] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, half, half];
    let translations: [f32; 6] = [0.0, 0.0, 0.0, 0.0, 1.0, 0.0];

    bytes.extend_from_slice(bytemuck::cast_slice(&positions));
    bytes.extend_from_slice(bytemuck::cast_slice(&joints));
    bytes.extend_from_slice(bytemuck::cast_slice(&weights));
    bytes.extend_from_slice(bytemuck::cast_slice(&inverse_bind));
    bytes.extend_from_slice(bytemuck::cast_slice(&times));
    bytes.extend_from_slice(bytemuck::cast_slice(&rotations));
    bytes.extend_from_slice(bytemuck::cast_slice(&translations));
    assert_eq!(bytes.len(), 236);
    bytes
}

const FIXTURE_TEMPLATE: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "nodes": [0] }],
  "nodes": [
    { "name": "Armature", "children": [1, 2] },
    { "name": "Body", "mesh": 0, "skin": 0 },
    { "name": "Hips", "translation": [0.0, 0.0, 0.0] }
  ],
  "meshes": [{
    "name": "Body",
    "primitives": [{ "attributes": { "POSITION": 0, "JOINTS_0": 1, "WEIGHTS_0": 2 } }]
  }],
  "skins": [{ "name": "Skeleton", "joints": [2], "inverseBindMatrices": 3 }],
  "animations": [
    {
      "name": "waving",
      "channels": [{ "sampler": 0, "target": { "node": 2, "path": "rotation" } }],
      "samplers": [{ "input": 4, "output": 5, "interpolation": "LINEAR" }]
    },
    {
      "name": "salut",
      "channels": [{ "sampler": 0, "target": { "node": 2, "path": "translation" } }],
      "samplers": [{ "input": 4, "output": 6, "interpolation": "STEP" }]
    }
  ],
  "buffers": [{ "byteLength": 236, "uri": "@URI@" }],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 24 },
    { "buffer": 0, "byteOffset": 60, "byteLength": 48 },
    { "buffer": 0, "byteOffset": 108, "byteLength": 64 },
    { "buffer": 0, "byteOffset": 172, "byteLength": 8 },
    { "buffer": 0, "byteOffset": 180, "byteLength": 32 },
    { "buffer": 0, "byteOffset": 212, "byteLength": 24 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "VEC4" },
    { "bufferView": 2, "componentType": 5126, "count": 3, "type": "VEC4" },
    { "bufferView": 3, "componentType": 5126, "count": 1, "type": "MAT4" },
    { "bufferView": 4, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.0] },
    { "bufferView": 5, "componentType": 5126, "count": 2, "type": "VEC4" },
    { "bufferView": 6, "componentType": 5126, "count": 2, "type": "VEC3" }
  ]
}"#;

fn fixture_gltf() -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(fixture_buffer());
    FIXTURE_TEMPLATE.replace("@URI@", &format!("data:application/octet-stream;base64,{payload}"))
}

/// Writes `contents` into a fresh directory under the system temp dir.
fn write_temp(name: &str, contents: &[u8]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("avatar_stage_{}_{}", name, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// ModelLoader
// ============================================================================

#[tokio::test]
async fn loader_reads_nodes_skin_and_clips() {
    let path = write_temp("avatar.gltf", fixture_gltf().as_bytes());

    let model = ModelLoader::new(&path).load(|_| {}).await.unwrap();
    let prefab = &model.prefab;

    assert_eq!(model.source, path);
    assert_eq!(prefab.nodes.len(), 3);
    assert_eq!(prefab.root_indices, vec![0]);
    assert_eq!(prefab.mesh_count(), 1);
    assert_eq!(prefab.skeletons.len(), 1);
    assert_eq!(prefab.skeletons[0].bone_indices, vec![2]);

    let body = &prefab.nodes[1];
    let mesh = body.mesh.as_ref().unwrap();
    assert_eq!(body.skin_index, Some(0));
    assert!(mesh.geometry.is_skinned());
    assert_eq!(mesh.geometry.vertex_count(), 3);
    // Normals were missing and are generated
    assert_eq!(mesh.geometry.normals.len(), 3);
}

#[tokio::test]
async fn loader_reads_named_clips() {
    let path = write_temp("avatar.gltf", fixture_gltf().as_bytes());
    let model = ModelLoader::new(&path).load(|_| {}).await.unwrap();

    let names: Vec<&str> = model.clips().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["waving", "salut"]);

    let waving = AnimationClip::find_by_name(model.clips(), "waving").unwrap();
    assert!((waving.duration - 1.0).abs() < 1e-6);
    assert_eq!(waving.tracks.len(), 1);
    assert_eq!(waving.tracks[0].meta.node_name, "Hips");

    assert!(matches!(
        AnimationClip::find_by_name(model.clips(), "idle"),
        Err(StageError::ClipNotFound { .. })
    ));
}

#[tokio::test]
async fn loader_reports_progress_up_to_total() {
    let contents = fixture_gltf();
    let path = write_temp("avatar.gltf", contents.as_bytes());

    let mut events = Vec::new();
    ModelLoader::new(&path)
        .with_chunk_size(256)
        .load(|p| events.push(p))
        .await
        .unwrap();

    assert!(events.len() > 1, "Expected several chunks, got {}", events.len());
    let total = contents.len() as u64;
    assert!(events.iter().all(|p| p.total == Some(total)));
    assert!(events.windows(2).all(|w| w[0].loaded < w[1].loaded));
    assert_eq!(events.last().unwrap().percent(), Some(100));
}

#[tokio::test]
async fn loader_instantiated_model_binds_clip_tracks() {
    let path = write_temp("avatar.gltf", fixture_gltf().as_bytes());
    let model = ModelLoader::new(&path).load(|_| {}).await.unwrap();

    let mut scene = Scene::new();
    let root = scene.instantiate(&model.prefab, "Avatar");
    let body = scene.find_node_by_name(root, "Body").unwrap();
    assert!(scene.skins.contains_key(body));

    let mut mixer = avatar_stage::AnimationMixer::new(root);
    let waving = AnimationClip::find_by_name(model.clips(), "waving").unwrap();
    let handle = mixer.clip_action(waving, &scene);
    assert_eq!(mixer.action(handle).unwrap().bindings.len(), 1);
}

#[tokio::test]
async fn loader_skips_channel_with_short_output() {
    // Two input times but a single rotation value
    let contents = fixture_gltf().replace(
        r#"{ "bufferView": 5, "componentType": 5126, "count": 2, "type": "VEC4" }"#,
        r#"{ "bufferView": 5, "componentType": 5126, "count": 1, "type": "VEC4" }"#,
    );
    let path = write_temp("short_output.gltf", contents.as_bytes());

    let model = ModelLoader::new(&path).load(|_| {}).await.unwrap();
    let waving = AnimationClip::find_by_name(model.clips(), "waving").unwrap();
    assert!(waving.tracks.is_empty());
    let salut = AnimationClip::find_by_name(model.clips(), "salut").unwrap();
    assert_eq!(salut.tracks.len(), 1);

    let mut scene = Scene::new();
    let root = scene.instantiate(&model.prefab, "Avatar");
    let mut mixer = avatar_stage::AnimationMixer::new(root);
    let handle = mixer.clip_action(waving, &scene);
    mixer.action_mut(handle).unwrap().play();
    mixer.update(0.5, &mut scene);
    assert!(mixer.action(handle).unwrap().bindings.is_empty());
}

#[tokio::test]
async fn loader_missing_file_is_asset_not_found() {
    let path = std::env::temp_dir()
        .join(format!("avatar_stage_missing_{}", uuid::Uuid::new_v4()))
        .join("avatar.glb");

    let result = ModelLoader::new(&path).load(|_| {}).await;
    assert!(matches!(result, Err(StageError::AssetNotFound(_))), "Got {result:?}");
}

#[tokio::test]
async fn loader_rejects_malformed_document() {
    let path = write_temp("broken.gltf", b"{ this is not gltf");

    let result = ModelLoader::new(&path).load(|_| {}).await;
    assert!(matches!(result, Err(StageError::Gltf(_))), "Got {result:?}");
}

#[tokio::test]
async fn loader_rejects_truncated_buffer() {
    let short = base64::engine::general_purpose::STANDARD.encode([0_u8; 16]);
    let contents = FIXTURE_TEMPLATE.replace("@URI@", &format!("data:application/octet-stream;base64,{short}"));
    let path = write_temp("short.gltf", contents.as_bytes());

    let result = ModelLoader::new(&path).load(|_| {}).await;
    assert!(matches!(result, Err(StageError::InvalidAsset(_))), "Got {result:?}");
}

// ============================================================================
// LoadTask
// ============================================================================

#[test]
fn load_task_delivers_progress_then_model() {
    let path = write_temp("avatar.gltf", fixture_gltf().as_bytes());
    let mut task = ModelLoader::new(&path).with_chunk_size(512).spawn();

    let mut progress = 0;
    let model = loop {
        match task.wait() {
            Some(LoadEvent::Progress(_)) => progress += 1,
            Some(LoadEvent::Loaded(model)) => break model,
            Some(LoadEvent::Failed(err)) => panic!("Load failed: {err}"),
            None => panic!("Task finished without a model"),
        }
    };

    assert!(progress >= 1);
    assert!(task.is_finished());
    assert!(task.poll().is_none());
    assert_eq!(model.clips().len(), 2);
}

#[test]
fn load_task_reports_failure_once() {
    let path = std::env::temp_dir()
        .join(format!("avatar_stage_missing_{}", uuid::Uuid::new_v4()))
        .join("avatar.glb");
    let mut task = ModelLoader::new(&path).spawn();

    match task.wait() {
        Some(LoadEvent::Failed(StageError::AssetNotFound(_))) => {}
        other => panic!("Expected AssetNotFound, got {other:?}"),
    }
    assert!(task.is_finished());
    assert!(task.wait().is_none());
}
