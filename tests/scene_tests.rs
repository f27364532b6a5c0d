//! Scene Integration Tests
//!
//! Tests for:
//! - Hierarchy: attach, traversal, visibility, world matrices
//! - Prefab instantiation: names, meshes, skeletons, skin bindings
//! - Skeleton joint matrices
//! - Camera projection and spot light cones / shadow camera

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Affine3A, Mat4, Quat, Vec3, Vec4};

use avatar_stage::assets::{Prefab, PrefabNode, PrefabSkeleton};
use avatar_stage::resources::{Geometry, Mesh, MeshStandardMaterial};
use avatar_stage::scene::{Camera, Light, LightKind, Scene, Transform};

const EPSILON: f32 = 1e-5;

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn triangle_mesh(name: &str) -> Mesh {
    let mut geometry = Geometry::new();
    geometry.positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    geometry.fill_missing_attributes();
    Mesh::new(Arc::new(geometry), Arc::new(MeshStandardMaterial::default())).with_name(name)
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn scene_attach_moves_node_out_of_roots() {
    let mut scene = Scene::new();
    let parent = scene.add_named_node("Parent", Transform::new());
    let child = scene.add_named_node("Child", Transform::new());
    assert_eq!(scene.root_nodes.len(), 2);

    scene.attach(child, parent);

    assert_eq!(scene.root_nodes, vec![parent]);
    assert_eq!(scene.get_node(child).unwrap().parent(), Some(parent));
    assert_eq!(scene.get_node(parent).unwrap().children(), &[child]);
}

#[test]
fn scene_world_matrix_composes_parent() {
    let mut scene = Scene::new();
    let parent = scene.add_named_node("Parent", Transform::from_trs(Vec3::new(0.0, -0.5, 0.0), Quat::IDENTITY, Vec3::ONE));
    let child = scene.add_named_node("Child", Transform::from_trs(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE));
    scene.attach(child, parent);

    scene.update();

    let world = scene.get_node(child).unwrap().transform.world_position();
    assert!(approx_vec3(world, Vec3::new(1.0, -0.5, 0.0)), "Got {world}");
}

#[test]
fn scene_world_matrix_follows_parent_rotation() {
    let mut scene = Scene::new();
    let parent = scene.add_named_node(
        "Parent",
        Transform::from_trs(Vec3::ZERO, Quat::from_rotation_y(FRAC_PI_2), Vec3::ONE),
    );
    let child = scene.add_named_node("Child", Transform::from_trs(Vec3::X, Quat::IDENTITY, Vec3::ONE));
    scene.attach(child, parent);

    scene.update();

    let world = scene.get_node(child).unwrap().transform.world_position();
    assert!(approx_vec3(world, Vec3::new(0.0, 0.0, -1.0)), "Got {world}");
}

#[test]
fn scene_traverse_visits_parents_first() {
    let mut scene = Scene::new();
    let a = scene.add_named_node("A", Transform::new());
    let b = scene.add_named_node("B", Transform::new());
    let c = scene.add_named_node("C", Transform::new());
    scene.attach(b, a);
    scene.attach(c, b);

    let mut order = Vec::new();
    scene.traverse(a, |h| order.push(h));
    assert_eq!(order, vec![a, b, c]);

    assert_eq!(scene.find_node_by_name(a, "C"), Some(c));
    assert_eq!(scene.find_node_by_name(b, "A"), None);
}

#[test]
fn scene_hidden_ancestor_hides_descendants() {
    let mut scene = Scene::new();
    let a = scene.add_named_node("A", Transform::new());
    let b = scene.add_named_node("B", Transform::new());
    scene.attach(b, a);

    assert!(scene.is_visible(b));
    scene.get_node_mut(a).unwrap().visible = false;
    assert!(!scene.is_visible(b));
}

#[test]
fn scene_traverse_meshes_mut_reaches_nested_meshes() {
    let mut scene = Scene::new();
    let root = scene.add_named_node("Root", Transform::new());
    let body = scene.add_mesh(triangle_mesh("Body"));
    let hair = scene.add_mesh(triangle_mesh("Hair"));
    let outside = scene.add_mesh(triangle_mesh("Outside"));
    scene.attach(body, root);
    scene.attach(hair, body);

    let mut count = 0;
    scene.traverse_meshes_mut(root, |_, mesh| {
        mesh.cast_shadow = true;
        count += 1;
    });

    assert_eq!(count, 2);
    assert!(scene.meshes[hair].cast_shadow);
    assert!(!scene.meshes[outside].cast_shadow);
}

// ============================================================================
// Prefab instantiation
// ============================================================================

fn skinned_prefab() -> Prefab {
    let mut body = triangle_mesh("Body");
    let mut geometry = (*body.geometry).clone();
    geometry.joints = vec![[0, 0, 0, 0]; 3];
    geometry.weights = vec![[1.0, 0.0, 0.0, 0.0]; 3];
    body.geometry = Arc::new(geometry);

    Prefab {
        nodes: vec![
            PrefabNode {
                name: Some("Armature".into()),
                children_indices: vec![1, 2],
                ..PrefabNode::new()
            },
            PrefabNode {
                name: Some("Body".into()),
                mesh: Some(body),
                skin_index: Some(0),
                ..PrefabNode::new()
            },
            PrefabNode {
                name: Some("Hips".into()),
                transform: Transform::from_trs(Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY, Vec3::ONE),
                ..PrefabNode::new()
            },
        ],
        root_indices: vec![0],
        skeletons: vec![PrefabSkeleton {
            name: "Skeleton".into(),
            root_bone_index: 0,
            bone_indices: vec![2],
            inverse_bind_matrices: vec![Affine3A::from_translation(Vec3::new(0.0, -1.0, 0.0))],
        }],
        animations: Vec::new(),
    }
}

#[test]
fn instantiate_builds_named_subtree() {
    let mut scene = Scene::new();
    let prefab = skinned_prefab();

    let root = scene.instantiate(&prefab, "Avatar");

    assert_eq!(scene.get_name(root), Some("Avatar"));
    assert_eq!(scene.root_nodes, vec![root]);
    let armature = scene.find_node_by_name(root, "Armature").unwrap();
    assert_eq!(scene.get_node(armature).unwrap().parent(), Some(root));
    assert!(scene.find_node_by_name(root, "Hips").is_some());

    let body = scene.find_node_by_name(root, "Body").unwrap();
    assert!(scene.meshes.contains_key(body));
    assert_eq!(scene.meshes.len(), 1);
}

#[test]
fn instantiate_binds_skin_to_skeleton() {
    let mut scene = Scene::new();
    let root = scene.instantiate(&skinned_prefab(), "Avatar");

    let body = scene.find_node_by_name(root, "Body").unwrap();
    let hips = scene.find_node_by_name(root, "Hips").unwrap();
    let binding = scene.skins.get(body).copied().unwrap();
    let skeleton = &scene.skeletons[binding.skeleton];

    assert_eq!(skeleton.bones, vec![hips]);
    assert_eq!(skeleton.root_bone(), Some(hips));
}

#[test]
fn skeleton_joint_matrix_is_identity_in_bind_pose() {
    let mut scene = Scene::new();
    let root = scene.instantiate(&skinned_prefab(), "Avatar");
    scene.update();

    let body = scene.find_node_by_name(root, "Body").unwrap();
    let skeleton = &scene.skeletons[scene.skins[body].skeleton];
    let joint = skeleton.joint_matrices()[0];
    assert!(joint.abs_diff_eq(Mat4::IDENTITY, EPSILON), "Got {joint}");
}

#[test]
fn skeleton_joint_matrix_follows_bone() {
    let mut scene = Scene::new();
    let root = scene.instantiate(&skinned_prefab(), "Avatar");
    let hips = scene.find_node_by_name(root, "Hips").unwrap();
    scene.get_node_mut(hips).unwrap().transform.position.x = 2.0;
    scene.update();

    let body = scene.find_node_by_name(root, "Body").unwrap();
    let skeleton = &scene.skeletons[scene.skins[body].skeleton];
    let moved = skeleton.joint_matrices()[0].transform_point3(Vec3::ZERO);
    assert!(approx_vec3(moved, Vec3::new(2.0, 0.0, 0.0)), "Got {moved}");
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn camera_stores_fov_in_radians() {
    let camera = Camera::new_perspective(45.0, 16.0 / 9.0, 0.1, 1000.0);
    assert!((camera.fov - 45_f32.to_radians()).abs() < EPSILON);
    assert!((camera.aspect - 16.0 / 9.0).abs() < EPSILON);
}

#[test]
fn camera_view_projection_tracks_node() {
    let mut scene = Scene::new();
    let handle = scene.add_camera(Camera::new_perspective(45.0, 1.0, 0.1, 100.0));
    {
        let node = scene.get_node_mut(handle).unwrap();
        node.transform.position = Vec3::new(0.0, 0.0, 5.0);
        node.transform.look_at(Vec3::ZERO, Vec3::Y);
    }
    scene.update();

    let camera = scene.main_camera().unwrap();
    assert!(approx_vec3(camera.world_position(), Vec3::new(0.0, 0.0, 5.0)));

    // The origin projects onto the screen centre
    let clip = *camera.view_projection_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
    let ndc = clip.truncate() / clip.w;
    assert!(ndc.x.abs() < EPSILON && ndc.y.abs() < EPSILON, "Got {ndc}");
}

// ============================================================================
// Lights
// ============================================================================

#[test]
fn spot_light_cones_follow_penumbra() {
    let light = Light::new_spot(Vec3::ONE, 18.0, 8.0, 1.0, 0.5, 2.0);
    let LightKind::Spot(spot) = &light.kind else {
        panic!("Expected a spot light");
    };
    assert!((spot.outer_cone() - 1.0).abs() < EPSILON);
    assert!((spot.inner_cone() - 0.5).abs() < EPSILON);
}

#[test]
fn spot_light_shadow_camera_looks_at_target() {
    let mut light = Light::new_spot(Vec3::ONE, 18.0, 8.0, 1.0, 0.5, 2.0);
    light.set_target(Vec3::ZERO);

    let view_projection = light.shadow_view_projection(Vec3::new(0.0, 5.0, 2.0)).unwrap();
    let clip = view_projection * Vec4::new(0.0, 0.0, 0.0, 1.0);
    let ndc = clip.truncate() / clip.w;
    assert!(ndc.x.abs() < EPSILON && ndc.y.abs() < EPSILON, "Got {ndc}");
    assert!((0.0..=1.0).contains(&ndc.z));
}

#[test]
fn only_spot_lights_have_a_shadow_camera() {
    let ambient = Light::new_ambient(Vec3::ONE, 1.0);
    let directional = Light::new_directional(Vec3::ONE, 2.0, Vec3::ZERO);
    assert!(ambient.shadow_view_projection(Vec3::ONE).is_none());
    assert!(directional.shadow_view_projection(Vec3::ONE).is_none());
}

#[test]
fn spot_light_at_its_target_has_no_shadow_camera() {
    let light = Light::new_spot(Vec3::ONE, 1.0, 0.0, 0.5, 0.0, 2.0);
    assert!(light.shadow_view_projection(Vec3::ZERO).is_none());
}

#[test]
fn iter_lights_reports_world_positions() {
    let mut scene = Scene::new();
    let handle = scene.add_light(Light::new_spot(Vec3::ONE, 1.0, 0.0, 0.5, 0.0, 2.0));
    scene.get_node_mut(handle).unwrap().transform.position = Vec3::new(0.0, 8.0, 2.0);
    scene.update();

    let (_, position) = scene.iter_lights().next().unwrap();
    assert!(approx_vec3(position, Vec3::new(0.0, 8.0, 2.0)));
}
