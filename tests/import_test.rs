use std::path::PathBuf;

use lode_ngin::data_structures::scene_graph::TextureRole;
use lode_ngin::resources::mesh::flatten_scene;
use lode_ngin::resources::{import_gltf, import_obj};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn should_import_obj_with_material_slots() {
    let scene = import_obj(fixture("tri.obj")).unwrap();

    assert_eq!(scene.meshes.len(), 1);
    assert_eq!(scene.root.mesh_indices, vec![0]);

    let mesh = &scene.meshes[0];
    assert_eq!(mesh.positions.len(), 3);
    assert_eq!(mesh.indices.len(), 3);
    assert_eq!(mesh.triangle_count(), 1);
    assert_eq!(mesh.material, Some(0));

    assert_eq!(scene.materials.len(), 1);
    assert_eq!(scene.materials[0].name, "bark");
    assert_eq!(
        scene.materials[0].texture(TextureRole::Diffuse),
        Some("tri_diffuse.png")
    );
}

#[test]
fn should_flip_obj_v_coordinate() {
    let scene = import_obj(fixture("tri.obj")).unwrap();
    let uvs = scene.meshes[0].tex_coords.as_ref().unwrap();

    // vt (0,0) lands at v=1 in wgpu's top-left UV convention.
    assert!(uvs.contains(&[0.0, 1.0]));
    assert!(uvs.contains(&[1.0, 1.0]));
    assert!(uvs.contains(&[0.0, 0.0]));
}

#[test]
fn should_synthesize_default_material_for_obj_without_mtllib() {
    let scene = import_obj(fixture("flat_tri.obj")).unwrap();

    assert_eq!(scene.materials.len(), 1);
    assert_eq!(scene.materials[0].name, "default");
    assert!(scene.materials[0].textures.is_empty());
    assert!(scene.meshes[0].tex_coords.is_none());
}

#[test]
fn should_fail_on_missing_obj_file() {
    assert!(import_obj(fixture("does_not_exist.obj")).is_err());
}

#[test]
fn should_preserve_gltf_node_hierarchy_in_flatten_order() {
    let scene = import_gltf(fixture("tree.gltf")).unwrap();

    assert_eq!(scene.root.name, "root");
    assert_eq!(scene.root.children.len(), 2);

    // root carries mesh "branch", child "left" carries "trunk" and the
    // grandchild under "right" carries "branch" again, so the pre-order
    // flatten emits branch, trunk, branch.
    let flat = flatten_scene(&scene);
    let names: Vec<&str> = flat.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["branch", "trunk", "branch"]);
    assert_eq!(flat[1].vertices[1].position, [2.0, 0.0, 0.0]);
}

#[test]
fn should_import_gltf_materials_and_indices() {
    let scene = import_gltf(fixture("tree.gltf")).unwrap();

    assert_eq!(scene.meshes.len(), 2);
    for mesh in &scene.meshes {
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.material, Some(0));
        // No NORMAL or TEXCOORD_0 accessors in the fixture.
        assert!(mesh.normals.is_empty());
        assert!(mesh.tex_coords.is_none());
    }

    assert_eq!(scene.materials.len(), 1);
    assert_eq!(scene.materials[0].name, "bark");
    assert_eq!(
        scene.materials[0].texture(TextureRole::Diffuse),
        Some("tri_diffuse.png")
    );
}

#[test]
fn should_fail_on_missing_gltf_file() {
    assert!(import_gltf(fixture("does_not_exist.gltf")).is_err());
}

#[test]
fn should_reject_gltf_indices_past_the_vertex_count() {
    // Parseable document whose index stream references vertex 7 of 3.
    let err = import_gltf(fixture("bad_index.gltf")).unwrap_err();
    assert!(err.to_string().contains("references vertex 7"));
}
