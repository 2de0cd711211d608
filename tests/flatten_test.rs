use lode_ngin::data_structures::scene_graph::{Node, RawMesh, Scene};
use lode_ngin::resources::mesh::{flatten_mesh, flatten_scene};

fn triangle(name: &str) -> RawMesh {
    RawMesh {
        name: name.to_string(),
        positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        normals: vec![[0.0, 0.0, 1.0]; 3],
        tex_coords: Some(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]),
        indices: vec![0, 1, 2],
        ..Default::default()
    }
}

#[test]
fn should_flatten_in_preorder_node_meshes_before_children() {
    let mut root = Node::named("root");
    root.mesh_indices = vec![0];

    let mut left = Node::named("left");
    left.mesh_indices = vec![1];
    let mut leaf = Node::named("leaf");
    leaf.mesh_indices = vec![2];
    let mut right = Node::named("right");
    right.children = vec![leaf];
    root.children = vec![left, right];

    let scene = Scene {
        root,
        meshes: vec![triangle("a"), triangle("b"), triangle("c")],
        materials: Vec::new(),
    };

    let flat = flatten_scene(&scene);
    let names: Vec<&str> = flat.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn should_emit_shared_mesh_once_per_referencing_node() {
    let mut root = Node::named("root");
    root.mesh_indices = vec![0];
    let mut child = Node::named("child");
    child.mesh_indices = vec![0];
    root.children = vec![child];

    let scene = Scene {
        root,
        meshes: vec![triangle("shared")],
        materials: Vec::new(),
    };

    let flat = flatten_scene(&scene);
    assert_eq!(flat.len(), 2);
    assert_eq!(flat[0].name, "shared");
    assert_eq!(flat[1].name, "shared");
}

#[test]
fn should_skip_out_of_range_mesh_references() {
    let mut root = Node::named("root");
    root.mesh_indices = vec![0, 7, 0];

    let scene = Scene {
        root,
        meshes: vec![triangle("only")],
        materials: Vec::new(),
    };

    let flat = flatten_scene(&scene);
    assert_eq!(flat.len(), 2);
}

#[test]
fn should_default_missing_uvs_to_origin() {
    let raw = RawMesh {
        tex_coords: None,
        ..triangle("no_uv")
    };

    let flat = flatten_mesh(&raw);
    assert_eq!(flat.vertices.len(), 3);
    for vertex in &flat.vertices {
        assert_eq!(vertex.tex_coords, [0.0, 0.0]);
    }
}

#[test]
fn should_keep_declared_uvs_and_indices() {
    let raw = triangle("tri");
    let flat = flatten_mesh(&raw);

    assert_eq!(flat.indices, vec![0, 1, 2]);
    assert_eq!(flat.vertices[1].tex_coords, [1.0, 0.0]);
    assert_eq!(flat.vertices[2].tex_coords, [0.0, 1.0]);
    assert_eq!(flat.vertices[0].normal, [0.0, 0.0, 1.0]);
}

#[test]
fn should_zero_fill_missing_normals() {
    let raw = RawMesh {
        normals: vec![[0.0, 0.0, 1.0]],
        ..triangle("short_normals")
    };

    let flat = flatten_mesh(&raw);
    assert_eq!(flat.vertices[0].normal, [0.0, 0.0, 1.0]);
    assert_eq!(flat.vertices[1].normal, [0.0; 3]);
    assert_eq!(flat.vertices[2].normal, [0.0; 3]);
}

#[test]
fn should_compute_tangent_frame_from_uv_layout() {
    // Triangle in the XY plane whose UVs follow X and Y directly, so the
    // tangent must come out along +X.
    let flat = flatten_mesh(&triangle("tri"));

    for vertex in &flat.vertices {
        assert_eq!(vertex.tangent, [1.0, 0.0, 0.0]);
        assert_eq!(vertex.bitangent, [0.0, -1.0, 0.0]);
    }
}

#[test]
fn should_prefer_declared_tangents_over_computed_ones() {
    let raw = RawMesh {
        tangents: Some(vec![[0.0, 0.0, 1.0]; 3]),
        bitangents: Some(vec![[0.0, 1.0, 0.0]; 3]),
        ..triangle("authored")
    };

    let flat = flatten_mesh(&raw);
    assert_eq!(flat.vertices[0].tangent, [0.0, 0.0, 1.0]);
    assert_eq!(flat.vertices[0].bitangent, [0.0, 1.0, 0.0]);
}

#[test]
fn should_leave_zero_tangents_for_degenerate_uvs() {
    let raw = RawMesh {
        tex_coords: Some(vec![[0.5, 0.5]; 3]),
        ..triangle("degenerate")
    };

    let flat = flatten_mesh(&raw);
    for vertex in &flat.vertices {
        assert_eq!(vertex.tangent, [0.0; 3]);
        assert_eq!(vertex.bitangent, [0.0; 3]);
    }
}

#[test]
fn should_skip_triangles_with_out_of_range_indices() {
    // Hand-built meshes can carry bad indices; tangent generation must not
    // read past the vertex array.
    let raw = RawMesh {
        indices: vec![0, 1, 9],
        ..triangle("bad_indices")
    };

    let flat = flatten_mesh(&raw);
    assert_eq!(flat.vertices.len(), 3);
    for vertex in &flat.vertices {
        assert_eq!(vertex.tangent, [0.0; 3]);
        assert_eq!(vertex.bitangent, [0.0; 3]);
    }
}

#[test]
fn should_average_tangents_over_shared_vertices() {
    // Two triangles sharing an edge, same UV mapping, so the averaged
    // tangent equals the per-triangle tangent.
    let vertices = flatten_mesh(&RawMesh {
        name: "quad".to_string(),
        positions: vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ],
        normals: vec![[0.0, 0.0, 1.0]; 4],
        tex_coords: Some(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]),
        indices: vec![0, 1, 2, 0, 2, 3],
        ..Default::default()
    })
    .vertices;

    for vertex in &vertices {
        assert!((vertex.tangent[0] - 1.0).abs() < 1e-5);
        assert!(vertex.tangent[1].abs() < 1e-5);
        assert!(vertex.tangent[2].abs() < 1e-5);
    }
}
