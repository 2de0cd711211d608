//! Mesh flattening and vertex/index buffer upload.
//!
//! [`flatten_scene`] converts every mesh reachable from the scene root into
//! a [`FlatMesh`]: plain vertex and index arrays in the order the node walk
//! encounters them. The walk is pre-order and depth-first: a node's own
//! meshes first (in stored order), then its children (in stored order). A
//! mesh referenced by two nodes is emitted twice.
//!
//! OBJ files don't carry tangents, so meshes without a declared tangent
//! frame get one computed from triangle positions and UVs; normal maps
//! don't work without it.

use wgpu::util::DeviceExt;

use crate::data_structures::{
    model::{self, ModelVertex},
    scene_graph::{FlatMesh, Node, RawMesh, Scene},
};

/// Flatten every node-referenced mesh of `scene`, in pre-order encounter
/// order. Purely CPU-side; GPU upload is a separate step ([`upload_mesh`]).
pub fn flatten_scene(scene: &Scene) -> Vec<FlatMesh> {
    let mut out = Vec::new();
    flatten_node(&scene.root, scene, &mut out);
    out
}

fn flatten_node(node: &Node, scene: &Scene, out: &mut Vec<FlatMesh>) {
    for &mesh_index in &node.mesh_indices {
        match scene.meshes.get(mesh_index) {
            Some(raw) => out.push(flatten_mesh(raw)),
            None => log::warn!(
                "node {} references mesh {} which the scene does not contain",
                node.name,
                mesh_index
            ),
        }
    }
    for child in &node.children {
        flatten_node(child, scene, out);
    }
}

/// Flatten a single raw mesh into interleaved vertices plus indices.
///
/// Position and normal are copied unconditionally (zero-filled when the
/// source is short on normals). UV comes from channel 0 when declared,
/// `(0, 0)` otherwise. Tangent and bitangent are copied when the source
/// declares both, computed from the triangles otherwise.
pub fn flatten_mesh(raw: &RawMesh) -> FlatMesh {
    let mut vertices: Vec<ModelVertex> = (0..raw.positions.len())
        .map(|i| ModelVertex {
            position: raw.positions[i],
            tex_coords: raw
                .tex_coords
                .as_ref()
                .and_then(|tc| tc.get(i).copied())
                .unwrap_or([0.0, 0.0]),
            normal: raw.normals.get(i).copied().unwrap_or([0.0; 3]),
            tangent: [0.0; 3],
            bitangent: [0.0; 3],
        })
        .collect();

    match (&raw.tangents, &raw.bitangents) {
        (Some(tangents), Some(bitangents)) => {
            for (i, vertex) in vertices.iter_mut().enumerate() {
                vertex.tangent = tangents.get(i).copied().unwrap_or([0.0; 3]);
                vertex.bitangent = bitangents.get(i).copied().unwrap_or([0.0; 3]);
            }
        }
        _ => compute_tangents(&mut vertices, &raw.indices),
    }

    FlatMesh {
        name: raw.name.clone(),
        vertices,
        indices: raw.indices.clone(),
        material: raw.material,
    }
}

/// Derive a tangent frame from triangle positions and UVs.
///
/// Per triangle, solve the edge/UV-delta system for tangent and bitangent,
/// accumulate onto each corner vertex and average at the end. Triangles with
/// degenerate UVs contribute nothing.
pub fn compute_tangents(vertices: &mut [ModelVertex], indices: &[u32]) {
    let mut triangles_included = vec![0u32; vertices.len()];

    for c in indices.chunks_exact(3) {
        if c.iter().any(|&i| i as usize >= vertices.len()) {
            log::warn!(
                "triangle {:?} references vertices past the mesh's {}; skipping",
                c,
                vertices.len()
            );
            continue;
        }
        let v0 = vertices[c[0] as usize];
        let v1 = vertices[c[1] as usize];
        let v2 = vertices[c[2] as usize];

        let pos0: cgmath::Vector3<f32> = v0.position.into();
        let pos1: cgmath::Vector3<f32> = v1.position.into();
        let pos2: cgmath::Vector3<f32> = v2.position.into();

        let uv0: cgmath::Vector2<f32> = v0.tex_coords.into();
        let uv1: cgmath::Vector2<f32> = v1.tex_coords.into();
        let uv2: cgmath::Vector2<f32> = v2.tex_coords.into();

        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        //     delta_pos1 = delta_uv1.x * T + delta_uv1.y * B
        //     delta_pos2 = delta_uv2.x * T + delta_uv2.y * B
        let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if det.abs() <= f32::EPSILON {
            // Degenerate UVs (e.g. all synthesized to (0, 0)); no frame.
            continue;
        }
        let r = 1.0 / det;
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
        // Flipped for right-handed normal maps in wgpu's UV convention.
        let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

        for &corner in c {
            let v = &mut vertices[corner as usize];
            v.tangent = (tangent + cgmath::Vector3::from(v.tangent)).into();
            v.bitangent = (bitangent + cgmath::Vector3::from(v.bitangent)).into();
            triangles_included[corner as usize] += 1;
        }
    }

    for (i, n) in triangles_included.into_iter().enumerate() {
        if n == 0 {
            continue;
        }
        let denom = 1.0 / n as f32;
        let v = &mut vertices[i];
        v.tangent = (cgmath::Vector3::from(v.tangent) * denom).into();
        v.bitangent = (cgmath::Vector3::from(v.bitangent) * denom).into();
    }
}

/// Upload a flattened mesh into GPU vertex and index buffers.
///
/// Meshes without a material reference fall back to material 0, which the
/// loaders guarantee to exist.
pub fn upload_mesh(device: &wgpu::Device, flat: &FlatMesh, label: &str) -> model::Mesh {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Vertex Buffer")),
        contents: bytemuck::cast_slice(&flat.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Index Buffer")),
        contents: bytemuck::cast_slice(&flat.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    model::Mesh {
        name: flat.name.clone(),
        vertex_buffer,
        index_buffer,
        num_elements: flat.indices.len() as u32,
        material: flat.material.unwrap_or(0),
    }
}
