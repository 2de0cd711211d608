//! OBJ → [`Scene`] import adapter.
//!
//! OBJ has no node hierarchy, so every model in the file hangs off the
//! scene root in stored order. Triangulation and a single index stream are
//! requested from the parser, which keeps the flattener's triangle
//! invariant (index count == 3 x face count) intact.

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::data_structures::scene_graph::{Node, RawMesh, Scene, SceneMaterial, TextureRole};

pub fn import_obj(path: impl AsRef<Path>) -> Result<Scene> {
    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .with_context(|| format!("importing OBJ {}", path.display()))?;

    let materials = match materials {
        Ok(materials) => materials.iter().map(to_scene_material).collect(),
        Err(e) => {
            // A missing .mtl is survivable; meshes still render with
            // fallback textures.
            log::warn!("material library for {} failed to load: {e}", path.display());
            Vec::new()
        }
    };

    let mut scene = Scene {
        root: Node::named(
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "obj".to_string()),
        ),
        meshes: Vec::new(),
        materials,
    };
    if scene.materials.is_empty() {
        scene.materials.push(SceneMaterial {
            name: "default".to_string(),
            textures: Vec::new(),
        });
    }

    for m in models {
        let mesh = &m.mesh;
        let positions = m_chunks3(&mesh.positions);
        let normals = m_chunks3(&mesh.normals);
        let tex_coords = if mesh.texcoords.is_empty() {
            None
        } else {
            // V flipped: OBJ puts the origin bottom-left, wgpu top-left.
            Some(
                mesh.texcoords
                    .chunks_exact(2)
                    .map(|uv| [uv[0], 1.0 - uv[1]])
                    .collect(),
            )
        };

        let index = scene.meshes.len();
        scene.meshes.push(RawMesh {
            name: m.name.clone(),
            positions,
            normals,
            tex_coords,
            tangents: None,
            bitangents: None,
            indices: mesh.indices.clone(),
            material: mesh.material_id,
        });
        scene.root.mesh_indices.push(index);
    }

    Ok(scene)
}

fn to_scene_material(m: &tobj::Material) -> SceneMaterial {
    let mut textures = Vec::new();
    let slots = [
        (TextureRole::Diffuse, &m.diffuse_texture),
        (TextureRole::Specular, &m.specular_texture),
        (TextureRole::Normal, &m.normal_texture),
        (TextureRole::Ambient, &m.ambient_texture),
    ];
    for (role, slot) in slots {
        if let Some(file_name) = slot {
            textures.push((role, file_name.clone()));
        }
    }
    SceneMaterial {
        name: m.name.clone(),
        textures,
    }
}

fn m_chunks3(flat: &[f32]) -> Vec<[f32; 3]> {
    flat.chunks_exact(3).map(|v| [v[0], v[1], v[2]]).collect()
}
