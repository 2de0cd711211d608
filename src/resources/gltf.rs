//! glTF → [`Scene`] import adapter.
//!
//! Unlike OBJ, glTF carries a real node hierarchy, which is preserved:
//! every glTF node becomes a [`Node`], referencing one [`RawMesh`] per
//! primitive of its mesh. When the document's scene has several root nodes
//! a container root is synthesized above them.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context as _, Result, bail};

use crate::data_structures::scene_graph::{Node, RawMesh, Scene, SceneMaterial, TextureRole};

pub fn import_gltf(path: impl AsRef<Path>) -> Result<Scene> {
    let path = path.as_ref();
    let (document, buffers, _images) =
        gltf::import(path).with_context(|| format!("importing glTF {}", path.display()))?;

    let materials = {
        let mut materials: Vec<SceneMaterial> =
            document.materials().map(to_scene_material).collect();
        if materials.is_empty() {
            materials.push(SceneMaterial {
                name: "default".to_string(),
                textures: Vec::new(),
            });
        }
        materials
    };

    // One RawMesh per primitive; remember which flat indices belong to each
    // glTF mesh so nodes can reference them.
    let mut meshes = Vec::new();
    let mut primitives_of: HashMap<usize, Vec<usize>> = HashMap::new();
    for mesh in document.meshes() {
        let name = mesh.name().unwrap_or("unnamed_mesh");
        for primitive in mesh.primitives() {
            let raw = read_primitive(name, &primitive, &buffers)?;
            primitives_of
                .entry(mesh.index())
                .or_default()
                .push(meshes.len());
            meshes.push(raw);
        }
    }

    let scene = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => scene,
        None => bail!("glTF {} contains no scene", path.display()),
    };

    let mut roots: Vec<Node> = scene
        .nodes()
        .map(|node| to_node(&node, &primitives_of))
        .collect();
    let root = if roots.len() == 1 {
        roots.remove(0)
    } else {
        let mut container = Node::named(
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "gltf".to_string()),
        );
        container.children = roots;
        container
    };

    Ok(Scene {
        root,
        meshes,
        materials,
    })
}

fn to_node(node: &gltf::scene::Node, primitives_of: &HashMap<usize, Vec<usize>>) -> Node {
    let mut out = Node::named(node.name().unwrap_or("unnamed_node"));
    if let Some(mesh) = node.mesh() {
        if let Some(indices) = primitives_of.get(&mesh.index()) {
            out.mesh_indices = indices.clone();
        }
    }
    out.children = node.children().map(|c| to_node(&c, primitives_of)).collect();
    out
}

fn read_primitive(
    mesh_name: &str,
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> Result<RawMesh> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .map(|iter| iter.collect())
        .unwrap_or_default();
    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(|iter| iter.collect())
        .unwrap_or_default();
    let tex_coords: Option<Vec<[f32; 2]>> = reader
        .read_tex_coords(0)
        .map(|tc| tc.into_f32().collect());

    // glTF tangents are vec4; w holds the handedness used to reconstruct
    // the bitangent from the normal.
    let (tangents, bitangents) = match reader.read_tangents() {
        Some(iter) => {
            let mut tangents = Vec::new();
            let mut bitangents = Vec::new();
            for (i, tangent) in iter.enumerate() {
                let t = cgmath::Vector3::new(tangent[0], tangent[1], tangent[2]);
                let n: cgmath::Vector3<f32> =
                    normals.get(i).copied().unwrap_or([0.0, 0.0, 1.0]).into();
                let b = n.cross(t) * tangent[3];
                tangents.push(t.into());
                bitangents.push(b.into());
            }
            (Some(tangents), Some(bitangents))
        }
        None => (None, None),
    };

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        // Non-indexed geometry draws vertices in order.
        None => (0..positions.len() as u32).collect(),
    };
    if indices.len() % 3 != 0 {
        bail!("primitive of {mesh_name} is not triangulated ({} indices)", indices.len());
    }
    // The parser checks accessor bounds, not the index values themselves.
    if let Some(&max) = indices.iter().max() {
        if max as usize >= positions.len() {
            bail!(
                "primitive of {mesh_name} references vertex {max} but only {} exist",
                positions.len()
            );
        }
    }

    Ok(RawMesh {
        name: mesh_name.to_string(),
        positions,
        normals,
        tex_coords,
        tangents,
        bitangents,
        indices,
        material: primitive.material().index(),
    })
}

fn to_scene_material(material: gltf::Material) -> SceneMaterial {
    let mut textures = Vec::new();

    if let Some(info) = material.pbr_metallic_roughness().base_color_texture() {
        push_uri(&mut textures, TextureRole::Diffuse, info.texture());
    }
    if let Some(info) = material.normal_texture() {
        push_uri(&mut textures, TextureRole::Normal, info.texture());
    }
    if let Some(info) = material.occlusion_texture() {
        push_uri(&mut textures, TextureRole::Ambient, info.texture());
    }

    SceneMaterial {
        name: material.name().unwrap_or("unnamed_material").to_string(),
        textures,
    }
}

fn push_uri(
    textures: &mut Vec<(TextureRole, String)>,
    role: TextureRole,
    texture: gltf::Texture,
) {
    match texture.source().source() {
        gltf::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => {
            textures.push((role, uri.to_string()));
        }
        _ => {
            // Embedded bitmaps bypass the path-keyed cache; not supported.
            log::warn!("skipping embedded image for texture {:?}", texture.name());
        }
    }
}
