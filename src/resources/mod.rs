//! Model loading: import, flatten and upload.
//!
//! Each `load_model_*` call is one straight-line pipeline: parse the file
//! into a [`Scene`](crate::data_structures::scene_graph::Scene), flatten
//! every node-referenced mesh, resolve material textures through a fresh
//! dedup cache and upload the result. The cache lives exactly as long as
//! one load, so a bitmap shared by several materials in one model is
//! decoded once.

use std::path::Path;

use anyhow::Result;

use crate::{
    context::InitContext,
    data_structures::{
        model::{Material, Model},
        scene_graph::Scene,
    },
    resources::texture::TextureCache,
};

pub mod gltf;
pub mod mesh;
pub mod obj;
pub mod texture;

pub use self::gltf::import_gltf;
pub use self::obj::import_obj;

/// Load an OBJ model: import, flatten, resolve textures, upload.
pub fn load_model_obj(path: impl AsRef<Path>, ctx: &InitContext) -> Result<Model> {
    let path = path.as_ref();
    let scene = import_obj(path)?;
    upload_scene(&scene, path, ctx)
}

/// Load a glTF model, preserving its node hierarchy's flattening order.
pub fn load_model_gltf(path: impl AsRef<Path>, ctx: &InitContext) -> Result<Model> {
    let path = path.as_ref();
    let scene = import_gltf(path)?;
    upload_scene(&scene, path, ctx)
}

fn upload_scene(scene: &Scene, path: &Path, ctx: &InitContext) -> Result<Model> {
    // Texture slots are relative to the model file's directory.
    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let layout = texture::diffuse_normal_layout(&ctx.device);
    let mut cache = TextureCache::new();
    let materials: Vec<Material> = scene
        .materials
        .iter()
        .map(|m| {
            let resolved = texture::resolve_material(ctx, base_dir, m, &mut cache);
            Material::new(&ctx.device, &ctx.queue, &m.name, resolved, &layout)
        })
        .collect();
    log::debug!(
        "{}: {} meshes, {} materials, {} distinct textures",
        path.display(),
        scene.meshes.len(),
        materials.len(),
        cache.len()
    );

    let flat = mesh::flatten_scene(scene);
    let meshes = flat
        .iter()
        .map(|f| {
            let mut uploaded = mesh::upload_mesh(&ctx.device, f, &f.name);
            if uploaded.material >= materials.len() {
                log::warn!(
                    "mesh {} references material {} out of {}, using 0",
                    f.name,
                    uploaded.material,
                    materials.len()
                );
                uploaded.material = 0;
            }
            uploaded
        })
        .collect();

    Ok(Model { meshes, materials })
}
