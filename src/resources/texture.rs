//! Texture resolution: the per-load dedup cache and decode/upload.
//!
//! Materials within one model frequently reference the same bitmap. The
//! [`TextureCache`] guarantees one decode and one GPU upload per distinct
//! file path for the lifetime of a single model load; lookups are exact
//! string matches over insertion-ordered entries.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::{
    context::InitContext,
    data_structures::{
        model::LoadedTexture,
        scene_graph::{SceneMaterial, TextureRole},
        texture::Texture,
    },
};

/// Bind group layout every material bind group is built against: diffuse
/// map + sampler, normal map + sampler.
pub fn diffuse_normal_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("Model texture_bind_group_layout"),
    })
}

/// Order the four semantic roles are resolved in, matching the slot order
/// the shaders expect.
pub const ROLE_ORDER: [TextureRole; 4] = [
    TextureRole::Diffuse,
    TextureRole::Specular,
    TextureRole::Normal,
    TextureRole::Ambient,
];

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub path: String,
    pub role: TextureRole,
    pub handle: T,
}

/// Insertion-ordered path → handle cache.
///
/// Generic over the handle type so the dedup behaviour is testable without
/// a GPU; model loading uses `TextureCache<Arc<Texture>>`. Invariant: at
/// most one entry per distinct path.
#[derive(Debug)]
pub struct TextureCache<T = Arc<Texture>> {
    entries: Vec<CacheEntry<T>>,
}

impl<T> Default for TextureCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TextureCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry<T>> {
        self.entries.iter()
    }
}

impl<T: Clone> TextureCache<T> {
    /// Look `path` up; on a hit the cached handle and role are reused and
    /// `load` is never invoked. On a miss, `load` runs and a successful
    /// result is appended. A failed load (`None`) is not cached, so a later
    /// reference to the same path will retry.
    pub fn get_or_insert_with(
        &mut self,
        path: &str,
        role: TextureRole,
        load: impl FnOnce() -> Option<T>,
    ) -> Option<(TextureRole, T)> {
        if let Some(entry) = self.entries.iter().find(|e| e.path == path) {
            return Some((entry.role, entry.handle.clone()));
        }
        let handle = load()?;
        self.entries.push(CacheEntry {
            path: path.to_string(),
            role,
            handle: handle.clone(),
        });
        Some((role, handle))
    }
}

/// Read an image file and upload it as a GPU texture.
pub fn load_texture(ctx: &InitContext, path: &Path, is_normal_map: bool) -> Result<Texture> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading texture {}", path.display()))?;
    Texture::from_bytes(
        &ctx.device,
        &ctx.queue,
        &bytes,
        &path.display().to_string(),
        is_normal_map,
    )
}

/// Resolve every texture slot of `material` through the cache.
///
/// Slot paths are joined onto `base_dir`, the directory of the model file.
/// A decode failure is logged and skipped; the load carries on with the
/// remaining slots (the material binds fallbacks for anything missing).
pub fn resolve_material(
    ctx: &InitContext,
    base_dir: &Path,
    material: &SceneMaterial,
    cache: &mut TextureCache,
) -> Vec<LoadedTexture> {
    let mut resolved = Vec::new();
    for role in ROLE_ORDER {
        for (_, file_name) in material.textures.iter().filter(|(r, _)| *r == role) {
            let full_path = base_dir.join(file_name);
            let key = full_path.display().to_string();
            let loaded = cache.get_or_insert_with(&key, role, || {
                match load_texture(ctx, &full_path, role == TextureRole::Normal) {
                    Ok(texture) => Some(Arc::new(texture)),
                    Err(e) => {
                        log::warn!("texture failed to load at path {key}: {e:#}");
                        None
                    }
                }
            });
            if let Some((role, texture)) = loaded {
                resolved.push(LoadedTexture {
                    role,
                    path: key,
                    texture,
                });
            }
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_resolution_reuses_first_handle() {
        let mut cache: TextureCache<u32> = TextureCache::new();
        let mut loads = 0;

        let first = cache.get_or_insert_with("rock_diffuse.png", TextureRole::Diffuse, || {
            loads += 1;
            Some(7)
        });
        let second = cache.get_or_insert_with("rock_diffuse.png", TextureRole::Specular, || {
            loads += 1;
            Some(13)
        });

        assert_eq!(first, Some((TextureRole::Diffuse, 7)));
        // Hit returns the cached handle and the cached role.
        assert_eq!(second, Some((TextureRole::Diffuse, 7)));
        assert_eq!(loads, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_paths_get_distinct_entries_in_insertion_order() {
        let mut cache: TextureCache<u32> = TextureCache::new();
        cache.get_or_insert_with("a.png", TextureRole::Diffuse, || Some(1));
        cache.get_or_insert_with("b.png", TextureRole::Normal, || Some(2));
        cache.get_or_insert_with("a.png", TextureRole::Diffuse, || Some(99));

        let paths: Vec<&str> = cache.entries().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["a.png", "b.png"]);
    }

    #[test]
    fn failed_load_is_not_cached_and_retries() {
        let mut cache: TextureCache<u32> = TextureCache::new();
        let miss = cache.get_or_insert_with("broken.png", TextureRole::Diffuse, || None);
        assert_eq!(miss, None);
        assert!(cache.is_empty());

        // The next reference to the same path gets another chance.
        let hit = cache.get_or_insert_with("broken.png", TextureRole::Diffuse, || Some(3));
        assert_eq!(hit, Some((TextureRole::Diffuse, 3)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn construction_accepts_non_clone_handles() {
        // Arc<Texture> is the production handle; nothing about an empty
        // cache needs Clone.
        struct Opaque;

        let cache: TextureCache<Opaque> = TextureCache::default();
        assert!(cache.is_empty());
        assert_eq!(TextureCache::<Opaque>::new().len(), 0);
    }
}
