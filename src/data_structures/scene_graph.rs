//! Imported scene graph.
//!
//! The importers in [`crate::resources`] parse external model formats into
//! this neutral in-memory representation: a node tree referencing meshes by
//! index, a flat mesh table and a flat material table. The flattener walks
//! it read-only and emits owned [`FlatMesh`] records, so nothing here holds
//! GPU resources.

/// A complete imported scene: node hierarchy plus mesh and material tables.
#[derive(Debug, Default)]
pub struct Scene {
    pub root: Node,
    pub meshes: Vec<RawMesh>,
    pub materials: Vec<SceneMaterial>,
}

/// One node of the hierarchy. References meshes by index into
/// [`Scene::meshes`]; children are kept in their stored order.
#[derive(Debug, Default)]
pub struct Node {
    pub name: String,
    pub mesh_indices: Vec<usize>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Mesh data as the importer found it, before flattening.
///
/// `indices` is always triangulated (the importers request triangulation),
/// so its length is a multiple of three. Optional attributes are `None` when
/// the source format doesn't declare them; the flattener fills the gaps.
#[derive(Debug, Default)]
pub struct RawMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinate channel 0. Sources can carry more channels; only
    /// the first is kept.
    pub tex_coords: Option<Vec<[f32; 2]>>,
    pub tangents: Option<Vec<[f32; 3]>>,
    pub bitangents: Option<Vec<[f32; 3]>>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}

impl RawMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Semantic purpose of a texture slot, used to pick the shader sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureRole {
    Diffuse,
    Specular,
    Normal,
    Ambient,
}

/// A material as imported: named texture slots, each a role plus a file path
/// relative to the model file.
#[derive(Debug, Default)]
pub struct SceneMaterial {
    pub name: String,
    pub textures: Vec<(TextureRole, String)>,
}

impl SceneMaterial {
    /// First texture path registered for `role`, if any.
    pub fn texture(&self, role: TextureRole) -> Option<&str> {
        self.textures
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, p)| p.as_str())
    }
}

/// A mesh flattened into plain arrays, ready for GPU upload.
///
/// Owns its data; the uploader borrows it read-only.
#[derive(Debug)]
pub struct FlatMesh {
    pub name: String,
    pub vertices: Vec<crate::data_structures::model::ModelVertex>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}
