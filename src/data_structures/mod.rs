//! Engine data structures: scenes, models, textures and instances.
//!
//! - `scene_graph` is the neutral imported scene (nodes, raw meshes, materials)
//! - `model` holds GPU-side meshes, materials and draw helpers
//! - `texture` wraps GPU textures and their creation
//! - `instance` holds per-instance transform data for instanced drawing
//! - `block` bundles a model with its instance buffer

pub mod block;
pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
