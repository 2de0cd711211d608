//! lode-ngin
//!
//! A small model-loading and instancing engine. The core is a three-stage
//! loading pipeline: import a model file into a neutral scene graph,
//! flatten every node-referenced mesh into plain vertex/index arrays, and
//! upload the result into GPU buffers with per-material textures resolved
//! through a path-keyed dedup cache. Around it sits just enough runtime to
//! host small rendering demos.
//!
//! High-level modules
//! - `camera`: camera, projection, controller and the uniform bundle
//! - `context`: the explicit GPU/window context handle
//! - `data_structures`: scenes, models, textures and instance data
//! - `flow`: the scene trait and the windowed run loop
//! - `pipelines`: basic, transparent and light render pipelines
//! - `resources`: importers, the mesh flattener and texture resolution
//! - `render`: per-frame render batching

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;

// Re-exports commonly used types for downstream code.
pub use cgmath::*;
pub use wgpu::*;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
