//! Render composition and pipeline batching.
//!
//! Scenes describe what to draw each frame by returning a [`Render`]; the
//! runner sorts the pieces into opaque and transparent batches so each
//! pipeline is bound once per frame.

use crate::data_structures::{block::BuildingBlocks, model::Model};

/// One instanced draw: a model plus its per-instance buffer.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

/// How a scene wants to be rendered this frame.
///
/// `Default`/`Defaults` go through the opaque pipeline,
/// `Transparent`/`Transparents` through the alpha-blended one (drawn after
/// the opaques), and `Composed` nests multiple renders.
pub enum Render<'a> {
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
    Transparent(Instanced<'a>),
    Transparents(Vec<Instanced<'a>>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub(crate) fn into_batches(
        self,
        basics: &mut Vec<Instanced<'a>>,
        trans: &mut Vec<Instanced<'a>>,
    ) {
        match self {
            Render::Default(instanced) => basics.push(instanced),
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::Transparent(instanced) => trans.push(instanced),
            Render::Transparents(mut vec) => trans.append(&mut vec),
            Render::Composed(renders) => {
                for render in renders {
                    render.into_batches(basics, trans);
                }
            }
            Render::None => (),
        }
    }
}

impl<'a> From<&'a BuildingBlocks> for Render<'a> {
    fn from(blocks: &'a BuildingBlocks) -> Self {
        Render::Default(Instanced {
            instance: &blocks.instance_buffer,
            model: &blocks.model,
            amount: blocks.instances.len(),
        })
    }
}
