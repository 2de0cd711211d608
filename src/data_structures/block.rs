//! A model plus its instance buffer, ready for instanced drawing.

use anyhow::Result;
use wgpu::util::DeviceExt;

use crate::{
    context::InitContext,
    data_structures::{
        instance::Instance,
        model::Model,
    },
    resources,
};

/// One loaded model and the per-instance transforms it is drawn with.
///
/// Mutate [`instances`](Self::instances) and call
/// [`write_to_buffer`](Self::write_to_buffer) to push the change to the GPU.
pub struct BuildingBlocks {
    pub model: Model,
    pub instances: Vec<Instance>,
    pub instance_buffer: wgpu::Buffer,
}

impl BuildingBlocks {
    /// Load `obj_file` and allocate `amount` identity instances.
    pub fn new(ctx: &InitContext, amount: u32, obj_file: &str) -> Result<Self> {
        let model = resources::load_model_obj(obj_file, ctx)?;
        let instances = (0..amount).map(|_| Instance::new()).collect::<Vec<_>>();
        let instance_buffer = mk_instance_buffer(&ctx.device, &instances);
        Ok(Self {
            model,
            instances,
            instance_buffer,
        })
    }

    /// Re-upload the instance data. Grows the buffer when instances were
    /// added since the last upload.
    pub fn write_to_buffer(&mut self, ctx: &InitContext) {
        let instance_data = self.instances.iter().map(Instance::to_raw).collect::<Vec<_>>();
        let bytes: &[u8] = bytemuck::cast_slice(&instance_data);
        if (bytes.len() as u64) > self.instance_buffer.size() {
            self.instance_buffer = mk_instance_buffer(&ctx.device, &self.instances);
        } else {
            ctx.queue.write_buffer(&self.instance_buffer, 0, bytes);
        }
    }
}

fn mk_instance_buffer(device: &wgpu::Device, instances: &[Instance]) -> wgpu::Buffer {
    let instance_data = instances.iter().map(Instance::to_raw).collect::<Vec<_>>();
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Instance Buffer"),
        contents: bytemuck::cast_slice(&instance_data),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}
