//! Single-model viewer. Pass a path to an `.obj` or `.gltf`/`.glb` file,
//! or run without arguments from this directory to view the bundled crate.

use std::time::Duration;

use anyhow::bail;
use lode_ngin::{
    Deg, DeviceEvent, Quaternion, Rotation3, WindowEvent,
    context::{Context, InitContext},
    data_structures::{instance::Instance, model::Model},
    flow::{FlowConstructor, GraphicsFlow},
    render::{Instanced, Render},
    resources,
    util::DeviceExt,
};

#[derive(Default)]
struct State;

struct Viewer {
    model: Model,
    instance: Instance,
    instance_buffer: lode_ngin::Buffer,
}

impl Viewer {
    fn new(ctx: InitContext, path: &str) -> anyhow::Result<Self> {
        let model = match path.rsplit('.').next() {
            Some("obj") => resources::load_model_obj(path, &ctx)?,
            Some("gltf") | Some("glb") => resources::load_model_gltf(path, &ctx)?,
            _ => bail!("unsupported model format: {path}"),
        };
        let instance = Instance::new();
        let instance_buffer = ctx
            .device
            .create_buffer_init(&lode_ngin::util::BufferInitDescriptor {
                label: Some("Viewer Instance Buffer"),
                contents: bytemuck::cast_slice(&[instance.to_raw()]),
                usage: lode_ngin::BufferUsages::VERTEX | lode_ngin::BufferUsages::COPY_DST,
            });
        Ok(Self {
            model,
            instance,
            instance_buffer,
        })
    }
}

impl GraphicsFlow<State> for Viewer {
    fn on_init(&mut self, ctx: &mut Context, _: &mut State) {
        ctx.camera.camera.position = (0.0, 2.0, 6.0).into();
    }

    fn on_update(&mut self, ctx: &Context, _: &mut State, dt: Duration) {
        // Turntable rotation so every side of the model comes around.
        self.instance.rotation =
            Quaternion::from_angle_y(Deg(30.0 * dt.as_secs_f32())) * self.instance.rotation;
        ctx.queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&[self.instance.to_raw()]),
        );
    }

    fn on_device_events(&mut self, _: &Context, _: &mut State, _: &DeviceEvent) {}

    fn on_window_events(&mut self, _: &Context, _: &mut State, _: &WindowEvent) {}

    fn on_render(&self) -> Render<'_> {
        Render::Default(Instanced {
            instance: &self.instance_buffer,
            model: &self.model,
            amount: 1,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/crate.obj".to_string());

    let viewer: FlowConstructor<State> = Box::new(move |ctx| {
        Ok(Box::new(Viewer::new(ctx, &path)?) as Box<dyn GraphicsFlow<State>>)
    });
    lode_ngin::flow::run(vec![viewer])
}
