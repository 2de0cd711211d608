//! Instanced asteroid field: one OBJ rock drawn a thousand times from a
//! single instance buffer. Run from this directory so `assets/` resolves.

use std::time::Duration;

use lode_ngin::{
    Deg, DeviceEvent, Quaternion, Rotation3, Vector3, WindowEvent,
    context::{Context, InitContext},
    data_structures::block::BuildingBlocks,
    flow::{FlowConstructor, GraphicsFlow},
    render::Render,
};

#[derive(Default)]
struct State;

struct Asteroids {
    field: BuildingBlocks,
}

impl Asteroids {
    fn new(ctx: InitContext) -> anyhow::Result<Self> {
        let mut field = BuildingBlocks::new(&ctx, 1000, "assets/rock.obj")?;
        field
            .instances
            .iter_mut()
            .enumerate()
            .for_each(|(i, instance)| {
                // 10x10x10 cube
                let len = 10;
                let spacing = 6.0;
                let x = i % len;
                let y = (i / len) % len;
                let z = i / (len * len);
                let offset = len as f32 / 2.0;
                instance.position = Vector3::new(
                    (x as f32 - offset) * spacing,
                    (y as f32 - offset) * spacing,
                    (z as f32 - offset) * spacing,
                );
                instance.rotation =
                    Quaternion::from_angle_y(Deg(i as f32 * 7.0))
                        * Quaternion::from_angle_x(Deg(i as f32 * 3.0));
                instance.scale = [0.5; 3].into();
            });
        field.write_to_buffer(&ctx);
        Ok(Self { field })
    }
}

impl GraphicsFlow<State> for Asteroids {
    fn on_init(&mut self, ctx: &mut Context, _: &mut State) {
        ctx.clear_colour = lode_ngin::Color {
            r: 0.01,
            g: 0.01,
            b: 0.03,
            a: 1.0,
        };
        ctx.camera.camera.position = (0.0, 5.0, 50.0).into();
    }

    fn on_update(&mut self, ctx: &Context, _: &mut State, dt: Duration) {
        let spin = Quaternion::from_angle_y(Deg(12.0 * dt.as_secs_f32()));
        for instance in &mut self.field.instances {
            instance.rotation = spin * instance.rotation;
        }
        self.field.write_to_buffer(&InitContext::from(ctx));
    }

    fn on_device_events(&mut self, _: &Context, _: &mut State, _: &DeviceEvent) {}

    fn on_window_events(&mut self, _: &Context, _: &mut State, _: &WindowEvent) {}

    fn on_render(&self) -> Render<'_> {
        Render::from(&self.field)
    }
}

fn main() -> anyhow::Result<()> {
    let asteroids: FlowConstructor<State> = Box::new(|ctx| {
        Ok(Box::new(Asteroids::new(ctx)?) as Box<dyn GraphicsFlow<State>>)
    });
    lode_ngin::flow::run(vec![asteroids])
}
