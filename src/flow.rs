//! Application event loop and the [`GraphicsFlow`] scene trait.
//!
//! A flow is a self-contained scene: it loads its resources in a
//! constructor, reacts to input events, updates per frame and returns a
//! [`Render`] describing what to draw. The runner owns the window, the GPU
//! [`Context`] and the frame loop:
//!
//! 1. winit delivers window/device events, forwarded to every flow
//! 2. `on_update` runs each frame with the elapsed time
//! 3. `on_render` results are batched per pipeline and drawn
//! 4. camera and light uniforms are refreshed and the frame presented

use std::{iter, sync::Arc, time::Duration, time::Instant};

use cgmath::Rotation3;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    context::{Context, InitContext, MouseButtonState},
    data_structures::{model::DrawLight, model::DrawModel, texture::Texture},
    render::{Instanced, Render},
};

/// A renderable scene or game state driven by the runner.
pub trait GraphicsFlow<S> {
    /// Called once after the context exists; the only place to reconfigure
    /// it (clear colour, camera start position, light).
    fn on_init(&mut self, ctx: &mut Context, state: &mut S);

    /// Called every frame with the elapsed time.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration);

    /// Raw device events (relative mouse motion, etc.).
    fn on_device_events(&mut self, ctx: &Context, state: &mut S, event: &DeviceEvent);

    /// Window events (keyboard, cursor, resize, etc.).
    fn on_window_events(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent);

    /// What to draw this frame.
    fn on_render(&self) -> Render<'_>;
}

/// Factory for a flow: receives the init context, loads resources, returns
/// the flow. Loading is synchronous; a failed load aborts startup.
pub type FlowConstructor<S> =
    Box<dyn FnOnce(InitContext) -> anyhow::Result<Box<dyn GraphicsFlow<S>>>>;

struct AppState<State> {
    ctx: Context,
    state: State,
    is_surface_configured: bool,
}

impl<State> AppState<State> {
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    fn render(
        &mut self,
        graphics_flows: &[Box<dyn GraphicsFlow<State>>],
    ) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(light_model) = &self.ctx.light.model {
                render_pass.set_pipeline(&self.ctx.pipelines.light);
                render_pass.draw_light_model(
                    light_model,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }

            let mut basics: Vec<Instanced> = Vec::new();
            let mut trans: Vec<Instanced> = Vec::new();
            for flow in graphics_flows {
                flow.on_render().into_batches(&mut basics, &mut trans);
            }

            render_pass.set_pipeline(&self.ctx.pipelines.basic);
            for instanced in basics {
                if instanced.amount == 0 || instanced.instance.size() == 0 {
                    log::warn!("skipping a render with zero instances");
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_model_instanced(
                    instanced.model,
                    0..instanced.amount as u32,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }

            render_pass.set_pipeline(&self.ctx.pipelines.transparent);
            for instanced in trans {
                if instanced.amount == 0 || instanced.instance.size() == 0 {
                    log::warn!("skipping a render with zero instances");
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_model_instanced(
                    instanced.model,
                    0..instanced.amount as u32,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App<State: 'static> {
    state: Option<AppState<State>>,
    graphics_flows: Vec<Box<dyn GraphicsFlow<State>>>,
    constructors: Option<Vec<FlowConstructor<State>>>,
    last_time: Instant,
}

impl<State> App<State> {
    fn new(constructors: Vec<FlowConstructor<State>>) -> Self {
        Self {
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            last_time: Instant::now(),
        }
    }
}

impl<State: 'static + Default> ApplicationHandler for App<State> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window = match event_loop.create_window(Window::default_attributes()) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let ctx = match pollster::block_on(Context::new(window)) {
            Ok(ctx) => ctx,
            Err(e) => panic!("app initialization failed, cannot create the main context: {e:#}"),
        };
        let mut app_state = AppState {
            ctx,
            state: State::default(),
            is_surface_configured: false,
        };

        let constructors = self.constructors.take().unwrap_or_default();
        for constructor in constructors {
            match constructor((&app_state.ctx).into()) {
                Ok(flow) => self.graphics_flows.push(flow),
                Err(e) => panic!("flow construction failed: {e:#}"),
            }
        }
        for flow in &mut self.graphics_flows {
            flow.on_init(&mut app_state.ctx, &mut app_state.state);
        }
        self.state = Some(app_state);
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            // Look around while the right button is held.
            if state.ctx.mouse.pressed == MouseButtonState::Right {
                state.ctx.camera.controller.handle_mouse(dx, dy);
            }
        }
        for flow in &mut self.graphics_flows {
            flow.on_device_events(&state.ctx, &mut state.state, &event);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.ctx.camera.controller.handle_window_events(&event);
        if let WindowEvent::CursorMoved { position, .. } = event {
            state.ctx.mouse.coords = position;
        }

        for flow in &mut self.graphics_flows {
            flow.on_window_events(&state.ctx, &mut state.state, &event);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                state.ctx.mouse.pressed = match (button, button_state.is_pressed()) {
                    (MouseButton::Left, true) => MouseButtonState::Left,
                    (MouseButton::Right, true) => MouseButtonState::Right,
                    _ => MouseButtonState::None,
                };
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                match state.render(&self.graphics_flows) {
                    Ok(()) => {
                        state
                            .ctx
                            .camera
                            .controller
                            .update(&mut state.ctx.camera.camera, dt);
                        state
                            .ctx
                            .camera
                            .uniform
                            .update_view_proj(&state.ctx.camera.camera, &state.ctx.projection);
                        state.ctx.queue.write_buffer(
                            &state.ctx.camera.buffer,
                            0,
                            bytemuck::cast_slice(&[state.ctx.camera.uniform]),
                        );

                        // Slowly orbit the light around the scene.
                        let old_position: cgmath::Vector3<f32> =
                            state.ctx.light.uniform.position.into();
                        state.ctx.light.uniform.position = (cgmath::Quaternion::from_axis_angle(
                            (0.0, 1.0, 0.0).into(),
                            cgmath::Deg(20.0 * dt.as_secs_f32()),
                        ) * old_position)
                            .into();
                        state.ctx.queue.write_buffer(
                            &state.ctx.light.buffer,
                            0,
                            bytemuck::cast_slice(&[state.ctx.light.uniform]),
                        );

                        for flow in &mut self.graphics_flows {
                            flow.on_update(&state.ctx, &mut state.state, dt);
                        }
                    }
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("unable to render: {e}");
                    }
                }
            }
            _ => {}
        }
    }
}

/// Initialize logging, open the window and run the flows until exit.
pub fn run<State: 'static + Default>(constructors: Vec<FlowConstructor<State>>) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        eprintln!("warning: could not initialize logger: {e}");
    }

    let event_loop = EventLoop::new()?;
    let mut app: App<State> = App::new(constructors);
    event_loop.run_app(&mut app)?;

    Ok(())
}
