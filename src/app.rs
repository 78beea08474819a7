//! The engine event loop.
//!
//! [`run`] owns the whole lifecycle: logger setup, event loop and window
//! creation, GPU context construction, audio device start-up, and driving
//! the scene state machine. Each frame:
//!
//! 1. window/device events are forwarded to the active scene
//! 2. the scene updates and returns a [`Transition`](crate::scene::Transition)
//! 3. the camera uniform and audio listener are refreshed
//! 4. the forward pass is recorded (clear, camera bind, letterbox viewport,
//!    scene draw calls) and presented

use std::{iter, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{config::EngineConfig, context::Context, scene::Scene};

/// Everything that exists once the window is up.
struct AppState {
    ctx: Context,
    scene: Option<Box<dyn Scene>>,
    is_surface_configured: bool,
}

impl AppState {
    fn new(window: Arc<Window>, config: &EngineConfig, mut scene: Box<dyn Scene>) -> Self {
        let ctx = pollster::block_on(Context::new(window, config));
        let mut ctx = match ctx {
            Ok(ctx) => ctx,
            Err(e) => panic!("engine initialization failed, cannot create the main context: {e}"),
        };

        scene.on_init(&mut ctx);

        Self {
            ctx,
            scene: Some(scene),
            is_surface_configured: true,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.is_surface_configured = true;
            self.ctx.resize(width, height);
        }
    }

    /// Advance the scene machine, refresh per-frame GPU/audio state and
    /// render. Exits the loop on [`Transition::Exit`](crate::scene::Transition::Exit).
    fn frame(&mut self, event_loop: &ActiveEventLoop, dt: Duration) {
        let Some(mut scene) = self.scene.take() else {
            event_loop.exit();
            return;
        };
        let transition = scene.update(&mut self.ctx, dt);
        let switched = transition.is_switch();
        match transition.apply(scene) {
            Some(mut next) => {
                if switched {
                    log::debug!("scene switch");
                    next.on_init(&mut self.ctx);
                }
                self.scene = Some(next);
            }
            None => {
                event_loop.exit();
                return;
            }
        }

        self.ctx.write_camera();
        if let Some(audio) = &self.ctx.audio {
            let camera = &self.ctx.camera.camera;
            audio.set_listener(camera.position, camera.right());
        }

        match self.render() {
            Ok(()) => {}
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.ctx.window.inner_size();
                self.resize(size.width, size.height);
            }
            Err(e) => {
                log::error!("unable to render: {e}");
            }
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        {
            // With MSAA on, draw into the multisampled target and resolve
            // into the swapchain image.
            let (view, resolve_target) = match &self.ctx.msaa_target {
                Some(msaa) => (&msaa.view, Some(&surface_view)),
                None => (&surface_view, None),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Forward Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
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

            pass.set_bind_group(0, &self.ctx.camera.bind_group, &[]);
            self.ctx.viewport.apply(&mut pass);

            if let Some(scene) = &mut self.scene {
                scene.render(&self.ctx, &mut pass);
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App {
    config: EngineConfig,
    // Taken on `resumed`, when the window exists.
    initial_scene: Option<Box<dyn Scene>>,
    state: Option<AppState>,
    last_time: Instant,
}

impl App {
    pub fn new(config: EngineConfig, scene: Box<dyn Scene>) -> Self {
        Self {
            config,
            initial_scene: Some(scene),
            state: None,
            last_time: Instant::now(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(scene) = self.initial_scene.take() else {
            // Already initialized; nothing to do on repeat resumes.
            return;
        };

        let window_attributes = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => panic!("engine initialization failed, cannot create a window: {e}"),
        };

        self.state = Some(AppState::new(window, &self.config, scene));
        self.last_time = Instant::now();
        if let Some(state) = &self.state {
            state.ctx.window.request_redraw();
        }
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
        if let Some(scene) = &mut state.scene {
            scene.on_device_event(&mut state.ctx, &event);
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

        if let Some(scene) = &mut state.scene {
            scene.on_window_event(&mut state.ctx, &event);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                state.frame(event_loop, dt);
            }
            _ => {}
        }
    }
}

/// Start the engine with `scene` as the initial state.
///
/// Blocks until the scene machine exits or the window is closed.
pub fn run(config: EngineConfig, scene: Box<dyn Scene>) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {e}");
    }

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        EventLoop::builder()
            .with_any_thread(true)
            .build()
            .expect("Failed to create an event loop")
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoop::builder()
            .with_any_thread(true)
            .build()
            .expect("Failed to create an event loop")
    };

    #[cfg(not(feature = "integration-tests"))]
    let event_loop = EventLoop::new()?;

    let mut app = App::new(config, scene);
    event_loop.run_app(&mut app)?;

    Ok(())
}
