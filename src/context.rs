use std::sync::Arc;

use anyhow::{Context as _, Result};
use winit::window::Window;

use crate::{
    audio::AudioEngine,
    camera::{Camera, CameraUniform, Projection},
    config::EngineConfig,
    texture::Texture,
    viewport::Viewport,
};

/// Camera state together with its GPU resources.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

/// Central GPU and window context.
///
/// Owns the surface, device and queue plus everything that depends on the
/// framebuffer size: depth and MSAA targets, the letterbox viewport and the
/// camera resources. Scenes receive it mutably from the engine loop.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub sample_count: u32,
    pub(crate) depth_texture: Texture,
    pub(crate) msaa_target: Option<Texture>,
    pub camera: CameraResources,
    pub projection: Projection,
    pub viewport: Viewport,
    pub clear_colour: wgpu::Color,
    /// `None` when no output device could be opened; the engine runs silent.
    pub audio: Option<AudioEngine>,
    design_size: (u32, u32),
}

impl Context {
    pub async fn new(window: Arc<Window>, engine_config: &EngineConfig) -> Result<Self> {
        let size = window.inner_size();

        log::debug!("wgpu setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible graphics adapter")?;
        let info = adapter.get_info();
        log::info!("adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("no graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The forward pass assumes an sRGB surface; fall back to whatever the
        // adapter offers first otherwise.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let present_mode = if engine_config.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let design_size = engine_config.design_size();
        let viewport = Viewport::letterbox(config.width, config.height, design_size.0, design_size.1);

        // The projection is pinned to the design size; resizing only moves
        // the letterbox viewport, so the visible aspect never changes.
        let projection = Projection::perspective(design_size.0 as f32, design_size.1 as f32);
        let camera = Camera::default();
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&camera, &projection);

        use wgpu::util::DeviceExt;
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("camera_bind_group_layout"),
            });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let camera = CameraResources {
            camera,
            uniform: camera_uniform,
            buffer: camera_buffer,
            bind_group: camera_bind_group,
            bind_group_layout: camera_bind_group_layout,
        };

        let sample_count = engine_config.sample_count.max(1);
        let depth_texture = Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            sample_count,
            "depth_texture",
        );
        // A missing sound device is not fatal; the engine runs silent.
        let audio = if engine_config.audio {
            match AudioEngine::new() {
                Ok(engine) => Some(engine),
                Err(e) => {
                    log::warn!("audio disabled: {e}");
                    None
                }
            }
        } else {
            None
        };

        let msaa_target = (sample_count > 1).then(|| {
            Texture::create_msaa_target(
                &device,
                [config.width, config.height],
                config.format,
                sample_count,
                "msaa_target",
            )
        });

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            sample_count,
            depth_texture,
            msaa_target,
            camera,
            projection,
            viewport,
            clear_colour: engine_config.clear_colour,
            audio,
            design_size,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn design_size(&self) -> (u32, u32) {
        self.design_size
    }

    /// Reconfigure the surface and rebuild the size-dependent targets.
    /// Zero-sized frames (minimised window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.viewport =
            Viewport::letterbox(width, height, self.design_size.0, self.design_size.1);
        self.depth_texture = Texture::create_depth_texture(
            &self.device,
            [width, height],
            self.sample_count,
            "depth_texture",
        );
        if self.msaa_target.is_some() {
            self.msaa_target = Some(Texture::create_msaa_target(
                &self.device,
                [width, height],
                self.config.format,
                self.sample_count,
                "msaa_target",
            ));
        }
        log::debug!(
            "resized to {width}x{height}, viewport {:?}",
            self.viewport
        );
    }

    /// Recompute the view-projection uniform and upload it.
    pub fn write_camera(&mut self) {
        self.camera
            .uniform
            .update_view_proj(&self.camera.camera, &self.projection);
        self.queue.write_buffer(
            &self.camera.buffer,
            0,
            bytemuck::cast_slice(&[self.camera.uniform]),
        );
    }
}
