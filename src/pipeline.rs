//! Shader compilation and render-pipeline construction helpers.
//!
//! wgpu validates WGSL lazily and reports failures through error scopes, so
//! [`create_shader`] wraps module creation in a validation scope and turns a
//! malformed source into an `Err` carrying the driver's message instead of a
//! device loss later in the frame.

use anyhow::{Result, anyhow};

use crate::{context::Context, texture::Texture};

/// Compile a WGSL module, surfacing validation failures as an error.
pub fn create_shader(device: &wgpu::Device, label: &str, source: &str) -> Result<wgpu::ShaderModule> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let error = pollster::block_on(device.pop_error_scope());
    match error {
        Some(e) => Err(anyhow!("shader '{label}' failed to compile: {e}")),
        None => Ok(module),
    }
}

/// Build a forward-pass pipeline against the context's surface format,
/// camera bind group layout, depth format and sample count.
///
/// `vertex_layouts` describe the scene's vertex buffers; the module must
/// export `vs_main` and `fs_main`.
pub fn mk_forward_pipeline(
    ctx: &Context,
    shader: &wgpu::ShaderModule,
    vertex_layouts: &[wgpu::VertexBufferLayout],
) -> wgpu::RenderPipeline {
    let layout = ctx
        .device
        .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Forward Pipeline Layout"),
            bind_group_layouts: &[&ctx.camera.bind_group_layout],
            push_constant_ranges: &[],
        });
    mk_render_pipeline(
        &ctx.device,
        &layout,
        ctx.config.format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(Texture::DEPTH_FORMAT),
        ctx.sample_count,
        vertex_layouts,
        shader,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    sample_count: u32,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
