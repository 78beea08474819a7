//! A spinning sound demo: a static triangle, a sine hum orbiting the
//! listener, and a scene switch on Space (Escape quits).

use std::f32::consts::TAU;
use std::time::Duration;

use lumin::{
    KeyCode, Point3, WindowEvent,
    audio::{Sound, SourceId},
    config::EngineConfig,
    context::Context,
    pipeline,
    scene::{Scene, Transition},
    wgpu::{self, util::DeviceExt},
};
use winit_key::key_pressed;

/// Tiny helper around the verbose winit key event pattern.
mod winit_key {
    use lumin::winit::keyboard::PhysicalKey;
    use lumin::{KeyCode, WindowEvent};

    pub fn key_pressed(event: &WindowEvent, code: KeyCode) -> bool {
        matches!(
            event,
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && event.physical_key == PhysicalKey::Code(code)
        )
    }
}

const SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
};
@group(0) @binding(0) var<uniform> camera: Camera;

struct VsIn {
    @location(0) position: vec3<f32>,
    @location(1) colour: vec3<f32>,
};

struct VsOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) colour: vec3<f32>,
};

@vertex
fn vs_main(in: VsIn) -> VsOut {
    var out: VsOut;
    out.clip_position = camera.view_proj * vec4<f32>(in.position, 1.0);
    out.colour = in.colour;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return vec4<f32>(in.colour, 1.0);
}
"#;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    colour: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [0.0, 0.6, 0.0],
        colour: [1.0, 0.2, 0.2],
    },
    Vertex {
        position: [-0.6, -0.4, 0.0],
        colour: [0.2, 1.0, 0.2],
    },
    Vertex {
        position: [0.6, -0.4, 0.0],
        colour: [0.2, 0.2, 1.0],
    },
];

/// One second of a 220 Hz sine at the given rate.
fn hum(sample_rate: u32) -> Sound {
    let samples: Vec<f32> = (0..sample_rate)
        .map(|i| (i as f32 / sample_rate as f32 * 220.0 * TAU).sin() * 0.4)
        .collect();
    Sound::new(samples, 1, sample_rate)
}

struct TriangleScene {
    pipeline: Option<wgpu::RenderPipeline>,
    vertex_buffer: Option<wgpu::Buffer>,
    hum: Option<SourceId>,
    angle: f32,
    switch_requested: bool,
    exit_requested: bool,
}

impl TriangleScene {
    fn new() -> Self {
        Self {
            pipeline: None,
            vertex_buffer: None,
            hum: None,
            angle: 0.0,
            switch_requested: false,
            exit_requested: false,
        }
    }
}

impl Scene for TriangleScene {
    fn on_init(&mut self, ctx: &mut Context) {
        ctx.camera.camera.position = Point3::new(0.0, 0.0, 2.5);
        ctx.camera.camera.target = Point3::new(0.0, 0.0, 0.0);

        let shader = pipeline::create_shader(&ctx.device, "triangle_shader", SHADER)
            .expect("demo shader is valid WGSL");
        self.pipeline = Some(pipeline::mk_forward_pipeline(ctx, &shader, &[Vertex::desc()]));
        self.vertex_buffer = Some(ctx.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Triangle Vertices"),
                contents: bytemuck::cast_slice(&TRIANGLE),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));

        if let Some(audio) = &ctx.audio {
            let sound = hum(audio.stream_info().sample_rate);
            let id = audio.play_spatial(&sound, Point3::new(2.0, 0.0, 0.0));
            audio.set_looping(id, true);
            self.hum = Some(id);
        }
    }

    fn on_window_event(&mut self, _ctx: &mut Context, event: &WindowEvent) {
        if key_pressed(event, KeyCode::Space) {
            self.switch_requested = true;
        }
        if key_pressed(event, KeyCode::Escape) {
            self.exit_requested = true;
        }
    }

    fn update(&mut self, ctx: &mut Context, dt: Duration) -> Transition {
        if self.exit_requested {
            return Transition::Exit;
        }
        if self.switch_requested {
            if let (Some(audio), Some(id)) = (&ctx.audio, self.hum) {
                audio.stop(id);
            }
            return Transition::Switch(Box::new(QuietScene::default()));
        }

        // Orbit the hum around the listener once every four seconds.
        self.angle = (self.angle + dt.as_secs_f32() * TAU / 4.0) % TAU;
        if let (Some(audio), Some(id)) = (&ctx.audio, self.hum) {
            let position = Point3::new(2.0 * self.angle.cos(), 0.0, 2.0 * self.angle.sin());
            audio.set_source_position(id, position);
        }
        Transition::Continue
    }

    fn render(&mut self, _ctx: &Context, pass: &mut wgpu::RenderPass<'_>) {
        if let (Some(pipeline), Some(vertices)) = (&self.pipeline, &self.vertex_buffer) {
            pass.set_pipeline(pipeline);
            pass.set_vertex_buffer(0, vertices.slice(..));
            pass.draw(0..3, 0..1);
        }
    }
}

/// The post-switch state: nothing but a blue clear. Escape quits.
#[derive(Default)]
struct QuietScene {
    exit_requested: bool,
}

impl Scene for QuietScene {
    fn on_init(&mut self, ctx: &mut Context) {
        ctx.clear_colour = wgpu::Color {
            r: 0.05,
            g: 0.1,
            b: 0.3,
            a: 1.0,
        };
    }

    fn on_window_event(&mut self, _ctx: &mut Context, event: &WindowEvent) {
        if key_pressed(event, KeyCode::Escape) {
            self.exit_requested = true;
        }
    }

    fn update(&mut self, _ctx: &mut Context, _dt: Duration) -> Transition {
        if self.exit_requested {
            Transition::Exit
        } else {
            Transition::Continue
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = EngineConfig::default()
        .with_title("lumin triangle demo")
        .with_design_size(1024, 768);
    lumin::app::run(config, Box::new(TriangleScene::new()))
}
