//! lumin
//!
//! A minimal cross-platform game-engine scaffold. This crate exposes a small
//! surface for opening a window, driving a scene state machine, composing a
//! single forward render pass and playing positional audio. Everything
//! heavyweight is delegated to the platform crates (`winit`, `wgpu`, `cpal`);
//! lumin owns the lifecycle glue, the letterbox viewport policy and the
//! positional mix.
//!
//! High-level modules
//! - `app`: the event loop and engine entry point ([`app::run`])
//! - `audio`: output-device lifecycle, WAV decoding and the positional mixer
//! - `camera`: look-at camera, ortho/perspective projection and GPU uniform
//! - `config`: engine start-up configuration
//! - `context`: central GPU and window context that owns device/queue/targets
//! - `pipeline`: validated shader creation and render-pipeline construction
//! - `scene`: the [`scene::Scene`] trait and its [`scene::Transition`] machine
//! - `texture`: depth and multisampled colour render targets
//! - `viewport`: letterbox/pillarbox arithmetic
//!

pub mod app;
pub mod audio;
pub mod camera;
pub mod config;
pub mod context;
pub mod pipeline;
pub mod scene;
pub mod texture;
pub mod viewport;

// Re-exports commonly used types for convenience in downstream code.
pub use wgpu;
pub use winit;
pub use cgmath::*;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
pub use winit::keyboard::KeyCode;
