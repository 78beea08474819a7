//! The scene trait and its transition state machine.
//!
//! A [`Scene`] is a self-contained game state: it receives input events,
//! updates once per frame and records its draw calls into the forward pass.
//! Each update returns a [`Transition`] telling the engine whether to keep
//! the scene, replace it or shut down. The replaced scene is dropped; the
//! incoming one gets `on_init` before its first update.

use instant::Duration;
use winit::event::{DeviceEvent, WindowEvent};

use crate::context::Context;

/// What the engine should do with the current scene after an update.
pub enum Transition {
    /// Keep running the current scene.
    Continue,
    /// Drop the current scene and hand control to its successor.
    Switch(Box<dyn Scene>),
    /// End the event loop.
    Exit,
}

impl Transition {
    /// Advance the state machine: consume the current scene and yield the
    /// next one, or `None` to exit.
    pub fn apply(self, current: Box<dyn Scene>) -> Option<Box<dyn Scene>> {
        match self {
            Transition::Continue => Some(current),
            Transition::Switch(next) => Some(next),
            Transition::Exit => None,
        }
    }

    /// Whether applying this transition hands control to a new scene.
    pub fn is_switch(&self) -> bool {
        matches!(self, Transition::Switch(_))
    }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Continue => f.write_str("Continue"),
            Transition::Switch(_) => f.write_str("Switch(..)"),
            Transition::Exit => f.write_str("Exit"),
        }
    }
}

/// Trait for implementing a game state.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once, before the first update
/// 2. `on_window_event()` / `on_device_event()` are called per input event
/// 3. `update()` is called every frame and returns a [`Transition`]
/// 4. `render()` is called every frame with the forward pass already begun:
///    camera bound at group 0, letterbox viewport set, targets cleared
pub trait Scene {
    /// Configure the context (camera, clear colour) and create GPU resources.
    fn on_init(&mut self, _ctx: &mut Context) {}

    /// Handle a window event (keyboard, mouse, focus and the like). Resizing
    /// and close requests are handled by the engine before this is called.
    fn on_window_event(&mut self, _ctx: &mut Context, _event: &WindowEvent) {}

    /// Handle a raw device event.
    fn on_device_event(&mut self, _ctx: &mut Context, _event: &DeviceEvent) {}

    /// Advance the scene by `dt` and decide what runs next frame.
    fn update(&mut self, ctx: &mut Context, dt: Duration) -> Transition;

    /// Record draw calls into the prepared forward pass.
    fn render(&mut self, _ctx: &Context, _pass: &mut wgpu::RenderPass<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    // A scene that flips a flag on drop, so transitions can be observed
    // without a GPU context.
    struct Tracked {
        dropped: Rc<Cell<bool>>,
    }
    impl Tracked {
        fn new() -> (Box<dyn Scene>, Rc<Cell<bool>>) {
            let dropped = Rc::new(Cell::new(false));
            let scene = Box::new(Tracked {
                dropped: dropped.clone(),
            });
            (scene, dropped)
        }
    }
    impl Drop for Tracked {
        fn drop(&mut self) {
            self.dropped.set(true);
        }
    }
    impl Scene for Tracked {
        fn update(&mut self, _: &mut Context, _: Duration) -> Transition {
            Transition::Continue
        }
    }

    #[test]
    fn continue_keeps_the_current_scene() {
        let (current, dropped) = Tracked::new();
        let next = Transition::Continue.apply(current);
        assert!(next.is_some());
        assert!(!dropped.get());
    }

    #[test]
    fn switch_replaces_and_drops_the_old_scene() {
        let (current, old_dropped) = Tracked::new();
        let (replacement, new_dropped) = Tracked::new();
        let t = Transition::Switch(replacement);
        assert!(t.is_switch());
        let next = t.apply(current);
        assert!(next.is_some());
        assert!(old_dropped.get());
        assert!(!new_dropped.get());
    }

    #[test]
    fn exit_ends_the_machine() {
        let (current, dropped) = Tracked::new();
        assert!(Transition::Exit.apply(current).is_none());
        assert!(dropped.get());
    }
}
