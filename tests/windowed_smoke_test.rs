//! Windowed smoke test: opens a real window, renders a few cleared frames
//! and exits through the scene state machine.
//!
//! Needs a display and a GPU, so it is gated behind the `integration-tests`
//! feature and off in a default `cargo test`.

#[test]
#[cfg(feature = "integration-tests")]
fn clears_frames_and_exits_via_transition() {
    use std::time::Duration;

    use lumin::config::EngineConfig;
    use lumin::context::Context;
    use lumin::scene::{Scene, Transition};

    struct CountDown {
        frames_left: u32,
    }
    impl Scene for CountDown {
        fn on_init(&mut self, ctx: &mut Context) {
            ctx.clear_colour = lumin::wgpu::Color::WHITE;
        }

        fn update(&mut self, _ctx: &mut Context, _dt: Duration) -> Transition {
            if self.frames_left == 0 {
                return Transition::Exit;
            }
            self.frames_left -= 1;
            Transition::Continue
        }
    }

    let config = EngineConfig::default()
        .with_title("lumin smoke test")
        .with_size(320, 240);
    lumin::app::run(config, Box::new(CountDown { frames_left: 3 }))
        .expect("engine loop should exit cleanly");
}
