//! Engine start-up configuration.

/// Parameters applied when the window and GPU context are created.
///
/// The defaults mirror a small desktop game: a 1024x768 window, vsync on and
/// a 4x multisampled colour target. `design_size` is the logical resolution
/// the letterbox viewport preserves when the window is resized; when `None`
/// the initial window size is used.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Samples for the multisampled colour target. 1 disables MSAA.
    pub sample_count: u32,
    pub design_size: Option<(u32, u32)>,
    pub clear_colour: wgpu::Color,
    /// Whether to open the default audio output device at start-up. Failure
    /// to open one is never fatal either way; the engine just runs silent.
    pub audio: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "lumin".to_string(),
            width: 1024,
            height: 768,
            vsync: true,
            sample_count: 4,
            design_size: None,
            clear_colour: wgpu::Color::BLACK,
            audio: true,
        }
    }
}

impl EngineConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Fix the logical resolution the viewport letterboxes to.
    pub fn with_design_size(mut self, width: u32, height: u32) -> Self {
        self.design_size = Some((width, height));
        self
    }

    /// The design size to letterbox against, falling back to the initial
    /// window size.
    pub(crate) fn design_size(&self) -> (u32, u32) {
        self.design_size.unwrap_or((self.width, self.height))
    }
}
