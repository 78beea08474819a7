//! Letterbox/pillarbox viewport arithmetic.
//!
//! When the window is resized the scene keeps rendering at a fixed design
//! aspect ratio. The viewport is the largest rect of that ratio that fits
//! the new framebuffer, centred, with black bars on the remaining axis.

/// A viewport rect in physical pixels, as passed to
/// [`wgpu::RenderPass::set_viewport`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// The whole framebuffer, no bars.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
        }
    }

    /// Largest centred rect of `design_w : design_h` aspect inside a
    /// `window_w` x `window_h` framebuffer.
    ///
    /// A window wider than the design ratio gets pillarboxed, a taller one
    /// letterboxed. Degenerate inputs (any dimension zero) collapse to an
    /// empty viewport instead of dividing by zero.
    pub fn letterbox(window_w: u32, window_h: u32, design_w: u32, design_h: u32) -> Self {
        if window_w == 0 || window_h == 0 || design_w == 0 || design_h == 0 {
            return Self {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
            };
        }

        // Uniform scale that makes the design rect just fit; the window's
        // longer-than-design axis keeps the bars.
        let scale = (window_w as f32 / design_w as f32).min(window_h as f32 / design_h as f32);
        let width = design_w as f32 * scale;
        let height = design_h as f32 * scale;

        Self {
            x: (window_w as f32 - width) / 2.0,
            y: (window_h as f32 - height) / 2.0,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Aspect ratio of the rect, or `None` when empty.
    pub fn aspect(&self) -> Option<f32> {
        if self.is_empty() {
            None
        } else {
            Some(self.width / self.height)
        }
    }

    pub(crate) fn apply(&self, pass: &mut wgpu::RenderPass<'_>) {
        if !self.is_empty() {
            pass.set_viewport(self.x, self.y, self.width, self.height, 0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn exact_fit_has_no_bars() {
        let vp = Viewport::letterbox(1024, 768, 1024, 768);
        assert_eq!(vp, Viewport::full(1024, 768));
    }

    #[test]
    fn scaled_fit_has_no_bars() {
        let vp = Viewport::letterbox(2048, 1536, 1024, 768);
        assert_eq!(vp, Viewport::full(2048, 1536));
    }

    #[test]
    fn wide_window_is_pillarboxed() {
        // 16:9 window, 4:3 design: full height, bars left and right.
        let vp = Viewport::letterbox(1920, 1080, 1024, 768);
        assert!(approx(vp.height, 1080.0));
        assert!(approx(vp.width, 1440.0));
        assert!(approx(vp.x, 240.0));
        assert!(approx(vp.y, 0.0));
    }

    #[test]
    fn tall_window_is_letterboxed() {
        // Portrait window, 4:3 design: full width, bars top and bottom.
        let vp = Viewport::letterbox(768, 1024, 1024, 768);
        assert!(approx(vp.width, 768.0));
        assert!(approx(vp.height, 576.0));
        assert!(approx(vp.x, 0.0));
        assert!(approx(vp.y, 224.0));
    }

    #[test]
    fn preserves_design_aspect() {
        for (w, h) in [(333, 777), (1920, 1080), (5, 4000), (800, 600)] {
            let vp = Viewport::letterbox(w, h, 1024, 768);
            let aspect = vp.aspect().expect("viewport must not be empty");
            assert!(approx(aspect, 1024.0 / 768.0), "{w}x{h} gave {aspect}");
        }
    }

    #[test]
    fn zero_sized_window_is_empty() {
        assert!(Viewport::letterbox(0, 768, 1024, 768).is_empty());
        assert!(Viewport::letterbox(1024, 0, 1024, 768).is_empty());
        assert!(Viewport::letterbox(1024, 768, 0, 0).is_empty());
    }
}
