//! Camera types and the view/projection uniform.
//!
//! A [`Camera`] is a plain look-at view; [`Projection`] is either
//! orthographic or perspective and carries the viewport rect, field of view
//! and depth range. [`CameraUniform`] is the GPU-facing matrix uploaded once
//! per frame.

use cgmath::{Deg, Matrix4, Point3, SquareMatrix, Vector3};

/// cgmath builds matrices for OpenGL clip space (z in -1..1); wgpu expects
/// z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A look-at view. Defaults to the origin, looking down -Z, +Y up.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 0.0),
            target: Point3::new(0.0, 0.0, -1.0),
            up: Vector3::unit_y(),
        }
    }
}

impl Camera {
    pub fn look_at(position: Point3<f32>, target: Point3<f32>, up: Vector3<f32>) -> Self {
        Self {
            position,
            target,
            up,
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    /// Unit vector pointing to the camera's right, on the view plane. The
    /// audio listener uses it for panning.
    pub fn right(&self) -> Vector3<f32> {
        use cgmath::InnerSpace;
        let forward = (self.target - self.position).normalize();
        forward.cross(self.up).normalize()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Orthographic,
    Perspective,
}

/// Orthographic or perspective projection over an explicit viewport rect.
///
/// The perspective path keeps a centred rect and only uses its aspect ratio;
/// the orthographic path maps the rect to clip space directly, so a
/// `0..width` x `0..height` rect gives pixel coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    mode: Mode,
    fov_y: Deg<f32>,
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn perspective(width: f32, height: f32) -> Self {
        let mut proj = Self {
            mode: Mode::Perspective,
            fov_y: Deg(60.0),
            left: 0.0,
            right: 0.0,
            bottom: 0.0,
            top: 0.0,
            znear: 0.1,
            zfar: 100.0,
        };
        proj.set_viewport_centred(width, height);
        proj
    }

    pub fn orthographic(width: f32, height: f32) -> Self {
        Self {
            mode: Mode::Orthographic,
            fov_y: Deg(60.0),
            left: 0.0,
            right: width,
            bottom: 0.0,
            top: height,
            znear: 0.0,
            zfar: 100.0,
        }
    }

    pub fn is_orthographic(&self) -> bool {
        self.mode == Mode::Orthographic
    }

    pub fn set_fov(&mut self, fov_y: Deg<f32>) {
        self.fov_y = fov_y;
    }

    pub fn set_depth(&mut self, znear: f32, zfar: f32) {
        self.znear = znear;
        self.zfar = zfar;
    }

    pub fn set_viewport(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        self.left = left;
        self.right = right;
        self.bottom = bottom;
        self.top = top;
    }

    pub fn set_viewport_centred(&mut self, width: f32, height: f32) {
        self.set_viewport(-width / 2.0, width / 2.0, -height / 2.0, height / 2.0);
    }

    /// Track a new framebuffer or design size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        match self.mode {
            Mode::Perspective => self.set_viewport_centred(width as f32, height as f32),
            Mode::Orthographic => self.set_viewport(0.0, width as f32, 0.0, height as f32),
        }
    }

    pub fn aspect(&self) -> f32 {
        (self.right - self.left) / (self.top - self.bottom)
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        let proj = match self.mode {
            Mode::Orthographic => cgmath::ortho(
                self.left,
                self.right,
                self.bottom,
                self.top,
                self.znear,
                self.zfar,
            ),
            Mode::Perspective => {
                cgmath::perspective(self.fov_y, self.aspect(), self.znear, self.zfar)
            }
        };
        OPENGL_TO_WGPU_MATRIX * proj
    }
}

/// The view-projection matrix as uploaded to the camera uniform buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_proj = (projection.matrix() * camera.view_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}
