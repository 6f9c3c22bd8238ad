use crate::config::{Damping, VisualizerConfig};
use glam::{Mat4, Vec2, Vec3};

/// Output size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

/// Mouse displacement from the viewport center, in scaled units.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MouseOffset {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Values handed to the sphere shader each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneUniforms {
    pub time: f32,
    pub frequency: f32,
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

#[inline]
pub fn damp(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

#[inline]
pub fn mouse_offset(client: Vec2, viewport: Viewport, scale: f32) -> MouseOffset {
    let d = (client - viewport.center()) / scale;
    MouseOffset { x: d.x, y: d.y }
}

/// Everything the render loop mutates, owned in one place.
#[derive(Debug, Clone)]
pub struct Session {
    pub camera: Camera,
    pub mouse: MouseOffset,
    pub uniforms: SceneUniforms,
    pub viewport: Viewport,
    damping: Damping,
    pointer_scale: f32,
    frames: u64,
}

impl Session {
    pub fn new(config: &VisualizerConfig, viewport: Viewport) -> Self {
        let [red, green, blue] = config.sphere.color;
        Self {
            camera: Camera {
                position: Vec3::from_array(config.camera.start),
                target: Vec3::ZERO,
                fov_y_deg: config.camera.fov_y_deg,
                near: config.camera.near,
                far: config.camera.far,
                aspect: viewport.aspect(),
            },
            mouse: MouseOffset::default(),
            uniforms: SceneUniforms {
                time: 0.0,
                frequency: 0.0,
                red,
                green,
                blue,
            },
            viewport,
            damping: config.damping,
            pointer_scale: config.pointer_scale,
            frames: 0,
        }
    }

    pub fn pointer_moved(&mut self, client_x: f32, client_y: f32) {
        self.mouse = mouse_offset(
            Vec2::new(client_x, client_y),
            self.viewport,
            self.pointer_scale,
        );
    }

    /// Returns true when the viewport actually changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let next = Viewport::new(width, height);
        if next == self.viewport {
            return false;
        }
        self.viewport = next;
        self.camera.aspect = next.aspect();
        true
    }

    /// One render step: ease the camera toward the mouse and refresh the
    /// time/frequency uniforms. No timestep correction is applied.
    pub fn advance(&mut self, elapsed_sec: f32, frequency: f32) {
        let pos = &mut self.camera.position;
        pos.x = damp(pos.x, self.mouse.x, self.damping.horizontal);
        pos.y = damp(pos.y, -self.mouse.y, self.damping.vertical);
        self.uniforms.time = elapsed_sec;
        self.uniforms.frequency = frequency;
        self.frames += 1;
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn view_proj(&self) -> Mat4 {
        self.camera.view_proj()
    }
}
