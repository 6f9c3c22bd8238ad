/// Scene, camera and interaction tuning constants.
///
/// These are the values the sphere has always shipped with; `VisualizerConfig`
/// defaults to them so the magic numbers live in one place.
// Camera
pub const CAMERA_FOV_Y_DEG: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_START: [f32; 3] = [0.0, -2.0, 14.0];

// Per-frame exponential smoothing toward the mouse target.
// Horizontal and vertical deliberately differ.
pub const DAMPING_HORIZONTAL: f32 = 0.05;
pub const DAMPING_VERTICAL: f32 = 0.5;

// Pixels from viewport center per unit of mouse offset
pub const POINTER_SCALE: f32 = 100.0;

// Sphere mesh
pub const SPHERE_RADIUS: f32 = 4.0;
pub const SPHERE_DETAIL: u32 = 30;

// Static color uniforms (never updated at runtime)
pub const SPHERE_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
pub const CLEAR_COLOR: [f32; 3] = [0.0, 0.0, 0.0];

// Post-processing defaults
pub const BLOOM_STRENGTH: f32 = 0.5;
pub const BLOOM_RADIUS: f32 = 0.8;
pub const BLOOM_THRESHOLD: f32 = 0.5;

// Audio analysis
pub const FFT_SIZE: u32 = 32;
pub const FFT_SIZE_MIN: u32 = 32;
pub const FFT_SIZE_MAX: u32 = 32768;
pub const MONITOR_VOLUME: f32 = 0.5;

// Embedded WGSL override looked up at mount
pub const SHADER_ELEMENT_ID: &str = "sphere-shader";
pub const CANVAS_ELEMENT_ID: &str = "pulse-sphere-canvas";
