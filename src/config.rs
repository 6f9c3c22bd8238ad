use crate::constants::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("fft size {0} must be a power of two in 32..=32768")]
    FftSize(u32),
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("damping factor {name} must be in (0, 1], got {value}")]
    Damping { name: &'static str, value: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub start: [f32; 3],
}

/// Per-axis smoothing factors applied once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damping {
    pub horizontal: f32,
    pub vertical: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereConfig {
    pub radius: f32,
    pub detail: u32,
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomConfig {
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioConfig {
    /// Analyser transform size; the analyser exposes `fft_size / 2` bins.
    pub fft_size: u32,
    /// Gain applied between the microphone and the analyser.
    pub monitor_volume: f32,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualizerConfig {
    pub camera: CameraConfig,
    pub damping: Damping,
    pub pointer_scale: f32,
    pub sphere: SphereConfig,
    pub bloom: BloomConfig,
    pub audio: AudioConfig,
    pub clear_color: [f32; 3],
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                fov_y_deg: CAMERA_FOV_Y_DEG,
                near: CAMERA_NEAR,
                far: CAMERA_FAR,
                start: CAMERA_START,
            },
            damping: Damping {
                horizontal: DAMPING_HORIZONTAL,
                vertical: DAMPING_VERTICAL,
            },
            pointer_scale: POINTER_SCALE,
            sphere: SphereConfig {
                radius: SPHERE_RADIUS,
                detail: SPHERE_DETAIL,
                color: SPHERE_COLOR,
            },
            bloom: BloomConfig {
                strength: BLOOM_STRENGTH,
                radius: BLOOM_RADIUS,
                threshold: BLOOM_THRESHOLD,
            },
            audio: AudioConfig {
                fft_size: FFT_SIZE,
                monitor_volume: MONITOR_VOLUME,
                echo_cancellation: true,
                noise_suppression: true,
                auto_gain_control: true,
            },
            clear_color: CLEAR_COLOR,
        }
    }
}

impl VisualizerConfig {
    /// Same defaults with a different analyser size (e.g. 256 for a finer spectrum).
    pub fn with_fft_size(mut self, fft_size: u32) -> Self {
        self.audio.fft_size = fft_size;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fft = self.audio.fft_size;
        if !fft.is_power_of_two() || !(FFT_SIZE_MIN..=FFT_SIZE_MAX).contains(&fft) {
            return Err(ConfigError::FftSize(fft));
        }
        for (name, value) in [
            ("damping.horizontal", self.damping.horizontal),
            ("damping.vertical", self.damping.vertical),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Damping { name, value });
            }
        }
        for (name, value) in [
            ("pointer_scale", self.pointer_scale),
            ("sphere.radius", self.sphere.radius),
            ("camera.fov_y_deg", self.camera.fov_y_deg),
            ("camera.near", self.camera.near),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        Ok(())
    }
}
