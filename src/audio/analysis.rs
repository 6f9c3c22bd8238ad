use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AudioError {
    #[error("microphone permission denied")]
    PermissionDenied,
    #[error("no microphone available")]
    NoDevice,
    #[error("microphone capture unsupported: {0}")]
    Unsupported(String),
    #[error("microphone error: {0}")]
    Other(String),
}

impl AudioError {
    /// Map a DOMException name from `getUserMedia` onto an error kind.
    pub fn from_dom_name(name: &str, message: &str) -> Self {
        match name {
            "NotAllowedError" | "SecurityError" | "PermissionDeniedError" => Self::PermissionDenied,
            "NotFoundError" | "DevicesNotFoundError" | "OverconstrainedError" => Self::NoDevice,
            "NotSupportedError" | "TypeError" => Self::Unsupported(message.to_string()),
            _ => Self::Other(format!("{name}: {message}")),
        }
    }
}

/// Where the microphone request stands. Anything other than `Live` reads as silence.
#[derive(Debug, Clone, PartialEq)]
pub enum Acquisition {
    Pending,
    Live,
    Failed(AudioError),
}

pub type SharedAcquisition = Rc<RefCell<Acquisition>>;

/// Mean magnitude of a byte frequency spectrum, in `[0, 255]`.
#[inline]
pub fn average_frequency(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u32 = bins.iter().map(|&b| b as u32).sum();
    sum as f32 / bins.len() as f32
}

/// Anything that can report one loudness scalar per frame.
pub trait FrequencySource {
    fn average_frequency(&mut self) -> f32;
}

/// Something that fills a byte spectrum, e.g. a WebAudio `AnalyserNode`.
pub trait SpectrumTap {
    fn bin_count(&self) -> usize;
    fn fill(&self, bins: &mut [u8]);
}

/// Stand-in tap when no audio context could be created at all.
pub struct Silence;

impl SpectrumTap for Silence {
    fn bin_count(&self) -> usize {
        0
    }

    fn fill(&self, _bins: &mut [u8]) {}
}

pub struct AnalyserSource<T: SpectrumTap> {
    tap: T,
    bins: Vec<u8>,
    acquisition: SharedAcquisition,
}

impl<T: SpectrumTap> AnalyserSource<T> {
    pub fn new(tap: T, acquisition: SharedAcquisition) -> Self {
        let bins = vec![0; tap.bin_count()];
        Self {
            tap,
            bins,
            acquisition,
        }
    }

    pub fn acquisition(&self) -> Acquisition {
        self.acquisition.borrow().clone()
    }
}

impl<T: SpectrumTap> FrequencySource for AnalyserSource<T> {
    fn average_frequency(&mut self) -> f32 {
        if *self.acquisition.borrow() != Acquisition::Live {
            return 0.0;
        }
        let n = self.tap.bin_count();
        if self.bins.len() != n {
            self.bins.resize(n, 0);
        }
        self.tap.fill(&mut self.bins);
        average_frequency(&self.bins)
    }
}
