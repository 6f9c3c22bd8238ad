// Host-side tests for spectrum averaging and the microphone acquisition states.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod analysis {
    include!("../src/audio/analysis.rs");
}
mod constants {
    include!("../src/constants.rs");
}
mod config {
    include!("../src/config.rs");
}
mod session {
    include!("../src/session.rs");
}

use analysis::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Fixed spectrum that counts how often it was read.
struct FakeTap {
    bins: Vec<u8>,
    reads: Rc<Cell<usize>>,
}

impl SpectrumTap for FakeTap {
    fn bin_count(&self) -> usize {
        self.bins.len()
    }

    fn fill(&self, out: &mut [u8]) {
        self.reads.set(self.reads.get() + 1);
        out.copy_from_slice(&self.bins);
    }
}

fn source_with(
    bins: Vec<u8>,
    state: Acquisition,
) -> (AnalyserSource<FakeTap>, SharedAcquisition, Rc<Cell<usize>>) {
    let reads = Rc::new(Cell::new(0));
    let shared = Rc::new(RefCell::new(state));
    let src = AnalyserSource::new(
        FakeTap {
            bins,
            reads: reads.clone(),
        },
        shared.clone(),
    );
    (src, shared, reads)
}

#[test]
fn average_is_sum_over_count() {
    assert_eq!(average_frequency(&[10, 20, 30, 40]), 25.0);
    assert_eq!(average_frequency(&[0; 16]), 0.0);
    assert_eq!(average_frequency(&[255; 16]), 255.0);
    assert_eq!(average_frequency(&[1, 2]), 1.5);
}

#[test]
fn average_of_empty_spectrum_is_zero() {
    assert_eq!(average_frequency(&[]), 0.0);
}

#[test]
fn average_stays_within_byte_range() {
    let spectra: [&[u8]; 4] = [&[255, 0, 255, 0], &[7], &[200; 128], &[13, 250, 99]];
    for s in spectra {
        let avg = average_frequency(s);
        assert!((0.0..=255.0).contains(&avg), "{} out of range", avg);
    }
}

#[test]
fn average_does_not_overflow_on_large_spectra() {
    // 32768 fft -> 16384 bins at full scale
    let bins = vec![255u8; 16384];
    assert_eq!(average_frequency(&bins), 255.0);
}

#[test]
fn pending_source_reads_as_silence() {
    let (mut src, _, reads) = source_with(vec![200; 16], Acquisition::Pending);
    assert_eq!(src.average_frequency(), 0.0);
    assert_eq!(reads.get(), 0);
}

#[test]
fn live_source_reports_analyser_average() {
    let (mut src, shared, reads) = source_with(vec![100, 200, 0, 100], Acquisition::Pending);
    assert_eq!(src.average_frequency(), 0.0);
    *shared.borrow_mut() = Acquisition::Live;
    assert_eq!(src.average_frequency(), 100.0);
    assert_eq!(reads.get(), 1);
    assert_eq!(src.acquisition(), Acquisition::Live);
}

#[test]
fn denied_microphone_keeps_frames_running_at_zero_frequency() {
    let (mut src, shared, reads) = source_with(vec![180; 16], Acquisition::Pending);
    let mut s = session::Session::new(
        &config::VisualizerConfig::default(),
        session::Viewport::new(1000, 800),
    );

    // a few frames render before the permission prompt settles
    for i in 0..3 {
        s.advance(i as f32 / 60.0, src.average_frequency());
    }
    *shared.borrow_mut() = Acquisition::Failed(AudioError::from_dom_name(
        "NotAllowedError",
        "Permission denied",
    ));
    for i in 3..120 {
        s.advance(i as f32 / 60.0, src.average_frequency());
        assert_eq!(s.uniforms.frequency, 0.0);
    }

    assert_eq!(s.frames(), 120);
    assert!(s.uniforms.time > 1.9);
    assert_eq!(reads.get(), 0);
    assert_eq!(src.acquisition(), Acquisition::Failed(AudioError::PermissionDenied));
}

#[test]
fn silence_tap_reads_zero_even_when_live() {
    let mut src = AnalyserSource::new(Silence, Rc::new(RefCell::new(Acquisition::Live)));
    assert_eq!(src.average_frequency(), 0.0);
}

#[test]
fn dom_exception_names_map_to_error_kinds() {
    assert_eq!(
        AudioError::from_dom_name("NotAllowedError", "denied"),
        AudioError::PermissionDenied
    );
    assert_eq!(
        AudioError::from_dom_name("SecurityError", "insecure context"),
        AudioError::PermissionDenied
    );
    assert_eq!(
        AudioError::from_dom_name("NotFoundError", "no device"),
        AudioError::NoDevice
    );
    assert_eq!(
        AudioError::from_dom_name("NotSupportedError", "nope"),
        AudioError::Unsupported("nope".to_string())
    );
    assert_eq!(
        AudioError::from_dom_name("AbortError", "hardware busy"),
        AudioError::Other("AbortError: hardware busy".to_string())
    );
}

#[test]
fn audio_errors_display_for_console_logging() {
    assert_eq!(
        AudioError::PermissionDenied.to_string(),
        "microphone permission denied"
    );
    assert!(AudioError::Other("x".into()).to_string().contains("x"));
}
