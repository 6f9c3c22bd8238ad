use crate::config::AudioConfig;
use crate::dom::EventListener;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

mod analysis;
pub use analysis::*;

impl SpectrumTap for web::AnalyserNode {
    fn bin_count(&self) -> usize {
        self.frequency_bin_count() as usize
    }

    fn fill(&self, bins: &mut [u8]) {
        self.get_byte_frequency_data(bins);
    }
}

fn create_gain(audio_ctx: &web::AudioContext, value: f32) -> anyhow::Result<web::GainNode> {
    let g = web::GainNode::new(audio_ctx).map_err(|e| anyhow::anyhow!("GainNode: {:?}", e))?;
    g.gain().set_value(value);
    Ok(g)
}

fn create_analyser(
    audio_ctx: &web::AudioContext,
    fft_size: u32,
) -> anyhow::Result<web::AnalyserNode> {
    let a = web::AnalyserNode::new(audio_ctx)
        .map_err(|e| anyhow::anyhow!("AnalyserNode: {:?}", e))?;
    a.set_fft_size(fft_size);
    Ok(a)
}

fn classify(err: &JsValue) -> AudioError {
    match err.dyn_ref::<web::DomException>() {
        Some(ex) => AudioError::from_dom_name(&ex.name(), &ex.message()),
        None => AudioError::Other(format!("{:?}", err)),
    }
}

fn capture_constraints(config: &AudioConfig) -> Result<web::MediaStreamConstraints, JsValue> {
    let audio = js_sys::Object::new();
    js_sys::Reflect::set(&audio, &"echoCancellation".into(), &config.echo_cancellation.into())?;
    js_sys::Reflect::set(&audio, &"noiseSuppression".into(), &config.noise_suppression.into())?;
    js_sys::Reflect::set(&audio, &"autoGainControl".into(), &config.auto_gain_control.into())?;
    let constraints = web::MediaStreamConstraints::new();
    constraints.set_audio(&audio.into());
    constraints.set_video(&JsValue::FALSE);
    Ok(constraints)
}

/// Microphone capture feeding a single analyser.
///
/// The graph is `stream source -> monitor gain -> analyser`. Until the
/// permission request resolves (or if it fails) the analyser reads as silence.
pub struct Microphone {
    audio_ctx: web::AudioContext,
    monitor: web::GainNode,
    analyser: web::AnalyserNode,
    acquisition: SharedAcquisition,
    stream: Rc<RefCell<Option<web::MediaStream>>>,
    closed: Rc<Cell<bool>>,
}

fn stop_tracks(stream: &web::MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<web::MediaStreamTrack>() {
            track.stop();
        }
    }
}

impl Microphone {
    pub fn new(config: &AudioConfig) -> anyhow::Result<Self> {
        let audio_ctx =
            web::AudioContext::new().map_err(|e| anyhow::anyhow!("AudioContext: {:?}", e))?;
        let monitor = create_gain(&audio_ctx, config.monitor_volume)?;
        let analyser = create_analyser(&audio_ctx, config.fft_size)?;
        monitor
            .connect_with_audio_node(&analyser)
            .map_err(|e| anyhow::anyhow!("connect monitor: {:?}", e))?;
        log::info!(
            "[audio] analyser fft={} bins={}",
            config.fft_size,
            analyser.frequency_bin_count()
        );
        Ok(Self {
            audio_ctx,
            monitor,
            analyser,
            acquisition: Rc::new(RefCell::new(Acquisition::Pending)),
            stream: Rc::new(RefCell::new(None)),
            closed: Rc::new(Cell::new(false)),
        })
    }

    /// Fire-and-forget `getUserMedia`. Failure is logged and never retried.
    pub fn request(&self, config: &AudioConfig) {
        let acquisition = self.acquisition.clone();
        let stream_slot = self.stream.clone();
        let audio_ctx = self.audio_ctx.clone();
        let monitor = self.monitor.clone();
        let closed = self.closed.clone();
        let config = *config;
        spawn_local(async move {
            let result = acquire_stream(&config).await.and_then(|stream| {
                let source = audio_ctx
                    .create_media_stream_source(&stream)
                    .map_err(|e| classify(&e))?;
                source
                    .connect_with_audio_node(&monitor)
                    .map_err(|e| classify(&e))?;
                Ok(stream)
            });
            match result {
                Ok(stream) if closed.get() => stop_tracks(&stream),
                Ok(stream) => {
                    log::info!("[audio] microphone live");
                    *stream_slot.borrow_mut() = Some(stream);
                    *acquisition.borrow_mut() = Acquisition::Live;
                }
                Err(e) => {
                    log::error!("Error accessing microphone: {}", e);
                    *acquisition.borrow_mut() = Acquisition::Failed(e);
                }
            }
        });
    }

    /// Browsers start contexts suspended; resume on the first click anywhere.
    pub fn resume_on_first_click(&self, window: &web::Window) -> anyhow::Result<EventListener> {
        let audio_ctx = self.audio_ctx.clone();
        EventListener::once(window, "click", move |_ev| {
            if audio_ctx.state() == web::AudioContextState::Suspended {
                _ = audio_ctx.resume();
                log::info!("[audio] context resumed");
            }
        })
    }

    pub fn frequency_source(&self) -> AnalyserSource<web::AnalyserNode> {
        AnalyserSource::new(self.analyser.clone(), self.acquisition.clone())
    }

    /// Stop the capture tracks and release the audio context.
    pub fn close(&self) {
        self.closed.set(true);
        if let Some(stream) = self.stream.borrow_mut().take() {
            stop_tracks(&stream);
        }
        _ = self.audio_ctx.close();
    }
}

async fn acquire_stream(config: &AudioConfig) -> Result<web::MediaStream, AudioError> {
    let window = web::window().ok_or_else(|| AudioError::Unsupported("no window".into()))?;
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|_| AudioError::Unsupported("navigator.mediaDevices missing".into()))?;
    let constraints = capture_constraints(config).map_err(|e| classify(&e))?;
    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|e| classify(&e))?;
    let stream = JsFuture::from(promise).await.map_err(|e| classify(&e))?;
    stream
        .dyn_into::<web::MediaStream>()
        .map_err(|e| AudioError::Other(format!("not a MediaStream: {:?}", e)))
}
