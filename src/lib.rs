#![cfg(target_arch = "wasm32")]
use crate::audio::Microphone;
use crate::config::VisualizerConfig;
use crate::constants::{CANVAS_ELEMENT_ID, SHADER_ELEMENT_ID};
use crate::dom::EventListener;
use crate::render::GpuState;
use crate::session::Session;
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod config;
mod constants;
mod dom;
mod events;
mod frame;
mod geometry;
mod render;
mod session;

/// One mounted visualization: the canvas, its listeners, and the shared state
/// the render loop reads.
struct Visualizer {
    canvas: web::HtmlCanvasElement,
    gpu: Rc<RefCell<Option<GpuState>>>,
    microphone: Option<Microphone>,
    running: Rc<Cell<bool>>,
    frame_loop: frame::FrameLoop,
    // dropping these deregisters them
    listeners: Vec<EventListener>,
}

#[cfg(test)]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

thread_local! {
    static MOUNTED: RefCell<Option<Visualizer>> = const { RefCell::new(None) };
}

impl Visualizer {
    fn mount(settings: VisualizerConfig) -> anyhow::Result<Self> {
        settings.validate()?;
        let (window, document) = dom::window_document()?;
        let viewport = dom::viewport_size(&window);

        // any early return below removes the canvas again
        let attached = dom::attach_canvas(&document, CANVAS_ELEMENT_ID, viewport)?;
        let canvas = attached.canvas().clone();
        let session = Rc::new(RefCell::new(Session::new(&settings, viewport)));
        let gpu: Rc<RefCell<Option<GpuState>>> = Rc::new(RefCell::new(None));
        let running = Rc::new(Cell::new(true));

        let mut listeners = vec![
            events::wire_pointermove(&document, session.clone())?,
            events::wire_resize(&window, canvas.clone(), session.clone(), gpu.clone())?,
        ];

        // Microphone problems never stop the visuals; frequency just stays at zero.
        let microphone = match Microphone::new(&settings.audio) {
            Ok(mic) => match mic.resume_on_first_click(&window) {
                Ok(resume) => {
                    listeners.push(resume);
                    mic.request(&settings.audio);
                    Some(mic)
                }
                Err(e) => {
                    mic.close();
                    return Err(e);
                }
            },
            Err(e) => {
                log::error!("audio setup failed: {:?}", e);
                None
            }
        };
        let frequency: Box<dyn audio::FrequencySource> = match &microphone {
            Some(mic) => Box::new(mic.frequency_source()),
            None => Box::new(audio::AnalyserSource::new(
                audio::Silence,
                Rc::new(RefCell::new(audio::Acquisition::Failed(
                    audio::AudioError::Unsupported("no audio context".into()),
                ))),
            )),
        };

        let mesh = geometry::icosahedron(settings.sphere.radius, settings.sphere.detail);
        log::info!(
            "[mesh] icosahedron detail={} vertices={} edges={}",
            settings.sphere.detail,
            mesh.vertices.len(),
            mesh.edge_count()
        );
        let embedded = dom::shader_source(&document, SHADER_ELEMENT_ID);
        if embedded.trim().is_empty() {
            log::info!("[gpu] no #{} element, using bundled sphere shader", SHADER_ELEMENT_ID);
        }

        let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
            session,
            gpu: gpu.clone(),
            frequency,
            clock: Instant::now(),
        }));

        let frame_loop = frame::FrameLoop::default();
        {
            let canvas = canvas.clone();
            let gpu = gpu.clone();
            let running = running.clone();
            let frame_loop = frame_loop.clone();
            spawn_local(async move {
                let shader = render::sphere_shader_or_default(&embedded);
                let state = match GpuState::new(&canvas, &settings, &mesh, shader).await {
                    Ok(g) => g,
                    Err(e) => {
                        log::error!("WebGPU init error: {:?}", e);
                        return;
                    }
                };
                if !running.get() {
                    // unmounted while the adapter request was in flight
                    return;
                }
                *gpu.borrow_mut() = Some(state);
                frame_loop.start(frame_ctx, running);
            });
        }

        log::info!("[mount] {}x{}", viewport.width, viewport.height);
        Ok(Self {
            canvas: attached.keep(),
            gpu,
            microphone,
            running,
            frame_loop,
            listeners,
        })
    }

    fn unmount(self) {
        let Self {
            canvas,
            gpu,
            microphone,
            running,
            frame_loop,
            listeners,
        } = self;
        running.set(false);
        // frees the frame context held by the loop closure
        frame_loop.stop();
        log::debug!("[unmount] removing {} listeners", listeners.len());
        drop(listeners);
        // releases surface, device and every offscreen target
        gpu.borrow_mut().take();
        if let Some(mic) = microphone {
            mic.close();
        }
        dom::detach_canvas(&canvas);
        log::info!("[unmount] done");
    }
}

fn to_js(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:?}", e))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("pulse-sphere starting");
    mount()
}

/// Attach the visualization to `document.body`. A second call while mounted is a no-op.
#[wasm_bindgen]
pub fn mount() -> Result<(), JsValue> {
    mount_with_fft_size(VisualizerConfig::default().audio.fft_size)
}

/// Mount with a specific analyser size (32 by default, 256 for a finer spectrum).
#[wasm_bindgen]
pub fn mount_with_fft_size(fft_size: u32) -> Result<(), JsValue> {
    MOUNTED.with(|slot| {
        if slot.borrow().is_some() {
            log::warn!("[mount] already mounted");
            return Ok(());
        }
        let settings = VisualizerConfig::default().with_fft_size(fft_size);
        let v = Visualizer::mount(settings).map_err(to_js)?;
        *slot.borrow_mut() = Some(v);
        Ok(())
    })
}

/// Detach the canvas, remove every listener and stop the render loop.
#[wasm_bindgen]
pub fn unmount() {
    MOUNTED.with(|slot| {
        if let Some(v) = slot.borrow_mut().take() {
            v.unmount();
        }
    });
}

#[wasm_bindgen]
pub fn is_mounted() -> bool {
    MOUNTED.with(|slot| slot.borrow().is_some())
}
