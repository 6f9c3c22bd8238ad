use crate::audio::FrequencySource;
use crate::render::GpuState;
use crate::session::Session;
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub session: Rc<RefCell<Session>>,
    pub gpu: Rc<RefCell<Option<GpuState>>>,
    pub frequency: Box<dyn FrequencySource>,
    pub clock: Instant,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let elapsed = self.clock.elapsed().as_secs_f32();
        let frequency = self.frequency.average_frequency();

        let mut session = self.session.borrow_mut();
        session.advance(elapsed, frequency);

        let mut gpu = self.gpu.borrow_mut();
        let Some(g) = gpu.as_mut() else {
            return;
        };
        // catches a resize that landed while the GPU was still initializing
        g.resize_if_needed(session.viewport.width, session.viewport.height);
        match g.render(session.view_proj(), &session.uniforms) {
            Ok(()) if session.frames() == 1 => log::info!("[frame] first frame presented"),
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => g.reconfigure(),
            Err(e) => log::error!("render error: {:?}", e),
        }
    }
}

type TickSlot = RefCell<Option<Closure<dyn FnMut()>>>;

/// `requestAnimationFrame` driver. The scheduled closure only holds a weak
/// reference to itself, so `stop` frees it together with the frame context.
#[derive(Clone, Default)]
pub struct FrameLoop {
    tick: Rc<TickSlot>,
    pending: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
    /// Drive `frame` until `running` is cleared or `stop` is called.
    pub fn start(&self, frame_ctx: Rc<RefCell<FrameContext>>, running: Rc<Cell<bool>>) {
        let tick = Rc::downgrade(&self.tick);
        let pending = self.pending.clone();
        *self.tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            pending.set(None);
            if !running.get() {
                log::info!("[frame] loop stopped");
                return;
            }
            frame_ctx.borrow_mut().frame();
            if let Some(tick) = tick.upgrade() {
                schedule(&tick, &pending);
            }
        }) as Box<dyn FnMut()>));
        schedule(&self.tick, &self.pending);
    }

    /// Cancel the pending frame and drop the loop closure.
    pub fn stop(&self) {
        if let (Some(id), Some(w)) = (self.pending.take(), web::window()) {
            _ = w.cancel_animation_frame(id);
        }
        self.tick.borrow_mut().take();
    }

    #[cfg(test)]
    fn is_scheduled(&self) -> bool {
        self.pending.get().is_some()
    }
}

fn schedule(tick: &TickSlot, pending: &Cell<Option<i32>>) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        if let Ok(id) = w.request_animation_frame(cb.as_ref().unchecked_ref()) {
            pending.set(Some(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Acquisition, AnalyserSource, Silence};
    use crate::config::VisualizerConfig;
    use crate::session::Viewport;
    use wasm_bindgen_test::*;

    fn idle_context() -> Rc<RefCell<FrameContext>> {
        let session = Session::new(&VisualizerConfig::default(), Viewport::new(64, 64));
        let acquisition = Rc::new(RefCell::new(Acquisition::Pending));
        Rc::new(RefCell::new(FrameContext {
            session: Rc::new(RefCell::new(session)),
            gpu: Rc::new(RefCell::new(None)),
            frequency: Box::new(AnalyserSource::new(Silence, acquisition)),
            clock: Instant::now(),
        }))
    }

    #[wasm_bindgen_test]
    fn stopping_the_loop_frees_the_frame_context() {
        let ctx = idle_context();
        let weak = Rc::downgrade(&ctx);
        let frame_loop = FrameLoop::default();

        frame_loop.start(ctx, Rc::new(Cell::new(true)));
        assert!(frame_loop.is_scheduled());
        assert!(weak.upgrade().is_some());

        frame_loop.stop();
        assert!(!frame_loop.is_scheduled());
        assert!(weak.upgrade().is_none());
    }
}
