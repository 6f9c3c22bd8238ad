use crate::dom::{self, EventListener};
use crate::render::GpuState;
use crate::session::Session;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

/// Keep the canvas, camera aspect, swapchain and post buffers on the viewport size.
pub fn wire_resize(
    window: &web::Window,
    canvas: web::HtmlCanvasElement,
    session: Rc<RefCell<Session>>,
    gpu: Rc<RefCell<Option<GpuState>>>,
) -> anyhow::Result<EventListener> {
    let window_for_size = window.clone();
    EventListener::new(window, "resize", move |_ev| {
        let viewport = dom::viewport_size(&window_for_size);
        if !session.borrow_mut().resize(viewport.width, viewport.height) {
            return;
        }
        dom::sync_canvas_backing_size(&canvas, viewport);
        if let Some(g) = gpu.borrow_mut().as_mut() {
            g.resize_if_needed(viewport.width, viewport.height);
            let (surface, post) = g.sizes();
            log::debug!("[resize] surface={:?} post={:?}", surface, post);
        }
    })
}
