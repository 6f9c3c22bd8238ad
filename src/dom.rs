use anyhow::anyhow;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::session::Viewport;

#[inline]
pub fn window_document() -> anyhow::Result<(web::Window, web::Document)> {
    let window = web::window().ok_or_else(|| anyhow!("no window"))?;
    let document = window.document().ok_or_else(|| anyhow!("no document"))?;
    Ok((window, document))
}

/// A registered DOM listener. Dropping it deregisters exactly that listener.
pub struct EventListener {
    target: web::EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(web::Event)>,
}

impl EventListener {
    pub fn new(
        target: &web::EventTarget,
        kind: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> anyhow::Result<Self> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        target
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .map_err(|e| anyhow!("add {kind} listener: {e:?}"))?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }

    /// Fires at most once; the browser unregisters it after the first event.
    pub fn once(
        target: &web::EventTarget,
        kind: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> anyhow::Result<Self> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        let opts = web::AddEventListenerOptions::new();
        opts.set_once(true);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                callback.as_ref().unchecked_ref(),
                &opts,
            )
            .map_err(|e| anyhow!("add one-shot {kind} listener: {e:?}"))?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        // removing an already-fired `once` listener is a no-op
        _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

pub fn viewport_size(window: &web::Window) -> Viewport {
    let dim = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(1.0).max(1.0) as u32
    };
    Viewport::new(dim(window.inner_width()), dim(window.inner_height()))
}

/// Size the canvas backing store to the viewport (one pixel per CSS pixel).
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, viewport: Viewport) {
    canvas.set_width(viewport.width);
    canvas.set_height(viewport.height);
}

/// A canvas appended to the page. It is removed again on drop unless `keep` was called.
pub struct AttachedCanvas {
    canvas: web::HtmlCanvasElement,
    keep: bool,
}

impl AttachedCanvas {
    pub fn canvas(&self) -> &web::HtmlCanvasElement {
        &self.canvas
    }

    pub fn keep(mut self) -> web::HtmlCanvasElement {
        self.keep = true;
        self.canvas.clone()
    }
}

impl Drop for AttachedCanvas {
    fn drop(&mut self) {
        if !self.keep {
            detach_canvas(&self.canvas);
        }
    }
}

/// Create the output canvas and append it to `document.body`.
pub fn attach_canvas(
    document: &web::Document,
    id: &str,
    viewport: Viewport,
) -> anyhow::Result<AttachedCanvas> {
    let body = document.body().ok_or_else(|| anyhow!("no document body"))?;
    let canvas: web::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| anyhow!("create canvas: {e:?}"))?
        .dyn_into()
        .map_err(|e| anyhow!("{:?}", e))?;
    canvas.set_id(id);
    let style = canvas.style();
    for (k, v) in [
        ("position", "fixed"),
        ("left", "0"),
        ("top", "0"),
        ("width", "100vw"),
        ("height", "100vh"),
        ("display", "block"),
    ] {
        _ = style.set_property(k, v);
    }
    sync_canvas_backing_size(&canvas, viewport);
    body.append_child(&canvas)
        .map_err(|e| anyhow!("append canvas: {e:?}"))?;
    Ok(AttachedCanvas {
        canvas,
        keep: false,
    })
}

pub fn detach_canvas(canvas: &web::HtmlCanvasElement) {
    canvas.remove();
}

/// Text content of an embedded shader element, or an empty string.
pub fn shader_source(document: &web::Document, id: &str) -> String {
    document
        .get_element_by_id(id)
        .and_then(|el| el.text_content())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use wasm_bindgen_test::*;

    fn detached_target() -> web::EventTarget {
        let (_, document) = window_document().expect("dom");
        document.create_element("div").expect("div").into()
    }

    fn fire(target: &web::EventTarget, kind: &str) {
        let ev = web::Event::new(kind).expect("event");
        target.dispatch_event(&ev).expect("dispatch");
    }

    fn counting() -> (Rc<Cell<u32>>, impl FnMut(web::Event) + 'static) {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        (hits, move |_ev| h.set(h.get() + 1))
    }

    #[wasm_bindgen_test]
    fn once_listener_fires_a_single_time() {
        let target = detached_target();
        let (hits, handler) = counting();
        let _listener = EventListener::once(&target, "click", handler).expect("listen");
        fire(&target, "click");
        fire(&target, "click");
        assert_eq!(hits.get(), 1);
    }

    #[wasm_bindgen_test]
    fn dropping_a_listener_deregisters_it() {
        let target = detached_target();
        let (hits, handler) = counting();
        let listener = EventListener::new(&target, "resize", handler).expect("listen");
        fire(&target, "resize");
        drop(listener);
        fire(&target, "resize");
        assert_eq!(hits.get(), 1);
    }

    #[wasm_bindgen_test]
    fn attached_canvas_is_removed_unless_kept() {
        let (_, document) = window_document().expect("dom");
        let present = |d: &web::Document| d.get_element_by_id("attach-guard").is_some();

        let attached =
            attach_canvas(&document, "attach-guard", Viewport::new(8, 8)).expect("attach");
        assert!(present(&document));
        drop(attached);
        assert!(!present(&document));

        let kept = attach_canvas(&document, "attach-guard", Viewport::new(8, 8))
            .expect("attach")
            .keep();
        assert!(present(&document));
        detach_canvas(&kept);
        assert!(!present(&document));
    }
}
