use crate::dom::EventListener;
use crate::session::Session;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Track the pointer relative to the viewport center. Smoothing happens in the
/// render step, not here.
pub fn wire_pointermove(
    document: &web::Document,
    session: Rc<RefCell<Session>>,
) -> anyhow::Result<EventListener> {
    EventListener::new(document, "pointermove", move |ev: web::Event| {
        if let Some(ev) = ev.dyn_ref::<web::MouseEvent>() {
            session
                .borrow_mut()
                .pointer_moved(ev.client_x() as f32, ev.client_y() as f32);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisualizerConfig;
    use crate::session::{MouseOffset, Viewport};
    use wasm_bindgen_test::*;

    fn pointer_at(x: i32, y: i32) -> web::Event {
        let init = web::MouseEventInit::new();
        init.set_client_x(x);
        init.set_client_y(y);
        web::MouseEvent::new_with_mouse_event_init_dict("pointermove", &init)
            .expect("pointer event")
            .into()
    }

    #[wasm_bindgen_test]
    fn pointer_updates_session_until_listener_is_dropped() {
        let (_, document) = crate::dom::window_document().expect("dom");
        let session = Rc::new(RefCell::new(Session::new(
            &VisualizerConfig::default(),
            Viewport::new(1000, 800),
        )));
        let listener = wire_pointermove(&document, session.clone()).expect("listen");

        document.dispatch_event(&pointer_at(700, 500)).expect("dispatch");
        assert_eq!(session.borrow().mouse, MouseOffset { x: 2.0, y: 1.0 });

        drop(listener);
        document.dispatch_event(&pointer_at(0, 0)).expect("dispatch");
        assert_eq!(session.borrow().mouse, MouseOffset { x: 2.0, y: 1.0 });
    }
}
