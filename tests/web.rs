#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn canvas_present() -> bool {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("pulse-sphere-canvas"))
        .is_some()
}

#[wasm_bindgen_test]
fn mount_attaches_canvas_and_unmount_detaches_it() {
    // the start hook may already have mounted
    pulse_sphere::unmount();
    assert!(!canvas_present());

    pulse_sphere::mount().expect("mount");
    assert!(pulse_sphere::is_mounted());
    assert!(canvas_present());

    pulse_sphere::unmount();
    assert!(!pulse_sphere::is_mounted());
    assert!(!canvas_present());
}

#[wasm_bindgen_test]
fn repeated_mount_cycles_leave_one_canvas() {
    pulse_sphere::unmount();
    for _ in 0..3 {
        pulse_sphere::mount().expect("mount");
        // mounting twice is a no-op
        pulse_sphere::mount().expect("second mount");
        let count = web_sys::window()
            .and_then(|w| w.document())
            .map(|d| d.query_selector_all("canvas").map(|l| l.length()).unwrap_or(0))
            .unwrap_or(0);
        assert_eq!(count, 1);
        pulse_sphere::unmount();
    }
    assert!(!canvas_present());
}

#[wasm_bindgen_test]
fn invalid_fft_size_is_rejected_without_attaching() {
    pulse_sphere::unmount();
    assert!(pulse_sphere::mount_with_fft_size(48).is_err());
    assert!(!pulse_sphere::is_mounted());
    assert!(!canvas_present());
}
