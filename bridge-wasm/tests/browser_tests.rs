//! Browser tests for the wasm bridges
//!
//! Run with `wasm-pack test --headless --chrome bridge-wasm`.

#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use bridge_traits::{
    error::BridgeError,
    playback::AudioTransport,
    script::{ScriptHost, ScriptOutcome},
};
use bridge_wasm::{DomScriptHost, HtmlAudioTransport};
use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn global_exists(name: &str) -> bool {
    let window = web_sys::window().unwrap();
    Reflect::has(&window, &JsValue::from_str(name)).unwrap()
}

// ============================================================================
// Script host
// ============================================================================

#[wasm_bindgen_test]
fn test_inject_binds_callback_and_remove_cleans_up() {
    let host = DomScriptHost::new().unwrap();
    let handle = host
        .inject(
            "data:text/javascript,",
            "bridge_test_cb_1",
            Arc::new(|_outcome: ScriptOutcome| {}),
        )
        .unwrap();

    assert!(global_exists("bridge_test_cb_1"));
    assert_eq!(host.active_scripts(), 1);

    host.remove(handle.clone());
    assert!(!global_exists("bridge_test_cb_1"));
    assert_eq!(host.active_scripts(), 0);

    // Second removal is a no-op
    host.remove(handle);
}

#[wasm_bindgen_test]
fn test_callback_delivers_payload_once() {
    let host = DomScriptHost::new().unwrap();
    let received: Rc<RefCell<Vec<ScriptOutcome>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);

    let handle = host
        .inject(
            "data:text/javascript,",
            "bridge_test_cb_2",
            Arc::new(move |outcome: ScriptOutcome| sink.borrow_mut().push(outcome)),
        )
        .unwrap();

    let window = web_sys::window().unwrap();
    let callback: js_sys::Function = Reflect::get(&window, &JsValue::from_str("bridge_test_cb_2"))
        .unwrap()
        .unchecked_into();
    let payload = js_sys::JSON::parse(r#"{"id": 3135556, "title": "Harder"}"#).unwrap();
    callback.call1(&JsValue::NULL, &payload).unwrap();
    callback.call1(&JsValue::NULL, &payload).unwrap();

    let received = received.borrow();
    assert_eq!(received.len(), 1);
    match &received[0] {
        ScriptOutcome::Payload(value) => assert_eq!(value["title"], "Harder"),
        other => panic!("unexpected outcome: {other:?}"),
    }

    host.remove(handle);
}

#[wasm_bindgen_test]
fn test_inject_without_body_leaves_no_callback() {
    let host = DomScriptHost::new().unwrap();
    let document = web_sys::window().unwrap().document().unwrap();
    let root = document.document_element().unwrap();
    let body = document.body().unwrap();
    root.remove_child(&body).unwrap();

    let result = host.inject(
        "data:text/javascript,",
        "bridge_test_cb_3",
        Arc::new(|_outcome: ScriptOutcome| {}),
    );

    root.append_child(&body).unwrap();

    assert!(matches!(result, Err(BridgeError::NotAvailable(_))));
    assert!(!global_exists("bridge_test_cb_3"));
    assert_eq!(host.active_scripts(), 0);
}

// ============================================================================
// Audio transport
// ============================================================================

#[wasm_bindgen_test]
fn test_audio_volume_is_clamped() {
    let (audio, _events) = HtmlAudioTransport::new().unwrap();

    audio.set_volume(1.5);
    assert_eq!(audio.volume(), 1.0);

    audio.set_volume(-0.2);
    assert_eq!(audio.volume(), 0.0);
}

#[wasm_bindgen_test]
fn test_audio_without_source_has_no_duration() {
    let (audio, _events) = HtmlAudioTransport::new().unwrap();
    audio.set_source(None).unwrap();

    assert_eq!(audio.duration(), None);
    assert_eq!(audio.position(), 0.0);
}
