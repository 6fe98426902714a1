#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use display_app::DisplayController;
use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Document, Event, HtmlCanvasElement};

wasm_bindgen_test_configure!(run_in_browser);

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

fn document() -> Document {
    web_sys::window()
        .and_then(|w| w.document())
        .expect("document")
}

/// Mount `<div><canvas id=...></canvas></div>` and return the canvas ID.
fn mount_canvas() -> String {
    let id = format!("display-test-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed));
    let document = document();
    let wrapper = document.create_element("div").expect("div");
    let canvas = document.create_element("canvas").expect("canvas");
    canvas.set_id(&id);
    wrapper.append_child(&canvas).expect("append canvas");
    document
        .body()
        .expect("body")
        .append_child(&wrapper)
        .expect("append wrapper");
    id
}

fn canvas(id: &str) -> HtmlCanvasElement {
    document()
        .get_element_by_id(id)
        .expect("canvas present")
        .dyn_into()
        .expect("is a canvas")
}

fn viewport_is_empty() -> bool {
    let window = web_sys::window().expect("window");
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    width < 1.0 || height < 1.0
}

async fn next_microtask() {
    JsFuture::from(Promise::resolve(&JsValue::NULL))
        .await
        .expect("resolved promise");
}

async fn next_frame() {
    let frame = Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .expect("window")
            .request_animation_frame(&resolve)
            .expect("request frame");
    });
    JsFuture::from(frame).await.expect("frame fired");
}

#[wasm_bindgen_test]
fn controller_tags_document_root_with_platform_class() {
    let id = mount_canvas();
    let controller = DisplayController::new(&id, JsValue::NULL, None).expect("controller");

    let family = controller.platform_family();
    let root = document().document_element().expect("root");
    assert!(root.class_list().contains(&format!("platform-{family}")));
    assert_eq!(controller.session_state(), "idle");
}

#[wasm_bindgen_test]
fn resize_now_sizes_canvas_within_aspect_ceiling() {
    let id = mount_canvas();
    let controller = DisplayController::new(
        &id,
        JsValue::NULL,
        Some(r#"{"maxAspect": 2.0}"#.to_string()),
    )
    .expect("controller");
    assert!((controller.max_aspect() - 2.0).abs() < f64::EPSILON);

    controller.resize_now();
    if viewport_is_empty() {
        return;
    }

    let style = canvas(&id).style();
    let width = style.get_property_value("width").expect("width");
    let height = style.get_property_value("height").expect("height");
    let width: f64 = width.trim_end_matches("px").parse().expect("px width");
    let height: f64 = height.trim_end_matches("px").parse().expect("px height");
    assert!(width > 0.0);
    assert!(height <= (width / 2.0).floor());
}

#[wasm_bindgen_test]
fn initial_resize_reaches_runtime_callback() {
    let calls = Rc::new(Cell::new(0u32));
    let seen = Rc::clone(&calls);
    let on_resize = Closure::<dyn FnMut(u32, u32)>::new(move |_width: u32, _height: u32| {
        seen.set(seen.get() + 1);
    });
    let runtime = Object::new();
    Reflect::set(&runtime, &JsValue::from_str("onResize"), on_resize.as_ref())
        .expect("set onResize");

    let id = mount_canvas();
    let _controller = DisplayController::new(&id, runtime.into(), None).expect("controller");

    if !viewport_is_empty() {
        assert_eq!(calls.get(), 1);
    }
}

#[wasm_bindgen_test]
async fn untrusted_click_does_not_start_a_session() {
    let id = mount_canvas();
    let controller = DisplayController::new(&id, JsValue::NULL, None).expect("controller");

    let synthetic = Event::new("click").expect("event");
    controller.request_fullscreen(&synthetic);
    next_microtask().await;

    assert_eq!(controller.session_state(), "idle");
    assert!(controller.sessions_started() < 1.0);
    assert!(controller.last_outcome().is_none());
}

#[wasm_bindgen_test]
fn classification_json_carries_family_tag() {
    let id = mount_canvas();
    let controller = DisplayController::new(&id, JsValue::NULL, None).expect("controller");

    let json = controller.classification_json();
    assert!(json.contains(&controller.platform_family()));
}

#[wasm_bindgen_test]
fn missing_canvas_is_an_error() {
    assert!(DisplayController::new("no-such-canvas", JsValue::NULL, None).is_err());
}

#[wasm_bindgen_test]
fn invalid_config_is_an_error() {
    let id = mount_canvas();
    let result = DisplayController::new(&id, JsValue::NULL, Some(r#"{"maxAspect": -1}"#.into()));
    assert!(result.is_err());
}

#[wasm_bindgen_test]
fn bind_trigger_requires_existing_element() {
    let id = mount_canvas();
    let mut controller = DisplayController::new(&id, JsValue::NULL, None).expect("controller");

    assert!(controller.bind_trigger("no-such-button").is_err());
    assert!(controller.bind_trigger(&id).is_ok());
}

#[wasm_bindgen_test]
async fn dropping_controller_cancels_queued_resize_frame() {
    let window = web_sys::window().expect("window");
    let errors = Rc::new(Cell::new(0u32));
    let seen = Rc::clone(&errors);
    let on_error = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        seen.set(seen.get() + 1);
    });
    window
        .add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())
        .expect("listen for errors");

    let id = mount_canvas();
    let controller = DisplayController::new(&id, JsValue::NULL, None).expect("controller");
    controller.queue_resize();
    drop(controller);

    next_frame().await;
    next_frame().await;

    window
        .remove_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())
        .expect("stop listening");
    assert_eq!(errors.get(), 0);
}
