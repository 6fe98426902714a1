//! Reads ambient browser state.
//!
//! Everything here is a read: agent string, display mode, feature presence,
//! viewport size. Capability probes look the API up with `Reflect` and only
//! count it if it is callable.

use display_core::{EnvironmentSignals, FullscreenProbe, ViewportSize};
use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Window};

/// Media query matched by home-screen launches.
pub const STANDALONE_QUERY: &str = "(display-mode: standalone)";

/// Fullscreen request methods, in the order they are tried.
pub const FULLSCREEN_REQUEST_METHODS: [&str; 5] = [
    "requestFullscreen",
    "webkitRequestFullscreen",
    "webkitRequestFullScreen",
    "mozRequestFullScreen",
    "msRequestFullscreen",
];

/// Document `(change, error)` event pairs for each fullscreen vendor.
pub(crate) const FULLSCREEN_EVENTS: [(&str, &str); 4] = [
    ("fullscreenchange", "fullscreenerror"),
    ("webkitfullscreenchange", "webkitfullscreenerror"),
    ("mozfullscreenchange", "mozfullscreenerror"),
    ("MSFullscreenChange", "MSFullscreenError"),
];

/// Document properties holding the current fullscreen element.
const FULLSCREEN_ELEMENT_PROPERTIES: [&str; 4] = [
    "fullscreenElement",
    "webkitFullscreenElement",
    "mozFullScreenElement",
    "msFullscreenElement",
];

/// Look up a method by name, if it exists and is callable.
pub(crate) fn method(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

fn has_method(target: &JsValue, name: &str) -> bool {
    method(target, name).is_some()
}

/// `screen.orientation`, when the object exists.
pub(crate) fn screen_orientation(window: &Window) -> Option<JsValue> {
    let screen = window.screen().ok()?;
    Reflect::get(&screen, &JsValue::from_str("orientation"))
        .ok()
        .filter(JsValue::is_object)
}

/// Probe which fullscreen variants `element` exposes.
pub fn fullscreen_probe(element: &Element) -> FullscreenProbe {
    FullscreenProbe {
        standard: has_method(element, "requestFullscreen"),
        webkit: has_method(element, "webkitRequestFullscreen")
            || has_method(element, "webkitRequestFullScreen"),
        moz: has_method(element, "mozRequestFullScreen"),
        ms: has_method(element, "msRequestFullscreen"),
    }
}

/// Gather classifier inputs, probing capabilities on `representative`.
pub fn read_signals(window: &Window, representative: &Element) -> EnvironmentSignals {
    let navigator = window.navigator();
    let user_agent = navigator.user_agent().unwrap_or_default();

    let standalone_media = window
        .match_media(STANDALONE_QUERY)
        .ok()
        .flatten()
        .is_some_and(|query| query.matches());

    let navigator_standalone = Reflect::get(&navigator, &JsValue::from_str("standalone"))
        .ok()
        .and_then(|value| value.as_bool());

    let orientation_lock =
        screen_orientation(window).is_some_and(|orientation| has_method(&orientation, "lock"));

    EnvironmentSignals {
        user_agent,
        standalone_media,
        navigator_standalone,
        fullscreen: fullscreen_probe(representative),
        orientation_lock,
    }
}

/// Current layout viewport in CSS pixels.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn viewport(window: &Window) -> ViewportSize {
    let dimension = |value: Result<JsValue, JsValue>| {
        value
            .ok()
            .and_then(|v| v.as_f64())
            .filter(|v| v.is_finite() && *v > 0.0)
            .map_or(0, |v| v.floor() as u32)
    };
    ViewportSize::new(
        dimension(window.inner_width()),
        dimension(window.inner_height()),
    )
}

/// Whether any element is currently fullscreen.
pub fn is_document_fullscreen(document: &Document) -> bool {
    FULLSCREEN_ELEMENT_PROPERTIES.iter().any(|name| {
        Reflect::get(document, &JsValue::from_str(name))
            .is_ok_and(|value| !value.is_null() && !value.is_undefined())
    })
}
