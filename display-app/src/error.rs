//! Adapter error types.

use display_core::DisplayError;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Result type for adapter operations.
pub type AppResult<T> = Result<T, AppError>;

/// Errors raised while wiring the controller into a page.
#[derive(Debug, Error)]
pub enum AppError {
    /// `window` is unavailable (e.g. running in a worker).
    #[error("No window object")]
    NoWindow,

    /// `window.document` is unavailable.
    #[error("No document object")]
    NoDocument,

    /// No element matched an ID or selector.
    #[error("Element '{0}' not found")]
    ElementNotFound(String),

    /// The element exists but is not a `<canvas>`.
    #[error("Element '{0}' is not a canvas")]
    NotACanvas(String),

    /// The canvas has no parent to use as fullscreen container.
    #[error("Canvas '{0}' has no parent element to use as fullscreen container")]
    NoContainer(String),

    /// A DOM call threw.
    #[error("JavaScript error: {0}")]
    Js(String),

    /// Controller logic rejected the input (usually configuration).
    #[error(transparent)]
    Display(#[from] DisplayError),
}

impl From<AppError> for JsValue {
    fn from(err: AppError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Best-effort human-readable text for a thrown JS value.
///
/// `DOMException`s and `Error`s render as `Name: message`.
pub(crate) fn js_error_text(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        let name = String::from(error.name());
        let message = String::from(error.message());
        return if message.is_empty() {
            name
        } else {
            format!("{name}: {message}")
        };
    }
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}
