//! DOM event listeners that detach themselves on drop.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget};

use crate::error::{js_error_text, AppError, AppResult};

/// An attached listener. The closure stays alive for as long as this value.
pub(crate) struct EventListener {
    target: EventTarget,
    event_type: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    /// Attach `handler` to `target` for `event_type`.
    pub(crate) fn attach<F>(target: &EventTarget, event_type: &'static str, handler: F) -> AppResult<Self>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())
            .map_err(|e| AppError::Js(js_error_text(&e)))?;
        Ok(Self {
            target: target.clone(),
            event_type,
            closure,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.event_type, self.closure.as_ref().unchecked_ref())
        {
            tracing::debug!(
                event = self.event_type,
                "Failed to detach listener: {}",
                js_error_text(&err)
            );
        }
    }
}
