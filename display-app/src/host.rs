//! Browser implementation of [`DisplayHost`].

use std::{cell::RefCell, rc::Rc};

use async_trait::async_trait;
use display_core::{
    Capability, DisplayError, DisplayHost, DisplayResult, Notification, OrientationTarget,
};
use js_sys::{Function, Promise};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, Event, Window};

use crate::error::{js_error_text, AppError, AppResult};
use crate::listeners::EventListener;
use crate::presentation::Presentation;
use crate::probe::{self, FULLSCREEN_EVENTS, FULLSCREEN_REQUEST_METHODS};

/// How long a prefixed fullscreen request may stay silent before it counts
/// as denied.
const LEGACY_FULLSCREEN_TIMEOUT_MS: i32 = 3_000;

/// Calls optional notification callbacks on a page-supplied object.
///
/// Missing callbacks are skipped; thrown errors are logged and dropped.
pub(crate) struct RuntimeCallbacks {
    target: JsValue,
}

impl RuntimeCallbacks {
    pub(crate) fn new(target: JsValue) -> Self {
        Self { target }
    }

    pub(crate) fn deliver(&self, notification: Notification) {
        if !self.target.is_object() {
            return;
        }
        let name = notification.callback_name();
        let Some(callback) = probe::method(&self.target, name) else {
            tracing::trace!(callback = name, "No runtime callback registered");
            return;
        };

        let result = match notification {
            Notification::Resized(size) => callback.call2(
                &self.target,
                &JsValue::from(size.width),
                &JsValue::from(size.height),
            ),
            Notification::EnteredFullscreen
            | Notification::ExitedFullscreen
            | Notification::FullscreenFailed => callback.call0(&self.target),
        };

        if let Err(err) = result {
            tracing::warn!(callback = name, "Runtime callback threw: {}", js_error_text(&err));
        }
    }
}

/// Performs fullscreen and orientation requests for the orchestrator.
pub(crate) struct BrowserHost {
    window: Window,
    container: Element,
    runtime: RuntimeCallbacks,
    presentation: Rc<Presentation>,
}

impl BrowserHost {
    pub(crate) fn new(
        window: Window,
        container: Element,
        runtime: RuntimeCallbacks,
        presentation: Rc<Presentation>,
    ) -> Self {
        Self {
            window,
            container,
            runtime,
            presentation,
        }
    }

    pub(crate) fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    fn orientation(&self) -> DisplayResult<JsValue> {
        probe::screen_orientation(&self.window)
            .ok_or(DisplayError::CapabilityUnsupported(Capability::OrientationLock))
    }
}

/// Await a value that may or may not be a promise.
async fn settle(value: JsValue, capability: Capability) -> DisplayResult<()> {
    JsFuture::from(Promise::resolve(&value))
        .await
        .map(|_| ())
        .map_err(|err| DisplayError::denied(capability, js_error_text(&err)))
}

/// Listeners and timer kept alive while a prefixed request is unanswered.
#[derive(Default)]
struct PendingConfirmation {
    listeners: Vec<EventListener>,
    timer: Option<(i32, Closure<dyn FnMut()>)>,
}

type SharedConfirmation = Rc<RefCell<PendingConfirmation>>;

/// Detach everything and cancel the timer. Safe to call from one of the
/// callbacks being released.
fn release(window: &Window, pending: &SharedConfirmation) {
    let released = std::mem::take(&mut *pending.borrow_mut());
    if let Some((handle, _)) = &released.timer {
        window.clear_timeout_with_handle(*handle);
    }
}

fn reject_with(reject: &Function, message: &str) {
    if let Err(err) = reject.call1(&JsValue::UNDEFINED, &js_sys::Error::new(message)) {
        tracing::debug!("Rejecting fullscreen confirmation threw: {}", js_error_text(&err));
    }
}

/// Promise for a prefixed fullscreen request that reports back through
/// document events instead of a return value.
///
/// Resolves on the first change event after which the document is
/// fullscreen.
/// Rejects on any vendor error event, or when nothing arrives in time.
fn fullscreen_confirmation(window: &Window, document: &Document) -> AppResult<Promise> {
    let pending = SharedConfirmation::default();
    let mut failure = None;
    let promise = Promise::new(&mut |resolve, reject| {
        if let Err(err) = watch_fullscreen(window, document, &pending, &resolve, reject) {
            failure = Some(err);
        }
    });
    match failure {
        Some(err) => {
            release(window, &pending);
            Err(err)
        }
        None => Ok(promise),
    }
}

fn watch_fullscreen(
    window: &Window,
    document: &Document,
    pending: &SharedConfirmation,
    resolve: &Function,
    reject: Function,
) -> AppResult<()> {
    let mut listeners = Vec::with_capacity(FULLSCREEN_EVENTS.len() * 2);
    for (change, error) in FULLSCREEN_EVENTS {
        let (window_ref, document_ref) = (window.clone(), document.clone());
        let (pending_ref, resolve) = (Rc::clone(pending), resolve.clone());
        listeners.push(EventListener::attach(document, change, move |_| {
            if !probe::is_document_fullscreen(&document_ref) {
                return;
            }
            if let Err(err) = resolve.call0(&JsValue::UNDEFINED) {
                tracing::debug!(
                    "Resolving fullscreen confirmation threw: {}",
                    js_error_text(&err)
                );
            }
            release(&window_ref, &pending_ref);
        })?);

        let (window_ref, pending_ref) = (window.clone(), Rc::clone(pending));
        let reject = reject.clone();
        listeners.push(EventListener::attach(document, error, move |event: Event| {
            reject_with(&reject, &format!("{} fired", event.type_()));
            release(&window_ref, &pending_ref);
        })?);
    }

    let (window_ref, pending_ref) = (window.clone(), Rc::clone(pending));
    let timer = Closure::<dyn FnMut()>::new(move || {
        reject_with(&reject, "no fullscreen change reported");
        release(&window_ref, &pending_ref);
    });
    let handle = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            timer.as_ref().unchecked_ref(),
            LEGACY_FULLSCREEN_TIMEOUT_MS,
        )
        .map_err(|e| AppError::Js(js_error_text(&e)))?;

    let mut state = pending.borrow_mut();
    state.listeners = listeners;
    state.timer = Some((handle, timer));
    Ok(())
}

#[async_trait(?Send)]
impl DisplayHost for BrowserHost {
    async fn request_fullscreen(&self) -> DisplayResult<()> {
        let (name, request) = FULLSCREEN_REQUEST_METHODS
            .iter()
            .find_map(|name| probe::method(&self.container, name).map(|f| (*name, f)))
            .ok_or(DisplayError::CapabilityUnsupported(Capability::Fullscreen))?;

        tracing::debug!(method = name, "Requesting fullscreen");
        let returned = request
            .call0(&self.container)
            .map_err(|err| DisplayError::denied(Capability::Fullscreen, js_error_text(&err)))?;
        if returned.is_instance_of::<Promise>() {
            return settle(returned, Capability::Fullscreen).await;
        }

        // Prefixed variants return undefined and answer through events.
        let document = self.container.owner_document().ok_or_else(|| {
            DisplayError::denied(Capability::Fullscreen, "container has no owner document")
        })?;
        if probe::is_document_fullscreen(&document) {
            return Ok(());
        }
        tracing::debug!(method = name, "Waiting for fullscreen change event");
        let confirmation = fullscreen_confirmation(&self.window, &document)
            .map_err(|err| DisplayError::denied(Capability::Fullscreen, err.to_string()))?;
        settle(confirmation.into(), Capability::Fullscreen).await
    }

    async fn lock_orientation(&self, target: OrientationTarget) -> DisplayResult<()> {
        let orientation = self.orientation()?;
        let lock = probe::method(&orientation, "lock")
            .ok_or(DisplayError::CapabilityUnsupported(Capability::OrientationLock))?;

        tracing::debug!(orientation = target.as_str(), "Requesting orientation lock");
        let returned = lock
            .call1(&orientation, &JsValue::from_str(target.as_str()))
            .map_err(|err| {
                DisplayError::denied(Capability::OrientationLock, js_error_text(&err))
            })?;
        settle(returned, Capability::OrientationLock).await
    }

    fn unlock_orientation(&self) {
        let Ok(orientation) = self.orientation() else {
            return;
        };
        if let Some(unlock) = probe::method(&orientation, "unlock") {
            if let Err(err) = unlock.call0(&orientation) {
                tracing::debug!("Orientation unlock threw: {}", js_error_text(&err));
            }
        }
    }

    fn notify(&self, notification: Notification) {
        tracing::debug!(?notification, "Notifying hosted runtime");
        self.runtime.deliver(notification);
    }

    fn report_failure(&self, error: &DisplayError) {
        tracing::debug!(%error, "Surfacing display failure");
        if error.capability() == Some(Capability::Fullscreen) {
            self.presentation.mark_fullscreen_unavailable();
        }
    }
}

impl std::fmt::Debug for BrowserHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserHost")
            .field("container", &self.container.tag_name())
            .finish_non_exhaustive()
    }
}
