//! # Saorsa Display WASM Adapter
//!
//! Wires `display-core` into a web page: probes the browser, keeps the
//! canvas inside the aspect ceiling, runs fullscreen sessions from user
//! gestures and toggles the hint classes on `<html>`.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web display-app
//! ```
//!
//! Then in the page:
//! ```javascript
//! import init, { DisplayController } from './pkg/display_app.js';
//!
//! await init();
//! const display = new DisplayController('game-canvas', {
//!     onEnterFullscreen: () => runtime.send('Display', 'EnteredFullscreen'),
//!     onExitFullscreen: () => runtime.send('Display', 'ExitedFullscreen'),
//!     onResize: (w, h) => runtime.resize(w, h),
//! }, JSON.stringify({ maxAspect: 1.4 }));
//!
//! display.bindTrigger('fullscreen-button');
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod host;
mod listeners;
mod logging;
mod presentation;
mod probe;

pub use error::{AppError, AppResult};

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use display_core::{
    classify, handle_fullscreen_exit, run_session, share, CanvasTargetSize, DisplayConfig,
    DisplayHost, EnvironmentClassification, GestureOrigin, Notification, Orchestrator,
    PresentationHooks, ResizeCoalescer, ResizeDecision, ResizePolicy, SharedOrchestrator,
    ViewportSize,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlCanvasElement, Window};

use crate::error::js_error_text;
use crate::host::{BrowserHost, RuntimeCallbacks};
use crate::listeners::EventListener;
use crate::presentation::Presentation;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    logging::init_logging(logging::DEFAULT_DIRECTIVES);
    tracing::info!("Saorsa Display WASM initialized");
}

/// Everything the event handlers share.
struct Stage {
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    classification: EnvironmentClassification,
    orchestrator: SharedOrchestrator,
    host: Rc<BrowserHost>,
    resize: RefCell<ResizePolicy>,
    coalescer: RefCell<ResizeCoalescer>,
}

impl Stage {
    fn sample_viewport(&self) -> ViewportSize {
        probe::viewport(&self.window)
    }

    fn flush_resize(&self) {
        let pending = self.coalescer.borrow_mut().take();
        if let Some(viewport) = pending {
            self.apply_viewport(viewport);
        }
    }

    fn apply_viewport(&self, viewport: ViewportSize) {
        let decision = self
            .resize
            .borrow_mut()
            .evaluate(viewport, self.window.device_pixel_ratio());
        if let ResizeDecision::Apply { size, backing } = decision {
            if let Err(err) = self.apply_canvas_size(size, backing) {
                tracing::warn!("Failed to resize canvas: {err}");
                return;
            }
            self.host.notify(Notification::Resized(size));
        }
    }

    fn apply_canvas_size(
        &self,
        size: CanvasTargetSize,
        backing: CanvasTargetSize,
    ) -> AppResult<()> {
        let style = self.canvas.style();
        style
            .set_property("width", &format!("{}px", size.width))
            .map_err(|e| AppError::Js(js_error_text(&e)))?;
        style
            .set_property("height", &format!("{}px", size.height))
            .map_err(|e| AppError::Js(js_error_text(&e)))?;

        self.canvas.set_width(backing.width);
        self.canvas.set_height(backing.height);

        tracing::debug!(
            width = size.width,
            height = size.height,
            backing_width = backing.width,
            backing_height = backing.height,
            "Canvas resized"
        );
        Ok(())
    }

    fn on_fullscreen_change(&self) {
        self.resize.borrow_mut().invalidate();
        if !probe::is_document_fullscreen(&self.document) {
            handle_fullscreen_exit(&self.orchestrator, self.host.as_ref());
        }
        self.host.presentation().sync_with(&self.orchestrator.borrow());
    }
}

/// Flushes coalesced resize samples once per animation frame.
///
/// Dropping the scheduler cancels a frame that has not fired yet.
struct FrameScheduler {
    window: Window,
    pending: Rc<Cell<Option<i32>>>,
    closure: Closure<dyn FnMut(f64)>,
}

impl FrameScheduler {
    fn new(stage: &Rc<Stage>) -> Self {
        let pending = Rc::new(Cell::new(None));
        let fired = Rc::clone(&pending);
        let stage_ref = Rc::clone(stage);
        Self {
            window: stage.window.clone(),
            pending,
            closure: Closure::new(move |_timestamp: f64| {
                fired.set(None);
                stage_ref.flush_resize();
            }),
        }
    }

    fn request(&self) -> bool {
        match self
            .window
            .request_animation_frame(self.closure.as_ref().unchecked_ref())
        {
            Ok(handle) => {
                self.pending.set(Some(handle));
                true
            }
            Err(_) => false,
        }
    }
}

impl Drop for FrameScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            if self.window.cancel_animation_frame(handle).is_err() {
                tracing::warn!(handle, "Failed to cancel pending animation frame");
            }
        }
    }
}

fn queue_resize(stage: &Stage, frame: &FrameScheduler) {
    let starts_burst = stage
        .coalescer
        .borrow_mut()
        .push(stage.sample_viewport());
    if starts_burst && !frame.request() {
        stage.flush_resize();
    }
}

fn start_session(stage: &Rc<Stage>, origin: GestureOrigin) {
    let stage = Rc::clone(stage);
    wasm_bindgen_futures::spawn_local(async move {
        let outcome = run_session(&stage.orchestrator, stage.host.as_ref(), origin).await;
        stage
            .host
            .presentation()
            .sync_with(&stage.orchestrator.borrow());
        if let Some(outcome) = outcome {
            tracing::info!(?outcome, "Fullscreen session settled");
        }
    });
}

fn find_element(document: &Document, selector: &str) -> AppResult<Element> {
    document
        .query_selector(selector)
        .map_err(|e| AppError::Js(js_error_text(&e)))?
        .ok_or_else(|| AppError::ElementNotFound(selector.to_string()))
}

/// Platform-adaptive display controller for one canvas.
#[wasm_bindgen]
pub struct DisplayController {
    stage: Rc<Stage>,
    frame: Rc<FrameScheduler>,
    listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl DisplayController {
    /// Create a controller for the canvas with the given element ID.
    ///
    /// `runtime` is an object with optional `onEnterFullscreen`,
    /// `onExitFullscreen`, `onFullscreenFailed` and `onResize(width, height)`
    /// callbacks. `config_json` is an optional JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas or container is not found or the
    /// configuration is invalid.
    #[wasm_bindgen(constructor)]
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(
        canvas_id: &str,
        runtime: JsValue,
        config_json: Option<String>,
    ) -> Result<DisplayController, JsValue> {
        let config = match config_json.as_deref() {
            Some(json) => DisplayConfig::from_json(json).map_err(AppError::from)?,
            None => DisplayConfig::default(),
        };
        Ok(Self::build(canvas_id, runtime, &config)?)
    }

    /// Start a fullscreen session from a DOM event.
    ///
    /// Must be called from inside a trusted click, touch or key handler;
    /// anything else is ignored.
    #[wasm_bindgen(js_name = requestFullscreen)]
    pub fn request_fullscreen(&self, event: &Event) {
        let origin = GestureOrigin::from_dom_event(&event.type_(), event.is_trusted());
        start_session(&self.stage, origin);
    }

    /// Start fullscreen sessions from clicks on the element with this ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    #[wasm_bindgen(js_name = bindTrigger)]
    pub fn bind_trigger(&mut self, element_id: &str) -> Result<(), JsValue> {
        let trigger = self
            .stage
            .document
            .get_element_by_id(element_id)
            .ok_or_else(|| AppError::ElementNotFound(element_id.to_string()))?;
        let stage = Rc::clone(&self.stage);
        let listener = EventListener::attach(&trigger, "click", move |event: Event| {
            let origin = GestureOrigin::from_dom_event(&event.type_(), event.is_trusted());
            start_session(&stage, origin);
        })?;
        self.listeners.push(listener);
        Ok(())
    }

    /// Recompute and apply the canvas size immediately.
    #[wasm_bindgen(js_name = resizeNow)]
    pub fn resize_now(&self) {
        self.stage.coalescer.borrow_mut().take();
        self.stage.resize.borrow_mut().invalidate();
        self.stage.apply_viewport(self.stage.sample_viewport());
    }

    /// Queue a resize as if the window had fired `resize`.
    #[wasm_bindgen(js_name = queueResize)]
    pub fn queue_resize(&self) {
        queue_resize(&self.stage, &self.frame);
    }

    /// Platform family tag (`desktop`, `android`, `ios-browser`, `ios-standalone`).
    #[wasm_bindgen(js_name = platformFamily)]
    #[must_use]
    pub fn platform_family(&self) -> String {
        self.stage.classification.family_tag().to_string()
    }

    /// Whether to show the "Add to Home Screen" banner.
    #[wasm_bindgen(js_name = showAddToHomeScreenHint)]
    #[must_use]
    pub fn show_add_to_home_screen_hint(&self) -> bool {
        self.stage.classification.show_add_to_home_screen_hint()
    }

    /// Whether to show the standalone-mode banner.
    #[wasm_bindgen(js_name = showStandaloneHint)]
    #[must_use]
    pub fn show_standalone_hint(&self) -> bool {
        self.stage.classification.show_standalone_hint()
    }

    /// Whether the host exposes a fullscreen API.
    #[wasm_bindgen(js_name = supportsFullscreen)]
    #[must_use]
    pub fn supports_fullscreen(&self) -> bool {
        self.stage.classification.supports_fullscreen_api()
    }

    /// Whether the host exposes an orientation lock API.
    #[wasm_bindgen(js_name = supportsOrientationLock)]
    #[must_use]
    pub fn supports_orientation_lock(&self) -> bool {
        self.stage.classification.supports_orientation_lock()
    }

    /// The classification as JSON.
    #[wasm_bindgen(js_name = classificationJson)]
    #[must_use]
    pub fn classification_json(&self) -> String {
        serde_json::to_string(&self.stage.classification).unwrap_or_default()
    }

    /// Current orchestrator state (`idle`, `requesting fullscreen`, ...).
    #[wasm_bindgen(js_name = sessionState)]
    #[must_use]
    pub fn session_state(&self) -> String {
        self.stage.orchestrator.borrow().state().to_string()
    }

    /// Number of fullscreen sessions started on this page.
    #[wasm_bindgen(js_name = sessionsStarted)]
    #[must_use]
    pub fn sessions_started(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let count = self.stage.orchestrator.borrow().sessions_started() as f64;
        count
    }

    /// Diagnostic description of the last session outcome.
    #[wasm_bindgen(js_name = lastOutcome)]
    #[must_use]
    pub fn last_outcome(&self) -> Option<String> {
        self.stage
            .orchestrator
            .borrow()
            .last_outcome()
            .map(|outcome| format!("{outcome:?}"))
    }

    /// The configured aspect ceiling.
    #[wasm_bindgen(js_name = maxAspect)]
    #[must_use]
    pub fn max_aspect(&self) -> f64 {
        self.stage.resize.borrow().max_aspect().get()
    }
}

impl DisplayController {
    fn build(canvas_id: &str, runtime: JsValue, config: &DisplayConfig) -> AppResult<Self> {
        let window = web_sys::window().ok_or(AppError::NoWindow)?;
        let document = window.document().ok_or(AppError::NoDocument)?;

        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| AppError::ElementNotFound(canvas_id.to_string()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| AppError::NotACanvas(canvas_id.to_string()))?;

        let container = match config.container_selector.as_deref() {
            Some(selector) => find_element(&document, selector)?,
            None => canvas
                .parent_element()
                .ok_or_else(|| AppError::NoContainer(canvas_id.to_string()))?,
        };

        let classification = classify(&probe::read_signals(&window, &container));
        tracing::info!(
            family = %classification.platform_family(),
            fullscreen = classification.supports_fullscreen_api(),
            orientation_lock = classification.supports_orientation_lock(),
            max_aspect = %config.max_aspect,
            "Display controller attached"
        );

        let root = document.document_element().ok_or(AppError::NoDocument)?;
        let presentation = Rc::new(Presentation::new(
            root,
            PresentationHooks::from_classification(&classification),
        )?);
        let host = Rc::new(BrowserHost::new(
            window.clone(),
            container,
            RuntimeCallbacks::new(runtime),
            presentation,
        ));

        let stage = Rc::new(Stage {
            window: window.clone(),
            document: document.clone(),
            canvas,
            classification,
            orchestrator: share(Orchestrator::new(classification, config.orientation)),
            host,
            resize: RefCell::new(ResizePolicy::new(config.max_aspect)),
            coalescer: RefCell::new(ResizeCoalescer::new()),
        });
        let frame = Rc::new(FrameScheduler::new(&stage));

        let mut listeners = Vec::new();
        for event_type in ["resize", "orientationchange"] {
            let stage = Rc::clone(&stage);
            let frame = Rc::clone(&frame);
            listeners.push(EventListener::attach(&window, event_type, move |_| {
                queue_resize(&stage, &frame);
            })?);
        }
        for (event_type, _) in probe::FULLSCREEN_EVENTS {
            let stage = Rc::clone(&stage);
            listeners.push(EventListener::attach(&document, event_type, move |_| {
                stage.on_fullscreen_change();
            })?);
        }
        if let Ok(Some(query)) = window.match_media(probe::STANDALONE_QUERY) {
            listeners.push(EventListener::attach(&query, "change", |_| {
                tracing::info!("Display mode changed; classification refreshes on next load");
            })?);
        }

        stage.apply_viewport(stage.sample_viewport());

        Ok(Self {
            stage,
            frame,
            listeners,
        })
    }
}
