//! # Saorsa Display Core
//!
//! Platform-adaptive display control for an embedded interactive canvas.
//! Target independent: the browser adapter lives in `display-app`, this crate
//! only decides.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    display-core                      │
//! ├──────────────────────────────────────────────────────┤
//! │  Environment      │  Resize Policy                   │
//! │  - Agent family   │  - Aspect ceiling                │
//! │  - Feature probes │  - Burst coalescing              │
//! ├──────────────────────────────────────────────────────┤
//! │  Orchestrator     │  Session Driver                  │
//! │  - State machine  │  - DisplayHost seam              │
//! │  - Effects        │  - Exit handling                 │
//! └──────────────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod environment;
pub mod error;
pub mod notification;
pub mod orchestrator;
pub mod presentation;
pub mod resize;
pub mod session;

pub use config::{DisplayConfig, OrientationTarget};
pub use environment::{
    classify, EnvironmentClassification, EnvironmentSignals, FullscreenProbe, PlatformFamily,
};
pub use error::{Capability, DisplayError, DisplayResult};
pub use notification::Notification;
pub use orchestrator::{
    Effect, FullscreenSessionState, GestureDecision, GestureOrigin, IgnoreReason, Orchestrator,
    OrientationOutcome, SessionId, SessionOutcome,
};
pub use presentation::PresentationHooks;
pub use resize::{
    compute_canvas_size, CanvasTargetSize, MaxAspect, ResizeCoalescer, ResizeDecision,
    ResizePolicy, ViewportSize,
};
pub use session::{handle_fullscreen_exit, run_session, share, DisplayHost, SharedOrchestrator};

/// Display core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
