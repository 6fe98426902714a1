//! # Fullscreen / Orientation Orchestrator
//!
//! A sans-IO state machine. Every input returns the [`Effect`]s the host must
//! perform; the host feeds request results back in. [`crate::session`] drives
//! it asynchronously against a [`crate::DisplayHost`].
//!
//! ```text
//!                 gesture                grant                 lock ok / rejected / unsupported
//!   Idle ───────────────► RequestingFullscreen ─────► RequestingOrientationLock ─────────────────► Active
//!    ▲                         │ denied / absent             │                                   │
//!    └─────────────────────────┴──── native exit ────────────┴───────────── native exit ─────────┘
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::OrientationTarget;
use crate::environment::EnvironmentClassification;
use crate::error::{Capability, DisplayError, DisplayResult};
use crate::notification::Notification;

/// Unique identifier for a fullscreen session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new unique session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FullscreenSessionState {
    /// No session.
    #[default]
    Idle,
    /// Waiting for the fullscreen request to resolve.
    RequestingFullscreen,
    /// Fullscreen granted; waiting for the orientation lock to resolve.
    RequestingOrientationLock,
    /// Fullscreen session running.
    Active,
}

impl FullscreenSessionState {
    /// Whether a session exists.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for FullscreenSessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::RequestingFullscreen => write!(f, "requesting fullscreen"),
            Self::RequestingOrientationLock => write!(f, "requesting orientation lock"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// Where a session-starting trigger came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureOrigin {
    /// Trusted click / pointer event.
    Pointer,
    /// Trusted touch event.
    Touch,
    /// Trusted key press.
    Keyboard,
    /// Timer callback.
    Timer,
    /// Page load or similar lifecycle event.
    Load,
    /// Script-dispatched or replayed event.
    Programmatic,
}

impl GestureOrigin {
    /// Whether browsers accept this origin as a user gesture.
    #[must_use]
    pub const fn is_user_initiated(self) -> bool {
        matches!(self, Self::Pointer | Self::Touch | Self::Keyboard)
    }

    /// Map a DOM event type and its `isTrusted` flag to an origin.
    #[must_use]
    pub fn from_dom_event(event_type: &str, is_trusted: bool) -> Self {
        if !is_trusted {
            return Self::Programmatic;
        }
        match event_type {
            "click" | "pointerup" | "pointerdown" | "mouseup" | "mousedown" | "dblclick" => {
                Self::Pointer
            }
            "touchend" | "touchstart" => Self::Touch,
            "keydown" | "keyup" | "keypress" => Self::Keyboard,
            "load" | "DOMContentLoaded" | "pageshow" => Self::Load,
            _ => Self::Programmatic,
        }
    }
}

/// Why a trigger did not start a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The trigger did not come from a user interaction.
    NotUserInitiated(GestureOrigin),
    /// A session is already in progress.
    SessionInProgress(FullscreenSessionState),
}

/// Result of the orientation step of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum OrientationOutcome {
    /// Orientation lock granted.
    Locked,
    /// Host has no orientation lock API; not attempted.
    Skipped,
    /// Lock requested and rejected. Non-fatal.
    Rejected {
        /// Rejection kept for diagnostics.
        error: DisplayError,
    },
}

/// How a session ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Fullscreen granted; the session is (or was) active.
    Active {
        /// What happened to the orientation lock.
        orientation: OrientationOutcome,
    },
    /// Fullscreen unavailable or denied. Nothing was entered.
    Denied {
        /// Why.
        error: DisplayError,
    },
    /// Native exit arrived before the session reached `Active`.
    Interrupted {
        /// Always [`DisplayError::NativeInterruption`].
        error: DisplayError,
    },
}

impl SessionOutcome {
    /// Whether fullscreen was reached.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// The error attached to this outcome, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&DisplayError> {
        match self {
            Self::Active {
                orientation: OrientationOutcome::Rejected { error },
            }
            | Self::Denied { error }
            | Self::Interrupted { error } => Some(error),
            Self::Active { .. } => None,
        }
    }
}

/// Work the host must perform after feeding an input.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Issue one fullscreen request on the container, then report back with
    /// [`Orchestrator::on_fullscreen_result`].
    RequestFullscreen {
        /// Session the result belongs to.
        session: SessionId,
    },
    /// Request an orientation lock, then report back with
    /// [`Orchestrator::on_orientation_result`].
    LockOrientation {
        /// Session the result belongs to.
        session: SessionId,
        /// Orientation to lock.
        target: OrientationTarget,
    },
    /// Release the orientation lock, best effort.
    UnlockOrientation,
    /// Deliver a notification to the hosted runtime.
    Notify(Notification),
    /// Record a non-fatal failure for diagnostics.
    ReportFailure(DisplayError),
}

/// Outcome of feeding a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureDecision {
    /// A session started; perform the effects in order.
    Started {
        /// The new session.
        session: SessionId,
        /// Effects to perform.
        effects: Vec<Effect>,
    },
    /// Nothing happened.
    Ignored(IgnoreReason),
}

/// The fullscreen/orientation state machine.
///
/// Owns [`FullscreenSessionState`] exclusively. At most one session exists
/// at a time.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    classification: EnvironmentClassification,
    orientation_target: OrientationTarget,
    state: FullscreenSessionState,
    session: Option<SessionId>,
    orientation: Option<OrientationOutcome>,
    sessions_started: u64,
    last_outcome: Option<(SessionId, SessionOutcome)>,
}

impl Orchestrator {
    /// Create an idle orchestrator for a classified environment.
    #[must_use]
    pub const fn new(
        classification: EnvironmentClassification,
        orientation_target: OrientationTarget,
    ) -> Self {
        Self {
            classification,
            orientation_target,
            state: FullscreenSessionState::Idle,
            session: None,
            orientation: None,
            sessions_started: 0,
            last_outcome: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> FullscreenSessionState {
        self.state
    }

    /// The session in progress, if any.
    #[must_use]
    pub const fn current_session(&self) -> Option<SessionId> {
        self.session
    }

    /// The classification this orchestrator decides with.
    #[must_use]
    pub const fn classification(&self) -> &EnvironmentClassification {
        &self.classification
    }

    /// Number of sessions started since creation.
    #[must_use]
    pub const fn sessions_started(&self) -> u64 {
        self.sessions_started
    }

    /// The most recently recorded session outcome.
    #[must_use]
    pub fn last_outcome(&self) -> Option<&SessionOutcome> {
        self.last_outcome.as_ref().map(|(_, outcome)| outcome)
    }

    /// Outcome recorded for a specific session.
    #[must_use]
    pub fn outcome_of(&self, session: SessionId) -> Option<&SessionOutcome> {
        self.last_outcome
            .as_ref()
            .filter(|(id, _)| *id == session)
            .map(|(_, outcome)| outcome)
    }

    /// Feed a session-starting trigger.
    pub fn on_gesture(&mut self, origin: GestureOrigin) -> GestureDecision {
        if !origin.is_user_initiated() {
            tracing::debug!(?origin, "Ignoring fullscreen trigger without user gesture");
            return GestureDecision::Ignored(IgnoreReason::NotUserInitiated(origin));
        }
        if self.state.is_busy() {
            tracing::debug!(state = %self.state, "Ignoring gesture while session in progress");
            return GestureDecision::Ignored(IgnoreReason::SessionInProgress(self.state));
        }

        let session = SessionId::new();
        self.sessions_started += 1;
        self.session = Some(session);
        self.orientation = None;
        tracing::info!(%session, ?origin, "Fullscreen session started");

        let effects = if self.classification.supports_fullscreen_api() {
            self.state = FullscreenSessionState::RequestingFullscreen;
            vec![Effect::RequestFullscreen { session }]
        } else {
            self.deny(
                session,
                DisplayError::CapabilityUnsupported(Capability::Fullscreen),
            )
        };

        GestureDecision::Started { session, effects }
    }

    /// Feed the result of a fullscreen request.
    ///
    /// Results for any session other than the one currently requesting
    /// fullscreen are discarded.
    pub fn on_fullscreen_result(
        &mut self,
        session: SessionId,
        result: DisplayResult<()>,
    ) -> Vec<Effect> {
        if !self.is_pending(session, FullscreenSessionState::RequestingFullscreen) {
            tracing::debug!(%session, "Discarding stale fullscreen result");
            return Vec::new();
        }

        match result {
            Ok(()) if self.classification.supports_orientation_lock() => {
                self.state = FullscreenSessionState::RequestingOrientationLock;
                vec![Effect::LockOrientation {
                    session,
                    target: self.orientation_target,
                }]
            }
            Ok(()) => {
                tracing::debug!(%session, "No orientation lock API; skipping lock");
                self.activate(session, OrientationOutcome::Skipped)
            }
            Err(error) => self.deny(session, error),
        }
    }

    /// Feed the result of an orientation-lock request.
    ///
    /// Rejection is non-fatal: the session still becomes `Active`.
    pub fn on_orientation_result(
        &mut self,
        session: SessionId,
        result: DisplayResult<()>,
    ) -> Vec<Effect> {
        if !self.is_pending(session, FullscreenSessionState::RequestingOrientationLock) {
            tracing::debug!(%session, "Discarding stale orientation result");
            return Vec::new();
        }

        match result {
            Ok(()) => self.activate(session, OrientationOutcome::Locked),
            Err(error) => {
                tracing::warn!(%session, %error, "Orientation lock rejected; continuing in fullscreen");
                let mut effects = vec![Effect::ReportFailure(error.clone())];
                effects.extend(self.activate(session, OrientationOutcome::Rejected { error }));
                effects
            }
        }
    }

    /// Feed the platform's native exit-fullscreen event.
    ///
    /// Returns to `Idle` from any state. Only an `Active` session produces
    /// an exit notification.
    pub fn on_fullscreen_exit(&mut self) -> Vec<Effect> {
        let state = self.state;
        let session = self.session.take();
        let orientation = self.orientation.take();
        self.state = FullscreenSessionState::Idle;

        match (state, session) {
            (FullscreenSessionState::Active, Some(session)) => {
                tracing::info!(%session, "Fullscreen exited");
                let mut effects = Vec::new();
                if orientation == Some(OrientationOutcome::Locked) {
                    effects.push(Effect::UnlockOrientation);
                }
                effects.push(Effect::Notify(Notification::ExitedFullscreen));
                effects
            }
            (
                FullscreenSessionState::RequestingFullscreen
                | FullscreenSessionState::RequestingOrientationLock,
                Some(session),
            ) => {
                let error = DisplayError::NativeInterruption { during: state };
                tracing::warn!(%session, %error, "Fullscreen session interrupted");
                self.last_outcome = Some((
                    session,
                    SessionOutcome::Interrupted {
                        error: error.clone(),
                    },
                ));
                let mut effects = Vec::new();
                if state == FullscreenSessionState::RequestingOrientationLock {
                    effects.push(Effect::UnlockOrientation);
                }
                effects.push(Effect::ReportFailure(error));
                effects
            }
            _ => {
                tracing::debug!("Fullscreen exit with no session");
                Vec::new()
            }
        }
    }

    fn is_pending(&self, session: SessionId, expected: FullscreenSessionState) -> bool {
        self.state == expected && self.session == Some(session)
    }

    fn activate(&mut self, session: SessionId, orientation: OrientationOutcome) -> Vec<Effect> {
        self.state = FullscreenSessionState::Active;
        self.orientation = Some(orientation.clone());
        self.last_outcome = Some((session, SessionOutcome::Active { orientation }));
        tracing::info!(%session, "Fullscreen session active");
        vec![Effect::Notify(Notification::EnteredFullscreen)]
    }

    fn deny(&mut self, session: SessionId, error: DisplayError) -> Vec<Effect> {
        tracing::warn!(%session, %error, "Fullscreen unavailable");
        self.state = FullscreenSessionState::Idle;
        self.session = None;
        self.orientation = None;
        self.last_outcome = Some((
            session,
            SessionOutcome::Denied {
                error: error.clone(),
            },
        ));
        vec![
            Effect::ReportFailure(error),
            Effect::Notify(Notification::FullscreenFailed),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::PlatformFamily;

    fn orchestrator(fullscreen: bool, orientation_lock: bool) -> Orchestrator {
        Orchestrator::new(
            EnvironmentClassification::new(PlatformFamily::Android, fullscreen, orientation_lock),
            OrientationTarget::Landscape,
        )
    }

    fn start(orch: &mut Orchestrator) -> (SessionId, Vec<Effect>) {
        match orch.on_gesture(GestureOrigin::Pointer) {
            GestureDecision::Started { session, effects } => (session, effects),
            GestureDecision::Ignored(reason) => panic!("gesture ignored: {reason:?}"),
        }
    }

    fn notifications(effects: &[Effect]) -> Vec<Notification> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Notify(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_full_happy_path() {
        let mut orch = orchestrator(true, true);
        let (session, effects) = start(&mut orch);
        assert_eq!(effects, vec![Effect::RequestFullscreen { session }]);
        assert_eq!(orch.state(), FullscreenSessionState::RequestingFullscreen);

        let effects = orch.on_fullscreen_result(session, Ok(()));
        assert_eq!(
            effects,
            vec![Effect::LockOrientation {
                session,
                target: OrientationTarget::Landscape
            }]
        );
        assert_eq!(
            orch.state(),
            FullscreenSessionState::RequestingOrientationLock
        );

        let effects = orch.on_orientation_result(session, Ok(()));
        assert_eq!(
            notifications(&effects),
            vec![Notification::EnteredFullscreen]
        );
        assert_eq!(orch.state(), FullscreenSessionState::Active);
        assert_eq!(
            orch.last_outcome(),
            Some(&SessionOutcome::Active {
                orientation: OrientationOutcome::Locked
            })
        );
    }

    #[test]
    fn test_no_fullscreen_api_denies_immediately() {
        let mut orch = orchestrator(false, true);
        let (session, effects) = start(&mut orch);
        assert_eq!(
            effects,
            vec![
                Effect::ReportFailure(DisplayError::CapabilityUnsupported(Capability::Fullscreen)),
                Effect::Notify(Notification::FullscreenFailed),
            ]
        );
        assert_eq!(orch.state(), FullscreenSessionState::Idle);
        assert!(matches!(
            orch.outcome_of(session),
            Some(SessionOutcome::Denied { .. })
        ));
    }

    #[test]
    fn test_denied_fullscreen_returns_to_idle() {
        let mut orch = orchestrator(true, true);
        let (session, _) = start(&mut orch);
        let effects = orch.on_fullscreen_result(
            session,
            Err(DisplayError::denied(Capability::Fullscreen, "NotAllowedError")),
        );
        assert_eq!(
            notifications(&effects),
            vec![Notification::FullscreenFailed]
        );
        assert!(!effects
            .iter()
            .any(|e| matches!(e, Effect::LockOrientation { .. })));
        assert_eq!(orch.state(), FullscreenSessionState::Idle);
        assert_eq!(orch.current_session(), None);
    }

    #[test]
    fn test_orientation_unsupported_skips_lock() {
        let mut orch = orchestrator(true, false);
        let (session, _) = start(&mut orch);
        let effects = orch.on_fullscreen_result(session, Ok(()));
        assert_eq!(effects, vec![Effect::Notify(Notification::EnteredFullscreen)]);
        assert_eq!(orch.state(), FullscreenSessionState::Active);
        assert_eq!(
            orch.last_outcome(),
            Some(&SessionOutcome::Active {
                orientation: OrientationOutcome::Skipped
            })
        );
    }

    #[test]
    fn test_orientation_rejected_still_active() {
        let mut orch = orchestrator(true, true);
        let (session, _) = start(&mut orch);
        orch.on_fullscreen_result(session, Ok(()));
        let error = DisplayError::denied(Capability::OrientationLock, "NotSupportedError");
        let effects = orch.on_orientation_result(session, Err(error.clone()));

        assert_eq!(
            effects,
            vec![
                Effect::ReportFailure(error.clone()),
                Effect::Notify(Notification::EnteredFullscreen),
            ]
        );
        assert_eq!(orch.state(), FullscreenSessionState::Active);
        assert_eq!(orch.last_outcome().and_then(SessionOutcome::error), Some(&error));
    }

    #[test]
    fn test_untrusted_origins_ignored() {
        let mut orch = orchestrator(true, true);
        for origin in [
            GestureOrigin::Timer,
            GestureOrigin::Load,
            GestureOrigin::Programmatic,
        ] {
            assert_eq!(
                orch.on_gesture(origin),
                GestureDecision::Ignored(IgnoreReason::NotUserInitiated(origin))
            );
        }
        assert_eq!(orch.state(), FullscreenSessionState::Idle);
        assert_eq!(orch.sessions_started(), 0);
    }

    #[test]
    fn test_reentrant_gesture_ignored() {
        let mut orch = orchestrator(true, true);
        let (session, _) = start(&mut orch);

        let decision = orch.on_gesture(GestureOrigin::Touch);
        assert_eq!(
            decision,
            GestureDecision::Ignored(IgnoreReason::SessionInProgress(
                FullscreenSessionState::RequestingFullscreen
            ))
        );
        assert_eq!(orch.sessions_started(), 1);
        assert_eq!(orch.current_session(), Some(session));
    }

    #[test]
    fn test_exit_from_active_notifies_once() {
        let mut orch = orchestrator(true, true);
        let (session, _) = start(&mut orch);
        orch.on_fullscreen_result(session, Ok(()));
        orch.on_orientation_result(session, Ok(()));

        let effects = orch.on_fullscreen_exit();
        assert_eq!(
            effects,
            vec![
                Effect::UnlockOrientation,
                Effect::Notify(Notification::ExitedFullscreen)
            ]
        );
        assert_eq!(orch.state(), FullscreenSessionState::Idle);

        assert!(orch.on_fullscreen_exit().is_empty());
    }

    #[test]
    fn test_exit_without_lock_does_not_unlock() {
        let mut orch = orchestrator(true, false);
        let (session, _) = start(&mut orch);
        orch.on_fullscreen_result(session, Ok(()));
        assert_eq!(
            orch.on_fullscreen_exit(),
            vec![Effect::Notify(Notification::ExitedFullscreen)]
        );
    }

    #[test]
    fn test_exit_during_lock_aborts_and_discards_late_result() {
        let mut orch = orchestrator(true, true);
        let (session, _) = start(&mut orch);
        orch.on_fullscreen_result(session, Ok(()));

        let effects = orch.on_fullscreen_exit();
        assert_eq!(effects.first(), Some(&Effect::UnlockOrientation));
        assert!(notifications(&effects).is_empty());
        assert_eq!(orch.state(), FullscreenSessionState::Idle);
        assert!(matches!(
            orch.outcome_of(session),
            Some(SessionOutcome::Interrupted { .. })
        ));

        // The lock promise settles after the abort.
        assert!(orch.on_orientation_result(session, Ok(())).is_empty());
        assert_eq!(orch.state(), FullscreenSessionState::Idle);
    }

    #[test]
    fn test_exit_during_fullscreen_request() {
        let mut orch = orchestrator(true, true);
        let (session, _) = start(&mut orch);
        let effects = orch.on_fullscreen_exit();
        assert_eq!(
            effects,
            vec![Effect::ReportFailure(DisplayError::NativeInterruption {
                during: FullscreenSessionState::RequestingFullscreen
            })]
        );
        assert!(orch.on_fullscreen_result(session, Ok(())).is_empty());
        assert_eq!(orch.state(), FullscreenSessionState::Idle);
    }

    #[test]
    fn test_stale_session_result_discarded() {
        let mut orch = orchestrator(true, true);
        let (_, _) = start(&mut orch);
        assert!(orch.on_fullscreen_result(SessionId::new(), Ok(())).is_empty());
        assert_eq!(orch.state(), FullscreenSessionState::RequestingFullscreen);
    }

    #[test]
    fn test_new_session_after_denial() {
        let mut orch = orchestrator(true, true);
        let (first, _) = start(&mut orch);
        orch.on_fullscreen_result(first, Err(DisplayError::denied(Capability::Fullscreen, "x")));

        let (second, effects) = start(&mut orch);
        assert_ne!(first, second);
        assert_eq!(effects, vec![Effect::RequestFullscreen { session: second }]);
        assert_eq!(orch.sessions_started(), 2);
    }

    #[test]
    fn test_gesture_origin_from_dom_event() {
        assert_eq!(
            GestureOrigin::from_dom_event("click", true),
            GestureOrigin::Pointer
        );
        assert_eq!(
            GestureOrigin::from_dom_event("touchend", true),
            GestureOrigin::Touch
        );
        assert_eq!(
            GestureOrigin::from_dom_event("keydown", true),
            GestureOrigin::Keyboard
        );
        assert_eq!(
            GestureOrigin::from_dom_event("load", true),
            GestureOrigin::Load
        );
        assert_eq!(
            GestureOrigin::from_dom_event("click", false),
            GestureOrigin::Programmatic
        );
        assert_eq!(
            GestureOrigin::from_dom_event("scroll", true),
            GestureOrigin::Programmatic
        );
    }
}
