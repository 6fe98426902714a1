//! Dry-run fullscreen sessions against a scripted host.

use std::cell::RefCell;

use async_trait::async_trait;
use clap::ValueEnum;
use display_core::{
    handle_fullscreen_exit, run_session, share, Capability, DisplayError, DisplayHost,
    DisplayResult, EnvironmentClassification, GestureOrigin, Notification, Orchestrator,
    OrientationOutcome, OrientationTarget, SessionOutcome, SharedOrchestrator,
};
use serde::Serialize;

/// Trigger that starts the simulated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Trigger {
    /// Trusted click.
    Pointer,
    /// Trusted touch.
    Touch,
    /// Trusted key press.
    Keyboard,
    /// Timer callback.
    Timer,
    /// Page load.
    Load,
    /// Script-dispatched event.
    Programmatic,
}

impl From<Trigger> for GestureOrigin {
    fn from(trigger: Trigger) -> Self {
        match trigger {
            Trigger::Pointer => Self::Pointer,
            Trigger::Touch => Self::Touch,
            Trigger::Keyboard => Self::Keyboard,
            Trigger::Timer => Self::Timer,
            Trigger::Load => Self::Load,
            Trigger::Programmatic => Self::Programmatic,
        }
    }
}

/// How the scripted host answers the fullscreen request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FullscreenResponse {
    /// Request resolves.
    Grant,
    /// Request rejects with a permission error.
    Deny,
    /// No request method exists on the container.
    Unsupported,
}

/// How the scripted host answers the orientation lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LockResponse {
    /// Lock resolves.
    Lock,
    /// Lock rejects.
    Reject,
    /// No lock method exists.
    Unsupported,
}

/// When the simulated user leaves fullscreen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExitPoint {
    /// While the fullscreen request is pending.
    Fullscreen,
    /// While the orientation lock is pending.
    Lock,
    /// After the session settles.
    Active,
}

/// Script for one simulated session.
#[derive(Debug, Clone, Copy)]
pub struct Script {
    /// What starts the session.
    pub trigger: Trigger,
    /// Fullscreen answer.
    pub fullscreen: FullscreenResponse,
    /// Orientation lock answer.
    pub lock: LockResponse,
    /// Native exit point, if any.
    pub exit: Option<ExitPoint>,
}

/// What happened during a simulated session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    /// Classification the orchestrator ran with.
    pub classification: EnvironmentClassification,
    /// Whether the trigger started a session.
    pub started: bool,
    /// Human-readable session outcome.
    pub outcome: Option<String>,
    /// Orchestrator state after the script ran.
    pub final_state: String,
    /// Host operations in call order.
    pub host_calls: Vec<&'static str>,
    /// Notifications delivered to the runtime.
    pub notifications: Vec<Notification>,
    /// Failures surfaced to the presentation layer.
    pub failures: Vec<String>,
}

struct ScriptedHost {
    script: Script,
    orchestrator: SharedOrchestrator,
    calls: RefCell<Vec<&'static str>>,
    notifications: RefCell<Vec<Notification>>,
    failures: RefCell<Vec<String>>,
}

impl ScriptedHost {
    fn new(script: Script, orchestrator: &SharedOrchestrator) -> Self {
        Self {
            script,
            orchestrator: orchestrator.clone(),
            calls: RefCell::new(Vec::new()),
            notifications: RefCell::new(Vec::new()),
            failures: RefCell::new(Vec::new()),
        }
    }

    fn exit_if(&self, point: ExitPoint) {
        if self.script.exit == Some(point) {
            tracing::debug!(?point, "Simulating native fullscreen exit");
            self.calls.borrow_mut().push("native_exit");
            handle_fullscreen_exit(&self.orchestrator, self);
        }
    }
}

#[async_trait(?Send)]
impl DisplayHost for ScriptedHost {
    async fn request_fullscreen(&self) -> DisplayResult<()> {
        self.calls.borrow_mut().push("request_fullscreen");
        self.exit_if(ExitPoint::Fullscreen);
        match self.script.fullscreen {
            FullscreenResponse::Grant => Ok(()),
            FullscreenResponse::Deny => Err(DisplayError::denied(
                Capability::Fullscreen,
                "NotAllowedError: simulated denial",
            )),
            FullscreenResponse::Unsupported => {
                Err(DisplayError::CapabilityUnsupported(Capability::Fullscreen))
            }
        }
    }

    async fn lock_orientation(&self, _target: OrientationTarget) -> DisplayResult<()> {
        self.calls.borrow_mut().push("lock_orientation");
        self.exit_if(ExitPoint::Lock);
        match self.script.lock {
            LockResponse::Lock => Ok(()),
            LockResponse::Reject => Err(DisplayError::denied(
                Capability::OrientationLock,
                "NotSupportedError: simulated rejection",
            )),
            LockResponse::Unsupported => Err(DisplayError::CapabilityUnsupported(
                Capability::OrientationLock,
            )),
        }
    }

    fn unlock_orientation(&self) {
        self.calls.borrow_mut().push("unlock_orientation");
    }

    fn notify(&self, notification: Notification) {
        self.notifications.borrow_mut().push(notification);
    }

    fn report_failure(&self, error: &DisplayError) {
        self.failures.borrow_mut().push(error.to_string());
    }
}

/// Render an outcome for the report.
#[must_use]
pub fn describe_outcome(outcome: &SessionOutcome) -> String {
    match outcome {
        SessionOutcome::Active {
            orientation: OrientationOutcome::Locked,
        } => "active, orientation locked".to_string(),
        SessionOutcome::Active {
            orientation: OrientationOutcome::Skipped,
        } => "active, orientation lock skipped".to_string(),
        SessionOutcome::Active {
            orientation: OrientationOutcome::Rejected { error },
        } => format!("active, orientation lock rejected: {error}"),
        SessionOutcome::Denied { error } => format!("denied: {error}"),
        SessionOutcome::Interrupted { error } => format!("interrupted: {error}"),
    }
}

/// Run one scripted session to completion.
pub async fn simulate(classification: EnvironmentClassification, script: Script) -> SimulationReport {
    let orchestrator = share(Orchestrator::new(
        classification,
        OrientationTarget::Landscape,
    ));
    let host = ScriptedHost::new(script, &orchestrator);

    let outcome = run_session(&orchestrator, &host, script.trigger.into()).await;
    if outcome.as_ref().is_some_and(SessionOutcome::is_active) {
        host.exit_if(ExitPoint::Active);
    }

    let final_state = orchestrator.borrow().state().to_string();
    SimulationReport {
        classification,
        started: outcome.is_some(),
        outcome: outcome.as_ref().map(describe_outcome),
        final_state,
        host_calls: host.calls.take(),
        notifications: host.notifications.take(),
        failures: host.failures.take(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use display_core::PlatformFamily;

    fn android() -> EnvironmentClassification {
        EnvironmentClassification::new(PlatformFamily::Android, true, true)
    }

    fn script() -> Script {
        Script {
            trigger: Trigger::Pointer,
            fullscreen: FullscreenResponse::Grant,
            lock: LockResponse::Lock,
            exit: None,
        }
    }

    #[tokio::test]
    async fn granted_session_locks_and_notifies() {
        let report = simulate(android(), script()).await;
        assert!(report.started);
        assert_eq!(report.outcome.as_deref(), Some("active, orientation locked"));
        assert_eq!(report.final_state, "active");
        assert_eq!(report.host_calls, vec!["request_fullscreen", "lock_orientation"]);
        assert_eq!(report.notifications, vec![Notification::EnteredFullscreen]);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn timer_trigger_does_not_start() {
        let report = simulate(
            android(),
            Script {
                trigger: Trigger::Timer,
                ..script()
            },
        )
        .await;
        assert!(!report.started);
        assert!(report.host_calls.is_empty());
        assert_eq!(report.final_state, "idle");
    }

    #[tokio::test]
    async fn denial_reports_failure() {
        let report = simulate(
            android(),
            Script {
                fullscreen: FullscreenResponse::Deny,
                ..script()
            },
        )
        .await;
        assert!(report.outcome.is_some_and(|o| o.starts_with("denied")));
        assert_eq!(report.final_state, "idle");
        assert_eq!(report.notifications, vec![Notification::FullscreenFailed]);
        assert_eq!(report.failures.len(), 1);
    }

    #[tokio::test]
    async fn exit_after_active_unlocks_and_notifies_exit() {
        let report = simulate(
            android(),
            Script {
                exit: Some(ExitPoint::Active),
                ..script()
            },
        )
        .await;
        assert_eq!(report.final_state, "idle");
        assert_eq!(
            report.host_calls,
            vec![
                "request_fullscreen",
                "lock_orientation",
                "native_exit",
                "unlock_orientation"
            ]
        );
        assert_eq!(
            report.notifications,
            vec![Notification::EnteredFullscreen, Notification::ExitedFullscreen]
        );
    }

    #[tokio::test]
    async fn exit_while_requesting_interrupts() {
        let report = simulate(
            android(),
            Script {
                exit: Some(ExitPoint::Fullscreen),
                ..script()
            },
        )
        .await;
        assert!(report.outcome.is_some_and(|o| o.starts_with("interrupted")));
        assert_eq!(report.final_state, "idle");
        assert!(report.notifications.is_empty());
    }
}
