//! # Session Driver
//!
//! Runs an [`Orchestrator`] against a [`DisplayHost`]: performs each
//! [`Effect`] in order, awaits the asynchronous requests and feeds their
//! results back into the machine.
//!
//! The orchestrator lives in an `Rc<RefCell<_>>` because the native exit
//! event arrives through a separate callback while a request is still
//! pending. No borrow is ever held across an `.await`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use tracing::Instrument;

use crate::config::OrientationTarget;
use crate::error::{DisplayError, DisplayResult};
use crate::notification::Notification;
use crate::orchestrator::{Effect, GestureDecision, GestureOrigin, Orchestrator, SessionOutcome};

/// Orchestrator shared between the gesture handler and the exit handler.
pub type SharedOrchestrator = Rc<RefCell<Orchestrator>>;

/// The environment the orchestrator drives.
///
/// Implementations are single-threaded (`?Send`) to match the browser's
/// main execution context.
#[async_trait(?Send)]
pub trait DisplayHost {
    /// Issue a single fullscreen request against the container element.
    async fn request_fullscreen(&self) -> DisplayResult<()>;

    /// Request an orientation lock.
    async fn lock_orientation(&self, target: OrientationTarget) -> DisplayResult<()>;

    /// Release any orientation lock. Best effort, never fails.
    fn unlock_orientation(&self);

    /// Deliver a notification to the hosted runtime. Fire-and-forget.
    fn notify(&self, notification: Notification);

    /// Record a recoverable failure. The default only logs it.
    fn report_failure(&self, error: &DisplayError) {
        tracing::debug!(%error, "Display failure recorded");
    }
}

/// Wrap an orchestrator for sharing.
#[must_use]
pub fn share(orchestrator: Orchestrator) -> SharedOrchestrator {
    Rc::new(RefCell::new(orchestrator))
}

/// Start a session from a trigger and drive it to completion.
///
/// Returns `None` if the trigger was ignored (not a user gesture, or a
/// session is already running). Otherwise returns the session's outcome once
/// it is `Active`, denied or interrupted.
pub async fn run_session<H>(
    orchestrator: &SharedOrchestrator,
    host: &H,
    origin: GestureOrigin,
) -> Option<SessionOutcome>
where
    H: DisplayHost + ?Sized,
{
    let decision = orchestrator.borrow_mut().on_gesture(origin);
    let (session, effects) = match decision {
        GestureDecision::Started { session, effects } => (session, effects),
        GestureDecision::Ignored(reason) => {
            tracing::debug!(?reason, "Fullscreen trigger ignored");
            return None;
        }
    };

    let span = tracing::info_span!("fullscreen_session", %session);
    async {
        let mut pending: VecDeque<Effect> = effects.into();
        while let Some(effect) = pending.pop_front() {
            let next = match effect {
                Effect::RequestFullscreen { session } => {
                    let result = host.request_fullscreen().await;
                    orchestrator
                        .borrow_mut()
                        .on_fullscreen_result(session, result)
                }
                Effect::LockOrientation { session, target } => {
                    let result = host.lock_orientation(target).await;
                    orchestrator
                        .borrow_mut()
                        .on_orientation_result(session, result)
                }
                immediate => {
                    perform(host, immediate);
                    Vec::new()
                }
            };
            pending.extend(next);
        }

        orchestrator.borrow().outcome_of(session).cloned()
    }
    .instrument(span)
    .await
}

/// Feed the native exit-fullscreen event and perform the resulting effects.
pub fn handle_fullscreen_exit<H>(orchestrator: &SharedOrchestrator, host: &H)
where
    H: DisplayHost + ?Sized,
{
    let effects = orchestrator.borrow_mut().on_fullscreen_exit();
    for effect in effects {
        perform(host, effect);
    }
}

/// Perform an effect that needs no awaiting.
fn perform<H>(host: &H, effect: Effect)
where
    H: DisplayHost + ?Sized,
{
    match effect {
        Effect::UnlockOrientation => host.unlock_orientation(),
        Effect::Notify(notification) => host.notify(notification),
        Effect::ReportFailure(error) => host.report_failure(&error),
        Effect::RequestFullscreen { .. } | Effect::LockOrientation { .. } => {
            // Only produced in reply to a gesture or a fullscreen grant.
            tracing::error!(?effect, "Asynchronous effect outside a session driver");
        }
    }
}
