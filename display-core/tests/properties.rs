//! Property tests for the resize policy, the classifier and the orchestrator.

use display_core::{
    classify, compute_canvas_size, Capability, DisplayError, EnvironmentClassification,
    EnvironmentSignals, FullscreenProbe, FullscreenSessionState, GestureDecision, GestureOrigin,
    MaxAspect, Orchestrator, OrientationTarget, PlatformFamily, SessionId, ViewportSize,
};
use proptest::prelude::*;

fn max_aspect() -> impl Strategy<Value = MaxAspect> {
    (0.25f64..8.0).prop_map(|ratio| MaxAspect::new(ratio).expect("range is positive"))
}

fn viewport() -> impl Strategy<Value = ViewportSize> {
    (0u32..10_000, 0u32..10_000).prop_map(|(w, h)| ViewportSize::new(w, h))
}

fn user_agent() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X)".to_string()),
        Just("Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X)".to_string()),
        Just("Mozilla/5.0 (Linux; Android 14; Pixel 8)".to_string()),
        Just("Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string()),
        "[ -~]{0,80}",
    ]
}

fn signals() -> impl Strategy<Value = EnvironmentSignals> {
    (
        user_agent(),
        any::<bool>(),
        proptest::option::of(any::<bool>()),
        any::<[bool; 4]>(),
        any::<bool>(),
    )
        .prop_map(
            |(ua, media, navigator, [standard, webkit, moz, ms], lock)| EnvironmentSignals {
                user_agent: ua,
                standalone_media: media,
                navigator_standalone: navigator,
                fullscreen: FullscreenProbe {
                    standard,
                    webkit,
                    moz,
                    ms,
                },
                orientation_lock: lock,
            },
        )
}

#[derive(Debug, Clone)]
enum Input {
    Gesture(GestureOrigin),
    FullscreenGranted,
    FullscreenDenied,
    OrientationGranted,
    OrientationRejected,
    Exit,
}

fn input() -> impl Strategy<Value = Input> {
    prop_oneof![
        prop_oneof![
            Just(GestureOrigin::Pointer),
            Just(GestureOrigin::Touch),
            Just(GestureOrigin::Keyboard),
            Just(GestureOrigin::Timer),
            Just(GestureOrigin::Load),
            Just(GestureOrigin::Programmatic),
        ]
        .prop_map(Input::Gesture),
        Just(Input::FullscreenGranted),
        Just(Input::FullscreenDenied),
        Just(Input::OrientationGranted),
        Just(Input::OrientationRejected),
        Just(Input::Exit),
    ]
}

proptest! {
    #[test]
    fn height_respects_aspect_ceiling(viewport in viewport(), aspect in max_aspect()) {
        let size = compute_canvas_size(viewport, aspect);
        if viewport.width > 0 {
            prop_assert!(f64::from(size.height) * aspect.get() <= f64::from(size.width) + 1.0);
        }
        prop_assert!(size.height <= viewport.height);
    }

    #[test]
    fn width_passes_through_unless_empty(viewport in viewport(), aspect in max_aspect()) {
        let size = compute_canvas_size(viewport, aspect);
        if viewport.is_empty() {
            prop_assert!(size.width == 0 && size.height == 0);
        } else {
            prop_assert_eq!(size.width, viewport.width);
        }
    }

    #[test]
    fn resize_is_pure(viewport in viewport(), aspect in max_aspect()) {
        let first = compute_canvas_size(viewport, aspect);
        for _ in 0..3 {
            prop_assert_eq!(compute_canvas_size(viewport, aspect), first);
        }
    }

    #[test]
    fn classification_is_total(signals in signals()) {
        let class = classify(&signals);
        prop_assert!(PlatformFamily::ALL.contains(&class.platform_family()));
        prop_assert_eq!(classify(&signals), class);
    }

    #[test]
    fn standalone_dominates_ios_browser(signals in signals()) {
        let class = classify(&signals);
        let lower = signals.user_agent.to_ascii_lowercase();
        let is_ios = ["iphone", "ipad", "ipod"].iter().any(|m| lower.contains(m));
        if is_ios && signals.is_standalone() {
            prop_assert_eq!(class.platform_family(), PlatformFamily::IosStandalone);
        }
        prop_assert!(!(class.show_add_to_home_screen_hint() && class.show_standalone_hint()));
    }

    #[test]
    fn capabilities_follow_probes_only(signals in signals()) {
        let class = classify(&signals);
        prop_assert_eq!(class.supports_fullscreen_api(), signals.fullscreen.any());
        prop_assert_eq!(class.supports_orientation_lock(), signals.orientation_lock);
    }

    #[test]
    fn orchestrator_invariants_hold(
        fullscreen in any::<bool>(),
        lock in any::<bool>(),
        inputs in proptest::collection::vec(input(), 0..40),
    ) {
        let mut orch = Orchestrator::new(
            EnvironmentClassification::new(PlatformFamily::Android, fullscreen, lock),
            OrientationTarget::Landscape,
        );
        let mut granted: Option<SessionId> = None;

        for input in inputs {
            let before_state = orch.state();
            let before_count = orch.sessions_started();
            let session = orch.current_session().unwrap_or_default();

            match input {
                Input::Gesture(origin) => {
                    let decision = orch.on_gesture(origin);
                    if before_state != FullscreenSessionState::Idle || !origin.is_user_initiated() {
                        prop_assert!(matches!(decision, GestureDecision::Ignored(_)));
                        prop_assert_eq!(orch.state(), before_state);
                        prop_assert_eq!(orch.sessions_started(), before_count);
                    }
                }
                Input::FullscreenGranted => {
                    orch.on_fullscreen_result(session, Ok(()));
                    if before_state == FullscreenSessionState::RequestingFullscreen {
                        granted = Some(session);
                    }
                }
                Input::FullscreenDenied => {
                    orch.on_fullscreen_result(
                        session,
                        Err(DisplayError::denied(Capability::Fullscreen, "denied")),
                    );
                }
                Input::OrientationGranted => {
                    orch.on_orientation_result(session, Ok(()));
                }
                Input::OrientationRejected => {
                    orch.on_orientation_result(
                        session,
                        Err(DisplayError::denied(Capability::OrientationLock, "rejected")),
                    );
                }
                Input::Exit => {
                    orch.on_fullscreen_exit();
                    prop_assert_eq!(orch.state(), FullscreenSessionState::Idle);
                }
            }

            if orch.state() == FullscreenSessionState::RequestingOrientationLock {
                prop_assert_eq!(granted, orch.current_session());
            }
        }
    }
}
