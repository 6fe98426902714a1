//! Presentation hooks.
//!
//! Projects the classification and session state onto a set of CSS class
//! names for the document root. The controller never renders UI; static
//! banners in the page show or hide on these classes.

use crate::environment::{EnvironmentClassification, PlatformFamily};
use crate::orchestrator::{FullscreenSessionState, Orchestrator, SessionOutcome};

/// Class shown on iOS browser tabs to reveal the "Add to Home Screen" banner.
pub const CLASS_ADD_TO_HOME_SCREEN_HINT: &str = "show-a2hs-hint";
/// Class shown when running from the iOS home screen.
pub const CLASS_STANDALONE_HINT: &str = "show-standalone-hint";
/// Class shown once fullscreen is known not to be available.
pub const CLASS_FULLSCREEN_UNAVAILABLE: &str = "fullscreen-unavailable";
/// Class shown while a fullscreen session is active.
pub const CLASS_FULLSCREEN: &str = "is-fullscreen";

/// Boolean styling hooks derived from controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationHooks {
    family: PlatformFamily,
    show_add_to_home_screen_hint: bool,
    show_standalone_hint: bool,
    fullscreen_unavailable: bool,
    is_fullscreen: bool,
}

impl PresentationHooks {
    /// Every class this module may set, for clearing stale ones.
    pub const ALL_CLASSES: [&'static str; 8] = [
        "platform-desktop",
        "platform-android",
        "platform-ios-browser",
        "platform-ios-standalone",
        CLASS_ADD_TO_HOME_SCREEN_HINT,
        CLASS_STANDALONE_HINT,
        CLASS_FULLSCREEN_UNAVAILABLE,
        CLASS_FULLSCREEN,
    ];

    /// Initial hooks for a classification.
    #[must_use]
    pub const fn from_classification(classification: &EnvironmentClassification) -> Self {
        Self {
            family: classification.platform_family(),
            show_add_to_home_screen_hint: classification.show_add_to_home_screen_hint(),
            show_standalone_hint: classification.show_standalone_hint(),
            fullscreen_unavailable: !classification.supports_fullscreen_api(),
            is_fullscreen: false,
        }
    }

    /// Update the session-dependent hooks. Returns `true` if anything changed.
    ///
    /// `fullscreen_unavailable` is sticky: once a denial is seen it stays set
    /// for the page's lifetime.
    pub fn sync_with(&mut self, orchestrator: &Orchestrator) -> bool {
        let before = *self;
        self.is_fullscreen = orchestrator.state() == FullscreenSessionState::Active;
        if matches!(
            orchestrator.last_outcome(),
            Some(SessionOutcome::Denied { .. })
        ) {
            self.fullscreen_unavailable = true;
        }
        before != *self
    }

    /// Mark fullscreen as unavailable.
    pub fn mark_fullscreen_unavailable(&mut self) {
        self.fullscreen_unavailable = true;
    }

    /// The `platform-*` class.
    #[must_use]
    pub const fn platform_class(&self) -> &'static str {
        match self.family {
            PlatformFamily::Desktop => "platform-desktop",
            PlatformFamily::Android => "platform-android",
            PlatformFamily::IosBrowser => "platform-ios-browser",
            PlatformFamily::IosStandalone => "platform-ios-standalone",
        }
    }

    /// Whether the fullscreen-unavailable hint should show.
    #[must_use]
    pub const fn fullscreen_unavailable(&self) -> bool {
        self.fullscreen_unavailable
    }

    /// Classes that should currently be present.
    #[must_use]
    pub fn classes(&self) -> Vec<&'static str> {
        let mut classes = vec![self.platform_class()];
        if self.show_add_to_home_screen_hint {
            classes.push(CLASS_ADD_TO_HOME_SCREEN_HINT);
        }
        if self.show_standalone_hint {
            classes.push(CLASS_STANDALONE_HINT);
        }
        if self.fullscreen_unavailable {
            classes.push(CLASS_FULLSCREEN_UNAVAILABLE);
        }
        if self.is_fullscreen {
            classes.push(CLASS_FULLSCREEN);
        }
        classes
    }
}
