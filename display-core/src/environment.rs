//! # Environment Classification
//!
//! Turns the ambient browser signals into an immutable
//! [`EnvironmentClassification`]. The agent string only picks the
//! [`PlatformFamily`] used for styling and hints; capability flags come from
//! feature probes alone.
//!
//! ```text
//! agent string ──┐
//! standalone  ───┼──► PlatformFamily   (IosStandalone > IosBrowser > Android > Desktop)
//! probes      ───┴──► supports_fullscreen_api / supports_orientation_lock
//! ```

use serde::{Deserialize, Serialize};

/// Agent-string markers for the iOS device family (lowercase).
const IOS_MARKERS: [&str; 3] = ["iphone", "ipad", "ipod"];

/// Agent-string marker for Android (lowercase).
const ANDROID_MARKER: &str = "android";

/// Which fullscreen-request variants exist on a representative element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FullscreenProbe {
    /// `requestFullscreen`.
    pub standard: bool,
    /// `webkitRequestFullscreen` / `webkitRequestFullScreen`.
    pub webkit: bool,
    /// `mozRequestFullScreen`.
    pub moz: bool,
    /// `msRequestFullscreen`.
    pub ms: bool,
}

impl FullscreenProbe {
    /// Probe result with no variant present.
    pub const NONE: Self = Self {
        standard: false,
        webkit: false,
        moz: false,
        ms: false,
    };

    /// Probe result with only the unprefixed API.
    pub const STANDARD: Self = Self {
        standard: true,
        webkit: false,
        moz: false,
        ms: false,
    };

    /// Probe result with only the `webkit` variant.
    pub const WEBKIT: Self = Self {
        standard: false,
        webkit: true,
        moz: false,
        ms: false,
    };

    /// Whether any variant is present.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.standard || self.webkit || self.moz || self.ms
    }
}

/// Raw ambient inputs to [`classify`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvironmentSignals {
    /// `navigator.userAgent`.
    pub user_agent: String,
    /// `matchMedia("(display-mode: standalone)").matches`.
    pub standalone_media: bool,
    /// Legacy iOS `navigator.standalone`, when the property exists.
    pub navigator_standalone: Option<bool>,
    /// Fullscreen API presence.
    pub fullscreen: FullscreenProbe,
    /// Whether `screen.orientation.lock` is callable.
    pub orientation_lock: bool,
}

impl EnvironmentSignals {
    /// Signals for an agent string with no capabilities and no standalone mode.
    #[must_use]
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..Self::default()
        }
    }

    /// Set the standalone display-mode media query result.
    #[must_use]
    pub fn with_standalone_media(mut self, standalone: bool) -> Self {
        self.standalone_media = standalone;
        self
    }

    /// Set the legacy `navigator.standalone` flag.
    #[must_use]
    pub fn with_navigator_standalone(mut self, standalone: bool) -> Self {
        self.navigator_standalone = Some(standalone);
        self
    }

    /// Set the fullscreen probe result.
    #[must_use]
    pub fn with_fullscreen(mut self, probe: FullscreenProbe) -> Self {
        self.fullscreen = probe;
        self
    }

    /// Set the orientation-lock probe result.
    #[must_use]
    pub fn with_orientation_lock(mut self, available: bool) -> Self {
        self.orientation_lock = available;
        self
    }

    /// Standalone media query OR the legacy navigator flag.
    #[must_use]
    pub fn is_standalone(&self) -> bool {
        self.standalone_media || self.navigator_standalone == Some(true)
    }
}

/// Mutually exclusive host platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformFamily {
    /// Anything not recognised below.
    #[default]
    Desktop,
    /// Android browsers (Chrome and friends).
    Android,
    /// iOS / iPadOS in a browser tab.
    IosBrowser,
    /// iOS / iPadOS launched from the home screen.
    IosStandalone,
}

impl PlatformFamily {
    /// Every family, in precedence order from lowest to highest.
    pub const ALL: [Self; 4] = [
        Self::Desktop,
        Self::Android,
        Self::IosBrowser,
        Self::IosStandalone,
    ];

    /// Kebab-case tag used for styling hooks.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Android => "android",
            Self::IosBrowser => "ios-browser",
            Self::IosStandalone => "ios-standalone",
        }
    }

    /// Whether this is one of the iOS families.
    #[must_use]
    pub const fn is_ios(self) -> bool {
        matches!(self, Self::IosBrowser | Self::IosStandalone)
    }
}

impl std::fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Immutable result of classifying the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentClassification {
    platform_family: PlatformFamily,
    supports_fullscreen_api: bool,
    supports_orientation_lock: bool,
}

impl EnvironmentClassification {
    /// Build a classification directly.
    #[must_use]
    pub const fn new(
        platform_family: PlatformFamily,
        supports_fullscreen_api: bool,
        supports_orientation_lock: bool,
    ) -> Self {
        Self {
            platform_family,
            supports_fullscreen_api,
            supports_orientation_lock,
        }
    }

    /// The platform family.
    #[must_use]
    pub const fn platform_family(&self) -> PlatformFamily {
        self.platform_family
    }

    /// Whether a fullscreen request API exists.
    #[must_use]
    pub const fn supports_fullscreen_api(&self) -> bool {
        self.supports_fullscreen_api
    }

    /// Whether an orientation lock API exists.
    #[must_use]
    pub const fn supports_orientation_lock(&self) -> bool {
        self.supports_orientation_lock
    }

    /// Show the "Add to Home Screen" banner (iOS in a browser tab).
    #[must_use]
    pub const fn show_add_to_home_screen_hint(&self) -> bool {
        matches!(self.platform_family, PlatformFamily::IosBrowser)
    }

    /// Show the standalone-mode banner (iOS from the home screen).
    #[must_use]
    pub const fn show_standalone_hint(&self) -> bool {
        matches!(self.platform_family, PlatformFamily::IosStandalone)
    }

    /// Styling tag for the family.
    #[must_use]
    pub const fn family_tag(&self) -> &'static str {
        self.platform_family.tag()
    }
}

/// Classify the environment described by `signals`.
///
/// Total: every input maps to exactly one family. Never fails.
#[must_use]
pub fn classify(signals: &EnvironmentSignals) -> EnvironmentClassification {
    let agent = signals.user_agent.to_ascii_lowercase();
    let is_ios = IOS_MARKERS.iter().any(|marker| agent.contains(marker));
    let is_android = agent.contains(ANDROID_MARKER);
    let is_standalone = signals.is_standalone();

    let platform_family = match (is_ios, is_standalone, is_android) {
        (true, true, _) => PlatformFamily::IosStandalone,
        (true, false, _) => PlatformFamily::IosBrowser,
        (false, _, true) => PlatformFamily::Android,
        (false, _, false) => PlatformFamily::Desktop,
    };

    let classification = EnvironmentClassification {
        platform_family,
        supports_fullscreen_api: signals.fullscreen.any(),
        supports_orientation_lock: signals.orientation_lock,
    };

    tracing::debug!(
        family = %platform_family,
        fullscreen = classification.supports_fullscreen_api,
        orientation_lock = classification.supports_orientation_lock,
        "Classified environment"
    );

    classification
}
