//! Controller configuration.
//!
//! Accepted as JSON from the page (camelCase keys), every field optional:
//!
//! ```json
//! { "maxAspect": 1.4, "containerSelector": "#game-wrapper", "orientation": "landscape" }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::DisplayResult;
use crate::resize::MaxAspect;

/// Orientation requested once fullscreen is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationTarget {
    /// Any landscape orientation.
    #[default]
    Landscape,
}

impl OrientationTarget {
    /// Value passed to `screen.orientation.lock`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
        }
    }
}

/// Configuration for the display controller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayConfig {
    /// Aspect ceiling for the resize policy.
    pub max_aspect: MaxAspect,
    /// CSS selector of the element to make fullscreen.
    ///
    /// `None` means the canvas's parent element.
    pub container_selector: Option<String>,
    /// Orientation to lock once fullscreen.
    pub orientation: OrientationTarget,
}

impl DisplayConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the aspect ceiling.
    #[must_use]
    pub fn with_max_aspect(mut self, max_aspect: MaxAspect) -> Self {
        self.max_aspect = max_aspect;
        self
    }

    /// Set the fullscreen container selector.
    #[must_use]
    pub fn with_container_selector(mut self, selector: impl Into<String>) -> Self {
        self.container_selector = Some(selector.into());
        self
    }

    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> DisplayResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DisplayError::InvalidConfig`] for a blank container selector.
    pub fn validate(&self) -> DisplayResult<()> {
        if let Some(selector) = &self.container_selector {
            if selector.trim().is_empty() {
                return Err(crate::DisplayError::InvalidConfig(
                    "container selector must not be blank".to_string(),
                ));
            }
        }
        Ok(())
    }
}
