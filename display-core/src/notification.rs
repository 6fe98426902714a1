//! One-way notifications delivered to the hosted runtime.

use serde::{Deserialize, Serialize};

use crate::resize::CanvasTargetSize;

/// Fire-and-forget message for the embedded canvas runtime.
///
/// Delivery is never acknowledged or retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A session reached `Active`. Sent once per session.
    EnteredFullscreen,
    /// An `Active` session ended. Sent once per session.
    ExitedFullscreen,
    /// A fullscreen attempt failed; the runtime never entered fullscreen.
    FullscreenFailed,
    /// The canvas was given a new size.
    Resized(CanvasTargetSize),
}

impl Notification {
    /// Name of the JS callback that receives this notification.
    #[must_use]
    pub const fn callback_name(&self) -> &'static str {
        match self {
            Self::EnteredFullscreen => "onEnterFullscreen",
            Self::ExitedFullscreen => "onExitFullscreen",
            Self::FullscreenFailed => "onFullscreenFailed",
            Self::Resized(_) => "onResize",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_names() {
        assert_eq!(
            Notification::EnteredFullscreen.callback_name(),
            "onEnterFullscreen"
        );
        assert_eq!(
            Notification::ExitedFullscreen.callback_name(),
            "onExitFullscreen"
        );
        assert_eq!(
            Notification::FullscreenFailed.callback_name(),
            "onFullscreenFailed"
        );
        assert_eq!(
            Notification::Resized(CanvasTargetSize::ZERO).callback_name(),
            "onResize"
        );
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(Notification::Resized(CanvasTargetSize {
            width: 800,
            height: 400,
        }))
        .unwrap();
        assert_eq!(json["type"], "resized");
        assert_eq!(json["width"], 800);
    }
}
