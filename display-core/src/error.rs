//! Error types for display operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::orchestrator::FullscreenSessionState;

/// Result type for display operations.
pub type DisplayResult<T> = Result<T, DisplayError>;

/// A host capability the controller may ask the browser for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// The element fullscreen API (any vendor variant).
    Fullscreen,
    /// `screen.orientation.lock` or equivalent.
    OrientationLock,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fullscreen => write!(f, "fullscreen"),
            Self::OrientationLock => write!(f, "orientation lock"),
        }
    }
}

/// Errors that can occur in display operations.
///
/// The first three variants form the runtime taxonomy. They are always
/// recoverable: the orchestrator returns to `Idle` or `Active` after any of
/// them. The remaining variants only occur while setting the controller up.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DisplayError {
    /// The API is absent on this host. Detected by probing, not by exception.
    #[error("{0} is not supported by this host")]
    CapabilityUnsupported(Capability),

    /// The API exists but the user or browser declined the request.
    #[error("{capability} request denied: {reason}")]
    PermissionDenied {
        /// The capability that was requested.
        capability: Capability,
        /// Reason reported by the host, kept for diagnostics.
        reason: String,
    },

    /// The platform left fullscreen while a session was still being set up.
    #[error("fullscreen exited while {during}")]
    NativeInterruption {
        /// The state the session was in when the exit arrived.
        during: FullscreenSessionState,
    },

    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DisplayError {
    /// Build a [`DisplayError::PermissionDenied`] from any displayable reason.
    #[must_use]
    pub fn denied(capability: Capability, reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            capability,
            reason: reason.into(),
        }
    }

    /// Whether the controller keeps running normally after this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CapabilityUnsupported(_)
                | Self::PermissionDenied { .. }
                | Self::NativeInterruption { .. }
        )
    }

    /// The capability involved, if any.
    #[must_use]
    pub const fn capability(&self) -> Option<Capability> {
        match self {
            Self::CapabilityUnsupported(capability)
            | Self::PermissionDenied { capability, .. } => Some(*capability),
            Self::NativeInterruption { .. } | Self::InvalidConfig(_) | Self::Serialization(_) => {
                None
            }
        }
    }
}

impl From<serde_json::Error> for DisplayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
