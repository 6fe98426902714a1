//! # Aspect-Constrained Resizing
//!
//! Bounds the canvas height as a function of the viewport width so that
//! wide layouts stay unconstrained while tall portrait layouts are capped.
//! This is the fallback for hosts that cannot lock orientation.
//!
//! ```text
//! viewport 1200x900, max aspect 1.4
//!   ceiling = floor(1200 / 1.4) = 857
//!   target  = 1200x857
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{DisplayError, DisplayResult};

/// Viewport dimensions in CSS (device-independent) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Width in CSS pixels.
    pub width: u32,
    /// Height in CSS pixels.
    pub height: u32,
}

impl ViewportSize {
    /// Create a viewport size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Size the canvas should be given for the current viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CanvasTargetSize {
    /// Width in CSS pixels.
    pub width: u32,
    /// Height in CSS pixels.
    pub height: u32,
}

impl CanvasTargetSize {
    /// The zero-area size. Never applied to a canvas.
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Whether this size has zero area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Backing-store size for the given device pixel ratio.
    ///
    /// Non-finite or non-positive ratios are treated as `1.0`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn scaled(&self, device_pixel_ratio: f64) -> Self {
        let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            width: (f64::from(self.width) * ratio).round() as u32,
            height: (f64::from(self.height) * ratio).round() as u32,
        }
    }
}

/// Maximum allowed width/height ratio ceiling.
///
/// Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct MaxAspect(f64);

impl MaxAspect {
    /// The default ceiling of 1.4.
    pub const DEFAULT: Self = Self(1.4);

    /// Validate and wrap a ratio.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::InvalidConfig`] if the ratio is not finite or
    /// not strictly positive.
    pub fn new(ratio: f64) -> DisplayResult<Self> {
        if ratio.is_finite() && ratio > 0.0 {
            Ok(Self(ratio))
        } else {
            Err(DisplayError::InvalidConfig(format!(
                "max aspect must be a finite positive number, got {ratio}"
            )))
        }
    }

    /// The raw ratio.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Default for MaxAspect {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for MaxAspect {
    type Error = DisplayError;

    fn try_from(ratio: f64) -> Result<Self, Self::Error> {
        Self::new(ratio)
    }
}

impl From<MaxAspect> for f64 {
    fn from(aspect: MaxAspect) -> Self {
        aspect.0
    }
}

impl std::fmt::Display for MaxAspect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compute the canvas size for a viewport under an aspect ceiling.
///
/// `width` is passed through and `height` is clamped to
/// `floor(width / max_aspect)`. A viewport with a zero dimension yields
/// [`CanvasTargetSize::ZERO`].
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn compute_canvas_size(viewport: ViewportSize, max_aspect: MaxAspect) -> CanvasTargetSize {
    if viewport.is_empty() {
        return CanvasTargetSize::ZERO;
    }

    // Float-to-int `as` saturates, so tiny ratios cannot wrap.
    let ceiling = (f64::from(viewport.width) / max_aspect.get()).floor() as u32;

    CanvasTargetSize {
        width: viewport.width,
        height: viewport.height.min(ceiling),
    }
}

/// What the caller should do with a freshly sampled viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDecision {
    /// Apply these sizes to the canvas.
    Apply {
        /// Layout size in CSS pixels.
        size: CanvasTargetSize,
        /// Drawing-buffer size in device pixels.
        backing: CanvasTargetSize,
    },
    /// Same layout and backing size as last time; nothing to do.
    Unchanged,
    /// Zero-area result; leave the canvas alone.
    SkipEmpty,
}

/// Stateful wrapper that avoids re-applying identical sizes.
///
/// The dedupe key is the pair of layout size and backing size, so a
/// device-pixel-ratio change at a constant CSS size still applies.
#[derive(Debug, Clone, Default)]
pub struct ResizePolicy {
    max_aspect: MaxAspect,
    last_applied: Option<CanvasTargetSize>,
    last_backing: Option<CanvasTargetSize>,
}

impl ResizePolicy {
    /// Create a policy with the given ceiling.
    #[must_use]
    pub const fn new(max_aspect: MaxAspect) -> Self {
        Self {
            max_aspect,
            last_applied: None,
            last_backing: None,
        }
    }

    /// The configured ceiling.
    #[must_use]
    pub const fn max_aspect(&self) -> MaxAspect {
        self.max_aspect
    }

    /// Target size for a viewport, without touching policy state.
    #[must_use]
    pub fn target(&self, viewport: ViewportSize) -> CanvasTargetSize {
        compute_canvas_size(viewport, self.max_aspect)
    }

    /// Decide whether a new viewport sample requires a canvas update.
    pub fn evaluate(
        &mut self,
        viewport: ViewportSize,
        device_pixel_ratio: f64,
    ) -> ResizeDecision {
        let size = self.target(viewport);
        if size.is_empty() {
            tracing::debug!(?viewport, "Skipping zero-area canvas size");
            return ResizeDecision::SkipEmpty;
        }
        let backing = size.scaled(device_pixel_ratio);
        if self.last_applied == Some(size) && self.last_backing == Some(backing) {
            return ResizeDecision::Unchanged;
        }
        self.last_applied = Some(size);
        self.last_backing = Some(backing);
        ResizeDecision::Apply { size, backing }
    }

    /// The last layout size handed out by [`ResizePolicy::evaluate`].
    #[must_use]
    pub const fn last_applied(&self) -> Option<CanvasTargetSize> {
        self.last_applied
    }

    /// Forget the last applied sizes so the next evaluation applies again.
    ///
    /// Used after the page changes the canvas behind our back, e.g. on a
    /// fullscreen transition.
    pub fn invalidate(&mut self) {
        self.last_applied = None;
        self.last_backing = None;
    }
}

/// Keeps only the most recent viewport sample of a resize burst.
#[derive(Debug, Clone, Default)]
pub struct ResizeCoalescer {
    pending: Option<ViewportSize>,
}

impl ResizeCoalescer {
    /// Create an empty coalescer.
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Record a sample. Returns `true` if this starts a new burst, meaning
    /// the caller should schedule a flush.
    pub fn push(&mut self, viewport: ViewportSize) -> bool {
        self.pending.replace(viewport).is_none()
    }

    /// Take the latest sample, ending the burst.
    pub fn take(&mut self) -> Option<ViewportSize> {
        self.pending.take()
    }

    /// Whether a sample is waiting to be flushed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
