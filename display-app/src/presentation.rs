//! Projects [`PresentationHooks`] onto the document root's class list.

use std::cell::RefCell;

use display_core::{Orchestrator, PresentationHooks};
use web_sys::Element;

use crate::error::{js_error_text, AppResult};

/// Class-list adapter for the hint banners and styling hooks.
pub(crate) struct Presentation {
    root: Element,
    hooks: RefCell<PresentationHooks>,
}

impl Presentation {
    /// Create and immediately apply the initial classes.
    pub(crate) fn new(root: Element, hooks: PresentationHooks) -> AppResult<Self> {
        let presentation = Self {
            root,
            hooks: RefCell::new(hooks),
        };
        presentation.apply()?;
        Ok(presentation)
    }

    /// Re-derive session-dependent classes from the orchestrator.
    pub(crate) fn sync_with(&self, orchestrator: &Orchestrator) {
        let changed = self.hooks.borrow_mut().sync_with(orchestrator);
        if changed {
            self.apply_or_log();
        }
    }

    /// Show the fullscreen-unavailable hint.
    pub(crate) fn mark_fullscreen_unavailable(&self) {
        self.hooks.borrow_mut().mark_fullscreen_unavailable();
        self.apply_or_log();
    }

    fn apply_or_log(&self) {
        if let Err(err) = self.apply() {
            tracing::warn!("Failed to update presentation classes: {err}");
        }
    }

    fn apply(&self) -> AppResult<()> {
        let active = self.hooks.borrow().classes();
        let class_list = self.root.class_list();
        for name in PresentationHooks::ALL_CLASSES {
            class_list
                .toggle_with_force(name, active.contains(&name))
                .map_err(|e| crate::AppError::Js(js_error_text(&e)))?;
        }
        tracing::debug!(classes = ?active, "Presentation classes applied");
        Ok(())
    }
}
