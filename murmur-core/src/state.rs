//! Interaction state: the current mode and the focused application.

use crate::types::{FocusChange, Mode, StateTransition};

/// Current interaction state.
///
/// Readable from anywhere; mutated only by the resolution pipeline,
/// exactly once per accepted match that declares a transition. The
/// crate-private `apply` enforces that no external component can drive
/// state directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionState {
    mode: Mode,
    active_app: Option<String>,
}

impl InteractionState {
    /// Fresh state: `normal` mode, no focused application.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current interaction mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Name of the focused application, if any. This is a lookup key into
    /// the per-application override sets, not an owning handle.
    pub fn active_app(&self) -> Option<&str> {
        self.active_app.as_deref()
    }

    /// Apply a declared transition. Total: re-entering the current mode or
    /// clearing an already-empty focus is a no-op.
    pub(crate) fn apply(&mut self, transition: &StateTransition) {
        if let Some(mode) = transition.mode
            && mode != self.mode
        {
            tracing::info!(from = %self.mode, to = %mode, "mode change");
            self.mode = mode;
        }
        match &transition.focus {
            Some(FocusChange::Set(app)) => {
                if self.active_app.as_deref() != Some(app.as_str()) {
                    tracing::info!(app = %app, "active application set");
                    self.active_app = Some(app.clone());
                }
            }
            Some(FocusChange::Clear) => {
                if self.active_app.take().is_some() {
                    tracing::info!("active application cleared");
                }
            }
            None => {}
        }
    }
}
