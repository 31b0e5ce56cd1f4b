//! Restricted-mode allow-list gate.

use crate::registry::CommandRegistry;
use crate::types::{Mode, Resolution};

/// Exact allow-list check for a restricted mode.
///
/// Compares the normalized transcript against every trigger of every
/// command tagged with `mode`. A hit is returned at confidence 1.0 with
/// its declared transition (typically back to `normal`). A miss is
/// definitive: the pipeline stops rather than falling through, so the
/// caller may treat the phrase as literal input (dictation typing).
pub(crate) fn check(text: &str, mode: Mode, registry: &CommandRegistry) -> Option<Resolution> {
    for cmd in registry.commands() {
        if cmd.mode != Some(mode) {
            continue;
        }
        if cmd.triggers.iter().any(|t| t == text) {
            tracing::info!(command = %cmd.id, %mode, "allow-list match");
            return Some(Resolution {
                command_id: cmd.id.clone(),
                action: cmd.action.clone(),
                confidence: 1.0,
                feedback: cmd.feedback.clone(),
                transition: cmd.transition.clone(),
            });
        }
    }
    tracing::debug!(%mode, "phrase not on allow-list, ignoring");
    None
}
