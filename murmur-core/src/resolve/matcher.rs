//! Two-phase approximate matching against a command set.
//!
//! Phase one scores the transcript against cached trigger vectors by
//! cosine similarity; phase two falls back to lexical token overlap when
//! no vectors exist or the dense maximum falls short of the threshold.
//! Both phases share the threshold and the tie-break rule: the command
//! declared first in the set wins.

use crate::embeddings::{Embedder, cosine_similarity};
use crate::registry::CommandSet;
use crate::text::token_set_ratio;
use crate::types::CommandDef;

/// Best `(command, score)` across every trigger of every
/// similarity-visible command in `set`, or `None` when nothing reaches
/// the threshold.
pub(crate) fn best_match<'a>(
    text: &str,
    set: &'a CommandSet,
    embedder: Option<&dyn Embedder>,
    threshold: f32,
) -> Option<(&'a CommandDef, f32)> {
    if let (Some(embedder), Some(index)) = (embedder, set.index()) {
        let query = embedder.embed(text);
        if let Some((cmd, score)) = scan(set, |trigger| {
            index
                .vector(trigger)
                .map(|v| cosine_similarity(&query, v))
                .unwrap_or(0.0)
        }) && score >= threshold
        {
            tracing::debug!(command = %cmd.id, score, "dense match");
            return Some((cmd, score));
        }
    }

    let (cmd, score) = scan(set, |trigger| token_set_ratio(text, trigger))?;
    if score >= threshold {
        tracing::debug!(command = %cmd.id, score, "lexical match");
        Some((cmd, score))
    } else {
        None
    }
}

/// Track the maximum score over all triggers. Strict `>` keeps the first
/// command on ties.
fn scan<'a>(
    set: &'a CommandSet,
    score_fn: impl Fn(&str) -> f32,
) -> Option<(&'a CommandDef, f32)> {
    let mut best: Option<(&CommandDef, f32)> = None;
    for cmd in set.commands() {
        // Mode-tagged commands are reachable only through the mode gate.
        if cmd.mode.is_some() {
            continue;
        }
        for trigger in &cmd.triggers {
            let score = score_fn(trigger);
            if best.is_none_or(|(_, b)| score > b) {
                best = Some((cmd, score));
            }
        }
    }
    best
}
