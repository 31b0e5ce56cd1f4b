//! The staged resolution pipeline.
//!
//! One finalized transcript goes in; at most one `(action, confidence)`
//! resolution comes out. Stages run in fixed precedence and each either
//! accepts with a resolution, passes to the next stage, or halts the
//! pipeline outright. Exact structural matches always beat approximate
//! ones because their stages run first.

mod gate;
mod matcher;
mod router;

use crate::config::MatcherConfig;
use crate::registry::{CommandRegistry, CommandSet};
use crate::state::InteractionState;
use crate::text::normalize;
use crate::types::{Resolution, Transcript};

/// Result of one pipeline stage.
#[derive(Debug, Clone)]
pub(crate) enum StageOutcome {
    /// The stage resolved the transcript; stop and return it.
    Accept(Resolution),
    /// The stage has no opinion; try the next one.
    Pass,
    /// Definitive no-match; stop without consulting later stages.
    Halt,
}

/// Pipeline stages in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Restricted-mode allow-list; terminal whenever the mode is not
    /// `normal`.
    ModeGate,
    /// Leading word plus exact alias.
    Context,
    /// Similarity against the focused application's override set.
    Scoped,
    /// Similarity against the global set.
    Global,
}

const STAGES: [Stage; 4] = [Stage::ModeGate, Stage::Context, Stage::Scoped, Stage::Global];

/// Resolves transcripts against a command registry.
///
/// The resolver owns the registry and the matching thresholds; the
/// caller owns the [`InteractionState`] and threads it through each
/// call. Resolution is a pure function of (transcript, state, registry)
/// apart from the single state transition applied on acceptance.
pub struct Resolver {
    registry: CommandRegistry,
    match_threshold: f32,
    interim_margin: f32,
}

impl Resolver {
    pub fn new(registry: CommandRegistry, matcher: &MatcherConfig) -> Self {
        Self {
            registry,
            match_threshold: matcher.match_threshold,
            interim_margin: matcher.interim_margin,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Resolve a finalized transcript.
    ///
    /// An accepted match that declares a state transition applies it
    /// before returning; a no-match never touches state. Noisy or
    /// unintelligible speech is an expected input and yields `None`,
    /// never an error.
    pub fn resolve(&self, transcript: &str, state: &mut InteractionState) -> Option<Resolution> {
        let text = normalize(transcript);
        if text.is_empty() {
            return None;
        }

        for stage in STAGES {
            match self.run_stage(stage, &text, state) {
                StageOutcome::Accept(resolution) => {
                    if let Some(transition) = &resolution.transition {
                        state.apply(transition);
                    }
                    tracing::info!(
                        command = %resolution.command_id,
                        confidence = resolution.confidence,
                        "resolved"
                    );
                    return Some(resolution);
                }
                StageOutcome::Halt => return None,
                StageOutcome::Pass => {}
            }
        }

        tracing::debug!(%text, threshold = self.match_threshold, "no command matched");
        None
    }

    /// Advisory scoring for interim transcripts.
    ///
    /// Runs the similarity stages only, with a leniency margin off the
    /// threshold, and never mutates state. The result is a preview for
    /// the caller's UI; it must not drive the executor.
    pub fn resolve_interim(
        &self,
        transcript: &str,
        state: &InteractionState,
    ) -> Option<Resolution> {
        let text = normalize(transcript);
        if text.is_empty() || !state.mode().is_normal() {
            return None;
        }
        let threshold = (self.match_threshold - self.interim_margin).max(0.0);

        if let Some(app) = state.active_app()
            && let Some(set) = self.registry.app_overrides(app)
            && let Some(resolution) = self.similarity(&text, &set, threshold)
        {
            return Some(resolution);
        }
        self.similarity(&text, self.registry.global(), threshold)
    }

    /// Route a transcript by finality: final transcripts resolve (and may
    /// transition state), interim ones only preview.
    pub fn observe(
        &self,
        transcript: &Transcript,
        state: &mut InteractionState,
    ) -> Option<Resolution> {
        if transcript.is_final {
            self.resolve(&transcript.text, state)
        } else {
            self.resolve_interim(&transcript.text, state)
        }
    }

    fn run_stage(&self, stage: Stage, text: &str, state: &InteractionState) -> StageOutcome {
        match stage {
            Stage::ModeGate => {
                if state.mode().is_normal() {
                    return StageOutcome::Pass;
                }
                match gate::check(text, state.mode(), &self.registry) {
                    Some(resolution) => StageOutcome::Accept(resolution),
                    None => StageOutcome::Halt,
                }
            }
            Stage::Context => router::route(text, &self.registry),
            Stage::Scoped => {
                let Some(app) = state.active_app() else {
                    return StageOutcome::Pass;
                };
                let Some(set) = self.registry.app_overrides(app) else {
                    return StageOutcome::Pass;
                };
                match self.similarity(text, &set, self.match_threshold) {
                    Some(resolution) => StageOutcome::Accept(resolution),
                    None => StageOutcome::Pass,
                }
            }
            Stage::Global => {
                match self.similarity(text, self.registry.global(), self.match_threshold) {
                    Some(resolution) => StageOutcome::Accept(resolution),
                    None => StageOutcome::Pass,
                }
            }
        }
    }

    fn similarity(&self, text: &str, set: &CommandSet, threshold: f32) -> Option<Resolution> {
        let (cmd, score) = matcher::best_match(text, set, self.registry.embedder(), threshold)?;
        Some(Resolution {
            command_id: cmd.id.clone(),
            action: cmd.action.clone(),
            confidence: score,
            feedback: cmd.feedback.clone(),
            transition: cmd.transition.clone(),
        })
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("registry", &self.registry)
            .field("match_threshold", &self.match_threshold)
            .field("interim_margin", &self.interim_margin)
            .finish()
    }
}
