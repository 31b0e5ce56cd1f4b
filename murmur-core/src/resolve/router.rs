//! First-word context routing against closed alias tables.
//!
//! Matching is exact-string only. A recognized leading word whose
//! remainder is not a known alias does not reject the phrase: the full
//! phrase passes through so the similarity stages can still score it
//! ("open click" may still resolve as a generic "click" command).

use super::StageOutcome;
use crate::registry::CommandRegistry;
use crate::types::Resolution;

/// Route a normalized transcript through the context groups.
pub(crate) fn route(text: &str, registry: &CommandRegistry) -> StageOutcome {
    // A bare leading word carries no alias to look up.
    let Some((word, remainder)) = text.split_once(' ') else {
        return StageOutcome::Pass;
    };
    let Some(group) = registry.group(word) else {
        return StageOutcome::Pass;
    };
    let Some(entry) = group.alias(remainder) else {
        tracing::debug!(group = %word, remainder, "unknown alias, passing through");
        return StageOutcome::Pass;
    };

    tracing::info!(group = %word, target = %entry.target, "context match");
    StageOutcome::Accept(Resolution {
        command_id: format!("{}_{}", word, remainder.replace(' ', "_")),
        action: entry.action.clone(),
        confidence: 1.0,
        feedback: entry.feedback.clone(),
        transition: entry.transition.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContextGroupDef, ContextTarget, MurmurConfig};
    use crate::types::{Action, ContextKind, FocusChange, StateTransition};

    fn registry() -> CommandRegistry {
        let config = MurmurConfig {
            contexts: vec![ContextGroupDef {
                word: "open".into(),
                kind: ContextKind::OpenApp,
                targets: vec![
                    ContextTarget {
                        name: "Chrome".into(),
                        aliases: vec!["chrome".into(), "browser".into()],
                        action: Action::Launch {
                            app: "Google Chrome".into(),
                        },
                        transition: Some(StateTransition::focus_app("Chrome")),
                        feedback: Some("Opening Chrome".into()),
                    },
                    ContextTarget {
                        name: "Activity Monitor".into(),
                        aliases: vec!["activity monitor".into()],
                        action: Action::Launch {
                            app: "Activity Monitor".into(),
                        },
                        transition: None,
                        feedback: None,
                    },
                ],
            }],
            ..Default::default()
        };
        CommandRegistry::new(&config, None).unwrap()
    }

    #[test]
    fn test_exact_alias_accepts() {
        let reg = registry();
        let StageOutcome::Accept(res) = route("open chrome", &reg) else {
            panic!("expected accept");
        };
        assert_eq!(res.confidence, 1.0);
        assert_eq!(res.command_id, "open_chrome");
        assert_eq!(
            res.action,
            Action::Launch {
                app: "Google Chrome".into()
            }
        );
        assert_eq!(
            res.transition.unwrap().focus,
            Some(FocusChange::Set("Chrome".into()))
        );
    }

    #[test]
    fn test_multi_word_alias() {
        let reg = registry();
        let StageOutcome::Accept(res) = route("open activity monitor", &reg) else {
            panic!("expected accept");
        };
        assert_eq!(res.command_id, "open_activity_monitor");
    }

    #[test]
    fn test_near_miss_alias_passes() {
        let reg = registry();
        assert!(matches!(route("open chroome", &reg), StageOutcome::Pass));
    }

    #[test]
    fn test_unknown_leading_word_passes() {
        let reg = registry();
        assert!(matches!(route("launch chrome", &reg), StageOutcome::Pass));
    }

    #[test]
    fn test_bare_leading_word_passes() {
        let reg = registry();
        assert!(matches!(route("open", &reg), StageOutcome::Pass));
    }

    #[test]
    fn test_keyword_prefixed_phrase_passes() {
        // "open click" is not an alias; the full phrase stays available to
        // the similarity stages.
        let reg = registry();
        assert!(matches!(route("open click", &reg), StageOutcome::Pass));
    }
}
