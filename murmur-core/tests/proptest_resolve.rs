//! Property-based tests for normalization and pipeline determinism.

use proptest::prelude::*;

use murmur_core::{
    CommandRegistry, HashedEmbedder, InteractionState, MurmurConfig, Resolver, text,
};
use std::sync::Arc;

const CONFIG: &str = r#"
[[commands]]
id = "click"
triggers = ["click"]
action = { kind = "click", x = 640, y = 400 }

[[commands]]
id = "screenshot"
triggers = ["take screenshot"]
action = { kind = "keystroke", keys = ["cmd", "shift", "3"] }

[[contexts]]
word = "open"
kind = "open_app"

[[contexts.targets]]
name = "Chrome"
aliases = ["chrome"]
action = { kind = "launch", app = "Google Chrome" }
transition = { focus = { set = "Chrome" } }
"#;

fn resolver() -> Resolver {
    let config = MurmurConfig::from_toml(CONFIG).unwrap();
    let registry =
        CommandRegistry::new(&config, Some(Arc::new(HashedEmbedder::new(64)))).unwrap();
    Resolver::new(registry, &config.matcher)
}

// --- Normalization properties ---

proptest! {
    #[test]
    fn normalize_is_idempotent(input in ".{0,120}") {
        let once = text::normalize(&input);
        prop_assert_eq!(text::normalize(&once), once);
    }

    #[test]
    fn normalize_never_leaves_edge_whitespace(input in ".{0,120}") {
        let normalized = text::normalize(&input);
        prop_assert_eq!(normalized.trim(), normalized.as_str());
        prop_assert!(!normalized.contains("  "));
    }

    #[test]
    fn token_ratio_is_symmetric_and_bounded(
        a in "[a-z ]{0,60}",
        b in "[a-z ]{0,60}",
    ) {
        let forward = text::token_set_ratio(&a, &b);
        let backward = text::token_set_ratio(&b, &a);
        prop_assert_eq!(forward, backward);
        prop_assert!((0.0..=1.0).contains(&forward));
    }
}

// --- Pipeline properties ---

proptest! {
    #[test]
    fn resolution_never_panics(input in ".{0,200}") {
        let resolver = resolver();
        let mut state = InteractionState::new();
        let _ = resolver.resolve(&input, &mut state);
    }

    #[test]
    fn resolution_is_deterministic(input in "[a-z ]{0,80}") {
        let resolver = resolver();

        let mut first = InteractionState::new();
        let mut second = InteractionState::new();
        let a = resolver.resolve(&input, &mut first);
        let b = resolver.resolve(&input, &mut second);

        prop_assert_eq!(a, b);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn interim_scoring_never_mutates_state(input in ".{0,120}") {
        let resolver = resolver();
        let state = InteractionState::new();
        let _ = resolver.resolve_interim(&input, &state);
        prop_assert_eq!(state, InteractionState::new());
    }
}
