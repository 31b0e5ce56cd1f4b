//! Declarative command configuration.
//!
//! Uses `figment` for layered loading: built-in defaults -> TOML file ->
//! `MURMUR_*` environment variables. The loaded value is a plain data
//! model; all validation happens when a [`CommandRegistry`] is built from
//! it, so a configuration either produces a fully valid registry or is
//! rejected wholesale.
//!
//! [`CommandRegistry`]: crate::registry::CommandRegistry

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::embeddings::EmbeddingConfig;
use crate::error::ConfigError;
use crate::types::{Action, CommandDef, ContextKind, StateTransition};

/// Matcher thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum similarity score for an approximate match.
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f32,
    /// Subtracted from the threshold when scoring interim transcripts.
    #[serde(default = "default_interim_margin")]
    pub interim_margin: f32,
    /// Embedding backend for the dense phase.
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

fn default_match_threshold() -> f32 {
    0.80
}

fn default_interim_margin() -> f32 {
    0.10
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            match_threshold: default_match_threshold(),
            interim_margin: default_interim_margin(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

/// One target reachable through a context group (e.g. the "chrome" and
/// "browser" aliases under "open", both launching Chrome).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextTarget {
    /// Display name of the target application or mode.
    pub name: String,
    /// Exact aliases accepted as the remainder after the leading word.
    pub aliases: Vec<String>,
    /// Action performed when one of the aliases matches.
    pub action: Action,
    /// State change applied on a match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<StateTransition>,
    /// Confirmation text for the caller's notifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// A context group: one leading keyword plus its closed alias table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextGroupDef {
    /// Leading word that selects this group ("open", "start", "stop", ...).
    pub word: String,
    /// What the group's targets are.
    pub kind: ContextKind,
    /// Targets reachable through this group.
    pub targets: Vec<ContextTarget>,
}

/// Commands that apply only while the named application is focused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppOverrideDef {
    #[serde(default)]
    pub commands: Vec<CommandDef>,
}

/// Root configuration: matcher settings plus the declarative registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MurmurConfig {
    /// Matching thresholds and embedding backend.
    #[serde(default)]
    pub matcher: MatcherConfig,
    /// Global commands, in declaration order. Order is significant: it is
    /// the tie-break for similarity matching.
    #[serde(default)]
    pub commands: Vec<CommandDef>,
    /// Context groups keyed by their leading word.
    #[serde(default)]
    pub contexts: Vec<ContextGroupDef>,
    /// Per-application override sets, keyed by case-insensitive app name.
    #[serde(default)]
    pub apps: HashMap<String, AppOverrideDef>,
}

impl MurmurConfig {
    /// Load configuration from a TOML file, layered under `MURMUR_*`
    /// environment variables.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound { path: path.into() });
        }
        Figment::from(Serialized::defaults(MurmurConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("MURMUR_").split("__"))
            .extract()
            .map_err(|e| ConfigError::Parse {
                message: e.to_string(),
            })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FocusChange, Mode};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const FIXTURE: &str = r#"
[matcher]
match_threshold = 0.85

[[commands]]
id = "screenshot"
triggers = ["take screenshot", "capture screen"]
action = { kind = "keystroke", keys = ["cmd", "shift", "3"] }
feedback = "Screenshot taken"

[[commands]]
id = "dictation_enter"
triggers = ["enter"]
action = { kind = "keystroke", keys = ["return"] }
mode = "dictation"

[[contexts]]
word = "open"
kind = "open_app"

[[contexts.targets]]
name = "Chrome"
aliases = ["chrome", "browser"]
action = { kind = "launch", app = "Google Chrome" }
transition = { focus = { set = "Chrome" } }

[apps.cursor]

[[apps.cursor.commands]]
id = "toggle_chat"
triggers = ["toggle chat"]
action = { kind = "keystroke", keys = ["cmd", "l"] }
"#;

    #[test]
    fn test_fixture_parses() {
        let config = MurmurConfig::from_toml(FIXTURE).unwrap();
        assert_eq!(config.matcher.match_threshold, 0.85);
        // Untouched settings keep their defaults.
        assert_eq!(config.matcher.interim_margin, 0.10);
        assert_eq!(config.matcher.embedding.provider, "local");

        assert_eq!(config.commands.len(), 2);
        assert_eq!(config.commands[0].id, "screenshot");
        assert_eq!(config.commands[1].mode, Some(Mode::Dictation));

        assert_eq!(config.contexts.len(), 1);
        let group = &config.contexts[0];
        assert_eq!(group.kind, ContextKind::OpenApp);
        assert_eq!(group.targets[0].aliases, vec!["chrome", "browser"]);
        assert_eq!(
            group.targets[0].transition.as_ref().unwrap().focus,
            Some(FocusChange::Set("Chrome".into()))
        );

        assert_eq!(config.apps["cursor"].commands[0].id, "toggle_chat");
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = MurmurConfig::from_toml("").unwrap();
        assert!(config.commands.is_empty());
        assert!(config.contexts.is_empty());
        assert!(config.apps.is_empty());
        assert_eq!(config.matcher.match_threshold, 0.80);
    }

    #[test]
    fn test_parse_error_reported() {
        let err = MurmurConfig::from_toml("commands = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = MurmurConfig::load(Path::new("/nonexistent/commands.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();

        let config = MurmurConfig::load(file.path()).unwrap();
        assert_eq!(config.matcher.match_threshold, 0.85);
        assert_eq!(config.commands.len(), 2);
    }

    #[test]
    fn test_round_trip() {
        let config = MurmurConfig::from_toml(FIXTURE).unwrap();
        let serialized = toml::to_string(&config).unwrap();
        let reparsed = MurmurConfig::from_toml(&serialized).unwrap();
        assert_eq!(reparsed.commands, config.commands);
        assert_eq!(reparsed.contexts, config.contexts);
    }
}
