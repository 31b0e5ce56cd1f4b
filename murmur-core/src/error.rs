//! Error types for the murmur core library.
//!
//! Only load-time configuration errors are fatal: a registry either
//! validates wholesale or is rejected wholesale. Per-transcript
//! resolution never errors; a phrase that matches nothing is an ordinary
//! `None`, and an unreachable embedding backend merely degrades matching
//! to the lexical phase.

use std::path::PathBuf;

/// Top-level error type for the murmur core library.
#[derive(Debug, thiserror::Error)]
pub enum MurmurError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Load-time configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    Parse { message: String },

    #[error("Duplicate command id '{id}' in {scope} command set")]
    DuplicateCommandId { id: String, scope: String },

    #[error("Command '{id}' has no usable trigger phrases")]
    EmptyTriggers { id: String },

    #[error("Duplicate context group for leading word '{word}'")]
    DuplicateGroup { word: String },

    #[error("Alias '{alias}' is claimed twice within context group '{group}'")]
    DuplicateAlias { group: String, alias: String },

    #[error("Alias '{alias}' is ambiguous between context groups '{first}' and '{second}'")]
    AmbiguousAlias {
        alias: String,
        first: String,
        second: String,
    },
}

/// Errors from the embedding backend. Never fatal: the dense matching
/// phase is skipped and resolution continues lexically.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Embedding backend '{provider}' unreachable: {message}")]
    BackendUnavailable { provider: String, message: String },

    #[error("Embedding request failed: {message}")]
    Request { message: String },
}

/// Convenience result alias for murmur operations.
pub type Result<T, E = MurmurError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let err = MurmurError::Config(ConfigError::DuplicateCommandId {
            id: "screenshot".into(),
            scope: "global".into(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Duplicate command id 'screenshot' in global command set"
        );
    }

    #[test]
    fn test_error_display_ambiguous_alias() {
        let err = ConfigError::AmbiguousAlias {
            alias: "chrome".into(),
            first: "open".into(),
            second: "launch".into(),
        };
        assert_eq!(
            err.to_string(),
            "Alias 'chrome' is ambiguous between context groups 'open' and 'launch'"
        );
    }

    #[test]
    fn test_error_display_embedding() {
        let err = MurmurError::Embedding(EmbeddingError::BackendUnavailable {
            provider: "ollama".into(),
            message: "connection refused".into(),
        });
        assert_eq!(
            err.to_string(),
            "Embedding error: Embedding backend 'ollama' unreachable: connection refused"
        );
    }
}
