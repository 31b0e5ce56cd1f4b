//! Core data types for the murmur resolution engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mouse button for click actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Cursor movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// What a command does when executed.
///
/// The resolver treats this as an opaque payload: it is matched, carried
/// through, and handed to the executor unexamined. The tagged
/// representation lets the executor dispatch exhaustively without runtime
/// type probing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Send a key chord (e.g. `["cmd", "shift", "p"]`).
    Keystroke { keys: Vec<String> },
    /// Click at a screen point.
    Click {
        x: i32,
        y: i32,
        #[serde(default)]
        button: MouseButton,
    },
    /// Launch an application by name.
    Launch { app: String },
    /// Bring an already-running application to the front.
    Focus { app: String },
    /// Type literal text.
    TypeText { text: String },
    /// Move the cursor a fixed distance.
    MoveCursor { direction: Direction, distance: i32 },
    /// Run a shell command.
    Shell { command: String },
}

/// Interaction mode.
///
/// `Normal` is unrestricted. Every other mode restricts matching to the
/// exact allow-list of commands tagged with it; entering and exiting are
/// themselves ordinary commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Normal,
    Dictation,
    Manual,
}

impl Mode {
    /// Whether this is the unrestricted default mode.
    pub fn is_normal(self) -> bool {
        self == Mode::Normal
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Normal => "normal",
            Mode::Dictation => "dictation",
            Mode::Manual => "manual",
        };
        f.write_str(name)
    }
}

/// Change to the focused application carried by a state transition.
///
/// Serializes externally tagged, so TOML accepts both
/// `focus = { set = "Chrome" }` and `focus = "clear"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusChange {
    Set(String),
    Clear,
}

/// State change declared by a command, applied exactly once when the
/// command is accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Mode to enter, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    /// Focused-application change, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<FocusChange>,
}

impl StateTransition {
    /// Transition that only changes the mode.
    pub fn to_mode(mode: Mode) -> Self {
        Self {
            mode: Some(mode),
            focus: None,
        }
    }

    /// Transition that only sets the focused application.
    pub fn focus_app(app: impl Into<String>) -> Self {
        Self {
            mode: None,
            focus: Some(FocusChange::Set(app.into())),
        }
    }

    /// Transition that only clears the focused application.
    pub fn clear_focus() -> Self {
        Self {
            mode: None,
            focus: Some(FocusChange::Clear),
        }
    }
}

/// A single voice command definition.
///
/// Created once when the registry is built from configuration and
/// immutable afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDef {
    /// Unique id within the registry that holds this command.
    pub id: String,
    /// Trigger phrases. Compared and scored after normalization.
    pub triggers: Vec<String>,
    /// Opaque payload for the executor.
    pub action: Action,
    /// When set, the command is reachable only through this mode's exact
    /// allow-list and is invisible to every other matching stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    /// State change applied when this command is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<StateTransition>,
    /// Short confirmation text for the caller's notifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Kind of a context group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    OpenApp,
    CloseApp,
    EnterMode,
    ExitMode,
}

/// One transcript delivered by the transcription source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// The transcribed text, arbitrary casing and punctuation.
    pub text: String,
    /// Transcription confidence (0.0 - 1.0), as reported upstream.
    pub confidence: f32,
    /// Finalized transcripts may resolve to commands; interim ones are
    /// scored for preview only.
    pub is_final: bool,
    /// When the transcript was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Transcript {
    /// A finalized transcript, stamped now.
    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: 1.0,
            is_final: true,
            timestamp: Some(Utc::now()),
        }
    }

    /// An interim (still-updating) transcript, stamped now.
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: 0.0,
            is_final: false,
            timestamp: Some(Utc::now()),
        }
    }
}

/// Outcome of a successful resolution: the winning command's payload plus
/// the confidence that selected it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// Id of the matched command, or a synthesized `word_alias` id for
    /// context-group matches.
    pub command_id: String,
    /// The action payload, passed through unexamined.
    pub action: Action,
    /// 1.0 for exact structural matches, otherwise the best similarity
    /// score (always within [0, 1]).
    pub confidence: f32,
    /// Confirmation text for the caller's notifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// The state transition the pipeline applied for this match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<StateTransition>,
}
