//! Immutable command registry: global commands, context groups, and
//! lazily-built per-application override sets.
//!
//! A registry is built once from configuration and is read-only
//! afterward. Validation is eager and wholesale - duplicate ids,
//! unusable triggers, or ambiguous aliases reject the entire
//! configuration, including application override sets that would only be
//! referenced later. The expensive part of an override set (trigger
//! normalization plus its embedding index) is still built lazily, on
//! first reference to the application, and cached for the process
//! lifetime.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::config::{ContextGroupDef, MurmurConfig};
use crate::embeddings::{Embedder, TriggerIndex};
use crate::error::ConfigError;
use crate::text::normalize;
use crate::types::{Action, CommandDef, ContextKind, StateTransition};

/// A closed alias-table entry: exactly one outcome per alias.
#[derive(Debug, Clone)]
pub struct AliasEntry {
    /// Display name of the target application or mode.
    pub target: String,
    /// Action performed when the alias matches.
    pub action: Action,
    /// State change applied on a match.
    pub transition: Option<StateTransition>,
    /// Confirmation text for the caller's notifier.
    pub feedback: Option<String>,
}

/// A context group keyed by its leading word.
#[derive(Debug, Clone)]
pub struct ContextGroup {
    pub word: String,
    pub kind: ContextKind,
    aliases: HashMap<String, AliasEntry>,
}

impl ContextGroup {
    /// Exact lookup of a normalized remainder. No fuzziness here.
    pub fn alias(&self, alias: &str) -> Option<&AliasEntry> {
        self.aliases.get(alias)
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}

/// An ordered command list plus its optional trigger vector cache.
///
/// Both the global registry and each application override set are a
/// `CommandSet`; the similarity matcher works on either.
pub struct CommandSet {
    commands: Vec<CommandDef>,
    index: Option<TriggerIndex>,
}

impl CommandSet {
    /// Normalize triggers and build the trigger index if an embedder is
    /// available. Definitions must already be validated.
    fn build(defs: &[CommandDef], embedder: Option<&dyn Embedder>) -> Self {
        let commands: Vec<CommandDef> = defs
            .iter()
            .map(|def| {
                let mut def = def.clone();
                def.triggers = def.triggers.iter().map(|t| normalize(t)).collect();
                def
            })
            .collect();

        let index = embedder.map(|e| {
            let phrases: Vec<&str> = commands
                .iter()
                .flat_map(|c| c.triggers.iter().map(String::as_str))
                .collect();
            TriggerIndex::build(e, &phrases)
        });

        Self { commands, index }
    }

    /// Commands in declaration order (the similarity tie-break order).
    pub fn commands(&self) -> &[CommandDef] {
        &self.commands
    }

    pub(crate) fn index(&self) -> Option<&TriggerIndex> {
        self.index.as_ref()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl std::fmt::Debug for CommandSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSet")
            .field("commands", &self.commands.len())
            .field("indexed", &self.index.is_some())
            .finish()
    }
}

/// The complete command registry.
pub struct CommandRegistry {
    global: CommandSet,
    groups: HashMap<String, ContextGroup>,
    app_defs: HashMap<String, Vec<CommandDef>>,
    app_cache: RwLock<HashMap<String, Option<Arc<CommandSet>>>>,
    embedder: Option<Arc<dyn Embedder>>,
}

impl CommandRegistry {
    /// Build a registry from configuration. Any configuration error
    /// rejects the whole registry; the engine never starts partially
    /// valid.
    pub fn new(
        config: &MurmurConfig,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Result<Self, ConfigError> {
        validate_commands(&config.commands, "global")?;
        let groups = build_groups(&config.contexts)?;

        let mut app_defs = HashMap::new();
        for (name, overrides) in &config.apps {
            validate_commands(&overrides.commands, name)?;
            app_defs.insert(name.to_lowercase(), overrides.commands.clone());
        }

        let global = CommandSet::build(&config.commands, embedder.as_deref());
        if embedder.is_none() {
            tracing::warn!("no embedding backend, dense matching disabled");
        }
        tracing::info!(
            commands = global.len(),
            groups = groups.len(),
            apps = app_defs.len(),
            "command registry loaded"
        );

        Ok(Self {
            global,
            groups,
            app_defs,
            app_cache: RwLock::new(HashMap::new()),
            embedder,
        })
    }

    /// The global command set.
    pub fn global(&self) -> &CommandSet {
        &self.global
    }

    /// Global commands in declaration order.
    pub fn commands(&self) -> &[CommandDef] {
        self.global.commands()
    }

    /// Context group for a normalized leading word.
    pub fn group(&self, word: &str) -> Option<&ContextGroup> {
        self.groups.get(word)
    }

    pub(crate) fn embedder(&self) -> Option<&dyn Embedder> {
        self.embedder.as_deref()
    }

    /// Override set for an application, by case-insensitive name.
    ///
    /// Built on first reference and cached for the process lifetime;
    /// `None` (no configuration for that name) is not an error and is
    /// cached too.
    pub fn app_overrides(&self, name: &str) -> Option<Arc<CommandSet>> {
        let key = name.to_lowercase();

        if let Some(cached) = self
            .app_cache
            .read()
            .expect("app override cache poisoned")
            .get(&key)
        {
            return cached.clone();
        }

        let built = self.app_defs.get(&key).map(|defs| {
            tracing::info!(app = %key, commands = defs.len(), "building application override set");
            Arc::new(CommandSet::build(defs, self.embedder.as_deref()))
        });
        self.app_cache
            .write()
            .expect("app override cache poisoned")
            .insert(key, built.clone());
        built
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("global", &self.global)
            .field("groups", &self.groups.len())
            .field("apps", &self.app_defs.len())
            .finish()
    }
}

/// Reject duplicate ids and unusable trigger lists.
fn validate_commands(defs: &[CommandDef], scope: &str) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for def in defs {
        if !seen.insert(def.id.as_str()) {
            return Err(ConfigError::DuplicateCommandId {
                id: def.id.clone(),
                scope: scope.into(),
            });
        }
        if def.triggers.is_empty() || def.triggers.iter().any(|t| normalize(t).is_empty()) {
            return Err(ConfigError::EmptyTriggers { id: def.id.clone() });
        }
    }
    Ok(())
}

/// Build the context groups, rejecting duplicate aliases within a group
/// and aliases claimed by two groups of the same kind. Symmetric groups
/// of different kinds (enter/exit, open/close) may share aliases.
fn build_groups(
    defs: &[ContextGroupDef],
) -> Result<HashMap<String, ContextGroup>, ConfigError> {
    let mut groups = HashMap::new();
    let mut claimed: HashMap<(ContextKind, String), String> = HashMap::new();

    for def in defs {
        let word = normalize(&def.word);
        if groups.contains_key(&word) {
            return Err(ConfigError::DuplicateGroup { word });
        }

        let mut aliases = HashMap::new();
        for target in &def.targets {
            for alias in &target.aliases {
                let alias = normalize(alias);
                let entry = AliasEntry {
                    target: target.name.clone(),
                    action: target.action.clone(),
                    transition: target.transition.clone(),
                    feedback: target.feedback.clone(),
                };
                if aliases.insert(alias.clone(), entry).is_some() {
                    return Err(ConfigError::DuplicateAlias {
                        group: word,
                        alias,
                    });
                }
                if let Some(first) = claimed.insert((def.kind, alias.clone()), word.clone()) {
                    return Err(ConfigError::AmbiguousAlias {
                        alias,
                        first,
                        second: word,
                    });
                }
            }
        }

        groups.insert(
            word.clone(),
            ContextGroup {
                word,
                kind: def.kind,
                aliases,
            },
        );
    }

    Ok(groups)
}
