//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/querytree/querytree.toml`
//! 3. Local config: `<dir>/.querytree.toml`
//! 4. Environment variables: `QUERYTREE_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{Equivalence, ParenPolicy, DEFAULT_MAX_DEPTH, UNIVERSAL_FEATURES};

/// How candidates of one generation are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupStrategy {
    /// Linear equality scan over accepted trees
    #[default]
    Linear,
    /// Hash set of canonical forms
    Hashed,
}

/// Bounds and dedup behaviour of the generation expander.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Largest generation count a single request may ask for
    pub max_generations: usize,
    /// Largest number of trees one generation may hold
    pub max_frontier: usize,
    pub equivalence: Equivalence,
    pub dedup: DedupStrategy,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_generations: 12,
            max_frontier: 250_000,
            equivalence: Equivalence::Ordered,
            dedup: DedupStrategy::Linear,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Handling of `)` without a matching `(`
    pub unbalanced: ParenPolicy,
}

/// Query language configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueryConfig {
    /// Morphological feature names accepted as restriction keys
    pub features: Vec<String>,
    /// Deepest parenthesis nesting a query may use
    pub max_depth: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            features: UNIVERSAL_FEATURES.iter().map(|f| f.to_string()).collect(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Raw expansion config for intermediate parsing (None means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawExpansionConfig {
    pub max_generations: Option<usize>,
    pub max_frontier: Option<usize>,
    pub equivalence: Option<Equivalence>,
    pub dedup: Option<DedupStrategy>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTokenizerConfig {
    pub unbalanced: Option<ParenPolicy>,
}

/// Raw query config; `features` is Option to tell "not specified" from `[]`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawQueryConfig {
    pub features: Option<Vec<String>>,
    pub max_depth: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub expansion: RawExpansionConfig,
    pub tokenizer: RawTokenizerConfig,
    pub query: RawQueryConfig,
}

impl ExpansionConfig {
    fn merge(&self, overlay: &RawExpansionConfig) -> Self {
        Self {
            max_generations: overlay.max_generations.unwrap_or(self.max_generations),
            max_frontier: overlay.max_frontier.unwrap_or(self.max_frontier),
            equivalence: overlay.equivalence.unwrap_or(self.equivalence),
            dedup: overlay.dedup.unwrap_or(self.dedup),
        }
    }
}

impl QueryConfig {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    ///
    /// ```ignore
    /// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for item in overlay {
            if let Some(negated) = item.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(item.clone());
            }
        }

        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    /// Union merge used for local config.
    pub fn merge(&self, overlay: &RawQueryConfig) -> Self {
        Self {
            features: overlay
                .features
                .as_ref()
                .map(|o| Self::merge_array(&self.features, o))
                .unwrap_or_else(|| self.features.clone()),
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
        }
    }

    /// Replace semantics used for global config: a global list is the new baseline.
    pub fn apply_global(&self, global: &RawQueryConfig) -> Self {
        Self {
            features: global
                .features
                .clone()
                .unwrap_or_else(|| self.features.clone()),
            max_depth: global.max_depth.unwrap_or(self.max_depth),
        }
    }
}

/// Unified configuration for querytree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub expansion: ExpansionConfig,
    pub tokenizer: TokenizerConfig,
    pub query: QueryConfig,
}

/// Get the XDG config directory for querytree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "querytree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("querytree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".querytree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge overlay config onto self: scalars replace, feature lists union.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            expansion: self.expansion.merge(&overlay.expansion),
            tokenizer: TokenizerConfig {
                unbalanced: overlay
                    .tokenizer
                    .unbalanced
                    .unwrap_or(self.tokenizer.unbalanced),
            },
            query: self.query.merge(&overlay.query),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            query: self.query.apply_global(&global.query),
            ..self.merge_with(&RawSettings {
                query: RawQueryConfig::default(),
                ..global.clone()
            })
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.querytree.toml`
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with `!item` negation
    /// - Any → Env vars: REPLACE
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("loading local config {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        Ok(current)
    }

    /// Apply QUERYTREE_* environment variables as explicit overrides.
    ///
    /// Nested keys use `__`, e.g. `QUERYTREE_EXPANSION__MAX_GENERATIONS=8`.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("QUERYTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("query.features"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Some(val) = env_value(&config, "expansion.max_generations")? {
            settings.expansion.max_generations = val;
        }
        if let Some(val) = env_value(&config, "expansion.max_frontier")? {
            settings.expansion.max_frontier = val;
        }
        if let Some(val) = env_value(&config, "expansion.equivalence")? {
            settings.expansion.equivalence = val;
        }
        if let Some(val) = env_value(&config, "expansion.dedup")? {
            settings.expansion.dedup = val;
        }
        if let Some(val) = env_value(&config, "tokenizer.unbalanced")? {
            settings.tokenizer.unbalanced = val;
        }
        if let Some(val) = env_value(&config, "query.features")? {
            settings.query.features = val;
        }
        if let Some(val) = env_value(&config, "query.max_depth")? {
            settings.query.max_depth = val;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.expansion.max_frontier == 0 {
            return Err(ApplicationError::Config {
                message: "expansion.max_frontier must be at least 1".to_string(),
            });
        }
        if self.query.max_depth == 0 {
            return Err(ApplicationError::Config {
                message: "query.max_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# querytree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/querytree/querytree.toml  (defines your baseline)
#   Local:  <dir>/.querytree.toml               (per-directory additions)
#   Env:    QUERYTREE_* environment variables   (explicit overrides)
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS with global. Use "!item" to REMOVE an inherited item:
#     features = ["Number[psor]", "!Typo"]

[expansion]
# Largest generation count accepted per request
# max_generations = 12

# Largest number of trees a single generation may hold
# max_frontier = 250000

# "ordered": sibling order matters, "unordered": trees equal up to sibling order
# equivalence = "ordered"

# "linear": equality scan, "hashed": hash set of canonical forms
# (prefer "hashed" for large generations, especially with "unordered")
# dedup = "linear"

[tokenizer]
# "preserve": an unmatched ')' keeps spaces joined until a later '('
# "clamp": an unmatched ')' is ignored
# unbalanced = "preserve"

[query]
# Feature names usable as restriction keys (e.g. Case=Gen)
# features = ["Case", "Number", "Gender"]

# Deepest parenthesis nesting accepted in a query
# max_depth = 64
"#
        .to_string()
    }
}

/// Typed lookup that treats a missing key as "not set" but reports bad values.
fn env_value<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
