//! `morph.toml` configuration and tracing setup.

use std::path::Path;
use std::sync::Once;

use morph_core::{CopyLevel, ReusePolicy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

mod diagnostics;
mod schema;

pub use diagnostics::{ConfigDiagnostics, ConfigWarning};
pub use schema::json_schema;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level `morph.toml`.
///
/// ```toml
/// [mapping]
/// copy_level = "assignable"
/// reuse = "shared"
/// ignore_null = false
/// strict = false
/// include = []
/// exclude = ["password"]
///
/// [logging]
/// level = "info"
/// json = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct MorphConfig {
    /// Defaults for mapping and copying.
    #[serde(default)]
    pub mapping: MappingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct MappingConfig {
    /// When a source value may be handed to the target unchanged.
    #[serde(default)]
    pub copy_level: CopyLevel,

    /// Whether shared values (objects, lists, maps) may be reused at all.
    #[serde(default)]
    pub reuse: ReusePolicy,

    /// Skip null source values instead of writing them.
    #[serde(default)]
    pub ignore_null: bool,

    /// Fail a copy when a property has no mapping instead of skipping it.
    #[serde(default)]
    pub strict: bool,

    /// When non-empty, only these property names are copied.
    #[serde(default)]
    pub include: Vec<String>,

    /// Property names that are never copied.
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    /// `level` as `EnvFilter` directives. Bare level names match case-insensitively and
    /// `warning` reads as `warn`; anything else passes through untouched.
    pub fn directives(&self) -> String {
        let level = self.level.trim();
        if level.is_empty() {
            return Self::default_level();
        }
        let lowered = match level.to_ascii_lowercase() {
            lowered if lowered == "warning" => "warn".to_owned(),
            lowered => lowered,
        };
        if LEVELS.contains(&lowered.as_str()) {
            lowered
        } else {
            level.to_owned()
        }
    }

    /// The effective filter. `RUST_LOG` is appended to the configured directives; if that does
    /// not parse, `RUST_LOG` alone is tried, then the configured directives, then `info`.
    pub fn env_filter(&self) -> EnvFilter {
        let configured = self.directives();
        let mut candidates = Vec::with_capacity(3);
        if let Some(from_env) = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
        {
            candidates.push(format!("{configured},{from_env}"));
            candidates.push(from_env);
        }
        candidates.push(configured);

        candidates
            .into_iter()
            .find_map(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::default().add_directive(LevelFilter::INFO.into()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` quotes a snippet of the input; keep only the message.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl MorphConfig {
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = read(path.as_ref())?;
        Self::load_from_str(&text)
    }

    /// Load a config and report unknown keys and suspicious values.
    pub fn load_from_str_with_diagnostics(
        text: &str,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let (config, unknown_keys) =
            diagnostics::deserialize_toml_with_unknown_keys::<MorphConfig>(text)?;
        let diagnostics = ConfigDiagnostics {
            unknown_keys,
            warnings: config.warnings(),
        };
        if !diagnostics.is_empty() {
            tracing::debug!(
                target = "morph.config",
                unknown_keys = diagnostics.unknown_keys.len(),
                warnings = diagnostics.warnings.len(),
                "config loaded with diagnostics"
            );
        }
        Ok((config, diagnostics))
    }

    pub fn load_from_path_with_diagnostics(
        path: impl AsRef<Path>,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let text = read(path.as_ref())?;
        Self::load_from_str_with_diagnostics(&text)
    }

    fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings: Vec<ConfigWarning> = self
            .mapping
            .include
            .iter()
            .filter(|name| self.mapping.exclude.contains(name))
            .map(|name| ConfigWarning::IncludedAndExcluded { name: name.clone() })
            .collect();

        if EnvFilter::try_new(self.logging.directives()).is_err() {
            warnings.push(ConfigWarning::LoggingLevelInvalid {
                value: self.logging.level.clone(),
            });
        }
        warnings
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

static TRACING_INIT: Once = Once::new();

/// Install the global `tracing` subscriber (stderr, plain or JSON).
///
/// Safe to call more than once; only the first call has an effect, and it leaves an already
/// installed subscriber alone.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();
        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(filter).with(layer);
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            tracing::debug!(
                target = "morph.config",
                "a global subscriber is already installed"
            );
        }
    });
}
