//! Shared configuration loader for the richdoc toolchain.
//!
//! `defaults/richdoc.default.toml` is embedded into every binary so that docs
//! and runtime behavior stay in sync. Applications layer user-specific files
//! on top of those defaults via [`Loader`] before deserializing into
//! [`RichdocConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use richdoc_convert::ConvertOptions;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/richdoc.default.toml");

/// Top-level configuration consumed by richdoc applications.
#[derive(Debug, Clone, Deserialize)]
pub struct RichdocConfig {
    pub convert: ConvertConfig,
    pub editor: EditorConfig,
}

/// Format-specific conversion knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    pub markdown: MarkdownConfig,
}

/// Mirrors the knobs exposed by the conversion pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub typographer: bool,
    pub diagram_language: String,
    pub badge_hosts: Vec<String>,
}

impl From<MarkdownConfig> for ConvertOptions {
    fn from(config: MarkdownConfig) -> Self {
        ConvertOptions {
            diagram_language: config.diagram_language,
            badge_hosts: config.badge_hosts,
            typographer: config.typographer,
        }
    }
}

impl From<&MarkdownConfig> for ConvertOptions {
    fn from(config: &MarkdownConfig) -> Self {
        ConvertOptions {
            diagram_language: config.diagram_language.clone(),
            badge_hosts: config.badge_hosts.clone(),
            typographer: config.typographer,
        }
    }
}

/// Paste and clipboard behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    pub origin_marker: String,
    pub unwrap_pasted_fences: bool,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<RichdocConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<RichdocConfig, ConfigError> {
    Loader::new().build()
}
