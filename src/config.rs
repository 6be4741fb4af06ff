//! Configuration management for fast-rewriter.
//!
//! This module handles loading configuration from multiple sources:
//! - TOML configuration files following XDG Base Directory specification
//! - Environment variables (`FAST_REWRITER_*`)
//!
//! CLI flags are layered on top in [`crate::models::Args::resolve_config`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use fast_rewriter::Config;
//!
//! // Load configuration from file, with fallback to defaults
//! let config = Config::load_from_file().unwrap();
//!
//! // Load from environment variables
//! let env_config = Config::load_from_env();
//!
//! // Merge configurations (env takes precedence)
//! let merged = config.merge(env_config);
//! println!("Chunk size: {:?}", merged.chunk_size);
//! ```

use crate::{
    error::ConfigError,
    parsed_property::ParsedProperty,
    stream::{
        DEFAULT_CHUNK_SIZE, LineEnding,
        matcher::{DEFAULT_MESSAGE_BUG_PATTERN, DEFAULT_METADATA_BUG_PATTERN},
    },
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Temporary struct for deserializing TOML configuration
#[derive(Debug, Clone, Deserialize, Default)]
struct ConfigFile {
    pub chunk_size: Option<usize>,
    pub message_bug_pattern: Option<String>,
    pub metadata_bug_pattern: Option<String>,
    pub line_ending: Option<LineEnding>,
    pub strict_data: Option<bool>,
}

/// Rewriter configuration assembled from CLI arguments, environment variables, config file, and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Buffer size used when copying raw blobs.
    pub chunk_size: Option<ParsedProperty<usize>>,
    /// Pattern for bug ids already mentioned in a commit message.
    pub message_bug_pattern: Option<ParsedProperty<String>>,
    /// Pattern for bug references in `property bugs` metadata.
    pub metadata_bug_pattern: Option<ParsedProperty<String>>,
    /// Line terminator for output records.
    pub line_ending: Option<ParsedProperty<LineEnding>>,
    /// Whether a second data block inside a record is fatal.
    pub strict_data: Option<ParsedProperty<bool>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: Some(ParsedProperty::Default(DEFAULT_CHUNK_SIZE)),
            message_bug_pattern: Some(ParsedProperty::Default(
                DEFAULT_MESSAGE_BUG_PATTERN.to_string(),
            )),
            metadata_bug_pattern: Some(ParsedProperty::Default(
                DEFAULT_METADATA_BUG_PATTERN.to_string(),
            )),
            line_ending: Some(ParsedProperty::Default(LineEnding::Native)),
            strict_data: Some(ParsedProperty::Default(false)),
        }
    }
}

impl Config {
    /// Load configuration from the XDG config directory.
    ///
    /// A missing file yields the defaults.
    #[must_use = "this returns the loaded configuration which should be used"]
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Load configuration from an explicit file. Keys absent from the file stay unset.
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        let config_content =
            fs::read_to_string(config_path).map_err(|e| ConfigError::FileReadError {
                path: config_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let config_file: ConfigFile =
            toml::from_str(&config_content).map_err(|e| ConfigError::ParseError {
                path: config_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let path = config_path.to_path_buf();
        Ok(Self {
            chunk_size: config_file
                .chunk_size
                .map(|v| ParsedProperty::File(v, path.clone(), v.to_string())),
            message_bug_pattern: config_file
                .message_bug_pattern
                .map(|v| ParsedProperty::File(v.clone(), path.clone(), v)),
            metadata_bug_pattern: config_file
                .metadata_bug_pattern
                .map(|v| ParsedProperty::File(v.clone(), path.clone(), v)),
            line_ending: config_file
                .line_ending
                .map(|v| ParsedProperty::File(v, path.clone(), v.to_string())),
            strict_data: config_file
                .strict_data
                .map(|v| ParsedProperty::File(v, path.clone(), v.to_string())),
        })
    }

    /// Load configuration from environment variables
    ///
    /// Values that fail to parse are ignored.
    pub fn load_from_env() -> Self {
        Self {
            chunk_size: std::env::var("FAST_REWRITER_CHUNK_SIZE")
                .ok()
                .and_then(|s| s.parse().ok().map(|v| ParsedProperty::Env(v, s))),
            message_bug_pattern: std::env::var("FAST_REWRITER_MESSAGE_BUG_PATTERN")
                .ok()
                .map(|v| ParsedProperty::Env(v.clone(), v)),
            metadata_bug_pattern: std::env::var("FAST_REWRITER_METADATA_BUG_PATTERN")
                .ok()
                .map(|v| ParsedProperty::Env(v.clone(), v)),
            line_ending: std::env::var("FAST_REWRITER_LINE_ENDING")
                .ok()
                .and_then(|s| LineEnding::parse(&s).map(|v| ParsedProperty::Env(v, s))),
            strict_data: std::env::var("FAST_REWRITER_STRICT_DATA").ok().and_then(|s| {
                s.parse::<bool>()
                    .ok()
                    .map(|v| ParsedProperty::Env(v, s.clone()))
            }),
        }
    }

    /// Path of the default config file, `$XDG_CONFIG_HOME/fast-rewriter/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        // Use XDG_CONFIG_HOME if set, otherwise ~/.config
        let config_dir = match std::env::var("XDG_CONFIG_HOME") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".config"),
        };

        Ok(config_dir.join("fast-rewriter").join("config.toml"))
    }

    /// Merge this config with another, preferring values from other when they exist
    pub fn merge(self, other: Self) -> Self {
        Self {
            chunk_size: other.chunk_size.or(self.chunk_size),
            message_bug_pattern: other.message_bug_pattern.or(self.message_bug_pattern),
            metadata_bug_pattern: other.metadata_bug_pattern.or(self.metadata_bug_pattern),
            line_ending: other.line_ending.or(self.line_ending),
            strict_data: other.strict_data.or(self.strict_data),
        }
    }

    /// Create a sample config file at the default location.
    ///
    /// Returns the path of the file.
    #[must_use = "this operation can fail and the result should be checked"]
    pub fn create_sample_config() -> Result<PathBuf> {
        let config_path = Self::default_config_path()?;
        Self::create_sample_config_at(&config_path)?;
        Ok(config_path)
    }

    /// Write the sample config to `config_path`.
    ///
    /// Returns false without touching the file if it already exists.
    pub fn create_sample_config_at(config_path: &Path) -> Result<bool> {
        // Don't overwrite existing config
        if config_path.exists() {
            return Ok(false);
        }

        if let Some(dir) = config_path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| ConfigError::DirectoryCreationError {
                    path: dir.to_path_buf(),
                    message: e.to_string(),
                })?;
            }
        }

        fs::write(config_path, SAMPLE_CONFIG).with_context(|| {
            format!(
                "Failed to write sample config to: {}",
                config_path.display()
            )
        })?;

        Ok(true)
    }
}

const SAMPLE_CONFIG: &str = r#"# fast-rewriter Configuration File
# This file follows the XDG Base Directory specification
# Location: ~/.config/fast-rewriter/config.toml
#
# Every key can also be set with a FAST_REWRITER_* environment variable
# or a command line flag, which take precedence over this file.

# Bytes held in memory while copying a raw blob (optional, defaults to 1024)
chunk_size = 1024

# Pattern for bug ids already mentioned in a commit message.
# The first capture group must be the numeric id.
message_bug_pattern = '[bB]ug\s+([0-9]+)'

# Pattern for bug references in `property bugs` metadata.
# Each match whose id is not already mentioned is appended to the message.
metadata_bug_pattern = 'https://bugzilla\.mozilla\.org/show_bug\.cgi\?id=([0-9]+)'

# Output line terminator: "native", "lf" or "crlf" (optional, defaults to "native")
line_ending = "native"

# Fail on a second data block inside a commit instead of skipping it
# (optional, defaults to false)
strict_data = false
"#;
