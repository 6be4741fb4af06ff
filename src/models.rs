use crate::{
    config::Config,
    error::{ConfigError, RewriterError},
    parsed_property::ParsedProperty,
    stream::{
        BugPatterns, DEFAULT_CHUNK_SIZE, LineEnding, RewriteSummary, Rewriter, RewriterOptions,
        matcher::{DEFAULT_MESSAGE_BUG_PATTERN, DEFAULT_METADATA_BUG_PATTERN},
    },
};
use anyhow::Result;
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Version string shown by `--version`, including the build's git hash.
pub const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

#[derive(Parser, Clone, Debug, Default)]
#[command(
    name = "fast-rewriter",
    author,
    version,
    long_version = LONG_VERSION,
    about = "Fold bug-tracker metadata from a fast-export stream into commit messages",
    long_about = "Reads a fast-export stream on stdin and writes a fast-import stream on stdout.\n\n\
        Each commit's `property bugs` metadata is scanned for bug references; references\n\
        not already mentioned in the commit message are appended to it. Renames and\n\
        deletes of directories are dropped, reset ref names are sanitized, and blobs\n\
        are passed through unchanged.\n\n\
        Configuration can be provided via CLI arguments, environment variables\n\
        (FAST_REWRITER_*), or a config file (~/.config/fast-rewriter/config.toml).",
    after_help = "EXAMPLES:\n    \
        # Migrate a bzr branch to git\n    \
        bzr fast-export --no-plain --git-branch=master trunk | fast-rewriter | git fast-import\n\n    \
        # Use a different tracker URL\n    \
        fast-rewriter --metadata-bug-pattern 'https://bugs\\.example\\.org/(\\d+)' < in > out"
)]
pub struct Args {
    /// Config file to load instead of ~/.config/fast-rewriter/config.toml
    #[arg(long, help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Create a sample configuration file at ~/.config/fast-rewriter/config.toml
    #[arg(long, help_heading = "Configuration")]
    pub create_config: bool,

    /// Bytes held in memory while copying a raw blob [default: 1024]
    #[arg(long, help_heading = "Stream Options")]
    pub chunk_size: Option<usize>,

    /// Pattern for bug ids already mentioned in a message; group 1 is the id
    #[arg(long, help_heading = "Stream Options")]
    pub message_bug_pattern: Option<String>,

    /// Pattern for bug references in bug metadata; group 1 is the id
    #[arg(long, help_heading = "Stream Options")]
    pub metadata_bug_pattern: Option<String>,

    /// Output line terminator [default: native]
    #[arg(long, value_enum, help_heading = "Stream Options")]
    pub line_ending: Option<LineEnding>,

    /// Fail on a second data block inside a commit instead of skipping it
    #[arg(long, help_heading = "Stream Options")]
    pub strict_data: bool,

    /// Log level: trace, debug, info, warn, error (logging is off by default)
    #[arg(long, help_heading = "Logging")]
    pub log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, help_heading = "Logging")]
    pub log_file: Option<PathBuf>,

    /// Log format: text or json [default: text]
    #[arg(long, help_heading = "Logging")]
    pub log_format: Option<String>,
}

/// Fully resolved rewriter settings, each value tagged with its source.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriterConfig {
    pub chunk_size: ParsedProperty<usize>,
    pub message_bug_pattern: ParsedProperty<String>,
    pub metadata_bug_pattern: ParsedProperty<String>,
    pub line_ending: ParsedProperty<LineEnding>,
    pub strict_data: ParsedProperty<bool>,
}

impl RewriterConfig {
    /// Options for [`crate::stream::Rewriter::new`].
    pub fn rewriter_options(&self) -> RewriterOptions {
        RewriterOptions {
            chunk_size: *self.chunk_size,
            line_ending: *self.line_ending,
            strict_data: *self.strict_data,
        }
    }

    /// Compiles both bug matchers.
    pub fn bug_patterns(&self) -> Result<BugPatterns, ConfigError> {
        BugPatterns::from_patterns(&self.message_bug_pattern, &self.metadata_bug_pattern)
    }

    /// Builds a [`Rewriter`] from these settings and runs it over `input`.
    pub fn rewrite<R, W, D>(
        &self,
        input: R,
        output: W,
        diagnostics: D,
    ) -> Result<RewriteSummary, RewriterError>
    where
        R: BufRead,
        W: Write,
        D: Write,
    {
        let rewriter = Rewriter::new(self.rewriter_options(), self.bug_patterns()?);
        Ok(rewriter.run(input, output, diagnostics)?)
    }
}

impl Args {
    /// Resolve configuration from CLI args, environment variables and config file
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn resolve_config(&self) -> Result<RewriterConfig> {
        // Load from config file (lowest priority)
        let file_config = match &self.config {
            Some(path) => Config::load_from_path(path)?,
            None => Config::load_from_file()?,
        };

        // Load from environment variables
        let env_config = Config::load_from_env();

        let cli_config = Config {
            chunk_size: self
                .chunk_size
                .map(|v| ParsedProperty::Cli(v, v.to_string())),
            message_bug_pattern: self
                .message_bug_pattern
                .as_ref()
                .map(|v| ParsedProperty::Cli(v.clone(), v.clone())),
            metadata_bug_pattern: self
                .metadata_bug_pattern
                .as_ref()
                .map(|v| ParsedProperty::Cli(v.clone(), v.clone())),
            line_ending: self
                .line_ending
                .map(|v| ParsedProperty::Cli(v, v.to_string())),
            // A bare flag can only switch strict mode on
            strict_data: self
                .strict_data
                .then(|| ParsedProperty::Cli(true, "--strict-data".to_string())),
        };

        // Merge configs: file < env < cli
        let merged_config = file_config.merge(env_config).merge(cli_config);

        let resolved = RewriterConfig {
            chunk_size: merged_config
                .chunk_size
                .unwrap_or(ParsedProperty::Default(DEFAULT_CHUNK_SIZE)),
            message_bug_pattern: merged_config
                .message_bug_pattern
                .unwrap_or_else(|| DEFAULT_MESSAGE_BUG_PATTERN.to_string().into()),
            metadata_bug_pattern: merged_config
                .metadata_bug_pattern
                .unwrap_or_else(|| DEFAULT_METADATA_BUG_PATTERN.to_string().into()),
            line_ending: merged_config
                .line_ending
                .unwrap_or(ParsedProperty::Default(LineEnding::Native)),
            strict_data: merged_config
                .strict_data
                .unwrap_or(ParsedProperty::Default(false)),
        };

        if *resolved.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "chunk_size".to_string(),
                message: format!(
                    "must be greater than zero (from {})",
                    resolved.chunk_size.source_name()
                ),
            }
            .into());
        }
        // Surface bad patterns before any input is consumed
        resolved.bug_patterns()?;

        Ok(resolved)
    }
}
