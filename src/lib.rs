//! # fast-rewriter
//!
//! Rewrites a fast-export stream into a fast-import stream, folding bug
//! tracker references from per-commit `property bugs` metadata into the
//! commit messages. This library provides:
//!
//! - A single-pass stream rewriter with bounded memory
//! - Pluggable bug reference matchers
//! - Layered configuration (file, environment, CLI)
//! - Optional tracing-based logging
//!
//! ## Quick Start
//!
//! ```rust
//! use fast_rewriter::stream::{BugPatterns, LineEnding, Rewriter, RewriterOptions};
//!
//! let input = b"commit refs/heads/master\nmark :1\ncommitter A <a@x> 0 +0000\ndata 3\nFix\n";
//! let options = RewriterOptions {
//!     line_ending: LineEnding::Lf,
//!     ..RewriterOptions::default()
//! };
//! let mut output = Vec::new();
//! let summary = Rewriter::new(options, BugPatterns::default())
//!     .run(&input[..], &mut output, std::io::stderr())
//!     .unwrap();
//! assert_eq!(summary.commits, 1);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod parsed_property;
pub mod stream;

// Re-export commonly used types for convenience
pub use config::Config;
pub use models::{Args, RewriterConfig};
pub use stream::{RewriteSummary, Rewriter, RewriterOptions};

/// Core result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
