//! Fast-export to fast-import stream rewriting.
//!
//! - [`reader`]: tokens and length-prefixed payloads over one cursor
//! - [`token`]: keyword classification
//! - [`accumulator`]: buffers one reset/commit and flushes it in order
//! - [`rewriter`]: the driver loop tying them together

pub mod accumulator;
pub mod directories;
pub mod matcher;
pub mod reader;
pub mod record;
pub mod rewriter;
pub mod token;
pub mod writer;

pub use accumulator::{CommitAccumulator, FlushOutcome};
pub use directories::DirectorySet;
pub use matcher::{BugMatch, BugMatcher, BugPatterns, RegexMatcher};
pub use reader::BlockReader;
pub use record::{PendingRecord, RecordKind, RewrittenMessage, rewrite_message};
pub use rewriter::{DEFAULT_CHUNK_SIZE, RewriteSummary, Rewriter, RewriterOptions};
pub use token::Token;
pub use writer::{LineEnding, StreamWriter};
