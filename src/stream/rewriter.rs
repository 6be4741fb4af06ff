//! The driver loop: reads tokens, routes them, and echoes everything else.

use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use super::accumulator::{CommitAccumulator, FlushOutcome};
use super::directories::DirectorySet;
use super::matcher::BugPatterns;
use super::reader::BlockReader;
use super::record::RecordKind;
use super::token::Token;
use super::writer::{LineEnding, StreamWriter};
use crate::error::{StreamError, StreamResult};

/// Default size of the buffer used to copy raw blobs.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Knobs for one rewrite run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriterOptions {
    /// Maximum bytes held in memory while copying a raw blob.
    pub chunk_size: usize,
    /// Terminator written after each output record.
    pub line_ending: LineEnding,
    /// Fail on a second data block inside a record instead of skipping it.
    pub strict_data: bool,
}

impl Default for RewriterOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            line_ending: LineEnding::Native,
            strict_data: false,
        }
    }
}

/// Counters collected over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    pub commits: usize,
    pub resets: usize,
    pub blobs: usize,
    pub blob_bytes: u64,
    pub references_added: usize,
    pub directory_operations_suppressed: usize,
    pub skipped_tokens: usize,
}

impl RewriteSummary {
    fn record_flush(&mut self, outcome: Option<FlushOutcome>) {
        let Some(outcome) = outcome else {
            return;
        };
        match outcome.kind {
            RecordKind::Commit => self.commits += 1,
            RecordKind::Reset => self.resets += 1,
        }
        self.references_added += outcome.references_added;
    }
}

/// Rewrites a fast-export stream into a fast-import stream.
///
/// A rewriter owns the directory set and the live record for a single run;
/// construct a new one per stream.
///
/// # Example
///
/// ```rust
/// use fast_rewriter::stream::{BugPatterns, LineEnding, Rewriter, RewriterOptions};
///
/// let input = b"reset refs/tags/release 1\nfrom :5\n";
/// let options = RewriterOptions {
///     line_ending: LineEnding::Lf,
///     ..RewriterOptions::default()
/// };
/// let mut output = Vec::new();
/// let summary = Rewriter::new(options, BugPatterns::default())
///     .run(&input[..], &mut output, std::io::sink())
///     .unwrap();
///
/// assert_eq!(output, b"reset refs/tags/release_1\nfrom :5\n\n");
/// assert_eq!(summary.resets, 1);
/// ```
#[derive(Debug)]
pub struct Rewriter {
    options: RewriterOptions,
    accumulator: CommitAccumulator,
    directories: DirectorySet,
    summary: RewriteSummary,
}

impl Rewriter {
    pub fn new(options: RewriterOptions, patterns: BugPatterns) -> Self {
        Self {
            options,
            accumulator: CommitAccumulator::new(patterns),
            directories: DirectorySet::new(),
            summary: RewriteSummary::default(),
        }
    }

    /// Consumes `input` to its end, writing the rewritten stream to `output`
    /// and `Skipping: <token>` lines to `diagnostics`.
    pub fn run<R, W, D>(
        mut self,
        input: R,
        output: W,
        mut diagnostics: D,
    ) -> StreamResult<RewriteSummary>
    where
        R: BufRead,
        W: Write,
        D: Write,
    {
        let mut reader = BlockReader::new(input);
        let mut out = StreamWriter::new(output, self.options.line_ending);

        while let Some(line) = reader.read_token()? {
            self.dispatch(&line, &mut reader, &mut out, &mut diagnostics)?;
        }

        let flushed = self.accumulator.finalize_and_flush(&mut out)?;
        self.summary.record_flush(flushed);
        out.flush()?;
        diagnostics.flush()?;

        info!(
            commits = self.summary.commits,
            resets = self.summary.resets,
            blobs = self.summary.blobs,
            references_added = self.summary.references_added,
            directories = self.directories.len(),
            skipped = self.summary.skipped_tokens,
            "stream rewritten"
        );
        Ok(self.summary)
    }

    fn dispatch<R, W, D>(
        &mut self,
        line: &str,
        reader: &mut BlockReader<R>,
        out: &mut StreamWriter<W>,
        diagnostics: &mut D,
    ) -> StreamResult<()>
    where
        R: BufRead,
        W: Write,
        D: Write,
    {
        match Token::classify(line)? {
            Token::Ignored => {}
            Token::Reset => {
                let flushed = self.accumulator.begin_reset(line, out)?;
                self.summary.record_flush(flushed);
            }
            Token::Commit => {
                let flushed = self.accumulator.begin_commit(line, out)?;
                self.summary.record_flush(flushed);
            }
            // A reset has nowhere to write commit fields
            Token::Mark | Token::Committer | Token::Author | Token::Merge
                if self.accumulator.is_reset() =>
            {
                self.skip(line, diagnostics)?;
            }
            Token::Mark => self.accumulator.set_mark(line)?,
            Token::Committer => self.accumulator.set_committer(line)?,
            Token::Author => self.accumulator.set_author(line)?,
            Token::From => self.accumulator.set_from(line)?,
            Token::Merge => self.accumulator.set_merge(line)?,
            Token::Data { len } if !self.accumulator.is_active() => {
                self.copy_blob(line, len, reader, out)?;
            }
            Token::Data { len } if self.accumulator.is_reset() => {
                reader.read_bytes(len)?;
                self.skip(line, diagnostics)?;
            }
            Token::Data { len } if self.accumulator.has_message() => {
                if self.options.strict_data {
                    return Err(StreamError::UnexpectedData {
                        token: line.to_string(),
                    });
                }
                // Read past the payload so the next token is in sync.
                reader.read_bytes(len)?;
                self.skip(line, diagnostics)?;
            }
            Token::Data { len } => {
                let payload = reader.read_bytes(len)?;
                self.accumulator.set_message(&payload)?;
            }
            Token::PropertyBugs { len, inline } => {
                let mut metadata = inline.to_string();
                if inline.len() < len {
                    let rest = reader.read_bytes(len - inline.len())?;
                    metadata.push('\n');
                    metadata.push_str(&String::from_utf8_lossy(&rest));
                }
                if self.accumulator.is_reset() {
                    self.skip(line, diagnostics)?;
                } else {
                    self.accumulator.set_bug_metadata(metadata)?;
                }
            }
            Token::ModifyDirectory { path } => {
                if self.directories.insert(path) {
                    debug!(path, "tracking directory");
                }
            }
            Token::Modify => {
                let flushed = self.accumulator.finalize_and_flush(out)?;
                self.summary.record_flush(flushed);
                out.write_line(line)?;
            }
            Token::Rename { source, .. }
                if self.accumulator.is_reset() && !self.directories.contains(source) =>
            {
                self.skip(line, diagnostics)?;
            }
            Token::Delete { path }
                if self.accumulator.is_reset() && !self.directories.contains(path) =>
            {
                self.skip(line, diagnostics)?;
            }
            Token::Rename {
                source,
                destination,
            } => {
                if !self
                    .accumulator
                    .add_rename(line, source, &self.directories)?
                {
                    self.directories.insert(destination);
                    self.summary.directory_operations_suppressed += 1;
                }
            }
            Token::Delete { path } => {
                if !self.accumulator.add_delete(line, path, &self.directories)? {
                    self.summary.directory_operations_suppressed += 1;
                }
            }
            Token::Unknown => self.skip(line, diagnostics)?,
        }
        Ok(())
    }

    /// Echoes a blob outside any commit: header, exact payload, blank line.
    fn copy_blob<R: BufRead, W: Write>(
        &mut self,
        header: &str,
        len: usize,
        reader: &mut BlockReader<R>,
        out: &mut StreamWriter<W>,
    ) -> StreamResult<()> {
        out.write_line(header)?;
        let copied = reader.copy_bytes(len, self.options.chunk_size, out.get_mut())?;
        out.blank_line()?;

        self.summary.blobs += 1;
        self.summary.blob_bytes += copied;
        Ok(())
    }

    fn skip<D: Write>(&mut self, line: &str, diagnostics: &mut D) -> StreamResult<()> {
        warn!(token = line, "skipping unrecognized token");
        writeln!(diagnostics, "Skipping: {}", line)?;
        self.summary.skipped_tokens += 1;
        Ok(())
    }
}
