//! Buffers one reset or commit at a time and flushes it in canonical order.

use std::io::Write;

use tracing::debug;

use super::directories::DirectorySet;
use super::matcher::BugPatterns;
use super::record::{PendingRecord, RecordKind};
use super::writer::StreamWriter;
use crate::error::{StreamError, StreamResult};

/// What a flush wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushOutcome {
    pub kind: RecordKind,
    pub references_added: usize,
}

/// Holds the live [`PendingRecord`], if any, and writes it out when it ends.
#[derive(Debug)]
pub struct CommitAccumulator {
    pending: Option<PendingRecord>,
    patterns: BugPatterns,
}

impl CommitAccumulator {
    pub fn new(patterns: BugPatterns) -> Self {
        Self {
            pending: None,
            patterns,
        }
    }

    /// Whether a record is currently open.
    pub fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    /// The open record, if any.
    pub fn pending(&self) -> Option<&PendingRecord> {
        self.pending.as_ref()
    }

    /// Whether the open record already holds its message.
    pub fn has_message(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|record| record.message.is_some())
    }

    /// Whether the open record is a reset, which writes only its `from` line.
    pub fn is_reset(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|record| record.kind() == RecordKind::Reset)
    }

    /// Flushes any open record, then opens a reset record.
    pub fn begin_reset<W: Write>(
        &mut self,
        token: &str,
        out: &mut StreamWriter<W>,
    ) -> StreamResult<Option<FlushOutcome>> {
        self.begin(RecordKind::Reset, token, out)
    }

    /// Flushes any open record, then opens a commit record.
    pub fn begin_commit<W: Write>(
        &mut self,
        token: &str,
        out: &mut StreamWriter<W>,
    ) -> StreamResult<Option<FlushOutcome>> {
        self.begin(RecordKind::Commit, token, out)
    }

    fn begin<W: Write>(
        &mut self,
        kind: RecordKind,
        token: &str,
        out: &mut StreamWriter<W>,
    ) -> StreamResult<Option<FlushOutcome>> {
        let flushed = self.finalize_and_flush(out)?;
        self.pending = Some(PendingRecord::new(kind, token));
        Ok(flushed)
    }

    pub fn set_mark(&mut self, token: &str) -> StreamResult<()> {
        set_once(&mut self.record_mut(token)?.mark, token);
        Ok(())
    }

    pub fn set_committer(&mut self, token: &str) -> StreamResult<()> {
        set_once(&mut self.record_mut(token)?.committer, token);
        Ok(())
    }

    pub fn set_author(&mut self, token: &str) -> StreamResult<()> {
        set_once(&mut self.record_mut(token)?.author, token);
        Ok(())
    }

    pub fn set_from(&mut self, token: &str) -> StreamResult<()> {
        set_once(&mut self.record_mut(token)?.from, token);
        Ok(())
    }

    pub fn set_merge(&mut self, token: &str) -> StreamResult<()> {
        set_once(&mut self.record_mut(token)?.merge, token);
        Ok(())
    }

    /// Stores the commit message. Returns false if the record already had one,
    /// in which case the payload is discarded.
    pub fn set_message(&mut self, payload: &[u8]) -> StreamResult<bool> {
        let record = self.record_mut("data")?;
        if record.message.is_some() {
            return Ok(false);
        }
        record.message = Some(String::from_utf8_lossy(payload).into_owned());
        Ok(true)
    }

    pub fn set_bug_metadata(&mut self, metadata: String) -> StreamResult<()> {
        let record = self.record_mut("property bugs")?;
        if record.bug_metadata.is_none() {
            record.bug_metadata = Some(metadata);
        }
        Ok(())
    }

    /// Buffers a file rename. Returns false without touching the record when
    /// `source` is a known directory.
    pub fn add_rename(
        &mut self,
        token: &str,
        source: &str,
        directories: &DirectorySet,
    ) -> StreamResult<bool> {
        if directories.contains(source) {
            return Ok(false);
        }
        self.record_mut(token)?.renames.push(token.to_string());
        Ok(true)
    }

    /// Buffers a file delete. Returns false without touching the record when
    /// `path` is a known directory.
    pub fn add_delete(
        &mut self,
        token: &str,
        path: &str,
        directories: &DirectorySet,
    ) -> StreamResult<bool> {
        if directories.contains(path) {
            return Ok(false);
        }
        self.record_mut(token)?.deletes.push(token.to_string());
        Ok(true)
    }

    /// Rewrites and writes the open record, leaving none open.
    ///
    /// A no-op returning None when nothing is open.
    pub fn finalize_and_flush<W: Write>(
        &mut self,
        out: &mut StreamWriter<W>,
    ) -> StreamResult<Option<FlushOutcome>> {
        let Some(record) = self.pending.take() else {
            return Ok(None);
        };

        let message = match record.kind() {
            RecordKind::Commit => record.rewritten_message(&self.patterns),
            RecordKind::Reset => None,
        };
        record.write_to(out, message.as_ref())?;

        let references_added = message.as_ref().map_or(0, |m| m.references_added);
        debug!(
            ref_line = record.ref_line(),
            references_added,
            renames = record.renames().len(),
            deletes = record.deletes().len(),
            "flushed record"
        );

        Ok(Some(FlushOutcome {
            kind: record.kind(),
            references_added,
        }))
    }

    fn record_mut(&mut self, token: &str) -> StreamResult<&mut PendingRecord> {
        self.pending
            .as_mut()
            .ok_or_else(|| StreamError::NoActiveRecord {
                token: token.to_string(),
            })
    }
}

fn set_once(field: &mut Option<String>, token: &str) {
    if field.is_none() {
        *field = Some(token.to_string());
    }
}
