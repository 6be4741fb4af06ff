//! The pending reset/commit record and its message rewrite.

use std::collections::HashSet;
use std::io::{self, Write};

use super::matcher::BugPatterns;
use super::writer::StreamWriter;

/// Which command opened the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Reset,
    Commit,
}

/// A commit message reframed as a `data` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenMessage {
    /// Full message text, original content plus any appended references.
    pub text: String,
    /// Number of bug references appended.
    pub references_added: usize,
}

impl RewrittenMessage {
    /// `data <n>` where `n` is the UTF-8 byte length of the text.
    pub fn header(&self) -> String {
        format!("data {}", self.text.len())
    }

    /// Header, `\n`, then the message text.
    pub fn to_record(&self) -> String {
        format!("{}\n{}", self.header(), self.text)
    }
}

/// Folds bug references from `metadata` into `message`.
///
/// References whose id is already mentioned in the message are skipped. The
/// appended block starts on its own line, separated by a blank line when the
/// message does not already end with a newline.
pub fn rewrite_message(
    message: &str,
    metadata: Option<&str>,
    patterns: &BugPatterns,
) -> RewrittenMessage {
    let Some(metadata) = metadata else {
        return RewrittenMessage {
            text: message.to_string(),
            references_added: 0,
        };
    };

    let mentioned: HashSet<String> = patterns
        .in_message
        .find_all(message)
        .into_iter()
        .map(|m| m.id)
        .collect();

    let mut addendum = String::new();
    let mut references_added = 0;
    for reference in patterns.in_metadata.find_all(metadata) {
        if mentioned.contains(&reference.id) {
            continue;
        }
        if addendum.is_empty() && !message.is_empty() && !message.ends_with('\n') {
            addendum.push('\n');
        }
        addendum.push('\n');
        addendum.push_str(&reference.text);
        references_added += 1;
    }

    RewrittenMessage {
        text: format!("{}{}", message, addendum),
        references_added,
    }
}

/// Fields buffered for one reset or commit until it is flushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRecord {
    kind: RecordKind,
    ref_line: String,
    pub(crate) mark: Option<String>,
    pub(crate) committer: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) from: Option<String>,
    pub(crate) merge: Option<String>,
    pub(crate) message: Option<String>,
    pub(crate) bug_metadata: Option<String>,
    pub(crate) renames: Vec<String>,
    pub(crate) deletes: Vec<String>,
}

impl PendingRecord {
    /// Opens a record from its `reset` or `commit` line.
    pub fn new(kind: RecordKind, ref_line: &str) -> Self {
        Self {
            kind,
            ref_line: ref_line.to_string(),
            mark: None,
            committer: None,
            author: None,
            from: None,
            merge: None,
            message: None,
            bug_metadata: None,
            renames: Vec::new(),
            deletes: Vec::new(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn ref_line(&self) -> &str {
        &self.ref_line
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn bug_metadata(&self) -> Option<&str> {
        self.bug_metadata.as_deref()
    }

    pub fn renames(&self) -> &[String] {
        &self.renames
    }

    pub fn deletes(&self) -> &[String] {
        &self.deletes
    }

    /// The rewritten message, or None when the record never received one.
    pub fn rewritten_message(&self, patterns: &BugPatterns) -> Option<RewrittenMessage> {
        self.message
            .as_deref()
            .map(|message| rewrite_message(message, self.bug_metadata.as_deref(), patterns))
    }

    /// Writes the record in fast-import order.
    pub fn write_to<W: Write>(
        &self,
        out: &mut StreamWriter<W>,
        message: Option<&RewrittenMessage>,
    ) -> io::Result<()> {
        if self.kind == RecordKind::Reset {
            out.write_line(&reset_line(&self.ref_line))?;
            if let Some(from) = &self.from {
                out.write_line(from)?;
            }
            return out.blank_line();
        }

        out.write_line(&self.ref_line)?;
        for line in [&self.mark, &self.author, &self.committer]
            .into_iter()
            .flatten()
        {
            out.write_line(line)?;
        }
        if let Some(message) = message {
            out.write_line(&message.to_record())?;
        }
        for line in [&self.from, &self.merge].into_iter().flatten() {
            out.write_line(line)?;
        }
        for line in self.renames.iter().chain(&self.deletes) {
            out.write_line(line)?;
        }
        Ok(())
    }
}

/// Replaces spaces in the ref name of a `reset` line, which git rejects.
fn reset_line(line: &str) -> String {
    match line.strip_prefix("reset ") {
        Some(name) => format!("reset {}", name.replace(' ', "_")),
        None => line.to_string(),
    }
}
