//! Classification of fast-export command tokens.

use crate::error::{StreamError, StreamResult};

/// File mode fast-export uses for directory entries in `M` commands.
pub const DIRECTORY_MODE: &str = "040000";

/// A fast-export command token, classified by its leading keyword.
///
/// Variants borrow from the token text; verbatim records are re-read from the
/// original line by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Blank lines, `feature` declarations and `property branch-nick` metadata.
    Ignored,
    /// `reset <ref>`
    Reset,
    /// `commit <ref>`
    Commit,
    /// `mark :<n>`
    Mark,
    /// `committer <ident>`
    Committer,
    /// `author <ident>`
    Author,
    /// `from <commit-ish>`
    From,
    /// `merge <commit-ish>`
    Merge,
    /// `data <len>`, followed by exactly `len` payload bytes.
    Data { len: usize },
    /// `property bugs <len> <text>`; `inline` is the part on the token line.
    PropertyBugs { len: usize, inline: &'a str },
    /// `M 040000 <dataref> <path>`
    ModifyDirectory { path: &'a str },
    /// Any other `M` command.
    Modify,
    /// `R <source> <destination>`
    Rename {
        source: &'a str,
        destination: &'a str,
    },
    /// `D <path>`
    Delete { path: &'a str },
    /// Anything else.
    Unknown,
}

impl<'a> Token<'a> {
    /// Classifies one token line.
    ///
    /// Fails only when a length header cannot be parsed, since the payload
    /// boundary that follows it would be unknown.
    pub fn classify(line: &'a str) -> StreamResult<Self> {
        if line.is_empty() || line.starts_with("feature") || line.starts_with("property branch-nick")
        {
            return Ok(Token::Ignored);
        }

        let (keyword, rest) = line.split_once(' ').unwrap_or((line, ""));
        let token = match keyword {
            "reset" => Token::Reset,
            "commit" => Token::Commit,
            "mark" => Token::Mark,
            "committer" => Token::Committer,
            "author" => Token::Author,
            "from" => Token::From,
            "merge" => Token::Merge,
            "data" => {
                let (len, _) = leading_number(rest).ok_or_else(|| malformed(line))?;
                Token::Data { len }
            }
            "property" => match rest.strip_prefix("bugs ") {
                Some(value) => {
                    let (len, tail) = leading_number(value).ok_or_else(|| malformed(line))?;
                    Token::PropertyBugs {
                        len,
                        inline: tail.strip_prefix(' ').unwrap_or(tail),
                    }
                }
                None => Token::Unknown,
            },
            "M" => {
                let mut parts = rest.splitn(3, ' ');
                let mode = parts.next().unwrap_or_default();
                let _dataref = parts.next();
                if mode == DIRECTORY_MODE {
                    Token::ModifyDirectory {
                        path: parts.next().unwrap_or_default(),
                    }
                } else {
                    Token::Modify
                }
            }
            "R" => {
                let (source, destination) = rest.split_once(' ').unwrap_or((rest, ""));
                Token::Rename {
                    source,
                    destination,
                }
            }
            "D" => Token::Delete { path: rest },
            _ => Token::Unknown,
        };

        // Keywords without an argument are not commands we understand.
        if rest.is_empty() && !matches!(token, Token::Unknown) {
            return Ok(Token::Unknown);
        }
        Ok(token)
    }
}

/// Splits a leading decimal number off `s`.
fn leading_number(s: &str) -> Option<(usize, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let number = s[..end].parse().ok()?;
    Some((number, &s[end..]))
}

fn malformed(line: &str) -> StreamError {
    StreamError::MalformedHeader {
        token: line.to_string(),
    }
}
