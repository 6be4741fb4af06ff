//! Output side of the rewriter.

use std::io::{self, Write};

use serde::Deserialize;

/// Line terminator written after each output record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// The host platform's terminator.
    #[default]
    Native,
    /// `\n`
    Lf,
    /// `\r\n`
    Crlf,
}

impl LineEnding {
    /// Parse a line ending from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "native" => Some(Self::Native),
            "lf" => Some(Self::Lf),
            "crlf" => Some(Self::Crlf),
            _ => None,
        }
    }

    /// The terminator bytes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native if cfg!(windows) => "\r\n",
            Self::Native | Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

impl std::fmt::Display for LineEnding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineEnding::Native => write!(f, "native"),
            LineEnding::Lf => write!(f, "lf"),
            LineEnding::Crlf => write!(f, "crlf"),
        }
    }
}

/// Writes fast-import records to an output channel.
#[derive(Debug)]
pub struct StreamWriter<W: Write> {
    inner: W,
    line_ending: LineEnding,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(inner: W, line_ending: LineEnding) -> Self {
        Self { inner, line_ending }
    }

    /// Writes `line` followed by the configured terminator.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(self.line_ending.as_str().as_bytes())
    }

    /// Writes an empty line.
    pub fn blank_line(&mut self) -> io::Result<()> {
        self.write_line("")
    }

    /// Direct access to the channel for raw payload bytes.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
