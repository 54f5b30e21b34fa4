use crate::record::Format;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoContext {
    pub byte_pos: u64,
    pub line_num: u64,
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("expected header '{expected}' at start of record")]
    MissingHeader { expected: char },
    #[error("found FASTA header '>' where FASTQ '@' expected")]
    FastaHeaderDetected,
    #[error("found FASTQ header '@' where FASTA '>' expected")]
    FastqHeaderDetected,
    #[error("missing '+' separator line")]
    MissingPlus,
    #[error("unexpected EOF inside record")]
    UnexpectedEof,
    #[error("empty record identifier")]
    EmptyId,
    #[error("header line is not valid UTF-8")]
    InvalidHeader,
    #[error("cannot write a {found} record to {expected} output")]
    RecordMismatch { expected: Format, found: Format },
}

/// Malformed filter pattern. Offsets are byte positions in the pattern text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("pattern is empty")]
    Empty,
    #[error("pattern ends unexpectedly")]
    UnexpectedEnd,
    #[error("unexpected token '{token}' at offset {offset}")]
    UnexpectedToken { token: String, offset: usize },
    #[error("unterminated literal starting at offset {offset}")]
    UnterminatedLiteral { offset: usize },
    #[error("unmatched ')' at offset {offset}")]
    UnmatchedClose { offset: usize },
    #[error("'(' at offset {offset} is never closed")]
    UnclosedParen { offset: usize },
    #[error("pattern nests deeper than {limit} levels at offset {offset}")]
    TooDeep { limit: usize, offset: usize },
}

#[derive(Debug, Error)]
pub enum FastxError {
    #[error("I/O error at {ctx:?}: {source}")]
    Io {
        #[source]
        source: io::Error,
        ctx: IoContext,
    },
    #[error("format error at {ctx:?}: {source}")]
    Format {
        #[source]
        source: FormatError,
        ctx: IoContext,
    },
    #[error("cannot open '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write to {sink}: {source}")]
    Write {
        sink: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid filter pattern: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("invalid split policy: {0}")]
    Policy(String),
}

impl FastxError {
    pub(crate) fn io_err(source: io::Error, ctx: IoContext) -> Self {
        Self::Io { source, ctx }
    }
    pub(crate) fn fmt_err(source: FormatError, ctx: IoContext) -> Self {
        Self::Format { source, ctx }
    }
    pub(crate) fn open_err(source: io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }
    pub(crate) fn write_err(source: io::Error, sink: &str) -> Self {
        Self::Write {
            sink: sink.to_string(),
            source,
        }
    }

    /// True when the failure happened on the output side.
    pub fn is_write_error(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}
