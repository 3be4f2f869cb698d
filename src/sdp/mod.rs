//! Session Description Protocol (RFC 4566 / RFC 8866).
//!
//! Parsing is done by a `combine` grammar where every line type has its own rule.
//! Serializing is the [`std::fmt::Display`] impl of the data model, which always
//! writes the lines in the fixed RFC order, CRLF terminated.

use std::fmt;

use combine::easy;
use combine::stream::position::SourcePosition;
use thiserror::Error;

mod data;
pub use data::{AddressType, Attribute, Bandwidth, BandwidthType, Connection, EncryptionKey};
pub use data::{MediaDescription, MediaType, NetworkType, Origin, Proto, RepeatTime};
pub use data::{SessionDescription, Setup, TimeZone, Timing, Version};

mod parser;

/// Parse SDP text into a [`SessionDescription`].
///
/// Both CRLF and bare LF are accepted as line terminators, and the last line
/// may omit its terminator.
pub fn parse(input: &str) -> Result<SessionDescription, SdpParseError> {
    SessionDescription::parse(input)
}

/// Serialize a [`SessionDescription`] to SDP text.
///
/// The output follows the RFC field order and is CRLF terminated. This never fails.
pub fn serialize(sdp: &SessionDescription) -> String {
    sdp.to_string()
}

/// Errors from parsing and validating SDP.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdpError {
    /// The text did not match the SDP grammar.
    #[error("{0}")]
    Parse(#[from] SdpParseError),

    /// The SDP parsed, but is not internally consistent.
    #[error("SDP inconsistent: {0}")]
    Inconsistent(String),
}

/// A failure to parse SDP text.
///
/// Carries the position of the failure and the trace of grammar rules that
/// were attempted there, innermost first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("SDP parse error at line {line}, column {column}: {}", .trace.join("; "))]
pub struct SdpParseError {
    /// 1-based line of the failure.
    pub line: u32,
    /// 1-based column (in characters) of the failure.
    pub column: u32,
    /// Byte offset of the failure into the input.
    pub offset: usize,
    /// Unexpected tokens, expected rules and rule messages.
    pub trace: Vec<String>,
}

impl SdpParseError {
    pub(crate) fn new(input: &str, errors: easy::Errors<char, &str, SourcePosition>) -> Self {
        let SourcePosition { line, column } = errors.position;

        let trace = errors.errors.iter().map(|e| e.to_string()).collect();

        SdpParseError {
            line: line.max(1) as u32,
            column: column.max(1) as u32,
            offset: byte_offset(input, line, column),
            trace,
        }
    }

    /// The trace as it would appear in a log line.
    pub fn trace(&self) -> TraceFmt<'_> {
        TraceFmt(&self.trace)
    }
}

/// Formats a rule trace one entry per line.
pub struct TraceFmt<'a>(&'a [String]);

impl<'a> fmt::Display for TraceFmt<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, t) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "  {t}")?;
        }
        Ok(())
    }
}

// combine counts '\n' as a new line and every other char as one column.
fn byte_offset(input: &str, line: i32, column: i32) -> usize {
    let mut cur_line = 1;
    let mut cur_column = 1;

    for (idx, c) in input.char_indices() {
        if cur_line == line && cur_column == column {
            return idx;
        }
        if c == '\n' {
            cur_line += 1;
            cur_column = 1;
        } else {
            cur_column += 1;
        }
    }

    input.len()
}
