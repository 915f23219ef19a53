//! Tokens produced by a token source and by collapsing token runs.

use std::fmt;

use crate::position::Position;
use crate::stream::TokenSource;

/// What a composite token stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    /// A plain grouping of tokens.
    Span,
    /// A source comment.
    Comment,
    /// Input the grammar could not make sense of, with a message.
    Diagnostic(String),
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanKind::Span => write!(f, "Span"),
            SpanKind::Comment => write!(f, "Comment"),
            SpanKind::Diagnostic(msg) => write!(f, "Diagnostic [{msg}]"),
        }
    }
}

/// A composite token covering a contiguous run of input.
///
/// The span does not store its text. [`SpanToken::text`] re-extracts it
/// by replaying the source from `start` up to and including the byte at
/// `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanToken {
    pub kind: SpanKind,
    /// Position of the first covered byte.
    pub start: Position,
    /// Position of the last covered byte.
    pub end: Position,
}

impl SpanToken {
    /// A span from `start` to `end` inclusive. An `end` before `start` is
    /// clamped to `start`, so the span covers one byte.
    pub fn new(kind: SpanKind, start: Position, end: Position) -> Self {
        let end = if end.offset < start.offset { start } else { end };
        Self { kind, start, end }
    }

    /// Number of source bytes covered by the span. Zero if `end` was set
    /// before `start` after construction.
    pub fn len(&self) -> usize {
        (self.end.offset + 1).saturating_sub(self.start.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replay the source between `start` and `end` and return the bytes
    /// as text (invalid UTF-8 is replaced).
    ///
    /// The stream position is restored before returning.
    pub fn text(&self, source: &mut dyn TokenSource) -> String {
        let saved = source.save();
        source.load(self.start);

        let mut bytes = Vec::with_capacity(self.len());
        loop {
            match source.pull_token() {
                Token::Byte { byte, at } => {
                    bytes.push(byte);
                    if at.offset >= self.end.offset {
                        break;
                    }
                }
                _ => break,
            }
        }

        source.load(saved);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// A single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// One byte of input, with the position it was read from.
    Byte { byte: u8, at: Position },
    /// The end-of-input marker. Never real input.
    Eof { at: Position },
    /// A composite token built by [`crate::TokenList::collapse`].
    Span(SpanToken),
}

impl Token {
    /// The position at which this token starts.
    pub fn position(&self) -> Position {
        match self {
            Token::Byte { at, .. } | Token::Eof { at } => *at,
            Token::Span(span) => span.start,
        }
    }

    /// The position of the last byte covered by this token.
    pub fn end_position(&self) -> Position {
        match self {
            Token::Byte { at, .. } | Token::Eof { at } => *at,
            Token::Span(span) => span.end,
        }
    }

    pub fn byte(&self) -> Option<u8> {
        match self {
            Token::Byte { byte, .. } => Some(*byte),
            _ => None,
        }
    }

    pub fn as_span(&self) -> Option<&SpanToken> {
        match self {
            Token::Span(span) => Some(span),
            _ => None,
        }
    }

    pub fn is_byte(&self) -> bool {
        matches!(self, Token::Byte { .. })
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof { .. })
    }

    pub fn is_span(&self) -> bool {
        matches!(self, Token::Span(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Byte { byte, at } => {
                write!(f, "{at}: Byte {:?}", char::from(*byte))
            }
            Token::Eof { at } => write!(f, "{at}: Eof"),
            Token::Span(span) => write!(f, "{}: {} ({} bytes)", span.start, span.kind, span.len()),
        }
    }
}
