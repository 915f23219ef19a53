//! Byte sources and the token stream over them.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::error::SourceError;
use crate::position::Position;
use crate::token::Token;

/// The contract of a token source.
///
/// `pull_token` never fails: once input is exhausted it keeps returning
/// the end-of-input marker without moving. `load(save())` is O(1) and
/// makes the very next pull return the same token, by value and position,
/// as it would have returned when `save` was called.
pub trait TokenSource {
    /// Return the next token and advance past it.
    fn pull_token(&mut self) -> Token;

    /// Snapshot the current position.
    fn save(&self) -> Position;

    /// Restore a snapshot taken by [`TokenSource::save`] or recorded in a
    /// token.
    fn load(&mut self, at: Position);
}

/// A token source shared by every match context of one parse.
pub type SharedSource = Rc<RefCell<dyn TokenSource>>;

/// Wrap a token source so it can be shared between match contexts.
pub fn shared<S: TokenSource + 'static>(source: S) -> SharedSource {
    Rc::new(RefCell::new(source))
}

/// An in-memory byte source with a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    name: String,
    bytes: Rc<[u8]>,
}

impl Source {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self {
            name: name.into(),
            bytes: Rc::from(bytes),
        }
    }

    /// Read a whole file into memory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| SourceError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::from_bytes(path.display().to_string(), bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A stream of single-byte tokens over a [`Source`].
#[derive(Debug, Clone)]
pub struct TokenStream {
    source: Source,
    cursor: Position,
}

impl TokenStream {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            cursor: Position::START,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn line(&self) -> u32 {
        self.cursor.line
    }

    pub fn column(&self) -> u32 {
        self.cursor.column
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor.offset >= self.source.len()
    }
}

impl TokenSource for TokenStream {
    fn pull_token(&mut self) -> Token {
        let at = self.cursor;
        let Some(&byte) = self.source.bytes().get(at.offset) else {
            return Token::Eof { at };
        };

        self.cursor.offset += 1;
        if byte == b'\n' {
            self.cursor.line += 1;
            self.cursor.column = 1;
        } else {
            self.cursor.column += 1;
        }
        Token::Byte { byte, at }
    }

    fn save(&self) -> Position {
        self.cursor
    }

    fn load(&mut self, at: Position) {
        self.cursor = at;
    }
}

impl From<&str> for TokenStream {
    fn from(text: &str) -> Self {
        Self::new(Source::from_bytes("<input>", text))
    }
}
