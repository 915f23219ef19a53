//! Ordered lists of produced tokens.

use std::ops::Range;

use crate::token::{SpanKind, SpanToken, Token};

/// An ordered, append-only sequence of tokens.
///
/// Lists are merged wholesale with [`TokenList::append`] and shrunk only
/// by [`TokenList::truncate`] when an attempt is rolled back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Move every token of `other` onto the end of this list, leaving
    /// `other` empty.
    pub fn append(&mut self, other: &mut TokenList) {
        self.tokens.append(&mut other.tokens);
    }

    /// Drop every token past the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.tokens.truncate(len);
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn first(&self) -> Option<&Token> {
        self.tokens.first()
    }

    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    /// The bytes of the plain byte tokens in the list, in order.
    pub fn bytes(&self) -> Vec<u8> {
        self.tokens.iter().filter_map(Token::byte).collect()
    }

    /// Replace the whole list with one composite token of `kind`.
    ///
    /// Returns false (and leaves the list alone) when the list holds no
    /// token that covers input.
    pub fn collapse(&mut self, kind: SpanKind) -> bool {
        self.collapse_range(0..self.tokens.len(), kind)
    }

    /// Replace the contiguous run `range` with one composite token of
    /// `kind`. End-of-input markers inside the run are dropped.
    pub fn collapse_range(&mut self, range: Range<usize>, kind: SpanKind) -> bool {
        if range.start >= range.end || range.end > self.tokens.len() {
            return false;
        }

        let run = &self.tokens[range.clone()];
        let first = run.iter().find(|t| !t.is_eof());
        let last = run.iter().rev().find(|t| !t.is_eof());
        let (start, end) = match (first, last) {
            (Some(first), Some(last)) => (first.position(), last.end_position()),
            _ => return false,
        };

        let span = Token::Span(SpanToken::new(kind, start, end));
        self.tokens.splice(range, std::iter::once(span));
        true
    }

    pub fn into_vec(self) -> Vec<Token> {
        self.tokens
    }
}

impl From<Vec<Token>> for TokenList {
    fn from(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }
}

impl IntoIterator for TokenList {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
