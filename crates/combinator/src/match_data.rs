//! The match context threaded through every pattern invocation.

use std::fmt;

use spindle_common::{Position, SharedSource, SpanKind, Token, TokenList};

use crate::pattern::Action;

/// Per-attempt state of one pattern invocation.
///
/// A parent creates a child with [`MatchData::child`] and pushes it as the
/// engine's current context; when the child's context is popped its result
/// is folded back into the parent. On success the child's tokens are moved
/// into the parent's list in one piece, on failure they are dropped along
/// with the input they consumed.
pub struct MatchData {
    /// Whether the most recent attempt matched.
    pub matched: bool,
    /// When false, actions and echo output are suppressed (lookahead).
    pub execute_actions: bool,
    /// Position where the attempt began.
    pub start: Option<Position>,
    /// Position just past the last consumed token, set on success.
    pub end: Option<Position>,
    /// Tokens consumed by this attempt, in order.
    pub tokens: TokenList,
    source: SharedSource,

    // Loop state of the compound pattern that owns this context.
    pub(crate) checkpoint: Position,
    pub(crate) mark: Position,
    pub(crate) token_mark: usize,
    pub(crate) step: usize,
}

impl MatchData {
    /// A fresh root context over `source`, with actions enabled.
    pub fn new(source: SharedSource) -> Self {
        let here = source.borrow().save();
        Self {
            matched: false,
            execute_actions: true,
            start: None,
            end: None,
            tokens: TokenList::new(),
            source,
            checkpoint: here,
            mark: here,
            token_mark: 0,
            step: 0,
        }
    }

    /// A fresh context sharing this one's source and action setting.
    pub fn child(&self) -> Self {
        let mut child = Self::new(self.source.clone());
        child.execute_actions = self.execute_actions;
        child
    }

    pub fn source(&self) -> &SharedSource {
        &self.source
    }

    /// Current stream position.
    pub fn save(&self) -> Position {
        self.source.borrow().save()
    }

    /// Rewind (or fast-forward) the stream to `at`.
    pub fn load(&self, at: Position) {
        self.source.borrow_mut().load(at);
    }

    /// Pull the next token from the stream.
    pub fn next_token(&self) -> Token {
        self.source.borrow_mut().pull_token()
    }

    /// True if the next token is the end-of-input marker. Consumes nothing.
    pub fn at_end(&self) -> bool {
        let mut source = self.source.borrow_mut();
        let here = source.save();
        let eof = source.pull_token().is_eof();
        source.load(here);
        eof
    }

    /// Text covered by the consumed tokens. Composite tokens are expanded
    /// by replaying the source.
    pub fn text(&self) -> String {
        let mut bytes = Vec::new();
        for token in &self.tokens {
            match token {
                Token::Byte { byte, .. } => bytes.push(*byte),
                Token::Span(span) => {
                    let text = span.text(&mut *self.source.borrow_mut());
                    bytes.extend_from_slice(text.as_bytes());
                }
                Token::Eof { .. } => {}
            }
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Collapse the consumed tokens into one composite token of `kind`.
    pub fn collapse(&mut self, kind: SpanKind) -> bool {
        self.tokens.collapse(kind)
    }

    /// Record the start of an attempt.
    pub(crate) fn begin(&mut self) {
        let here = self.save();
        self.start = Some(here);
        self.checkpoint = here;
        self.mark = here;
        self.token_mark = self.tokens.len();
        self.step = 0;
    }

    /// Record the start of one iteration of a loop.
    pub(crate) fn begin_iteration(&mut self) {
        self.mark = self.save();
        self.token_mark = self.tokens.len();
        self.matched = false;
    }

    /// True if the stream moved since the current iteration began.
    pub(crate) fn progressed(&self) -> bool {
        self.save() != self.mark
    }

    /// Undo the current iteration: rewind the stream and drop its tokens.
    pub(crate) fn rewind_iteration(&mut self) {
        self.load(self.mark);
        self.tokens.truncate(self.token_mark);
    }

    /// Mark the whole attempt as failed and undo everything it consumed.
    pub(crate) fn fail(&mut self) {
        self.load(self.checkpoint);
        self.tokens.clear();
        self.matched = false;
        self.end = None;
    }

    /// Mark the whole attempt as matched, ending at the current position.
    pub(crate) fn succeed(&mut self) {
        self.matched = true;
        self.end = Some(self.save());
    }

    /// Run `action` against this context if actions are enabled.
    pub(crate) fn fire(&mut self, action: Option<&Action>) {
        if let (true, Some(action)) = (self.execute_actions, action) {
            action(self);
        }
    }

    /// Fold a popped child context into this one. A child that did not
    /// match leaves this context untouched.
    pub(crate) fn absorb(&mut self, child: &mut MatchData) {
        if child.matched {
            self.matched = true;
            self.end = child.end;
            self.tokens.append(&mut child.tokens);
        }
    }
}

impl fmt::Debug for MatchData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchData")
            .field("matched", &self.matched)
            .field("execute_actions", &self.execute_actions)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
