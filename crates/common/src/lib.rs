//! Spindle common types: tokens and the byte token stream.
//!
//! This crate provides the token-level collaborators that the spindle
//! engine and combinator library consume:
//!
//! - [`Position`]: a restorable stream snapshot (cursor, line, column)
//! - [`Token`]: a byte, the end-of-input marker, or a composite span
//! - [`SpanToken`] / [`SpanKind`]: composite tokens produced by collapsing
//! - [`TokenList`]: an ordered, append-only list of produced tokens
//! - [`TokenSource`]: the pull/save/load contract of a token source
//! - [`Source`] / [`TokenStream`]: an in-memory byte source and its stream
//! - [`SourceError`]: errors from opening a source
//!
//! # Example
//!
//! ```
//! use spindle_common::{TokenSource, TokenStream};
//!
//! let mut stream = TokenStream::from("ab");
//! let mark = stream.save();
//! assert_eq!(stream.pull_token().byte(), Some(b'a'));
//! stream.load(mark);
//! assert_eq!(stream.pull_token().byte(), Some(b'a'));
//! assert_eq!(stream.pull_token().byte(), Some(b'b'));
//! assert!(stream.pull_token().is_eof());
//! ```

pub mod error;
pub mod position;
pub mod stream;
pub mod token;
pub mod token_list;

// Re-export commonly used types at the crate root.
pub use error::SourceError;
pub use position::Position;
pub use stream::{shared, SharedSource, Source, TokenSource, TokenStream};
pub use token::{SpanKind, SpanToken, Token};
pub use token_list::TokenList;
