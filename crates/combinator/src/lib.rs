//! Spindle combinators: backtracking pattern matching over a token stream.
//!
//! Patterns are plain descriptions. Running one hands instruction lists to
//! the spindle engine, which nests the attempts on its own frame and
//! context stacks instead of the host call stack, so deeply nested or
//! recursive grammars do not overflow the stack.
//!
//! Leaves: [`Pattern::char`], [`Pattern::string`], [`Pattern::range`],
//! [`Pattern::any`], [`Pattern::end_of_file`], [`Pattern::success`],
//! [`Pattern::failure`], [`Pattern::echo`], [`Pattern::custom`].
//!
//! Compounds: [`Pattern::sequence`], [`Pattern::or`], [`Pattern::optional`],
//! [`Pattern::at`], [`Pattern::zero_or_more`], [`Pattern::one_or_more`],
//! [`Pattern::until`], [`Pattern::until_with`].
//!
//! Failure is never an error. A pattern that does not match restores the
//! stream and drops whatever it consumed; the outcome is reported through
//! [`ParseOutcome::matched`].
//!
//! # Example
//!
//! ```
//! use spindle_combinator::{parse_str, Pattern};
//!
//! let digits = Pattern::one_or_more(Pattern::range([(b'0', b'9')]));
//! let number = Pattern::sequence([
//!     Pattern::optional(Pattern::char(b'-')),
//!     digits,
//! ]);
//!
//! let out = parse_str(&number, "-42").unwrap();
//! assert!(out.matched);
//! assert_eq!(out.tokens.bytes(), b"-42");
//!
//! assert!(!parse_str(&number, "x").unwrap().matched);
//! ```

mod compose;
pub mod error;
pub mod grammar;
mod leaf;
pub mod match_data;
pub mod parse;
pub mod pattern;

pub use error::ParseError;
pub use grammar::{Grammar, RuleId};
pub use match_data::MatchData;
pub use parse::{parse, parse_str, parse_with, ParseOptions, ParseOutcome};
pub use pattern::{Action, CustomFn, Pattern};
