//! Parse errors.
//!
//! A pattern that does not match is not an error; it is reported through
//! [`ParseOutcome::matched`](crate::ParseOutcome::matched). The variants
//! here cover a broken engine program and misuse of the rule registry.

use spindle_vm::EngineError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// A rule id that was never handed out by this grammar.
    #[error("rule #{id} is not declared in this grammar")]
    UnknownRule { id: usize },

    #[error("rule '{name}' is already defined")]
    RuleRedefined { name: String },
}
