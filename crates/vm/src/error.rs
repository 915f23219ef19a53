//! Engine errors.
//!
//! Grammar-level failure never reaches this type: it travels in the
//! context payload. Everything here means the instruction program itself
//! was assembled wrongly. Each error carries the instruction index (`at`)
//! within the list that was executing.

use thiserror::Error;

use crate::instruction::Direction;

/// Fatal conditions that terminate a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A relative jump overflowed the list or underflowed below zero.
    #[error("illegal relative jump {direction} by {delta} at instruction {at} (list length {len})")]
    IllegalRelativeJump {
        at: usize,
        delta: usize,
        direction: Direction,
        len: usize,
    },

    /// An absolute jump targeted an index outside the list.
    #[error("illegal absolute jump to {target} at instruction {at} (list length {len})")]
    IllegalAbsoluteJump { at: usize, target: usize, len: usize },

    /// An instruction needed a context but the context stack was empty.
    #[error("no active context at instruction {at}")]
    NoActiveContext { at: usize },

    /// A PUSH_CONTEXT instruction executed a second time; its payload was
    /// already moved onto the context stack.
    #[error("context payload already pushed at instruction {at}")]
    PayloadAlreadyTaken { at: usize },

    /// A PUSH_LIST instruction executed a second time; its list was
    /// already moved onto the frame stack.
    #[error("instruction list already pushed at instruction {at}")]
    ListAlreadyTaken { at: usize },

    /// Execution fell off the end of a list that has no trailing POP_LIST.
    #[error("instruction pointer {at} ran past the end of a list of length {len}")]
    RanOffEnd { at: usize, len: usize },

    /// The frame stack emptied with contexts other than the root still pushed.
    #[error("{remaining} contexts still pushed when execution finished (expected 1)")]
    UnbalancedContexts { remaining: usize },
}
