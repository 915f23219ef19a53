//! Spindle engine: executes instruction lists without native recursion.
//!
//! The engine keeps two explicit stacks:
//! - a frame stack of `(instruction list, instruction pointer)` pairs, one
//!   per active call
//! - a context stack of payloads, the channel between nested calls
//!
//! An EXEC closure can [`CallStack::splice`] a sub-program: the engine
//! runs it (and any further splices issued by the same closure, in issue
//! order) before control passes the EXEC. This is how nested calls are
//! expressed without the host call stack.
//!
//! The engine is generic over the payload type `C`.
//!
//! # Usage
//!
//! ```
//! use spindle_vm::{run, InstructionList};
//!
//! let mut callee: InstructionList<u32> = InstructionList::new();
//! callee
//!     .push_context(0)
//!     .exec(|_, n| *n = 5)
//!     .pop_context_with(|caller, callee| *caller += *callee)
//!     .pop_list();
//!
//! let callee = std::cell::RefCell::new(Some(callee));
//! let mut root: InstructionList<u32> = InstructionList::new();
//! root.exec(move |calls, _| {
//!     if let Some(list) = callee.borrow_mut().take() {
//!         calls.splice(list);
//!     }
//! })
//! .exec(|_, n| *n *= 10)
//! .pop_list();
//!
//! assert_eq!(run(root, 1).unwrap(), 60);
//! ```

pub mod error;
pub mod execute;
pub mod instruction;
pub mod list;
pub mod machine;

pub use error::EngineError;
pub use instruction::{
    ContextSwitchFn, Direction, ExecFn, Instruction, ListSwitchFn, PredicateFn,
};
pub use list::InstructionList;
pub use machine::{CallStack, ContextStack, Engine, EngineConfig, EngineStats, FrameId};

/// Run `list` on a fresh engine with `payload` as the root context and
/// return the root payload once the frame stack empties.
///
/// # Errors
///
/// Returns [`EngineError`] if the instruction program is malformed.
pub fn run<C>(list: InstructionList<C>, payload: C) -> Result<C, EngineError> {
    Engine::new().run(list, payload)
}
