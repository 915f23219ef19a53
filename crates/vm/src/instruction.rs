//! The instruction set.
//!
//! Nine operations:
//! ```text
//! EXEC                      run a closure against the current payload
//! JMP n / JMP $pc +- n      unconditional jump (absolute / relative)
//! JMP_IF n / JMP_IF $pc +- n
//!                           evaluate a predicate; jump when true,
//!                           otherwise advance by one
//! PUSH_CONTEXT / POP_CONTEXT
//!                           push or pop the context stack
//! PUSH_LIST / POP_LIST      enter a sub-list / return from the current list
//! ```
//!
//! Instructions that own data (a payload or a sub-list) hand it over to
//! the engine when they execute, so each of them can run only once.

use std::fmt;
use std::rc::Rc;

use crate::list::InstructionList;
use crate::machine::CallStack;

/// Closure run by an EXEC instruction.
///
/// It receives the call stack, through which it may splice sub-lists, and
/// the payload of the current context.
pub type ExecFn<C> = Rc<dyn Fn(&mut CallStack<C>, &mut C)>;

/// Predicate evaluated by a conditional jump.
pub type PredicateFn<C> = Rc<dyn Fn(&mut C) -> bool>;

/// Callback run when the context stack switches: `(current, old)`.
///
/// On push, `current` is the freshly pushed payload and `old` the one it
/// replaced. On pop, `current` is the new top and `old` the popped
/// payload.
pub type ContextSwitchFn<C> = Rc<dyn Fn(&mut C, &mut C)>;

/// Callback run when the frame stack switches, with the list that stopped
/// being current.
pub type ListSwitchFn<C> = Rc<dyn Fn(&InstructionList<C>)>;

/// Direction of a relative jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards higher instruction indices.
    Forward,
    /// Towards lower instruction indices.
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// A single engine instruction over context payloads of type `C`.
pub enum Instruction<C> {
    Exec(ExecFn<C>),
    JumpAbsolute(usize),
    JumpRelative {
        delta: usize,
        direction: Direction,
    },
    CondJumpAbsolute {
        target: usize,
        predicate: PredicateFn<C>,
    },
    CondJumpRelative {
        delta: usize,
        direction: Direction,
        predicate: PredicateFn<C>,
    },
    /// `payload` is `None` once the instruction has executed.
    PushContext {
        payload: Option<C>,
        on_switch: Option<ContextSwitchFn<C>>,
    },
    PopContext {
        on_switch: Option<ContextSwitchFn<C>>,
    },
    /// `list` is `None` once the instruction has executed. When
    /// `advance_caller` is set the caller's instruction pointer moves past
    /// this instruction before the sub-list is entered, so control resumes
    /// after the call site.
    PushList {
        list: Option<InstructionList<C>>,
        on_switch: Option<ListSwitchFn<C>>,
        advance_caller: bool,
    },
    PopList {
        on_switch: Option<ListSwitchFn<C>>,
    },
}

impl<C> Instruction<C> {
    pub fn exec<F>(f: F) -> Self
    where
        F: Fn(&mut CallStack<C>, &mut C) + 'static,
    {
        Instruction::Exec(Rc::new(f))
    }

    pub fn cond_jump_absolute<P>(target: usize, predicate: P) -> Self
    where
        P: Fn(&mut C) -> bool + 'static,
    {
        Instruction::CondJumpAbsolute {
            target,
            predicate: Rc::new(predicate),
        }
    }

    pub fn cond_jump_relative<P>(delta: usize, direction: Direction, predicate: P) -> Self
    where
        P: Fn(&mut C) -> bool + 'static,
    {
        Instruction::CondJumpRelative {
            delta,
            direction,
            predicate: Rc::new(predicate),
        }
    }

    pub fn push_context(payload: C) -> Self {
        Instruction::PushContext {
            payload: Some(payload),
            on_switch: None,
        }
    }

    pub fn push_list(list: InstructionList<C>) -> Self {
        Instruction::PushList {
            list: Some(list),
            on_switch: None,
            advance_caller: true,
        }
    }

    pub fn pop_list() -> Self {
        Instruction::PopList { on_switch: None }
    }

    /// Mnemonic used by the disassembler.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Exec(_) => "EXEC",
            Instruction::JumpAbsolute(_) | Instruction::JumpRelative { .. } => "JMP",
            Instruction::CondJumpAbsolute { .. } | Instruction::CondJumpRelative { .. } => {
                "JMP_IF"
            }
            Instruction::PushContext { .. } => "PUSH_CONTEXT",
            Instruction::PopContext { .. } => "POP_CONTEXT",
            Instruction::PushList { .. } => "PUSH_LIST",
            Instruction::PopList { .. } => "POP_LIST",
        }
    }
}

fn fmt_relative(f: &mut fmt::Formatter<'_>, delta: usize, direction: Direction) -> fmt::Result {
    match direction {
        Direction::Forward => write!(f, "$pc + {delta}"),
        Direction::Backward => write!(f, "$pc - {delta}"),
    }
}

impl<C> fmt::Display for Instruction<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())?;
        match self {
            Instruction::JumpAbsolute(target) | Instruction::CondJumpAbsolute { target, .. } => {
                write!(f, " {target}")
            }
            Instruction::JumpRelative { delta, direction }
            | Instruction::CondJumpRelative {
                delta, direction, ..
            } => {
                write!(f, " ")?;
                fmt_relative(f, *delta, *direction)
            }
            Instruction::PushContext { payload: None, .. } => write!(f, " (pushed)"),
            Instruction::PushList { list: Some(list), .. } => {
                write!(f, " [{} instructions]", list.len())
            }
            Instruction::PushList { list: None, .. } => write!(f, " (pushed)"),
            _ => Ok(()),
        }
    }
}

impl<C> fmt::Debug for Instruction<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
