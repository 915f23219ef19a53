//! Fetch-execute loop and instruction dispatch.

use std::rc::Rc;

use crate::error::EngineError;
use crate::instruction::{
    ContextSwitchFn, Direction, ExecFn, Instruction, ListSwitchFn, PredicateFn,
};
use crate::list::InstructionList;
use crate::machine::Engine;

#[derive(Debug, Clone, Copy)]
enum Target {
    Absolute(usize),
    Relative(usize, Direction),
}

impl Target {
    fn is_noop(self) -> bool {
        matches!(self, Target::Relative(0, _))
    }

    /// Resolve against the instruction at `at` in a list of length `len`.
    fn resolve(self, at: usize, len: usize) -> Result<usize, EngineError> {
        match self {
            Target::Absolute(target) if target < len => Ok(target),
            Target::Absolute(target) => Err(EngineError::IllegalAbsoluteJump { at, target, len }),
            Target::Relative(delta, direction) => {
                let dest = match direction {
                    Direction::Forward => at.checked_add(delta).filter(|&t| t < len),
                    Direction::Backward => at.checked_sub(delta),
                };
                dest.ok_or(EngineError::IllegalRelativeJump {
                    at,
                    delta,
                    direction,
                    len,
                })
            }
        }
    }
}

/// An instruction decoded out of its list: shared closures are cloned,
/// owned operands are moved out.
enum Op<C> {
    Exec(ExecFn<C>),
    Jump(Target),
    CondJump(Target, PredicateFn<C>),
    PushContext(C, Option<ContextSwitchFn<C>>),
    PopContext(Option<ContextSwitchFn<C>>),
    PushList(InstructionList<C>, Option<ListSwitchFn<C>>, bool),
    PopList(Option<ListSwitchFn<C>>),
}

fn decode<C>(instr: &mut Instruction<C>, at: usize) -> Result<Op<C>, EngineError> {
    Ok(match instr {
        Instruction::Exec(f) => Op::Exec(Rc::clone(f)),
        Instruction::JumpAbsolute(target) => Op::Jump(Target::Absolute(*target)),
        Instruction::JumpRelative { delta, direction } => {
            Op::Jump(Target::Relative(*delta, *direction))
        }
        Instruction::CondJumpAbsolute { target, predicate } => {
            Op::CondJump(Target::Absolute(*target), Rc::clone(predicate))
        }
        Instruction::CondJumpRelative {
            delta,
            direction,
            predicate,
        } => Op::CondJump(Target::Relative(*delta, *direction), Rc::clone(predicate)),
        Instruction::PushContext { payload, on_switch } => {
            let payload = payload
                .take()
                .ok_or(EngineError::PayloadAlreadyTaken { at })?;
            Op::PushContext(payload, on_switch.clone())
        }
        Instruction::PopContext { on_switch } => Op::PopContext(on_switch.clone()),
        Instruction::PushList {
            list,
            on_switch,
            advance_caller,
        } => {
            let list = list.take().ok_or(EngineError::ListAlreadyTaken { at })?;
            Op::PushList(list, on_switch.clone(), *advance_caller)
        }
        Instruction::PopList { on_switch } => Op::PopList(on_switch.clone()),
    })
}

impl<C> Engine<C> {
    /// Run `list` with `payload` as the root context.
    ///
    /// The list is entered through the splice primitive, the root context
    /// is pushed, and instructions execute until the frame stack is empty.
    /// The root context is then popped and its payload returned.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the program is malformed: a jump out of
    /// range, a list without a trailing POP_LIST, an instruction owning
    /// data that runs twice, or unbalanced context pushes and pops.
    pub fn run(&mut self, list: InstructionList<C>, payload: C) -> Result<C, EngineError> {
        self.calls.reset();
        self.contexts.clear();
        log::debug!("run: root list of {} instructions", list.len());

        self.calls.splice(list);
        self.contexts.push(payload, None);
        self.calls.stats.peak_contexts = 1;

        while !self.calls.frames.is_empty() {
            self.step()?;
        }

        let remaining = self.contexts.depth();
        if remaining > 1 {
            return Err(EngineError::UnbalancedContexts { remaining });
        }
        let root = self.contexts.pop_current(None, 0)?;

        let stats = self.calls.stats;
        log::debug!(
            "run: finished after {} steps ({} splices, peak depth {} frames / {} contexts)",
            stats.steps,
            stats.splices,
            stats.peak_frames,
            stats.peak_contexts
        );
        Ok(root)
    }

    /// Execute the instruction at the current frame's pointer.
    fn step(&mut self) -> Result<(), EngineError> {
        let Some(frame) = self.calls.frames.last() else {
            return Ok(());
        };
        let at = frame.ip;
        let len = frame.list.len();

        if self.config.trace && log::log_enabled!(log::Level::Trace) {
            log::trace!(
                "step {} (frames {}, contexts {}):\n{}",
                self.calls.stats.steps,
                self.calls.frames.len(),
                self.contexts.depth(),
                frame.list.disassemble(Some(at))
            );
        }

        let op = match self.calls.frames.last_mut() {
            Some(frame) => {
                let instr = frame
                    .list
                    .get_mut(at)
                    .ok_or(EngineError::RanOffEnd { at, len })?;
                decode(instr, at)?
            }
            None => return Ok(()),
        };
        self.calls.stats.steps += 1;

        match op {
            Op::Exec(f) => {
                let before = self.calls.current_frame();
                let payload = self
                    .contexts
                    .current_mut()
                    .ok_or(EngineError::NoActiveContext { at })?;
                f(&mut self.calls, payload);
                // A splice inside the closure made a new frame current;
                // that frame's entry already stepped past this EXEC.
                if self.calls.current_frame() == before {
                    self.calls.advance();
                }
            }
            Op::Jump(target) => {
                if target.is_noop() {
                    self.calls.advance();
                } else {
                    self.set_ip(target.resolve(at, len)?);
                }
            }
            Op::CondJump(target, predicate) => {
                if target.is_noop() {
                    self.calls.advance();
                } else {
                    let payload = self
                        .contexts
                        .current_mut()
                        .ok_or(EngineError::NoActiveContext { at })?;
                    if predicate(payload) {
                        self.set_ip(target.resolve(at, len)?);
                    } else {
                        self.calls.advance();
                    }
                }
            }
            Op::PushContext(payload, on_switch) => {
                self.contexts.push(payload, on_switch.as_ref());
                let depth = self.contexts.depth();
                self.calls.stats.peak_contexts = self.calls.stats.peak_contexts.max(depth);
                self.calls.advance();
            }
            Op::PopContext(on_switch) => {
                self.contexts.pop_current(on_switch.as_ref(), at)?;
                self.calls.advance();
            }
            Op::PushList(list, on_switch, advance_caller) => {
                self.calls.enter(list, advance_caller);
                if let Some(f) = on_switch {
                    let frames = &self.calls.frames;
                    if let Some(caller) = frames.len().checked_sub(2).map(|i| &frames[i]) {
                        f(&caller.list);
                    }
                }
            }
            Op::PopList(on_switch) => {
                if let Some(popped) = self.calls.frames.pop() {
                    if let Some(f) = on_switch {
                        f(&popped.list);
                    }
                    for f in &popped.on_return {
                        f(&popped.list);
                    }
                }
            }
        }
        Ok(())
    }

    fn set_ip(&mut self, ip: usize) {
        if let Some(frame) = self.calls.frames.last_mut() {
            frame.ip = ip;
        }
    }
}
