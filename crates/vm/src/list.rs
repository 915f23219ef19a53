//! Instruction lists and their builder methods.

use std::fmt;
use std::fmt::Write as _;
use std::rc::Rc;

use crate::instruction::{Direction, Instruction};
use crate::machine::CallStack;

/// An ordered, mutable sequence of instructions.
///
/// A list lives exactly as long as one call: it is moved into the frame
/// stack when entered and dropped when its trailing `POP_LIST` executes.
/// The builder methods append and return `&mut Self` so programs can be
/// written as chains.
pub struct InstructionList<C> {
    instructions: Vec<Instruction<C>>,
}

impl<C> Default for InstructionList<C> {
    fn default() -> Self {
        Self {
            instructions: Vec::new(),
        }
    }
}

impl<C> InstructionList<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Instruction<C>> {
        self.instructions.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Instruction<C>> {
        self.instructions.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction<C>> {
        self.instructions.iter()
    }

    /// Append an instruction.
    pub fn push(&mut self, instruction: Instruction<C>) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    /// Insert an instruction at `index`, shifting later ones up.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, instruction: Instruction<C>) {
        self.instructions.insert(index, instruction);
    }

    pub fn exec<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut CallStack<C>, &mut C) + 'static,
    {
        self.push(Instruction::exec(f))
    }

    pub fn jump_absolute(&mut self, target: usize) -> &mut Self {
        self.push(Instruction::JumpAbsolute(target))
    }

    pub fn jump_relative(&mut self, delta: usize, direction: Direction) -> &mut Self {
        self.push(Instruction::JumpRelative { delta, direction })
    }

    pub fn cond_jump_absolute<P>(&mut self, target: usize, predicate: P) -> &mut Self
    where
        P: Fn(&mut C) -> bool + 'static,
    {
        self.push(Instruction::cond_jump_absolute(target, predicate))
    }

    pub fn cond_jump_relative<P>(&mut self, delta: usize, direction: Direction, predicate: P) -> &mut Self
    where
        P: Fn(&mut C) -> bool + 'static,
    {
        self.push(Instruction::cond_jump_relative(delta, direction, predicate))
    }

    pub fn push_context(&mut self, payload: C) -> &mut Self {
        self.push(Instruction::push_context(payload))
    }

    /// Push `payload`; `on_switch(new, previous)` runs right after.
    pub fn push_context_with<F>(&mut self, payload: C, on_switch: F) -> &mut Self
    where
        F: Fn(&mut C, &mut C) + 'static,
    {
        self.push(Instruction::PushContext {
            payload: Some(payload),
            on_switch: Some(Rc::new(on_switch)),
        })
    }

    pub fn pop_context(&mut self) -> &mut Self {
        self.push(Instruction::PopContext { on_switch: None })
    }

    /// Pop the current context; `on_switch(new_top, popped)` runs right
    /// after so the new top can absorb results.
    pub fn pop_context_with<F>(&mut self, on_switch: F) -> &mut Self
    where
        F: Fn(&mut C, &mut C) + 'static,
    {
        self.push(Instruction::PopContext {
            on_switch: Some(Rc::new(on_switch)),
        })
    }

    pub fn push_list(&mut self, list: InstructionList<C>) -> &mut Self {
        self.push(Instruction::push_list(list))
    }

    pub fn push_list_with<F>(&mut self, list: InstructionList<C>, on_switch: F) -> &mut Self
    where
        F: Fn(&InstructionList<C>) + 'static,
    {
        self.push(Instruction::PushList {
            list: Some(list),
            on_switch: Some(Rc::new(on_switch)),
            advance_caller: true,
        })
    }

    pub fn pop_list(&mut self) -> &mut Self {
        self.push(Instruction::pop_list())
    }

    pub fn pop_list_with<F>(&mut self, on_switch: F) -> &mut Self
    where
        F: Fn(&InstructionList<C>) + 'static,
    {
        self.push(Instruction::PopList {
            on_switch: Some(Rc::new(on_switch)),
        })
    }

    /// Render the list one instruction per line, marking `current` with
    /// an arrow.
    pub fn disassemble(&self, current: Option<usize>) -> String {
        let mut out = String::new();
        for (i, instr) in self.instructions.iter().enumerate() {
            let marker = if current == Some(i) { " -> " } else { "    " };
            let _ = writeln!(out, "{marker}{i:>4}  {instr}");
        }
        out
    }
}

impl<C> fmt::Debug for InstructionList<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.instructions.iter()).finish()
    }
}

impl<C> fmt::Display for InstructionList<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.disassemble(None))
    }
}

impl<C> FromIterator<Instruction<C>> for InstructionList<C> {
    fn from_iter<I: IntoIterator<Item = Instruction<C>>>(iter: I) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
        }
    }
}
