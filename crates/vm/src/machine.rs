//! Engine state: the frame stack with its splice primitive, the context
//! stack, configuration and run statistics.

use crate::error::EngineError;
use crate::instruction::{ContextSwitchFn, Instruction, ListSwitchFn};
use crate::list::InstructionList;

/// Identity of one live frame. Never reused within an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

/// One active call: a list and the instruction pointer into it.
pub(crate) struct Frame<C> {
    pub(crate) id: FrameId,
    pub(crate) list: InstructionList<C>,
    pub(crate) ip: usize,
    /// Callbacks registered by splices; they run when this frame pops.
    pub(crate) on_return: Vec<ListSwitchFn<C>>,
}

/// Where the most recent synthetic list was created: the synthetic
/// frame and the instruction pointer value it had at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SpliceSite {
    frame: FrameId,
    ip: usize,
}

/// The frame stack.
///
/// EXEC closures receive a `&mut CallStack` so they can [`splice`] new
/// sub-programs in front of whatever follows the EXEC.
///
/// [`splice`]: CallStack::splice
pub struct CallStack<C> {
    pub(crate) frames: Vec<Frame<C>>,
    site: Option<SpliceSite>,
    next_id: u64,
    pub(crate) stats: EngineStats,
}

impl<C> CallStack<C> {
    pub(crate) fn new() -> Self {
        Self {
            frames: Vec::new(),
            site: None,
            next_id: 0,
            stats: EngineStats::default(),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.frames.clear();
        self.site = None;
        self.stats = EngineStats::default();
    }

    /// Number of live frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Identity of the current frame, if any.
    pub fn current_frame(&self) -> Option<FrameId> {
        self.frames.last().map(|f| f.id)
    }

    /// Instruction pointer of the current frame, if any.
    pub fn current_ip(&self) -> Option<usize> {
        self.frames.last().map(|f| f.ip)
    }

    pub(crate) fn advance(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.ip += 1;
        }
    }

    /// Enter `list` as the new current frame. With `advance_caller`, the
    /// old current frame first steps past its call site.
    pub(crate) fn enter(&mut self, list: InstructionList<C>, advance_caller: bool) -> FrameId {
        if advance_caller {
            self.advance();
        }
        let id = FrameId(self.next_id);
        self.next_id += 1;
        self.frames.push(Frame {
            id,
            list,
            ip: 0,
            on_return: Vec::new(),
        });
        self.stats.peak_frames = self.stats.peak_frames.max(self.frames.len());
        id
    }

    /// Schedule `list` to run before control returns past the current
    /// instruction.
    ///
    /// The first splice from a call site wraps `list` in a new synthetic
    /// list ending in a POP_LIST and enters it. Further splices from the
    /// same call site in the same step reuse that synthetic list, slotting
    /// each new list in just before its trailing pop, so the spliced
    /// programs run strictly in issue order and all of them finish before
    /// the instruction after the call site.
    pub fn splice(&mut self, list: InstructionList<C>) {
        self.splice_inner(list, None);
    }

    /// Like [`CallStack::splice`]; `on_return` runs with the synthetic list
    /// once every program spliced from this call site has finished.
    pub fn splice_with<F>(&mut self, list: InstructionList<C>, on_return: F)
    where
        F: Fn(&InstructionList<C>) + 'static,
    {
        self.splice_inner(list, Some(std::rc::Rc::new(on_return)));
    }

    fn splice_inner(&mut self, list: InstructionList<C>, on_return: Option<ListSwitchFn<C>>) {
        self.stats.splices += 1;

        let here = self.frames.last().map(|f| SpliceSite {
            frame: f.id,
            ip: f.ip,
        });
        if here.is_none() || self.site != here {
            let mut synthetic = InstructionList::new();
            synthetic.pop_list();
            let frame = self.enter(synthetic, true);
            self.site = Some(SpliceSite { frame, ip: 0 });
            log::trace!("splice: new synthetic list at depth {}", self.frames.len());
        }

        // The synthetic frame is current in both branches.
        if let Some(frame) = self.frames.last_mut() {
            let before_pop = frame.list.len().saturating_sub(1);
            frame.list.insert(before_pop, Instruction::push_list(list));
            if let Some(f) = on_return {
                frame.on_return.push(f);
            }
        }
    }
}

/// The context stack. Payloads are owned by the stack while pushed and
/// handed back when popped.
///
/// Contexts nest strictly: the current context is always the top one, and
/// POP_CONTEXT removes it.
pub struct ContextStack<C> {
    entries: Vec<C>,
}

impl<C> ContextStack<C> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn current(&self) -> Option<&C> {
        self.entries.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut C> {
        self.entries.last_mut()
    }

    /// Push `payload`; `on_switch(new, previous)` runs when there is a
    /// previous context.
    pub(crate) fn push(&mut self, payload: C, on_switch: Option<&ContextSwitchFn<C>>) {
        self.entries.push(payload);

        if let (Some(f), Some((new, rest))) = (on_switch, self.entries.split_last_mut()) {
            if let Some(previous) = rest.last_mut() {
                f(new, previous);
            }
        }
    }

    /// Pop the current context and return its payload.
    /// `on_switch(new_top, popped)` runs when a context remains.
    pub(crate) fn pop_current(
        &mut self,
        on_switch: Option<&ContextSwitchFn<C>>,
        at: usize,
    ) -> Result<C, EngineError> {
        let mut old = self.entries.pop().ok_or(EngineError::NoActiveContext { at })?;

        if let (Some(f), Some(top)) = (on_switch, self.entries.last_mut()) {
            f(top, &mut old);
        }
        Ok(old)
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Log a disassembly of the current list before every step, at
    /// `trace` level.
    pub trace: bool,
}

impl EngineConfig {
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

/// Counters collected over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Instructions executed.
    pub steps: u64,
    /// Calls to the splice primitive.
    pub splices: u64,
    /// Deepest frame stack seen.
    pub peak_frames: usize,
    /// Deepest context stack seen.
    pub peak_contexts: usize,
}

/// The execution engine: frame stack, context stack and configuration.
pub struct Engine<C> {
    pub(crate) calls: CallStack<C>,
    pub(crate) contexts: ContextStack<C>,
    pub(crate) config: EngineConfig,
}

impl<C> Engine<C> {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            calls: CallStack::new(),
            contexts: ContextStack::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Statistics of the most recent run.
    pub fn stats(&self) -> EngineStats {
        self.calls.stats
    }
}

impl<C> Default for Engine<C> {
    fn default() -> Self {
        Self::new()
    }
}
