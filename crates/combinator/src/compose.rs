//! Programs for compound patterns.
//!
//! Every compound pattern splices one list of the same shape:
//!
//! ```text
//!    0  PUSH_CONTEXT          child of the caller's context
//!    1  EXEC                  record the checkpoint
//!    2  EXEC                  one attempt of a child pattern
//!    .  ...                   decide: loop back to 2, succeed or fail
//!    n  POP_CONTEXT           fold the child context into the caller's
//!  n+1  POP_LIST
//! ```
//!
//! Child patterns run against the pushed context, so a compound child adds
//! one more such frame on top and its result lands in this context when it
//! pops. Loop counters live in [`MatchData`] rather than in the closures.

use std::rc::Rc;

use spindle_vm::{CallStack, Direction, InstructionList};

use crate::match_data::MatchData;
use crate::pattern::{Action, Pattern};

/// Index of the first attempt instruction in every compound program.
const ATTEMPT: usize = 2;

/// Start a compound program whose context runs with `execute_actions`.
fn open(parent: &MatchData, execute_actions: bool) -> InstructionList<MatchData> {
    let mut child = parent.child();
    child.execute_actions = execute_actions;

    let mut list = InstructionList::new();
    list.push_context(child).exec(|_, m| m.begin());
    list
}

/// Finish a compound program and hand it to the engine. The caller's
/// context reads as unmatched until the program has folded its result in.
fn close(
    calls: &mut CallStack<MatchData>,
    parent: &mut MatchData,
    name: &str,
    mut list: InstructionList<MatchData>,
) {
    list.pop_context_with(|parent, child| parent.absorb(child))
        .pop_list();
    log::trace!("{name}: splice {} instructions", list.len());
    parent.matched = false;
    calls.splice(list);
}

/// An EXEC that runs one child pattern, chosen by the loop step.
fn attempt_each(
    children: Rc<[Pattern]>,
) -> impl Fn(&mut CallStack<MatchData>, &mut MatchData) + 'static {
    move |calls, m| {
        m.begin_iteration();
        if let Some(child) = children.get(m.step) {
            child.run(calls, m);
        }
    }
}

/// An EXEC that runs `pattern` once.
fn attempt(pattern: Pattern) -> impl Fn(&mut CallStack<MatchData>, &mut MatchData) + 'static {
    move |calls, m| {
        m.begin_iteration();
        pattern.run(calls, m);
    }
}

pub(crate) fn sequence(
    calls: &mut CallStack<MatchData>,
    m: &mut MatchData,
    children: Rc<[Pattern]>,
    action: Option<Action>,
) {
    if children.is_empty() {
        empty_match(m, action.as_ref());
        return;
    }

    let last = children.len() - 1;
    let mut list = open(m, m.execute_actions);
    list.exec(attempt_each(children))
        .cond_jump_absolute(ATTEMPT, move |m| {
            if !m.matched {
                m.fail();
                return false;
            }
            if m.step < last {
                m.step += 1;
                return true;
            }
            m.succeed();
            m.fire(action.as_ref());
            false
        });
    close(calls, m, "Sequence", list);
}

pub(crate) fn or(
    calls: &mut CallStack<MatchData>,
    m: &mut MatchData,
    children: Rc<[Pattern]>,
    action: Option<Action>,
) {
    if children.is_empty() {
        m.matched = false;
        return;
    }

    let last = children.len() - 1;
    let mut list = open(m, m.execute_actions);
    list.exec(attempt_each(children))
        .cond_jump_absolute(ATTEMPT, move |m| {
            if m.matched {
                m.succeed();
                m.fire(action.as_ref());
                return false;
            }
            m.rewind_iteration();
            if m.step < last {
                m.step += 1;
                return true;
            }
            m.fail();
            false
        });
    close(calls, m, "Or", list);
}

pub(crate) fn optional(
    calls: &mut CallStack<MatchData>,
    m: &mut MatchData,
    child: Pattern,
    action: Option<Action>,
) {
    let mut list = open(m, m.execute_actions);
    list.exec(attempt(child)).exec(move |_, m| {
        if m.matched {
            m.succeed();
            m.fire(action.as_ref());
        } else {
            m.rewind_iteration();
            m.succeed();
        }
    });
    close(calls, m, "Optional", list);
}

pub(crate) fn at(
    calls: &mut CallStack<MatchData>,
    m: &mut MatchData,
    child: Pattern,
    action: Option<Action>,
) {
    // The probe runs with actions off; the lookahead's own action still
    // follows the caller's setting.
    let fire = m.execute_actions;
    let mut list = open(m, false);
    list.exec(attempt(child)).exec(move |_, m| {
        let matched = m.matched;
        if matched && fire {
            if let Some(action) = &action {
                action(m);
            }
        }
        m.load(m.checkpoint);
        m.tokens.clear();
        m.matched = matched;
        m.end = m.start;
    });
    close(calls, m, "At", list);
}

/// `ZeroOrMore` (`min == 0`) and `OneOrMore` (`min == 1`).
///
/// The loop ends on the first failed iteration, which is rewound, or on an
/// iteration that matched without consuming input, which is kept.
pub(crate) fn repeat(
    calls: &mut CallStack<MatchData>,
    m: &mut MatchData,
    child: Pattern,
    min: usize,
    action: Option<Action>,
) {
    let mut list = open(m, m.execute_actions);
    list.exec(attempt(child))
        .cond_jump_absolute(ATTEMPT, move |m| {
            if m.matched {
                m.step += 1;
                if m.progressed() {
                    return true;
                }
            } else {
                m.rewind_iteration();
            }

            if m.step >= min {
                m.succeed();
                m.fire(action.as_ref());
            } else {
                m.fail();
            }
            false
        });
    let name = if min == 0 { "ZeroOrMore" } else { "OneOrMore" };
    close(calls, m, name, list);
}

/// Scan until `probe` matches, leaving the probe's input in the stream.
///
/// Without a step pattern each failed probe consumes one token:
///
/// ```text
///    2  EXEC                  probe
///    3  JMP_IF 2              probe failed: take one token, loop
/// ```
///
/// With a step pattern:
///
/// ```text
///    2  EXEC                  probe
///    3  JMP_IF $pc + 4        probe matched, or input ended
///    4  EXEC                  step
///    5  JMP_IF $pc + 2        step made no progress
///    6  JMP 2
/// ```
///
/// Input ending before the probe matches, or a step that consumes
/// nothing, fails the whole scan.
pub(crate) fn until(
    calls: &mut CallStack<MatchData>,
    m: &mut MatchData,
    probe: Pattern,
    step: Option<Pattern>,
    action: Option<Action>,
) {
    let mut list = open(m, m.execute_actions);
    list.exec(attempt(probe));

    match step {
        None => {
            list.cond_jump_absolute(ATTEMPT, move |m| {
                if m.matched {
                    m.rewind_iteration();
                    m.succeed();
                    m.fire(action.as_ref());
                    return false;
                }
                let token = m.next_token();
                if token.is_eof() {
                    m.fail();
                    return false;
                }
                m.tokens.push(token);
                true
            });
        }
        Some(step) => {
            list.cond_jump_relative(4, Direction::Forward, move |m| {
                if m.matched {
                    m.rewind_iteration();
                    m.succeed();
                    m.fire(action.as_ref());
                    return true;
                }
                if m.at_end() {
                    m.fail();
                    return true;
                }
                false
            })
            .exec(attempt(step))
            .cond_jump_relative(2, Direction::Forward, |m| {
                if m.progressed() {
                    return false;
                }
                m.fail();
                true
            })
            .jump_absolute(ATTEMPT);
        }
    }
    close(calls, m, "Until", list);
}

/// A compound with nothing to run matches the empty input.
fn empty_match(m: &mut MatchData, action: Option<&Action>) {
    let mut local = m.child();
    local.begin();
    local.succeed();
    local.fire(action);
    m.absorb(&mut local);
}
