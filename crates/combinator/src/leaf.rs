//! Leaf matchers. They act on the match context directly and never touch
//! the engine: save, attempt, and on failure restore with nothing consumed.

use spindle_common::{Position, TokenList};

use crate::match_data::MatchData;
use crate::pattern::{Action, CustomFn};

/// Record a successful leaf match of `tokens`, which began at `start`.
///
/// The action sees a context holding only this leaf's tokens; whatever it
/// leaves there is appended to `m`.
fn accept(m: &mut MatchData, start: Position, tokens: TokenList, action: Option<&Action>) {
    let mut local = m.child();
    local.start = Some(start);
    local.tokens = tokens;
    local.succeed();
    local.fire(action);
    m.matched = true;
    m.end = local.end;
    m.tokens.append(&mut local.tokens);
}

fn reject(m: &mut MatchData, saved: Position) {
    m.load(saved);
    m.matched = false;
}

pub(crate) fn char(m: &mut MatchData, byte: u8, action: Option<&Action>) {
    let saved = m.save();
    let token = m.next_token();
    if token.byte() == Some(byte) {
        accept(m, saved, TokenList::from(vec![token]), action);
    } else {
        reject(m, saved);
    }
}

pub(crate) fn string(m: &mut MatchData, text: &[u8], action: Option<&Action>) {
    let saved = m.save();
    if text.is_empty() {
        m.matched = false;
        return;
    }

    let mut tokens = TokenList::new();
    for &expected in text {
        let token = m.next_token();
        if token.byte() != Some(expected) {
            reject(m, saved);
            return;
        }
        tokens.push(token);
    }
    accept(m, saved, tokens, action);
}

pub(crate) fn range(m: &mut MatchData, pairs: &[(u8, u8)], action: Option<&Action>) {
    let saved = m.save();
    let mut tokens = TokenList::new();
    loop {
        let before = m.save();
        let token = m.next_token();
        let inside = token
            .byte()
            .is_some_and(|b| pairs.iter().any(|&(low, high)| (low..=high).contains(&b)));
        if !inside {
            // The rejecting token stays in the stream.
            m.load(before);
            break;
        }
        tokens.push(token);
    }

    if tokens.is_empty() {
        reject(m, saved);
    } else {
        accept(m, saved, tokens, action);
    }
}

pub(crate) fn any(m: &mut MatchData, action: Option<&Action>) {
    let saved = m.save();
    let token = m.next_token();
    if token.is_eof() {
        reject(m, saved);
    } else {
        accept(m, saved, TokenList::from(vec![token]), action);
    }
}

pub(crate) fn end_of_file(m: &mut MatchData, action: Option<&Action>) {
    let saved = m.save();
    let eof = m.next_token().is_eof();
    m.load(saved);
    if eof {
        accept(m, saved, TokenList::new(), action);
    } else {
        m.matched = false;
    }
}

/// `Success` and `Failure`. The action fires either way.
pub(crate) fn constant(m: &mut MatchData, matched: bool, action: Option<&Action>) {
    m.matched = matched;
    if m.execute_actions && action.is_some() {
        let mut local = m.child();
        local.start = Some(m.save());
        local.matched = matched;
        local.fire(action);
    }
}

pub(crate) fn echo(m: &mut MatchData, message: &str, action: Option<&Action>) {
    if m.execute_actions {
        log::info!("{message}");
    }
    let here = m.save();
    accept(m, here, TokenList::new(), action);
}

pub(crate) fn custom(m: &mut MatchData, f: &CustomFn, action: Option<&Action>) {
    let saved = m.save();
    let mut local = m.child();
    local.start = Some(saved);
    f(&mut local);
    if local.matched {
        local.succeed();
        local.fire(action);
        m.absorb(&mut local);
    } else {
        reject(m, saved);
    }
}
