//! Pattern descriptions and their builders.

use std::fmt;
use std::rc::Rc;

use spindle_vm::CallStack;

use crate::compose;
use crate::grammar::{Grammar, RuleId, RuleRef};
use crate::leaf;
use crate::match_data::MatchData;

/// A user callback fired on a successful match while actions are enabled.
///
/// It receives the match context of the pattern it is attached to, so
/// `tokens` holds exactly what that pattern consumed and may be rewritten
/// (for example collapsed into one composite token) before it is merged
/// into the enclosing pattern's list.
pub type Action = Rc<dyn Fn(&mut MatchData)>;

/// Body of a [`Pattern::custom`] pattern.
pub type CustomFn = Rc<dyn Fn(&mut MatchData)>;

#[derive(Clone)]
pub(crate) enum Kind {
    Char(u8),
    String(Rc<[u8]>),
    Range(Rc<[(u8, u8)]>),
    Any,
    EndOfFile,
    Success,
    Failure,
    Echo(Rc<str>),
    Custom(CustomFn),
    Sequence(Rc<[Pattern]>),
    Or(Rc<[Pattern]>),
    Optional(Pattern),
    At(Pattern),
    ZeroOrMore(Pattern),
    OneOrMore(Pattern),
    Until { probe: Pattern, step: Option<Pattern> },
    Rule(RuleRef),
}

pub(crate) struct Node {
    pub(crate) kind: Kind,
    pub(crate) action: Option<Action>,
}

impl Kind {
    /// Move the child patterns out into `out`, leaving a leaf behind.
    fn take_children(&mut self, out: &mut Vec<Pattern>) {
        match std::mem::replace(self, Kind::Success) {
            Kind::Sequence(children) | Kind::Or(children) => out.extend(children.iter().cloned()),
            Kind::Optional(child)
            | Kind::At(child)
            | Kind::ZeroOrMore(child)
            | Kind::OneOrMore(child) => out.push(child),
            Kind::Until { probe, step } => {
                out.push(probe);
                out.extend(step);
            }
            _ => {}
        }
    }
}

// Deep pattern trees are released from a worklist; the default drop
// would recurse once per nesting level.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.kind.take_children(&mut pending);
        while let Some(Pattern(node)) = pending.pop() {
            if let Some(mut node) = Rc::into_inner(node) {
                node.kind.take_children(&mut pending);
            }
        }
    }
}

/// A stateless, shareable description of what to match.
///
/// Patterns are cheap to clone: clones share one node. Running a pattern
/// never recurses on the host stack. Compound patterns hand the engine an
/// instruction list that runs their children and decides the outcome.
#[derive(Clone)]
pub struct Pattern(Rc<Node>);

impl Pattern {
    fn new(kind: Kind) -> Self {
        Pattern(Rc::new(Node { kind, action: None }))
    }

    /// One byte equal to `byte`.
    pub fn char(byte: u8) -> Self {
        Self::new(Kind::Char(byte))
    }

    /// The bytes of `text`, contiguously. An empty string never matches.
    pub fn string(text: impl AsRef<[u8]>) -> Self {
        Self::new(Kind::String(Rc::from(text.as_ref())))
    }

    /// One or more consecutive bytes, each inside some inclusive
    /// `(low, high)` pair.
    pub fn range(pairs: impl IntoIterator<Item = (u8, u8)>) -> Self {
        let pairs: Vec<(u8, u8)> = pairs.into_iter().collect();
        Self::new(Kind::Range(Rc::from(pairs)))
    }

    /// Any single token except the end of input.
    pub fn any() -> Self {
        Self::new(Kind::Any)
    }

    /// The end of input. Consumes nothing.
    pub fn end_of_file() -> Self {
        Self::new(Kind::EndOfFile)
    }

    /// Always matches, consuming nothing.
    pub fn success() -> Self {
        Self::new(Kind::Success)
    }

    /// Never matches.
    pub fn failure() -> Self {
        Self::new(Kind::Failure)
    }

    /// Always matches and logs `message` at info level.
    pub fn echo(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::new(Kind::Echo(Rc::from(message)))
    }

    /// Runs `f` against a fresh child context. `f` reports the outcome
    /// through `matched` and pushes whatever tokens it consumed; on
    /// failure the stream is rewound for it.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&mut MatchData) + 'static,
    {
        Self::new(Kind::Custom(Rc::new(f)))
    }

    /// Every pattern in order. An empty sequence matches without
    /// consuming input.
    pub fn sequence(patterns: impl IntoIterator<Item = Pattern>) -> Self {
        let patterns: Vec<Pattern> = patterns.into_iter().collect();
        Self::new(Kind::Sequence(Rc::from(patterns)))
    }

    /// The first pattern that matches, in declaration order. An empty
    /// choice never matches.
    pub fn or(patterns: impl IntoIterator<Item = Pattern>) -> Self {
        let patterns: Vec<Pattern> = patterns.into_iter().collect();
        Self::new(Kind::Or(Rc::from(patterns)))
    }

    pub fn optional(pattern: Pattern) -> Self {
        Self::new(Kind::Optional(pattern))
    }

    /// Zero-width lookahead with actions suppressed.
    pub fn at(pattern: Pattern) -> Self {
        Self::new(Kind::At(pattern))
    }

    pub fn zero_or_more(pattern: Pattern) -> Self {
        Self::new(Kind::ZeroOrMore(pattern))
    }

    pub fn one_or_more(pattern: Pattern) -> Self {
        Self::new(Kind::OneOrMore(pattern))
    }

    /// Consume single tokens until `probe` would match. The probe's own
    /// input is left unconsumed.
    pub fn until(probe: Pattern) -> Self {
        Self::new(Kind::Until { probe, step: None })
    }

    /// Like [`Pattern::until`], but each step runs `step` instead of
    /// consuming a single token.
    pub fn until_with(probe: Pattern, step: Pattern) -> Self {
        Self::new(Kind::Until {
            probe,
            step: Some(step),
        })
    }

    /// A late-bound reference to rule `id` of `grammar`.
    pub fn rule(grammar: &Grammar, id: RuleId) -> Self {
        Self::new(Kind::Rule(grammar.reference(id)))
    }

    /// Attach `action`, replacing any action already attached.
    ///
    /// A rule reference is wrapped in a one-element sequence so the action
    /// belongs to this use of the rule, not to the rule itself.
    pub fn with_action<F>(self, action: F) -> Self
    where
        F: Fn(&mut MatchData) + 'static,
    {
        let kind = match &self.0.kind {
            Kind::Rule(_) => Kind::Sequence(Rc::from(vec![self.clone()])),
            kind => kind.clone(),
        };
        Pattern(Rc::new(Node {
            kind,
            action: Some(Rc::new(action)),
        }))
    }

    pub(crate) fn kind(&self) -> &Kind {
        &self.0.kind
    }

    pub fn has_action(&self) -> bool {
        self.0.action.is_some()
    }

    /// Short name of the pattern's kind.
    pub fn name(&self) -> &'static str {
        match &self.0.kind {
            Kind::Char(_) => "Char",
            Kind::String(_) => "String",
            Kind::Range(_) => "Range",
            Kind::Any => "Any",
            Kind::EndOfFile => "EndOfFile",
            Kind::Success => "Success",
            Kind::Failure => "Failure",
            Kind::Echo(_) => "Echo",
            Kind::Custom(_) => "Custom",
            Kind::Sequence(_) => "Sequence",
            Kind::Or(_) => "Or",
            Kind::Optional(_) => "Optional",
            Kind::At(_) => "At",
            Kind::ZeroOrMore(_) => "ZeroOrMore",
            Kind::OneOrMore(_) => "OneOrMore",
            Kind::Until { .. } => "Until",
            Kind::Rule(_) => "Rule",
        }
    }

    /// Attempt a match against `m`.
    ///
    /// Leaves settle `m.matched` before returning. Compound patterns
    /// splice their program into `calls`; the outcome is in `m` once that
    /// program has run, which is before the instruction after the caller's
    /// EXEC.
    pub fn run(&self, calls: &mut CallStack<MatchData>, m: &mut MatchData) {
        let action = self.0.action.as_ref();
        match &self.0.kind {
            Kind::Char(byte) => leaf::char(m, *byte, action),
            Kind::String(text) => leaf::string(m, text, action),
            Kind::Range(pairs) => leaf::range(m, pairs, action),
            Kind::Any => leaf::any(m, action),
            Kind::EndOfFile => leaf::end_of_file(m, action),
            Kind::Success => leaf::constant(m, true, action),
            Kind::Failure => leaf::constant(m, false, action),
            Kind::Echo(message) => leaf::echo(m, message, action),
            Kind::Custom(f) => leaf::custom(m, f, action),
            Kind::Sequence(children) => {
                compose::sequence(calls, m, Rc::clone(children), self.0.action.clone())
            }
            Kind::Or(children) => compose::or(calls, m, Rc::clone(children), self.0.action.clone()),
            Kind::Optional(child) => {
                compose::optional(calls, m, child.clone(), self.0.action.clone())
            }
            Kind::At(child) => compose::at(calls, m, child.clone(), self.0.action.clone()),
            Kind::ZeroOrMore(child) => {
                compose::repeat(calls, m, child.clone(), 0, self.0.action.clone())
            }
            Kind::OneOrMore(child) => {
                compose::repeat(calls, m, child.clone(), 1, self.0.action.clone())
            }
            Kind::Until { probe, step } => compose::until(
                calls,
                m,
                probe.clone(),
                step.clone(),
                self.0.action.clone(),
            ),
            Kind::Rule(rule) => match rule.resolve() {
                Some(pattern) => pattern.run(calls, m),
                None => {
                    log::warn!("rule '{}' is undefined or its grammar was dropped", rule.name());
                    m.matched = false;
                }
            },
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, name: &str, items: &[Pattern]) -> fmt::Result {
            let mut t = f.debug_tuple(name);
            for item in items {
                t.field(item);
            }
            t.finish()
        }

        match &self.0.kind {
            Kind::Char(byte) => write!(f, "Char({:?})", char::from(*byte)),
            Kind::String(text) => write!(f, "String({:?})", String::from_utf8_lossy(text)),
            Kind::Range(pairs) => {
                let mut t = f.debug_tuple("Range");
                for (low, high) in pairs.iter() {
                    t.field(&(char::from(*low), char::from(*high)));
                }
                t.finish()
            }
            Kind::Echo(message) => write!(f, "Echo({message:?})"),
            Kind::Sequence(items) => list(f, "Sequence", items),
            Kind::Or(items) => list(f, "Or", items),
            Kind::Optional(p) | Kind::At(p) | Kind::ZeroOrMore(p) | Kind::OneOrMore(p) => {
                f.debug_tuple(self.name()).field(p).finish()
            }
            Kind::Until { probe, step } => {
                let mut t = f.debug_tuple("Until");
                t.field(probe);
                if let Some(step) = step {
                    t.field(step);
                }
                t.finish()
            }
            Kind::Rule(rule) => write!(f, "Rule({})", rule.name()),
            _ => f.write_str(self.name()),
        }
    }
}
