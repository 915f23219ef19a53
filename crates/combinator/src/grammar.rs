//! Rule registry for recursive grammars.
//!
//! Rules are declared first, which hands out a [`RuleId`], and defined
//! later, so a rule body can refer to itself or to rules defined after it.
//! References made with [`Pattern::rule`] hold only a weak link to the
//! registry; the [`Grammar`] value owns every rule body, which keeps
//! self-referential grammars free of reference cycles.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::ParseError;
use crate::pattern::{Kind, Pattern};

/// Handle of a declared rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(usize);

impl RuleId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Default)]
struct Registry {
    names: Vec<String>,
    bodies: Vec<Option<Pattern>>,
}

/// An owning registry of named rules.
#[derive(Clone, Default)]
pub struct Grammar {
    registry: Rc<RefCell<Registry>>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a rule named `name` with no body yet.
    pub fn declare(&self, name: impl Into<String>) -> RuleId {
        let mut registry = self.registry.borrow_mut();
        registry.names.push(name.into());
        registry.bodies.push(None);
        RuleId(registry.names.len() - 1)
    }

    /// Give rule `id` its body. A rule is defined once.
    pub fn define(&self, id: RuleId, pattern: Pattern) -> Result<(), ParseError> {
        let mut registry = self.registry.borrow_mut();
        let Registry { names, bodies } = &mut *registry;
        match bodies.get_mut(id.0) {
            None => Err(ParseError::UnknownRule { id: id.0 }),
            Some(Some(_)) => Err(ParseError::RuleRedefined {
                name: names[id.0].clone(),
            }),
            Some(body) => {
                *body = Some(pattern);
                Ok(())
            }
        }
    }

    /// Declare and define in one step. The body cannot refer to itself.
    pub fn add(&self, name: impl Into<String>, pattern: Pattern) -> RuleId {
        let id = self.declare(name);
        self.registry.borrow_mut().bodies[id.0] = Some(pattern);
        id
    }

    /// A pattern that runs rule `id`.
    pub fn rule(&self, id: RuleId) -> Pattern {
        Pattern::rule(self, id)
    }

    pub fn lookup(&self, name: &str) -> Option<RuleId> {
        self.registry
            .borrow()
            .names
            .iter()
            .position(|n| n == name)
            .map(RuleId)
    }

    pub fn name(&self, id: RuleId) -> Option<String> {
        self.registry.borrow().names.get(id.0).cloned()
    }

    pub fn is_defined(&self, id: RuleId) -> bool {
        matches!(self.registry.borrow().bodies.get(id.0), Some(Some(_)))
    }

    /// Number of declared rules.
    pub fn len(&self) -> usize {
        self.registry.borrow().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn reference(&self, id: RuleId) -> RuleRef {
        RuleRef {
            registry: Rc::downgrade(&self.registry),
            id,
            name: self.name(id).unwrap_or_else(|| format!("#{}", id.0)).into(),
        }
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        let mut map = f.debug_map();
        for (name, body) in registry.names.iter().zip(&registry.bodies) {
            map.entry(name, body);
        }
        map.finish()
    }
}

/// A late-bound, non-owning link to a rule.
#[derive(Clone)]
pub(crate) struct RuleRef {
    registry: Weak<RefCell<Registry>>,
    id: RuleId,
    name: Rc<str>,
}

impl RuleRef {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// The rule's body, following rule-to-rule aliases. `None` if the
    /// grammar is gone, a rule on the way is undefined, or the aliases
    /// form a loop.
    pub(crate) fn resolve(&self) -> Option<Pattern> {
        let registry = self.registry.upgrade()?;
        let registry = registry.borrow();

        let mut id = self.id;
        for _ in 0..=registry.bodies.len() {
            let body = registry.bodies.get(id.0)?.as_ref()?;
            match body.kind() {
                Kind::Rule(next) if next.registry.ptr_eq(&self.registry) => id = next.id,
                _ => return Some(body.clone()),
            }
        }
        None
    }
}
