//! Fact patterns, variable bindings and rule conditions.

use crate::facts::{Fact, FactKind, Field, Value};
use crate::knowledge::{Month, Region};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// One side of a field constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Bind the field to a variable, or require it to equal the
    /// variable's value if it is already bound.
    Var(&'static str),
    /// Require the field to equal a literal.
    Lit(Value),
}

/// A fact kind plus constraints on its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    kind: FactKind,
    constraints: Vec<(Field, Term)>,
}

impl Pattern {
    /// Match any fact of this kind.
    pub fn new(kind: FactKind) -> Self {
        Self {
            kind,
            constraints: Vec::new(),
        }
    }

    /// Bind `field` to `var`.
    pub fn bind(mut self, field: Field, var: &'static str) -> Self {
        self.constraints.push((field, Term::Var(var)));
        self
    }

    /// Require `field` to equal `value`.
    pub fn equals(mut self, field: Field, value: impl Into<Value>) -> Self {
        self.constraints.push((field, Term::Lit(value.into())));
        self
    }

    pub fn kind(&self) -> FactKind {
        self.kind
    }

    /// Try to match `fact` under `bindings`.
    ///
    /// Returns the bindings extended with any newly bound variables, or
    /// `None` if the fact has the wrong kind, lacks a constrained field,
    /// or disagrees with a literal or an already-bound variable.
    pub fn unify(&self, fact: &Fact, bindings: &Bindings) -> Option<Bindings> {
        if fact.kind() != self.kind {
            return None;
        }

        let mut extended = bindings.clone();
        for (field, term) in &self.constraints {
            let actual = fact.get(*field)?;
            match term {
                Term::Lit(expected) => {
                    if actual != *expected {
                        return None;
                    }
                }
                Term::Var(name) => match extended.get(name) {
                    Some(bound) if *bound != actual => return None,
                    Some(_) => {}
                    None => extended.insert(*name, actual),
                },
            }
        }
        Some(extended)
    }

    /// Whether `fact` matches without keeping any new bindings.
    pub fn matches(&self, fact: &Fact, bindings: &Bindings) -> bool {
        self.unify(fact, bindings).is_some()
    }
}

/// Variable bindings of a (partial) rule instantiation.
///
/// The typed accessors treat an unbound variable or a value of the wrong
/// type as a bug in the rule definition and panic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings(BTreeMap<&'static str, Value>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, var: &str) -> Option<&Value> {
        self.0.get(var)
    }

    pub fn is_bound(&self, var: &str) -> bool {
        self.0.contains_key(var)
    }

    pub(crate) fn insert(&mut self, var: &'static str, value: Value) {
        self.0.insert(var, value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value of a variable that the rule guarantees is bound.
    pub fn value(&self, var: &str) -> &Value {
        match self.0.get(var) {
            Some(value) => value,
            None => panic!("rule variable `{var}` is not bound"),
        }
    }

    pub fn text(&self, var: &str) -> &str {
        let value = self.value(var);
        value
            .as_text()
            .unwrap_or_else(|| type_mismatch(var, "text", value))
    }

    pub fn int(&self, var: &str) -> i64 {
        let value = self.value(var);
        value
            .as_int()
            .unwrap_or_else(|| type_mismatch(var, "integer", value))
    }

    pub fn list(&self, var: &str) -> &[String] {
        let value = self.value(var);
        value
            .as_list()
            .unwrap_or_else(|| type_mismatch(var, "list", value))
    }

    pub fn region(&self, var: &str) -> Region {
        let value = self.value(var);
        value
            .as_region()
            .unwrap_or_else(|| type_mismatch(var, "region", value))
    }

    pub fn month(&self, var: &str) -> Month {
        let value = self.value(var);
        value
            .as_month()
            .unwrap_or_else(|| type_mismatch(var, "month", value))
    }
}

fn type_mismatch(var: &str, expected: &str, found: &Value) -> ! {
    panic!("rule variable `{var}` holds {found}, expected {expected}")
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// A boolean test over bound variables.
pub type Predicate = Arc<dyn Fn(&Bindings) -> bool + Send + Sync>;

/// One conjunct of a rule's left-hand side.
#[derive(Clone)]
pub enum Condition {
    /// A fact must match; may bind variables.
    Match(Pattern),
    /// No fact may match under the current bindings. Variables the
    /// pattern mentions but that are still unbound act as wildcards.
    Not(Pattern),
    /// At least one fact must match; binds nothing.
    Exists(Pattern),
    /// A predicate over variables bound by earlier conditions.
    Test(Predicate),
}

impl Condition {
    pub fn test(predicate: impl Fn(&Bindings) -> bool + Send + Sync + 'static) -> Self {
        Condition::Test(Arc::new(predicate))
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Match(p) => f.debug_tuple("Match").field(p).finish(),
            Condition::Not(p) => f.debug_tuple("Not").field(p).finish(),
            Condition::Exists(p) => f.debug_tuple("Exists").field(p).finish(),
            Condition::Test(_) => f.write_str("Test(..)"),
        }
    }
}
