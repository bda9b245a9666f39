//! Forward-chaining production-rule engine.
//!
//! The engine follows the classic match-resolve-act cycle:
//! 1. Match every rule against the store to find instantiations that
//!    have not fired yet
//! 2. Pick the one with the highest salience (ties: rule declaration
//!    order, then the ids of the facts it matched)
//! 3. Run its action and assert the facts it returns
//! 4. Repeat until nothing is left to fire
//!
//! Matching is a naive re-scan of the store on every cycle, which is
//! fine for a fact base of a few dozen facts.

mod pattern;

pub use pattern::{Bindings, Condition, Pattern, Predicate, Term};

use crate::facts::{Fact, FactId};
use crate::store::FactStore;
use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

/// Salience used when a rule does not set one.
pub const DEFAULT_SALIENCE: i32 = 0;

/// Default bound on firings per [`Engine::run`].
pub const DEFAULT_MAX_FIRINGS: usize = 10_000;

/// Errors from running the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Inference did not reach a fixpoint within {limit} firings (last rule: {rule})")]
    FiringLimit { limit: usize, rule: String },
}

/// A rule's right-hand side: reads the bindings and the store, returns
/// the facts to assert.
pub type Action = Box<dyn Fn(&Bindings, &FactStore) -> Vec<Fact> + Send + Sync>;

/// A production rule.
pub struct Rule {
    name: String,
    salience: i32,
    conditions: Vec<Condition>,
    action: Action,
}

impl Rule {
    /// Start defining a rule.
    pub fn named(name: impl Into<String>) -> RuleBuilder {
        RuleBuilder {
            name: name.into(),
            salience: DEFAULT_SALIENCE,
            conditions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn salience(&self) -> i32 {
        self.salience
    }

    /// Every instantiation of this rule against the current store, in
    /// fact-discovery order.
    pub fn instantiations(&self, store: &FactStore) -> Vec<Instantiation> {
        let mut found = Vec::new();
        let mut token = Vec::new();
        extend(&self.conditions, store, &mut token, Bindings::new(), &mut found);
        found
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("salience", &self.salience)
            .field("conditions", &self.conditions)
            .finish_non_exhaustive()
    }
}

/// Builder returned by [`Rule::named`]; conditions are evaluated in the
/// order they are added.
pub struct RuleBuilder {
    name: String,
    salience: i32,
    conditions: Vec<Condition>,
}

impl RuleBuilder {
    pub fn salience(mut self, salience: i32) -> Self {
        self.salience = salience;
        self
    }

    /// Require a matching fact.
    pub fn when(mut self, pattern: Pattern) -> Self {
        self.conditions.push(Condition::Match(pattern));
        self
    }

    /// Require that no fact matches.
    pub fn unless(mut self, pattern: Pattern) -> Self {
        self.conditions.push(Condition::Not(pattern));
        self
    }

    /// Require at least one matching fact without binding anything.
    pub fn exists(mut self, pattern: Pattern) -> Self {
        self.conditions.push(Condition::Exists(pattern));
        self
    }

    /// Require a predicate over already-bound variables.
    pub fn test(mut self, predicate: impl Fn(&Bindings) -> bool + Send + Sync + 'static) -> Self {
        self.conditions.push(Condition::test(predicate));
        self
    }

    /// Finish the rule with its action.
    pub fn then(
        self,
        action: impl Fn(&Bindings, &FactStore) -> Vec<Fact> + Send + Sync + 'static,
    ) -> Rule {
        Rule {
            name: self.name,
            salience: self.salience,
            conditions: self.conditions,
            action: Box::new(action),
        }
    }
}

/// One consistent way to satisfy a rule's conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instantiation {
    /// Facts matched by the positive conditions, in condition order.
    pub token: Vec<FactId>,
    pub bindings: Bindings,
}

fn extend(
    conditions: &[Condition],
    store: &FactStore,
    token: &mut Vec<FactId>,
    bindings: Bindings,
    found: &mut Vec<Instantiation>,
) {
    let Some((condition, rest)) = conditions.split_first() else {
        found.push(Instantiation {
            token: token.clone(),
            bindings,
        });
        return;
    };

    match condition {
        Condition::Match(pattern) => {
            for (id, fact) in store.of_kind(pattern.kind()) {
                if let Some(next) = pattern.unify(fact, &bindings) {
                    token.push(id);
                    extend(rest, store, token, next, found);
                    token.pop();
                }
            }
        }
        Condition::Not(pattern) => {
            let blocked = store
                .of_kind(pattern.kind())
                .any(|(_, fact)| pattern.matches(fact, &bindings));
            if !blocked {
                extend(rest, store, token, bindings, found);
            }
        }
        Condition::Exists(pattern) => {
            let present = store
                .of_kind(pattern.kind())
                .any(|(_, fact)| pattern.matches(fact, &bindings));
            if present {
                extend(rest, store, token, bindings, found);
            }
        }
        Condition::Test(predicate) => {
            if predicate(&bindings) {
                extend(rest, store, token, bindings, found);
            }
        }
    }
}

/// An instantiation waiting on the agenda.
#[derive(Debug, Clone)]
pub struct Activation {
    /// Index of the rule in declaration order.
    pub rule: usize,
    pub salience: i32,
    pub token: Vec<FactId>,
    pub bindings: Bindings,
}

impl Activation {
    /// Conflict-resolution order: higher salience first, then earlier
    /// rule, then earlier facts.
    fn priority_cmp(&self, other: &Self) -> Ordering {
        (Reverse(self.salience), self.rule, &self.token).cmp(&(
            Reverse(other.salience),
            other.rule,
            &other.token,
        ))
    }
}

/// Counters for one [`Engine::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Instantiations fired.
    pub fired: usize,
    /// Facts asserted by those firings.
    pub asserted: usize,
}

/// The inference engine: a rule set plus the working fact store.
pub struct Engine {
    rules: Vec<Rule>,
    store: FactStore,
    fired: HashSet<(usize, Vec<FactId>)>,
    max_firings: usize,
}

impl Engine {
    /// Create an engine with an empty store.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            store: FactStore::new(),
            fired: HashSet::new(),
            max_firings: DEFAULT_MAX_FIRINGS,
        }
    }

    /// Bound the number of firings per run.
    pub fn with_max_firings(mut self, max_firings: usize) -> Self {
        self.max_firings = max_firings.max(1);
        self
    }

    pub fn store(&self) -> &FactStore {
        &self.store
    }

    /// Discard all facts and firing history, then assert `initial`.
    pub fn reset(&mut self, initial: impl IntoIterator<Item = Fact>) {
        self.store.clear();
        self.fired.clear();
        for fact in initial {
            self.store.assert(fact);
        }
        debug!(facts = self.store.len(), "engine reset");
    }

    /// Assert a fact from outside the rule set.
    pub fn declare(&mut self, fact: impl Into<Fact>) -> FactId {
        let fact = fact.into();
        trace!(?fact, "declared");
        self.store.assert(fact)
    }

    /// All pending activations in firing order.
    pub fn agenda(&self) -> Vec<Activation> {
        let mut agenda: Vec<Activation> = self
            .rules
            .iter()
            .enumerate()
            .flat_map(|(index, rule)| {
                rule.instantiations(&self.store)
                    .into_iter()
                    .map(move |inst| Activation {
                        rule: index,
                        salience: rule.salience,
                        token: inst.token,
                        bindings: inst.bindings,
                    })
            })
            .filter(|activation| !self.has_fired(activation))
            .collect();
        agenda.sort_by(Activation::priority_cmp);
        agenda
    }

    fn has_fired(&self, activation: &Activation) -> bool {
        self.fired
            .contains(&(activation.rule, activation.token.clone()))
    }

    fn next_activation(&self) -> Option<Activation> {
        self.agenda().into_iter().next()
    }

    /// Fire activations until none remain.
    pub fn run(&mut self) -> Result<RunStats, EngineError> {
        let mut stats = RunStats::default();

        while let Some(activation) = self.next_activation() {
            if stats.fired >= self.max_firings {
                return Err(EngineError::FiringLimit {
                    limit: self.max_firings,
                    rule: self.rules[activation.rule].name.clone(),
                });
            }
            stats.asserted += self.fire(activation);
            stats.fired += 1;
        }

        debug!(fired = stats.fired, asserted = stats.asserted, "fixpoint reached");
        Ok(stats)
    }

    fn fire(&mut self, activation: Activation) -> usize {
        let rule = &self.rules[activation.rule];
        debug!(
            rule = %rule.name,
            salience = rule.salience,
            bindings = %activation.bindings,
            "firing"
        );

        let produced = (rule.action)(&activation.bindings, &self.store);
        self.fired.insert((activation.rule, activation.token));

        let count = produced.len();
        for fact in produced {
            trace!(?fact, "asserted");
            self.store.assert(fact);
        }
        count
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("rules", &self.rules.len())
            .field("facts", &self.store.len())
            .field("fired", &self.fired.len())
            .finish()
    }
}
