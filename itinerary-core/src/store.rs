//! Insertion-ordered fact store.

use crate::facts::{Fact, FactId, FactKind, FactType, ItineraryItem, Recommendation, Warning};
use crate::knowledge::Region;
use std::collections::BTreeSet;

/// Holds every fact asserted during a run.
///
/// Facts are never mutated or removed individually; [`FactStore::clear`]
/// discards the whole run. Iteration always follows assertion order, so
/// repeated scans see facts in the same order.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    facts: Vec<Fact>,
}

impl FactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fact and return its id.
    pub fn assert(&mut self, fact: impl Into<Fact>) -> FactId {
        let id = FactId(self.facts.len());
        self.facts.push(fact.into());
        id
    }

    pub fn get(&self, id: FactId) -> Option<&Fact> {
        self.facts.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Drop every fact.
    pub fn clear(&mut self) {
        self.facts.clear();
    }

    /// All facts with their ids, oldest first.
    pub fn all(&self) -> impl Iterator<Item = (FactId, &Fact)> + '_ {
        self.facts
            .iter()
            .enumerate()
            .map(|(index, fact)| (FactId(index), fact))
    }

    /// Facts of one kind, oldest first.
    pub fn of_kind(&self, kind: FactKind) -> impl Iterator<Item = (FactId, &Fact)> + '_ {
        self.all().filter(move |(_, fact)| fact.kind() == kind)
    }

    /// Typed view over facts of one kind, oldest first.
    pub fn of_type<T: FactType>(&self) -> impl Iterator<Item = &T> + '_ {
        self.facts.iter().filter_map(T::from_fact)
    }

    /// Whether any fact satisfies the predicate.
    pub fn exists(&self, predicate: impl Fn(&Fact) -> bool) -> bool {
        self.facts.iter().any(predicate)
    }

    /// Typed variant of [`FactStore::exists`].
    pub fn contains<T: FactType>(&self, predicate: impl Fn(&T) -> bool) -> bool {
        self.of_type::<T>().any(predicate)
    }

    // =========================================================================
    // Views used by the itinerary builder and the planner
    // =========================================================================

    /// Every region marked "avoid", without repeats.
    pub fn avoided_regions(&self) -> Vec<Region> {
        let mut regions = Vec::new();
        for region in self
            .of_type::<Recommendation>()
            .filter_map(Recommendation::avoid_region)
        {
            if !regions.contains(&region) {
                regions.push(region);
            }
        }
        regions
    }

    /// The first region marked "suggest", if any.
    pub fn suggested_region(&self) -> Option<Region> {
        self.of_type::<Recommendation>()
            .find_map(Recommendation::suggest_region)
    }

    /// Warning messages collapsed to a set.
    pub fn warnings(&self) -> BTreeSet<String> {
        self.of_type::<Warning>()
            .map(|w| w.message.clone())
            .collect()
    }

    /// Itinerary items ordered by stop number.
    pub fn itinerary(&self) -> Vec<ItineraryItem> {
        let mut items: Vec<ItineraryItem> = self.of_type::<ItineraryItem>().cloned().collect();
        items.sort_by_key(|item| item.stop_number);
        items
    }
}
