//! Testing utilities for the planner.
//!
//! This module provides tools for integration testing:
//! - `MockAgent` for deterministic lookups without API calls
//! - `ScenarioHarness` for running trip requests against it
//! - Assertion helpers for the properties every plan must hold

use crate::agent::{KnowledgeAgent, LookupError, PlaceSuggestion};
use crate::config::PlannerConfig;
use crate::knowledge::{Region, SeedKnowledge};
use crate::planner::{Plan, Planner, TripRequest};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// A scripted answer from the mock agent.
#[derive(Debug, Clone)]
pub enum MockAnswer {
    Place(PlaceSuggestion),
    NotFound,
    /// Fail with a malformed-reply error carrying this text.
    Fail(String),
    /// Never answer.
    Hang,
}

/// A knowledge agent that returns scripted answers.
///
/// Interests without a script are not found. Every call is recorded.
#[derive(Debug, Default)]
pub struct MockAgent {
    answers: HashMap<String, MockAnswer>,
    calls: Mutex<Vec<String>>,
}

impl MockAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `interest` with a place.
    pub fn with_place(self, interest: &str, name: &str, region: Region) -> Self {
        self.with_answer(interest, MockAnswer::Place(PlaceSuggestion::new(name, region)))
    }

    /// Fail lookups for `interest`.
    pub fn with_failure(self, interest: &str, message: &str) -> Self {
        self.with_answer(interest, MockAnswer::Fail(message.to_string()))
    }

    /// Never answer lookups for `interest`.
    pub fn with_hang(self, interest: &str) -> Self {
        self.with_answer(interest, MockAnswer::Hang)
    }

    pub fn with_answer(mut self, interest: &str, answer: MockAnswer) -> Self {
        self.answers.insert(interest.to_string(), answer);
        self
    }

    /// Interests looked up so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl KnowledgeAgent for MockAgent {
    async fn lookup(&self, interest: &str) -> Result<Option<PlaceSuggestion>, LookupError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(interest.to_string());
        }
        match self.answers.get(interest).cloned() {
            Some(MockAnswer::Place(place)) => Ok(Some(place)),
            Some(MockAnswer::Fail(message)) => Err(LookupError::Malformed(message)),
            Some(MockAnswer::Hang) => std::future::pending().await,
            Some(MockAnswer::NotFound) | None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Test harness for running trip scenarios.
pub struct ScenarioHarness {
    /// The mock agent, shared with the planner.
    pub agent: Arc<MockAgent>,
    pub config: PlannerConfig,
    pub knowledge: SeedKnowledge,
}

impl ScenarioHarness {
    /// Built-in knowledge, default config, an agent that finds nothing.
    pub fn new() -> Self {
        Self::with_agent(MockAgent::new())
    }

    pub fn with_agent(agent: MockAgent) -> Self {
        Self {
            agent: Arc::new(agent),
            config: PlannerConfig::default(),
            knowledge: SeedKnowledge::sri_lanka(),
        }
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_knowledge(mut self, knowledge: SeedKnowledge) -> Self {
        self.knowledge = knowledge;
        self
    }

    pub fn planner(&self) -> Planner<Arc<MockAgent>> {
        Planner::new(self.agent.clone())
            .with_config(self.config.clone())
            .with_knowledge(self.knowledge.clone())
    }

    /// Plan a trip; panics if the request is invalid or planning fails.
    pub async fn plan(&self, duration: u32, month: &str, interests: &[&str]) -> Plan {
        let request = TripRequest::new(duration, month, interests.iter().copied())
            .unwrap_or_else(|e| panic!("invalid scenario request: {e}"));
        self.planner()
            .plan(request)
            .await
            .unwrap_or_else(|e| panic!("planning failed: {e}"))
    }
}

impl Default for ScenarioHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Stop names in itinerary order.
pub fn stop_names(plan: &Plan) -> Vec<&str> {
    plan.itinerary.iter().map(|i| i.location.as_str()).collect()
}

/// Assert the structural properties every plan must hold.
#[track_caller]
pub fn assert_plan_invariants(plan: &Plan) {
    assert!(
        plan.itinerary.len() <= plan.max_stops,
        "Expected at most {} stops, got {}",
        plan.max_stops,
        plan.itinerary.len()
    );

    let mut seen = HashSet::new();
    for item in &plan.itinerary {
        assert!(
            seen.insert(item.location.as_str()),
            "Expected '{}' to appear once",
            item.location
        );
        assert!(
            !plan.avoided_regions.contains(&item.region),
            "Expected no stop in avoided region {}, found '{}'",
            item.region,
            item.location
        );
    }

    let numbers: Vec<u32> = plan.itinerary.iter().map(|i| i.stop_number).collect();
    let expected: Vec<u32> = (1..).take(plan.itinerary.len()).collect();
    assert_eq!(numbers, expected, "Expected contiguous stop numbers from 1");

    assert!(
        plan.itinerary
            .windows(2)
            .all(|pair| pair[0].priority <= pair[1].priority),
        "Expected stops ordered by priority: {:?}",
        stop_names(plan)
    );
}

/// Assert the plan carries a warning containing `fragment`.
#[track_caller]
pub fn assert_warning_contains(plan: &Plan, fragment: &str) {
    assert!(
        plan.warnings.iter().any(|w| w.contains(fragment)),
        "Expected a warning containing '{fragment}', got {:?}",
        plan.warnings
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_agent_answers_and_records() {
        let agent = MockAgent::new()
            .with_place("meditation", "Nilambe", Region::HillCountry)
            .with_failure("diving", "garbled");

        assert_eq!(
            agent.lookup("meditation").await.unwrap(),
            Some(PlaceSuggestion::new("Nilambe", Region::HillCountry))
        );
        assert!(matches!(
            agent.lookup("diving").await,
            Err(LookupError::Malformed(m)) if m == "garbled"
        ));
        assert_eq!(agent.lookup("opera").await.unwrap(), None);
        assert_eq!(agent.calls(), vec!["meditation", "diving", "opera"]);
    }

    #[tokio::test]
    async fn test_harness_runs_default_scenario() {
        let harness = ScenarioHarness::new();
        let plan = harness.plan(7, "march", &["history"]).await;

        assert_plan_invariants(&plan);
        assert_eq!(stop_names(&plan), vec!["Sigiriya", "Dambulla"]);
        assert!(harness.agent.calls().is_empty());
    }
}
