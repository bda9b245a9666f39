//! Planner - the primary public API.
//!
//! A run goes through two inference phases around the knowledge agent:
//!
//! 1. Reset the engine with the seed knowledge and the user's request
//! 2. Phase 1: run to fixpoint; unknown interests show up as `FindInfo`
//! 3. Ask the agent about each one and assert what it finds as `Location`s
//! 4. Assert `GapsResolved`, then Phase 2: run to fixpoint again, which
//!    also builds the itinerary
//!
//! ```no_run
//! use itinerary_core::{OfflineAgent, Planner, TripRequest};
//!
//! # async fn example() -> Result<(), itinerary_core::PlanError> {
//! let planner = Planner::new(OfflineAgent);
//! let request = TripRequest::new(7, "August", ["beach", "wildlife"])?;
//! let plan = planner.plan(request).await?;
//! for stop in &plan.itinerary {
//!     println!("{}. {}", stop.stop_number, stop.location);
//! }
//! # Ok(())
//! # }
//! ```

use crate::agent::{KnowledgeAgent, LookupError, PlaceSuggestion};
use crate::config::PlannerConfig;
use crate::engine::{Engine, EngineError, RunStats};
use crate::facts::{FindInfo, GapsResolved, ItineraryItem, Location, UserRequest};
use crate::itinerary::max_stops;
use crate::knowledge::{Month, Region, SeedKnowledge};
use crate::rules::standard_rules;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Errors from planning a trip.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Inference did not settle within {limit} firings (last rule: {rule})")]
    FiringLimit { limit: usize, rule: String },
}

impl From<EngineError> for PlanError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::FiringLimit { limit, rule } => PlanError::FiringLimit { limit, rule },
        }
    }
}

/// A validated, normalized trip request.
///
/// Only [`TripRequest::new`] builds one, deserialization included, so a
/// request handed to the planner has always been checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTripRequest")]
pub struct TripRequest {
    duration: u32,
    month: Month,
    interests: Vec<String>,
}

#[derive(Deserialize)]
struct RawTripRequest {
    duration: u32,
    month: String,
    #[serde(default)]
    interests: Vec<String>,
}

impl TryFrom<RawTripRequest> for TripRequest {
    type Error = PlanError;

    fn try_from(raw: RawTripRequest) -> Result<Self, Self::Error> {
        TripRequest::new(raw.duration, &raw.month, raw.interests)
    }
}

impl TripRequest {
    /// Validate and normalize raw input.
    ///
    /// The month and interests are trimmed and lower-cased; blank and
    /// repeated interests are dropped, keeping first-seen order.
    pub fn new<I, S>(duration: u32, month: &str, interests: I) -> Result<Self, PlanError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if duration == 0 {
            return Err(PlanError::InvalidRequest(
                "duration must be at least one day".to_string(),
            ));
        }
        if month.trim().is_empty() {
            return Err(PlanError::InvalidRequest("month is required".to_string()));
        }
        let month = month
            .parse::<Month>()
            .map_err(|e| PlanError::InvalidRequest(e.to_string()))?;

        let mut normalized: Vec<String> = Vec::new();
        for interest in interests {
            let interest = interest.as_ref().trim().to_lowercase();
            if !interest.is_empty() && !normalized.contains(&interest) {
                normalized.push(interest);
            }
        }

        Ok(Self {
            duration,
            month,
            interests: normalized,
        })
    }

    /// Build a request from comma-separated interests.
    pub fn parse(duration: u32, month: &str, interests: &str) -> Result<Self, PlanError> {
        Self::new(duration, month, parse_interests(interests))
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn interests(&self) -> &[String] {
        &self.interests
    }
}

impl From<TripRequest> for UserRequest {
    fn from(request: TripRequest) -> Self {
        UserRequest {
            duration: request.duration,
            month: request.month,
            interests: request.interests,
        }
    }
}

/// Split comma-separated interests.
pub fn parse_interests(text: &str) -> Vec<String> {
    text.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// What happened when the agent was asked about one interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LookupOutcome {
    Found { name: String, region: Region },
    NotFound,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRecord {
    pub interest: String,
    #[serde(flatten)]
    pub outcome: LookupOutcome,
}

/// The result of one planning run.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub run_id: Uuid,
    pub request: UserRequest,
    pub warnings: BTreeSet<String>,
    pub itinerary: Vec<ItineraryItem>,
    /// Stop budget derived from the duration.
    pub max_stops: usize,
    pub avoided_regions: Vec<Region>,
    pub suggested_region: Option<Region>,
    /// Agent lookups in the order they were made.
    pub lookups: Vec<LookupRecord>,
    pub phase_one: RunStats,
    pub phase_two: RunStats,
}

impl Plan {
    /// Interests that no seed place covered.
    pub fn unknown_interests(&self) -> impl Iterator<Item = &str> {
        self.lookups.iter().map(|l| l.interest.as_str())
    }

    pub fn has_itinerary(&self) -> bool {
        !self.itinerary.is_empty()
    }
}

/// Runs the rule engine and the knowledge agent for trip requests.
pub struct Planner<A> {
    agent: A,
    config: PlannerConfig,
    knowledge: SeedKnowledge,
}

impl<A: KnowledgeAgent> Planner<A> {
    /// Planner with the default configuration and built-in knowledge.
    pub fn new(agent: A) -> Self {
        Self {
            agent,
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

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn knowledge(&self) -> &SeedKnowledge {
        &self.knowledge
    }

    /// Plan a trip.
    pub async fn plan(&self, request: TripRequest) -> Result<Plan, PlanError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("plan", %run_id, agent = self.agent.name());
        self.run(run_id, request).instrument(span).await
    }

    async fn run(&self, run_id: Uuid, request: TripRequest) -> Result<Plan, PlanError> {
        let request = UserRequest::from(request);
        info!(
            duration = request.duration,
            month = %request.month,
            interests = ?request.interests,
            "planning trip"
        );

        let mut engine =
            Engine::new(standard_rules(&self.config)).with_max_firings(self.config.max_firings);
        engine.reset(self.knowledge.facts());
        engine.declare(request.clone());

        let phase_one = engine.run()?;
        info!(fired = phase_one.fired, "phase 1 complete");

        let gaps: Vec<String> = engine
            .store()
            .of_type::<FindInfo>()
            .map(|f| f.interest.clone())
            .collect();

        let mut lookups = Vec::with_capacity(gaps.len());
        for interest in gaps {
            let outcome = match self.lookup(&interest).await {
                Ok(Some(place)) => {
                    engine.declare(
                        Location::new(place.name.clone(), interest.clone(), place.region)
                            .with_priority(self.config.agent_priority)
                            .with_description(self.config.agent_description.clone()),
                    );
                    LookupOutcome::Found {
                        name: place.name,
                        region: place.region,
                    }
                }
                Ok(None) => LookupOutcome::NotFound,
                Err(err) => {
                    warn!(%interest, error = %err, "knowledge lookup failed");
                    LookupOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            };
            lookups.push(LookupRecord { interest, outcome });
        }

        let found = lookups
            .iter()
            .filter(|l| matches!(l.outcome, LookupOutcome::Found { .. }))
            .count();
        engine.declare(GapsResolved {
            looked_up: lookups.len(),
            found,
        });

        let phase_two = engine.run()?;
        info!(fired = phase_two.fired, "phase 2 complete");

        let store = engine.store();
        let plan = Plan {
            run_id,
            max_stops: max_stops(request.duration, self.config.pacing_days),
            request,
            warnings: store.warnings(),
            itinerary: store.itinerary(),
            avoided_regions: store.avoided_regions(),
            suggested_region: store.suggested_region(),
            lookups,
            phase_one,
            phase_two,
        };
        info!(
            stops = plan.itinerary.len(),
            warnings = plan.warnings.len(),
            "plan ready"
        );
        Ok(plan)
    }

    async fn lookup(&self, interest: &str) -> Result<Option<PlaceSuggestion>, LookupError> {
        let limit = self.config.lookup_timeout();
        debug!(interest, ?limit, "asking knowledge agent");
        match timeout(limit, self.agent.lookup(interest)).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::Timeout(limit)),
        }
    }
}
