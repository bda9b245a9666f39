//! Rule-based trip itinerary planner with an AI knowledge agent.
//!
//! This crate provides:
//! - A forward-chaining production-rule engine over a typed fact store
//! - The itinerary rule catalogue (weather avoidance, interest matching,
//!   travel-time and pacing warnings)
//! - Gap resolution through a pluggable knowledge agent, with a
//!   Claude-backed implementation
//! - A deterministic itinerary builder
//!
//! # Quick Start
//!
//! ```ignore
//! use itinerary_core::{ClaudeAgent, Planner, PlannerConfig, TripRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PlannerConfig::default();
//!     let agent = ClaudeAgent::from_env(config.agent.clone())?;
//!     let planner = Planner::new(agent).with_config(config);
//!
//!     let request = TripRequest::parse(7, "August", "beach, wildlife, surfing")?;
//!     let plan = planner.plan(request).await?;
//!
//!     for warning in &plan.warnings {
//!         println!("! {warning}");
//!     }
//!     for stop in &plan.itinerary {
//!         println!("{}. {} ({})", stop.stop_number, stop.location, stop.reason);
//!     }
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod config;
pub mod engine;
pub mod facts;
pub mod itinerary;
pub mod knowledge;
pub mod planner;
pub mod rules;
pub mod store;
pub mod testing;

// Primary public API
pub use agent::{ClaudeAgent, KnowledgeAgent, LookupError, OfflineAgent, PlaceSuggestion};
pub use config::{AgentConfig, ConfigError, LongHaulPair, PlannerConfig};
pub use engine::{Engine, EngineError, Rule, RunStats};
pub use facts::{Fact, ItineraryItem, Location, UserRequest, Warning, Weather};
pub use knowledge::{KnowledgeError, Month, Region, SeedKnowledge};
pub use planner::{LookupOutcome, LookupRecord, Plan, PlanError, Planner, TripRequest};
pub use store::FactStore;
pub use testing::{MockAgent, ScenarioHarness};
