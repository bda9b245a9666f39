//! Planner and agent configuration.
//!
//! Every field has a default, so an empty TOML file (or none at all) gives
//! the stock behaviour:
//!
//! ```toml
//! pacing_days = 3
//! beach_interests = ["beach", "surfing", "snorkelling"]
//!
//! [[long_haul_pairs]]
//! from = "Sigiriya"
//! to = "Arugam Bay"
//!
//! [agent]
//! model = "claude-3-5-haiku-latest"
//! ```

use crate::facts::UNRANKED_PRIORITY;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Two places too far apart to combine on a short trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongHaulPair {
    pub from: String,
    pub to: String,
}

impl LongHaulPair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Tunables for rules, the itinerary builder and gap resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Days per stop when sizing the itinerary.
    pub pacing_days: u32,
    /// Sort-key bonus for stops in the suggested region.
    pub preferred_region_bonus: i32,
    /// Interests that count as beach travel.
    pub beach_interests: Vec<String>,
    pub long_haul_pairs: Vec<LongHaulPair>,
    /// Trips shorter than this get the long-haul warning.
    pub long_haul_max_days: u32,
    /// Trips shorter than this get the many-stops warning.
    pub crowded_trip_max_days: u32,
    pub lookup_timeout_secs: u64,
    pub max_firings: usize,
    /// Priority given to places found by the knowledge agent.
    pub agent_priority: i32,
    pub agent_description: String,
    pub agent: AgentConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            pacing_days: 2,
            preferred_region_bonus: 100,
            beach_interests: vec!["beach".to_string(), "surfing".to_string()],
            long_haul_pairs: vec![LongHaulPair::new("Sigiriya", "Arugam Bay")],
            long_haul_max_days: 10,
            crowded_trip_max_days: 7,
            lookup_timeout_secs: 30,
            max_firings: crate::engine::DEFAULT_MAX_FIRINGS,
            agent_priority: UNRANKED_PRIORITY,
            agent_description: "Suggested by the AI knowledge agent.".to_string(),
            agent: AgentConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: PlannerConfig = toml::from_str(text)?;
        config.beach_interests = normalize_interests(config.beach_interests);
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).await?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pacing_days == 0 {
            return Err(ConfigError::Invalid("pacing_days must be at least 1".to_string()));
        }
        if self.lookup_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "lookup_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.max_firings == 0 {
            return Err(ConfigError::Invalid("max_firings must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn with_pacing_days(mut self, days: u32) -> Self {
        self.pacing_days = days;
        self
    }

    pub fn with_preferred_region_bonus(mut self, bonus: i32) -> Self {
        self.preferred_region_bonus = bonus;
        self
    }

    /// Interests are trimmed and lower-cased to match normalized requests.
    pub fn with_beach_interests(mut self, interests: Vec<String>) -> Self {
        self.beach_interests = normalize_interests(interests);
        self
    }

    pub fn with_long_haul_pairs(mut self, pairs: Vec<LongHaulPair>) -> Self {
        self.long_haul_pairs = pairs;
        self
    }

    pub fn with_long_haul_max_days(mut self, days: u32) -> Self {
        self.long_haul_max_days = days;
        self
    }

    pub fn with_crowded_trip_max_days(mut self, days: u32) -> Self {
        self.crowded_trip_max_days = days;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_max_firings(mut self, max_firings: usize) -> Self {
        self.max_firings = max_firings;
        self
    }

    pub fn with_agent(mut self, agent: AgentConfig) -> Self {
        self.agent = agent;
        self
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    /// Whether `interest` counts as beach travel.
    pub fn is_beach(&self, interest: &str) -> bool {
        self.beach_interests.iter().any(|b| b == interest)
    }
}

/// Settings for the Claude-backed knowledge agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    /// Country the agent is asked about.
    pub country: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: claude::DEFAULT_MODEL.to_string(),
            max_tokens: 150,
            temperature: 0.0,
            country: "Sri Lanka".to_string(),
        }
    }
}

impl AgentConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }
}

fn normalize_interests(interests: Vec<String>) -> Vec<String> {
    interests
        .into_iter()
        .map(|i| i.trim().to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.pacing_days, 2);
        assert!(config.is_beach("surfing"));
        assert!(!config.is_beach("history"));
        assert_eq!(config.lookup_timeout(), Duration::from_secs(30));
        assert_eq!(config.agent_priority, 99);
        assert_eq!(config.agent.max_tokens, 150);
    }

    #[test]
    fn test_beach_interests_setter_normalizes() {
        let config = PlannerConfig::default()
            .with_beach_interests(vec!["Beach".to_string(), " Snorkelling ".to_string()]);
        assert_eq!(config.beach_interests, vec!["beach", "snorkelling"]);
        assert!(config.is_beach("snorkelling"));
        assert!(!config.is_beach("surfing"));
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(PlannerConfig::from_toml_str("").unwrap(), PlannerConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = PlannerConfig::from_toml_str(
            r#"
            pacing_days = 3
            beach_interests = ["Beach", " Diving "]

            [[long_haul_pairs]]
            from = "Jaffna"
            to = "Galle"

            [agent]
            country = "Maldives"
            "#,
        )
        .unwrap();

        assert_eq!(config.pacing_days, 3);
        assert_eq!(config.beach_interests, vec!["beach", "diving"]);
        assert_eq!(config.long_haul_pairs, vec![LongHaulPair::new("Jaffna", "Galle")]);
        assert_eq!(config.agent.country, "Maldives");
        assert_eq!(config.agent.max_tokens, 150);
        assert_eq!(config.crowded_trip_max_days, 7);
    }

    #[test]
    fn test_rejects_zero_pacing() {
        assert!(matches!(
            PlannerConfig::from_toml_str("pacing_days = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PlannerConfig::from_toml_str("pacing_days = \"two\""),
            Err(ConfigError::Toml(_))
        ));
    }
}
