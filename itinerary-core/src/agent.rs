//! Knowledge agents: resolve an interest with no known place into one.

use crate::config::AgentConfig;
use crate::knowledge::Region;
use async_trait::async_trait;
use claude::{Claude, Query};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors from a knowledge lookup. The planner treats all of them as
/// "no information".
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Claude error: {0}")]
    Client(#[from] claude::Error),

    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed reply: {0}")]
    Malformed(String),

    #[error("unknown region '{0}'")]
    UnknownRegion(String),
}

/// A place proposed for an interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub name: String,
    pub region: Region,
}

impl PlaceSuggestion {
    pub fn new(name: impl Into<String>, region: Region) -> Self {
        Self {
            name: name.into(),
            region,
        }
    }
}

/// Source of places for interests the seed knowledge does not cover.
#[async_trait]
pub trait KnowledgeAgent: Send + Sync {
    /// Find the single best place for `interest`, or `None` if there is
    /// no clear answer.
    async fn lookup(&self, interest: &str) -> Result<Option<PlaceSuggestion>, LookupError>;

    /// Short name for logs and reports.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: KnowledgeAgent + ?Sized> KnowledgeAgent for Box<T> {
    async fn lookup(&self, interest: &str) -> Result<Option<PlaceSuggestion>, LookupError> {
        (**self).lookup(interest).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: KnowledgeAgent + ?Sized> KnowledgeAgent for Arc<T> {
    async fn lookup(&self, interest: &str) -> Result<Option<PlaceSuggestion>, LookupError> {
        (**self).lookup(interest).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Agent that knows nothing. Used when no API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAgent;

#[async_trait]
impl KnowledgeAgent for OfflineAgent {
    async fn lookup(&self, interest: &str) -> Result<Option<PlaceSuggestion>, LookupError> {
        debug!(interest, "offline agent skips lookup");
        Ok(None)
    }

    fn name(&self) -> &str {
        "offline"
    }
}

/// Agent backed by the Claude Messages API.
#[derive(Debug, Clone)]
pub struct ClaudeAgent {
    client: Claude,
    config: AgentConfig,
}

impl ClaudeAgent {
    pub fn new(client: Claude, config: AgentConfig) -> Self {
        Self { client, config }
    }

    /// Build from `ANTHROPIC_API_KEY`.
    pub fn from_env(config: AgentConfig) -> Result<Self, LookupError> {
        Ok(Self::new(Claude::from_env()?, config))
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn query(&self, interest: &str) -> Query {
        Query::new(format!("Find location for: {interest}"))
            .with_system(system_prompt(&self.config.country, interest))
            .with_model(self.config.model.clone())
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature)
    }
}

#[async_trait]
impl KnowledgeAgent for ClaudeAgent {
    async fn lookup(&self, interest: &str) -> Result<Option<PlaceSuggestion>, LookupError> {
        let reply = self.client.complete(self.query(interest)).await?;
        debug!(
            interest,
            input_tokens = reply.usage.input_tokens,
            output_tokens = reply.usage.output_tokens,
            "agent replied"
        );
        parse_suggestion(&reply.text)
    }

    fn name(&self) -> &str {
        "claude"
    }
}

/// Instructions sent as the system prompt for one lookup.
pub fn system_prompt(country: &str, interest: &str) -> String {
    let regions: Vec<&str> = Region::ALL.iter().map(Region::as_str).collect();
    format!(
        "You are a research assistant for a {country} travel expert.\n\
         Find the single best, most famous location in {country} for the following interest: \"{interest}\"\n\
         \n\
         Respond with ONLY a valid JSON object in the following format:\n\
         {{\"name\": \"LocationName\", \"region\": \"region_slug\"}}\n\
         \n\
         Valid region_slugs are: {}\n\
         \n\
         Example for \"surfing\":\n\
         {{\"name\": \"Arugam Bay\", \"region\": \"east_coast\"}}\n\
         \n\
         If you cannot find a clear location, return:\n\
         {{\"name\": null, \"region\": null}}",
        regions.join(", ")
    )
}

#[derive(Debug, Deserialize)]
struct RawSuggestion {
    name: Option<String>,
    region: Option<String>,
}

/// Read the first JSON object in a model reply.
///
/// A null or blank name means "not found". A name with a region outside
/// the fixed set is an error.
pub fn parse_suggestion(text: &str) -> Result<Option<PlaceSuggestion>, LookupError> {
    let object = claude::extract_json_object(text)
        .ok_or_else(|| LookupError::Malformed(format!("no JSON object in {text:?}")))?;
    let raw: RawSuggestion =
        serde_json::from_str(object).map_err(|e| LookupError::Malformed(e.to_string()))?;

    let Some(name) = raw.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    let region = raw
        .region
        .ok_or_else(|| LookupError::Malformed(format!("no region for '{name}'")))?;
    let region = region
        .parse::<Region>()
        .map_err(|_| LookupError::UnknownRegion(region))?;

    Ok(Some(PlaceSuggestion { name, region }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let found = parse_suggestion(r#"{"name": "Arugam Bay", "region": "east_coast"}"#).unwrap();
        assert_eq!(found, Some(PlaceSuggestion::new("Arugam Bay", Region::EastCoast)));
    }

    #[test]
    fn test_parse_json_in_prose() {
        let text = "Sure! ```json\n{\"name\": \"Nilambe\", \"region\": \"Hill Country\"}\n```";
        let found = parse_suggestion(text).unwrap().unwrap();
        assert_eq!(found.name, "Nilambe");
        assert_eq!(found.region, Region::HillCountry);
    }

    #[test]
    fn test_parse_not_found() {
        assert_eq!(parse_suggestion(r#"{"name": null, "region": null}"#).unwrap(), None);
        assert_eq!(parse_suggestion(r#"{"name": "  "}"#).unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_suggestion("I don't know"),
            Err(LookupError::Malformed(_))
        ));
        assert!(matches!(
            parse_suggestion(r#"{"name": "Galle"}"#),
            Err(LookupError::Malformed(_))
        ));
        assert!(matches!(
            parse_suggestion(r#"{"name": "Male", "region": "maldives"}"#),
            Err(LookupError::UnknownRegion(r)) if r == "maldives"
        ));
    }

    #[test]
    fn test_system_prompt_lists_regions() {
        let prompt = system_prompt("Sri Lanka", "meditation");
        assert!(prompt.contains("\"meditation\""));
        assert!(prompt.contains("cultural_triangle, hill_country"));
        assert!(prompt.contains("{\"name\": null, \"region\": null}"));
    }

    #[tokio::test]
    async fn test_offline_agent_finds_nothing() {
        let agent: Box<dyn KnowledgeAgent> = Box::new(OfflineAgent);
        assert_eq!(agent.lookup("meditation").await.unwrap(), None);
        assert_eq!(agent.name(), "offline");
    }
}
