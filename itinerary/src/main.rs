//! Trip itinerary planner CLI.
//!
//! ```bash
//! cargo run -p itinerary -- --days 7 --month August --interests "beach, wildlife"
//! ```
//!
//! Unknown interests are looked up with Claude when ANTHROPIC_API_KEY is
//! set (directly or in a `.env` file); otherwise they are skipped.

mod report;

use anyhow::{Context, Result};
use clap::Parser;
use itinerary_core::{
    ClaudeAgent, KnowledgeAgent, OfflineAgent, PlannerConfig, Planner, SeedKnowledge,
    TripRequest,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Plan a trip from seasonal weather, known places and your interests.
#[derive(Parser)]
#[command(name = "itinerary", version, about, long_about = None)]
struct Cli {
    /// Trip length in days
    #[arg(short, long)]
    days: u32,

    /// Month of travel, e.g. "August"
    #[arg(short, long)]
    month: String,

    /// Comma-separated interests, e.g. "beach, wildlife, surfing"
    #[arg(short, long)]
    interests: String,

    /// TOML file overriding planner settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file replacing the built-in places and weather
    #[arg(long)]
    knowledge: Option<PathBuf>,

    /// Never call the knowledge agent
    #[arg(long)]
    offline: bool,

    /// Claude model for the knowledge agent
    #[arg(long)]
    model: Option<String>,

    /// Print the plan as JSON
    #[arg(long)]
    json: bool,

    /// More logging on stderr (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => PlannerConfig::load(path)
            .await
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    if let Some(model) = &cli.model {
        config.agent = config.agent.clone().with_model(model.clone());
    }

    let knowledge = match &cli.knowledge {
        Some(path) => SeedKnowledge::load(path)
            .await
            .with_context(|| format!("loading knowledge from {}", path.display()))?,
        None => SeedKnowledge::sri_lanka(),
    };

    let request = TripRequest::parse(cli.days, &cli.month, &cli.interests)?;
    let agent = select_agent(&cli, &config);

    let planner = Planner::new(agent)
        .with_config(config)
        .with_knowledge(knowledge);
    let plan = planner.plan(request).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", report::render(&plan, planner.agent().name()));
    }
    Ok(())
}

/// Logs go to stderr so stdout stays clean for the plan.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn select_agent(cli: &Cli, config: &PlannerConfig) -> Box<dyn KnowledgeAgent> {
    if cli.offline {
        info!("offline mode, unknown interests will be skipped");
        return Box::new(OfflineAgent);
    }
    match ClaudeAgent::from_env(config.agent.clone()) {
        Ok(agent) => Box::new(agent),
        Err(err) => {
            warn!(error = %err, "knowledge agent unavailable, unknown interests will be skipped");
            Box::new(OfflineAgent)
        }
    }
}
