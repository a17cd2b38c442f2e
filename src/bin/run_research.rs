//! Run one research query from the command line and print the report

use anyhow::Result;
use clap::Parser;
use deep_research_rs::{agents, config, metrics::ResearchMetrics, network::HttpClient};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_QUERY: &str = "Latest AI agent frameworks in 2025";

#[derive(Debug, Parser)]
#[command(name = "run-research", version, about = "Run a single deep research query")]
struct Args {
    /// Research question
    #[arg(default_value = DEFAULT_QUERY)]
    query: String,

    /// Path to settings.yml
    #[arg(short, long, env = "RESEARCH_SETTINGS_PATH")]
    config: Option<PathBuf>,

    /// Directory to save the report in
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

fn rule() -> String {
    "=".repeat(70)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if args.query.trim().is_empty() {
        eprintln!("❌ Error: research query is empty");
        std::process::exit(1);
    }

    let mut settings = config::load(args.config.as_deref())?;
    if let Some(dir) = args.output_dir {
        settings.research.output_dir = dir;
    }

    let client = HttpClient::with_settings(&settings.outgoing)?;
    let manager = agents::build_manager(&settings, &client, Arc::new(ResearchMetrics::new()))?;

    println!("\n{}", rule());
    println!("🔬 DEEP RESEARCH AGENT");
    println!("{}", rule());
    println!("\nQuery: {}", args.query);
    println!("Searches: {}", settings.research.search_count);
    println!("\n{}\n", rule());

    let mut updates = manager.stream(&args.query);
    while let Some(update) = updates.next().await {
        println!("{}", update?);
    }

    println!("\n{}", rule());
    println!(
        "✅ Research complete! Check the {}/ directory for the full report.",
        settings.research.output_dir.display()
    );
    println!("{}\n", rule());

    Ok(())
}
