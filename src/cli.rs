// src/cli.rs
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::{AppConfig, PersistMode, DEFAULT_CONFIG_PATH};
use crate::core::{JobStore, SaveOutcome};
use crate::scraping::{ScrapeRun, ScrapeSummary};

#[derive(Parser)]
#[command(name = "jobhound")]
#[command(about = "Serve the scraped job board and its JSON API")]
pub struct ServeCli {
    /// Path to the JSON configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

#[derive(Parser)]
#[command(name = "scrape")]
#[command(about = "Fetch job listings, filter them and store the result")]
pub struct ScrapeCli {
    /// Path to the JSON configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Replace the jobs table instead of merging into it
    #[arg(long)]
    pub replace: bool,

    /// Skip fetching each posting's description page
    #[arg(long)]
    pub no_descriptions: bool,
}

impl ScrapeCli {
    pub fn persist_mode(&self, config: &AppConfig) -> PersistMode {
        if self.replace {
            PersistMode::Replace
        } else {
            config.persist_mode
        }
    }
}

pub async fn run_scrape(cli: &ScrapeCli, config: &AppConfig) -> Result<ScrapeSummary> {
    let store = JobStore::connect(&config.db_path, &config.jobs_tablename).await?;

    let run = ScrapeRun::new(config)?
        .with_persist_mode(cli.persist_mode(config))
        .with_descriptions(config.fetch_descriptions && !cli.no_descriptions);

    let summary = match run.run(&store).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Scrape failed: {:#}", e);
            return Err(e);
        }
    };

    match summary.outcome {
        SaveOutcome::Saved { count } => info!(
            "Saved {} job(s) to {} in {}",
            count,
            config.jobs_tablename,
            config.db_path.display()
        ),
        SaveOutcome::Skipped => info!("No jobs matched; {} left unchanged", config.jobs_tablename),
    }

    Ok(summary)
}
