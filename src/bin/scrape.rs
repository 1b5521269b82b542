use anyhow::Result;
use clap::Parser;
use jobhound::cli::{run_scrape, ScrapeCli};
use jobhound::config::AppConfig;
use jobhound::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ScrapeCli::parse();
    let config = AppConfig::load(&cli.config)?;

    init_logging(config.log_file.as_deref())?;

    run_scrape(&cli, &config).await?;
    Ok(())
}
