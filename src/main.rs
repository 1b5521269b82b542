use anyhow::Result;
use clap::Parser;
use jobhound::cli::ServeCli;
use jobhound::config::AppConfig;
use jobhound::logging::init_logging;
use jobhound::web::start_web_server;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ServeCli::parse();
    let config = AppConfig::load(&cli.config)?;

    init_logging(config.log_file.as_deref())?;

    start_web_server(config).await
}
