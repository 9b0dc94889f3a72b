use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod job;
mod sink;

use config::MigrateConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = MigrateConfig::parse();

    // Logs go to stderr; stdout may carry output records.
    let filter = EnvFilter::from_default_env()
        .add_directive("interest_migrate=info".parse()?)
        .add_directive("interest_transform=info".parse()?);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("Interest migration starting...");
    config.log_summary();

    let stats = job::run(&config).await?;

    info!("Migration complete. {stats}");
    Ok(())
}
