use chrono::Utc;
use clap::{Parser, Subcommand};
use dose_core::{service::StatisticsQuery, Config, Result};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dosed")]
#[command(about = "Medicine dispenser dose log service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override config file location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service (default)
    Serve {
        /// Listen address, overriding config and DOSE_BIND
        #[arg(long)]
        bind: Option<String>,

        /// Keep events in memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },

    /// Print adherence statistics for the trailing window
    Stats {
        /// Window size in days
        #[arg(long, default_value_t = 30)]
        days: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let mut config = config.apply_env(|key| std::env::var(key).ok());

    dose_core::logging::init(&config.logging);

    match cli.command {
        Some(Commands::Serve { bind, in_memory }) => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            cmd_serve(&config, in_memory).await
        }
        Some(Commands::Stats { days }) => cmd_stats(&config, days).await,
        None => cmd_serve(&config, false).await,
    }
}

async fn cmd_serve(config: &Config, in_memory: bool) -> Result<()> {
    config.validate()?;
    let store = dose_server::open_store(config, in_memory).await?;
    dose_server::serve(config, store).await
}

async fn cmd_stats(config: &Config, days: i64) -> Result<()> {
    config.validate()?;
    let store = dose_server::open_store(config, false).await?;

    let query = StatisticsQuery {
        days: Some(days.to_string()),
    };
    let report = dose_core::statistics(store.as_ref(), &query, Utc::now()).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
