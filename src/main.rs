use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gardenwatch::calculator::DEFAULT_MODIFIER;
use gardenwatch::commands::{self, Invoker, RunOptions};
use gardenwatch::config::Config;

#[derive(Parser)]
#[command(
    name = "gardenwatch",
    version,
    about = "Grow a Garden stock, weather and announcement relay for Discord",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configuration file
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll upstream and post new occurrences
    Run {
        /// Log messages instead of posting them
        #[arg(long, default_value = "false")]
        dry_run: bool,

        /// Run the startup pass and one full sweep, then exit
        #[arg(long, default_value = "false")]
        once: bool,
    },

    /// Calculate the value of an item
    Calculate {
        /// Item name or id
        item: String,

        /// Item weight
        weight: f64,

        /// Mutation name
        #[arg(short, long, default_value = DEFAULT_MODIFIER)]
        mutation: String,

        /// Variant name
        #[arg(long, default_value = DEFAULT_MODIFIER)]
        variant: String,
    },

    /// Bind a category to a channel (administrators only)
    Bind {
        /// Category (seed, gear, egg, cosmetic, event_stock, weather, announcement)
        category: String,

        /// Discord channel id
        channel_id: u64,

        /// Attest that you are a server administrator (not verified)
        #[arg(long, default_value = "false")]
        admin: bool,
    },

    /// Clear a category's channel (administrators only)
    Unbind {
        category: String,

        /// Attest that you are a server administrator (not verified)
        #[arg(long, default_value = "false")]
        admin: bool,
    },

    /// Show channel bindings and baseline markers
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    match cli.command {
        Commands::Run { dry_run, once } => {
            tracing::info!(dry_run = %dry_run, once = %once, "Starting gardenwatch relay");
            commands::run(config, RunOptions { dry_run, once }).await?;
        }

        Commands::Calculate {
            item,
            weight,
            mutation,
            variant,
        } => {
            commands::calculate(&item, weight, &mutation, &variant)?;
        }

        Commands::Bind {
            category,
            channel_id,
            admin,
        } => {
            let invoker = Invoker {
                is_administrator: admin,
            };
            let previous =
                commands::bind(&config.storage.channels_path, invoker, &category, channel_id)?;
            match previous {
                Some(old) => println!("✅ {category} now posts to {channel_id} (was {old})"),
                None => println!("✅ {category} now posts to {channel_id}"),
            }
        }

        Commands::Unbind { category, admin } => {
            let invoker = Invoker {
                is_administrator: admin,
            };
            match commands::unbind(&config.storage.channels_path, invoker, &category)? {
                Some(old) => println!("✅ {category} unbound (was {old})"),
                None => println!("{category} was not bound"),
            }
        }

        Commands::Status => {
            commands::status(&config)?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("gardenwatch=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("gardenwatch={level},warn"))
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gardenwatch=info,warn"))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
