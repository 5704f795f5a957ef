use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trendscope::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "trendscope",
    version,
    about = "Google Trends dashboard: interest over time, by region, and related queries",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Configuration file (TOML); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the interactive dashboard
    Serve {
        /// Bind address override (e.g. 0.0.0.0:8501)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Run one analysis and print the report
    Analyze {
        /// Comma-separated keywords
        #[arg(short, long, default_value = "python, java, javascript")]
        keywords: String,

        /// Timeframe token (today 12-m, today 3-m, today 1-m, now 7-d, all)
        #[arg(short, long, default_value = "today 12-m")]
        timeframe: String,

        /// Country code, empty for worldwide
        #[arg(short, long, default_value = "")]
        geo: String,

        /// Region resolution (COUNTRY, REGION, CITY)
        #[arg(short, long, default_value = "COUNTRY")]
        resolution: String,

        /// Category id (0 = all)
        #[arg(long, default_value = "0")]
        category: u32,

        /// Directory to write CSV downloads and the chart into
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, cli.verbose, &config.logging.level)?;

    tracing::info!("trendscope starting");

    match cli.command {
        Commands::Serve { bind } => {
            tracing::info!(bind = ?bind, "Starting serve command");
            commands::serve(config, bind).await?;
        }

        Commands::Analyze {
            keywords,
            timeframe,
            geo,
            resolution,
            category,
            out,
        } => {
            tracing::info!(
                keywords = %keywords,
                timeframe = %timeframe,
                geo = %geo,
                resolution = %resolution,
                category = %category,
                out = ?out,
                "Starting analyze command"
            );
            let params = commands::AnalyzeParams {
                keywords,
                timeframe,
                geo,
                resolution,
                category,
                out,
            };
            commands::analyze(config, params).await?;
        }
    }

    tracing::info!("trendscope completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, verbose: bool, level: &str) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("trendscope=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new(format!("trendscope={level},warn"))
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
