use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sodagrid::commands;
use sodagrid::config::Config;

#[derive(Parser)]
#[command(
    name = "sodagrid",
    version,
    about = "Generate an aligned schedule grid from a SIAM conference program page",
    long_about = None
)]
struct Cli {
    /// Conference program URL, e.g. https://meetings.siam.org/program.cfm?CONFCODE=SODA25
    url: String,

    /// Output directory for the generated schedule
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (TOML); environment variables apply otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Omit the generation date and source link line
    #[arg(long, default_value = "false")]
    no_source_link: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, default_value = "text")]
    log_format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging
    setup_tracing(&cli.log_format, cli.verbose)?;

    tracing::info!("sodagrid schedule generator starting");

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(output) = cli.output {
        config.output.output_dir = output;
    }
    if cli.no_source_link {
        config.output.include_source_link = false;
    }
    config.validate()?;

    commands::generate(config, cli.url).await?;

    tracing::info!("sodagrid completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("sodagrid=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("sodagrid=info,warn")
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
