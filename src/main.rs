//! CLI entry point for inkpress

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "inkpress")]
#[command(version)]
#[command(about = "Build a static blog from MDX posts", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "inkpress=debug,info"
    } else {
        "inkpress=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Build failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };

    let site = inkpress::Site::new(&base_dir)?;
    tracing::info!("Building site in {:?}", site.base_dir);

    let summary = site.build().await?;

    let output = summary
        .output_dir
        .strip_prefix(&site.base_dir)
        .unwrap_or(&summary.output_dir);
    println!(
        "Done! {} posts built to {}/",
        summary.posts,
        output.display()
    );

    Ok(())
}
