//! CLI entry point for angle-winrt-gen.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use angle_winrt_gen::{RunOptions, config};

/// angle-winrt-gen — generate ANGLE WinRT Visual Studio projects with gyp.
#[derive(Parser, Debug)]
#[command(name = "angle-winrt-gen", version, about)]
struct Cli {
    /// Path to a winrt-projects.toml file.  Uses the built-in Windows 8.1 /
    /// Windows 10 matrix when omitted.
    config: Option<PathBuf>,

    /// Root of the ANGLE checkout (overrides config).
    #[arg(long)]
    angle_dir: Option<PathBuf>,

    /// Only generate the target with this output directory.  May be repeated.
    #[arg(long, value_name = "OUTPUT_DIR")]
    only: Vec<PathBuf>,

    /// Print the gyp commands without running them.
    #[arg(long)]
    dry_run: bool,

    /// Stop at the first target whose gyp run fails.
    #[arg(long)]
    fail_fast: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("angle_winrt_gen=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::Config::default(),
    };
    if let Some(dir) = cli.angle_dir {
        cfg.gyp.angle_dir = Some(dir);
    }

    let opts = RunOptions {
        dry_run: cli.dry_run,
        fail_fast: cli.fail_fast,
        only: cli.only,
    };

    let reports = angle_winrt_gen::run(&cfg, &opts, &mut std::io::stdout().lock())?;

    let failed = reports.iter().filter(|r| !r.outcome.is_success()).count();
    info!(total = reports.len(), failed, "done");
    Ok(())
}
