//! CLI entry point for vkhpp-gen.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

/// vkhpp-gen — generate a C++ header from the Vulkan XML registry.
#[derive(Parser, Debug)]
#[command(name = "vkhpp-gen", version, about)]
struct Cli {
    /// Path to the registry XML.
    #[arg(default_value = "vk.xml")]
    registry: PathBuf,

    /// Path to a vkhpp-gen.toml configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file path (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail when any command matches no known overload shape.
    #[arg(long)]
    deny_shape_misses: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vkhpp_gen=info")),
        )
        .init();

    match try_main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("caught exception: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let report = vkhpp_gen::run(
        &cli.registry,
        cli.config.as_deref(),
        cli.output.as_deref(),
    )?;
    if report.shape_misses > 0 {
        eprintln!(
            "warning: {} command(s) matched no known overload shape",
            report.shape_misses
        );
        if cli.deny_shape_misses {
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}
