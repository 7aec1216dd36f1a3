//! Hyperchain CLI
//!
//! Replays bridge message scripts against an in-memory host.

mod config;
mod script;

use clap::{Parser, Subcommand};
use config::CliConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "hyperchain")]
#[command(version)]
#[command(about = "Hyperchain bridge state machine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON message script
    Run {
        /// Script file (JSON array of steps)
        script: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "hyperchain.toml")]
        config: PathBuf,

        /// Print one JSON object per step
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config {
        /// Configuration file path
        #[arg(short, long, default_value = "hyperchain.toml")]
        config: PathBuf,
    },

    /// Write an example configuration
    Init {
        /// Output file
        #[arg(short, long, default_value = "hyperchain.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            script,
            config,
            json,
        } => {
            let config = CliConfig::load(&config)?;
            let steps = script::parse(&std::fs::read_to_string(&script)?)?;
            tracing::info!(steps = steps.len(), script = %script.display(), "replaying script");

            let mut host = config.build_host()?;
            let outcomes = script::run(&mut host, &steps);
            let failed = outcomes.iter().filter(|o| !o.ok).count();

            for outcome in &outcomes {
                if json {
                    println!("{}", serde_json::to_string(outcome)?);
                    continue;
                }
                let status = if outcome.ok { "ok" } else { "FAILED" };
                println!(
                    "#{:<3} h={:<5} {:<20} {}",
                    outcome.index, outcome.height, outcome.kind, status
                );
                if let Some(code) = outcome.code {
                    println!("     code {}: {}", code, outcome.result);
                } else if !outcome.result.is_null() {
                    println!("     {}", serde_json::to_string_pretty(&outcome.result)?);
                }
                for event in &outcome.events {
                    println!("     event {}", event);
                }
            }

            tracing::info!(
                total = outcomes.len(),
                failed,
                height = host.header().height,
                block = %host.header().hash_hex(),
                "script finished"
            );
        }

        Commands::Config { config } => {
            let config = CliConfig::load(&config)?;
            print!("{}", config.to_toml()?);
        }

        Commands::Init { output, force } => {
            if output.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", output.display());
            }
            std::fs::write(&output, CliConfig::example().to_toml()?)?;
            println!("Configuration written to {}", output.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false),
        )
        .init();
}
