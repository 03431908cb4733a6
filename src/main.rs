// Nodewatch - connected-node monitor for a local manager
// Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use nodewatch::cli::{handle_command, Command, ConsoleNotifier};
use nodewatch::config::load_config;
use nodewatch::logging;
use nodewatch::{NodeListClient, NodeMonitor};

#[derive(Parser, Debug)]
#[command(name = "nodewatch", version, about = "Watch the nodes connected to a local manager")]
struct Args {
    /// Configuration file (default: ~/.nodewatch/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,

    /// Start monitoring immediately instead of waiting for /start
    #[arg(long)]
    autostart: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init(args.debug || config.logging.debug);

    if args.show_config {
        println!("{}", config);
        return Ok(());
    }

    let client = NodeListClient::with_timeout(config.fetch_timeout())?;
    let monitor = NodeMonitor::new(
        config.monitor_config()?,
        Arc::new(client),
        Arc::new(ConsoleNotifier::new()),
    );

    tracing::info!("Nodewatch {} ready", env!("CARGO_PKG_VERSION"));
    if args.autostart {
        println!("{}", monitor.start().await);
    } else {
        println!("Type /help for commands.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received, exiting");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match Command::parse(&line) {
                    Some(command) => {
                        println!("{}", handle_command(command, &monitor, &config).await);
                        if command == Command::Quit {
                            break;
                        }
                    }
                    None => println!("Unknown command: {} (try /help)", line.trim()),
                }
            }
        }
    }

    monitor.stop().await;
    Ok(())
}
