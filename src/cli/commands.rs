// Slash command handling

use crate::config::Config;
use crate::monitoring::{NodeMonitor, StatusKind, StopOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Status,
    Nodes,
    Config,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. The leading slash is optional and case is
    /// ignored.
    pub fn parse(input: &str) -> Option<Self> {
        let word = input.trim();
        let word = word.strip_prefix('/').unwrap_or(word).to_ascii_lowercase();
        match word.as_str() {
            "start" => Some(Command::Start),
            "stop" => Some(Command::Stop),
            "status" => Some(Command::Status),
            "nodes" => Some(Command::Nodes),
            "config" | "showconfig" => Some(Command::Config),
            "help" => Some(Command::Help),
            "quit" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

pub async fn handle_command(command: Command, monitor: &NodeMonitor, config: &Config) -> String {
    match command {
        Command::Start => monitor.start().await.to_string(),
        Command::Stop => monitor.stop().await.to_string(),
        Command::Status => format_status(monitor).await,
        Command::Nodes => format_nodes(monitor).await,
        Command::Config => format!("Configuration\n{}", config),
        Command::Help => format_help(),
        Command::Quit => "Goodbye!".to_string(),
    }
}

fn format_help() -> String {
    r#"Available commands:
  /start   - Start monitoring the manager's connected nodes
  /stop    - Stop monitoring
  /status  - Connected and discovery-connected node counts (same as the heartbeat)
  /nodes   - List the currently connected nodes
  /config  - Show the running configuration
  /help    - Show this help message
  /quit    - Stop monitoring and exit"#
        .to_string()
}

async fn format_status(monitor: &NodeMonitor) -> String {
    if !monitor.is_running().await {
        return StopOutcome::NotRunning.to_string();
    }
    monitor.status_report(StatusKind::OnDemand).await.to_string()
}

async fn format_nodes(monitor: &NodeMonitor) -> String {
    let mut nodes = monitor.registry().snapshot().await;
    if nodes.is_empty() {
        return "No connected Nodes.".to_string();
    }
    nodes.sort_by(|a, b| a.key.cmp(&b.key));

    let mut output = format!("Connected Nodes ({}):\n", nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, node.summary()));
    }
    output
}
