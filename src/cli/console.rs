// Console notifier: prints monitor events to stdout

use crate::monitoring::{MonitorEvent, Notifier};
use async_trait::async_trait;
use chrono::Local;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

pub struct ConsoleNotifier {
    out: Mutex<Stdout>,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Render one event as printed on the console.
pub fn format_event(event: &MonitorEvent, at: &str) -> String {
    format!("[{}] {}\n\n", at, event)
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, event: &MonitorEvent) -> anyhow::Result<()> {
        let text = format_event(event, &Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}
