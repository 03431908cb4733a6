// CLI module
// Command parsing and console output for the interactive shell

pub mod commands;
pub mod console;

pub use commands::{handle_command, Command};
pub use console::ConsoleNotifier;
