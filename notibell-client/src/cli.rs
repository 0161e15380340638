use std::path::PathBuf;

use clap::{Parser, Subcommand};

const HELP_EPILOG: &str = r#"Config resolution order:
  1) --config/-c PATH
  2) $NOTIBELL_CONFIG
  3) platform default: ~/.config/notibell/client.yaml
--server skips the config file when none is found.
"#;

#[derive(Debug, Parser)]
#[command(
    name = "notibell",
    version,
    about = "Notification bell for the intranet notification service",
    long_about = None,
    after_long_help = HELP_EPILOG,
)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Server URL (e.g., http://127.0.0.1:8080). Overrides the config value.
    #[arg(long)]
    pub server: Option<String>,
    /// Optional subcommand. Without one, runs the interactive bell.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the interactive bell: polls the unread count and reads commands from stdin
    Watch,
    /// Print the unread badge once
    Count,
    /// Print the notification list once
    List,
    /// Mark every notification read
    ReadAll,
    /// Delete one notification
    Delete {
        /// Notification id
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}
