//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod open;
mod session;
mod workflow;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::App;
use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "compann")]
#[command(about = "Company website analyzer client")]
#[command(version)]
pub struct Cli {
    /// Base URL of the analyzer API
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory for stored sessions (overrides config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Keep the session in memory only; nothing is written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        /// Account name
        #[arg(short, long)]
        username: String,
        /// Password (prefer the environment variable over the flag)
        #[arg(short, long, env = "COMPANN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        /// Account name (at least 3 characters)
        #[arg(short, long)]
        username: String,
        /// Password (at least 6 characters)
        #[arg(short, long, env = "COMPANN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the current session
    Whoami,

    /// Navigate to a view and report where navigation landed
    Open {
        /// View path (login, register, dashboard)
        #[arg(default_value = "")]
        path: String,
    },

    /// Extract metadata from a company website
    Extract {
        /// Website URL (http or https)
        url: String,
        /// Print the raw JSON reply
        #[arg(long)]
        json: bool,
    },

    /// Extract a website, then request AI analysis of it
    Analyze {
        /// Website URL (http or https)
        url: String,
        /// Print the raw JSON replies
        #[arg(long)]
        json: bool,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        api_url: cli.api_url,
        data_dir: cli.data_dir,
        ephemeral: cli.ephemeral,
    };
    let (settings, _config) = load_settings_with_options(options).await;
    let app = App::new(&settings)?;

    match cli.command {
        Commands::Login { username, password } => {
            session::cmd_login(&app, &username, password.as_deref()).await
        }
        Commands::Register { username, password } => {
            session::cmd_register(&app, &username, password.as_deref()).await
        }
        Commands::Logout => session::cmd_logout(&app),
        Commands::Whoami => session::cmd_whoami(&app),
        Commands::Open { path } => open::cmd_open(&app, &path),
        Commands::Extract { url, json } => workflow::cmd_extract(&app, &url, json).await,
        Commands::Analyze { url, json } => workflow::cmd_analyze(&app, &url, json).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "compann",
            "extract",
            "https://acme.test",
            "--api-url",
            "http://127.0.0.1:9000",
            "--ephemeral",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert!(cli.ephemeral);
        assert!(matches!(cli.command, Commands::Extract { json: false, .. }));
    }

    #[test]
    fn test_open_defaults_to_empty_path() {
        let cli = Cli::try_parse_from(["compann", "open"]).unwrap();
        assert!(matches!(cli.command, Commands::Open { path } if path.is_empty()));
    }
}
