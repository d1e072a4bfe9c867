//! CLI command definitions for the `simplechat` binary.
//!
//! Uses clap derive macros for argument parsing. Running the binary with no
//! subcommand starts the web server.

pub mod history;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use simplechat_infra::config::DEFAULT_CONFIG_FILE;
use simplechat_types::chat::SessionId;

/// Web chat assistant for point-and-click adventure games.
#[derive(Parser)]
#[command(name = "simplechat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Path to the TOML configuration file.
    #[arg(
        short,
        long,
        global = true,
        env = "SIMPLECHAT_CONFIG",
        default_value = DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    /// Conversation store: a file path or a `sqlite:` URL.
    #[arg(long, global = true, env = "SIMPLECHAT_STORE")]
    pub store: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat web server (default).
    Serve {
        /// Address to bind.
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on.
        #[arg(short, long)]
        port: Option<u16>,

        /// Hosted model to call.
        #[arg(short, long)]
        model: Option<String>,

        /// Delete the conversation store before starting.
        #[arg(long)]
        reset_store: bool,

        /// API key for the model provider.
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Print the stored turns of one session.
    History {
        /// Session id (the value of the browser's session cookie).
        session_id: SessionId,
    },

    /// List sessions recorded in the store, most recent first.
    Sessions,
}

impl Default for Commands {
    fn default() -> Self {
        Self::Serve {
            host: None,
            port: None,
            model: None,
            reset_store: false,
            api_key: std::env::var("OPENAI_API_KEY").ok(),
        }
    }
}
