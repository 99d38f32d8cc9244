//! CLI module - Command-line interface for Atelier
//!
//! Configuration comes from `config.toml` and the environment; the CLI only
//! chooses what to do with it.

mod commands;

use clap::{Parser, Subcommand};

/// Atelier - contact inquiry service for the studio website
#[derive(Parser)]
#[command(name = "atelier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve,

    /// Submit an inquiry to a running API
    Send {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        message: String,
        /// API base URL (defaults to the locally configured port)
        #[arg(long)]
        url: Option<String>,
    },

    /// Show the most recent stored inquiries
    #[command(alias = "ls")]
    Inquiries {
        /// Number of entries to show
        #[arg(long, default_value = "10")]
        limit: u64,
    },

    /// Create default config file
    Init,
}

pub use commands::*;
