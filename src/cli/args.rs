//! Command-line argument parsing for grcrag
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::roles::Role;

/// grcrag - retrieval-augmented assistant over GRC standards
#[derive(Parser, Debug)]
#[command(name = "grcrag")]
#[command(version)]
#[command(about = "Index GRC standards and ask role-aware questions through a local Ollama", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity: -v (debug), -vv (trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report whether the vector index has any entries
    Status,

    /// Rebuild the vector index from the document root
    Index,

    /// Show the chunks most similar to a query
    Search {
        /// Query text
        query: String,

        /// Caller role, e.g. risk_manager or auditeur
        #[arg(short, long, default_value = "super_admin")]
        role: Role,

        /// Number of results (configured top_k by default)
        #[arg(short)]
        k: Option<usize>,
    },

    /// Ask a question, or start an interactive chat without one
    Chat {
        /// Question; omit for interactive mode
        prompt: Option<String>,

        /// Caller role, e.g. risk_manager or auditeur
        #[arg(short, long, default_value = "super_admin")]
        role: Role,

        /// Continue an existing session id
        #[arg(short, long)]
        session: Option<String>,

        /// Wait for the complete reply instead of streaming it
        #[arg(long)]
        no_stream: bool,
    },

    /// Read or change persisted settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },

    /// Display current configuration
    Config,

    /// Run system diagnostics and health checks
    Doctor,
}

/// Settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print one setting
    Get { key: String },

    /// Create or replace a setting
    Set { key: String, value: String },

    /// Print every setting
    List,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Log level forced by the flags, if any
    pub fn log_level(&self) -> Option<&'static str> {
        match self {
            Verbosity::Quiet => Some("error"),
            Verbosity::Normal => None,
            Verbosity::Verbose => Some("debug"),
            Verbosity::VeryVerbose => Some("trace"),
        }
    }

    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
