//! Command-line argument parsing for LogSleuth
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// LogSleuth - root-cause analysis over your vectorized logs
#[derive(Parser, Debug)]
#[command(name = "logsleuth")]
#[command(version)]
#[command(about = "Retrieval-augmented root-cause analysis over operational logs", long_about = None)]
pub struct Args {
    /// Configuration file path (default: ~/.logsleuth/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
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
    /// Analyze one incident description
    Analyze {
        /// Free-text incident description
        #[arg(value_name = "ISSUE", required = true, num_args = 1..)]
        issue: Vec<String>,

        /// Print the assessment as JSON
        #[arg(long)]
        json: bool,

        /// Also print the log matches used as evidence
        #[arg(long)]
        show_logs: bool,
    },

    /// Start interactive mode, one analysis per line
    Repl,

    /// Serve the analysis pipeline over HTTP
    Serve {
        /// Bind address (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Display current configuration (secrets redacted)
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Verbosity {
    /// Log filter directive for this level
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "logsleuth=error",
            Verbosity::Normal => "logsleuth=warn",
            Verbosity::Verbose => "logsleuth=info",
            Verbosity::VeryVerbose => "logsleuth=debug",
        }
    }
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

/// Join positional words into one issue description
pub fn issue_text(words: &[String]) -> String {
    words.join(" ").trim().to_string()
}
