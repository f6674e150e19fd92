//! CLI module for LogSleuth
//!
//! Handles command-line argument parsing.

pub mod args;

pub use args::{issue_text, Args, Commands, Verbosity};
