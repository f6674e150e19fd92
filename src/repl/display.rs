//! Terminal rendering for assessments, evidence and errors

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::errors::RcaError;
use crate::rag::context::FieldAlternatives;
use crate::rag::context::LogField;
use crate::types::{Assessment, RetrievalResult, Severity};

/// Spinner refresh interval (10 FPS)
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Display manager for CLI and REPL output
pub struct DisplayManager {
    color: bool,
}

impl DisplayManager {
    pub fn new() -> Self {
        DisplayManager { color: true }
    }

    /// Plain output, used when stdout is not a terminal
    pub fn plain() -> Self {
        DisplayManager { color: false }
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, model: &str) {
        let width = 64;
        println!("\n{}", "=".repeat(width).cyan());
        println!("{}", format!("  LogSleuth {} - Incident Triage", version).bold().cyan());
        println!("{}", format!("  Model: {} | Mode: REPL", model).dimmed());
        println!("{}\n", "=".repeat(width).cyan());
        println!(
            "Describe the incident (or {} to quit)\n",
            "exit".green()
        );
    }

    /// Spinner shown while a request is in flight
    pub fn start_analysis(&self, issue: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} Analyzing... {msg}") {
            pb.set_style(style);
        }
        pb.set_message(truncate(issue, 60));
        pb.enable_steady_tick(TICK_INTERVAL);
        pb
    }

    pub fn render_assessment(&self, assessment: &Assessment) -> String {
        let severity = self.paint_severity(assessment.severity);
        format!(
            "{}\n  {:<15}{}\n  {:<15}{}\n  {:<15}{}\n  {:<15}{}",
            self.paint("Root-cause assessment", |s| s.bold().cyan()),
            "Cause:",
            assessment.cause,
            "Service:",
            assessment.service,
            "Severity:",
            severity,
            "Possible fixes:",
            assessment.possible_fixes
        )
    }

    pub fn render_evidence(&self, evidence: &RetrievalResult) -> String {
        if evidence.is_empty() {
            return self.paint("No log evidence retrieved.", |s| s.dimmed());
        }

        let fields = FieldAlternatives::default();
        let mut lines = vec![self.paint("Evidence", |s| s.bold().cyan())];
        for (idx, entry) in evidence.iter().enumerate() {
            lines.push(format!(
                "  {}. {} ({:.3}) {}",
                idx + 1,
                entry.id,
                entry.score,
                truncate(fields.resolve(LogField::Text, entry), 100)
            ));
        }
        lines.join("\n")
    }

    pub fn render_error(&self, error: &RcaError) -> String {
        format!(
            "{} {}",
            self.paint(&format!("Error [{}]:", error.kind()), |s| s.red().bold()),
            error
        )
    }

    pub fn show_assessment(&self, assessment: &Assessment) {
        println!("\n{}\n", self.render_assessment(assessment));
    }

    pub fn show_evidence(&self, evidence: &RetrievalResult) {
        println!("{}\n", self.render_evidence(evidence));
    }

    pub fn show_error(&self, error: &RcaError) {
        eprintln!("{}", self.render_error(error));
    }

    fn paint_severity(&self, severity: Severity) -> String {
        let label = severity.as_str().to_uppercase();
        match severity {
            Severity::High => self.paint(&label, |s| s.red().bold()),
            Severity::Medium => self.paint(&label, |s| s.yellow().bold()),
            Severity::Low => self.paint(&label, |s| s.green()),
        }
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &flat[..byte_idx]),
        None => flat,
    }
}
