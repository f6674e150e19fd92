//! LogSleuth - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use logsleuth::cli::{issue_text, Args, Commands, Verbosity};
use logsleuth::config::Config;
use logsleuth::rag::DynOrchestrator;
use logsleuth::repl::{DisplayManager, ReplSession};
use logsleuth::server;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbosity());

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_env();

    match args.command {
        Commands::Analyze {
            issue,
            json,
            show_logs,
        } => {
            let orchestrator = config.build_orchestrator()?;
            cmd_analyze(&orchestrator, &issue_text(&issue), json, show_logs).await
        }
        Commands::Repl => {
            let orchestrator = config.build_orchestrator()?;
            cmd_repl(&config, &orchestrator).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let orchestrator = Arc::new(config.build_orchestrator()?);
            println!("LogSleuth listening on http://{}", bind);
            server::run_server(&bind, orchestrator).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config => {
            let shown = toml::to_string_pretty(&config.redacted())
                .context("Failed to serialize config")?;
            println!("{}", shown);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn cmd_analyze(
    orchestrator: &DynOrchestrator,
    issue: &str,
    json: bool,
    show_logs: bool,
) -> Result<ExitCode> {
    let display = if json {
        DisplayManager::plain()
    } else {
        DisplayManager::new()
    };

    let pb = (!json).then(|| display.start_analysis(issue));
    let outcome = orchestrator.investigate(issue).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let investigation = match outcome {
        Ok(investigation) => investigation,
        Err(err) => {
            display.show_error(&err);
            return Ok(ExitCode::FAILURE);
        }
    };

    if json {
        let value = if show_logs {
            serde_json::to_string_pretty(&investigation)?
        } else {
            serde_json::to_string_pretty(&investigation.assessment)?
        };
        println!("{}", value);
    } else {
        if show_logs {
            display.show_evidence(&investigation.evidence);
        }
        display.show_assessment(&investigation.assessment);
    }

    Ok(ExitCode::SUCCESS)
}

async fn cmd_repl(config: &Config, orchestrator: &DynOrchestrator) -> Result<()> {
    let mut session = match Config::history_path() {
        Some(path) => ReplSession::with_history(path)?,
        None => ReplSession::new()?,
    };

    session
        .display()
        .show_banner(env!("CARGO_PKG_VERSION"), config.model.model_name());

    session.run(orchestrator).await?;
    println!("Goodbye! ({} analyses)", session.analyses());
    Ok(())
}
