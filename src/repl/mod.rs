//! REPL (Read-Eval-Print Loop) for interactive triage
//!
//! Each non-empty line is one independent analysis; nothing carries over
//! from one line to the next.

pub mod display;
pub mod input;

use anyhow::Result;
use std::path::PathBuf;

use crate::models::GenerativeModel;
use crate::rag::retrieval::VectorStore;
use crate::rag::RcaOrchestrator;
pub use crate::repl::display::DisplayManager;
use crate::repl::input::{InputHandler, UserInput};

/// REPL session coordinator
pub struct ReplSession {
    input_handler: InputHandler,
    display_manager: DisplayManager,
    analyses: usize,
}

impl ReplSession {
    pub fn new() -> Result<Self> {
        Ok(ReplSession {
            input_handler: InputHandler::new()?,
            display_manager: DisplayManager::new(),
            analyses: 0,
        })
    }

    /// Create REPL session with persistent history
    pub fn with_history(history_path: PathBuf) -> Result<Self> {
        Ok(ReplSession {
            input_handler: InputHandler::with_history(history_path)?,
            display_manager: DisplayManager::new(),
            analyses: 0,
        })
    }

    pub fn display(&self) -> &DisplayManager {
        &self.display_manager
    }

    /// Number of analyses run in this session
    pub fn analyses(&self) -> usize {
        self.analyses
    }

    /// Run until the user exits; analysis failures are shown and the loop continues
    pub async fn run<V, M>(&mut self, orchestrator: &RcaOrchestrator<V, M>) -> Result<()>
    where
        V: VectorStore,
        M: GenerativeModel,
    {
        loop {
            let issue = match self.input_handler.read_input()? {
                UserInput::Issue(issue) => issue,
                UserInput::Empty => continue,
                UserInput::Exit => break,
            };

            let pb = self.display_manager.start_analysis(&issue);
            let outcome = orchestrator.analyze(&issue).await;
            pb.finish_and_clear();
            self.analyses += 1;

            match outcome {
                Ok(assessment) => self.display_manager.show_assessment(&assessment),
                Err(err) => self.display_manager.show_error(&err),
            }
        }

        self.input_handler.save_history()?;
        Ok(())
    }
}
