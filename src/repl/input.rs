//! Input handler for the REPL using rustyline
//!
//! Provides readline editing with optional persistent history.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::History;
use rustyline::DefaultEditor;
use std::path::PathBuf;

const DEFAULT_PROMPT: &str = "issue> ";

/// Words that end the session
const EXIT_WORDS: [&str; 4] = ["exit", "quit", "/exit", "/quit"];

/// One line read from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// Incident description to analyze
    Issue(String),
    /// Blank line
    Empty,
    /// Exit word, Ctrl-D or Ctrl-C
    Exit,
}

/// Classify a raw input line
pub fn classify(line: &str) -> UserInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        UserInput::Empty
    } else if EXIT_WORDS.contains(&trimmed.to_lowercase().as_str()) {
        UserInput::Exit
    } else {
        UserInput::Issue(trimmed.to_string())
    }
}

/// Input handler managing the readline interface and history
pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    prompt: String,
}

impl InputHandler {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()?;

        Ok(InputHandler {
            editor,
            history_path: None,
            prompt: DEFAULT_PROMPT.to_string(),
        })
    }

    /// Create input handler with persistent history
    pub fn with_history(history_file: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        if history_file.exists() {
            let _ = editor.load_history(&history_file);
        }

        Ok(InputHandler {
            editor,
            history_path: Some(history_file),
            prompt: DEFAULT_PROMPT.to_string(),
        })
    }

    /// Read and classify one line
    pub fn read_input(&mut self) -> Result<UserInput> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                let input = classify(&line);
                if let UserInput::Issue(ref text) = input {
                    let _ = self.editor.add_history_entry(text.as_str());
                }
                Ok(input)
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(UserInput::Exit),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }

    /// Save history to disk
    pub fn save_history(&mut self) -> Result<()> {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            self.editor.save_history(path)?;
        }
        Ok(())
    }

    pub fn history_len(&self) -> usize {
        self.editor.history().len()
    }
}
