//! Sources of input lines for the interactive loop.

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::collections::VecDeque;

/// Result of asking a line source for the next line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A complete line, without its trailing newline.
    Line(String),
    /// The pending line was abandoned by an interrupt; prompt again.
    Interrupted,
    /// No more input.
    Eof,
}

pub trait LineSource {
    /// Show `prompt` and block until a line, an interrupt or end of input.
    fn next_line(&mut self, prompt: &str) -> Result<ReadOutcome, ReadlineError>;

    /// Make `line` available for recall while editing later lines.
    fn add_history(&mut self, _line: &str) {}
}

/// Line editor on the terminal.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    /// Create an editor whose recall list starts with `seed`.
    pub fn new(seed: &[String]) -> rustyline::Result<Self> {
        let mut editor = DefaultEditor::new()?;
        for entry in seed {
            editor.add_history_entry(entry.as_str())?;
        }
        Ok(Self { editor })
    }
}

impl LineSource for EditorSource {
    fn next_line(&mut self, prompt: &str) -> Result<ReadOutcome, ReadlineError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(err),
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            log::warn!("cannot add line to recall list: {e}");
        }
    }
}

/// Replays a fixed sequence of outcomes, then reports end of input.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    pending: VecDeque<ReadOutcome>,
    prompts: Vec<String>,
}

impl ScriptedSource {
    pub fn new(outcomes: impl IntoIterator<Item = ReadOutcome>) -> Self {
        Self {
            pending: outcomes.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl LineSource for ScriptedSource {
    fn next_line(&mut self, prompt: &str) -> Result<ReadOutcome, ReadlineError> {
        self.prompts.push(prompt.to_string());
        Ok(self.pending.pop_front().unwrap_or(ReadOutcome::Eof))
    }
}
