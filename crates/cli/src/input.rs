//! Line input for the interactive ask loop.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Words that end the interactive loop, compared case-insensitively.
pub const EXIT_TOKENS: [&str; 4] = ["sair", "exit", "quit", "q"];

/// One line read from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Question(String),
    Blank,
    Exit,
}

impl Line {
    /// Classify raw input.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Line::Blank
        } else if EXIT_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
        {
            Line::Exit
        } else {
            Line::Question(trimmed.to_string())
        }
    }
}

/// Readline editor with history kept under the workspace.
pub struct InputHandler {
    editor: DefaultEditor,
    history_path: PathBuf,
    prompt: String,
}

impl InputHandler {
    pub fn new(history_path: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        if history_path.exists() {
            // Unreadable history is not worth failing over
            let _ = editor.load_history(&history_path);
        }

        Ok(Self {
            editor,
            history_path,
            prompt: "pergunta> ".to_string(),
        })
    }

    /// Read the next line; Ctrl-C and Ctrl-D read as `Exit`.
    pub fn read_line(&mut self) -> Result<Line> {
        match self.editor.readline(&self.prompt) {
            Ok(raw) => {
                let line = Line::parse(&raw);
                if let Line::Question(question) = &line {
                    let _ = self.editor.add_history_entry(question.as_str());
                }
                Ok(line)
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(Line::Exit),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }

    pub fn save_history(&mut self) -> Result<()> {
        self.editor.save_history(&self.history_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_tokens_case_insensitive() {
        for raw in ["sair", "SAIR", "Exit", "quit", " q ", "Q"] {
            assert_eq!(Line::parse(raw), Line::Exit, "{:?}", raw);
        }
    }

    #[test]
    fn test_blank_and_questions() {
        assert_eq!(Line::parse(""), Line::Blank);
        assert_eq!(Line::parse("   \t"), Line::Blank);
        assert_eq!(
            Line::parse("  What is the capital?  "),
            Line::Question("What is the capital?".to_string())
        );
        assert_eq!(
            Line::parse("quit smoking tips"),
            Line::Question("quit smoking tips".to_string())
        );
    }
}
