//! Reads the question from the terminal using rustyline

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Shown on its own line before the question is read
pub const QUESTION_PROMPT: &str = "How can I help you today?";

/// Single-line question reader
pub struct QuestionPrompt {
    editor: DefaultEditor,
    prompt: String,
}

impl QuestionPrompt {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
            prompt: String::new(),
        })
    }

    /// Print the greeting and read one line
    ///
    /// Returns:
    /// - Ok(Some(question)) for non-empty input
    /// - Ok(None) for EOF (Ctrl-D) or a blank line
    /// - Err on interrupt (Ctrl-C) or other errors
    pub fn read(&mut self) -> Result<Option<String>> {
        println!("{}", QUESTION_PROMPT);

        match self.editor.readline(&self.prompt) {
            Ok(line) => Ok(normalize_question(&line)),
            Err(ReadlineError::Interrupted) => Err(anyhow::anyhow!("Interrupted")),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }
}

/// Trim a question; blank input yields `None`
pub fn normalize_question(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_creation() {
        let prompt = QuestionPrompt::new();
        assert!(prompt.is_ok());
    }

    #[test]
    fn test_normalize_question() {
        assert_eq!(
            normalize_question("  What is the main topic?\n"),
            Some("What is the main topic?".to_string())
        );
        assert_eq!(normalize_question("   "), None);
        assert_eq!(normalize_question(""), None);
    }
}
