use std::io::{self, IsTerminal, Write};

use dialoguer::{Confirm, Input};

use crate::domain::AppError;
use crate::ports::Prompt;

/// Operator prompts on the controlling terminal.
///
/// Falls back to plain line reads when stdin/stdout are not terminals, so
/// answers can be piped in.
#[derive(Debug, Clone, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }

    fn is_terminal() -> bool {
        io::stdin().is_terminal() && io::stdout().is_terminal()
    }

    fn read_line(message: &str) -> Result<String, AppError> {
        print!("{message}: ");
        io::stdout().flush().map_err(|e| AppError::PromptFailed(e.to_string()))?;

        let mut line = String::new();
        io::stdin().read_line(&mut line).map_err(|e| AppError::PromptFailed(e.to_string()))?;
        Ok(line.trim().to_string())
    }
}

impl Prompt for TerminalPrompt {
    fn input(&self, message: &str) -> Result<String, AppError> {
        if Self::is_terminal() {
            return Input::new()
                .with_prompt(message)
                .interact_text()
                .map_err(|e| AppError::PromptFailed(e.to_string()));
        }

        Self::read_line(message)
    }

    fn confirm(&self, message: &str) -> Result<bool, AppError> {
        if Self::is_terminal() {
            return Confirm::new()
                .with_prompt(message)
                .default(false)
                .interact()
                .map_err(|e| AppError::PromptFailed(e.to_string()));
        }

        let answer = Self::read_line(&format!("{message} (y/n)"))?;
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }

    fn pause(&self, message: &str) -> Result<(), AppError> {
        print!("{message}");
        io::stdout().flush().map_err(|e| AppError::PromptFailed(e.to_string()))?;

        let mut line = String::new();
        io::stdin().read_line(&mut line).map_err(|e| AppError::PromptFailed(e.to_string()))?;
        Ok(())
    }
}
