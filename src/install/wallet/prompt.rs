//! Operator prompts

use inquire::error::InquireError;
use inquire::{Password, PasswordDisplayMode, Text};

use crate::install::error::SetupError;

/// Source of operator answers.
///
/// The installer talks to the operator only through this trait so the
/// dialogue can be replayed from a script.
pub trait Prompter {
    /// Free-text answer
    fn text(&mut self, message: &str) -> Result<String, SetupError>;

    /// Answer that must not be echoed
    fn secret(&mut self, message: &str) -> Result<String, SetupError>;

    /// Yes/no question; only `y` or `Y` counts as yes
    fn confirm(&mut self, message: &str) -> Result<bool, SetupError> {
        let answer = self.text(&format!("{message} (y/n)"))?;
        Ok(is_affirmative(&answer))
    }
}

/// A single `y`, case-insensitive, surrounding whitespace ignored.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Terminal prompts via `inquire`
#[derive(Debug, Default)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn text(&mut self, message: &str) -> Result<String, SetupError> {
        Text::new(message).prompt().map_err(map_inquire)
    }

    fn secret(&mut self, message: &str) -> Result<String, SetupError> {
        Password::new(message)
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()
            .map_err(map_inquire)
    }
}

fn map_inquire(e: InquireError) -> SetupError {
    match e {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            SetupError::Cancelled
        }
        other => SetupError::Prompt(other.to_string()),
    }
}
