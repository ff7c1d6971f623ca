//! User interaction seam
//!
//! Business logic asks questions through the [`Prompter`] trait and never
//! touches the terminal directly, so decisions stay unit-testable without
//! simulating one. The interactive implementation is dialoguer-backed.

pub mod interactive;
#[cfg(test)]
pub mod scripted;

pub use interactive::InteractivePrompter;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("interaction failed: {0}")]
    Io(String),

    #[error("prompt cancelled by user")]
    Cancelled,
}

impl From<dialoguer::Error> for PromptError {
    fn from(err: dialoguer::Error) -> Self {
        PromptError::Io(err.to_string())
    }
}

/// How questions reach the user. Implementations must not reorder or batch
/// questions; every call is a synchronous suspension point for the run.
pub trait Prompter: Send + Sync {
    /// Yes/no question with a default answer.
    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError>;

    /// Free-form input. With `allow_empty`, an empty answer is returned
    /// as-is instead of re-prompting.
    fn input(&self, message: &str, allow_empty: bool) -> Result<String, PromptError>;

    /// Hidden input for credentials.
    fn password(&self, message: &str) -> Result<String, PromptError>;

    /// Pick one item; returns the selected index.
    fn select(&self, message: &str, items: &[String], default: usize)
        -> Result<usize, PromptError>;
}
