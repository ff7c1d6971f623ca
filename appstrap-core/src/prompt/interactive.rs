//! Terminal prompter backed by dialoguer.

use super::{PromptError, Prompter};
use dialoguer::{Confirm, Input, Password, Select};

pub struct InteractivePrompter;

impl Prompter for InteractivePrompter {
    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError> {
        Ok(Confirm::new().with_prompt(message).default(default).interact()?)
    }

    fn input(&self, message: &str, allow_empty: bool) -> Result<String, PromptError> {
        let answer: String = Input::new()
            .with_prompt(message)
            .allow_empty(allow_empty)
            .interact_text()?;
        Ok(answer.trim().to_string())
    }

    fn password(&self, message: &str) -> Result<String, PromptError> {
        Ok(Password::new().with_prompt(message).interact()?)
    }

    fn select(
        &self,
        message: &str,
        items: &[String],
        default: usize,
    ) -> Result<usize, PromptError> {
        Ok(Select::new().with_prompt(message).items(items).default(default).interact()?)
    }
}
