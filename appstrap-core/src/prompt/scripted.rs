//! Scripted prompter for tests: canned answers, recorded questions.

use super::{PromptError, Prompter};
use std::sync::Mutex;

#[derive(Default)]
pub struct ScriptedPrompter {
    confirms: Mutex<Vec<bool>>,
    inputs: Mutex<Vec<String>>,
    selects: Mutex<Vec<usize>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_confirm(self, answer: bool) -> Self {
        self.confirms.lock().unwrap().push(answer);
        self
    }

    pub fn push_input(self, answer: &str) -> Self {
        self.inputs.lock().unwrap().push(answer.to_string());
        self
    }

    pub fn push_select(self, answer: usize) -> Self {
        self.selects.lock().unwrap().push(answer);
        self
    }

    /// Every question asked, in order.
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }

    fn record(&self, question: &str) {
        self.questions.lock().unwrap().push(question.to_string());
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError> {
        self.record(message);
        let mut queue = self.confirms.lock().unwrap();
        if queue.is_empty() {
            Ok(default)
        } else {
            Ok(queue.remove(0))
        }
    }

    fn input(&self, message: &str, _allow_empty: bool) -> Result<String, PromptError> {
        self.record(message);
        let mut queue = self.inputs.lock().unwrap();
        if queue.is_empty() {
            Err(PromptError::Io("no scripted input".to_string()))
        } else {
            Ok(queue.remove(0))
        }
    }

    fn password(&self, message: &str) -> Result<String, PromptError> {
        self.input(message, false)
    }

    fn select(&self, message: &str, items: &[String], default: usize) -> Result<usize, PromptError> {
        self.record(message);
        let mut queue = self.selects.lock().unwrap();
        let idx = if queue.is_empty() { default } else { queue.remove(0) };
        if idx >= items.len() {
            return Err(PromptError::Io(format!("scripted index {} out of range", idx)));
        }
        Ok(idx)
    }
}
