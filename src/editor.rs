//! Text editing collaborators
//!
//! The tree asks a [`TextEditor`] for replacement text and owns all parsing and
//! validation itself. Returning `None` cancels the edit.

use dialoguer::Input;
use tracing::warn;

pub trait TextEditor {
    /// Offer `current` for editing; `None` means the user cancelled.
    fn edit_text(&mut self, current: &str) -> Option<String>;
}

impl<F> TextEditor for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn edit_text(&mut self, current: &str) -> Option<String> {
        self(current)
    }
}

/// Always answers with the same text. Used by the batch runner.
#[derive(Debug, Clone)]
pub struct FixedText(pub String);

impl FixedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl TextEditor for FixedText {
    fn edit_text(&mut self, _current: &str) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Interactive terminal prompt pre-filled with the current value
#[derive(Debug, Clone)]
pub struct PromptEditor {
    prompt: String,
}

impl PromptEditor {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl TextEditor for PromptEditor {
    fn edit_text(&mut self, current: &str) -> Option<String> {
        let result: Result<String, _> = Input::new()
            .with_prompt(&self.prompt)
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text();
        match result {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "Prompt cancelled");
                None
            }
        }
    }
}
