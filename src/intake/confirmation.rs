use anyhow::Result;
use dialoguer::Confirm;

/// Decision source for destructive actions. Callers decide how the question is asked; the
/// tracker only cares about the answer.
#[cfg_attr(test, mockall::automock)]
pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// An answer the caller already has, e.g. from a `--yes` flag.
impl Confirmation for bool {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(*self)
    }
}

/// Asks on the terminal, defaulting to "no".
pub struct TerminalConfirmation;

impl Confirmation for TerminalConfirmation {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }
}
