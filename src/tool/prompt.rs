use dialoguer::Confirm;

use crate::error::{DeployError, DeployResult};

#[cfg_attr(test, mockall::automock)]
pub trait Prompt {
    fn confirm(&self, question: &str) -> DeployResult<bool>;
}

pub struct ConsolePrompt;

impl Prompt for ConsolePrompt {
    fn confirm(&self, question: &str) -> DeployResult<bool> {
        Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
            .map_err(|e| DeployError::Prompt {
                message: e.to_string(),
            })
    }
}
