pub use self::executor::{CommandExecutor, SystemExecutor};
pub use self::gcloud::{build_command, check_available, execute, list_versions, DeployCommand};
pub use self::prompt::{ConsolePrompt, Prompt};

#[cfg(test)]
pub use self::executor::{CommandOutput, MockCommandExecutor};
#[cfg(test)]
pub use self::prompt::MockPrompt;

mod executor;
mod gcloud;
mod prompt;
