use std::process::Command;

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs the program to completion and captures its output.
    fn output(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput>;

    /// Runs the program attached to the terminal and returns its exit code.
    fn status(&self, program: &str, args: &[String]) -> std::io::Result<Option<i32>>;
}

pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn output(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn status(&self, program: &str, args: &[String]) -> std::io::Result<Option<i32>> {
        Ok(Command::new(program).args(args).status()?.code())
    }
}
