use serde::Deserialize;
use std::fmt;
use std::path::Path;

use super::executor::CommandExecutor;
use crate::error::{DeployError, DeployResult};
use crate::logging::Logger;

/// Fully assembled deployment tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for DeployCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

pub fn build_command(
    tool: &str,
    project_id: &str,
    version: &str,
    descriptor: &Path,
    quiet: bool,
) -> DeployCommand {
    let mut args = vec![
        "app".to_string(),
        "deploy".to_string(),
        descriptor.display().to_string(),
        format!("--project={}", project_id),
        format!("--version={}", version),
        "--no-promote".to_string(),
        "--format=json".to_string(),
    ];
    if quiet {
        args.push("--quiet".to_string());
    }

    DeployCommand {
        program: tool.to_string(),
        args,
    }
}

/// Fails unless `<tool> --version` runs and exits cleanly.
pub fn check_available(executor: &dyn CommandExecutor, tool: &str) -> DeployResult<()> {
    let output = executor
        .output(tool, &["--version".to_string()])
        .map_err(|e| DeployError::ToolUnavailable {
            tool: tool.to_string(),
            message: e.to_string(),
        })?;

    if !output.success() {
        return Err(DeployError::ToolUnavailable {
            tool: tool.to_string(),
            message: output.stderr.trim().to_string(),
        });
    }
    Ok(())
}

#[derive(Deserialize)]
struct DeployedVersion {
    id: String,
}

/// Lists the version ids currently deployed for `service` in project `app_id`.
pub fn list_versions(
    executor: &dyn CommandExecutor,
    tool: &str,
    app_id: &str,
    service: &str,
    logger: &dyn Logger,
) -> DeployResult<Vec<String>> {
    let args = vec![
        "app".to_string(),
        "versions".to_string(),
        "list".to_string(),
        format!("--project={}", app_id),
        format!("--service={}", service),
        "--format=json".to_string(),
    ];
    let command = format!("{} {}", tool, args.join(" "));
    logger.verbose(&format!("Listing deployed versions: {}", command));

    let output = executor
        .output(tool, &args)
        .map_err(|e| DeployError::ToolFailed {
            command: command.clone(),
            message: e.to_string(),
        })?;

    if !output.success() {
        // A service that was never deployed has no versions yet.
        if output.stderr.contains(&format!("Service [{}] not found", service)) {
            logger.verbose(&format!("Service {} has no deployed versions", service));
            return Ok(Vec::new());
        }
        return Err(DeployError::ToolFailed {
            command,
            message: output.stderr.trim().to_string(),
        });
    }

    if output.stdout.trim().is_empty() {
        return Ok(Vec::new());
    }

    let versions: Vec<DeployedVersion> =
        serde_json::from_str(&output.stdout).map_err(|e| DeployError::ToolFailed {
            command,
            message: format!("unexpected output: {}", e),
        })?;

    Ok(versions.into_iter().map(|version| version.id).collect())
}

/// Runs the deployment attached to the terminal.
pub fn execute(executor: &dyn CommandExecutor, command: &DeployCommand) -> DeployResult<()> {
    let code = executor
        .status(&command.program, &command.args)
        .map_err(|e| DeployError::ToolUnavailable {
            tool: command.program.clone(),
            message: e.to_string(),
        })?;

    match code {
        Some(0) => Ok(()),
        code => Err(DeployError::DeployFailed { code }),
    }
}
