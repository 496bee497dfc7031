use clap::Parser;
use std::path::PathBuf;

mod cli;
mod config;
mod error;
mod logging;
mod manifest;
mod runner;
mod target;
mod tool;
mod versionning;

use cli::{Args, COMMAND_SPEC};
use error::{DeployError, ErrorKind};
use logging::{ConsoleLogger, Logger};
use runner::{run_invocation, Collaborators, Settings};
use tool::{ConsolePrompt, SystemExecutor};

fn main() {
    let args = Args::parse();
    let logger = ConsoleLogger::new(args.verbose);

    let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let settings = Settings::from_args(&args, base_dir);
    let deps = Collaborators {
        executor: &SystemExecutor,
        prompt: &ConsolePrompt,
        logger: &logger,
    };

    if let Err(err) = run_invocation(&args, &settings, &deps) {
        if err.kind() == ErrorKind::Usage {
            eprintln!("{}", COMMAND_SPEC.usage());
        }
        logger.failure(failure_title(&args, &err), &err.to_string());
        std::process::exit(err.exit_code());
    }
}

/// Banner title naming what the invocation was trying to do.
fn failure_title(args: &Args, err: &DeployError) -> &'static str {
    if err.kind() == ErrorKind::Usage {
        return "Invalid usage";
    }
    match args.commands.as_slice() {
        [name] => COMMAND_SPEC
            .find(name)
            .map_or("Command failed", |def| def.command.failure_title()),
        _ => "Command failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("deployer").chain(tokens.iter().copied())).unwrap()
    }

    #[test]
    fn test_failure_title_names_the_command() {
        let missing = DeployError::ConfigNotFound {
            path: PathBuf::from("deploy.json"),
        };
        assert_eq!(failure_title(&args(&["targets"]), &missing), "Listing targets failed");
        assert_eq!(failure_title(&args(&["init"]), &missing), "Initialization failed");
        assert_eq!(
            failure_title(&args(&["test", "--module=app", "--target=prod"]), &missing),
            "Deployment test failed"
        );
        assert_eq!(
            failure_title(
                &args(&["run", "--module=app", "--target=prod"]),
                &DeployError::DeployFailed { code: Some(1) }
            ),
            "Deployment failed"
        );
    }

    #[test]
    fn test_failure_title_for_usage_errors() {
        let err = DeployError::CommandCount { count: 0 };
        assert_eq!(failure_title(&args(&[]), &err), "Invalid usage");

        let err = DeployError::UnknownCommand {
            name: "deploy".to_string(),
        };
        assert_eq!(failure_title(&args(&["deploy"]), &err), "Invalid usage");
    }
}
