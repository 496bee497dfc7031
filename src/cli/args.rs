use clap::Parser;
use std::path::PathBuf;

use super::spec::{CommandSpec, OptionValue, ParsedOptions};
use crate::error::{DeployError, DeployResult};

#[derive(Parser, Debug)]
#[command(author, version, about = "Deploy an application module to a configured target", long_about = None)]
pub struct Args {
    /// One of: init, targets, test, run
    #[arg(value_name = "COMMAND")]
    pub commands: Vec<String>,
    #[arg(long)]
    pub module: Option<String>,
    #[arg(long)]
    pub target: Option<String>,
    #[arg(long)]
    pub label: Option<String>,
    #[arg(short, long)]
    pub verbose: bool,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub force: bool,
    #[arg(short, long, env = "DEPLOYER_CONFIG", default_value = "deploy.json")]
    pub config: PathBuf,
    /// Deployment tool executable
    #[arg(long, env = "DEPLOYER_TOOL", default_value = "gcloud")]
    pub tool: String,
}

impl Args {
    pub fn to_options(&self, spec: &CommandSpec) -> DeployResult<ParsedOptions> {
        let mut entries = Vec::new();

        for name in &self.commands {
            if spec.find(name).is_none() {
                return Err(DeployError::UnknownCommand { name: name.clone() });
            }
            entries.push((name.clone(), OptionValue::Flag));
        }

        let values = [
            ("module", &self.module),
            ("target", &self.target),
            ("label", &self.label),
        ];
        for (name, value) in values {
            if let Some(value) = value {
                entries.push((name.to_string(), OptionValue::Value(value.clone())));
            }
        }

        let flags = [("verbose", self.verbose), ("force", self.force)];
        for (name, set) in flags {
            if set {
                entries.push((name.to_string(), OptionValue::Flag));
            }
        }

        Ok(ParsedOptions::from_entries(entries))
    }
}
