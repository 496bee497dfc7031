use std::collections::BTreeMap;

use crate::error::{DeployError, DeployResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Init,
    Targets,
    Test,
    Run,
}

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Command::Init => "init",
            Command::Targets => "targets",
            Command::Test => "test",
            Command::Run => "run",
        }
    }

    pub fn failure_title(self) -> &'static str {
        match self {
            Command::Init => "Initialization failed",
            Command::Targets => "Listing targets failed",
            Command::Test => "Deployment test failed",
            Command::Run => "Deployment failed",
        }
    }
}

pub struct CommandDef {
    pub command: Command,
    pub about: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    pub flags: &'static [&'static str],
}

pub struct CommandSpec {
    pub commands: &'static [CommandDef],
    pub global_flags: &'static [&'static str],
}

pub const COMMAND_SPEC: CommandSpec = CommandSpec {
    commands: &[
        CommandDef {
            command: Command::Init,
            about: "write a scaffold configuration and a blank env.yaml",
            required: &[],
            optional: &[],
            flags: &[],
        },
        CommandDef {
            command: Command::Targets,
            about: "list the configured targets",
            required: &[],
            optional: &[],
            flags: &[],
        },
        CommandDef {
            command: Command::Test,
            about: "resolve everything and print the deploy command without running it",
            required: &["module", "target"],
            optional: &["label"],
            flags: &[],
        },
        CommandDef {
            command: Command::Run,
            about: "deploy a module to a target",
            required: &["module", "target"],
            optional: &["label"],
            flags: &["force"],
        },
    ],
    global_flags: &["verbose"],
};

impl CommandSpec {
    pub fn find(&self, name: &str) -> Option<&CommandDef> {
        self.commands.iter().find(|def| def.command.name() == name)
    }

    /// Usage summary printed next to every usage error.
    pub fn usage(&self) -> String {
        let mut usage = String::from("Usage: deployer <COMMAND> [OPTIONS]\n\nCommands:\n");
        for def in self.commands {
            let mut line = format!("  {:<8}", def.command.name());
            for name in def.required {
                line.push_str(&format!(" --{}=<{}>", name, name));
            }
            for name in def.optional {
                line.push_str(&format!(" [--{}=<{}>]", name, name));
            }
            for name in def.flags {
                line.push_str(&format!(" [--{}]", name));
            }
            usage.push_str(&format!("{}\n{:10}{}\n", line, "", def.about));
        }
        usage.push_str("\nGlobal flags:\n");
        for name in self.global_flags {
            usage.push_str(&format!("  --{}\n", name));
        }
        usage
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Value(String),
    Flag,
}

/// Name-keyed view of the invocation, built once and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOptions {
    entries: BTreeMap<String, OptionValue>,
}

impl ParsedOptions {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, OptionValue)>,
    {
        ParsedOptions {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        match self.entries.get(name) {
            Some(OptionValue::Value(value)) => Some(value),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(OptionValue::Flag))
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

/// Picks the single command present in `options` and checks its required parameters.
pub fn resolve_command(options: &ParsedOptions, spec: &CommandSpec) -> DeployResult<Command> {
    let selected: Vec<&CommandDef> = spec
        .commands
        .iter()
        .filter(|def| options.flag(def.command.name()))
        .collect();

    if selected.len() != 1 {
        return Err(DeployError::CommandCount {
            count: selected.len(),
        });
    }

    let def = selected[0];
    let missing: Vec<String> = def
        .required
        .iter()
        .filter(|name| options.value(name).is_none())
        .map(|name| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(DeployError::MissingParameters { missing });
    }

    Ok(def.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(entries: &[(&str, Option<&str>)]) -> ParsedOptions {
        ParsedOptions::from_entries(entries.iter().map(|(name, value)| {
            let value = match value {
                Some(v) => OptionValue::Value(v.to_string()),
                None => OptionValue::Flag,
            };
            (name.to_string(), value)
        }))
    }

    #[test]
    fn test_resolve_single_command() {
        let parsed = options(&[("targets", None), ("verbose", None)]);
        assert_eq!(
            resolve_command(&parsed, &COMMAND_SPEC).unwrap(),
            Command::Targets
        );

        let parsed = options(&[
            ("run", None),
            ("module", Some("default")),
            ("target", Some("staging")),
        ]);
        assert_eq!(resolve_command(&parsed, &COMMAND_SPEC).unwrap(), Command::Run);
    }

    #[test]
    fn test_resolve_rejects_zero_or_many_commands() {
        let err = resolve_command(&options(&[("verbose", None)]), &COMMAND_SPEC).unwrap_err();
        assert!(matches!(err, DeployError::CommandCount { count: 0 }));

        let parsed = options(&[
            ("run", None),
            ("test", None),
            ("module", Some("app")),
            ("target", Some("prod")),
        ]);
        let err = resolve_command(&parsed, &COMMAND_SPEC).unwrap_err();
        assert!(matches!(err, DeployError::CommandCount { count: 2 }));

        let parsed = options(&[("init", None), ("targets", None), ("run", None)]);
        let err = resolve_command(&parsed, &COMMAND_SPEC).unwrap_err();
        assert!(matches!(err, DeployError::CommandCount { count: 3 }));
    }

    #[test]
    fn test_resolve_lists_missing_parameters() {
        let err = resolve_command(&options(&[("run", None)]), &COMMAND_SPEC).unwrap_err();
        match err {
            DeployError::MissingParameters { missing } => {
                assert_eq!(missing, vec!["module", "target"])
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let parsed = options(&[("test", None), ("module", Some("app"))]);
        match resolve_command(&parsed, &COMMAND_SPEC).unwrap_err() {
            DeployError::MissingParameters { missing } => assert_eq!(missing, vec!["target"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_usage_mentions_every_command() {
        let usage = COMMAND_SPEC.usage();
        for name in ["init", "targets", "test", "run"] {
            assert!(usage.contains(name), "usage is missing {}", name);
        }
        assert!(usage.contains("--module=<module>"));
        assert!(usage.contains("[--label=<label>]"));
        assert!(usage.contains("[--force]"));
    }

    #[test]
    fn test_parsed_options_accessors() {
        let parsed = options(&[("label", Some("rc1")), ("force", None)]);
        assert_eq!(parsed.value("label"), Some("rc1"));
        assert!(parsed.flag("force"));
        assert!(!parsed.flag("label"));
        assert_eq!(parsed.value("force"), None);
        assert!(!parsed.has("module"));
    }
}
