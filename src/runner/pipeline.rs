use chrono::Utc;
use std::fmt;
use std::path::PathBuf;

use crate::cli::{resolve_command, Args, Command, ParsedOptions, COMMAND_SPEC};
use crate::config::{self, DeployConfig, TargetConfig};
use crate::error::{DeployError, DeployResult};
use crate::logging::Logger;
use crate::manifest::{write_manifests, ManifestFiles};
use crate::target::{self, DeploymentRequest};
use crate::tool::{self, CommandExecutor, DeployCommand, Prompt};
use crate::versionning::resolve_version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parsed,
    ConfigLoaded,
    Validated,
    TargetResolved,
    VersionResolved,
    ManifestsWritten,
    CommandBuilt,
    Confirmed,
    Cancelled,
    Executed,
    Skipped,
    Cleaned,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parsed => "parsed",
            Stage::ConfigLoaded => "config loaded",
            Stage::Validated => "validated",
            Stage::TargetResolved => "target resolved",
            Stage::VersionResolved => "version resolved",
            Stage::ManifestsWritten => "manifests written",
            Stage::CommandBuilt => "command built",
            Stage::Confirmed => "confirmed",
            Stage::Cancelled => "cancelled",
            Stage::Executed => "executed",
            Stage::Skipped => "skipped",
            Stage::Cleaned => "cleaned",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum Outcome {
    Initialized { files: Vec<PathBuf> },
    Listed { targets: usize },
    Tested { command: DeployCommand },
    Deployed { version: String },
    Cancelled,
}

pub struct Settings {
    pub base_dir: PathBuf,
    pub config_path: PathBuf,
    pub tool: String,
}

impl Settings {
    pub fn from_args(args: &Args, base_dir: PathBuf) -> Self {
        Settings {
            config_path: base_dir.join(&args.config),
            base_dir,
            tool: args.tool.clone(),
        }
    }
}

pub struct Collaborators<'a> {
    pub executor: &'a dyn CommandExecutor,
    pub prompt: &'a dyn Prompt,
    pub logger: &'a dyn Logger,
}

struct Validated<'o> {
    options: &'o ParsedOptions,
    config: DeployConfig,
}

struct TargetResolved<'o> {
    options: &'o ParsedOptions,
    config: DeployConfig,
    request: DeploymentRequest,
    descriptor: String,
}

impl TargetResolved<'_> {
    fn target(&self) -> DeployResult<&TargetConfig> {
        self.config
            .target(&self.request.target)
            .ok_or_else(|| DeployError::UnknownTarget {
                target: self.request.target.clone(),
            })
    }

    fn app_id(&self) -> DeployResult<String> {
        self.target()?
            .app_id()
            .map(str::to_string)
            .ok_or_else(|| DeployError::MissingAppId {
                target: self.request.target.clone(),
            })
    }
}

struct VersionResolved<'o> {
    resolved: TargetResolved<'o>,
    version: String,
}

/// Everything needed to run the deployment; the manifests go away with it.
pub struct Prepared {
    pub request: DeploymentRequest,
    pub app_id: String,
    pub version: String,
    pub command: DeployCommand,
    pub files: ManifestFiles,
}

pub struct Pipeline<'a> {
    settings: &'a Settings,
    deps: &'a Collaborators<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(settings: &'a Settings, deps: &'a Collaborators<'a>) -> Self {
        Pipeline { settings, deps }
    }

    fn enter(&self, stage: Stage) {
        self.deps.logger.verbose(&format!("stage: {}", stage));
    }

    fn load<'o>(&self, options: &'o ParsedOptions) -> DeployResult<Validated<'o>> {
        self.deps.logger.verbose(&format!(
            "Loading configuration from {}",
            self.settings.config_path.display()
        ));
        let config = config::load(&self.settings.config_path)?;
        self.enter(Stage::ConfigLoaded);

        config::validate(&config, options)?;
        self.enter(Stage::Validated);
        Ok(Validated { options, config })
    }

    fn resolve_target<'o>(&self, loaded: Validated<'o>) -> DeployResult<TargetResolved<'o>> {
        let request = target::resolve(loaded.options)?;
        let descriptor = target::validate(&request, &loaded.config, &self.settings.base_dir)?;
        self.enter(Stage::TargetResolved);
        Ok(TargetResolved {
            options: loaded.options,
            config: loaded.config,
            request,
            descriptor,
        })
    }

    fn resolve_version<'o>(&self, resolved: TargetResolved<'o>) -> DeployResult<VersionResolved<'o>> {
        let app_id = resolved.app_id()?;
        let template = resolved.target()?.version_template().to_string();

        tool::check_available(self.deps.executor, &self.settings.tool)?;
        let deployed = tool::list_versions(
            self.deps.executor,
            &self.settings.tool,
            &app_id,
            resolved.request.service(),
            self.deps.logger,
        )?;

        let version = resolve_version(
            &template,
            &deployed,
            resolved.request.label.as_ref(),
            self.deps.logger,
        )?;
        self.enter(Stage::VersionResolved);

        Ok(VersionResolved { resolved, version })
    }

    fn write_manifests(&self, resolved: &TargetResolved<'_>) -> DeployResult<ManifestFiles> {
        let environment = config::environment(&resolved.request.target, resolved.target()?)?;
        let files = write_manifests(
            &self.settings.base_dir,
            &resolved.request.module,
            environment,
            &resolved.descriptor,
            Utc::now(),
        )?;
        self.deps.logger.verbose(&format!(
            "Wrote {} and {}",
            files.environment.display(),
            files.descriptor.display()
        ));
        self.enter(Stage::ManifestsWritten);
        Ok(files)
    }

    /// Runs every stage up to the built command.
    pub fn prepare(&self, options: &ParsedOptions) -> DeployResult<Prepared> {
        let loaded = self.load(options)?;
        let resolved = self.resolve_target(loaded)?;
        let VersionResolved { resolved, version } = self.resolve_version(resolved)?;
        let files = self.write_manifests(&resolved)?;

        let app_id = resolved.app_id()?;
        let command = tool::build_command(
            &self.settings.tool,
            &app_id,
            &version,
            &files.descriptor,
            resolved.options.flag("force"),
        );
        self.enter(Stage::CommandBuilt);

        Ok(Prepared {
            request: resolved.request,
            app_id,
            version,
            command,
            files,
        })
    }

    pub fn test(&self, options: &ParsedOptions) -> DeployResult<Outcome> {
        let prepared = self.prepare(options)?;
        let logger = self.deps.logger;

        logger.section("Deployment test");
        logger.info(&format!(
            "Module {} -> target {} ({})",
            prepared.request.module, prepared.request.target, prepared.app_id
        ));
        logger.info(&format!("Version {}", prepared.version));
        logger.info(&format!("Command: {}", prepared.command));
        self.enter(Stage::Skipped);

        prepared.files.cleanup()?;
        self.enter(Stage::Cleaned);
        logger.success("Test complete, nothing was deployed");

        Ok(Outcome::Tested {
            command: prepared.command,
        })
    }

    pub fn run(&self, options: &ParsedOptions) -> DeployResult<Outcome> {
        let prepared = self.prepare(options)?;
        let logger = self.deps.logger;
        let version = prepared.version.clone();

        logger.section(&format!(
            "Deploying {} to {}",
            prepared.request.module, prepared.request.target
        ));
        logger.info(&format!("Project {}", prepared.app_id));
        logger.info(&format!("Version {}", version));
        logger.verbose(&format!("Command: {}", prepared.command));

        if options.flag("force") {
            self.enter(Stage::Confirmed);
        } else {
            let question = format!(
                "Deploy version {} of {} to {}?",
                version, prepared.request.module, prepared.request.target
            );
            if !self.deps.prompt.confirm(&question)? {
                self.enter(Stage::Cancelled);
                self.enter(Stage::Skipped);
                prepared.files.cleanup()?;
                self.enter(Stage::Cleaned);
                logger.warning("Deployment cancelled");
                return Ok(Outcome::Cancelled);
            }
            self.enter(Stage::Confirmed);
        }

        tool::execute(self.deps.executor, &prepared.command)?;
        self.enter(Stage::Executed);

        prepared.files.cleanup()?;
        self.enter(Stage::Cleaned);
        logger.success(&format!("Deployed version {}", version));

        Ok(Outcome::Deployed { version })
    }

    pub fn targets(&self, options: &ParsedOptions) -> DeployResult<Outcome> {
        let loaded = self.load(options)?;
        let logger = self.deps.logger;
        let targets = loaded.config.targets.unwrap_or_default();

        logger.section("Targets");
        for (name, target) in &targets {
            logger.info(&format!(
                "{}: app_id={} version={}{}",
                name,
                target.app_id().unwrap_or_default(),
                target.version_template(),
                if target.require_label {
                    " (label required)"
                } else {
                    ""
                }
            ));
        }

        Ok(Outcome::Listed {
            targets: targets.len(),
        })
    }

    pub fn init(&self) -> DeployResult<Outcome> {
        let files = config::init(&self.settings.config_path, &self.settings.base_dir)?;
        for file in &files {
            self.deps
                .logger
                .success(&format!("Created {}", file.display()));
        }
        Ok(Outcome::Initialized { files })
    }
}

/// Parses, selects the command and runs it.
pub fn run_invocation(args: &Args, settings: &Settings, deps: &Collaborators) -> DeployResult<Outcome> {
    let options = args.to_options(&COMMAND_SPEC)?;
    let command = resolve_command(&options, &COMMAND_SPEC)?;

    let pipeline = Pipeline::new(settings, deps);
    pipeline.enter(Stage::Parsed);

    match command {
        Command::Init => pipeline.init(),
        Command::Targets => pipeline.targets(&options),
        Command::Test => pipeline.test(&options),
        Command::Run => pipeline.run(&options),
    }
}
