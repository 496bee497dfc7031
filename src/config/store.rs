use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{DeployConfig, TargetConfig, DEFAULT_VERSION_TEMPLATE};
use crate::cli::ParsedOptions;
use crate::error::{DeployError, DeployResult};

pub const ENV_PLACEHOLDER_FILE: &str = "env.yaml";

fn read_object(path: &Path) -> DeployResult<Map<String, Value>> {
    if !path.exists() {
        return Err(DeployError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let parse_error = |message: String| DeployError::ConfigParse {
        path: path.to_path_buf(),
        message,
    };

    let raw = fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;
    match serde_json::from_str(&raw).map_err(|e| parse_error(e.to_string()))? {
        Value::Object(object) => Ok(object),
        _ => Err(parse_error("expected a JSON object".to_string())),
    }
}

/// Loads the configuration at `path`, following a top-level `file` redirect once.
pub fn load(path: &Path) -> DeployResult<DeployConfig> {
    let root = read_object(path)?;

    let (effective_path, mut object) = match root.get("file") {
        Some(Value::String(redirect)) => {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            let redirected = base.join(redirect);
            let object = read_object(&redirected)?;
            (redirected, object)
        }
        Some(_) => {
            return Err(DeployError::ConfigParse {
                path: path.to_path_buf(),
                message: "'file' must be a path string".to_string(),
            })
        }
        None => (path.to_path_buf(), root),
    };

    // A second redirect is never followed.
    object.remove("file");

    serde_json::from_value(Value::Object(object)).map_err(|e| DeployError::ConfigParse {
        path: effective_path,
        message: e.to_string(),
    })
}

pub fn validate(config: &DeployConfig, options: &ParsedOptions) -> DeployResult<()> {
    let targets = match &config.targets {
        Some(targets) if !targets.is_empty() => targets,
        _ => return Err(DeployError::NoTargets),
    };

    let selected = options.value("target");
    for (name, target) in targets {
        if target.app_id().is_none() {
            return Err(DeployError::MissingAppId {
                target: name.clone(),
            });
        }
        if target.require_label && selected == Some(name.as_str()) && !options.has("label") {
            return Err(DeployError::LabelRequired {
                target: name.clone(),
            });
        }
    }

    Ok(())
}

/// Returns the inline environment of a target.
pub fn environment<'a>(name: &str, target: &'a TargetConfig) -> DeployResult<&'a Map<String, Value>> {
    if target.environment_from.is_some() {
        return Err(DeployError::RemoteEnvironment {
            target: name.to_string(),
        });
    }
    target
        .environment
        .as_ref()
        .ok_or_else(|| DeployError::NoEnvironment {
            target: name.to_string(),
        })
}

pub fn scaffold() -> DeployConfig {
    let mut environment = Map::new();
    environment.insert(
        "EXAMPLE_KEY".to_string(),
        Value::String("example value".to_string()),
    );

    let mut targets = BTreeMap::new();
    targets.insert(
        "staging".to_string(),
        TargetConfig {
            app_id: Some("my-project-id".to_string()),
            version: Some(DEFAULT_VERSION_TEMPLATE.to_string()),
            require_label: false,
            environment: Some(environment),
            environment_from: None,
        },
    );

    DeployConfig {
        targets: Some(targets),
    }
}

fn write_file(path: &Path, contents: &str) -> DeployResult<()> {
    fs::write(path, contents).map_err(|source| DeployError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a scaffold configuration and a blank `env.yaml`; returns the files written.
pub fn init(config_path: &Path, base_dir: &Path) -> DeployResult<Vec<PathBuf>> {
    if config_path.exists() {
        return Err(DeployError::ConfigExists {
            path: config_path.to_path_buf(),
        });
    }

    let mut written = Vec::new();

    let placeholder = base_dir.join(ENV_PLACEHOLDER_FILE);
    if !placeholder.exists() {
        write_file(&placeholder, "env_variables: {}\n")?;
        written.push(placeholder);
    }

    let contents = serde_json::to_string_pretty(&scaffold()).map_err(|e| DeployError::ConfigParse {
        path: config_path.to_path_buf(),
        message: e.to_string(),
    })?;
    write_file(config_path, &(contents + "\n"))?;
    written.push(config_path.to_path_buf());

    Ok(written)
}
