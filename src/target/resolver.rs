use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::ParsedOptions;
use crate::config::DeployConfig;
use crate::error::{DeployError, DeployResult};
use crate::versionning::Label;

/// Include entry every module descriptor must carry; replaced at deploy time.
pub const ENV_INCLUDE_PLACEHOLDER: &str = "- env.yaml";

pub const DEFAULT_MODULE: &str = "app";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    pub module: String,
    pub target: String,
    pub label: Option<Label>,
}

impl DeploymentRequest {
    /// Name the module's versions are listed under by the deployment tool.
    pub fn service(&self) -> &str {
        if self.module == DEFAULT_MODULE {
            "default"
        } else {
            &self.module
        }
    }
}

pub fn descriptor_path(base_dir: &Path, module: &str) -> PathBuf {
    base_dir.join(format!("{}.yaml", module))
}

/// Builds the request from the parsed options; a malformed label is rejected here.
pub fn resolve(options: &ParsedOptions) -> DeployResult<DeploymentRequest> {
    let missing: Vec<String> = ["module", "target"]
        .iter()
        .filter(|name| options.value(name).is_none())
        .map(|name| name.to_string())
        .collect();

    match (options.value("module"), options.value("target")) {
        (Some(module), Some(target)) => {
            let module = if module == "default" {
                DEFAULT_MODULE
            } else {
                module
            };
            let label = options.value("label").map(Label::parse).transpose()?;
            Ok(DeploymentRequest {
                module: module.to_string(),
                target: target.to_string(),
                label,
            })
        }
        _ => Err(DeployError::MissingParameters { missing }),
    }
}

/// Checks the request against the configuration and returns the raw module descriptor.
pub fn validate(
    request: &DeploymentRequest,
    config: &DeployConfig,
    base_dir: &Path,
) -> DeployResult<String> {
    let path = descriptor_path(base_dir, &request.module);
    if !path.exists() {
        return Err(DeployError::DescriptorNotFound { path });
    }

    if config.target(&request.target).is_none() {
        return Err(DeployError::UnknownTarget {
            target: request.target.clone(),
        });
    }

    let descriptor = fs::read_to_string(&path).map_err(|e| DeployError::ConfigParse {
        path: path.clone(),
        message: e.to_string(),
    })?;

    if !descriptor.contains(ENV_INCLUDE_PLACEHOLDER) {
        return Err(DeployError::MissingPlaceholder {
            path,
            placeholder: ENV_INCLUDE_PLACEHOLDER.to_string(),
        });
    }

    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OptionValue;
    use crate::config::TargetConfig;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn options(entries: &[(&str, &str)]) -> ParsedOptions {
        ParsedOptions::from_entries(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), OptionValue::Value(v.to_string()))),
        )
    }

    fn config_with(target: &str) -> DeployConfig {
        let mut targets = BTreeMap::new();
        targets.insert(
            target.to_string(),
            TargetConfig {
                app_id: Some("project".to_string()),
                ..Default::default()
            },
        );
        DeployConfig {
            targets: Some(targets),
        }
    }

    fn request(module: &str, target: &str) -> DeploymentRequest {
        DeploymentRequest {
            module: module.to_string(),
            target: target.to_string(),
            label: None,
        }
    }

    #[test]
    fn test_resolve_maps_default_module() {
        let resolved = resolve(&options(&[("module", "default"), ("target", "prod")])).unwrap();
        assert_eq!(resolved.module, "app");
        assert_eq!(resolved.service(), "default");

        let resolved = resolve(&options(&[
            ("module", "worker"),
            ("target", "prod"),
            ("label", "rc1"),
        ]))
        .unwrap();
        assert_eq!(resolved.module, "worker");
        assert_eq!(resolved.service(), "worker");
        assert_eq!(resolved.label.as_ref().map(Label::as_str), Some("rc1"));
    }

    #[test]
    fn test_resolve_rejects_malformed_label() {
        let err = resolve(&options(&[
            ("module", "app"),
            ("target", "prod"),
            ("label", "Not_A_Slug"),
        ]))
        .unwrap_err();
        assert!(
            matches!(err, DeployError::InvalidLabel { ref label, .. } if label == "Not_A_Slug")
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_resolve_requires_module_and_target() {
        match resolve(&options(&[("target", "prod")])).unwrap_err() {
            DeployError::MissingParameters { missing } => assert_eq!(missing, vec!["module"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_descriptor() {
        let dir = TempDir::new().unwrap();
        let config = config_with("prod");

        let err = validate(&request("app", "prod"), &config, dir.path()).unwrap_err();
        assert!(matches!(err, DeployError::DescriptorNotFound { .. }));

        fs::write(dir.path().join("app.yaml"), "runtime: python312\n").unwrap();
        let err = validate(&request("app", "prod"), &config, dir.path()).unwrap_err();
        assert!(matches!(err, DeployError::MissingPlaceholder { .. }));

        let err = validate(&request("app", "staging"), &config, dir.path()).unwrap_err();
        assert!(matches!(err, DeployError::UnknownTarget { target } if target == "staging"));

        let descriptor = "runtime: python312\nincludes:\n  - env.yaml\n";
        fs::write(dir.path().join("app.yaml"), descriptor).unwrap();
        assert_eq!(
            validate(&request("app", "prod"), &config, dir.path()).unwrap(),
            descriptor
        );
    }
}
