use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DeployError, DeployResult};
use crate::target::ENV_INCLUDE_PLACEHOLDER;

pub const ENV_MANIFEST_FILE: &str = ".deployer-env.yaml";

pub fn descriptor_file(module: &str) -> String {
    format!(".deployer-{}.yaml", module)
}

fn is_structured(value: &str) -> bool {
    value.trim_start().starts_with('{')
}

const YAML_RESERVED: &[&str] = &[
    "y", "n", "yes", "no", "true", "false", "on", "off", "null", "~",
];
const YAML_INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
    '`',
];

/// Whether a plain scalar would be read back as something other than this exact string.
fn needs_quoting(text: &str) -> bool {
    text.is_empty()
        || text.trim() != text
        || text.starts_with(YAML_INDICATORS)
        || text.ends_with(':')
        || text.contains(": ")
        || text.contains(" #")
        || text.contains(['\n', '\r', '\t'])
        || YAML_RESERVED
            .iter()
            .any(|word| word.eq_ignore_ascii_case(text))
}

fn render_value(value: &Value) -> String {
    let structured = match value {
        Value::String(text) if is_structured(text) => {
            match serde_json::from_str::<Value>(text) {
                Ok(parsed) => parsed.to_string(),
                Err(_) => text.trim().to_string(),
            }
        }
        Value::String(text) if !needs_quoting(text) => return text.clone(),
        Value::String(text) => text.clone(),
        Value::Object(_) | Value::Array(_) => value.to_string(),
        other => return other.to_string(),
    };
    // Quoted so the YAML reader keeps it as a single string.
    Value::String(structured).to_string()
}

pub fn render_environment(environment: &Map<String, Value>, generated_at: DateTime<Utc>) -> String {
    let mut manifest = String::new();
    manifest.push_str("# Generated by deployer, do not edit\n");
    manifest.push_str(&format!("# Generated at {}\n", generated_at.to_rfc3339()));
    manifest.push_str("env_variables:\n");
    for (key, value) in environment {
        manifest.push_str(&format!("  {}: {}\n", key, render_value(value)));
    }
    manifest
}

pub fn render_descriptor(descriptor: &str, env_manifest: &str) -> String {
    descriptor.replace(ENV_INCLUDE_PLACEHOLDER, &format!("- {}", env_manifest))
}

/// The two generated files; removed when dropped.
#[derive(Debug)]
pub struct ManifestFiles {
    pub environment: PathBuf,
    pub descriptor: PathBuf,
}

impl ManifestFiles {
    pub fn new(base_dir: &Path, module: &str) -> Self {
        ManifestFiles {
            environment: base_dir.join(ENV_MANIFEST_FILE),
            descriptor: base_dir.join(descriptor_file(module)),
        }
    }

    fn paths(&self) -> [&Path; 2] {
        [self.environment.as_path(), self.descriptor.as_path()]
    }

    /// Removes both files, reporting the first failure.
    pub fn cleanup(&self) -> DeployResult<()> {
        for path in self.paths() {
            if path.exists() {
                fs::remove_file(path).map_err(|source| DeployError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }
        Ok(())
    }
}

impl Drop for ManifestFiles {
    fn drop(&mut self) {
        for path in self.paths() {
            let _ = fs::remove_file(path);
        }
    }
}

fn write_file(path: &Path, contents: &str) -> DeployResult<()> {
    fs::write(path, contents).map_err(|source| DeployError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the environment manifest and the rendered descriptor under `base_dir`.
pub fn write_manifests(
    base_dir: &Path,
    module: &str,
    environment: &Map<String, Value>,
    descriptor: &str,
    generated_at: DateTime<Utc>,
) -> DeployResult<ManifestFiles> {
    let files = ManifestFiles::new(base_dir, module);
    write_file(
        &files.environment,
        &render_environment(environment, generated_at),
    )?;
    write_file(
        &files.descriptor,
        &render_descriptor(descriptor, ENV_MANIFEST_FILE),
    )?;
    Ok(files)
}
