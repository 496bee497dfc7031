use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const DEFAULT_VERSION_TEMPLATE: &str = "deploy++";

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct DeployConfig {
    #[serde(default)]
    pub targets: Option<BTreeMap<String, TargetConfig>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct TargetConfig {
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub require_label: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_from: Option<Value>,
}

impl DeployConfig {
    pub fn target(&self, name: &str) -> Option<&TargetConfig> {
        self.targets.as_ref().and_then(|targets| targets.get(name))
    }
}

impl TargetConfig {
    pub fn version_template(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION_TEMPLATE)
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref().filter(|id| !id.is_empty())
    }
}
