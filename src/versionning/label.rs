use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{DeployError, DeployResult};

pub const LABEL_PATTERN: &str = r"^[a-z0-9]([-a-z0-9]{0,61}[a-z0-9])?$";

static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(LABEL_PATTERN).expect("label pattern is a valid regex"));

pub fn is_valid_label(label: &str) -> bool {
    LABEL_RE.is_match(label)
}

/// A version label that already passed [`LABEL_PATTERN`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label(String);

impl Label {
    pub fn parse(label: &str) -> DeployResult<Label> {
        if is_valid_label(label) {
            Ok(Label(label.to_string()))
        } else {
            Err(DeployError::InvalidLabel {
                label: label.to_string(),
                pattern: LABEL_PATTERN.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
