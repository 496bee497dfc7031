use std::path::PathBuf;
use thiserror::Error;

pub type DeployResult<T> = Result<T, DeployError>;

/// Broad failure categories, one exit code each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Config,
    Environment,
    ExternalTool,
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Usage => 2,
            ErrorKind::Config => 3,
            ErrorKind::Environment => 4,
            ErrorKind::ExternalTool => 5,
            ErrorKind::Io => 6,
        }
    }
}

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("exactly one command is required, got {count}")]
    CommandCount { count: usize },

    #[error("unknown command '{name}'")]
    UnknownCommand { name: String },

    #[error("missing required parameters: {}", .missing.join(", "))]
    MissingParameters { missing: Vec<String> },

    #[error("invalid label '{label}': must match {pattern}")]
    InvalidLabel { label: String, pattern: String },

    #[error("configuration file not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("configuration file {} could not be parsed: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("configuration file already exists: {}", .path.display())]
    ConfigExists { path: PathBuf },

    #[error("configuration defines no targets")]
    NoTargets,

    #[error("target '{target}' has no app_id")]
    MissingAppId { target: String },

    #[error("target '{target}' requires a --label")]
    LabelRequired { target: String },

    #[error("unknown target '{target}'")]
    UnknownTarget { target: String },

    #[error("module descriptor not found: {}", .path.display())]
    DescriptorNotFound { path: PathBuf },

    #[error("module descriptor {} does not include '{placeholder}'", .path.display())]
    MissingPlaceholder { path: PathBuf, placeholder: String },

    #[error("no version number after the highest deployed '{prefix}' version")]
    VersionOverflow { prefix: String },

    #[error("no environment defined for target '{target}'")]
    NoEnvironment { target: String },

    #[error("target '{target}' uses environment_from, which is not supported")]
    RemoteEnvironment { target: String },

    #[error("deployment tool '{tool}' is not available: {message}")]
    ToolUnavailable { tool: String, message: String },

    #[error("'{command}' failed: {message}")]
    ToolFailed { command: String, message: String },

    #[error("deployment failed with exit code {}", .code.map_or("unknown".to_string(), |c| c.to_string()))]
    DeployFailed { code: Option<i32> },

    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("confirmation prompt failed: {message}")]
    Prompt { message: String },
}

impl DeployError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeployError::CommandCount { .. }
            | DeployError::UnknownCommand { .. }
            | DeployError::MissingParameters { .. }
            | DeployError::InvalidLabel { .. } => ErrorKind::Usage,
            DeployError::ConfigNotFound { .. }
            | DeployError::ConfigParse { .. }
            | DeployError::ConfigExists { .. }
            | DeployError::NoTargets
            | DeployError::MissingAppId { .. }
            | DeployError::LabelRequired { .. }
            | DeployError::UnknownTarget { .. }
            | DeployError::DescriptorNotFound { .. }
            | DeployError::MissingPlaceholder { .. }
            | DeployError::VersionOverflow { .. } => ErrorKind::Config,
            DeployError::NoEnvironment { .. } | DeployError::RemoteEnvironment { .. } => {
                ErrorKind::Environment
            }
            DeployError::ToolUnavailable { .. }
            | DeployError::ToolFailed { .. }
            | DeployError::DeployFailed { .. } => ErrorKind::ExternalTool,
            DeployError::Write { .. } | DeployError::Prompt { .. } => ErrorKind::Io,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameters_lists_every_name() {
        let err = DeployError::MissingParameters {
            missing: vec!["module".to_string(), "target".to_string()],
        };
        assert_eq!(err.to_string(), "missing required parameters: module, target");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_exit_codes_are_distinct_per_kind() {
        let codes = [
            ErrorKind::Usage,
            ErrorKind::Config,
            ErrorKind::Environment,
            ErrorKind::ExternalTool,
            ErrorKind::Io,
        ]
        .map(ErrorKind::exit_code);

        for (i, code) in codes.iter().enumerate() {
            assert_ne!(*code, 0);
            assert!(!codes[i + 1..].contains(code));
        }
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            DeployError::LabelRequired {
                target: "prod".to_string()
            }
            .kind(),
            ErrorKind::Config
        );
        assert_eq!(
            DeployError::RemoteEnvironment {
                target: "prod".to_string()
            }
            .exit_code(),
            4
        );
        assert_eq!(
            DeployError::VersionOverflow {
                prefix: "v".to_string()
            }
            .kind(),
            ErrorKind::Config
        );
        assert_eq!(DeployError::DeployFailed { code: Some(1) }.exit_code(), 5);
        assert_eq!(
            DeployError::DeployFailed { code: None }.to_string(),
            "deployment failed with exit code unknown"
        );
    }
}
