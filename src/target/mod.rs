pub use self::resolver::{resolve, validate, DeploymentRequest, ENV_INCLUDE_PLACEHOLDER};

mod resolver;
