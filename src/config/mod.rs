pub use self::store::{environment, init, load, validate};
pub use self::types::{DeployConfig, TargetConfig};

mod store;
mod types;
