// Re-export specific items from logger.rs
pub use self::logger::{ConsoleLogger, Logger, SilentLogger};

#[cfg(test)]
pub use self::logger::MockLogger;

// Declare logger.rs as a module
mod logger;
