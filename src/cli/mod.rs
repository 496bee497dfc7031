pub use self::args::Args;
pub use self::spec::{resolve_command, Command, ParsedOptions, COMMAND_SPEC};

#[cfg(test)]
pub use self::spec::OptionValue;

mod args;
mod spec;
