pub use self::label::Label;
pub use self::resolver::resolve_version;

mod label;
mod resolver;
