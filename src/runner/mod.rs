pub use self::pipeline::{run_invocation, Collaborators, Outcome, Settings};

mod pipeline;
