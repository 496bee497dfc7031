use colored::Colorize;

/// Sink for everything the pipeline wants to tell the operator.
#[cfg_attr(test, mockall::automock)]
pub trait Logger {
    fn section(&self, title: &str);
    fn success(&self, message: &str);
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    /// Closing banner of a failed invocation.
    fn failure(&self, title: &str, message: &str);
    /// Diagnostics shown only with `--verbose`.
    fn verbose(&self, message: &str);
}

pub struct ConsoleLogger {
    pub verbose: bool,
}

impl ConsoleLogger {
    pub fn new(verbose: bool) -> Self {
        ConsoleLogger { verbose }
    }
}

impl Logger for ConsoleLogger {
    fn section(&self, title: &str) {
        println!("\n{}", "━".repeat(50).bright_black());
        println!("{}", title.bright_blue().bold());
        println!("{}", "━".repeat(50).bright_black());
    }

    fn success(&self, message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    fn info(&self, message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    fn warning(&self, message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    fn failure(&self, title: &str, message: &str) {
        eprintln!("\n{}", "━".repeat(50).red());
        eprintln!("{} {}", "✗".red().bold(), title.red().bold());
        eprintln!("{}", message);
        eprintln!("{}", "━".repeat(50).red());
    }

    fn verbose(&self, message: &str) {
        if self.verbose {
            println!("{} {}", "·".bright_black(), message.bright_black());
        }
    }
}

/// Drops every message.
pub struct SilentLogger;

impl Logger for SilentLogger {
    fn section(&self, _title: &str) {}
    fn success(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
    fn failure(&self, _title: &str, _message: &str) {}
    fn verbose(&self, _message: &str) {}
}
