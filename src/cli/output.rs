//! CLI output formatting utilities

use colored::Colorize;

use crate::auth::Requirement;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Format a route requirement as a colored string
pub fn format_requirement(requirement: Requirement) -> String {
    match requirement {
        Requirement::Authenticated => requirement.to_string().yellow().to_string(),
        Requirement::Public => requirement.to_string().green().to_string(),
    }
}
