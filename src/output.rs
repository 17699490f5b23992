//! Colored status lines for the terminal.

use colored::Colorize;

/// Prints a completed action to stdout.
pub fn success(message: &str) {
    println!("{} {message}", "✔".green().bold());
}

/// Prints a neutral note to stdout.
pub fn info(message: &str) {
    println!("{} {message}", "ℹ".cyan().bold());
}

/// Prints a warning to stderr.
pub fn warn(message: &str) {
    eprintln!("{} {}", "!".yellow().bold(), message.yellow());
}
