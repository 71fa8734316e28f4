//! Formatted output utilities.

use console::{Style, style};

/// Print a success message with checkmark.
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message with X.
pub fn error(msg: &str) {
    println!("{} {}", style("✗").red().bold(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    println!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print an info message.
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Print a header/section title.
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Check outcome display.
pub fn health_check(name: &str, status: CheckStatus, detail: Option<&str>) {
    let (icon, status_style, status_text) = match status {
        CheckStatus::Ok => (style("✓").green(), Style::new().green(), "OK"),
        CheckStatus::Warning => (style("⚠").yellow(), Style::new().yellow(), "WARNING"),
        CheckStatus::Error => (style("✗").red(), Style::new().red(), "ERROR"),
    };

    print!("  {icon} {name}: ");
    print!("{}", status_style.apply_to(status_text));

    if let Some(d) = detail {
        print!(" - {}", style(d).dim());
    }
    println!();
}

/// Check outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

/// Print a key-value pair.
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).bold(), value);
}
