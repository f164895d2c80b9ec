use colored::Colorize;
use declarative::{Diagnostic, Severity};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a diagnostic the way a provider host would
pub fn diagnostic(diag: &Diagnostic) {
    let location = diag
        .address
        .as_ref()
        .map(|a| format!(" ({a})"))
        .unwrap_or_default();

    match diag.severity {
        Severity::Error => {
            eprintln!(
                "{} {}{}",
                "✗".red(),
                diag.summary.red().bold(),
                location.dimmed()
            );
            if !diag.detail.is_empty() {
                eprintln!("    {}", diag.detail);
            }
        }
        Severity::Warning => {
            println!(
                "{} {}{}",
                "⚠".yellow(),
                diag.summary.yellow().bold(),
                location.dimmed()
            );
            if !diag.detail.is_empty() {
                println!("    {}", diag.detail.dimmed());
            }
        }
    }
}

/// Print every diagnostic in order
pub fn diagnostics(diags: &[Diagnostic]) {
    for diag in diags {
        diagnostic(diag);
    }
}

/// Mask a sensitive value for display
pub fn redact(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        "(sensitive)".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact() {
        assert_eq!(redact(""), "");
        assert_eq!(redact("secret-token"), "(sensitive)");
    }
}
