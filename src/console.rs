//! Diagnostic output formatting with ANSI color support.
//!
//! Everything here goes to stderr. Stdout is reserved for the report,
//! which the resume logic reads back on the next run.

use std::io::{self, IsTerminal};

/// ANSI style codes for terminal formatting.
#[derive(Debug, Clone, Copy)]
pub enum Style {
    Bold,
    Dim,
    Red,
    Green,
    Yellow,
    Blue,
    Cyan,
    Gray,
}

impl Style {
    /// Returns the ANSI escape code for this style.
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "1",
            Style::Dim => "2",
            Style::Red => "31",
            Style::Green => "32",
            Style::Yellow => "33",
            Style::Blue => "34",
            Style::Cyan => "36",
            Style::Gray => "90",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Diagnostic output handler with color support detection.
#[derive(Debug, Clone)]
pub struct Console {
    colors_enabled: bool,
    debug: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Creates a new Console instance, detecting color support.
    ///
    /// Colors are disabled if:
    /// - The `NO_COLOR` environment variable is set
    /// - stderr is not a terminal (TTY)
    pub fn new() -> Self {
        let colors_enabled = std::env::var("NO_COLOR").is_err() && io::stderr().is_terminal();

        Self {
            colors_enabled,
            debug: false,
        }
    }

    /// Creates a Console with colors explicitly enabled or disabled.
    pub fn with_colors(enabled: bool) -> Self {
        Self {
            colors_enabled: enabled,
            debug: false,
        }
    }

    /// Enables or disables `[DEBUG]` output.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Applies ANSI styles to text if colors are enabled.
    pub fn style(&self, text: &str, styles: &[Style]) -> String {
        if !self.colors_enabled || styles.is_empty() {
            return text.to_string();
        }

        let codes: Vec<&str> = styles.iter().map(|s| s.code()).collect();
        format!("\x1b[{}m{}{}", codes.join(";"), text, RESET)
    }

    /// Creates a colored label like `[INFO]`.
    pub fn label(&self, label: &str, color: Style) -> String {
        let styled = self.style(label, &[color, Style::Bold]);
        format!("[{}]", styled)
    }

    /// Prints an info message with blue `[INFO]` label.
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", self.label("INFO", Style::Blue), message);
    }

    /// Prints a success message with green `[OK]` label.
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", self.label("OK", Style::Green), message);
    }

    /// Prints a warning message with yellow `[WARN]` label.
    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", self.label("WARN", Style::Yellow), message);
    }

    /// Prints an error message with red `[ERROR]` label.
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.label("ERROR", Style::Red), message);
    }

    /// Prints a step message with cyan `[STEP]` label.
    pub fn step(&self, message: &str) {
        eprintln!("{} {}", self.label("STEP", Style::Cyan), message);
    }

    /// Prints a muted `[DEBUG]` message, only when debug output is on.
    pub fn debug(&self, message: &str) {
        if self.debug {
            eprintln!("{} {}", self.label("DEBUG", Style::Gray), self.muted(message));
        }
    }

    /// Returns text styled as muted (dim gray).
    pub fn muted(&self, text: &str) -> String {
        self.style(text, &[Style::Gray, Style::Dim])
    }

    /// Formats a count with styling.
    pub fn count(&self, n: usize) -> String {
        self.style(&n.to_string(), &[Style::Green, Style::Bold])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_disabled() {
        let console = Console::with_colors(false);
        assert_eq!(console.style("hello", &[Style::Red]), "hello");
    }

    #[test]
    fn test_style_enabled() {
        let console = Console::with_colors(true);
        let styled = console.style("hello", &[Style::Red]);
        assert!(styled.contains("\x1b[31m"));
        assert!(styled.contains("hello"));
        assert!(styled.contains(RESET));
    }

    #[test]
    fn test_multiple_styles() {
        let console = Console::with_colors(true);
        let styled = console.style("hello", &[Style::Bold, Style::Red]);
        assert!(styled.contains("1;31"));
    }

    #[test]
    fn test_label() {
        let console = Console::with_colors(false);
        assert_eq!(console.label("WARN", Style::Yellow), "[WARN]");
    }

    #[test]
    fn test_count_plain() {
        let console = Console::with_colors(false);
        assert_eq!(console.count(42), "42");
    }
}
