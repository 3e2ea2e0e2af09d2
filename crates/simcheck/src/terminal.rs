//! Spinner and styled status lines on stderr.

use std::borrow::Cow;
use std::time::Duration;

use console::{StyledObject, style};
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner for a run in flight.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Start a spinner, or a hidden one when `visible` is false.
    pub fn new(message: impl Into<Cow<'static, str>>, visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.cyan} {msg}")
        {
            bar.set_style(spinner_style);
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    pub fn set_message(&self, message: impl Into<Cow<'static, str>>) {
        self.bar.set_message(message);
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }

    /// Hide the spinner while `f` writes to the terminal.
    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.bar.suspend(f)
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

// ============================================================================
// Styled output helpers
// ============================================================================

/// Turn off ANSI styling for everything printed through `console`.
pub fn set_plain(plain: bool) {
    if plain {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
}

fn line(symbol: StyledObject<&str>, message: &str) -> String {
    format!("{} {message}", symbol.for_stderr())
}

pub fn info(message: &str) {
    eprintln!("{}", line(style("→").cyan(), message));
}

pub fn success(message: &str) {
    eprintln!("{}", line(style("✓").green().bold(), message));
}

pub fn error(message: &str) {
    eprintln!("{}", line(style("✗").red().bold(), message));
}

pub fn warning(message: &str) {
    eprintln!("{}", line(style("!").yellow().bold(), message));
}
