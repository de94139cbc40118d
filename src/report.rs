//! Console reporting
//!
//! All user-visible status lines go through here; decision logic stays free
//! of printing so it remains unit-testable. Diagnostics that are not part of
//! the console conversation go through `tracing` instead.

use colored::{ColoredString, Colorize};

use crate::resolve::info::SourceKind;

fn tag(kind: SourceKind) -> ColoredString {
    let label = format!("[{}]", kind.label());
    match kind {
        SourceKind::DirectUrls => label.normal(),
        SourceKind::Spigot => label.truecolor(226, 149, 1),
        SourceKind::Bukkit => label.truecolor(32, 150, 225),
        SourceKind::Github => label.truecolor(155, 31, 232),
        SourceKind::Jenkins => label.truecolor(76, 201, 240),
    }
}

/// Prints console status lines. Cheap to copy around; sources and the
/// engine all hold one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter;

impl Reporter {
    /// Top-level step, e.g. "Processing WorldEdit...".
    pub fn step(&self, message: &str) {
        println!("{message}");
    }

    /// Indented note under the current step.
    pub fn note(&self, message: &str) {
        println!("   {message}");
    }

    /// Per-source status line.
    pub fn source(&self, kind: SourceKind, message: &str) {
        println!("   {} {message}", tag(kind));
    }

    /// Per-source highlight for a version newer than the installed one.
    pub fn source_newer(&self, kind: SourceKind, message: &str) {
        println!("   {} {}", tag(kind), message.green());
    }

    /// Per-source recoverable problem.
    pub fn source_warn(&self, kind: SourceKind, message: &str) {
        println!("   {} {}", tag(kind), message.yellow());
    }

    pub fn success(&self, message: &str) {
        println!("   {}", message.green());
    }

    pub fn warn(&self, message: &str) {
        println!("{}", message.yellow());
    }

    pub fn error(&self, message: &str) {
        eprintln!("   {}", message.red());
    }
}

/// Prints a fatal error and terminates.
pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {err:#}", "Error:".red().bold());
    std::process::exit(1);
}
