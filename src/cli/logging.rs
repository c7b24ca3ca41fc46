// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Console output for the library and the `healify` binary.
//!
//! Warnings and errors go to stderr, everything else to stdout. `verbose!` and
//! `section!` print nothing after `set_verbose(false)`. The macros only build
//! `format_args!` and hand it to [`emit`], so callers need no `colored` import.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::{ColoredString, Colorize};

/// Global verbosity flag.
static VERBOSE: AtomicBool = AtomicBool::new(true);

/// Set the global verbosity flag.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

/// Check if verbose output is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Kind of console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Plain stdout line.
    Info,
    /// Yellow tag, stderr.
    Warning,
    /// Red tag, stderr.
    Error,
    /// One classification result.
    Success,
    /// Detail hidden when verbosity is off.
    Verbose,
    /// Header hidden when verbosity is off.
    Section,
}

impl Level {
    fn tag(self) -> Option<ColoredString> {
        match self {
            Self::Warning => Some("WARNING ⚠️".yellow().bold()),
            Self::Error => Some("Error:".red().bold()),
            Self::Success => Some("🌿".green()),
            Self::Info | Self::Verbose | Self::Section => None,
        }
    }

    const fn is_stderr(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }

    const fn is_quiet(self) -> bool {
        matches!(self, Self::Verbose | Self::Section)
    }
}

/// Render one console line, without the trailing newline.
#[must_use]
pub fn render(level: Level, args: fmt::Arguments<'_>) -> String {
    if level == Level::Section {
        return format!("\n{}", args.to_string().cyan().bold());
    }
    match level.tag() {
        Some(tag) => format!("{tag} {args}"),
        None => args.to_string(),
    }
}

/// Print one console line at `level`, honoring the verbosity flag.
pub fn emit(level: Level, args: fmt::Arguments<'_>) {
    if level.is_quiet() && !is_verbose() {
        return;
    }

    let line = render(level, args);
    if level.is_stderr() {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

/// Macro for standard info messages.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Info, format_args!($($arg)*))
    };
}

/// Macro for warning messages.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Warning, format_args!($($arg)*))
    };
}

/// Macro for error messages.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Error, format_args!($($arg)*))
    };
}

/// Macro for result lines.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Success, format_args!($($arg)*))
    };
}

/// Macro for verbose messages.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Verbose, format_args!($($arg)*))
    };
}

/// Macro for section headers.
#[macro_export]
macro_rules! section {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Section, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_tags() {
        colored::control::set_override(false);

        assert_eq!(render(Level::Info, format_args!("{} photos", 3)), "3 photos");
        assert_eq!(render(Level::Verbose, format_args!("top5")), "top5");
        assert_eq!(
            render(Level::Warning, format_args!("Skipping {}", "a.png")),
            "WARNING ⚠️ Skipping a.png"
        );
        assert_eq!(render(Level::Error, format_args!("bad")), "Error: bad");
        assert_eq!(render(Level::Success, format_args!("Neem")), "🌿 Neem");
        assert_eq!(render(Level::Section, format_args!("Results")), "\nResults");
    }

    #[test]
    fn test_streams_and_quiet_levels() {
        assert!(Level::Warning.is_stderr());
        assert!(Level::Error.is_stderr());
        assert!(!Level::Success.is_stderr());
        assert!(Level::Verbose.is_quiet());
        assert!(Level::Section.is_quiet());
        assert!(!Level::Warning.is_quiet());
    }

    #[test]
    fn test_verbosity_toggle() {
        set_verbose(false);
        assert!(!is_verbose());

        // Silenced macros still type-check as expressions.
        let () = crate::verbose!("hidden {}", 1);
        crate::section!("hidden");

        set_verbose(true);
        assert!(is_verbose());
    }
}
