//! Domain-specific error types for the deployment engine.
//!
//! This module provides the typed error taxonomy using [`thiserror`].
//! Engine modules return [`EngineError`] while command handlers at the CLI
//! boundary convert it to [`anyhow::Error`] via the standard `?` operator.
//!
//! All variants are fatal to the manifest application that raised them: they
//! abort the current manifest's iteration and bubble unchanged through the
//! import call stack. A missing mapping source is *not* an error — it is a
//! warning logged by the orchestrator, and processing continues.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised while applying a module manifest.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A manifest line could not be parsed into a usable entry.
    ///
    /// The offending line is quoted verbatim for diagnostics.
    #[error("Invalid manifest line '{line}': {reason}")]
    Parse {
        /// The raw manifest line that failed to parse.
        line: String,
        /// Human-readable reason the line was rejected.
        reason: String,
    },

    /// The destination is occupied by something other than a symlink and
    /// force mode is disabled.
    #[error("Conflict: {} already exists and is a {kind} (use force to replace)", dest.display())]
    Conflict {
        /// The occupied destination path.
        dest: PathBuf,
        /// Type of the existing filesystem object (`"file"` or `"directory"`).
        kind: String,
    },

    /// A `@shell` directive exited with a non-zero status.
    #[error("Shell directive '{command}' failed (exit {code})")]
    Hook {
        /// The directive text that was executed.
        command: String,
        /// Exit code reported by the command.
        code: i32,
    },

    /// An imported manifest is missing or unreadable.
    #[error("Cannot import '{}': {reason}", manifest.display())]
    Import {
        /// Path of the manifest that could not be imported.
        manifest: PathBuf,
        /// Human-readable reason the import failed.
        reason: String,
    },

    /// An import chain revisited a manifest already being applied.
    #[error("Import cycle detected at '{}'", manifest.display())]
    ImportCycle {
        /// The manifest that closed the cycle.
        manifest: PathBuf,
    },

    /// Directory creation, link creation, or copy failed.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// Path the failed operation was targeting.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl EngineError {
    /// Build an [`EngineError::Io`] from a path and an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build an [`EngineError::Parse`] quoting the offending line.
    pub fn parse(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            line: line.into(),
            reason: reason.into(),
        }
    }
}
