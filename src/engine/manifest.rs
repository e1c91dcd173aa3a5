//! Manifest parsing.
//!
//! A `modman` manifest is UTF-8 text with one directive per line:
//!
//! ```text
//! # comment                      ignored
//! target [real]                  mapping (real defaults to target)
//! @import path [base]            recursively apply path/modman
//! @shell command ...             execute command verbatim
//! ```
//!
//! Tokenization is first-field-plus-remainder with no quoting: paths
//! containing spaces are not supported by the format.

use crate::error::EngineError;

/// One parsed manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEntry {
    /// Map a source path (relative to the module directory) to a destination
    /// path (relative to the effective deploy root).
    Mapping {
        /// Source path, relative to the manifest's directory.
        target: String,
        /// Destination path, relative to the effective deploy root.
        real: String,
    },
    /// Recursively apply another module's manifest.
    Import {
        /// Directory of the imported module, relative to this module.
        path: String,
        /// Optional base directory composed under the current base.
        base: Option<String>,
    },
    /// Execute a command through the shell.
    Shell {
        /// The command text, passed verbatim (internal whitespace preserved).
        command: String,
    },
}

/// Split a line into its first whitespace-separated field and the trimmed
/// remainder (empty if there is none).
fn split_first(line: &str) -> (&str, &str) {
    let line = line.trim();
    line.find(char::is_whitespace).map_or((line, ""), |at| {
        let (first, rest) = line.split_at(at);
        (first, rest.trim())
    })
}

/// Parse a single retained manifest line into an entry.
///
/// # Errors
///
/// Returns [`EngineError::Parse`] quoting the offending line when a
/// directive is missing its required argument.
pub fn parse_line(line: &str) -> Result<ManifestEntry, EngineError> {
    let (first, rest) = split_first(line);

    match first {
        "@import" => {
            let (path, base) = split_first(rest);
            if path.is_empty() {
                return Err(EngineError::parse(line.trim(), "missing import path"));
            }
            Ok(ManifestEntry::Import {
                path: path.to_string(),
                base: if base.is_empty() {
                    None
                } else {
                    Some(base.to_string())
                },
            })
        }
        "@shell" => {
            if rest.is_empty() {
                return Err(EngineError::parse(line.trim(), "missing shell command"));
            }
            Ok(ManifestEntry::Shell {
                command: rest.to_string(),
            })
        }
        target => Ok(ManifestEntry::Mapping {
            target: target.to_string(),
            real: if rest.is_empty() {
                target.to_string()
            } else {
                rest.to_string()
            },
        }),
    }
}

/// Parse manifest content into an ordered sequence of entries.
///
/// Blank lines and lines whose first non-whitespace character is `#` are
/// skipped; carriage returns are removed before tokenization.
///
/// # Errors
///
/// Returns [`EngineError::Parse`] for the first malformed line (fail fast,
/// with the offending line quoted).
pub fn parse(content: &str) -> Result<Vec<ManifestEntry>, EngineError> {
    let mut entries = Vec::new();
    for raw in content.lines() {
        let line = raw.trim_end_matches('\r');
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        entries.push(parse_line(line)?);
    }
    Ok(entries)
}
