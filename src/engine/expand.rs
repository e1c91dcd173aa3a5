//! Glob expansion for mapping targets.
//!
//! When a mapping's literal target does not exist, the target is treated as
//! a shell-style glob relative to the module directory. Alternation groups
//! (`{a,b}`) are pre-expanded into plain patterns before being handed to the
//! glob matcher, since the pattern syntax itself has no alternation.

use std::path::{Path, PathBuf};

use crate::error::EngineError;

/// Expand the first top-level `{a,b,...}` group in `pattern`, recursing into
/// the results until no groups remain.
///
/// An unbalanced brace leaves the pattern untouched; it reaches the glob
/// layer as-is.
fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0usize;
    let mut close = None;
    let mut commas = Vec::new();
    for (i, c) in pattern.char_indices() {
        if i < open {
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            ',' if depth == 1 => commas.push(i),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = pattern.get(..open).unwrap_or_default();
    let suffix = pattern.get(close + 1..).unwrap_or_default();

    // Alternatives are the body segments between the group's top-level commas.
    let mut parts = Vec::new();
    let mut last = open + 1;
    for comma in commas {
        parts.push(pattern.get(last..comma).unwrap_or_default());
        last = comma + 1;
    }
    parts.push(pattern.get(last..close).unwrap_or_default());

    let mut out = Vec::new();
    for part in parts {
        for expanded in expand_braces(&format!("{prefix}{part}{suffix}")) {
            out.push(expanded);
        }
    }
    out
}

/// Expand `pattern` relative to `dir` into the matching filesystem paths.
///
/// Returns an empty vector when nothing matches; matches are sorted and
/// deduplicated across alternation branches.
///
/// # Errors
///
/// Returns [`EngineError::Parse`] for a malformed glob pattern and
/// [`EngineError::Io`] when a directory cannot be read during matching.
pub fn expand(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, EngineError> {
    let mut matches = Vec::new();
    for variant in expand_braces(pattern) {
        let full = dir.join(&variant);
        let full_str = full.to_string_lossy();
        let paths =
            glob::glob(&full_str).map_err(|e| EngineError::parse(pattern, e.to_string()))?;
        for entry in paths {
            match entry {
                Ok(path) => matches.push(path),
                Err(e) => {
                    let path = e.path().to_path_buf();
                    return Err(EngineError::io(path, e.into_error()));
                }
            }
        }
    }
    matches.sort();
    matches.dedup();
    Ok(matches)
}
