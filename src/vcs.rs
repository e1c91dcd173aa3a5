//! Thin wrappers around external version-control tools.
//!
//! Modules are checked out and updated by the `git`, `svn`, or `hg`
//! binaries; this module only dispatches to them through the injected
//! [`Executor`] and surfaces their output. No protocol logic lives here.

use std::path::Path;

use anyhow::{Result, bail};

use crate::exec::Executor;

/// The version-control system managing a module checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsKind {
    /// A git clone (`.git` present).
    Git,
    /// A Subversion checkout (`.svn` present).
    Svn,
    /// A Mercurial clone (`.hg` present).
    Hg,
}

impl VcsKind {
    /// Detect the VCS managing `dir` from its metadata directory.
    #[must_use]
    pub fn detect(dir: &Path) -> Option<Self> {
        if dir.join(".git").exists() {
            Some(Self::Git)
        } else if dir.join(".svn").is_dir() {
            Some(Self::Svn)
        } else if dir.join(".hg").is_dir() {
            Some(Self::Hg)
        } else {
            None
        }
    }

    /// The external program for this VCS.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Svn => "svn",
            Self::Hg => "hg",
        }
    }
}

/// Detect the VCS for `dir` or fail with a descriptive error.
fn detect_required(dir: &Path) -> Result<VcsKind> {
    VcsKind::detect(dir).map_or_else(
        || {
            bail!(
                "{} is not a recognized checkout (no .git, .svn, or .hg)",
                dir.display()
            )
        },
        Ok,
    )
}

/// Clone a git repository from `url` into `dest`.
///
/// # Errors
///
/// Returns an error if `git` cannot be executed or exits non-zero.
pub fn clone(executor: &dyn Executor, url: &str, dest: &Path) -> Result<()> {
    executor.run("git", &["clone", url, &dest.to_string_lossy()])?;
    Ok(())
}

/// Check out a Subversion repository from `url` into `dest`.
///
/// # Errors
///
/// Returns an error if `svn` cannot be executed or exits non-zero.
pub fn checkout(executor: &dyn Executor, url: &str, dest: &Path) -> Result<()> {
    executor.run("svn", &["checkout", url, &dest.to_string_lossy()])?;
    Ok(())
}

/// Update the checkout at `dir` from its upstream.
///
/// # Errors
///
/// Returns an error if the directory is not a recognized checkout or the
/// VCS command fails.
pub fn update(executor: &dyn Executor, dir: &Path) -> Result<()> {
    match detect_required(dir)? {
        VcsKind::Git => executor.run_in(dir, "git", &["pull"])?,
        VcsKind::Svn => executor.run_in(dir, "svn", &["update"])?,
        VcsKind::Hg => executor.run_in(dir, "hg", &["pull", "-u"])?,
    };
    Ok(())
}

/// Report local modifications in the checkout at `dir`.
///
/// Returns the VCS's own status output (empty when clean).
///
/// # Errors
///
/// Returns an error if the directory is not a recognized checkout or the
/// VCS command fails.
pub fn status(executor: &dyn Executor, dir: &Path) -> Result<String> {
    let result = match detect_required(dir)? {
        VcsKind::Git => executor.run_in(dir, "git", &["status", "--short"])?,
        VcsKind::Svn => executor.run_in(dir, "svn", &["status"])?,
        VcsKind::Hg => executor.run_in(dir, "hg", &["status"])?,
    };
    Ok(result.stdout)
}

/// Report upstream changes not yet present in the checkout at `dir`.
///
/// # Errors
///
/// Returns an error if the directory is not a recognized checkout or a VCS
/// command fails.
pub fn incoming(executor: &dyn Executor, dir: &Path) -> Result<String> {
    let result = match detect_required(dir)? {
        VcsKind::Git => {
            executor.run_in(dir, "git", &["fetch", "--quiet"])?;
            executor.run_in(dir, "git", &["log", "--oneline", "HEAD..@{upstream}"])?
        }
        VcsKind::Svn => executor.run_in(dir, "svn", &["status", "--show-updates"])?,
        VcsKind::Hg => executor.run_in(dir, "hg", &["incoming"])?,
    };
    Ok(result.stdout)
}
