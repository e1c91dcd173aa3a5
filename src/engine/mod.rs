//! The manifest deployment engine.
//!
//! Materializes a module's `modman` manifest as symbolic links (or copies)
//! under the project root. The engine is synchronous and transaction-free:
//! the filesystem is the only state, and re-running a deployment against an
//! unchanged manifest and tree is a no-op (idempotent convergence instead of
//! atomic transactions).

pub mod apply;
pub mod basedir;
pub mod expand;
pub mod link;
pub mod manifest;
pub mod relpath;
pub mod sweep;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::exec::Executor;
use crate::logging::Log;

/// Immutable engine configuration, threaded explicitly through every engine
/// call instead of living in ambient global state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deploy root: the project directory under which destinations are
    /// created. Absolute.
    pub root: PathBuf,
    /// Module store directory (`<root>/.modman`). Absolute.
    pub store: PathBuf,
    /// Replace non-symlink destinations instead of failing with a conflict.
    pub force: bool,
    /// Materialize mappings as recursive copies instead of symbolic links.
    pub copy: bool,
    /// Process the `modman.local` companion manifest after the primary.
    pub local: bool,
    /// Log planned changes without touching the filesystem.
    pub dry_run: bool,
}

impl Config {
    /// Build a default configuration for the given deploy root and store.
    #[must_use]
    pub fn new(root: PathBuf, store: PathBuf) -> Self {
        Self {
            root,
            store,
            force: false,
            copy: false,
            local: true,
            dry_run: false,
        }
    }

    /// The deploy root joined with a relative base directory.
    ///
    /// An empty base yields the root itself.
    #[must_use]
    pub fn base_root(&self, base: &str) -> PathBuf {
        if base.is_empty() {
            self.root.clone()
        } else {
            self.root.join(base)
        }
    }
}

/// Shared context for engine execution.
pub struct Context {
    /// Immutable engine configuration.
    pub config: Config,
    /// Logger for output and module recording.
    pub log: Arc<dyn Log>,
    /// Command executor (for shell directives and VCS calls).
    pub executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("log", &"<dyn Log>")
            .field("executor", &"<dyn Executor>")
            .finish()
    }
}

impl Context {
    /// Create a new context from a configuration, logger, and executor.
    #[must_use]
    pub fn new(config: Config, log: Arc<dyn Log>, executor: Arc<dyn Executor>) -> Self {
        Self {
            config,
            log,
            executor,
        }
    }

    /// Deploy root of the project.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }
}
