// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed project with an initialized module
// store and a small builder API, so each integration test can set up an
// isolated environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use modman_cli::engine::{Config, Context};
use modman_cli::exec::SystemExecutor;
use modman_cli::logging::{Log, Logger};
use modman_cli::workspace::{MANIFEST_FILE, Workspace};

/// An isolated project backed by a [`tempfile::TempDir`], with its module
/// store already initialized.
///
/// The directory is automatically deleted when dropped.
pub struct TestProject {
    /// Temporary directory acting as the deploy root.
    pub dir: tempfile::TempDir,
    /// The opened workspace (root canonicalized).
    pub workspace: Workspace,
}

impl TestProject {
    /// Create a new project with an empty module store.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let workspace = Workspace::init(dir.path()).expect("init module store");
        Self { dir, workspace }
    }

    /// Canonicalized deploy root.
    pub fn root(&self) -> &Path {
        self.workspace.root()
    }

    /// Create a module in the store with the given manifest content and
    /// return its directory.
    pub fn add_module(&self, name: &str, manifest: &str) -> PathBuf {
        let dir = self.workspace.store().join(name);
        std::fs::create_dir_all(&dir).expect("create module dir");
        std::fs::write(dir.join(MANIFEST_FILE), manifest).expect("write manifest");
        dir
    }

    /// Write a file inside a module, creating parent directories.
    pub fn add_module_file(&self, module: &str, rel: &str, content: &str) {
        let path = self.workspace.store().join(module).join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create file parents");
        }
        std::fs::write(&path, content).expect("write module file");
    }

    /// Create a directory inside a module.
    pub fn add_module_dir(&self, module: &str, rel: &str) {
        let path = self.workspace.store().join(module).join(rel);
        std::fs::create_dir_all(&path).expect("create module subdir");
    }

    /// Build an engine context over this project with default options.
    pub fn context(&self) -> Context {
        self.context_with(|_| {})
    }

    /// Build an engine context, letting the caller adjust the configuration.
    pub fn context_with(&self, tweak: impl FnOnce(&mut Config)) -> Context {
        let mut config = Config::new(
            self.workspace.root().to_path_buf(),
            self.workspace.store().to_path_buf(),
        );
        tweak(&mut config);
        let log: Arc<dyn Log> = Arc::new(Logger::new("test"));
        Context::new(config, log, Arc::new(SystemExecutor))
    }
}
