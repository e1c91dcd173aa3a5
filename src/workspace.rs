//! Module store discovery and enumeration.
//!
//! A project is any directory containing a `.modman` store. Each immediate
//! subdirectory of the store is a module, identified by its directory name
//! and described by its `modman` manifest.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};

/// Name of the module store directory under the deploy root.
pub const STORE_DIR: &str = ".modman";
/// Name of a module's primary manifest file.
pub const MANIFEST_FILE: &str = "modman";
/// Name of a module's optional local companion manifest.
pub const LOCAL_MANIFEST_FILE: &str = "modman.local";

/// A named module inside the store.
#[derive(Debug, Clone)]
pub struct Module {
    /// Module name (its directory name in the store).
    pub name: String,
    /// Absolute path of the module's directory.
    pub dir: PathBuf,
}

impl Module {
    /// Path of the module's primary manifest.
    #[must_use]
    pub fn manifest(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    /// Whether the module carries a primary manifest.
    #[must_use]
    pub fn has_manifest(&self) -> bool {
        self.manifest().is_file()
    }
}

/// A project root together with its module store.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    store: PathBuf,
}

impl Workspace {
    /// Open the workspace rooted at `root`, which must already contain a
    /// module store.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` has no `.modman` directory.
    pub fn open(root: &Path) -> Result<Self> {
        let root = dunce::canonicalize(root)
            .with_context(|| format!("resolving project root: {}", root.display()))?;
        let store = root.join(STORE_DIR);
        if !store.is_dir() {
            bail!(
                "{} is not a modman project (no {STORE_DIR} directory); run 'modman init' first",
                root.display()
            );
        }
        Ok(Self { root, store })
    }

    /// Discover the workspace by walking upward from `start` to the nearest
    /// ancestor containing a module store.
    ///
    /// # Errors
    ///
    /// Returns an error if no ancestor of `start` contains a store.
    pub fn discover(start: &Path) -> Result<Self> {
        let start = dunce::canonicalize(start)
            .with_context(|| format!("resolving directory: {}", start.display()))?;
        let mut dir: &Path = &start;
        loop {
            if dir.join(STORE_DIR).is_dir() {
                return Self::open(dir);
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => bail!(
                    "no {STORE_DIR} store found in {} or any parent directory; run 'modman init' at the project root",
                    start.display()
                ),
            }
        }
    }

    /// Create a module store in `dir`, establishing it as a project root.
    ///
    /// # Errors
    ///
    /// Returns an error if the store already exists or cannot be created.
    pub fn init(dir: &Path) -> Result<Self> {
        let store = dir.join(STORE_DIR);
        if store.exists() {
            bail!("{} is already initialized", dir.display());
        }
        fs::create_dir_all(&store)
            .with_context(|| format!("creating module store: {}", store.display()))?;
        Self::open(dir)
    }

    /// The project's deploy root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The module store directory.
    #[must_use]
    pub fn store(&self) -> &Path {
        &self.store
    }

    /// Enumerate the modules in the store, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store directory cannot be read.
    pub fn modules(&self) -> Result<Vec<Module>> {
        let mut modules = Vec::new();
        let entries = fs::read_dir(&self.store)
            .with_context(|| format!("reading module store: {}", self.store.display()))?;
        for entry in entries {
            let entry = entry?;
            let dir = entry.path();
            if dir.is_dir() {
                modules.push(Module {
                    name: entry.file_name().to_string_lossy().to_string(),
                    dir,
                });
            }
        }
        modules.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(modules)
    }

    /// Look up a single module by name.
    ///
    /// # Errors
    ///
    /// Returns an error if no module directory with that name exists.
    pub fn module(&self, name: &str) -> Result<Module> {
        let dir = self.store.join(name);
        if !dir.is_dir() {
            bail!("module '{name}' is not in the store ({})", self.store.display());
        }
        Ok(Module {
            name: name.to_string(),
            dir,
        })
    }
}
