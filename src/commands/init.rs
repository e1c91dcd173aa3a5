//! The `init` command.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::workspace::Workspace;

/// Create a module store, establishing the current directory (or `--root`)
/// as a project root.
///
/// # Errors
///
/// Returns an error if the store already exists or cannot be created.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let dir = match &global.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()?,
    };
    let workspace = Workspace::init(&dir)?;
    log.info(&format!(
        "initialized module store at {}",
        workspace.store().display()
    ));
    Ok(())
}
