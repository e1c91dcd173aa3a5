//! The `list` command.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::logging::Logger;

use super::CommandSetup;

/// List the modules in the store, flagging any without a manifest.
///
/// # Errors
///
/// Returns an error if the workspace cannot be resolved or the store
/// cannot be read.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, Arc::clone(log))?;
    let modules = setup.workspace.modules()?;

    if modules.is_empty() {
        log.info("no modules in the store");
        return Ok(());
    }

    for module in &modules {
        if module.has_manifest() {
            log.info(&module.name);
        } else {
            log.info(&format!("{} (no manifest)", module.name));
        }
    }
    Ok(())
}
