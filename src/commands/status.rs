//! The `status` and `incoming` commands.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::vcs::{self, VcsKind};

use super::CommandSetup;

/// Which per-module report to produce.
#[derive(Debug, Clone, Copy)]
pub enum Report {
    /// Local working-copy modifications.
    Status,
    /// Upstream changes not yet pulled.
    Incoming,
}

/// Print the requested VCS report for every module.
///
/// Modules that are not checkouts are skipped with a debug note; VCS
/// failures are warnings, not fatal (reporting must not block on one
/// broken checkout).
///
/// # Errors
///
/// Returns an error if the workspace cannot be resolved.
pub fn run(global: &GlobalOpts, report: Report, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, Arc::clone(log))?;

    for module in setup.workspace.modules()? {
        if VcsKind::detect(&module.dir).is_none() {
            log.debug(&format!("{}: not a checkout", module.name));
            continue;
        }

        log.stage(&module.name);
        let output = match report {
            Report::Status => vcs::status(setup.ctx.executor.as_ref(), &module.dir),
            Report::Incoming => vcs::incoming(setup.ctx.executor.as_ref(), &module.dir),
        };
        match output {
            Ok(text) if text.trim().is_empty() => log.info("clean"),
            Ok(text) => {
                for line in text.lines() {
                    log.info(line);
                }
            }
            Err(e) => log.warn(&format!("{}: {e}", module.name)),
        }
    }
    Ok(())
}
