//! Top-level subcommand orchestration.
//!
//! Commands are thin wrappers: they resolve the workspace, build the engine
//! context, and drive the engine's public entry points. Batch commands catch
//! errors at the per-module boundary, record them, and continue with the
//! next module; single-module commands propagate immediately.

pub mod checkout;
pub mod clean;
pub mod deploy;
pub mod init;
pub mod list;
pub mod remove;
pub mod repair;
pub mod status;
pub mod update;

use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::engine::{self, Context, apply, basedir};
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger, ModuleStatus};
use crate::workspace::{Module, Workspace};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates workspace resolution and engine-context construction so
/// that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// The resolved project workspace.
    pub workspace: Workspace,
    /// Engine context carrying configuration, logger, and executor.
    pub ctx: Context,
}

impl CommandSetup {
    /// Resolve the workspace (from `--root` or by upward discovery) and
    /// build the engine context from the global options.
    ///
    /// # Errors
    ///
    /// Returns an error if no module store can be found.
    pub fn init(global: &GlobalOpts, log: Arc<Logger>) -> Result<Self> {
        let workspace = match &global.root {
            Some(root) => Workspace::open(root)?,
            None => Workspace::discover(&std::env::current_dir()?)?,
        };

        let mut config = engine::Config::new(
            workspace.root().to_path_buf(),
            workspace.store().to_path_buf(),
        );
        config.force = global.force;
        config.copy = global.copy;
        config.local = global.local;
        config.dry_run = global.dry_run;

        let ctx = Context::new(config, log as Arc<dyn Log>, Arc::new(SystemExecutor));
        Ok(Self { workspace, ctx })
    }
}

/// Persist a base-directory override for `module` and create its
/// destination directory, honouring dry-run mode.
///
/// # Errors
///
/// Returns an error if the marker or directory cannot be written.
pub fn set_basedir_override(ctx: &Context, module: &Module, value: &str) -> Result<()> {
    let value = basedir::normalize(value);
    if value.is_empty() {
        return Ok(());
    }
    if ctx.config.dry_run {
        ctx.log
            .dry_run(&format!("would set base directory '{value}' for {}", module.name));
        return Ok(());
    }
    std::fs::create_dir_all(ctx.config.base_root(&value))?;
    basedir::write(&module.dir, &value)?;
    Ok(())
}

/// Deploy one module inside a batch, recording the outcome instead of
/// propagating errors (one module's failure must not prevent the rest).
pub fn deploy_and_record(ctx: &Context, module: &Module) {
    if !module.has_manifest() {
        ctx.log
            .debug(&format!("skipping {}: no manifest", module.name));
        ctx.log
            .record_module(&module.name, ModuleStatus::Skipped, Some("no manifest"));
        return;
    }

    ctx.log.stage(&format!("Deploying {}", module.name));
    match apply::deploy_module_dir(ctx, &module.dir) {
        Ok(stats) => {
            let status = if ctx.config.dry_run {
                ModuleStatus::DryRun
            } else {
                ModuleStatus::Ok
            };
            ctx.log.record_module(&module.name, status, Some(&stats.summary()));
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e}", module.name));
            ctx.log
                .record_module(&module.name, ModuleStatus::Failed, Some(&e.to_string()));
        }
    }
}

/// Print the batch summary and fail with a per-module error count when any
/// module's deployment failed.
///
/// # Errors
///
/// Returns an error carrying the failure count if any module failed.
pub fn finish_batch(log: &Logger) -> Result<()> {
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} module(s) failed");
    }
    Ok(())
}
