//! The `clone` and `checkout` commands.
use std::sync::Arc;

use anyhow::{Result, bail};

use crate::cli::{CheckoutOpts, GlobalOpts};
use crate::engine::apply;
use crate::logging::Logger;
use crate::vcs::{self, VcsKind};

use super::{CommandSetup, set_basedir_override};

/// Derive a module name from a repository URL: the last path segment with
/// any `.git` suffix removed.
fn module_name_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let segment = trimmed.rsplit(['/', ':']).next()?;
    let name = segment.strip_suffix(".git").unwrap_or(segment);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Fetch a module into the store with the given VCS, then deploy it.
///
/// # Errors
///
/// Returns an error if the module already exists, the fetch fails, or the
/// deployment fails.
pub fn run(global: &GlobalOpts, opts: &CheckoutOpts, kind: VcsKind, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, Arc::clone(log))?;

    let name = match &opts.name {
        Some(name) => name.clone(),
        None => module_name_from_url(&opts.url)
            .ok_or_else(|| anyhow::anyhow!("cannot derive a module name from '{}'", opts.url))?,
    };

    let dest = setup.workspace.store().join(&name);
    if dest.exists() {
        bail!("module '{name}' already exists in the store");
    }

    log.stage(&format!("Fetching {name}"));
    match kind {
        VcsKind::Git => vcs::clone(setup.ctx.executor.as_ref(), &opts.url, &dest)?,
        VcsKind::Svn => vcs::checkout(setup.ctx.executor.as_ref(), &opts.url, &dest)?,
        VcsKind::Hg => bail!("mercurial checkouts are not supported here"),
    }

    let module = setup.workspace.module(&name)?;
    if let Some(basedir) = &opts.basedir {
        set_basedir_override(&setup.ctx, &module, basedir)?;
    }

    if !module.has_manifest() {
        bail!("module '{name}' has no manifest");
    }

    log.stage(&format!("Deploying {name}"));
    let stats = apply::deploy_module_dir(&setup.ctx, &module.dir)?;
    log.info(&stats.summary());
    Ok(())
}
