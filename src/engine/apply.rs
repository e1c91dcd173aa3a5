//! Manifest application orchestration.
//!
//! Walks a manifest's entries in file order, dispatching each to import
//! resolution, shell-hook execution, or mapping application. Failure on any
//! entry aborts that manifest's iteration and propagates to the caller;
//! links already created by prior entries remain on disk (re-running after
//! fixing the cause completes the remainder).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::workspace::{LOCAL_MANIFEST_FILE, MANIFEST_FILE};

use super::link::{self, ApplyOutcome};
use super::manifest::{self, ManifestEntry};
use super::{Context, basedir, expand};

/// Environment binding exposed to shell directives: the project root joined
/// with the effective base directory.
pub const HOOK_ENV_ROOT: &str = "MODMAN_PROJECT_ROOT";
/// Environment binding exposed to shell directives: the module directory.
pub const HOOK_ENV_MODULE: &str = "MODMAN_MODULE_DIR";

/// Counters accumulated over one deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeployStats {
    /// Mappings materialized (created or replaced).
    pub linked: u32,
    /// Mappings that were already correct.
    pub already: u32,
    /// Mappings skipped because their source does not exist.
    pub skipped: u32,
}

impl DeployStats {
    /// Render the counters in the form used by per-module summaries.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} linked, {} already ok, {} skipped",
            self.linked, self.already, self.skipped
        )
    }
}

/// Applies manifests against a [`Context`], tracking import recursion.
#[derive(Debug)]
pub struct Deployer<'a> {
    ctx: &'a Context,
    /// Canonicalized manifests currently being applied; guards against
    /// import cycles.
    visited: Vec<PathBuf>,
    stats: DeployStats,
}

impl<'a> Deployer<'a> {
    /// Create a deployer for the given context.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self {
            ctx,
            visited: Vec::new(),
            stats: DeployStats {
                linked: 0,
                already: 0,
                skipped: 0,
            },
        }
    }

    /// Counters accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> DeployStats {
        self.stats
    }

    /// Apply the manifest at `manifest` under `inherited_base`.
    ///
    /// The module's own base-directory marker, if present, wins over the
    /// inherited value. Entries are processed in file order; the first
    /// failure aborts and propagates.
    ///
    /// # Errors
    ///
    /// Returns the first [`EngineError`] raised by parsing, a mapping, an
    /// import, or a shell directive.
    pub fn apply_manifest(
        &mut self,
        manifest: &Path,
        inherited_base: &str,
    ) -> Result<(), EngineError> {
        let canonical =
            dunce::canonicalize(manifest).map_err(|e| EngineError::io(manifest, e))?;
        if self.visited.contains(&canonical) {
            return Err(EngineError::ImportCycle {
                manifest: canonical,
            });
        }
        self.visited.push(canonical);
        let result = self.apply_entries(manifest, inherited_base);
        self.visited.pop();
        result
    }

    fn apply_entries(&mut self, manifest: &Path, inherited_base: &str) -> Result<(), EngineError> {
        let module_dir = manifest
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let content = fs::read_to_string(manifest).map_err(|e| EngineError::io(manifest, e))?;

        let own_base = basedir::read(&module_dir)?;
        let base = if own_base.is_empty() {
            inherited_base.to_string()
        } else {
            own_base
        };

        // Entries are parsed and applied line by line, so entries before a
        // malformed line keep their on-disk effect (no rollback).
        for raw in content.lines() {
            let line = raw.trim_end_matches('\r');
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match manifest::parse_line(line)? {
                ManifestEntry::Mapping { target, real } => {
                    self.apply_mapping(&module_dir, &base, &target, &real)?;
                }
                ManifestEntry::Import { path, base: arg } => {
                    self.apply_import(&module_dir, &base, &path, arg.as_deref())?;
                }
                ManifestEntry::Shell { command } => {
                    self.run_hook(&module_dir, &base, &command)?;
                }
            }
        }
        Ok(())
    }

    /// Resolve an import directive and recurse into the imported manifest.
    ///
    /// Without an explicit base argument the current effective base is
    /// inherited unchanged. With one, the bases compose, the destination
    /// directory is created, and the composed value is persisted against the
    /// imported module so later direct operations on it see the same
    /// override.
    fn apply_import(
        &mut self,
        module_dir: &Path,
        current_base: &str,
        path: &str,
        base_arg: Option<&str>,
    ) -> Result<(), EngineError> {
        let import_dir = module_dir.join(path);
        let imported = import_dir.join(MANIFEST_FILE);
        if !imported.is_file() {
            return Err(EngineError::Import {
                manifest: imported,
                reason: "manifest not found or unreadable".to_string(),
            });
        }

        let base = match base_arg {
            None => current_base.to_string(),
            Some(arg) => {
                let arg = basedir::normalize(arg);
                let composed = if current_base.is_empty() {
                    arg
                } else if arg.is_empty() {
                    current_base.to_string()
                } else {
                    format!("{current_base}/{arg}")
                };
                if self.ctx.config.dry_run {
                    self.ctx
                        .log
                        .dry_run(&format!("would set base directory '{composed}' for {path}"));
                } else {
                    let dest = self.ctx.config.base_root(&composed);
                    fs::create_dir_all(&dest).map_err(|e| EngineError::io(&dest, e))?;
                    basedir::write(&import_dir, &composed)?;
                }
                composed
            }
        };

        self.ctx.log.debug(&format!("importing {path}"));
        self.apply_manifest(&imported, &base)
    }

    /// Execute a shell directive with the module directory as working
    /// directory and the two standard environment bindings.
    fn run_hook(&self, module_dir: &Path, base: &str, command: &str) -> Result<(), EngineError> {
        if self.ctx.config.dry_run {
            self.ctx.log.dry_run(&format!("would run: {command}"));
            return Ok(());
        }

        let project_root = self.ctx.config.base_root(base);
        let env = [
            (HOOK_ENV_ROOT, project_root.to_string_lossy().to_string()),
            (HOOK_ENV_MODULE, module_dir.to_string_lossy().to_string()),
        ];
        let env_refs: Vec<(&str, &str)> = env.iter().map(|(k, v)| (*k, v.as_str())).collect();

        self.ctx.log.debug(&format!("running: {command}"));
        let code = self
            .ctx
            .executor
            .run_shell(module_dir, command, &env_refs)
            .map_err(|e| EngineError::Hook {
                command: format!("{command}: {e}"),
                code: -1,
            })?;
        if code != 0 {
            return Err(EngineError::Hook {
                command: command.to_string(),
                code,
            });
        }
        Ok(())
    }

    /// Apply one mapping entry, expanding globs when the literal source is
    /// absent.
    fn apply_mapping(
        &mut self,
        module_dir: &Path,
        base: &str,
        target: &str,
        real: &str,
    ) -> Result<(), EngineError> {
        let src = module_dir.join(target);

        // Literal source (any filesystem object, including a symlink).
        if fs::symlink_metadata(&src).is_ok() {
            let dest = self.mapping_dest(&src, base, real);
            return self.apply_one(&src, &dest, target, real);
        }

        let matches = expand::expand(module_dir, target)?;
        if matches.is_empty() {
            // Optional files are common across module variants; a missing
            // target is a warning, not an error.
            self.ctx.log.warn(&format!("target does not exist: {target}"));
            self.stats.skipped += 1;
            return Ok(());
        }

        let dest_dir = self.ctx.config.base_root(base).join(real);
        for matched in matches {
            let Some(name) = matched.file_name() else {
                continue;
            };
            let dest = dest_dir.join(name);
            let label = matched
                .strip_prefix(module_dir)
                .unwrap_or(&matched)
                .display()
                .to_string();
            self.apply_one(&matched, &dest, &label, real)?;
        }
        Ok(())
    }

    /// Compute the destination for a literal mapping, widening to
    /// "destination directory + source base name" when the source is a plain
    /// file landing in an existing directory or the declared destination
    /// ends with a path separator.
    fn mapping_dest(&self, src: &Path, base: &str, real: &str) -> PathBuf {
        let dest = self.ctx.config.base_root(base).join(real);
        let trailing_sep = real.ends_with('/') || real.ends_with('\\');
        if trailing_sep || (src.is_file() && dest.is_dir()) {
            if let Some(name) = src.file_name() {
                return dest.join(name);
            }
        }
        dest
    }

    fn apply_one(
        &mut self,
        src: &Path,
        dest: &Path,
        target: &str,
        real: &str,
    ) -> Result<(), EngineError> {
        match link::apply(&self.ctx.config, src, dest)? {
            ApplyOutcome::Created | ApplyOutcome::Replaced => {
                self.ctx.log.info(&format!("Applied: {target} -> {real}"));
                self.stats.linked += 1;
            }
            ApplyOutcome::AlreadyCorrect => {
                self.ctx.log.debug(&format!("ok: {target} (already linked)"));
                self.stats.already += 1;
            }
            ApplyOutcome::WouldChange => {
                self.ctx.log.dry_run(&format!("would apply: {target} -> {real}"));
                self.stats.linked += 1;
            }
        }
        Ok(())
    }
}

/// Deploy a module directory: apply its `modman` manifest, then the
/// `modman.local` companion (processed identically) when present and local
/// processing is enabled.
///
/// The inherited base starts empty; the module's own `.basedir` marker, if
/// any, takes effect inside [`Deployer::apply_manifest`].
///
/// # Errors
///
/// Returns [`EngineError::Import`] if the module has no manifest, or the
/// first error raised while applying either manifest.
pub fn deploy_module_dir(ctx: &Context, module_dir: &Path) -> Result<DeployStats, EngineError> {
    let manifest = module_dir.join(MANIFEST_FILE);
    if !manifest.is_file() {
        return Err(EngineError::Import {
            manifest,
            reason: "module has no manifest".to_string(),
        });
    }

    let mut deployer = Deployer::new(ctx);
    deployer.apply_manifest(&manifest, "")?;

    if ctx.config.local {
        let local = module_dir.join(LOCAL_MANIFEST_FILE);
        if local.is_file() {
            deployer.apply_manifest(&local, "")?;
        }
    }

    Ok(deployer.stats())
}

#[cfg(test)]
#[cfg(unix)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::engine::Config;
    use crate::engine::test_helpers::{MockExecutor, RecordingLog, make_context};
    use crate::exec::Executor;
    use crate::logging::Log;
    use std::sync::Arc;

    /// Create a module under `<root>/.modman/<name>` with the given manifest
    /// content, returning its directory.
    fn make_module(root: &Path, name: &str, manifest: &str) -> PathBuf {
        let dir = root.join(".modman").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
        dir
    }

    #[test]
    fn deploys_simple_mapping() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, _exec) = make_context(tmp.path());
        let dir = make_module(tmp.path(), "mod", "code app/code\n");
        fs::create_dir_all(dir.join("code")).unwrap();

        let stats = deploy_module_dir(&ctx, &dir).unwrap();
        assert_eq!(stats.linked, 1);
        let dest = tmp.path().join("app/code");
        assert!(fs::symlink_metadata(&dest).unwrap().is_symlink());
    }

    #[test]
    fn missing_module_manifest_is_import_error() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, _exec) = make_context(tmp.path());
        let dir = tmp.path().join(".modman/empty");
        fs::create_dir_all(&dir).unwrap();

        let err = deploy_module_dir(&ctx, &dir).unwrap_err();
        assert!(matches!(err, EngineError::Import { .. }));
    }

    #[test]
    fn missing_target_warns_and_continues() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, log, _exec) = make_context(tmp.path());
        let dir = make_module(tmp.path(), "mod", "ghost ghost\nreal real\n");
        fs::write(dir.join("real"), "x").unwrap();

        let stats = deploy_module_dir(&ctx, &dir).unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.linked, 1, "later entries still processed");
        let warnings = log.warning_lines();
        assert!(warnings.iter().any(|w| w.contains("ghost")));
    }

    #[test]
    fn glob_fan_out_creates_one_link_per_match() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, _exec) = make_context(tmp.path());
        let dir = make_module(tmp.path(), "mod", "etc/*.xml app/etc/modules\n");
        fs::create_dir_all(dir.join("etc")).unwrap();
        fs::write(dir.join("etc/A.xml"), "").unwrap();
        fs::write(dir.join("etc/B.xml"), "").unwrap();
        fs::write(dir.join("etc/notes.txt"), "").unwrap();

        let stats = deploy_module_dir(&ctx, &dir).unwrap();
        assert_eq!(stats.linked, 2);
        assert!(tmp.path().join("app/etc/modules/A.xml").exists());
        assert!(tmp.path().join("app/etc/modules/B.xml").exists());
        assert!(!tmp.path().join("app/etc/modules/notes.txt").exists());
    }

    #[test]
    fn trailing_separator_widens_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, _exec) = make_context(tmp.path());
        let dir = make_module(tmp.path(), "mod", "code/Block app/code/local/My/Module/\n");
        fs::create_dir_all(dir.join("code/Block")).unwrap();

        deploy_module_dir(&ctx, &dir).unwrap();
        let dest = tmp.path().join("app/code/local/My/Module/Block");
        let value = fs::read_link(&dest).unwrap();
        assert_eq!(
            value,
            PathBuf::from("../../../../../.modman/mod/code/Block")
        );
    }

    #[test]
    fn file_into_existing_directory_widens_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, _exec) = make_context(tmp.path());
        let dir = make_module(tmp.path(), "mod", "lib.js js\n");
        fs::write(dir.join("lib.js"), "x").unwrap();
        fs::create_dir_all(tmp.path().join("js")).unwrap();

        deploy_module_dir(&ctx, &dir).unwrap();
        assert!(tmp.path().join("js/lib.js").exists());
    }

    #[test]
    fn redeployment_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, _exec) = make_context(tmp.path());
        let dir = make_module(tmp.path(), "mod", "code app/code\nlib lib\n");
        fs::create_dir_all(dir.join("code")).unwrap();
        fs::create_dir_all(dir.join("lib")).unwrap();

        let first = deploy_module_dir(&ctx, &dir).unwrap();
        assert_eq!(first.linked, 2);
        let second = deploy_module_dir(&ctx, &dir).unwrap();
        assert_eq!(second.linked, 0);
        assert_eq!(second.already, 2);
    }

    #[test]
    fn basedir_marker_redirects_destinations() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, _exec) = make_context(tmp.path());
        let dir = make_module(tmp.path(), "mod", "code app/code\n");
        fs::create_dir_all(dir.join("code")).unwrap();
        basedir::write(&dir, "www").unwrap();

        deploy_module_dir(&ctx, &dir).unwrap();
        assert!(tmp.path().join("www/app/code").exists());
        assert!(!tmp.path().join("app/code").exists());
    }

    #[test]
    fn import_inherits_effective_base() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, _exec) = make_context(tmp.path());
        let dir = make_module(tmp.path(), "mod", "@import submodule\n");
        basedir::write(&dir, "www").unwrap();
        let sub = dir.join("submodule");
        fs::create_dir_all(sub.join("Lib")).unwrap();
        fs::write(sub.join(MANIFEST_FILE), "Lib lib/Lib\n").unwrap();

        deploy_module_dir(&ctx, &dir).unwrap();
        assert!(
            tmp.path().join("www/lib/Lib").exists(),
            "imported mapping deploys under the importer's base"
        );
    }

    #[test]
    fn import_with_explicit_base_composes_and_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, _exec) = make_context(tmp.path());
        let dir = make_module(tmp.path(), "mod", "@import submodule vendor\n");
        basedir::write(&dir, "www").unwrap();
        let sub = dir.join("submodule");
        fs::create_dir_all(sub.join("Lib")).unwrap();
        fs::write(sub.join(MANIFEST_FILE), "Lib Lib\n").unwrap();

        deploy_module_dir(&ctx, &dir).unwrap();
        assert!(tmp.path().join("www/vendor/Lib").exists());
        assert_eq!(
            basedir::read(&sub).unwrap(),
            "www/vendor",
            "composed base persisted against the imported module"
        );
    }

    #[test]
    fn missing_import_manifest_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, _exec) = make_context(tmp.path());
        let dir = make_module(tmp.path(), "mod", "@import nowhere\ncode code\n");
        fs::create_dir_all(dir.join("code")).unwrap();

        let err = deploy_module_dir(&ctx, &dir).unwrap_err();
        assert!(matches!(err, EngineError::Import { .. }));
        assert!(
            !tmp.path().join("code").exists(),
            "entries after the failure are not processed"
        );
    }

    #[test]
    fn import_cycle_is_reported_not_unbounded() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, _exec) = make_context(tmp.path());
        let dir = make_module(tmp.path(), "mod", "@import sub\n");
        let sub = dir.join("sub");
        fs::create_dir_all(&sub).unwrap();
        // The submodule imports its parent, closing the cycle.
        fs::write(sub.join(MANIFEST_FILE), "@import ..\n").unwrap();

        let err = deploy_module_dir(&ctx, &dir).unwrap_err();
        assert!(matches!(err, EngineError::ImportCycle { .. }));
    }

    #[test]
    fn diamond_imports_are_allowed() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, _exec) = make_context(tmp.path());
        let dir = make_module(tmp.path(), "mod", "@import a\n@import b\n");
        for leg in ["a", "b"] {
            let leg_dir = dir.join(leg);
            fs::create_dir_all(&leg_dir).unwrap();
            fs::write(leg_dir.join(MANIFEST_FILE), "@import ../shared\n").unwrap();
        }
        let shared = dir.join("shared");
        fs::create_dir_all(&shared).unwrap();
        fs::write(shared.join(MANIFEST_FILE), "data data\n").unwrap();
        fs::create_dir_all(shared.join("data")).unwrap();

        // The shared module is applied twice (once per leg); the second pass
        // is an idempotent no-op, not a cycle.
        let stats = deploy_module_dir(&ctx, &dir).unwrap();
        assert_eq!(stats.linked, 1);
        assert_eq!(stats.already, 1);
    }

    #[test]
    fn hook_receives_env_and_working_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, exec) = make_context(tmp.path());
        let dir = make_module(tmp.path(), "mod", "@shell ./setup.sh --quiet\n");
        basedir::write(&dir, "www").unwrap();

        deploy_module_dir(&ctx, &dir).unwrap();
        let calls = exec.calls();
        assert_eq!(calls.len(), 1);
        let (cwd, command, env) = &calls[0];
        assert_eq!(cwd, &dir);
        assert_eq!(command, "./setup.sh --quiet");
        let root_binding = env
            .iter()
            .find(|(k, _)| k.as_str() == HOOK_ENV_ROOT)
            .map(|(_, v)| v.clone())
            .unwrap();
        assert_eq!(
            root_binding,
            tmp.path().join("www").to_string_lossy().to_string()
        );
        let module_binding = env
            .iter()
            .find(|(k, _)| k.as_str() == HOOK_ENV_MODULE)
            .map(|(_, v)| v.clone())
            .unwrap();
        assert_eq!(module_binding, dir.to_string_lossy().to_string());
    }

    #[test]
    fn failing_hook_aborts_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let log = Arc::new(RecordingLog::default());
        let executor = Arc::new(MockExecutor::with_shell_codes(vec![2]));
        let config = Config::new(tmp.path().to_path_buf(), tmp.path().join(".modman"));
        let ctx = Context::new(
            config,
            Arc::clone(&log) as Arc<dyn Log>,
            Arc::clone(&executor) as Arc<dyn Executor>,
        );
        let dir = make_module(tmp.path(), "mod", "@shell ./fail.sh\ncode code\n");
        fs::create_dir_all(dir.join("code")).unwrap();

        let err = deploy_module_dir(&ctx, &dir).unwrap_err();
        assert!(matches!(err, EngineError::Hook { code: 2, .. }));
        assert!(!tmp.path().join("code").exists());
    }

    #[test]
    fn local_manifest_processed_after_primary() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, _exec) = make_context(tmp.path());
        let dir = make_module(tmp.path(), "mod", "code code\n");
        fs::create_dir_all(dir.join("code")).unwrap();
        fs::create_dir_all(dir.join("extra")).unwrap();
        fs::write(dir.join(LOCAL_MANIFEST_FILE), "extra extra\n").unwrap();

        let stats = deploy_module_dir(&ctx, &dir).unwrap();
        assert_eq!(stats.linked, 2);
        assert!(tmp.path().join("extra").exists());
    }

    #[test]
    fn local_manifest_disabled_by_config() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut ctx, _log, _exec) = make_context(tmp.path());
        ctx.config.local = false;
        let dir = make_module(tmp.path(), "mod", "code code\n");
        fs::create_dir_all(dir.join("code")).unwrap();
        fs::create_dir_all(dir.join("extra")).unwrap();
        fs::write(dir.join(LOCAL_MANIFEST_FILE), "extra extra\n").unwrap();

        let stats = deploy_module_dir(&ctx, &dir).unwrap();
        assert_eq!(stats.linked, 1);
        assert!(!tmp.path().join("extra").exists());
    }

    #[test]
    fn dry_run_logs_without_linking() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut ctx, log, _exec) = make_context(tmp.path());
        ctx.config.dry_run = true;
        let dir = make_module(tmp.path(), "mod", "code code\n@shell ./setup.sh\n");
        fs::create_dir_all(dir.join("code")).unwrap();

        let stats = deploy_module_dir(&ctx, &dir).unwrap();
        assert_eq!(stats.linked, 1, "counted as a would-be change");
        assert!(!tmp.path().join("code").exists());
        let lines = log.dry_run_lines();
        assert!(lines.iter().any(|l| l.contains("would apply")));
        assert!(lines.iter().any(|l| l.contains("would run")));
    }

    #[test]
    fn parse_error_quotes_line_and_aborts() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, _exec) = make_context(tmp.path());
        let dir = make_module(tmp.path(), "mod", "code code\n@import\n");
        fs::create_dir_all(dir.join("code")).unwrap();

        let err = deploy_module_dir(&ctx, &dir).unwrap_err();
        assert!(err.to_string().contains("'@import'"));
        // The entry before the bad line was still applied (no rollback).
        assert!(tmp.path().join("code").exists());
    }
}
