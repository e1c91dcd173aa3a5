//! Manifest-driven module deployment engine.
//!
//! Deploys a module's files into a project tree by materializing its
//! declarative `modman` manifest as symbolic links (or copies): mappings,
//! glob fan-out, recursive imports, shell directives, and per-module
//! base-directory indirection — all idempotent and non-destructive by
//! default.
//!
//! The public API is organised into four layers:
//!
//! - **[`workspace`]** — module store discovery and enumeration
//! - **[`engine`]** — manifest parsing, glob expansion, base-directory
//!   markers, the link/copy applier, and the dead-link sweeper
//! - **[`vcs`]** — thin wrappers over external `git`/`svn`/`hg` binaries
//! - **[`commands`]** — top-level subcommand orchestration (`deploy`,
//!   `deploy-all`, `update-all`, `repair`, `clean`, …)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod engine;
pub mod error;
pub mod exec;
pub mod logging;
pub mod vcs;
pub mod workspace;
