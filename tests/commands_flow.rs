#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the command wrappers: batch error counting,
//! base-directory overrides, repair, clean, and remove flows.
#![cfg(unix)]

mod common;

use std::fs;
use std::sync::Arc;

use common::TestProject;
use modman_cli::cli::{DeployOpts, GlobalOpts, ModuleOpts};
use modman_cli::commands;
use modman_cli::engine::basedir;
use modman_cli::logging::Logger;

fn global_opts(project: &TestProject) -> GlobalOpts {
    GlobalOpts {
        root: Some(project.root().to_path_buf()),
        force: false,
        copy: false,
        local: true,
        dry_run: false,
    }
}

#[test]
fn deploy_all_counts_per_module_failures() {
    let project = TestProject::new();

    // A healthy module.
    let good = project.add_module("good", "code code\n");
    fs::create_dir_all(good.join("code")).unwrap();

    // A module that will hit a conflict.
    let bad = project.add_module("bad", "blocked blocked\n");
    fs::write(bad.join("blocked"), "x").unwrap();
    fs::write(project.root().join("blocked"), "occupied").unwrap();

    let log = Arc::new(Logger::new("test"));
    let err = commands::deploy::run_all(&global_opts(&project), &log).unwrap_err();
    assert!(err.to_string().contains("1 module(s) failed"));

    // The failure did not prevent the healthy module from deploying.
    assert!(project.root().join("code").exists());
    assert_eq!(log.failure_count(), 1);
}

#[test]
fn deploy_single_module_with_basedir_override() {
    let project = TestProject::new();
    let dir = project.add_module("shop", "code app/code\n");
    fs::create_dir_all(dir.join("code")).unwrap();

    let opts = DeployOpts {
        module: "shop".to_string(),
        basedir: Some("www/".to_string()),
    };
    let log = Arc::new(Logger::new("test"));
    commands::deploy::run(&global_opts(&project), &opts, &log).unwrap();

    assert!(project.root().join("www/app/code").exists());
    assert_eq!(basedir::read(&dir).unwrap(), "www");
}

#[test]
fn deploy_unknown_module_fails_immediately() {
    let project = TestProject::new();
    let opts = DeployOpts {
        module: "ghost".to_string(),
        basedir: None,
    };
    let log = Arc::new(Logger::new("test"));
    let err = commands::deploy::run(&global_opts(&project), &opts, &log).unwrap_err();
    assert!(err.to_string().contains("'ghost'"));
}

#[test]
fn clean_removes_only_dead_links() {
    let project = TestProject::new();
    let dir = project.add_module("mod", "keep keep\n");
    fs::create_dir_all(dir.join("keep")).unwrap();

    let log = Arc::new(Logger::new("test"));
    commands::deploy::run_all(&global_opts(&project), &log).unwrap();

    std::os::unix::fs::symlink("nowhere", project.root().join("dangling")).unwrap();

    commands::clean::run(&global_opts(&project), &log).unwrap();
    assert!(project.root().join("keep").exists());
    assert!(fs::symlink_metadata(project.root().join("dangling")).is_err());
}

#[test]
fn repair_sweeps_and_redeploys() {
    let project = TestProject::new();
    let dir = project.add_module("mod", "code code\n");
    fs::create_dir_all(dir.join("code")).unwrap();

    let log = Arc::new(Logger::new("test"));
    commands::deploy::run_all(&global_opts(&project), &log).unwrap();

    // Someone removed the link and left a dead one behind.
    fs::remove_file(project.root().join("code")).unwrap();
    std::os::unix::fs::symlink("stale", project.root().join("old")).unwrap();

    // A stale marker inside the module tree is cleared by repair.
    let nested = dir.join("sub");
    fs::create_dir_all(&nested).unwrap();
    basedir::write(&nested, "stale/base").unwrap();

    let log2 = Arc::new(Logger::new("test"));
    commands::repair::run(&global_opts(&project), &log2).unwrap();

    assert!(project.root().join("code").exists(), "link rebuilt");
    assert!(fs::symlink_metadata(project.root().join("old")).is_err());
    assert_eq!(basedir::read(&nested).unwrap(), "", "nested marker cleared");
}

#[test]
fn remove_deletes_module_and_sweeps_links() {
    let project = TestProject::new();
    let dir = project.add_module("mod", "code code\n");
    fs::create_dir_all(dir.join("code")).unwrap();

    let log = Arc::new(Logger::new("test"));
    commands::deploy::run_all(&global_opts(&project), &log).unwrap();
    assert!(project.root().join("code").exists());

    let opts = ModuleOpts {
        module: "mod".to_string(),
    };
    commands::remove::run(&global_opts(&project), &opts, &log).unwrap();

    assert!(!dir.exists(), "module directory deleted");
    assert!(
        fs::symlink_metadata(project.root().join("code")).is_err(),
        "its links are swept"
    );
}

#[test]
fn update_single_non_checkout_still_deploys() {
    let project = TestProject::new();
    let dir = project.add_module("plain", "data data\n");
    fs::create_dir_all(dir.join("data")).unwrap();

    let opts = ModuleOpts {
        module: "plain".to_string(),
    };
    let log = Arc::new(Logger::new("test"));
    commands::update::run(&global_opts(&project), &opts, &log).unwrap();
    assert!(project.root().join("data").exists());
}

#[test]
fn init_creates_store_once() {
    let fresh = tempfile::tempdir().unwrap();
    let global = GlobalOpts {
        root: Some(fresh.path().to_path_buf()),
        force: false,
        copy: false,
        local: true,
        dry_run: false,
    };
    let log = Arc::new(Logger::new("test"));
    commands::init::run(&global, &log).unwrap();
    assert!(fresh.path().join(".modman").is_dir());

    let err = commands::init::run(&global, &log).unwrap_err();
    assert!(err.to_string().contains("already initialized"));
}

#[test]
fn dry_run_deploy_all_touches_nothing() {
    let project = TestProject::new();
    let dir = project.add_module("mod", "code code\n");
    fs::create_dir_all(dir.join("code")).unwrap();

    let mut global = global_opts(&project);
    global.dry_run = true;
    let log = Arc::new(Logger::new("test"));
    commands::deploy::run_all(&global, &log).unwrap();
    assert!(!project.root().join("code").exists());
}
