use std::fs;
use tempfile::tempdir;

use nexuslite_paginate::logger;
use nexuslite_paginate::utils::devlog::DEV_TARGET;

#[test]
fn configure_logging_writes_app_and_dev_in_dir() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("proc_logs");
    fs::create_dir_all(&base).unwrap();
    logger::configure_logging(Some(&base), Some("debug"), Some(3)).unwrap();
    log::info!("hello app");
    log::trace!(target: DEV_TARGET, "dev line");
    assert!(base.join("app.log").exists());
    assert!(base.join("dev.log").exists());
}

#[test]
fn configure_logging_creates_missing_dir() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("nested").join("logs");
    logger::configure_logging(Some(&base), Some("trace"), Some(1)).unwrap();
    assert!(base.is_dir());
    assert!(base.join("app.log").exists());
}

#[test]
fn init_path_rejects_missing_file() {
    let dir = tempdir().unwrap();
    assert!(logger::init_path(&dir.path().join("nope.yaml")).is_err());
}
