#![cfg(unix)]

//! Ensures path_has_symlink_ancestor flags a symlinked parent of the log file directory.
//!
//! Strategy:
//! - Parent test runs a child process with HOME and XDG_DATA_HOME pointed into a temp dir.
//! - Child computes the default log path, replaces its parent dir with a symlink,
//!   and asserts the helper detects the symlink ancestor.

use std::fs;
use std::os::unix::fs as unix_fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn log_file_symlink_parent_refused() {
    let temp_home = tempdir().expect("temp HOME");
    let outside = tempdir().expect("outside target");

    // Spawn the current test binary to run only the ignored child test under the temp HOME.
    let me = std::env::current_exe().expect("current test binary");
    let status = Command::new(me)
        .arg("--ignored")
        .arg("--exact")
        .arg("log_file_symlink_parent_refused_child")
        .env("HOME", temp_home.path())
        .env("XDG_DATA_HOME", temp_home.path().join(".local/share"))
        .env("VFS_REDIRECT_OUTSIDE", outside.path())
        .status()
        .expect("spawn child test");
    assert!(status.success(), "child test failed: {status}");
}

#[test]
#[ignore]
fn log_file_symlink_parent_refused_child() {
    let log_path =
        vfs_redirect::config::paths::default_log_path().expect("default_log_path should resolve");

    assert!(
        !vfs_redirect::path_has_symlink_ancestor(&log_path).unwrap(),
        "baseline: no symlink ancestor expected for {}",
        log_path.display()
    );

    // e.g. ~/.local/share/vfs_redirect on Linux
    let app_dir = log_path.parent().expect("log_path has parent").to_path_buf();
    let parent_of_app = app_dir.parent().expect("app_dir has parent");
    fs::create_dir_all(parent_of_app).unwrap();

    let outside = std::path::PathBuf::from(
        std::env::var_os("VFS_REDIRECT_OUTSIDE").expect("OUTSIDE provided by parent"),
    );
    if app_dir.exists() {
        fs::remove_dir_all(&app_dir).unwrap();
    }
    unix_fs::symlink(&outside, &app_dir).unwrap();

    assert!(
        vfs_redirect::path_has_symlink_ancestor(&log_path).unwrap(),
        "symlink ancestor should be detected for {}",
        log_path.display()
    );
}
