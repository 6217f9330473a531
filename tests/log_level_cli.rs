use assert_fs::prelude::*;
use std::process::{Command, Output};
use vfs_redirect::config::{CONFIG_ENV, LOG_LEVEL_ENV};

const PKG: &str = r"C:\Program Files\WindowsApps\Contoso.App_1.0.0.0_x64__8wekyb3d8bbwe";
const READY: &str = "Path redirector ready";

/// `virtualize D:\games\save.dat` against an empty rule set.
fn virtualize(extra: &[&str], env_level: Option<&str>) -> Output {
    let td = assert_fs::TempDir::new().unwrap();
    let rules = td.child("rules.json");
    rules.write_str("{}").unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vfs_redirect"));
    cmd.args(["virtualize", r"D:\games\save.dat"])
        .args(extra)
        .args(["--package-root", PKG])
        .args(["--family-name", "Contoso.App_8wekyb3d8bbwe"])
        .args(["--local-app-data", r"C:\Users\me\AppData\Local"])
        .arg("--host-root")
        .arg(td.path())
        .arg("--config")
        .arg(rules.path())
        .env_remove(CONFIG_ENV)
        .env_remove(LOG_LEVEL_ENV);
    if let Some(level) = env_level {
        cmd.env(LOG_LEVEL_ENV, level);
    }
    cmd.output().expect("spawn binary")
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn debug_level_flag_shows_resolver_setup() {
    let out = virtualize(&["--log-level", "debug"], None);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains(READY), "stderr: {}", stderr(&out));
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        format!(r"{PKG}\VFS\D$\games\save.dat")
    );
}

#[test]
fn env_var_sets_the_level_when_no_flag_is_given() {
    let out = virtualize(&[], Some("INFO"));
    assert!(out.status.success());
    assert!(stderr(&out).contains(READY), "stderr: {}", stderr(&out));

    let out = virtualize(&[], Some("quiet"));
    assert!(out.status.success());
    assert!(stderr(&out).is_empty(), "stderr: {}", stderr(&out));
}

#[test]
fn flag_beats_env_var_and_debug_beats_both() {
    let out = virtualize(&["--log-level", "normal"], Some("debug"));
    assert!(out.status.success());
    assert!(!stderr(&out).contains(READY), "stderr: {}", stderr(&out));

    let out = virtualize(&["-d"], Some("quiet"));
    assert!(out.status.success());
    assert!(stderr(&out).contains(READY), "stderr: {}", stderr(&out));
}

#[test]
fn unknown_level_is_a_usage_error() {
    let out = virtualize(&["--log-level", "loud"], None);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("invalid log level"), "stderr: {}", stderr(&out));
    assert!(out.stdout.is_empty());

    let out = virtualize(&[], Some("loud"));
    assert_eq!(out.status.code(), Some(2));
}
