mod common;

use common::*;
use vfs_redirect::RedirectFlags;

const RULES: &str = r#"{
  "redirectedPaths": {
    "packageRelative": [ { "base": "", "patterns": [".*"] } ],
    "knownFolders": [
      { "id": "ProgramData", "base": "Vendor", "patterns": [".*"] },
      { "id": "RoamingAppData", "base": "Contoso", "patterns": [".*"], "redirectTargetBase": "D:\\Redirects" }
    ]
  }
}"#;

#[test]
fn store_paths_reverse_to_the_package_vfs() {
    let fx = Fixture::new(RULES);
    fx.mkdir(&format!(r"{PKG}\VFS\Common AppData"));
    let d = fx
        .redirector
        .redirect(r"C:\ProgramData\Vendor\settings.ini", RedirectFlags::empty());
    let target = d.redirect_path().expect("redirected");
    assert_eq!(
        fx.redirector.reverse(target).as_deref(),
        Some(format!(r"{PKG}\VFS\Common AppData\Vendor\settings.ini").as_str())
    );
}

#[test]
fn writable_package_root_reverses_to_the_package() {
    let fx = Fixture::new(RULES);
    let requested = format!(r"{PKG}\saves\slot1.dat");
    let d = fx.redirector.redirect(&requested, RedirectFlags::empty());
    let target = d.redirect_path().expect("redirected");
    assert_eq!(target, format!(r"{WRITABLE}\saves\slot1.dat"));
    assert_eq!(fx.redirector.reverse(target).as_deref(), Some(requested.as_str()));
}

#[test]
fn override_bases_reverse_too() {
    let fx = Fixture::new(RULES);
    fx.mkdir(&format!(r"{PKG}\VFS\AppData"));
    let d = fx.redirector.redirect(
        r"C:\Users\me\AppData\Roaming\Contoso\prefs.json",
        RedirectFlags::empty(),
    );
    let target = d.redirect_path().expect("redirected");
    assert_eq!(target, r"D:\Redirects\C$\Users\me\AppData\Roaming\Contoso\prefs.json");
    assert_eq!(
        fx.redirector.reverse(target).as_deref(),
        Some(format!(r"{PKG}\VFS\AppData\Contoso\prefs.json").as_str())
    );
}

#[test]
fn reversing_twice_changes_nothing_more() {
    let fx = Fixture::new(RULES);
    let once = fx
        .redirector
        .reverse(&format!(r"{STORE}\C$\ProgramData\Other\x.txt"))
        .expect("store path");
    assert_eq!(fx.redirector.reverse(&once), None);
    assert_eq!(fx.redirector.reverse(r"C:\Windows\notepad.exe"), None);
    assert_eq!(fx.redirector.reverse(r"\\srv\share\x"), None);
}

#[test]
fn virtualize_and_devirtualize_are_inverse() {
    let fx = Fixture::new("{}");
    let native = r"C:\Program Files\Contoso\app.exe";
    let vfs = fx.redirector.virtualize(native).expect("mapped");
    assert_eq!(vfs, format!(r"{PKG}\VFS\ProgramFilesX64\Contoso\app.exe"));
    assert_eq!(fx.redirector.devirtualize(&vfs).as_deref(), Some(native));

    let unmapped = fx.redirector.virtualize(r"D:\games\save.dat").expect("drive fallback");
    assert_eq!(unmapped, format!(r"{PKG}\VFS\D$\games\save.dat"));
    assert_eq!(fx.redirector.devirtualize(&unmapped).as_deref(), Some(r"D:\games\save.dat"));
    assert_eq!(fx.redirector.devirtualize(r"C:\Windows"), None);
}
