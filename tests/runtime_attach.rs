mod common;

use common::*;
use serial_test::serial;
use vfs_redirect::{FindError, FindHandle, RedirectError, RedirectFlags, runtime};

#[test]
#[serial]
fn attach_once_then_route_every_primitive_through_it() {
    let td = tempfile::tempdir().unwrap();
    let rules = r#"{ "redirectedPaths": { "packageRelative": [ { "base": "", "patterns": [".*"] } ] } }"#;

    // nothing is redirected before attach
    let before = runtime::redirect(&format!(r"{PKG}\notes.txt"), RedirectFlags::empty());
    assert!(!before.should_redirect());

    let rt = runtime::attach(redirector_at(&td, rules)).expect("first attach");
    let d = runtime::redirect(&format!(r"{PKG}\notes.txt"), RedirectFlags::empty());
    assert_eq!(
        d.redirect_path(),
        Some(format!(r"{WRITABLE}\notes.txt").as_str())
    );
    assert!(std::ptr::eq(rt, runtime::get().unwrap()));

    let second = runtime::attach(redirector_at(&td, "{}"));
    assert!(matches!(second, Err(RedirectError::AlreadyAttached)));
    // the first configuration stays in force
    assert!(runtime::redirect(&format!(r"{PKG}\notes.txt"), RedirectFlags::empty()).should_redirect());

    let host = vfs_redirect::HostFs::rooted(td.path())
        .host_path(&format!(r"{PKG}\readme.md"))
        .unwrap();
    std::fs::create_dir_all(host.parent().unwrap()).unwrap();
    std::fs::write(&host, "hi").unwrap();
    let (h, first) = rt.find_first(&format!(r"{PKG}\*")).unwrap();
    assert_eq!(first.file_name, "readme.md");
    assert_eq!(rt.find_next(h).unwrap_err(), FindError::NoMoreFiles);
    rt.find_close(h).unwrap();
    assert_eq!(
        rt.find_next(FindHandle::from_raw(0xdead_beef)).unwrap_err(),
        FindError::InvalidHandle
    );
}
