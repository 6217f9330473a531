//! Reverse-Redirector: store path -> the package path it stands in for.

use super::RedirectContext;
use crate::paths::{self, decode_drive, strip_path_prefix};

impl RedirectContext {
    /// Undo a redirect.
    ///
    /// `<writable root>\rest` maps back to `<package root>\rest`;
    /// `<store>\C$\rest` maps to the package VFS spelling of `C:\rest`.
    /// Anything not inside a store yields `None`.
    pub fn reverse(&self, path: &str) -> Option<String> {
        if let Some(rel) = strip_path_prefix(path, &self.writable_root) {
            return Some(paths::join(self.package_root(), rel));
        }
        let mut stores = vec![self.redirect_root.as_str()];
        stores.extend(self.specs.target_overrides());
        stores.into_iter().find_map(|store| {
            let rel = strip_path_prefix(path, store)?;
            let native = decode_drive(rel)?;
            self.table.virtualize(&native)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::paths::normalize;

    const RULES: &str = r#"{ "redirectedPaths": {
        "packageRelative": [ { "base": "", "patterns": [".*"] } ],
        "knownFolders": [ { "id": "ProgramData", "base": "Vendor", "patterns": [".*"], "redirectTargetBase": "D:\\R" } ] } }"#;

    #[test]
    fn writable_root_maps_back_to_package() {
        let (_td, ctx) = context(RULES);
        assert_eq!(
            ctx.reverse(&format!(r"{WRITABLE}\data\x.json")).unwrap(),
            format!(r"{PKG}\data\x.json")
        );
        assert_eq!(ctx.reverse(WRITABLE).unwrap(), PKG);
    }

    #[test]
    fn store_maps_back_to_package_vfs() {
        let (_td, ctx) = context(RULES);
        assert_eq!(
            ctx.reverse(&format!(r"{STORE}\C$\ProgramData\Vendor\a.ini")).unwrap(),
            format!(r"{PKG}\VFS\Common AppData\Vendor\a.ini")
        );
        assert_eq!(
            ctx.reverse(r"D:\R\C$\ProgramData\Vendor\a.ini").unwrap(),
            format!(r"{PKG}\VFS\Common AppData\Vendor\a.ini")
        );
        assert_eq!(
            ctx.reverse(&format!(r"{STORE}\E$\games\save.dat")).unwrap(),
            format!(r"{PKG}\VFS\E$\games\save.dat")
        );
    }

    #[test]
    fn paths_outside_stores_have_nothing_to_undo() {
        let (_td, ctx) = context(RULES);
        assert_eq!(ctx.reverse(r"C:\ProgramData\Vendor\a.ini"), None);
        assert_eq!(ctx.reverse(&format!(r"{PKG}\a.txt")), None);
        assert_eq!(ctx.reverse(STORE), None);
    }

    #[test]
    fn redirect_then_reverse_round_trips() {
        let (_td, ctx) = context(RULES);
        let m = ctx.decide(&normalize(&format!(r"{PKG}\logs\a.log"))).unwrap();
        let target = ctx.target_for(&m).unwrap();
        assert_eq!(ctx.reverse(&target).unwrap(), format!(r"{PKG}\logs\a.log"));
        assert!(ctx.decide(&normalize(&target)).is_none());
    }
}
