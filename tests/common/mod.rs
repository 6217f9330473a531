//! Shared fixture: a package layout over a temp directory, served through a
//! rooted HostFs so `C:\...` lands in `<tmp>/C/...`.
#![allow(dead_code)]

use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use vfs_redirect::{
    FileSystem, HostFs, KnownFolders, PackageLayout, PathRedirector, parse_redirection_config,
};

pub const PKG: &str = r"C:\Program Files\WindowsApps\Contoso.App_1.0.0.0_x64__8wekyb3d8bbwe";
pub const FAMILY: &str = "Contoso.App_8wekyb3d8bbwe";
pub const LOCAL: &str = r"C:\Users\me\AppData\Local";
pub const STORE: &str =
    r"C:\Users\me\AppData\Local\Packages\Contoso.App_8wekyb3d8bbwe\LocalCache\Local\VFS";
pub const WRITABLE: &str = r"C:\Users\me\AppData\Local\Packages\Contoso.App_8wekyb3d8bbwe\LocalCache\Local\Microsoft\WritablePackageRoot";

pub struct Fixture {
    pub td: TempDir,
    pub redirector: PathRedirector,
}

impl Fixture {
    pub fn new(rules: &str) -> Self {
        let td = tempfile::tempdir().expect("tempdir");
        let redirector = redirector_at(&td, rules);
        Self { td, redirector }
    }

    pub fn host(&self) -> HostFs {
        HostFs::rooted(self.td.path())
    }

    pub fn touch(&self, path: &str, body: &str) {
        let host = self.host().host_path(path).expect("mappable path");
        fs::create_dir_all(host.parent().expect("parent")).unwrap();
        fs::write(host, body).unwrap();
    }

    pub fn mkdir(&self, path: &str) {
        let host = self.host().host_path(path).expect("mappable path");
        fs::create_dir_all(host).unwrap();
    }

    pub fn read(&self, path: &str) -> Option<String> {
        let host = self.host().host_path(path)?;
        fs::read_to_string(host).ok()
    }
}

pub fn redirector_at(td: &TempDir, rules: &str) -> PathRedirector {
    let fs: Arc<dyn FileSystem> = Arc::new(HostFs::rooted(td.path()).with_current_dir(r"C:\work"));
    let cfg = parse_redirection_config(rules).expect("valid rules");
    let layout = PackageLayout::new(PKG, FAMILY, LOCAL);
    let folders = KnownFolders::standard("C:", r"C:\Users\me");
    PathRedirector::new(layout, &folders, &cfg, fs).expect("valid layout")
}

/// ProgramData\Vendor redirected, with a cache exclusion ahead of it, plus
/// everything under the package's `data` folder.
pub const VENDOR_RULES: &str = r#"{
  "redirectedPaths": {
    "packageRelative": [ { "base": "data", "patterns": [".*"] } ],
    "knownFolders": [
      { "id": "ProgramData",
        "relativePaths": [
          { "base": "Vendor",
            "patterns": [ { "pattern": "cache", "isExclusion": true }, ".*" ] } ] }
    ]
  }
}"#;
