//! Redirection core: spec table, decision engine, target calculator and
//! reverse-redirector, sharing one immutable `RedirectContext`.
//!
//! Pipeline for one path: normalize -> `LogicalPath` (requested, virtualized
//! and native spellings) -> `decide` -> `target_for` -> `materialize`.

pub mod access;
mod decision;
pub mod guard;
mod reverse;
pub mod spec;
mod target;

pub use access::restrict_access;
pub use decision::Matched;
pub use guard::ReentrancyGuard;
pub use spec::{RedirectionSpec, SpecAnchor, SpecTable};

use bitflags::bitflags;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::config::{MissingInPackagePolicy, PackageLayout, RedirectionConfig};
use crate::errors::RedirectError;
use crate::paths::{self, NormalizedPath, is_path_under};
use crate::platform::FileSystem;
use crate::vfs::{KnownFolders, VfsMappingTable};

bitflags! {
    /// What the calling primitive needs from a redirect.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RedirectFlags: u32 {
        /// Create the target's parent directories.
        const ENSURE_DIRECTORY_STRUCTURE = 0x1;
        /// Seed the target from the package or native copy if it is missing.
        const COPY_ON_FIRST_ACCESS = 0x2;
        /// Only redirect when the target exists (after any copy).
        const CHECK_FILE_PRESENCE = 0x4;
    }
}

/// Outcome of one redirect query. A decision that does not redirect never
/// carries a path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RedirectDecision {
    should_redirect: bool,
    redirect_path: Option<String>,
    read_only: bool,
}

impl RedirectDecision {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn redirect(path: impl Into<String>, read_only: bool) -> Self {
        Self {
            should_redirect: true,
            redirect_path: Some(path.into()),
            read_only,
        }
    }

    pub fn should_redirect(&self) -> bool {
        self.should_redirect
    }

    pub fn redirect_path(&self) -> Option<&str> {
        self.redirect_path.as_deref()
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// The path the caller should actually open.
    pub fn effective_path<'a>(&'a self, requested: &'a str) -> &'a str {
        self.redirect_path.as_deref().unwrap_or(requested)
    }
}

impl fmt::Display for RedirectDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.redirect_path {
            Some(p) if self.read_only => write!(f, "redirect -> {p} (read-only)"),
            Some(p) => write!(f, "redirect -> {p}"),
            None => f.write_str("no redirect"),
        }
    }
}

/// The three spellings of one request that the engine reasons about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalPath {
    /// Canonical drive-absolute form of the request.
    pub requested: String,
    /// Package spelling: the request itself when it is inside the package,
    /// otherwise its VFS equivalent.
    pub virtualized: String,
    /// Native spelling: the request itself when outside the package, the
    /// de-virtualized form for VFS paths, `None` for package-only paths.
    pub native: Option<String>,
}

/// Immutable state shared by every redirect query.
pub struct RedirectContext {
    pub(crate) layout: PackageLayout,
    pub(crate) table: VfsMappingTable,
    pub(crate) specs: SpecTable,
    pub(crate) policy: MissingInPackagePolicy,
    pub(crate) fs: Arc<dyn FileSystem>,
    pub(crate) redirect_root: String,
    pub(crate) writable_root: String,
}

impl fmt::Debug for RedirectContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedirectContext")
            .field("package_root", &self.layout.package_root)
            .field("redirect_root", &self.redirect_root)
            .field("writable_root", &self.writable_root)
            .field("specs", &self.specs.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl RedirectContext {
    pub fn new(
        layout: PackageLayout,
        folders: &KnownFolders,
        config: &RedirectionConfig,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self, RedirectError> {
        layout.validate()?;
        let table = VfsMappingTable::new(&layout.package_root, folders);
        let specs = SpecTable::from_config(config, &table, folders)?;
        Ok(Self::from_parts(layout, table, specs, config.missing_in_package, fs))
    }

    pub fn from_parts(
        layout: PackageLayout,
        table: VfsMappingTable,
        specs: SpecTable,
        policy: MissingInPackagePolicy,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let redirect_root = layout.redirect_root();
        let writable_root = layout.writable_package_root();
        Self {
            layout,
            table,
            specs,
            policy,
            fs,
            redirect_root,
            writable_root,
        }
    }

    /// Every writable store a redirect can land in.
    pub fn stores(&self) -> Vec<&str> {
        let mut out = vec![self.redirect_root.as_str(), self.writable_root.as_str()];
        out.extend(self.specs.target_overrides());
        out
    }

    /// True when `path` already lives in a writable store.
    pub fn is_in_store(&self, path: &str) -> bool {
        self.stores().into_iter().any(|s| is_path_under(path, s))
    }

    /// Build the logical spellings of a resolvable request.
    pub fn logical_path(&self, np: &NormalizedPath) -> Option<LogicalPath> {
        if !np.is_resolvable() {
            return None;
        }
        let requested = np.drive_absolute.clone();
        if self.table.is_in_package(&requested) {
            let native = self.table.devirtualize(&requested);
            return Some(LogicalPath {
                virtualized: requested.clone(),
                requested,
                native,
            });
        }
        let virtualized = self.table.virtualize(&requested)?;
        Some(LogicalPath {
            native: Some(requested.clone()),
            requested,
            virtualized,
        })
    }

    /// True for package paths outside the VFS folder.
    pub(crate) fn is_package_only(&self, path: &str) -> bool {
        self.table.is_in_package(path) && self.table.vfs_relative(path).is_none()
    }

    pub fn layout(&self) -> &PackageLayout {
        &self.layout
    }

    pub fn mapping_table(&self) -> &VfsMappingTable {
        &self.table
    }

    pub fn spec_table(&self) -> &SpecTable {
        &self.specs
    }

    pub fn filesystem(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn redirect_root(&self) -> &str {
        &self.redirect_root
    }

    pub fn writable_package_root(&self) -> &str {
        &self.writable_root
    }

    pub(crate) fn package_root(&self) -> &str {
        self.table.package_root()
    }

    pub(crate) fn is_package_root(&self, path: &str) -> bool {
        paths::eq_ignore_case(paths::trim_trailing_sep(path), self.package_root())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::paths::normalize;

    #[test]
    fn decision_without_redirect_has_no_path() {
        let d = RedirectDecision::none();
        assert!(!d.should_redirect());
        assert_eq!(d.redirect_path(), None);
        assert_eq!(d.effective_path(r"C:\x"), r"C:\x");
        assert_eq!(d.to_string(), "no redirect");
    }

    #[test]
    fn logical_path_spellings() {
        let (_td, ctx) = context("{}");
        let lp = ctx.logical_path(&normalize(r"C:\ProgramData\Vendor\a.ini")).unwrap();
        assert_eq!(lp.virtualized, format!(r"{PKG}\VFS\Common AppData\Vendor\a.ini"));
        assert_eq!(lp.native.as_deref(), Some(r"C:\ProgramData\Vendor\a.ini"));

        let lp = ctx
            .logical_path(&normalize(&format!(r"{PKG}\VFS\Common AppData\Vendor\a.ini")))
            .unwrap();
        assert_eq!(lp.native.as_deref(), Some(r"C:\ProgramData\Vendor\a.ini"));

        let lp = ctx.logical_path(&normalize(&format!(r"{PKG}\app.exe"))).unwrap();
        assert_eq!(lp.native, None);
        assert!(ctx.is_package_only(&lp.requested));

        assert!(ctx.logical_path(&normalize(r"\\srv\share\x")).is_none());
    }

    #[test]
    fn stores_cover_both_roots() {
        let (_td, ctx) = context("{}");
        assert_eq!(ctx.redirect_root(), STORE);
        assert_eq!(ctx.writable_package_root(), WRITABLE);
        assert!(ctx.is_in_store(&format!(r"{STORE}\C$\x")));
        assert!(ctx.is_in_store(&format!(r"{WRITABLE}\x")));
        assert!(!ctx.is_in_store(r"C:\Users\me\AppData\Local\Other"));
    }
}
