//! Redirect Decision Engine.
//!
//! Decides whether a request goes to a writable store. Matching runs on the
//! virtualized spelling; the first spec wins and exclusions short-circuit.

use tracing::{debug, trace};

use super::{LogicalPath, RedirectContext};
use crate::paths::{NormalizedPath, PathKind};

/// A positive decision, before the target path is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    pub logical: LogicalPath,
    /// Index of the spec that matched.
    pub spec: usize,
    pub target_base: Option<String>,
    pub read_only: bool,
}

impl RedirectContext {
    /// Run the decision engine. `None` means "use the path as requested".
    pub fn decide(&self, np: &NormalizedPath) -> Option<Matched> {
        if matches!(np.kind, PathKind::Unknown | PathKind::UncAbsolute) {
            trace!(path = %np.original, kind = %np.kind, "Not a redirectable path kind");
            return None;
        }
        let logical = self.logical_path(np)?;

        if self.is_in_store(&logical.requested) {
            trace!(path = %logical.requested, "Already in a writable store");
            return None;
        }
        if self.is_package_root(&logical.requested) {
            trace!(path = %logical.requested, "Package root is never redirected");
            return None;
        }

        let (index, spec) = self
            .specs
            .specs()
            .iter()
            .enumerate()
            .find(|(_, s)| s.matches(&logical.virtualized))?;
        if spec.is_exclusion {
            debug!(
                path = %logical.requested,
                base = %spec.base,
                pattern = %spec.pattern,
                "Excluded from redirection"
            );
            return None;
        }

        if !self.is_eligible(np, &logical) {
            debug!(
                path = %logical.requested,
                virtualized = %logical.virtualized,
                policy = ?self.policy,
                "Not present in the package; using the real location"
            );
            return None;
        }

        trace!(
            path = %logical.requested,
            anchor = %spec.anchor,
            pattern = %spec.pattern,
            read_only = spec.is_read_only,
            "Matched redirection spec"
        );
        Some(Matched {
            target_base: spec.target_base.clone(),
            read_only: spec.is_read_only,
            spec: index,
            logical,
        })
    }

    /// Package-only paths are always eligible (the package is read-only
    /// media). Otherwise the file or its variable folder must exist in the
    /// package, or the missing-in-package policy must allow it.
    fn is_eligible(&self, np: &NormalizedPath, logical: &LogicalPath) -> bool {
        if self.is_package_only(&logical.virtualized) {
            return true;
        }
        if self.fs.exists(&logical.virtualized) {
            return true;
        }
        if let Some(folder) = self.table.variable_folder(&logical.virtualized)
            && self.fs.is_directory(&folder)
        {
            return true;
        }
        self.policy.allows(np.kind.is_relative())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::paths::{normalize, normalize_with_cwd};

    const RULES: &str = r#"{ "redirectedPaths": {
        "packageRelative": [ { "base": "", "patterns": [ { "pattern": "config\\\\locked\\.ini", "isExclusion": true }, "config\\\\.*", "logs" ] } ],
        "knownFolders": [ { "id": "ProgramData", "relativePaths": [
            { "base": "Vendor", "patterns": [ { "pattern": "cache", "isExclusion": true }, ".*" ], "isReadOnly": true } ] } ] } }"#;

    #[test]
    fn package_root_is_never_redirected() {
        let (_td, ctx) = context(r#"{ "redirectedPaths": { "packageRelative": [ { "base": "", "patterns": [".*"] } ] } }"#);
        assert!(ctx.decide(&normalize(PKG)).is_none());
        assert!(ctx.decide(&normalize(&format!(r"{PKG}\"))).is_none());
        assert!(ctx.decide(&normalize(&format!(r"{PKG}\a.txt"))).is_some());
    }

    #[test]
    fn opaque_and_unc_inputs_are_skipped() {
        let (_td, ctx) = context(RULES);
        assert!(ctx.decide(&normalize(r"::{20D04FE0-3AEA-1069-A2D8-08002B30309D}")).is_none());
        assert!(ctx.decide(&normalize("blob:https://x/y")).is_none());
        assert!(ctx.decide(&normalize(r"\\srv\share\ProgramData\Vendor\a.ini")).is_none());
    }

    #[test]
    fn exclusion_wins_over_later_inclusion() {
        let (td, ctx) = context(RULES);
        touch(&td, &format!(r"{PKG}\config\locked.ini"), "x");
        touch(&td, &format!(r"{PKG}\config\open.ini"), "x");
        assert!(ctx.decide(&normalize(&format!(r"{PKG}\config\locked.ini"))).is_none());
        assert!(ctx.decide(&normalize(&format!(r"{PKG}\config\open.ini"))).is_some());
    }

    #[test]
    fn package_only_paths_are_eligible_without_existing() {
        let (_td, ctx) = context(RULES);
        let m = ctx.decide(&normalize(&format!(r"{PKG}\logs\today.log"))).unwrap();
        assert!(!m.read_only);
        assert_eq!(m.logical.native, None);
    }

    #[test]
    fn native_and_vfs_spellings_match_identically() {
        let (td, ctx) = context(RULES);
        mkdir(&td, &format!(r"{PKG}\VFS\Common AppData"));
        let native = ctx.decide(&normalize(r"C:\ProgramData\Vendor\settings.ini")).unwrap();
        let vfs = ctx
            .decide(&normalize(&format!(r"{PKG}\VFS\Common AppData\Vendor\settings.ini")))
            .unwrap();
        assert_eq!(native.spec, vfs.spec);
        assert!(native.read_only);
        assert!(ctx.decide(&normalize(r"C:\ProgramData\Vendor\cache\blob.bin")).is_none());
    }

    #[test]
    fn missing_variable_folder_defers_to_real_location_for_absolute_requests() {
        let (_td, ctx) = context(RULES);
        assert!(ctx.decide(&normalize(r"C:\ProgramData\Vendor\settings.ini")).is_none());
        let relative = normalize_with_cwd(r"Vendor\settings.ini", Some(r"C:\ProgramData"));
        assert!(ctx.decide(&relative).is_some());
    }

    #[test]
    fn store_paths_are_not_redirected_again() {
        let (td, ctx) = context(RULES);
        mkdir(&td, &format!(r"{PKG}\VFS\Common AppData"));
        assert!(ctx.decide(&normalize(&format!(r"{STORE}\C$\ProgramData\Vendor\settings.ini"))).is_none());
        assert!(ctx.decide(&normalize(&format!(r"{WRITABLE}\logs\a.log"))).is_none());
    }
}
