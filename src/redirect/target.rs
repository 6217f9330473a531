//! Redirection Target Calculator.
//!
//! Builds the store path for a positive decision and, when asked, creates
//! its parent chain and seeds it from an existing copy.
//!
//! Layout:
//!   package-only path  -> <writable package root>\<package-relative rest>
//!   native / VFS path  -> <store>\<drive>$\<native rest>
//!
//! Notes:
//! - "already exists" from directory creation or copy is a benign race.
//! - A failed copy is logged and the target is still returned; the caller
//!   can create the file there itself.

use anyhow::Result;
use std::io;
use tracing::{debug, trace, warn};

use super::{Matched, RedirectContext, RedirectFlags};
use crate::errors::is_already_exists;
use crate::paths::{self, encode_drive, split_last};
use crate::platform::io_error_with_help;

impl RedirectContext {
    /// Store path for a matched request. Package-only paths ignore any
    /// spec override.
    pub fn target_for(&self, m: &Matched) -> Option<String> {
        let logical = &m.logical;
        if let Some(rel) = self.table.package_relative(&logical.virtualized)
            && (self.is_package_only(&logical.virtualized) || logical.native.is_none())
        {
            return Some(paths::join(&self.writable_root, rel));
        }
        let native = logical.native.as_deref()?;
        let base = m.target_base.as_deref().unwrap_or(&self.redirect_root);
        let encoded = encode_drive(native)?;
        Some(paths::join(base, &encoded))
    }

    /// Apply the flag-driven side effects to `target`.
    pub fn materialize(&self, m: &Matched, target: &str, flags: RedirectFlags) -> Result<()> {
        if flags.intersects(RedirectFlags::ENSURE_DIRECTORY_STRUCTURE | RedirectFlags::COPY_ON_FIRST_ACCESS) {
            let (parent, _) = split_last(target);
            self.ensure_directory_chain(parent)?;
        }
        if flags.contains(RedirectFlags::COPY_ON_FIRST_ACCESS) && !self.fs.exists(target) {
            self.copy_on_first_access(m, target);
        }
        Ok(())
    }

    /// Create `dir` and any missing ancestors, top-down.
    pub(crate) fn ensure_directory_chain(&self, dir: &str) -> Result<()> {
        let mut missing = Vec::new();
        let mut cur = paths::trim_trailing_sep(dir);
        while !cur.is_empty() && !self.fs.exists(cur) {
            missing.push(cur);
            let (parent, _) = split_last(cur);
            if parent.is_empty() || parent == cur {
                break;
            }
            cur = parent;
        }
        for d in missing.into_iter().rev() {
            match self.fs.create_directory(d, None) {
                Ok(()) => trace!(path = %d, "Created store directory"),
                Err(e) if is_already_exists(&e) => {}
                Err(e) => return Err(io_error_with_help("create store directory", d)(e)),
            }
        }
        Ok(())
    }

    /// Seed a missing target. The package copy is preferred over the native
    /// one; nothing to copy from is not an error.
    fn copy_on_first_access(&self, m: &Matched, target: &str) {
        let logical = &m.logical;
        let source = [Some(logical.virtualized.as_str()), logical.native.as_deref()]
            .into_iter()
            .flatten()
            .find(|p| self.fs.exists(p));
        let Some(source) = source else {
            trace!(target = %target, "No existing copy to seed from");
            return;
        };

        let result = if self.fs.is_directory(source) {
            self.fs.create_directory(target, Some(source))
        } else {
            self.fs.copy_file(source, target)
        };
        match result {
            Ok(()) => debug!(source = %source, target = %target, "Copied on first access"),
            Err(e) if is_already_exists(&e) || e.kind() == io::ErrorKind::NotFound => {
                debug!(source = %source, target = %target, error = %e, "Copy on first access raced; continuing");
            }
            Err(e) => {
                let e = io_error_with_help("copy on first access", target)(e);
                warn!(source = %source, error = %e, "Copy on first access failed; target left unseeded");
            }
        }
    }
}
