//! PathRedirector: the resolver facade handed to the interception layer.
//!
//! One entry point per logical primitive. `redirect` always produces an
//! answer: errors and panics inside the engine are logged at this boundary
//! and turned into "no redirect", and nested calls on a thread that is
//! already resolving pass straight through.

use anyhow::{Context, Result};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::config::{PackageLayout, RedirectionConfig};
use crate::errors::RedirectError;
use crate::paths::{NormalizedPath, normalize_with_cwd};
use crate::platform::FileSystem;
use crate::redirect::{RedirectContext, RedirectDecision, RedirectFlags, ReentrancyGuard};
use crate::vfs::KnownFolders;

/// Process-wide resolver. Immutable after construction; share it freely.
pub struct PathRedirector {
    ctx: RedirectContext,
}

impl fmt::Debug for PathRedirector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathRedirector").field("ctx", &self.ctx).finish()
    }
}

impl PathRedirector {
    /// Validate the layout, build the mapping table and compile the rules.
    pub fn new(
        layout: PackageLayout,
        folders: &KnownFolders,
        config: &RedirectionConfig,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self, RedirectError> {
        let ctx = RedirectContext::new(layout, folders, config, fs)?;
        debug!(
            package_root = %ctx.layout().package_root,
            store = %ctx.redirect_root(),
            writable = %ctx.writable_package_root(),
            specs = ctx.spec_table().len(),
            mappings = ctx.mapping_table().mappings().len(),
            "Path redirector ready"
        );
        Ok(Self { ctx })
    }

    pub fn from_context(ctx: RedirectContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &RedirectContext {
        &self.ctx
    }

    /// Normalize against the layout's current directory, else the
    /// primitive layer's.
    pub fn normalize(&self, raw: &str) -> NormalizedPath {
        let cwd = self
            .ctx
            .layout()
            .current_dir
            .clone()
            .or_else(|| self.ctx.filesystem().current_dir());
        normalize_with_cwd(raw, cwd.as_deref())
    }

    /// Should `raw` be redirected, and where. Never fails.
    pub fn redirect(&self, raw: &str, flags: RedirectFlags) -> RedirectDecision {
        let Some(_guard) = ReentrancyGuard::try_acquire() else {
            trace!(path = %raw, "Nested resolver call; passing through");
            return RedirectDecision::none();
        };
        match panic::catch_unwind(AssertUnwindSafe(|| self.resolve(raw, flags))) {
            Ok(Ok(decision)) => decision,
            Ok(Err(e)) => {
                warn!(path = %raw, error = %format!("{e:#}"), "Redirect failed; using the requested path");
                RedirectDecision::none()
            }
            Err(_) => {
                warn!(path = %raw, "Redirect panicked; using the requested path");
                RedirectDecision::none()
            }
        }
    }

    fn resolve(&self, raw: &str, flags: RedirectFlags) -> Result<RedirectDecision> {
        let np = self.normalize(raw);
        let Some(matched) = self.ctx.decide(&np) else {
            return Ok(RedirectDecision::none());
        };
        let Some(target) = self.ctx.target_for(&matched) else {
            return Ok(RedirectDecision::none());
        };
        self.ctx
            .materialize(&matched, &target, flags)
            .with_context(|| format!("prepare redirect target '{target}'"))?;

        if flags.contains(RedirectFlags::CHECK_FILE_PRESENCE) && !self.ctx.filesystem().exists(&target) {
            trace!(path = %raw, target = %target, "Target absent; not redirecting");
            return Ok(RedirectDecision::none());
        }
        debug!(path = %raw, target = %target, read_only = matched.read_only, "Redirecting");
        Ok(RedirectDecision::redirect(target, matched.read_only))
    }

    /// Package VFS spelling of a native path.
    pub fn virtualize(&self, raw: &str) -> Option<String> {
        let np = self.normalize(raw);
        if !np.is_resolvable() {
            return None;
        }
        self.ctx.mapping_table().virtualize(&np.drive_absolute)
    }

    /// Native spelling of a package VFS path.
    pub fn devirtualize(&self, raw: &str) -> Option<String> {
        let np = self.normalize(raw);
        if !np.is_resolvable() {
            return None;
        }
        self.ctx.mapping_table().devirtualize(&np.drive_absolute)
    }

    /// The package path a store path stands in for.
    pub fn reverse(&self, raw: &str) -> Option<String> {
        let np = self.normalize(raw);
        if !np.is_resolvable() {
            return None;
        }
        self.ctx.reverse(&np.drive_absolute)
    }

    pub fn filesystem(&self) -> &Arc<dyn FileSystem> {
        self.ctx.filesystem()
    }
}
