//! Process attach: the single resolver and find table the interception
//! layer talks to.
//!
//! Notes:
//! - Attach happens once per process; the state is immutable afterward.
//! - Before attach every entry point behaves as "no redirect".

use std::sync::OnceLock;
use tracing::info;

use crate::errors::{FindError, RedirectError};
use crate::find::{FindHandle, FindTable};
use crate::platform::FindData;
use crate::redirect::{RedirectDecision, RedirectFlags};
use crate::resolver::PathRedirector;

/// Everything installed at attach.
#[derive(Debug)]
pub struct Runtime {
    redirector: PathRedirector,
    finds: FindTable,
}

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Install the process-wide resolver. A second attach is refused.
pub fn attach(redirector: PathRedirector) -> Result<&'static Runtime, RedirectError> {
    let mut installed = false;
    let rt = RUNTIME.get_or_init(|| {
        installed = true;
        Runtime {
            redirector,
            finds: FindTable::new(),
        }
    });
    if !installed {
        return Err(RedirectError::AlreadyAttached);
    }
    info!(
        package_root = %rt.redirector.context().layout().package_root,
        specs = rt.redirector.context().spec_table().len(),
        "Path redirection attached"
    );
    Ok(rt)
}

/// The attached runtime, if any.
pub fn get() -> Option<&'static Runtime> {
    RUNTIME.get()
}

/// Redirect through the attached resolver; "no redirect" before attach.
pub fn redirect(raw: &str, flags: RedirectFlags) -> RedirectDecision {
    match get() {
        Some(rt) => rt.redirect(raw, flags),
        None => RedirectDecision::none(),
    }
}

impl Runtime {
    pub fn redirector(&self) -> &PathRedirector {
        &self.redirector
    }

    pub fn finds(&self) -> &FindTable {
        &self.finds
    }

    pub fn redirect(&self, raw: &str, flags: RedirectFlags) -> RedirectDecision {
        self.redirector.redirect(raw, flags)
    }

    pub fn find_first(&self, query: &str) -> Result<(FindHandle, FindData), FindError> {
        self.finds.find_first(&self.redirector, query)
    }

    pub fn find_next(&self, handle: FindHandle) -> Result<FindData, FindError> {
        self.finds.find_next(handle)
    }

    pub fn find_close(&self, handle: FindHandle) -> Result<(), FindError> {
        self.finds.find_close(handle)
    }
}
