//! Package layout validation.
//! Verifies the anchors are drive-absolute and that the writable stores do
//! not overlap the read-only package tree.

use tracing::{debug, error};

use super::types::PackageLayout;
use crate::errors::RedirectError;
use crate::paths::{self, is_path_under};

impl PackageLayout {
    /// Validate identity and anchor paths before the resolver is built.
    pub fn validate(&self) -> Result<(), RedirectError> {
        ensure_drive_absolute(&self.package_root, "package_root")?;
        ensure_drive_absolute(&self.local_app_data, "local_app_data")?;
        if let Some(cwd) = &self.current_dir {
            ensure_drive_absolute(cwd, "current_dir")?;
        }
        if self.family_name.trim().is_empty() || self.family_name.contains(paths::is_sep) {
            error!(family = %self.family_name, "Package family name is empty or contains a separator");
            return Err(RedirectError::IncompleteLayout("family_name"));
        }

        let store = self.redirect_root();
        let writable = self.writable_package_root();
        if is_path_under(&store, &self.package_root) || is_path_under(&writable, &self.package_root) {
            error!(
                package_root = %self.package_root,
                store = %store,
                "Writable stores must not live inside the read-only package"
            );
            return Err(RedirectError::InvalidBase(store));
        }
        if is_path_under(&self.package_root, &store) {
            return Err(RedirectError::InvalidBase(self.package_root.clone()));
        }

        debug!(
            package_root = %self.package_root,
            family = %self.family_name,
            store = %store,
            writable = %writable,
            "Package layout validated"
        );
        Ok(())
    }
}

fn ensure_drive_absolute(path: &str, name: &'static str) -> Result<(), RedirectError> {
    let ok = paths::drive_letter(path).is_some() && path[2..].starts_with(paths::SEP);
    if !ok {
        error!("{name} is not a drive-absolute path: {path}");
        return Err(RedirectError::IncompleteLayout(name));
    }
    Ok(())
}
