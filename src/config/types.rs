//! Core configuration types.
//! - LogLevel represents verbosity with simple parsing helpers.
//! - PackageLayout carries the package identity and folder anchors the
//!   resolver translates against.
//! - MissingInPackagePolicy decides what happens when a rule matches a path
//!   the package never shipped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::paths;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// What to do when a non-exclusion rule matches but neither the file nor
/// its variable folder exists in the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissingInPackagePolicy {
    /// Redirect only when the caller passed a path that was not fully
    /// qualified; absolute paths fall through to the real location.
    #[default]
    RelativeOnly,
    /// Always redirect.
    Always,
    /// Never redirect.
    Never,
}

impl MissingInPackagePolicy {
    pub fn allows(self, requested_relative: bool) -> bool {
        match self {
            MissingInPackagePolicy::RelativeOnly => requested_relative,
            MissingInPackagePolicy::Always => true,
            MissingInPackagePolicy::Never => false,
        }
    }
}

/// Package identity plus the folders the writable stores hang off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    /// Read-only installation root, e.g.
    /// `C:\Program Files\WindowsApps\Contoso.App_1.0.0.0_x64__8wekyb3d8bbwe`.
    pub package_root: String,
    /// Version-independent identity, e.g. `Contoso.App_8wekyb3d8bbwe`.
    pub family_name: String,
    /// The user's LocalAppData folder.
    pub local_app_data: String,
    /// Directory relative inputs resolve against; `None` asks the
    /// filesystem primitive layer.
    pub current_dir: Option<String>,
}

impl PackageLayout {
    pub fn new(
        package_root: impl Into<String>,
        family_name: impl Into<String>,
        local_app_data: impl Into<String>,
    ) -> Self {
        Self {
            package_root: paths::trim_trailing_sep(&package_root.into()).to_string(),
            family_name: family_name.into(),
            local_app_data: paths::trim_trailing_sep(&local_app_data.into()).to_string(),
            current_dir: None,
        }
    }

    pub fn with_current_dir(mut self, cwd: impl Into<String>) -> Self {
        self.current_dir = Some(cwd.into());
        self
    }

    /// `<LocalAppData>\Packages\<family>\LocalCache\Local`
    fn local_cache(&self) -> String {
        let packages = paths::join(&self.local_app_data, "Packages");
        let family = paths::join(&packages, &self.family_name);
        paths::join(&family, r"LocalCache\Local")
    }

    /// Default writable store for native and VFS paths.
    pub fn redirect_root(&self) -> String {
        paths::join(&self.local_cache(), "VFS")
    }

    /// Writable mirror of the package tree itself. Keyed by family name so
    /// in-place upgrades keep earlier writes.
    pub fn writable_package_root(&self) -> String {
        paths::join(&self.local_cache(), r"Microsoft\WritablePackageRoot")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_roots_hang_off_family_name() {
        let l = PackageLayout::new(
            r"C:\Program Files\WindowsApps\Contoso.App_1.2.0.0_x64__abc\",
            "Contoso.App_abc",
            r"C:\Users\me\AppData\Local",
        );
        assert_eq!(l.package_root, r"C:\Program Files\WindowsApps\Contoso.App_1.2.0.0_x64__abc");
        assert_eq!(
            l.redirect_root(),
            r"C:\Users\me\AppData\Local\Packages\Contoso.App_abc\LocalCache\Local\VFS"
        );
        assert_eq!(
            l.writable_package_root(),
            r"C:\Users\me\AppData\Local\Packages\Contoso.App_abc\LocalCache\Local\Microsoft\WritablePackageRoot"
        );
    }

    #[test]
    fn policy_allows() {
        assert!(MissingInPackagePolicy::RelativeOnly.allows(true));
        assert!(!MissingInPackagePolicy::RelativeOnly.allows(false));
        assert!(MissingInPackagePolicy::Always.allows(false));
        assert!(!MissingInPackagePolicy::Never.allows(true));
    }

    #[test]
    fn log_level_parse() {
        assert_eq!(LogLevel::parse("TRACE"), Some(LogLevel::Debug));
        assert_eq!("quiet".parse::<LogLevel>().unwrap(), LogLevel::Quiet);
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
