//! Config module (modularized).
//! Provides configuration types, default paths, JSON rule loading, and layout validation.

pub mod json;
pub mod paths;
pub mod types;
mod validate;

pub use json::{
    CONFIG_ENV, KnownFolderEntry, PatternEntry, RedirectedPaths, RedirectionConfig,
    RelativePathEntry, load_or_default, load_redirection_config, parse_redirection_config,
    resolve_config_path,
};
pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{LogLevel, MissingInPackagePolicy, PackageLayout};

/// Environment fallbacks for the package identity used by the binary.
pub const PACKAGE_ROOT_ENV: &str = "VFS_REDIRECT_PACKAGE_ROOT";
pub const FAMILY_NAME_ENV: &str = "VFS_REDIRECT_FAMILY_NAME";
pub const LOCAL_APP_DATA_ENV: &str = "LOCALAPPDATA";
pub const LOG_LEVEL_ENV: &str = "VFS_REDIRECT_LOG_LEVEL";
