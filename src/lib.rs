//! Core library for `vfs_redirect`.
//!
//! Path virtualization and write redirection for applications running from
//! a read-only package. Given any path an application asks for, the
//! resolver decides whether it should be served from a per-user writable
//! store instead, and directory enumeration merges every physical location
//! of a logical directory into one de-duplicated listing.
//!
//! Layout:
//! - `paths`: canonical path strings and the normalizer.
//! - `vfs`: known folders and the package VFS mapping table.
//! - `config`: package layout and the JSON redirection rules.
//! - `redirect`: spec table, decision engine, target calculator, reverse
//!   redirector, re-entrancy guard, read-only access filtering.
//! - `resolver`: `PathRedirector`, the entry point for path primitives.
//! - `find`: merged enumeration and the find-handle table.
//! - `platform`: the filesystem primitives the resolver consumes.
//! - `runtime`: once-per-process attach.

pub mod cli;
pub mod config;
pub mod errors;
pub mod find;
pub mod output;
pub mod paths;
pub mod platform;
pub mod redirect;
pub mod resolver;
pub mod runtime;
pub mod vfs;

pub use config::{
    LogLevel, MissingInPackagePolicy, PackageLayout, RedirectionConfig, default_config_path,
    default_log_path, load_or_default, parse_redirection_config, path_has_symlink_ancestor,
};
pub use errors::{FindError, RedirectError};
pub use find::{CandidateSet, EnumerationCursor, FindHandle, FindTable, MergedEntry, Phase};
pub use paths::{NormalizedPath, PathKind, normalize, normalize_with_cwd};
pub use platform::{FileSystem, FindData, HostFs};
pub use redirect::{RedirectDecision, RedirectFlags, ReentrancyGuard, restrict_access};
pub use resolver::PathRedirector;
pub use vfs::{KnownFolderId, KnownFolders, VfsFolderMapping, VfsMappingTable};
