//! Filesystem primitives consumed by the resolver.
//!
//! The resolver never touches the disk directly; it asks a `FileSystem` for
//! existence checks, copies, directory creation and find-first/find-next.
//! All inputs are canonical absolute paths (`C:\...`).
//!
//! Implementations:
//! - `HostFs`: std-backed. Either passes paths straight through (Windows) or
//!   maps them below a host directory (`C:\x` -> `<root>/C/x`), which is how
//!   non-Windows hosts and the tests run the resolver.
//! - `Win32Fs` (Windows only): the native Win32 calls via windows-sys.

mod helpers;
mod host;
#[cfg(windows)]
mod windows;

pub use helpers::{io_error_with_help, io_error_with_help_io};
pub use host::{HostFs, wildcard_matches};
#[cfg(windows)]
pub use windows::Win32Fs;

use std::io;
use std::sync::Arc;

use crate::errors::FindError;

pub const FILE_ATTRIBUTE_READONLY: u32 = 0x0000_0001;
pub const FILE_ATTRIBUTE_HIDDEN: u32 = 0x0000_0002;
pub const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x0000_0010;
pub const FILE_ATTRIBUTE_ARCHIVE: u32 = 0x0000_0020;
pub const FILE_ATTRIBUTE_NORMAL: u32 = 0x0000_0080;
pub const FILE_ATTRIBUTE_REPARSE_POINT: u32 = 0x0000_0400;

/// One enumeration result, shaped like `WIN32_FIND_DATAW`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindData {
    pub attributes: u32,
    /// FILETIME ticks (100ns since 1601-01-01 UTC).
    pub creation_time: u64,
    pub last_access_time: u64,
    pub last_write_time: u64,
    pub file_size: u64,
    pub file_name: String,
    /// 8.3 name; empty when the volume has none.
    pub alternate_file_name: String,
}

impl FindData {
    #[inline]
    pub fn is_directory(&self) -> bool {
        self.attributes & FILE_ATTRIBUTE_DIRECTORY != 0
    }

    /// `.` and `..` pseudo-entries.
    #[inline]
    pub fn is_dot_entry(&self) -> bool {
        self.file_name == "." || self.file_name == ".."
    }
}

/// An open per-directory enumeration. Dropping it closes the underlying handle.
pub trait DirectoryScan: Send {
    /// Next entry, or `FindError::NoMoreFiles` once exhausted.
    fn next_entry(&mut self) -> Result<FindData, FindError>;
}

/// The primitives the resolver needs from its environment.
pub trait FileSystem: Send + Sync {
    /// Attribute bits of `path`, or `None` if it does not exist.
    fn attributes(&self, path: &str) -> Option<u32>;

    fn exists(&self, path: &str) -> bool {
        self.attributes(path).is_some()
    }

    fn is_directory(&self, path: &str) -> bool {
        self.attributes(path)
            .is_some_and(|a| a & FILE_ATTRIBUTE_DIRECTORY != 0)
    }

    /// Create one directory. When `template` names an existing directory its
    /// attributes are carried over. Fails with `AlreadyExists` if present.
    fn create_directory(&self, path: &str, template: Option<&str>) -> io::Result<()>;

    /// Whole-file copy that refuses to overwrite (`AlreadyExists`).
    fn copy_file(&self, from: &str, to: &str) -> io::Result<()>;

    /// Begin enumerating `pattern` (`<dir>\<wildcard>`). Yields the first
    /// entry and the open scan, `FileNotFound` when the directory exists but
    /// nothing matches, `PathNotFound` when the directory does not exist.
    fn find_first(&self, pattern: &str) -> Result<(FindData, Box<dyn DirectoryScan>), FindError>;

    /// Directory relative inputs resolve against.
    fn current_dir(&self) -> Option<String>;
}

/// The natural primitive layer for this host.
pub fn native() -> Arc<dyn FileSystem> {
    #[cfg(windows)]
    {
        Arc::new(Win32Fs::new())
    }
    #[cfg(not(windows))]
    {
        Arc::new(HostFs::native())
    }
}

/// Open the log file for appending. On Unix a newly created file gets 0600;
/// an existing file keeps whatever mode an administrator gave it.
pub fn open_log_file_secure_append(path: &std::path::Path) -> io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let mut opts = std::fs::OpenOptions::new();
    opts.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    opts.open(path)
}
