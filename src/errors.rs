//! Typed error definitions for vfs_redirect.
//! Provides a small set of well-known failure modes for better logs and tests.
//!
//! Two families live here:
//! - `RedirectError`: configuration/attach failures surfaced to the embedder.
//! - `FindError`: enumeration outcomes that mirror the Win32 find contract
//!   bit-for-bit, since callers branch on "not found" vs "no more files".

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("Invalid redirection pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Unknown known-folder id: {0}")]
    UnknownKnownFolder(String),

    #[error("Known folder {0} has no native location on this system")]
    KnownFolderUnavailable(String),

    #[error("Redirection base is not a usable absolute path: {0}")]
    InvalidBase(String),

    #[error("Malformed redirection config: {0}")]
    MalformedConfig(String),

    #[error("Package layout is incomplete: {0}")]
    IncompleteLayout(&'static str),

    #[error("A path redirector is already attached to this process")]
    AlreadyAttached,
}

impl RedirectError {
    /// Stable numeric code for logs and scripted callers.
    pub fn code(&self) -> u32 {
        match self {
            RedirectError::InvalidPattern { .. } => 10,
            RedirectError::UnknownKnownFolder(_) => 11,
            RedirectError::KnownFolderUnavailable(_) => 12,
            RedirectError::InvalidBase(_) => 13,
            RedirectError::MalformedConfig(_) => 14,
            RedirectError::IncompleteLayout(_) => 15,
            RedirectError::AlreadyAttached => 20,
        }
    }
}

pub const ERROR_FILE_NOT_FOUND: u32 = 2;
pub const ERROR_PATH_NOT_FOUND: u32 = 3;
pub const ERROR_ACCESS_DENIED: u32 = 5;
pub const ERROR_INVALID_HANDLE: u32 = 6;
pub const ERROR_NO_MORE_FILES: u32 = 18;
pub const ERROR_FILE_EXISTS: u32 = 80;
pub const ERROR_ALREADY_EXISTS: u32 = 183;

/// Outcome codes of the find-first/find-next/find-close contract.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FindError {
    /// The directory exists but nothing in it matches (ERROR_FILE_NOT_FOUND).
    #[error("no matching file found")]
    FileNotFound,
    /// The directory itself does not exist (ERROR_PATH_NOT_FOUND).
    #[error("path not found")]
    PathNotFound,
    /// The enumeration is exhausted (ERROR_NO_MORE_FILES).
    #[error("no more files")]
    NoMoreFiles,
    /// Unknown, stale or already-closed find handle (ERROR_INVALID_HANDLE).
    #[error("invalid find handle")]
    InvalidHandle,
    #[error("access denied")]
    AccessDenied,
    /// Any other platform code, passed through untouched.
    #[error("find failed with os code {0}")]
    Os(u32),
}

impl FindError {
    /// The Win32 error code this outcome corresponds to.
    pub fn win32_code(&self) -> u32 {
        match self {
            FindError::FileNotFound => ERROR_FILE_NOT_FOUND,
            FindError::PathNotFound => ERROR_PATH_NOT_FOUND,
            FindError::NoMoreFiles => ERROR_NO_MORE_FILES,
            FindError::InvalidHandle => ERROR_INVALID_HANDLE,
            FindError::AccessDenied => ERROR_ACCESS_DENIED,
            FindError::Os(code) => *code,
        }
    }

    pub fn from_win32(code: u32) -> Self {
        match code {
            ERROR_FILE_NOT_FOUND => FindError::FileNotFound,
            ERROR_PATH_NOT_FOUND => FindError::PathNotFound,
            ERROR_NO_MORE_FILES => FindError::NoMoreFiles,
            ERROR_INVALID_HANDLE => FindError::InvalidHandle,
            ERROR_ACCESS_DENIED => FindError::AccessDenied,
            other => FindError::Os(other),
        }
    }

    /// Map a std I/O failure from opening a directory listing.
    pub fn from_io(e: &io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => FindError::PathNotFound,
            io::ErrorKind::NotADirectory => FindError::PathNotFound,
            io::ErrorKind::PermissionDenied => FindError::AccessDenied,
            _ => e
                .raw_os_error()
                .map(|c| FindError::Os(c as u32))
                .unwrap_or(FindError::Os(ERROR_ACCESS_DENIED)),
        }
    }
}

/// True for the benign "someone else already created it" outcomes that
/// concurrent directory creation and copy-on-first-access must tolerate.
pub fn is_already_exists(e: &io::Error) -> bool {
    if e.kind() == io::ErrorKind::AlreadyExists {
        return true;
    }
    matches!(
        e.raw_os_error().map(|c| c as u32),
        Some(ERROR_FILE_EXISTS) | Some(ERROR_ALREADY_EXISTS)
    ) && cfg!(windows)
}
