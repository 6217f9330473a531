//! I/O helper utilities.
//!
//! Small adapters that enrich io::Error with the operation, the canonical path
//! and an actionable hint, usable with map_err in both io::Result and
//! anyhow::Result code paths.
//!
//! Usage:
//!   // in functions returning anyhow::Result<_>
//!   fs.copy_file(from, to).map_err(io_error_with_help("copy to store", to))?;
//!
//!   // in functions returning io::Result<_>
//!   fs::create_dir(&host).map_err(io_error_with_help_io("create directory", path))?;

use anyhow::anyhow;
use std::io;

#[cfg(windows)]
use crate::errors::{
    ERROR_ACCESS_DENIED, ERROR_ALREADY_EXISTS, ERROR_FILE_EXISTS, ERROR_FILE_NOT_FOUND,
    ERROR_PATH_NOT_FOUND,
};

/// Format a message with op/path plus a hint derived from the error.
fn build_message(op: &str, path: &str, e: &io::Error) -> String {
    let mut msg = format!("{op} '{path}': {e}");

    #[cfg(windows)]
    if let Some(code) = e.raw_os_error() {
        let hint = match code as u32 {
            ERROR_ACCESS_DENIED => Some("access denied; check the package store ACLs."),
            ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND => Some("path not found; verify it exists."),
            ERROR_FILE_EXISTS | ERROR_ALREADY_EXISTS => {
                Some("already exists; the store copy was made earlier.")
            }
            32 => Some("sharing violation; file is in use."),
            112 => Some("insufficient disk space."),
            206 => Some("filename or path too long (MAX_PATH exceeded)."),
            _ => None,
        };
        if let Some(hint) = hint {
            msg.push_str(" (");
            msg.push_str(hint);
            msg.push(')');
        }
        msg.push_str(&format!(" [os code: {code}]"));
        return msg;
    }

    let hint = match e.kind() {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions."),
        io::ErrorKind::NotFound => Some("path not found; verify it exists."),
        io::ErrorKind::AlreadyExists => Some("already exists; the store copy was made earlier."),
        io::ErrorKind::ReadOnlyFilesystem => Some("read-only filesystem; cannot write here."),
        io::ErrorKind::StorageFull => Some("insufficient space on device."),
        _ => None,
    };
    if let Some(hint) = hint {
        msg.push_str(" (");
        msg.push_str(hint);
        msg.push(')');
    }
    if let Some(code) = e.raw_os_error() {
        msg.push_str(&format!(" [os code: {code}]"));
    }
    msg
}

/// Adapter for anyhow::Result code.
pub fn io_error_with_help<'a>(op: &'a str, path: &'a str) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(build_message(op, path, &e))
}

/// Adapter for io::Result code. Preserves the original ErrorKind.
pub fn io_error_with_help_io<'a>(op: &'a str, path: &'a str) -> impl FnOnce(io::Error) -> io::Error + 'a {
    move |e: io::Error| io::Error::new(e.kind(), build_message(op, path, &e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_operation_path_and_hint() {
        let e = io::Error::new(io::ErrorKind::NotFound, "gone");
        let wrapped = io_error_with_help_io("copy file", r"C:\a\b.txt")(e);
        assert_eq!(wrapped.kind(), io::ErrorKind::NotFound);
        let text = wrapped.to_string();
        assert!(text.contains("copy file"));
        assert!(text.contains(r"C:\a\b.txt"));
        assert!(text.contains("path not found"));
    }

    #[test]
    fn anyhow_adapter_keeps_message() {
        let e = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let err = io_error_with_help("create directory", r"C:\x")(e);
        assert!(err.to_string().contains("permission denied"));
    }
}
