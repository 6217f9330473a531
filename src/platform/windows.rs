//! Win32 primitive layer (windows-sys).
//!
//! Notes:
//! - Paths reach the OS exactly as the resolver produced them; callers that
//!   need long-path safety pass `\\?\`-prefixed input.
//! - `.` and `..` are reported as the OS reports them; the merger's
//!   de-duplication keeps them to one occurrence.

use std::io;
use std::mem;
use std::ptr;

use windows_sys::Win32::Foundation::{FILETIME, GetLastError, HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::Storage::FileSystem::{
    CopyFileW, CreateDirectoryExW, CreateDirectoryW, FindClose, FindFirstFileW, FindNextFileW,
    GetFileAttributesW, INVALID_FILE_ATTRIBUTES, WIN32_FIND_DATAW,
};

use super::{DirectoryScan, FileSystem, FindData};
use crate::errors::FindError;
use crate::paths::{from_wide, to_wide};

/// Filesystem primitives backed directly by Win32.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Fs;

impl Win32Fs {
    pub fn new() -> Self {
        Self
    }
}

#[inline]
fn filetime_u64(ft: &FILETIME) -> u64 {
    (u64::from(ft.dwHighDateTime) << 32) | u64::from(ft.dwLowDateTime)
}

fn convert(data: &WIN32_FIND_DATAW) -> FindData {
    FindData {
        attributes: data.dwFileAttributes,
        creation_time: filetime_u64(&data.ftCreationTime),
        last_access_time: filetime_u64(&data.ftLastAccessTime),
        last_write_time: filetime_u64(&data.ftLastWriteTime),
        file_size: (u64::from(data.nFileSizeHigh) << 32) | u64::from(data.nFileSizeLow),
        file_name: from_wide(&data.cFileName),
        alternate_file_name: from_wide(&data.cAlternateFileName),
    }
}

/// An open FindFirstFileW handle; closed on drop.
struct Win32Scan {
    handle: HANDLE,
}

// The find handle is only ever used by the thread owning the cursor.
unsafe impl Send for Win32Scan {}

impl DirectoryScan for Win32Scan {
    fn next_entry(&mut self) -> Result<FindData, FindError> {
        // SAFETY: zeroed WIN32_FIND_DATAW is a valid out-buffer.
        let mut data: WIN32_FIND_DATAW = unsafe { mem::zeroed() };
        let ok = unsafe { FindNextFileW(self.handle, &mut data) };
        if ok != 0 {
            Ok(convert(&data))
        } else {
            Err(FindError::from_win32(unsafe { GetLastError() }))
        }
    }
}

impl Drop for Win32Scan {
    fn drop(&mut self) {
        let _ = unsafe { FindClose(self.handle) };
    }
}

impl FileSystem for Win32Fs {
    fn attributes(&self, path: &str) -> Option<u32> {
        let wide = to_wide(path);
        let attrs = unsafe { GetFileAttributesW(wide.as_ptr()) };
        (attrs != INVALID_FILE_ATTRIBUTES).then_some(attrs)
    }

    fn create_directory(&self, path: &str, template: Option<&str>) -> io::Result<()> {
        let wide = to_wide(path);
        let ok = match template {
            Some(template) => {
                let tpl = to_wide(template);
                unsafe { CreateDirectoryExW(tpl.as_ptr(), wide.as_ptr(), ptr::null()) }
            }
            None => unsafe { CreateDirectoryW(wide.as_ptr(), ptr::null()) },
        };
        if ok != 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if template.is_some() && err.kind() != io::ErrorKind::AlreadyExists {
            // a vanished template should not block creating the directory
            let ok = unsafe { CreateDirectoryW(wide.as_ptr(), ptr::null()) };
            if ok != 0 {
                return Ok(());
            }
            return Err(io::Error::last_os_error());
        }
        Err(err)
    }

    fn copy_file(&self, from: &str, to: &str) -> io::Result<()> {
        let src = to_wide(from);
        let dst = to_wide(to);
        let ok = unsafe { CopyFileW(src.as_ptr(), dst.as_ptr(), 1) };
        if ok != 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    fn find_first(&self, pattern: &str) -> Result<(FindData, Box<dyn DirectoryScan>), FindError> {
        let wide = to_wide(pattern);
        // SAFETY: zeroed WIN32_FIND_DATAW is a valid out-buffer.
        let mut data: WIN32_FIND_DATAW = unsafe { mem::zeroed() };
        let handle = unsafe { FindFirstFileW(wide.as_ptr(), &mut data) };
        if handle == INVALID_HANDLE_VALUE {
            return Err(FindError::from_win32(unsafe { GetLastError() }));
        }
        Ok((convert(&data), Box::new(Win32Scan { handle })))
    }

    fn current_dir(&self) -> Option<String> {
        let cwd = std::env::current_dir().ok()?;
        dunce::simplified(&cwd).to_str().map(str::to_string)
    }
}
