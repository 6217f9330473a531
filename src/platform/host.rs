//! std-backed primitive layer.
//!
//! `HostFs::native()` hands canonical paths to the OS as they are (on
//! non-Windows hosts the drive is dropped, so `C:\a` is `/a`).
//! `HostFs::rooted(dir)` keeps a whole fake machine below `dir`:
//!   `C:\a\b`            -> `<dir>/C/a/b`
//!   `\\srv\share\x`     -> `<dir>/UNC/srv/share/x`
//!
//! Notes:
//! - Enumeration never synthesizes `.`/`..` and yields entries ordered by
//!   case-folded name, so merged listings are stable across hosts.
//! - Wildcards follow Win32 rules closely enough for `*`, `?` and `*.*`;
//!   matching is case-insensitive.
//! - `copy_file` creates the destination with create_new and never clobbers.

use filetime::{FileTime, set_file_times};
use glob::{MatchOptions, Pattern};
use std::collections::VecDeque;
use std::fs::{self, File, Metadata, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, trace};

use super::helpers::io_error_with_help_io;
use super::{
    DirectoryScan, FILE_ATTRIBUTE_ARCHIVE, FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_HIDDEN,
    FILE_ATTRIBUTE_READONLY, FileSystem, FindData,
};
use crate::errors::FindError;
use crate::paths::{self, drive_letter, fold_case, split_last, strip_prefix_ignore_case};

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_OFFSET_SECS: u64 = 11_644_473_600;

/// Filesystem primitives backed by `std::fs`.
#[derive(Debug, Clone)]
pub struct HostFs {
    root: Option<PathBuf>,
    cwd: Option<String>,
}

impl HostFs {
    /// Pass canonical paths through to the host.
    pub fn native() -> Self {
        Self { root: None, cwd: None }
    }

    /// Keep every drive and share below `root`.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            cwd: None,
        }
    }

    /// Pin the directory relative inputs resolve against.
    pub fn with_current_dir(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Host location backing a canonical path, or `None` for forms this
    /// layer cannot reach (device namespaces other than drives and UNC).
    pub fn host_path(&self, path: &str) -> Option<PathBuf> {
        let path = strip_prefix_ignore_case(path, r"\\?\")
            .or_else(|| strip_prefix_ignore_case(path, r"\\.\"))
            .map(|rest| match strip_prefix_ignore_case(rest, r"UNC\") {
                Some(unc) => format!(r"\\{unc}"),
                None => rest.to_string(),
            })
            .unwrap_or_else(|| path.to_string());

        match &self.root {
            Some(root) => rooted_host_path(root, &path),
            None => native_host_path(&path),
        }
    }

    fn require_host_path(&self, path: &str) -> io::Result<PathBuf> {
        self.host_path(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no host location for '{path}'"),
            )
        })
    }
}

fn rooted_host_path(root: &Path, path: &str) -> Option<PathBuf> {
    let mut out = root.to_path_buf();
    let rest = if let Some(letter) = drive_letter(path) {
        out.push(letter.to_ascii_uppercase().to_string());
        &path[2..]
    } else if let Some(unc) = path.strip_prefix(r"\\") {
        out.push("UNC");
        unc
    } else {
        return None;
    };
    for comp in rest.split(paths::is_sep).filter(|c| !c.is_empty()) {
        out.push(comp);
    }
    Some(out)
}

#[cfg(windows)]
fn native_host_path(path: &str) -> Option<PathBuf> {
    Some(PathBuf::from(path))
}

#[cfg(not(windows))]
fn native_host_path(path: &str) -> Option<PathBuf> {
    drive_letter(path)?;
    let mut out = PathBuf::from("/");
    for comp in path[2..].split(paths::is_sep).filter(|c| !c.is_empty()) {
        out.push(comp);
    }
    Some(out)
}

/// Convert a host directory back into canonical form (`C:\...`).
fn canonical_from_host(p: &Path) -> Option<String> {
    let p = dunce::simplified(p);
    if cfg!(windows) {
        return p.to_str().map(|s| s.replace('/', r"\"));
    }
    let s = p.to_str()?;
    let trimmed = s.trim_start_matches('/');
    Some(paths::join("C:", &trimmed.replace('/', r"\")))
}

/// FILETIME ticks for a timestamp; 0 when unavailable or before 1970.
pub(crate) fn filetime_ticks(t: io::Result<SystemTime>) -> u64 {
    t.ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| {
            (d.as_secs() + FILETIME_UNIX_OFFSET_SECS) * 10_000_000 + u64::from(d.subsec_nanos() / 100)
        })
        .unwrap_or(0)
}

#[cfg(windows)]
fn attributes_of(_name: &str, meta: &Metadata) -> u32 {
    use std::os::windows::fs::MetadataExt;
    meta.file_attributes()
}

#[cfg(not(windows))]
fn attributes_of(name: &str, meta: &Metadata) -> u32 {
    let mut attrs = if meta.is_dir() {
        FILE_ATTRIBUTE_DIRECTORY
    } else {
        FILE_ATTRIBUTE_ARCHIVE
    };
    if meta.permissions().readonly() {
        attrs |= FILE_ATTRIBUTE_READONLY;
    }
    if name.starts_with('.') && name != "." && name != ".." {
        attrs |= FILE_ATTRIBUTE_HIDDEN;
    }
    attrs
}

fn find_data(name: String, meta: &Metadata) -> FindData {
    FindData {
        attributes: attributes_of(&name, meta),
        creation_time: filetime_ticks(meta.created()),
        last_access_time: filetime_ticks(meta.accessed()),
        last_write_time: filetime_ticks(meta.modified()),
        file_size: if meta.is_dir() { 0 } else { meta.len() },
        file_name: name,
        alternate_file_name: String::new(),
    }
}

/// Win32-style wildcard match of `name` against `pattern`, ignoring case.
pub fn wildcard_matches(pattern: &str, name: &str) -> bool {
    if pattern == "*" || pattern == "*.*" {
        return true;
    }
    if !pattern.contains(['*', '?']) {
        return paths::eq_ignore_case(pattern, name);
    }
    let mut escaped = String::with_capacity(pattern.len() + 8);
    for c in pattern.chars() {
        match c {
            '[' => escaped.push_str("[[]"),
            ']' => escaped.push_str("[]]"),
            other => escaped.push(other),
        }
    }
    let opts = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    match Pattern::new(&escaped) {
        Ok(p) => p.matches_with(name, opts),
        Err(_) => paths::eq_ignore_case(pattern, name),
    }
}

/// Snapshot of one directory listing.
struct HostScan {
    pending: VecDeque<FindData>,
}

impl DirectoryScan for HostScan {
    fn next_entry(&mut self) -> Result<FindData, FindError> {
        self.pending.pop_front().ok_or(FindError::NoMoreFiles)
    }
}

fn copy_readonly_and_times(template: &Path, dest: &Path) -> io::Result<()> {
    let meta = fs::metadata(template)?;
    let atime = FileTime::from_last_access_time(&meta);
    let mtime = FileTime::from_last_modification_time(&meta);
    set_file_times(dest, atime, mtime)?;
    if meta.permissions().readonly() {
        let mut perms = fs::metadata(dest)?.permissions();
        perms.set_readonly(true);
        fs::set_permissions(dest, perms)?;
    }
    Ok(())
}

impl FileSystem for HostFs {
    fn attributes(&self, path: &str) -> Option<u32> {
        let host = self.host_path(path)?;
        let meta = fs::metadata(&host).ok()?;
        let (_, name) = split_last(path);
        Some(attributes_of(name, &meta))
    }

    fn create_directory(&self, path: &str, template: Option<&str>) -> io::Result<()> {
        let host = self.require_host_path(path)?;
        fs::create_dir(&host).map_err(io_error_with_help_io("create directory", path))?;
        if let Some(template) = template
            && let Some(tpl) = self.host_path(template)
            && tpl.is_dir()
            && let Err(e) = copy_readonly_and_times(&tpl, &host)
        {
            debug!(path, template, error = %e, "Could not carry directory attributes over");
        }
        trace!(path, "Created directory");
        Ok(())
    }

    fn copy_file(&self, from: &str, to: &str) -> io::Result<()> {
        let src = self.require_host_path(from)?;
        let dst = self.require_host_path(to)?;
        if fs::metadata(&src)
            .map_err(io_error_with_help_io("stat copy source", from))?
            .is_dir()
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("copy source '{from}' is a directory"),
            ));
        }

        let input = File::open(&src).map_err(io_error_with_help_io("open copy source", from))?;
        let output = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&dst)
            .map_err(io_error_with_help_io("create copy destination", to))?;

        let copied = (|| {
            let mut reader = BufReader::new(input);
            let mut writer = BufWriter::new(output);
            let bytes = io::copy(&mut reader, &mut writer)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
            Ok::<u64, io::Error>(bytes)
        })();
        let bytes = match copied {
            Ok(b) => b,
            Err(e) => {
                // never leave a truncated store copy behind
                let _ = fs::remove_file(&dst);
                return Err(io_error_with_help_io("copy file", to)(e));
            }
        };

        if let Err(e) = copy_readonly_and_times(&src, &dst) {
            debug!(from, to, error = %e, "Could not preserve file times");
        }
        debug!(from, to, bytes, "Copied file");
        Ok(())
    }

    fn find_first(&self, pattern: &str) -> Result<(FindData, Box<dyn DirectoryScan>), FindError> {
        let (dir, wildcard) = split_last(pattern);
        if dir.is_empty() || wildcard.is_empty() {
            return Err(FindError::PathNotFound);
        }
        let host_dir = self.host_path(dir).ok_or(FindError::PathNotFound)?;
        let reader = fs::read_dir(&host_dir).map_err(|e| FindError::from_io(&e))?;

        let mut entries: Vec<FindData> = reader
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                if !wildcard_matches(wildcard, &name) {
                    return None;
                }
                let meta = fs::metadata(entry.path()).or_else(|_| entry.metadata()).ok()?;
                Some(find_data(name, &meta))
            })
            .collect();
        entries.sort_by_cached_key(|d| fold_case(&d.file_name));

        let mut pending = VecDeque::from(entries);
        let first = pending.pop_front().ok_or(FindError::FileNotFound)?;
        Ok((first, Box::new(HostScan { pending })))
    }

    fn current_dir(&self) -> Option<String> {
        if let Some(cwd) = &self.cwd {
            return Some(cwd.clone());
        }
        if self.root.is_some() {
            return None;
        }
        let cwd = std::env::current_dir().ok()?;
        canonical_from_host(&cwd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn rooted_paths_map_drives_and_shares() {
        let fs = HostFs::rooted("/tmp/machine");
        assert_eq!(
            fs.host_path(r"C:\Users\me\a.txt").unwrap(),
            PathBuf::from("/tmp/machine/C/Users/me/a.txt")
        );
        assert_eq!(
            fs.host_path(r"d:\data").unwrap(),
            PathBuf::from("/tmp/machine/D/data")
        );
        assert_eq!(
            fs.host_path(r"\\srv\share\x").unwrap(),
            PathBuf::from("/tmp/machine/UNC/srv/share/x")
        );
        assert_eq!(
            fs.host_path(r"\\?\C:\x").unwrap(),
            PathBuf::from("/tmp/machine/C/x")
        );
        assert!(fs.host_path(r"\\.\pipe\foo").is_none());
    }

    #[test]
    fn wildcards_follow_win32_shape() {
        assert!(wildcard_matches("*", "anything"));
        assert!(wildcard_matches("*.*", "noext"));
        assert!(wildcard_matches("*.TXT", "a.txt"));
        assert!(wildcard_matches("?.txt", "b.txt"));
        assert!(!wildcard_matches("?.txt", "bb.txt"));
        assert!(wildcard_matches("[x].txt", "[X].TXT"));
        assert!(wildcard_matches("Settings.ini", "settings.INI"));
    }

    #[test]
    fn filetime_ticks_counts_from_1601() {
        assert_eq!(filetime_ticks(Ok(UNIX_EPOCH)), FILETIME_UNIX_OFFSET_SECS * 10_000_000);
        assert_eq!(filetime_ticks(Err(io::Error::other("x"))), 0);
    }

    #[test]
    fn find_lists_sorted_matches_without_dot_entries() {
        let td = tempdir().unwrap();
        let dir = td.path().join("C").join("data");
        fs::create_dir_all(dir.join("Sub")).unwrap();
        fs::write(dir.join("b.txt"), b"bb").unwrap();
        fs::write(dir.join("A.txt"), b"a").unwrap();
        fs::write(dir.join("c.log"), b"c").unwrap();
        let hfs = HostFs::rooted(td.path());

        let (first, mut scan) = hfs.find_first(r"C:\data\*").unwrap();
        let mut names = vec![first.file_name.clone()];
        while let Ok(d) = scan.next_entry() {
            names.push(d.file_name);
        }
        assert_eq!(names, vec!["A.txt", "b.txt", "c.log", "Sub"]);

        let (first, mut scan) = hfs.find_first(r"C:\data\*.txt").unwrap();
        assert_eq!(first.file_name, "A.txt");
        assert_eq!(first.file_size, 1);
        assert_eq!(scan.next_entry().unwrap().file_name, "b.txt");
        assert_eq!(scan.next_entry().unwrap_err(), FindError::NoMoreFiles);
    }

    #[test]
    fn find_distinguishes_missing_dir_from_no_match() {
        let td = tempdir().unwrap();
        fs::create_dir_all(td.path().join("C").join("empty")).unwrap();
        let hfs = HostFs::rooted(td.path());
        assert_eq!(
            hfs.find_first(r"C:\empty\*").err().unwrap(),
            FindError::FileNotFound
        );
        assert_eq!(
            hfs.find_first(r"C:\missing\*").err().unwrap(),
            FindError::PathNotFound
        );
    }

    #[test]
    fn copy_never_clobbers_and_directories_report_existing() {
        let td = tempdir().unwrap();
        fs::create_dir_all(td.path().join("C").join("src")).unwrap();
        fs::write(td.path().join("C/src/a.ini"), b"[a]").unwrap();
        let hfs = HostFs::rooted(td.path());

        hfs.create_directory(r"C:\dst", Some(r"C:\src")).unwrap();
        assert!(hfs.is_directory(r"C:\dst"));
        let err = hfs.create_directory(r"C:\dst", None).unwrap_err();
        assert!(crate::errors::is_already_exists(&err));

        hfs.copy_file(r"C:\src\a.ini", r"C:\dst\a.ini").unwrap();
        assert_eq!(fs::read(td.path().join("C/dst/a.ini")).unwrap(), b"[a]");
        let err = hfs.copy_file(r"C:\src\a.ini", r"C:\dst\a.ini").unwrap_err();
        assert!(crate::errors::is_already_exists(&err));

        let err = hfs.copy_file(r"C:\src\none.ini", r"C:\dst\none.ini").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn rooted_current_dir_is_explicit() {
        let hfs = HostFs::rooted("/tmp/m");
        assert_eq!(hfs.current_dir(), None);
        let hfs = hfs.with_current_dir(r"C:\work");
        assert_eq!(hfs.current_dir().as_deref(), Some(r"C:\work"));
    }
}
