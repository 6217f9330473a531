//! Path Normalizer.
//! Classifies an arbitrary input path and canonicalizes it to a single
//! absolute form. Never fails: anything it cannot make sense of comes back
//! as `PathKind::Unknown` with an empty drive-absolute form, which every
//! downstream stage reads as "do not redirect".

use std::fmt;

use super::{SEP, drive_letter, is_sep, strip_prefix_ignore_case};

/// Shape of the input, decided by its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// `C:\foo`
    DriveAbsolute,
    /// `C:foo`
    DriveRelative,
    /// `\foo`
    Rooted,
    /// `foo\bar`
    Relative,
    /// `\\server\share\foo`
    UncAbsolute,
    /// `\\.\C:\foo`, `\\.\pipe\x`
    LocalDevice,
    /// `\\?\C:\foo`, `\??\C:\foo`
    RootLocalDevice,
    Unknown,
}

impl PathKind {
    /// Inputs that were not fully qualified by the caller.
    pub fn is_relative(self) -> bool {
        matches!(self, PathKind::DriveRelative | PathKind::Rooted | PathKind::Relative)
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PathKind::DriveAbsolute => "drive-absolute",
            PathKind::DriveRelative => "drive-relative",
            PathKind::Rooted => "rooted",
            PathKind::Relative => "relative",
            PathKind::UncAbsolute => "unc-absolute",
            PathKind::LocalDevice => "local-device",
            PathKind::RootLocalDevice => "root-local-device",
            PathKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Result of normalizing one input. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath {
    /// The input exactly as received.
    pub original: String,
    /// Canonical full form (device prefixes kept, separators canonical).
    pub full: String,
    pub kind: PathKind,
    /// Canonical `X:\...` form, or empty when none could be recovered.
    pub drive_absolute: String,
}

impl NormalizedPath {
    fn opaque(original: &str) -> Self {
        Self {
            original: original.to_string(),
            full: original.to_string(),
            kind: PathKind::Unknown,
            drive_absolute: String::new(),
        }
    }

    /// True when a drive-absolute form is available to reason about.
    #[inline]
    pub fn is_resolvable(&self) -> bool {
        !self.drive_absolute.is_empty()
    }
}

/// Normalize against the process current directory.
pub fn normalize(input: &str) -> NormalizedPath {
    let cwd = std::env::current_dir()
        .ok()
        .map(|p| p.to_string_lossy().into_owned());
    normalize_with_cwd(input, cwd.as_deref())
}

/// Normalize, resolving relative forms against `cwd` (a drive-absolute
/// path). Relative inputs stay unresolved when `cwd` is `None` or not
/// drive-absolute.
pub fn normalize_with_cwd(input: &str, cwd: Option<&str>) -> NormalizedPath {
    if is_opaque(input) {
        return NormalizedPath::opaque(input);
    }

    let unschemed = strip_file_scheme(input);
    let mut path: String = unschemed.replace('/', "\\");
    if path.is_empty() {
        return NormalizedPath::opaque(input);
    }

    let kind = classify(&path);
    let cwd = cwd.filter(|c| drive_letter(c).is_some()).map(|c| c.replace('/', "\\"));

    let (full, drive_absolute) = match kind {
        PathKind::DriveAbsolute => {
            let canon = canonicalize_drive_absolute(&path);
            (canon.clone(), canon)
        }
        PathKind::DriveRelative => match cwd.as_deref() {
            Some(cwd) => {
                let letter = path.as_bytes()[0] as char;
                let rest = &path[2..];
                let anchored = if drive_letter(cwd).is_some_and(|c| c.eq_ignore_ascii_case(&letter)) {
                    format!("{cwd}{SEP}{rest}")
                } else {
                    format!("{}:{SEP}{rest}", letter.to_ascii_uppercase())
                };
                let canon = canonicalize_drive_absolute(&anchored);
                (canon.clone(), canon)
            }
            None => (path.clone(), String::new()),
        },
        PathKind::Rooted => match cwd.as_deref() {
            Some(cwd) => {
                let canon = canonicalize_drive_absolute(&format!("{}{}", &cwd[..2], path));
                (canon.clone(), canon)
            }
            None => (path.clone(), String::new()),
        },
        PathKind::Relative => match cwd.as_deref() {
            Some(cwd) => {
                let canon = canonicalize_drive_absolute(&format!("{cwd}{SEP}{path}"));
                (canon.clone(), canon)
            }
            None => (path.clone(), String::new()),
        },
        PathKind::LocalDevice | PathKind::RootLocalDevice => {
            let prefix = &path[..4];
            let body = &path[4..];
            if drive_letter(body).is_some() && (body.len() == 2 || body[2..].starts_with(SEP)) {
                let canon = canonicalize_drive_absolute(body);
                (format!("{prefix}{canon}"), canon)
            } else if kind == PathKind::RootLocalDevice
                && let Some(unc) = strip_prefix_ignore_case(body, "UNC\\")
            {
                // \\?\UNC\server\share is a UNC path in device clothing
                return NormalizedPath {
                    original: input.to_string(),
                    full: canonicalize_unc(&format!("\\\\{unc}")),
                    kind: PathKind::UncAbsolute,
                    drive_absolute: String::new(),
                };
            } else {
                (path.clone(), String::new())
            }
        }
        PathKind::UncAbsolute => {
            path = canonicalize_unc(&path);
            (path, String::new())
        }
        PathKind::Unknown => (path.clone(), String::new()),
    };

    NormalizedPath {
        original: input.to_string(),
        full,
        kind,
        drive_absolute,
    }
}

/// Shell namespace references and blob URIs are not file paths at all.
fn is_opaque(input: &str) -> bool {
    input.contains("::{") || strip_prefix_ignore_case(input, "blob:").is_some()
}

/// Remove a `file:` scheme and decode its percent escapes. Inputs without
/// the scheme are returned as-is.
fn strip_file_scheme(input: &str) -> String {
    let Some(rest) = strip_prefix_ignore_case(input, "file:") else {
        return input.to_string();
    };
    let decoded = percent_decode(rest);
    let slashes = decoded.chars().take_while(|&c| is_sep(c)).count();
    let body = &decoded[slashes..];
    match slashes {
        // file:///C:/x and file:/C:/x
        _ if drive_letter(body).is_some() => body.to_string(),
        // file://server/share/x
        2 => format!("\\\\{body}"),
        _ => format!("\\{body}"),
    }
}

fn percent_decode(s: &str) -> String {
    fn hex(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(h), Some(l)) = (hex(bytes[i + 1]), hex(bytes[i + 2]))
        {
            out.push(h << 4 | l);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn classify(path: &str) -> PathKind {
    let b = path.as_bytes();
    if path.starts_with("\\\\?\\") || path.starts_with("\\??\\") {
        return PathKind::RootLocalDevice;
    }
    if path.starts_with("\\\\.\\") {
        return PathKind::LocalDevice;
    }
    if path.starts_with("\\\\") {
        return PathKind::UncAbsolute;
    }
    if drive_letter(path).is_some() {
        return if b.len() > 2 && b[2] == b'\\' {
            PathKind::DriveAbsolute
        } else {
            PathKind::DriveRelative
        };
    }
    if path.starts_with('\\') {
        return PathKind::Rooted;
    }
    PathKind::Relative
}

/// Collapse separators and resolve `.`/`..` below `X:\`.
fn canonicalize_drive_absolute(path: &str) -> String {
    let letter = path.as_bytes()[0].to_ascii_uppercase() as char;
    let mut parts: Vec<&str> = Vec::new();
    for seg in path[2..].split(SEP) {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    let mut out = format!("{letter}:{SEP}");
    out.push_str(&parts.join("\\"));
    out
}

fn canonicalize_unc(path: &str) -> String {
    let body = path.trim_start_matches(SEP);
    let mut parts: Vec<&str> = Vec::new();
    for seg in body.split(SEP) {
        match seg {
            "" | "." => {}
            // never climb above \\server\share
            ".." if parts.len() > 2 => {
                parts.pop();
            }
            ".." => {}
            s => parts.push(s),
        }
    }
    format!("\\\\{}", parts.join("\\"))
}
