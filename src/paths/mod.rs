//! Path string helpers shared by every stage of the resolver.
//!
//! All paths handled by the core are UTF-8 `String`s in canonical form:
//! `\` is the only separator and comparisons are case-insensitive. The
//! helpers here are the single place that knows about those conventions.

mod normalize;

pub use normalize::{NormalizedPath, PathKind, normalize, normalize_with_cwd};

/// The canonical separator.
pub const SEP: char = '\\';

/// Character substituted for the drive colon when a drive letter is
/// embedded as a path component (`C:` -> `C$`).
pub const DRIVE_SUBSTITUTE: char = '$';

#[inline]
pub fn is_sep(c: char) -> bool {
    c == '\\' || c == '/'
}

#[inline]
fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Case-insensitive string equality.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars().count() == b.chars().count()
        && a.chars().zip(b.chars()).all(|(x, y)| chars_eq_ignore_case(x, y))
}

/// Case-insensitive prefix strip; returns the remainder of `s` on match.
pub fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let mut it = s.char_indices();
    for pc in prefix.chars() {
        let (_, c) = it.next()?;
        if !chars_eq_ignore_case(c, pc) {
            return None;
        }
    }
    let idx = it.next().map(|(i, _)| i).unwrap_or(s.len());
    Some(&s[idx..])
}

/// Strip `base` from `path` only at a component boundary.
///
/// Returns `Some("")` when the two are equal, `Some(rest)` (without the
/// leading separator) when `path` is a descendant of `base`, and `None`
/// otherwise. `Catroot2` is not under `Catroot`.
pub fn strip_path_prefix<'a>(path: &'a str, base: &str) -> Option<&'a str> {
    let base = trim_trailing_sep(base);
    if base.is_empty() {
        return None;
    }
    let rest = strip_prefix_ignore_case(path, base)?;
    if rest.is_empty() {
        Some(rest)
    } else if let Some(stripped) = rest.strip_prefix(SEP) {
        Some(stripped)
    } else {
        None
    }
}

/// True when `path` equals `base` or lies beneath it.
#[inline]
pub fn is_path_under(path: &str, base: &str) -> bool {
    strip_path_prefix(path, base).is_some()
}

/// Remove trailing separators. A drive root comes back as bare `C:`;
/// `join` puts the separator back.
#[inline]
pub fn trim_trailing_sep(path: &str) -> &str {
    path.trim_end_matches(is_sep)
}

/// Join a base and a relative remainder with exactly one separator.
pub fn join(base: &str, rest: &str) -> String {
    let base = trim_trailing_sep(base);
    let rest = rest.trim_start_matches(is_sep);
    if rest.is_empty() {
        if base.len() == 2 && base.ends_with(':') {
            return format!("{base}{SEP}");
        }
        return base.to_string();
    }
    let mut out = String::with_capacity(base.len() + rest.len() + 1);
    out.push_str(base);
    out.push(SEP);
    out.push_str(rest);
    out
}

/// Split off the last component: (`C:\a\b`, `c`) for `C:\a\b\c`.
pub fn split_last(path: &str) -> (&str, &str) {
    match path.rfind(is_sep) {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// First component and the rest (without separator).
pub fn split_first(rel: &str) -> (&str, &str) {
    match rel.find(is_sep) {
        Some(idx) => (&rel[..idx], &rel[idx + 1..]),
        None => (rel, ""),
    }
}

/// Drive letter of a drive-absolute path (`C:\...`), if any.
pub fn drive_letter(path: &str) -> Option<char> {
    let mut chars = path.chars();
    let letter = chars.next()?;
    if letter.is_ascii_alphabetic() && chars.next() == Some(':') {
        Some(letter)
    } else {
        None
    }
}

/// `C:\Users\x` -> `C$\Users\x`. Non drive-absolute input yields `None`.
pub fn encode_drive(path: &str) -> Option<String> {
    let letter = drive_letter(path)?;
    let rest = path[2..].trim_start_matches(SEP);
    let mut out = String::with_capacity(path.len());
    out.push(letter.to_ascii_uppercase());
    out.push(DRIVE_SUBSTITUTE);
    if !rest.is_empty() {
        out.push(SEP);
        out.push_str(rest);
    }
    Some(out)
}

/// `C$\Users\x` -> `C:\Users\x`. Anything not led by an encoded drive
/// component yields `None`.
pub fn decode_drive(rel: &str) -> Option<String> {
    let (first, rest) = split_first(rel);
    let mut chars = first.chars();
    let letter = chars.next()?;
    if !(letter.is_ascii_alphabetic()
        && chars.next() == Some(DRIVE_SUBSTITUTE)
        && chars.next().is_none())
    {
        return None;
    }
    Some(format!("{}:{}{}", letter.to_ascii_uppercase(), SEP, rest))
}

/// Case-folded key used for de-duplicating file names.
#[inline]
pub fn fold_case(name: &str) -> String {
    name.to_lowercase()
}

/// Convert to a NUL-terminated UTF-16 buffer for the Win32 primitive layer.
pub fn to_wide(path: &str) -> Vec<u16> {
    path.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Decode a (possibly NUL-terminated) UTF-16 buffer back into the core form.
pub fn from_wide(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_match_respects_component_boundary() {
        let base = r"C:\Windows\System32\catroot";
        assert_eq!(strip_path_prefix(r"C:\Windows\System32\catroot\x.cat", base), Some("x.cat"));
        assert_eq!(strip_path_prefix(r"C:\WINDOWS\system32\CATROOT", base), Some(""));
        assert_eq!(strip_path_prefix(r"C:\Windows\System32\catroot2\x", base), None);
    }

    #[test]
    fn prefix_match_on_drive_root() {
        assert_eq!(strip_path_prefix(r"C:\temp\a", r"C:\"), Some(r"temp\a"));
        assert_eq!(strip_path_prefix(r"D:\temp", r"C:\"), None);
    }

    #[test]
    fn join_handles_separators_and_roots() {
        assert_eq!(join(r"C:\", "a"), r"C:\a");
        assert_eq!(join(r"C:\a\", r"\b"), r"C:\a\b");
        assert_eq!(join(r"C:\a", ""), r"C:\a");
        assert_eq!(join("C:", ""), r"C:\");
    }

    #[test]
    fn drive_encoding_round_trips() {
        let enc = encode_drive(r"c:\ProgramData\Vendor").unwrap();
        assert_eq!(enc, r"C$\ProgramData\Vendor");
        assert_eq!(decode_drive(&enc).unwrap(), r"C:\ProgramData\Vendor");
        assert_eq!(encode_drive(r"D:\").unwrap(), "D$");
        assert_eq!(decode_drive("D$").unwrap(), r"D:\");
        assert!(decode_drive(r"Common AppData\x").is_none());
        assert!(decode_drive(r"CD$\x").is_none());
    }

    #[test]
    fn case_insensitive_helpers() {
        assert!(eq_ignore_case("Program Files", "PROGRAM FILES"));
        assert!(!eq_ignore_case("Program", "Programs"));
        assert_eq!(strip_prefix_ignore_case("ÄBC", "äb"), Some("C"));
    }

    #[test]
    fn wide_conversion_stops_at_nul() {
        let wide = to_wide("abc");
        assert_eq!(wide.last(), Some(&0));
        assert_eq!(from_wide(&wide), "abc");
    }
}
