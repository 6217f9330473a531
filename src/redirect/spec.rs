//! Redirection spec table.
//!
//! Compiled once from the JSON rules. Every base is stored in its
//! virtualized (package) spelling so a request is matched the same way
//! whether it named the native folder or the package VFS folder.
//!
//! Notes:
//! - Order is document order: packageRelative, packageDriveRelative,
//!   knownFolders. The first matching spec wins.
//! - A pattern matches the remainder after the base either fully or up to a
//!   separator (`^(?:pat)(?:\\|$)`), case-insensitively.

use regex::{Regex, RegexBuilder};
use std::fmt;
use tracing::{debug, warn};

use crate::config::{RedirectionConfig, RelativePathEntry};
use crate::errors::RedirectError;
use crate::paths::{self, drive_letter, is_path_under, strip_path_prefix};
use crate::vfs::{KnownFolderId, KnownFolders, VfsMappingTable};

/// Where a spec's base is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecAnchor {
    PackageRelative,
    PackageDriveRelative,
    KnownFolder(KnownFolderId),
}

impl fmt::Display for SpecAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecAnchor::PackageRelative => f.write_str("packageRelative"),
            SpecAnchor::PackageDriveRelative => f.write_str("packageDriveRelative"),
            SpecAnchor::KnownFolder(id) => write!(f, "knownFolder:{}", id.name()),
        }
    }
}

/// One compiled rule.
#[derive(Debug, Clone)]
pub struct RedirectionSpec {
    pub anchor: SpecAnchor,
    /// Absolute base, virtualized.
    pub base: String,
    /// Pattern text as written in the config.
    pub pattern: String,
    regex: Regex,
    /// Store override; `None` means the default redirect root.
    pub target_base: Option<String>,
    pub is_exclusion: bool,
    pub is_read_only: bool,
}

impl RedirectionSpec {
    pub fn new(
        anchor: SpecAnchor,
        base: impl Into<String>,
        pattern: &str,
        target_base: Option<String>,
        is_exclusion: bool,
        is_read_only: bool,
    ) -> Result<Self, RedirectError> {
        let regex = RegexBuilder::new(&format!(r"^(?:{pattern})(?:\\|$)"))
            .case_insensitive(true)
            .build()
            .map_err(|source| RedirectError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self {
            anchor,
            base: paths::trim_trailing_sep(&base.into()).to_string(),
            pattern: pattern.to_string(),
            regex,
            target_base,
            is_exclusion,
            is_read_only,
        })
    }

    /// True when `virtualized` is the base or lies below it and the
    /// remainder satisfies the pattern.
    pub fn matches(&self, virtualized: &str) -> bool {
        strip_path_prefix(virtualized, &self.base).is_some_and(|rest| self.regex.is_match(rest))
    }
}

/// Ordered, immutable list of specs.
#[derive(Debug, Clone, Default)]
pub struct SpecTable {
    specs: Vec<RedirectionSpec>,
}

impl SpecTable {
    pub fn new(specs: Vec<RedirectionSpec>) -> Self {
        Self { specs }
    }

    /// Compile the config against the package mapping table.
    ///
    /// Known folders that have no native location on this system are
    /// skipped with a warning; every other problem is an error.
    pub fn from_config(
        config: &RedirectionConfig,
        table: &VfsMappingTable,
        folders: &KnownFolders,
    ) -> Result<Self, RedirectError> {
        let mut specs = Vec::new();
        let rp = &config.redirected_paths;
        let package_root = table.package_root();

        for entry in &rp.package_relative {
            let base = paths::join(package_root, &relative_base(&entry.base)?);
            push_entry(&mut specs, SpecAnchor::PackageRelative, &base, entry, table)?;
        }

        let drive = drive_letter(package_root)
            .map(|d| format!("{}:", d.to_ascii_uppercase()))
            .ok_or_else(|| RedirectError::InvalidBase(package_root.to_string()))?;
        for entry in &rp.package_drive_relative {
            let base = paths::join(&paths::join(&drive, ""), &relative_base(&entry.base)?);
            push_entry(&mut specs, SpecAnchor::PackageDriveRelative, &base, entry, table)?;
        }

        for kf in &rp.known_folders {
            let id: KnownFolderId = kf.id.parse()?;
            let folder = match known_folder_root(id, table, folders) {
                Ok(folder) => folder,
                Err(e @ RedirectError::KnownFolderUnavailable(_)) => {
                    warn!(id = %kf.id, error = %e, "Skipping rules for unavailable known folder");
                    continue;
                }
                Err(e) => return Err(e),
            };
            for entry in kf.entries() {
                let base = paths::join(&folder, &relative_base(&entry.base)?);
                push_entry(&mut specs, SpecAnchor::KnownFolder(id), &base, &entry, table)?;
            }
        }

        debug!(count = specs.len(), "Compiled redirection specs");
        Ok(Self { specs })
    }

    /// First spec (declaration order) matching the virtualized path.
    pub fn first_match(&self, virtualized: &str) -> Option<&RedirectionSpec> {
        self.specs.iter().find(|s| s.matches(virtualized))
    }

    /// Distinct store overrides named by any spec.
    pub fn target_overrides(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for base in self.specs.iter().filter_map(|s| s.target_base.as_deref()) {
            if !out.iter().any(|b| paths::eq_ignore_case(b, base)) {
                out.push(base);
            }
        }
        out
    }

    pub fn specs(&self) -> &[RedirectionSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Canonicalize a relative base from the config. Parent references and
/// absolute bases are rejected.
fn relative_base(raw: &str) -> Result<String, RedirectError> {
    let comps: Vec<&str> = raw
        .split(paths::is_sep)
        .filter(|c| !c.is_empty() && *c != ".")
        .collect();
    if drive_letter(raw).is_some() || comps.contains(&"..") {
        return Err(RedirectError::InvalidBase(raw.to_string()));
    }
    Ok(comps.join(r"\"))
}

fn known_folder_root(
    id: KnownFolderId,
    table: &VfsMappingTable,
    folders: &KnownFolders,
) -> Result<String, RedirectError> {
    if id == KnownFolderId::Package {
        return Ok(table.package_root().to_string());
    }
    folders
        .get(id)
        .map(str::to_string)
        .ok_or_else(|| RedirectError::KnownFolderUnavailable(id.name().to_string()))
}

fn push_entry(
    specs: &mut Vec<RedirectionSpec>,
    anchor: SpecAnchor,
    native_base: &str,
    entry: &RelativePathEntry,
    table: &VfsMappingTable,
) -> Result<(), RedirectError> {
    let base = table
        .virtualize(native_base)
        .ok_or_else(|| RedirectError::InvalidBase(native_base.to_string()))?;

    let target_base = match &entry.redirect_target_base {
        Some(raw) => {
            let t = raw.replace('/', r"\");
            if drive_letter(&t).is_none() || !t[2..].starts_with(paths::SEP) {
                return Err(RedirectError::InvalidBase(raw.clone()));
            }
            let t = paths::trim_trailing_sep(&t).to_string();
            if is_path_under(&t, table.package_root()) {
                return Err(RedirectError::InvalidBase(raw.clone()));
            }
            Some(t)
        }
        None => None,
    };

    if entry.patterns.is_empty() {
        debug!(anchor = %anchor, base = %base, "Rule has no patterns; ignored");
    }
    for p in &entry.patterns {
        let (is_exclusion, is_read_only) = p.modifiers(entry);
        specs.push(RedirectionSpec::new(
            anchor,
            base.clone(),
            p.pattern(),
            target_base.clone(),
            is_exclusion,
            is_read_only,
        )?);
    }
    Ok(())
}
