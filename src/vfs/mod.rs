//! VFS mapping table and the virtualize / de-virtualize translations.
//!
//! The table is built once from the package root and the native known
//! folders, then shared read-only by every thread. Matching is
//! case-insensitive and only ever happens at component boundaries.

mod known_folders;

pub use known_folders::{KnownFolderId, KnownFolders};

use crate::paths::{self, decode_drive, encode_drive, split_first, strip_path_prefix};

/// Name of the VFS folder directly under the package root.
pub const VFS_DIR: &str = "VFS";

/// One native folder and the package VFS folder that shadows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsFolderMapping {
    pub id: KnownFolderId,
    /// Absolute native folder, e.g. `C:\ProgramData`.
    pub native: String,
    /// Folder under the VFS root, e.g. `Common AppData`.
    pub segment: String,
}

/// Process-wide mapping table plus the package anchors it translates against.
#[derive(Debug, Clone)]
pub struct VfsMappingTable {
    package_root: String,
    vfs_root: String,
    // longest native folder first so nested folders (catroot) beat parents (System32)
    by_native: Vec<VfsFolderMapping>,
    // longest segment first
    by_segment: Vec<VfsFolderMapping>,
}

impl VfsMappingTable {
    /// Build from the package root and every known folder that has both a
    /// native location and a VFS segment.
    pub fn new(package_root: &str, folders: &KnownFolders) -> Self {
        let mappings: Vec<VfsFolderMapping> = KnownFolderId::ALL
            .into_iter()
            .filter_map(|id| {
                let segment = id.vfs_segment()?;
                let native = folders.get(id)?;
                Some(VfsFolderMapping {
                    id,
                    native: native.to_string(),
                    segment: segment.to_string(),
                })
            })
            .collect();
        Self::with_mappings(package_root, mappings)
    }

    /// Build from an explicit list of mappings.
    pub fn with_mappings(package_root: &str, mappings: Vec<VfsFolderMapping>) -> Self {
        let package_root = paths::trim_trailing_sep(package_root).to_string();
        let vfs_root = paths::join(&package_root, VFS_DIR);
        let mut by_native = mappings.clone();
        by_native.sort_by(|a, b| b.native.len().cmp(&a.native.len()));
        let mut by_segment = mappings;
        by_segment.sort_by(|a, b| b.segment.len().cmp(&a.segment.len()));
        Self {
            package_root,
            vfs_root,
            by_native,
            by_segment,
        }
    }

    pub fn package_root(&self) -> &str {
        &self.package_root
    }

    pub fn vfs_root(&self) -> &str {
        &self.vfs_root
    }

    pub fn mappings(&self) -> &[VfsFolderMapping] {
        &self.by_native
    }

    /// Remainder of `path` below the package root, if it lies inside the package.
    pub fn package_relative<'a>(&self, path: &'a str) -> Option<&'a str> {
        strip_path_prefix(path, &self.package_root)
    }

    #[inline]
    pub fn is_in_package(&self, path: &str) -> bool {
        self.package_relative(path).is_some()
    }

    /// Remainder of `path` below the VFS root.
    pub fn vfs_relative<'a>(&self, path: &'a str) -> Option<&'a str> {
        strip_path_prefix(path, &self.vfs_root)
    }

    /// The mapping whose native folder contains `path`, with the remainder.
    pub fn find_native<'a>(&self, path: &'a str) -> Option<(&VfsFolderMapping, &'a str)> {
        self.by_native
            .iter()
            .find_map(|m| strip_path_prefix(path, &m.native).map(|rest| (m, rest)))
    }

    /// Native absolute path -> package VFS path.
    ///
    /// Paths already inside the package come back unchanged. Paths outside
    /// every mapped folder get the drive fallback (`VFS\C$\...`), so any
    /// drive-absolute path has some VFS spelling. Non drive-absolute input
    /// yields `None`.
    pub fn virtualize(&self, native: &str) -> Option<String> {
        if self.is_in_package(native) {
            return Some(native.to_string());
        }
        if let Some((mapping, rest)) = self.find_native(native) {
            let folder = paths::join(&self.vfs_root, &mapping.segment);
            return Some(paths::join(&folder, rest));
        }
        let encoded = encode_drive(native)?;
        Some(paths::join(&self.vfs_root, &encoded))
    }

    /// Like `virtualize`, but only through an explicit mapping.
    pub fn virtualize_mapped(&self, native: &str) -> Option<String> {
        if self.is_in_package(native) {
            return None;
        }
        let (mapping, rest) = self.find_native(native)?;
        let folder = paths::join(&self.vfs_root, &mapping.segment);
        Some(paths::join(&folder, rest))
    }

    /// Package VFS path -> native absolute path. `None` when `path` is not
    /// under the VFS root or names no known segment.
    pub fn devirtualize(&self, path: &str) -> Option<String> {
        let rel = self.vfs_relative(path)?;
        if rel.is_empty() {
            return None;
        }
        if let Some((mapping, rest)) = self
            .by_segment
            .iter()
            .find_map(|m| strip_path_prefix(rel, &m.segment).map(|rest| (m, rest)))
        {
            return Some(paths::join(&mapping.native, rest));
        }
        decode_drive(rel)
    }

    /// The "variable folder" of a VFS path: the folder directly under the
    /// VFS root that the path lives in (`...\VFS\AppData` for
    /// `...\VFS\AppData\Vendor\x.ini`).
    pub fn variable_folder(&self, path: &str) -> Option<String> {
        let rel = self.vfs_relative(path)?;
        let (first, _) = split_first(rel);
        if first.is_empty() {
            return None;
        }
        Some(paths::join(&self.vfs_root, first))
    }
}
