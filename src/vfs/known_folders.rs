//! Well-known native folders and their package VFS segment names.
//! Native locations default to the standard Windows layout and are refined
//! from the usual environment variables when they are set.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::errors::RedirectError;
use crate::paths::{self, eq_ignore_case};

/// Native folders the package VFS can shadow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownFolderId {
    SystemX86,
    System,
    ProgramFilesX86,
    ProgramFilesX64,
    ProgramFilesCommonX86,
    ProgramFilesCommonX64,
    Windows,
    Fonts,
    ProgramData,
    LocalAppData,
    RoamingAppData,
    PublicDesktop,
    CommonPrograms,
    Catroot,
    Catroot2,
    DriversEtc,
    Spool,
    /// Pseudo-folder: the package installation root itself.
    Package,
}

impl KnownFolderId {
    pub const ALL: [KnownFolderId; 18] = [
        KnownFolderId::SystemX86,
        KnownFolderId::System,
        KnownFolderId::ProgramFilesX86,
        KnownFolderId::ProgramFilesX64,
        KnownFolderId::ProgramFilesCommonX86,
        KnownFolderId::ProgramFilesCommonX64,
        KnownFolderId::Windows,
        KnownFolderId::Fonts,
        KnownFolderId::ProgramData,
        KnownFolderId::LocalAppData,
        KnownFolderId::RoamingAppData,
        KnownFolderId::PublicDesktop,
        KnownFolderId::CommonPrograms,
        KnownFolderId::Catroot,
        KnownFolderId::Catroot2,
        KnownFolderId::DriversEtc,
        KnownFolderId::Spool,
        KnownFolderId::Package,
    ];

    pub fn name(self) -> &'static str {
        match self {
            KnownFolderId::SystemX86 => "SystemX86",
            KnownFolderId::System => "System",
            KnownFolderId::ProgramFilesX86 => "ProgramFilesX86",
            KnownFolderId::ProgramFilesX64 => "ProgramFilesX64",
            KnownFolderId::ProgramFilesCommonX86 => "ProgramFilesCommonX86",
            KnownFolderId::ProgramFilesCommonX64 => "ProgramFilesCommonX64",
            KnownFolderId::Windows => "Windows",
            KnownFolderId::Fonts => "Fonts",
            KnownFolderId::ProgramData => "ProgramData",
            KnownFolderId::LocalAppData => "LocalAppData",
            KnownFolderId::RoamingAppData => "RoamingAppData",
            KnownFolderId::PublicDesktop => "PublicDesktop",
            KnownFolderId::CommonPrograms => "CommonPrograms",
            KnownFolderId::Catroot => "Catroot",
            KnownFolderId::Catroot2 => "Catroot2",
            KnownFolderId::DriversEtc => "DriversEtc",
            KnownFolderId::Spool => "Spool",
            KnownFolderId::Package => "Package",
        }
    }

    /// `FOLDERID_*` GUID for ids that have one.
    pub fn guid(self) -> Option<&'static str> {
        match self {
            KnownFolderId::SystemX86 => Some("{D65231B0-B2F1-4857-A4CE-A8E7C6EA7D27}"),
            KnownFolderId::System => Some("{1AC14E77-02E7-4E5D-B744-2EB1AE5198B7}"),
            KnownFolderId::ProgramFilesX86 => Some("{7C5A40EF-A0FB-4BFC-874A-C0F2E0B9FA8E}"),
            KnownFolderId::ProgramFilesX64 => Some("{6D809377-6AF0-444B-8957-A3773F02200E}"),
            KnownFolderId::ProgramFilesCommonX86 => Some("{DE974D24-D9C6-4D3E-BF91-F4455120B917}"),
            KnownFolderId::ProgramFilesCommonX64 => Some("{6365D5A7-0F0D-45E5-87F6-0DA56B6A4F7D}"),
            KnownFolderId::Windows => Some("{F38BF404-1D43-42F2-9305-67DE0B28FC23}"),
            KnownFolderId::Fonts => Some("{FD228CB7-AE11-4AE3-864C-16F3910AB8FE}"),
            KnownFolderId::ProgramData => Some("{62AB5D82-FDC1-4DC3-A9DD-070D1D495D97}"),
            KnownFolderId::LocalAppData => Some("{F1B32785-6FBA-4FCF-9D55-7B8E7F157091}"),
            KnownFolderId::RoamingAppData => Some("{3EB685DB-65F9-4CF6-A03A-E3EF65729F3D}"),
            KnownFolderId::PublicDesktop => Some("{C4AA340D-F20F-4863-AFEF-F87EF2E6BA25}"),
            KnownFolderId::CommonPrograms => Some("{0139D44E-6AFE-49F2-8690-3DAFCAE6FFB8}"),
            _ => None,
        }
    }

    /// Folder name under the package VFS root that shadows this folder.
    pub fn vfs_segment(self) -> Option<&'static str> {
        match self {
            KnownFolderId::SystemX86 => Some("SystemX86"),
            KnownFolderId::System => Some("SystemX64"),
            KnownFolderId::ProgramFilesX86 => Some("ProgramFilesX86"),
            KnownFolderId::ProgramFilesX64 => Some("ProgramFilesX64"),
            KnownFolderId::ProgramFilesCommonX86 => Some("ProgramFilesCommonX86"),
            KnownFolderId::ProgramFilesCommonX64 => Some("ProgramFilesCommonX64"),
            KnownFolderId::Windows => Some("Windows"),
            KnownFolderId::Fonts => Some("Fonts"),
            KnownFolderId::ProgramData => Some("Common AppData"),
            KnownFolderId::LocalAppData => Some("Local AppData"),
            KnownFolderId::RoamingAppData => Some("AppData"),
            KnownFolderId::PublicDesktop => Some("Common Desktop"),
            KnownFolderId::CommonPrograms => Some("Common Programs"),
            KnownFolderId::Catroot => Some("AppVSystem32Catroot"),
            KnownFolderId::Catroot2 => Some("AppVSystem32Catroot2"),
            KnownFolderId::DriversEtc => Some("AppVSystem32DriversEtc"),
            KnownFolderId::Spool => Some("AppVSystem32Spool"),
            KnownFolderId::Package => None,
        }
    }
}

impl fmt::Display for KnownFolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KnownFolderId {
    type Err = RedirectError;

    /// Accepts the folder name or its `FOLDERID_*` GUID (braces optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bare = s.trim_start_matches('{').trim_end_matches('}');
        KnownFolderId::ALL
            .into_iter()
            .find(|id| {
                eq_ignore_case(id.name(), s)
                    || id
                        .guid()
                        .is_some_and(|g| eq_ignore_case(&g[1..g.len() - 1], bare))
            })
            .ok_or_else(|| RedirectError::UnknownKnownFolder(s.to_string()))
    }
}

/// Native locations of the known folders on this system.
#[derive(Debug, Clone, Default)]
pub struct KnownFolders {
    paths: HashMap<KnownFolderId, String>,
}

impl KnownFolders {
    /// An empty set; populate with `set`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard 64-bit Windows layout on `system_drive` (e.g. `C:`), with
    /// per-user folders under `user_profile`.
    pub fn standard(system_drive: &str, user_profile: &str) -> Self {
        let drive = paths::trim_trailing_sep(system_drive);
        let root = paths::join(drive, "");
        let windows = paths::join(&root, "Windows");
        let system = paths::join(&windows, "System32");
        let pf = paths::join(&root, "Program Files");
        let pf86 = paths::join(&root, "Program Files (x86)");
        let program_data = paths::join(&root, "ProgramData");
        let public = paths::join(&root, r"Users\Public");

        let mut kf = Self::new();
        kf.set(KnownFolderId::SystemX86, paths::join(&windows, "SysWOW64"));
        kf.set(KnownFolderId::System, system.clone());
        kf.set(KnownFolderId::ProgramFilesX86, pf86.clone());
        kf.set(KnownFolderId::ProgramFilesX64, pf.clone());
        kf.set(KnownFolderId::ProgramFilesCommonX86, paths::join(&pf86, "Common Files"));
        kf.set(KnownFolderId::ProgramFilesCommonX64, paths::join(&pf, "Common Files"));
        kf.set(KnownFolderId::Windows, windows.clone());
        kf.set(KnownFolderId::Fonts, paths::join(&windows, "Fonts"));
        kf.set(KnownFolderId::ProgramData, program_data.clone());
        kf.set(KnownFolderId::LocalAppData, paths::join(user_profile, r"AppData\Local"));
        kf.set(KnownFolderId::RoamingAppData, paths::join(user_profile, r"AppData\Roaming"));
        kf.set(KnownFolderId::PublicDesktop, paths::join(&public, "Desktop"));
        kf.set(
            KnownFolderId::CommonPrograms,
            paths::join(&program_data, r"Microsoft\Windows\Start Menu\Programs"),
        );
        kf.set(KnownFolderId::Catroot, paths::join(&system, "catroot"));
        kf.set(KnownFolderId::Catroot2, paths::join(&system, "catroot2"));
        kf.set(KnownFolderId::DriversEtc, paths::join(&system, r"drivers\etc"));
        kf.set(KnownFolderId::Spool, paths::join(&system, "spool"));
        kf
    }

    /// Standard layout refined from `SystemDrive`, `windir`, `ProgramFiles`,
    /// `ProgramFiles(x86)`, `ProgramData`, `APPDATA`, `LOCALAPPDATA`, `PUBLIC`.
    pub fn from_env() -> Self {
        let var = |k: &str| env::var(k).ok().filter(|v| paths::drive_letter(v).is_some());
        let drive = env::var("SystemDrive").unwrap_or_else(|_| "C:".to_string());
        let profile = var("USERPROFILE")
            .unwrap_or_else(|| paths::join(&drive, r"Users\Default"));
        let mut kf = Self::standard(&drive, &profile);

        if let Some(windir) = var("windir") {
            let system = paths::join(&windir, "System32");
            kf.set(KnownFolderId::Windows, windir.clone());
            kf.set(KnownFolderId::SystemX86, paths::join(&windir, "SysWOW64"));
            kf.set(KnownFolderId::Fonts, paths::join(&windir, "Fonts"));
            kf.set(KnownFolderId::Catroot, paths::join(&system, "catroot"));
            kf.set(KnownFolderId::Catroot2, paths::join(&system, "catroot2"));
            kf.set(KnownFolderId::DriversEtc, paths::join(&system, r"drivers\etc"));
            kf.set(KnownFolderId::Spool, paths::join(&system, "spool"));
            kf.set(KnownFolderId::System, system);
        }
        if let Some(pf) = var("ProgramFiles") {
            kf.set(KnownFolderId::ProgramFilesCommonX64, paths::join(&pf, "Common Files"));
            kf.set(KnownFolderId::ProgramFilesX64, pf);
        }
        if let Some(pf86) = var("ProgramFiles(x86)") {
            kf.set(KnownFolderId::ProgramFilesCommonX86, paths::join(&pf86, "Common Files"));
            kf.set(KnownFolderId::ProgramFilesX86, pf86);
        }
        if let Some(pd) = var("ProgramData") {
            kf.set(
                KnownFolderId::CommonPrograms,
                paths::join(&pd, r"Microsoft\Windows\Start Menu\Programs"),
            );
            kf.set(KnownFolderId::ProgramData, pd);
        }
        if let Some(roaming) = var("APPDATA") {
            kf.set(KnownFolderId::RoamingAppData, roaming);
        }
        if let Some(local) = var("LOCALAPPDATA") {
            kf.set(KnownFolderId::LocalAppData, local);
        }
        if let Some(public) = var("PUBLIC") {
            kf.set(KnownFolderId::PublicDesktop, paths::join(&public, "Desktop"));
        }
        kf
    }

    pub fn set(&mut self, id: KnownFolderId, native: impl Into<String>) {
        let native: String = native.into();
        self.paths
            .insert(id, paths::trim_trailing_sep(&native).to_string());
    }

    pub fn get(&self, id: KnownFolderId) -> Option<&str> {
        self.paths.get(&id).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (KnownFolderId, &str)> {
        self.paths.iter().map(|(id, p)| (*id, p.as_str()))
    }
}
