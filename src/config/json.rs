//! JSON configuration support.
//! - Parses the `redirectedPaths` fixup document (serde_json).
//! - Accepts the bare document or one wrapped as `{"config": {...}}`.
//! - Resolves the config location from VFS_REDIRECT_CONFIG or the platform default.
//!
//! Notes:
//! - Unknown fields inside rule objects are rejected to surface typos early.
//! - Pattern compilation happens later, when the spec table is built.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::paths::default_config_path;
use super::types::MissingInPackagePolicy;
use crate::errors::RedirectError;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "VFS_REDIRECT_CONFIG";

/// Top-level redirection document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectionConfig {
    #[serde(default)]
    pub redirected_paths: RedirectedPaths,
    #[serde(default)]
    pub missing_in_package: MissingInPackagePolicy,
}

/// The three rule anchors, each an ordered list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RedirectedPaths {
    #[serde(default)]
    pub package_relative: Vec<RelativePathEntry>,
    #[serde(default)]
    pub package_drive_relative: Vec<RelativePathEntry>,
    #[serde(default)]
    pub known_folders: Vec<KnownFolderEntry>,
}

/// A base (relative to its anchor) plus the patterns matched below it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RelativePathEntry {
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub patterns: Vec<PatternEntry>,
    #[serde(default)]
    pub redirect_target_base: Option<String>,
    #[serde(default)]
    pub is_exclusion: bool,
    #[serde(default)]
    pub is_read_only: bool,
}

/// A pattern, optionally carrying its own modifiers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PatternEntry {
    Plain(String),
    #[serde(rename_all = "camelCase")]
    Detailed {
        pattern: String,
        #[serde(default)]
        is_exclusion: Option<bool>,
        #[serde(default)]
        is_read_only: Option<bool>,
    },
}

impl PatternEntry {
    pub fn pattern(&self) -> &str {
        match self {
            PatternEntry::Plain(p) => p,
            PatternEntry::Detailed { pattern, .. } => pattern,
        }
    }

    /// Effective (exclusion, read-only) given the owning entry's defaults.
    pub fn modifiers(&self, entry: &RelativePathEntry) -> (bool, bool) {
        match self {
            PatternEntry::Plain(_) => (entry.is_exclusion, entry.is_read_only),
            PatternEntry::Detailed {
                is_exclusion,
                is_read_only,
                ..
            } => (
                is_exclusion.unwrap_or(entry.is_exclusion),
                is_read_only.unwrap_or(entry.is_read_only),
            ),
        }
    }
}

/// Rules anchored at a known folder. `base`/`patterns` directly on the
/// entry are shorthand for a single relative path.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KnownFolderEntry {
    pub id: String,
    #[serde(default)]
    pub relative_paths: Vec<RelativePathEntry>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub patterns: Vec<PatternEntry>,
    #[serde(default)]
    pub redirect_target_base: Option<String>,
    #[serde(default)]
    pub is_exclusion: bool,
    #[serde(default)]
    pub is_read_only: bool,
}

impl KnownFolderEntry {
    /// All relative paths of this entry in declaration order.
    pub fn entries(&self) -> Vec<RelativePathEntry> {
        let mut out = Vec::with_capacity(self.relative_paths.len() + 1);
        if self.base.is_some() || !self.patterns.is_empty() {
            out.push(RelativePathEntry {
                base: self.base.clone().unwrap_or_default(),
                patterns: self.patterns.clone(),
                redirect_target_base: self.redirect_target_base.clone(),
                is_exclusion: self.is_exclusion,
                is_read_only: self.is_read_only,
            });
        }
        out.extend(self.relative_paths.iter().cloned());
        out
    }
}

/// Parse a config document from text.
pub fn parse_redirection_config(text: &str) -> Result<RedirectionConfig, RedirectError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| RedirectError::MalformedConfig(e.to_string()))?;
    let doc = match value {
        serde_json::Value::Object(mut map) if map.contains_key("config") && !map.contains_key("redirectedPaths") => {
            map.remove("config").unwrap_or_default()
        }
        other => other,
    };
    if !doc.is_object() {
        return Err(RedirectError::MalformedConfig(
            "expected a JSON object at the top level".into(),
        ));
    }
    serde_json::from_value(doc).map_err(|e| RedirectError::MalformedConfig(e.to_string()))
}

/// Load a config document from a file path.
pub fn load_redirection_config(path: &Path) -> Result<RedirectionConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read redirection config '{}'", path.display()))?;
    let cfg = parse_redirection_config(&text)
        .with_context(|| format!("parse redirection config '{}'", path.display()))?;
    debug!(
        path = %path.display(),
        package_relative = cfg.redirected_paths.package_relative.len(),
        package_drive_relative = cfg.redirected_paths.package_drive_relative.len(),
        known_folders = cfg.redirected_paths.known_folders.len(),
        "Loaded redirection config"
    );
    Ok(cfg)
}

/// Pick the config file: explicit path, else VFS_REDIRECT_CONFIG, else the
/// platform default. Relative env values resolve against the current dir.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    if let Some(p) = env::var_os(CONFIG_ENV) {
        let p = PathBuf::from(p);
        if p.is_relative()
            && let Ok(cwd) = env::current_dir()
        {
            return Some(cwd.join(p));
        }
        return Some(p);
    }
    default_config_path()
}

/// Load whichever config `resolve_config_path` selects. A missing default
/// file means "no rules"; a missing explicit file is an error.
pub fn load_or_default(explicit: Option<&Path>) -> Result<RedirectionConfig> {
    let explicit_given = explicit.is_some() || env::var_os(CONFIG_ENV).is_some();
    match resolve_config_path(explicit) {
        Some(path) if path.exists() => load_redirection_config(&path),
        Some(path) if explicit_given => {
            anyhow::bail!("Redirection config not found: {}", path.display())
        }
        Some(path) => {
            info!(path = %path.display(), "No redirection config; no paths will be redirected");
            Ok(RedirectionConfig::default())
        }
        None => Ok(RedirectionConfig::default()),
    }
}
