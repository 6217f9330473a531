//! CLI definition and parsing.
//! Defines Args (global flags + one subcommand per resolver primitive) and parse().
//!
//! Notes:
//! - Package identity flags fall back to VFS_REDIRECT_PACKAGE_ROOT,
//!   VFS_REDIRECT_FAMILY_NAME and LOCALAPPDATA.
//! - --debug is a shorthand for --log-level debug; --log-level falls back to
//!   VFS_REDIRECT_LOG_LEVEL.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::config::types::LogLevel;
use crate::redirect::RedirectFlags;

/// Diagnostic front end for the vfs_redirect resolver.
/// Runs one primitive against a package layout and prints the result.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Inspect path virtualization and write redirection for a package"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Redirection rules (JSON). Falls back to VFS_REDIRECT_CONFIG, then the default location.
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Read-only package installation root.
    #[arg(long, global = true, env = "VFS_REDIRECT_PACKAGE_ROOT")]
    pub package_root: Option<String>,

    /// Package family name (identity without version).
    #[arg(long, global = true, env = "VFS_REDIRECT_FAMILY_NAME")]
    pub family_name: Option<String>,

    /// The user's LocalAppData folder; the writable stores live under it.
    #[arg(long, global = true, env = "LOCALAPPDATA")]
    pub local_app_data: Option<String>,

    /// Serve `C:\...` paths from `<DIR>/C/...` instead of the real filesystem.
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub host_root: Option<PathBuf>,

    /// Directory relative inputs resolve against.
    #[arg(long, global = true)]
    pub current_dir: Option<String>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        global = true,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(
        long,
        global = true,
        env = "VFS_REDIRECT_LOG_LEVEL",
        help = "Set log level: quiet, normal, info, debug"
    )]
    pub log_level: Option<LogLevel>,

    /// Also write logs to this file.
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Print results (and logs) as JSON.
    #[arg(long, global = true, help = "Emit results and logs as JSON")]
    pub json: bool,

    /// Print where vfs_redirect will look for the config file, then exit.
    #[arg(long, help = "Print the config file location used by vfs_redirect and exit")]
    pub print_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Decide whether PATH is redirected and print the target.
    Resolve {
        #[arg(value_name = "PATH")]
        path: String,
        /// Copy the package or native file into the store on first access.
        #[arg(long)]
        copy: bool,
        /// Create the target's parent directories.
        #[arg(long)]
        ensure_dirs: bool,
        /// Only redirect when the target exists afterwards.
        #[arg(long)]
        check_presence: bool,
    },
    /// Print the package VFS spelling of a native PATH.
    Virtualize {
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Print the native spelling of a package VFS PATH.
    Devirtualize {
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Map a writable-store PATH back to its package location.
    Reverse {
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Run a merged enumeration and print each entry with its source.
    List {
        #[arg(value_name = "DIR_OR_PATTERN")]
        query: String,
    },
    /// Print the candidate directories a merged enumeration would walk.
    Candidates {
        #[arg(value_name = "DIR_OR_PATTERN")]
        query: String,
    },
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use the default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.clone()
    }
}

/// Flags for `resolve` in resolver terms.
pub fn resolve_flags(copy: bool, ensure_dirs: bool, check_presence: bool) -> RedirectFlags {
    let mut flags = RedirectFlags::empty();
    flags.set(RedirectFlags::COPY_ON_FIRST_ACCESS, copy);
    flags.set(RedirectFlags::ENSURE_DIRECTORY_STRUCTURE, ensure_dirs);
    flags.set(RedirectFlags::CHECK_FILE_PRESENCE, check_presence);
    flags
}

/// A bare directory lists everything in it; anything with a wildcard is
/// taken as a find pattern.
pub fn list_query(input: &str) -> String {
    let trimmed = input.trim_end_matches(['\\', '/']);
    if trimmed.contains(['*', '?']) {
        trimmed.to_string()
    } else if trimmed.is_empty() {
        format!("{input}*")
    } else {
        format!(r"{trimmed}\*")
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_wins_over_log_level() {
        let args = Args::parse_from(["vfs_redirect", "--log-level", "quiet", "-d", "virtualize", "x"]);
        assert_eq!(args.effective_log_level(), Some(LogLevel::Debug));
        let args = Args::parse_from(["vfs_redirect", "reverse", "x", "--log-level", "info"]);
        assert_eq!(args.effective_log_level(), Some(LogLevel::Info));
    }

    #[test]
    fn unknown_log_level_is_a_usage_error() {
        let err = Args::try_parse_from(["vfs_redirect", "--log-level", "loud", "reverse", "x"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn resolve_flags_map_one_to_one() {
        assert_eq!(resolve_flags(false, false, false), RedirectFlags::empty());
        let f = resolve_flags(true, false, true);
        assert!(f.contains(RedirectFlags::COPY_ON_FIRST_ACCESS | RedirectFlags::CHECK_FILE_PRESENCE));
        assert!(!f.contains(RedirectFlags::ENSURE_DIRECTORY_STRUCTURE));
    }

    #[test]
    fn list_query_forms() {
        assert_eq!(list_query(r"C:\data"), r"C:\data\*");
        assert_eq!(list_query(r"C:\data\"), r"C:\data\*");
        assert_eq!(list_query(r"C:\data\*.ini"), r"C:\data\*.ini");
        assert_eq!(list_query(r"C:\"), r"C:\*");
    }
}
