//! Application orchestrator.
//! Builds the package layout and rules from flags/env/config, initializes logging,
//! constructs the resolver, and runs the requested primitive.

use anyhow::{Context, Result};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};
use vfs_redirect::output as out;

use vfs_redirect::cli::{self, Args, Command};
use vfs_redirect::config::{CONFIG_ENV, FAMILY_NAME_ENV, LOCAL_APP_DATA_ENV, PACKAGE_ROOT_ENV};
use vfs_redirect::{
    CandidateSet, EnumerationCursor, FileSystem, FindError, HostFs, KnownFolders, LogLevel,
    PackageLayout, PathRedirector, RedirectError, default_config_path, load_or_default, platform,
};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config before logging init
    if args.print_config {
        print_config_location(&args);
        return Ok(());
    }

    let Some(command) = args.command.clone() else {
        anyhow::bail!("No command given. Try `vfs_redirect --help`.");
    };

    let level = args.effective_log_level().unwrap_or(LogLevel::Normal);
    let _guard = init_tracing(&level, args.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {}", e));
        e
    })?;
    debug!("Starting vfs_redirect: {:?}", args);

    let redirector = build_redirector(&args).map_err(|e| {
        if let Some(re) = e.downcast_ref::<RedirectError>() {
            error!(code = re.code(), error = %re, "Invalid redirection setup");
        } else {
            error!(error = ?e, "Failed to set up the resolver");
        }
        e
    })?;

    match command {
        Command::Resolve {
            path,
            copy,
            ensure_dirs,
            check_presence,
        } => {
            let flags = cli::resolve_flags(copy, ensure_dirs, check_presence);
            let decision = redirector.redirect(&path, flags);
            if args.json {
                out::print_json(&json!({ "path": path, "decision": decision }))?;
            } else {
                out::print_decision(&path, &decision);
            }
        }
        Command::Virtualize { path } => {
            print_mapping(args.json, "virtualize", &path, redirector.virtualize(&path))?
        }
        Command::Devirtualize { path } => {
            print_mapping(args.json, "devirtualize", &path, redirector.devirtualize(&path))?
        }
        Command::Reverse { path } => {
            print_mapping(args.json, "reverse", &path, redirector.reverse(&path))?
        }
        Command::List { query } => list(&redirector, &cli::list_query(&query), args.json)?,
        Command::Candidates { query } => {
            let query = cli::list_query(&query);
            let set = CandidateSet::compute(&redirector, &query);
            if args.json {
                let dirs: Vec<_> = set
                    .active()
                    .map(|(phase, dir)| json!({ "phase": phase, "dir": dir }))
                    .collect();
                out::print_json(&json!({ "query": query, "pattern": set.pattern, "sources": dirs }))?;
            } else {
                out::print_sources(&set);
            }
        }
    }
    Ok(())
}

fn print_config_location(args: &Args) {
    if let Some(p) = &args.config {
        out::print_info(&format!("Using --config (explicit):\n  {}\n", p.display()));
        return;
    }
    if let Ok(cfg_env) = std::env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {}\n", cfg_env));
        out::print_info(&format!(
            "To override, unset {CONFIG_ENV} or set it to another file."
        ));
        return;
    }
    match default_config_path() {
        Some(p) => {
            out::print_info(&format!("Default vfs_redirect config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet; no paths will be redirected.");
            }
        }
        None => out::print_error("Could not determine a default config path."),
    }
}

fn build_redirector(args: &Args) -> Result<PathRedirector> {
    let package_root = args
        .package_root
        .clone()
        .with_context(|| format!("--package-root (or {PACKAGE_ROOT_ENV}) is required"))?;
    let family_name = args
        .family_name
        .clone()
        .with_context(|| format!("--family-name (or {FAMILY_NAME_ENV}) is required"))?;
    let local_app_data = args
        .local_app_data
        .clone()
        .with_context(|| format!("--local-app-data (or {LOCAL_APP_DATA_ENV}) is required"))?;

    let mut layout = PackageLayout::new(package_root, family_name, local_app_data);
    if let Some(cwd) = &args.current_dir {
        layout = layout.with_current_dir(cwd.clone());
    }
    let config = load_or_default(args.config.as_deref())?;

    let fs: Arc<dyn FileSystem> = match &args.host_root {
        Some(root) => {
            debug!(root = %root.display(), "Serving paths from a rooted host tree");
            Arc::new(HostFs::rooted(root))
        }
        None => platform::native(),
    };

    Ok(PathRedirector::new(
        layout,
        &KnownFolders::from_env(),
        &config,
        fs,
    )?)
}

fn print_mapping(json: bool, op: &str, path: &str, mapped: Option<String>) -> Result<()> {
    if json {
        return out::print_json(&json!({ "op": op, "path": path, "result": mapped }));
    }
    out::print_mapping(op, path, mapped.as_deref());
    Ok(())
}

fn list(redirector: &PathRedirector, query: &str, json: bool) -> Result<()> {
    let mut rows = Vec::new();
    match EnumerationCursor::open(redirector, query) {
        Ok((mut cursor, first)) => {
            let mut entry = Some(first);
            while let Some(e) = entry {
                rows.push(e);
                entry = match cursor.next_entry() {
                    Ok(next) => Some(next),
                    Err(FindError::NoMoreFiles) => None,
                    Err(err) => {
                        out::print_warn(&format!("Enumeration stopped early: {err}"));
                        None
                    }
                };
            }
        }
        Err(FindError::FileNotFound) => {}
        Err(e) => return Err(e).with_context(|| format!("Cannot enumerate {query}")),
    }

    if json {
        let entries: Vec<_> = rows
            .iter()
            .map(|e| {
                json!({
                    "name": e.data.file_name,
                    "phase": e.phase,
                    "directory": e.data.is_directory(),
                    "size": e.data.file_size,
                })
            })
            .collect();
        return out::print_json(&json!({ "query": query, "entries": entries }));
    }
    out::print_listing(query, &rows);
    Ok(())
}
