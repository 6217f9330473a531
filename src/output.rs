//! Console rendering for the diagnostic binary.
//!
//! Results (decisions, mappings, listings) go to stdout as plain lines so
//! they can be scripted against. Warnings and errors go to stderr. Styling
//! is applied only when the stream it lands on is a terminal.

use owo_colors::OwoColorize;
use serde::Serialize;

use crate::find::{CandidateSet, MergedEntry};
use crate::redirect::RedirectDecision;

#[derive(Clone, Copy)]
enum Note {
    Info,
    Warn,
    Error,
}

fn note(kind: Note, msg: &str) {
    match kind {
        Note::Info if atty::is(atty::Stream::Stdout) => println!("{} {msg}", "info:".cyan().bold()),
        Note::Info => println!("info: {msg}"),
        Note::Warn if atty::is(atty::Stream::Stderr) => eprintln!("{} {msg}", "warn:".yellow().bold()),
        Note::Warn => eprintln!("warn: {msg}"),
        Note::Error if atty::is(atty::Stream::Stderr) => eprintln!("{} {msg}", "error:".red().bold()),
        Note::Error => eprintln!("error: {msg}"),
    }
}

pub fn print_info(msg: &str) {
    note(Note::Info, msg);
}

pub fn print_warn(msg: &str) {
    note(Note::Warn, msg);
}

pub fn print_error(msg: &str) {
    note(Note::Error, msg);
}

/// `label: value` with labels padded so a block lines up.
fn field(label: &str, value: &str) {
    let label = format!("{label}:");
    if atty::is(atty::Stream::Stdout) {
        println!("{:<16} {value}", label.dimmed());
    } else {
        println!("{label:<16} {value}");
    }
}

/// The outcome of one `redirect` call.
pub fn print_decision(path: &str, decision: &RedirectDecision) {
    field("path", path);
    field("redirect", if decision.should_redirect() { "yes" } else { "no" });
    field("target", decision.redirect_path().unwrap_or("-"));
    field("read-only", if decision.read_only() { "yes" } else { "no" });
}

/// A virtualize/devirtualize/reverse result. Unmapped paths get a note
/// instead of an empty line.
pub fn print_mapping(op: &str, path: &str, mapped: Option<&str>) {
    match mapped {
        Some(m) => println!("{m}"),
        None => print_info(&format!("{op}: no mapping for {path}")),
    }
}

/// Source directories of a merged find, in drain order.
pub fn print_sources(set: &CandidateSet) {
    for (phase, dir) in set.active() {
        field(phase.name(), dir);
    }
}

/// One line per merged entry: the phase it came from, then its name.
/// Directories end in `\`.
pub fn print_listing(query: &str, entries: &[MergedEntry]) {
    if entries.is_empty() {
        print_info(&format!("No entries match {query}"));
        return;
    }
    let tty = atty::is(atty::Stream::Stdout);
    for e in entries {
        let slash = if e.data.is_directory() { r"\" } else { "" };
        let phase = format!("{:<14}", e.phase.name());
        if tty {
            println!("{} {}{slash}", phase.dimmed(), e.data.file_name);
        } else {
            println!("{phase} {}{slash}", e.data.file_name);
        }
    }
}

/// One pretty-printed JSON document on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
