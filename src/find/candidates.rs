//! The five physical directories behind one logical directory query.

use serde::Serialize;
use std::fmt;

use crate::paths::{self, drive_letter, eq_ignore_case, split_last};
use crate::resolver::PathRedirector;

/// Enumeration sources, in the order they are drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Redirected,
    PackageVfs,
    AsRequested,
    Devirtualized,
    Deredirected,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Redirected,
        Phase::PackageVfs,
        Phase::AsRequested,
        Phase::Devirtualized,
        Phase::Deredirected,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Redirected => "redirected",
            Phase::PackageVfs => "package-vfs",
            Phase::AsRequested => "as-requested",
            Phase::Devirtualized => "devirtualized",
            Phase::Deredirected => "deredirected",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Candidate directories for one query plus the file-name pattern applied
/// in each. Inapplicable or duplicate candidates are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidateSet {
    pub dirs: [Option<String>; 5],
    pub pattern: String,
}

impl CandidateSet {
    /// Only the as-requested source, with the query used verbatim.
    pub fn passthrough(query: &str) -> Self {
        let (dir, pattern) = split_query(query);
        let mut dirs: [Option<String>; 5] = Default::default();
        dirs[Phase::AsRequested.index()] = Some(dir);
        Self { dirs, pattern }
    }

    /// Work out every source for `query` (`<dir>\<pattern>`).
    pub fn compute(redirector: &PathRedirector, query: &str) -> Self {
        let (dir, pattern) = split_query(query);
        let np = redirector.normalize(&dir);
        if !np.is_resolvable() {
            let mut set = Self::passthrough(query);
            set.dirs[Phase::AsRequested.index()] = Some(np.full);
            return set;
        }

        let ctx = redirector.context();
        let table = ctx.mapping_table();
        let requested = np.drive_absolute.clone();

        let redirected = ctx.decide(&np).and_then(|m| ctx.target_for(&m));
        let package_vfs = if table.is_in_package(&requested) || ctx.is_in_store(&requested) {
            None
        } else {
            table.virtualize(&requested)
        };
        let devirtualized = table.devirtualize(&requested);
        let deredirected = ctx.reverse(&requested);

        let mut dirs = [
            redirected,
            package_vfs,
            Some(requested),
            devirtualized,
            deredirected,
        ];
        // a directory reachable two ways is only walked once, at its first phase
        for i in 1..dirs.len() {
            let dup = dirs[i]
                .as_deref()
                .is_some_and(|d| dirs[..i].iter().flatten().any(|e| eq_ignore_case(e, d)));
            if dup {
                dirs[i] = None;
            }
        }
        Self { dirs, pattern }
    }

    pub fn dir(&self, phase: Phase) -> Option<&str> {
        self.dirs[phase.index()].as_deref()
    }

    /// The find pattern for `phase`, if it has a source.
    pub fn query(&self, phase: Phase) -> Option<String> {
        self.dir(phase).map(|d| paths::join(d, &self.pattern))
    }

    /// Phases with a source, in drain order.
    pub fn active(&self) -> impl Iterator<Item = (Phase, &str)> {
        Phase::ALL
            .into_iter()
            .filter_map(|p| self.dir(p).map(|d| (p, d)))
    }
}

/// Split `<dir>\<pattern>` at the last separator. A bare name means
/// "that name in the current directory"; `C:\*` keeps its drive root.
fn split_query(query: &str) -> (String, String) {
    let (dir, pattern) = split_last(query);
    let pattern = if pattern.is_empty() { "*" } else { pattern };
    let dir = if dir.is_empty() && !query.contains(paths::is_sep) {
        ".".to_string()
    } else if dir.len() == 2 && drive_letter(dir).is_some() {
        paths::join(dir, "")
    } else {
        dir.to_string()
    };
    (dir, pattern.to_string())
}
