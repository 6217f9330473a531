//! EnumerationCursor: one merged find across the candidate directories.
//!
//! Opening starts a per-directory find on every active phase. Entries are
//! then drained phase by phase in fixed priority; a file whose name was
//! already returned (compared case-insensitively) is skipped. Directories
//! are merged views and come back from every source that holds them, except
//! `.` and `..`, which are returned once. Exhausted scans are dropped, which
//! closes them.

use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, trace, warn};

use super::candidates::{CandidateSet, Phase};
use crate::errors::FindError;
use crate::paths::fold_case;
use crate::platform::{DirectoryScan, FileSystem, FindData};
use crate::redirect::ReentrancyGuard;
use crate::resolver::PathRedirector;

/// One entry of a merged enumeration and the source it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedEntry {
    pub phase: Phase,
    pub data: FindData,
}

#[derive(Default)]
struct Source {
    first: Option<FindData>,
    scan: Option<Box<dyn DirectoryScan>>,
}

/// Exclusive, per-caller enumeration state.
pub struct EnumerationCursor {
    query: String,
    candidates: CandidateSet,
    sources: [Source; 5],
    phase: usize,
    seen: HashSet<String>,
}

impl fmt::Debug for EnumerationCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumerationCursor")
            .field("query", &self.query)
            .field("phase", &Phase::ALL.get(self.phase))
            .field("seen", &self.seen.len())
            .finish()
    }
}

impl EnumerationCursor {
    /// Begin a merged enumeration of `query` (`<dir>\<pattern>`) and return
    /// its first entry.
    ///
    /// When nothing matches anywhere the error is `FileNotFound` if any
    /// source directory exists, else the first error other than
    /// `PathNotFound`, else `PathNotFound`.
    pub fn open(redirector: &PathRedirector, query: &str) -> Result<(Self, MergedEntry), FindError> {
        let fs = redirector.filesystem().as_ref();
        let Some(_guard) = ReentrancyGuard::try_acquire() else {
            trace!(query = %query, "Nested find; as-requested only");
            return Self::open_with(fs, query, CandidateSet::passthrough(query));
        };
        let candidates = match panic::catch_unwind(AssertUnwindSafe(|| CandidateSet::compute(redirector, query))) {
            Ok(set) => set,
            Err(_) => {
                warn!(query = %query, "Computing find sources panicked; as-requested only");
                CandidateSet::passthrough(query)
            }
        };
        Self::open_with(fs, query, candidates)
    }

    /// Open over an explicit candidate set.
    pub fn open_with(
        fs: &dyn FileSystem,
        query: &str,
        candidates: CandidateSet,
    ) -> Result<(Self, MergedEntry), FindError> {
        let mut sources: [Source; 5] = Default::default();
        let mut dir_existed = false;
        let mut first_error: Option<FindError> = None;

        for phase in Phase::ALL {
            let Some(pattern) = candidates.query(phase) else {
                continue;
            };
            match fs.find_first(&pattern) {
                Ok((first, scan)) => {
                    trace!(phase = %phase, pattern = %pattern, "Opened find source");
                    sources[phase.index()] = Source {
                        first: Some(first),
                        scan: Some(scan),
                    };
                }
                Err(FindError::FileNotFound) => dir_existed = true,
                Err(FindError::PathNotFound) => {}
                Err(e) => {
                    debug!(phase = %phase, pattern = %pattern, error = %e, "Find source failed to open");
                    first_error.get_or_insert(e);
                }
            }
        }

        let mut cursor = Self {
            query: query.to_string(),
            candidates,
            sources,
            phase: 0,
            seen: HashSet::new(),
        };
        match cursor.next_entry() {
            Ok(entry) => Ok((cursor, entry)),
            Err(_) => {
                let err = if dir_existed {
                    FindError::FileNotFound
                } else {
                    first_error.unwrap_or(FindError::PathNotFound)
                };
                debug!(query = %query, error = %err, "Merged find matched nothing");
                Err(err)
            }
        }
    }

    /// Next entry not yet returned, or `NoMoreFiles` once every source is
    /// drained.
    pub fn next_entry(&mut self) -> Result<MergedEntry, FindError> {
        while let Some(&phase) = Phase::ALL.get(self.phase) {
            let source = &mut self.sources[phase.index()];
            let next = match source.first.take() {
                Some(first) => Some(first),
                None => match source.scan.as_mut().map(|s| s.next_entry()) {
                    Some(Ok(data)) => Some(data),
                    Some(Err(FindError::NoMoreFiles)) | None => None,
                    Some(Err(e)) => {
                        warn!(query = %self.query, phase = %phase, error = %e, "Find source failed; skipping rest");
                        None
                    }
                },
            };
            let Some(data) = next else {
                source.scan = None;
                self.phase += 1;
                continue;
            };
            let merged_dir = data.is_directory() && !data.is_dot_entry();
            if self.seen.insert(fold_case(&data.file_name)) || merged_dir {
                return Ok(MergedEntry { phase, data });
            }
            trace!(name = %data.file_name, phase = %phase, "Skipping name already returned");
        }
        Err(FindError::NoMoreFiles)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }
}
