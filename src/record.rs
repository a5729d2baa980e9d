//! Changed-file records parsed from `git diff --name-status` output.
//!
//! A [`FileRecord`] is created once per diff entry and mutated in place by
//! each pipeline stage: the classifier assigns a priority, rename resolution
//! rewrites paths, the graph builder populates `after`/`before` edges, and
//! the sequencer flips `excluded` as records are consumed. Records are never
//! removed from the collection — edges are arena indices and must stay
//! stable, so "removal" is always `excluded = true` / `priority <= 0`.

use crate::classify::Classifier;

/// How a path changed between the two revisions of a diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeMode {
    Added,
    Modified,
    Deleted,
    /// Rename carrying a similarity percentage; 100 is a pure rename.
    Renamed { similarity: u32 },
    /// Any other status code (copies, type changes, unmerged, ...).
    Other,
}

impl ChangeMode {
    /// Parse a raw `--name-status` code such as `"A"`, `"D"` or `"R100"`.
    pub fn parse(code: &str) -> Self {
        match code {
            "A" => Self::Added,
            "M" => Self::Modified,
            "D" => Self::Deleted,
            _ if code.starts_with('R') => Self::Renamed {
                similarity: code[1..].parse().unwrap_or(0),
            },
            _ => Self::Other,
        }
    }
}

/// One changed-file entry flowing through the build pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    pub mode: ChangeMode,
    /// Raw status code as git printed it (`"A"`, `"M"`, `"R100"`, ...).
    /// Kept verbatim because mask rules match against it with a regex.
    pub code: String,
    /// Path as reported by the diff; rewritten by rename resolution.
    pub path: String,
    /// Rename target, present only for renamed entries.
    pub renamed_to: Option<String>,
    /// Signed build priority. `<= 0` excludes the record from the build:
    /// -1 unrecognized, -2 deleted/renamed, -3 dependency-list file.
    pub priority: i32,
    /// True once the record must not be reconsidered — set at classification
    /// for excluded records, at consumption for built ones.
    pub excluded: bool,
    /// Indices of records that must be consumed before this one.
    pub after: Vec<usize>,
    /// Indices of records that must be consumed after this one.
    pub before: Vec<usize>,
}

impl FileRecord {
    /// Build an unclassified record from a raw mode code and path.
    pub fn new(code: &str, path: &str) -> Self {
        Self {
            mode: ChangeMode::parse(code),
            code: code.to_owned(),
            path: path.to_owned(),
            renamed_to: None,
            priority: -1,
            excluded: false,
            after: Vec::new(),
            before: Vec::new(),
        }
    }

    /// Parse one `mode<TAB>path[<TAB>newPath]` diff line.
    ///
    /// Returns `None` for empty or malformed lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end();
        if line.is_empty() {
            return None;
        }
        let mut parts = line.split('\t');
        let code = parts.next()?;
        let path = parts.next()?;
        let mut rec = Self::new(code, path);
        rec.renamed_to = parts.next().map(str::to_owned);
        Some(rec)
    }

    /// Path with any directory prefix stripped.
    pub fn base_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// A rename with 100% similarity: the content moved, nothing changed.
    pub fn is_pure_rename(&self) -> bool {
        matches!(self.mode, ChangeMode::Renamed { similarity: 100 })
    }
}

/// Parse, classify and order a raw diff listing.
///
/// Produces the record arena in baseline order: classified records, rename
/// aliases resolved, sorted by `(priority, path)`. All dependency edges
/// added later refer to positions in this final order.
pub fn mark_records(lines: &[String], classifier: &Classifier) -> Vec<FileRecord> {
    let mut records: Vec<FileRecord> = lines.iter().filter_map(|l| FileRecord::parse(l)).collect();
    for rec in &mut records {
        classifier.classify(rec);
    }
    resolve_renames(&mut records);
    records.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.path.cmp(&b.path)));
    records
}

/// Rewrite path references for every pure rename in the collection.
///
/// Any other record still pointing at the pre-rename path (a duplicate diff
/// entry, or a dependency-list endpoint resolved later) is redirected to the
/// file's current name. The rename record itself keeps its original path —
/// it only carries the rewrite rule and never enters the build. Idempotent.
pub fn resolve_renames(records: &mut [FileRecord]) {
    for i in 0..records.len() {
        if !(records[i].is_pure_rename() && records[i].priority == -2) {
            continue;
        }
        let Some(target) = records[i].renamed_to.clone() else {
            continue;
        };
        let from = records[i].path.clone();
        for rec in records.iter_mut() {
            if !rec.is_pure_rename() && rec.path == from {
                rec.path.clone_from(&target);
            }
        }
    }
}
