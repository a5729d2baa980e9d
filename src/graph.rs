//! Dependency graph construction and cycle detection.
//!
//! Dependency-list files (`*_deps.txt`) declare explicit ordering
//! constraints between build files. Each non-comment line is a
//! whitespace-separated precedence chain: `a b c` means a must be built
//! before b, and b before c. Constraints become index edges on the record
//! arena: the dependent's `after` set holds its prerequisites, the
//! prerequisite's `before` set holds its dependents.

use anyhow::Result;
use tracing::debug;

use crate::classify::DEPS_FILE_PRIORITY;
use crate::fs::FsProvider;
use crate::record::FileRecord;

/// Read every dependency-list record's contents and populate the
/// `after`/`before` edges of the included records they reference.
///
/// Dependency-list records are marked excluded afterwards — they never
/// appear in the build output. Must run after classification, rename
/// resolution and the baseline sort, so edges refer to final identities
/// and stable positions.
pub fn build_graph(records: &mut [FileRecord], fs: &dyn FsProvider) -> Result<()> {
    for idx in 0..records.len() {
        if records[idx].priority != DEPS_FILE_PRIORITY {
            continue;
        }
        println!(" > parse dependencies file {}", records[idx].path);
        let lines = fs.read_lines(std::path::Path::new(&records[idx].path))?;
        apply_dep_lines(records, &lines);
        records[idx].excluded = true;
    }
    Ok(())
}

/// Apply the precedence chains of one dependency-list file.
pub fn apply_dep_lines(records: &mut [FileRecord], lines: &[String]) {
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let paths: Vec<&str> = line.split_whitespace().collect();
        for pair in paths.windows(2) {
            add_constraint(records, pair[0], pair[1]);
        }
    }
}

/// Declare "`prerequisite` must be built before `dependent`".
///
/// Endpoints resolve by exact path match against included records only.
/// A dangling reference is not an error: the pair is dropped, since a
/// dependency list legitimately mentions files untouched by this diff.
fn add_constraint(records: &mut [FileRecord], prerequisite: &str, dependent: &str) {
    let Some(pre) = find_included(records, prerequisite) else {
        debug!(path = prerequisite, "dependency endpoint not in build set, dropped");
        return;
    };
    let Some(dep) = find_included(records, dependent) else {
        debug!(path = dependent, "dependency endpoint not in build set, dropped");
        return;
    };
    records[dep].after.push(pre);
    records[pre].before.push(dep);
}

fn find_included(records: &[FileRecord], path: &str) -> Option<usize> {
    records.iter().position(|r| r.priority > 0 && r.path == path)
}

/// Search the `after` adjacency for a circular constraint.
///
/// Three-color depth-first search: a back edge to a node on the active
/// path is a cycle; a node reachable twice over independent paths (a
/// diamond) is not. Returns the offending chain of paths, with the entry
/// point repeated at the end.
pub fn find_cycle(records: &[FileRecord]) -> Option<Vec<String>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    fn visit(
        records: &[FileRecord],
        marks: &mut [Mark],
        path: &mut Vec<usize>,
        idx: usize,
    ) -> Option<Vec<String>> {
        marks[idx] = Mark::InProgress;
        path.push(idx);
        for &pre in &records[idx].after {
            match marks[pre] {
                Mark::InProgress => {
                    let start = path.iter().position(|&i| i == pre).unwrap_or(0);
                    let mut chain: Vec<String> =
                        path[start..].iter().map(|&i| records[i].path.clone()).collect();
                    chain.push(records[pre].path.clone());
                    return Some(chain);
                }
                Mark::Unvisited => {
                    if let Some(chain) = visit(records, marks, path, pre) {
                        return Some(chain);
                    }
                }
                Mark::Done => {}
            }
        }
        path.pop();
        marks[idx] = Mark::Done;
        None
    }

    let mut marks = vec![Mark::Unvisited; records.len()];
    let mut path = Vec::new();
    for start in 0..records.len() {
        if marks[start] == Mark::Unvisited {
            if let Some(chain) = visit(records, &mut marks, &mut path, start) {
                return Some(chain);
            }
        }
    }
    None
}
