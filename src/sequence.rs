//! Deterministic build ordering.
//!
//! The sequencer walks the baseline-ordered record arena in repeated passes,
//! consuming every ready record it meets. Baseline order (priority, then
//! path) is the primary signal; `after` edges are hard constraints. When
//! consuming a record unblocks a dependent that sits *earlier* in baseline
//! order, the pass restarts from the top so the dependent is picked up
//! promptly instead of drifting to the tail of the sequence. This restart
//! rule is observable in the output numbering and is deliberate — it biases
//! the result toward the baseline order rather than plain topological
//! append order.

use std::collections::HashSet;

use crate::record::FileRecord;

/// Consume the included records and return their arena indices in final
/// build order.
///
/// Duplicate diff entries for the same path collapse to a single build
/// action: only the first ready record per path is emitted. A record
/// skipped by dedup is left unconsumed.
pub fn sequence(records: &mut [FileRecord]) -> Vec<usize> {
    let mut seq = Vec::new();
    let mut emitted: HashSet<String> = HashSet::new();
    loop {
        if scan_pass(records, &mut seq, &mut emitted) {
            break;
        }
    }
    seq
}

/// One scan over the baseline order. Returns true when the pass ran to
/// completion; false when it restarted because an earlier record became
/// ready.
fn scan_pass(
    records: &mut [FileRecord],
    seq: &mut Vec<usize>,
    emitted: &mut HashSet<String>,
) -> bool {
    for idx in 0..records.len() {
        if records[idx].excluded || !is_ready(records, idx) {
            continue;
        }
        if !emitted.insert(records[idx].path.clone()) {
            continue;
        }

        records[idx].excluded = true;
        seq.push(idx);

        let dependents = records[idx].before.clone();
        for dep in dependents {
            if dep < idx && is_ready(records, dep) {
                return false;
            }
        }
    }
    true
}

/// A record is ready once every prerequisite in its `after` set has been
/// consumed. Scanning a record with priority <= 0 retires it on the spot.
fn is_ready(records: &mut [FileRecord], idx: usize) -> bool {
    if records[idx].priority <= 0 {
        records[idx].excluded = true;
        return false;
    }
    records[idx].after.iter().all(|&pre| records[pre].excluded)
}
