//! Build orchestration: graph, cycle check, sequence, copy.
//!
//! [`run`] is the whole pipeline for one invocation; [`create_build`] is the
//! part downstream of the diff (graph build through artifact copy). Both are
//! parameterized over the git and filesystem collaborators so the engine can
//! be exercised end to end with fakes.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;

use crate::classify::Classifier;
use crate::error::BuildError;
use crate::fs::FsProvider;
use crate::git::{GitProvider, LAST_COMMIT_FILE};
use crate::record::{self, FileRecord};
use crate::{graph, sequence, version};

/// Terminal result of a run. No-ops are legitimate outcomes, not errors,
/// but exit non-zero so scripts can tell them from a produced build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A build directory was produced (and released, for release versions).
    Built,
    /// Nothing to do; the reason is user-facing.
    Noop(String),
}

/// Versioned artifact name: `dstDir/<version>_<seqIdx>__<baseName>`.
///
/// The zero-based sequence index makes the build order readable from the
/// file name alone.
pub fn artifact_name(path: &str, dst_dir: &Path, version: &str, idx: usize) -> PathBuf {
    let base = path.rsplit('/').next().unwrap_or(path);
    dst_dir.join(format!("{version}_{idx}__{base}"))
}

/// Order the classified records and copy them into `dir` under versioned
/// names. Returns false when there is nothing to build.
///
/// A circular dependency constraint is fatal: no sequence is emitted.
/// Any copy failure aborts the run — a partial output directory is never
/// considered valid.
pub fn create_build(
    records: &mut [FileRecord],
    dir: &Path,
    version: &str,
    fs: &dyn FsProvider,
) -> Result<bool> {
    println!("=> create build");
    graph::build_graph(records, fs)?;
    if let Some(chain) = graph::find_cycle(records) {
        return Err(BuildError::DependencyCycle { chain }.into());
    }

    let seq = sequence::sequence(records);
    if seq.is_empty() {
        return Ok(false);
    }

    for (idx, &rec_idx) in seq.iter().enumerate() {
        let src = &records[rec_idx].path;
        let dst = artifact_name(src, dir, version, idx);
        fs.copy_file(Path::new(src), &dst)?;
        println!(" > created {}", dst.display());
    }
    Ok(true)
}

/// One full invocation: analyze the repository, build, optionally release.
pub fn run(
    version_arg: &str,
    fly_repo: &Path,
    classifier: &Classifier,
    git: &dyn GitProvider,
    fs: &dyn FsProvider,
) -> Result<Outcome> {
    println!("=> analyze current repository");
    let curr = git.current_revision()?;
    println!("   current commit: {curr}");

    let marker = fly_repo.join(LAST_COMMIT_FILE);
    let (last, first_run) = git.last_release(&marker)?;

    let entries = git.changed_entries(&last, &curr, first_run)?;
    for entry in &entries {
        println!("               # {entry}");
    }
    println!();

    if !first_run && curr == last {
        return Ok(Outcome::Noop(
            "current commit already in flyway repository, skipped".to_owned(),
        ));
    }
    if !first_run && !git.is_ancestor(&last, &curr)? {
        return Ok(Outcome::Noop(
            "last released commit is not an ancestor of the current commit, aborted".to_owned(),
        ));
    }

    let ver = version::parse(version_arg, Local::now().naive_local());
    let src_root = fly_repo.join("src");
    let out_dir = src_root.join(&ver.dir_name);
    fs.ensure_dir(&src_root)?;
    fs.ensure_dir(&out_dir)?;

    let mut records = record::mark_records(&entries, classifier);
    if !create_build(&mut records, &out_dir, &ver.version, fs)? {
        return Ok(Outcome::Noop("files for build not found, aborted".to_owned()));
    }

    if ver.release {
        git.make_release(fly_repo, &ver.dir_name, version_arg, &curr)?;
    }
    Ok(Outcome::Built)
}
