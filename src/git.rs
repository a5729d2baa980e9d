//! Git collaborator.
//!
//! [`GitProvider`] is the version-control interface the pipeline consumes;
//! [`CommandGit`] implements it by shelling out to `git`. Queries run in the
//! analyzed repository's working directory, release operations in the
//! flyway repository.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::debug;

/// Marker file in the flyway repository recording the last processed commit.
pub const LAST_COMMIT_FILE: &str = "last_commit";

/// Version-control queries and release operations the pipeline needs.
pub trait GitProvider {
    /// Revision id of the analyzed repository's HEAD.
    fn current_revision(&self) -> Result<String>;

    /// Last released revision, read from the marker file. When the marker
    /// is missing this is the first run: returns the repository's root
    /// commit and `true`.
    fn last_release(&self, marker: &Path) -> Result<(String, bool)>;

    /// Raw `mode<TAB>path[<TAB>newPath]` entries changed between the two
    /// revisions. On a first run the root commit's own files are included.
    fn changed_entries(&self, last: &str, curr: &str, include_first: bool) -> Result<Vec<String>>;

    /// Whether `last` is an ancestor of `curr`.
    fn is_ancestor(&self, last: &str, curr: &str) -> Result<bool>;

    /// Record the processed commit and publish the build: write the marker,
    /// commit the output directory, tag and push.
    fn make_release(
        &self,
        fly_repo: &Path,
        dir_name: &str,
        version: &str,
        commit: &str,
    ) -> Result<()>;
}

/// `GitProvider` backed by the `git` binary.
pub struct CommandGit {
    work_dir: PathBuf,
}

impl CommandGit {
    /// Operate on the repository at `work_dir`.
    pub fn new(work_dir: PathBuf) -> Self {
        Self { work_dir }
    }

    fn git(&self, dir: &Path, args: &[&str]) -> Result<String> {
        debug!(dir = %dir.display(), ?args, "execute git");
        let out = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .with_context(|| format!("failed to run git {}", args.join(" ")))?;
        if !out.status.success() {
            bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_owned())
    }
}

impl GitProvider for CommandGit {
    fn current_revision(&self) -> Result<String> {
        self.git(&self.work_dir, &["rev-parse", "HEAD"])
    }

    fn last_release(&self, marker: &Path) -> Result<(String, bool)> {
        if let Ok(content) = std::fs::read_to_string(marker) {
            let last = content.trim().to_owned();
            println!("      last commit: {last}");
            return Ok((last, false));
        }
        let root = self.git(&self.work_dir, &["rev-list", "--max-parents=0", "HEAD"])?;
        println!("     first commit: {root}");
        Ok((root, true))
    }

    fn changed_entries(&self, last: &str, curr: &str, include_first: bool) -> Result<Vec<String>> {
        let mut entries = Vec::new();
        if last == curr && !include_first {
            return Ok(entries);
        }
        if include_first {
            // the root commit has no parent to diff against; list its own files
            let shown = self.git(
                &self.work_dir,
                &["show", "--pretty=format:", "--name-status", last],
            )?;
            entries.extend(shown.lines().map(str::to_owned));
        }
        let range = format!("{last}..{curr}");
        let diffed = self.git(&self.work_dir, &["diff", "--name-status", &range])?;
        entries.extend(diffed.lines().map(str::to_owned));
        Ok(entries)
    }

    fn is_ancestor(&self, last: &str, curr: &str) -> Result<bool> {
        let status = Command::new("git")
            .args(["merge-base", "--is-ancestor", last, curr])
            .current_dir(&self.work_dir)
            .status()
            .context("failed to run git merge-base")?;
        Ok(status.success())
    }

    fn make_release(
        &self,
        fly_repo: &Path,
        dir_name: &str,
        version: &str,
        commit: &str,
    ) -> Result<()> {
        println!("=> make release");
        std::fs::write(fly_repo.join(LAST_COMMIT_FILE), commit)
            .with_context(|| format!("failed to write {LAST_COMMIT_FILE}"))?;
        println!(" > saved {LAST_COMMIT_FILE}");

        let out_dir = format!("src/{dir_name}");
        self.git(fly_repo, &["add", &out_dir])?;
        self.git(fly_repo, &["add", LAST_COMMIT_FILE])?;
        self.git(fly_repo, &["commit", "-m", &format!("version {version}")])?;
        self.git(fly_repo, &["tag", &format!("changeset_{commit}")])?;
        self.git(fly_repo, &["tag", &format!("v{version}")])?;
        self.git(fly_repo, &["push", "--tags", "origin", "master"])?;
        Ok(())
    }
}
