//! Shared harness for flygen integration tests: a real git repository in a
//! temp directory plus in-memory fakes for the git and filesystem
//! collaborators.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use tempfile::TempDir;

use flygen::fs::FsProvider;
use flygen::git::GitProvider;

// ---------------------------------------------------------------------------
// Real git repositories
// ---------------------------------------------------------------------------

/// A throwaway git repository to analyze.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let repo = Self { dir };
        repo.git(&["init", "-b", "master"]);
        repo.git(&["config", "user.name", "Test"]);
        repo.git(&["config", "user.email", "test@test.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self, args: &[&str]) -> String {
        let out = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("run git");
        assert!(
            out.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&out.stderr)
        );
        String::from_utf8_lossy(&out.stdout).trim().to_owned()
    }

    /// Write the given files and commit them; returns the new HEAD OID.
    pub fn commit_files(&self, files: &[(&str, &str)], message: &str) -> String {
        for (path, content) in files {
            let full = self.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).expect("mkdir");
            }
            fs::write(full, content).expect("write");
        }
        self.git(&["add", "."]);
        self.git(&["commit", "-m", message]);
        self.head()
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }
}

/// A flyway repository wired to a bare `origin`, so release pushes work.
pub struct FlyRepo {
    dir: TempDir,
    _origin: TempDir,
}

impl FlyRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let origin = TempDir::new().expect("tempdir");
        let run = |args: &[&str], cwd: &Path| {
            let out = Command::new("git")
                .args(args)
                .current_dir(cwd)
                .output()
                .expect("run git");
            assert!(
                out.status.success(),
                "git {args:?} failed: {}",
                String::from_utf8_lossy(&out.stderr)
            );
        };
        run(&["init", "--bare"], origin.path());
        run(&["init", "-b", "master"], dir.path());
        run(&["config", "user.name", "Test"], dir.path());
        run(&["config", "user.email", "test@test.com"], dir.path());
        run(&["config", "commit.gpgsign", "false"], dir.path());
        let origin_url = origin.path().to_string_lossy().into_owned();
        run(&["remote", "add", "origin", &origin_url], dir.path());
        Self {
            dir,
            _origin: origin,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Names of the artifacts in the single build directory under `src/`,
    /// sorted by their sequence index.
    pub fn build_artifacts(&self) -> Vec<String> {
        let src = self.path().join("src");
        let mut dirs: Vec<PathBuf> = fs::read_dir(&src)
            .expect("src dir")
            .map(|e| e.expect("entry").path())
            .collect();
        assert_eq!(dirs.len(), 1, "expected exactly one build directory");
        let build_dir = dirs.pop().expect("build dir");

        let mut names: Vec<String> = fs::read_dir(build_dir)
            .expect("build dir")
            .map(|e| {
                e.expect("entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort_by_key(|name| sequence_index(name));
        names
    }
}

/// Extract `<idx>` from a `V<version>_<idx>__<base>` artifact name.
fn sequence_index(name: &str) -> usize {
    let prefix = name.split("__").next().expect("prefix");
    prefix
        .rsplit('_')
        .next()
        .and_then(|n| n.parse().ok())
        .expect("sequence index")
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Scripted [`GitProvider`].
pub struct FakeGit {
    pub current: String,
    pub last: String,
    pub is_first: bool,
    pub ancestor: bool,
    pub diff: Vec<String>,
    pub released: Cell<bool>,
}

impl FakeGit {
    pub fn new(current: &str, last: &str, is_first: bool, diff: &[&str]) -> Self {
        Self {
            current: current.to_owned(),
            last: last.to_owned(),
            is_first,
            ancestor: true,
            diff: diff.iter().map(|s| (*s).to_owned()).collect(),
            released: Cell::new(false),
        }
    }
}

impl GitProvider for FakeGit {
    fn current_revision(&self) -> Result<String> {
        Ok(self.current.clone())
    }
    fn last_release(&self, _marker: &Path) -> Result<(String, bool)> {
        Ok((self.last.clone(), self.is_first))
    }
    fn changed_entries(&self, _last: &str, _curr: &str, _include_first: bool) -> Result<Vec<String>> {
        Ok(self.diff.clone())
    }
    fn is_ancestor(&self, _last: &str, _curr: &str) -> Result<bool> {
        Ok(self.ancestor)
    }
    fn make_release(
        &self,
        _fly_repo: &Path,
        _dir_name: &str,
        _version: &str,
        _commit: &str,
    ) -> Result<()> {
        self.released.set(true);
        Ok(())
    }
}

/// In-memory [`FsProvider`]: serves one dependency-list body for every
/// `read_lines` call and records copies instead of performing them.
pub struct FakeFs {
    pub dep_lines: Vec<String>,
    pub copied: RefCell<Vec<(String, String)>>,
}

impl FakeFs {
    pub fn new(dep_lines: &[&str]) -> Self {
        Self {
            dep_lines: dep_lines.iter().map(|s| (*s).to_owned()).collect(),
            copied: RefCell::new(Vec::new()),
        }
    }

    pub fn copied_sources(&self) -> Vec<String> {
        self.copied.borrow().iter().map(|(src, _)| src.clone()).collect()
    }
}

impl FsProvider for FakeFs {
    fn read_lines(&self, _path: &Path) -> Result<Vec<String>> {
        Ok(self.dep_lines.clone())
    }
    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        self.copied.borrow_mut().push((
            src.to_string_lossy().into_owned(),
            dst.to_string_lossy().into_owned(),
        ));
        Ok(())
    }
    fn ensure_dir(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}
