//! Filesystem collaborator.
//!
//! The build pipeline never touches the disk directly; it goes through
//! [`FsProvider`] so engine tests can run against in-memory fakes. [`OsFs`]
//! is the real implementation, rooted at the analyzed repository so
//! diff-relative source paths resolve no matter where the process runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Blocking filesystem operations the build pipeline needs.
///
/// Source paths (`read_lines`, the `src` of `copy_file`) are relative to
/// the analyzed repository; destination paths are used as given.
pub trait FsProvider {
    /// Read a repository text file as lines. Unreadable files are fatal.
    fn read_lines(&self, path: &Path) -> Result<Vec<String>>;

    /// Copy repository file `src` to `dst`. Fails unless `src` is a
    /// regular file.
    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Create a directory (and parents) if it does not exist yet.
    fn ensure_dir(&self, path: &Path) -> Result<()>;
}

/// The real filesystem, rooted at the analyzed repository.
pub struct OsFs {
    root: PathBuf,
}

impl OsFs {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl FsProvider for OsFs {
    fn read_lines(&self, path: &Path) -> Result<Vec<String>> {
        let path = self.root.join(path);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(content.lines().map(str::to_owned).collect())
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        let src = self.root.join(src);
        let meta = std::fs::metadata(&src)
            .with_context(|| format!("failed to stat {}", src.display()))?;
        if !meta.is_file() {
            bail!("{} is not a regular file", src.display());
        }
        std::fs::copy(&src, dst)
            .with_context(|| format!("failed to copy {} to {}", src.display(), dst.display()))?;
        Ok(())
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        std::fs::create_dir_all(path)
            .with_context(|| format!("failed to create {}", path.display()))
    }
}
