//! Seeding a new worktree with files from the worktree it was created from.
//!
//! Candidates come from `git ls-files` by category (modified, untracked,
//! ignored) plus anything matching a `wt.copy` pattern. Paths under the
//! worktree base directory and paths matching `wt.nocopy` are dropped.
//! Survivors are cloned copy-on-write where the filesystem supports it.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::config::Config;
use crate::git::{FileCategory, GitError, WorkingTree};
use crate::shell_exec::check_cancelled;

/// Decides which files to copy and copies them.
#[derive(Debug)]
pub struct FileCopier {
    copy_modified: bool,
    copy_untracked: bool,
    copy_ignored: bool,
    include: Option<Gitignore>,
    exclude: Option<Gitignore>,
    /// Base directory relative to the source root; `None` when it can't
    /// contain any source path.
    basedir: Option<PathBuf>,
}

impl FileCopier {
    /// Build from resolved config. `basedir` is the expanded worktree base
    /// directory, which is never copied from.
    ///
    /// Patterns are anchored at `source_root`. A source that itself lives
    /// under `basedir` (a linked worktree in `.wt/`) copies normally.
    pub fn new(config: &Config, source_root: &Path, basedir: &Path) -> Result<Self, GitError> {
        Ok(Self {
            copy_modified: config.copy_modified,
            copy_untracked: config.copy_untracked,
            copy_ignored: config.copy_ignored,
            include: build_matcher(source_root, "wt.copy", &config.copy)?,
            exclude: build_matcher(source_root, "wt.nocopy", &config.nocopy)?,
            basedir: basedir_within(basedir, source_root),
        })
    }

    /// Whether any category or pattern can produce a candidate.
    pub fn is_enabled(&self) -> bool {
        self.copy_modified || self.copy_untracked || self.copy_ignored || self.include.is_some()
    }

    /// Relative paths to copy from `source`, sorted and deduplicated.
    pub fn collect(&self, source: &WorkingTree) -> anyhow::Result<BTreeSet<String>> {
        let mut candidates = BTreeSet::new();

        if self.copy_modified {
            // `--modified` already implies tracked
            candidates.extend(source.list_files(FileCategory::Modified)?);
        }

        // Listed once, shared by the untracked category and the copy patterns
        let untracked = if self.copy_untracked || self.include.is_some() {
            source.list_files(FileCategory::Untracked)?
        } else {
            Vec::new()
        };
        let ignored = if self.copy_ignored || self.include.is_some() {
            source.list_files(FileCategory::Ignored)?
        } else {
            Vec::new()
        };

        if let Some(include) = &self.include {
            let tracked = source.list_files(FileCategory::Tracked)?;
            candidates.extend(
                tracked
                    .iter()
                    .chain(&untracked)
                    .chain(&ignored)
                    .filter(|path| matches(include, path))
                    .cloned(),
            );
        }
        if self.copy_untracked {
            candidates.extend(untracked);
        }
        if self.copy_ignored {
            candidates.extend(ignored);
        }

        candidates.retain(|path| self.accepts(path));
        Ok(candidates)
    }

    /// Whether `path` survives the rejection filters, in order: under the
    /// base directory, then `wt.nocopy`.
    fn accepts(&self, path: &str) -> bool {
        if let Some(basedir) = &self.basedir
            && Path::new(path).starts_with(basedir)
        {
            log::debug!("Not copying {path}: inside worktree base directory");
            return false;
        }
        if let Some(exclude) = &self.exclude
            && matches(exclude, path)
        {
            log::debug!("Not copying {path}: matches wt.nocopy");
            return false;
        }
        true
    }

    /// Collect and copy from `source` into `dest`. Returns the number of
    /// entries copied.
    pub fn run(&self, source: &WorkingTree, dest: &Path) -> anyhow::Result<usize> {
        if !self.is_enabled() {
            return Ok(0);
        }
        let files = self.collect(source)?;
        copy_files(source.path(), dest, &files)
    }
}

/// `basedir` as a path relative to `source_root`, if it lies strictly below it.
fn basedir_within(basedir: &Path, source_root: &Path) -> Option<PathBuf> {
    if source_root.starts_with(basedir) {
        return None;
    }
    let relative = pathdiff::diff_paths(basedir, source_root)?;
    let below = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    (below && relative.components().next().is_some()).then_some(relative)
}

fn build_matcher(
    root: &Path,
    key: &str,
    patterns: &[String],
) -> Result<Option<Gitignore>, GitError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let invalid = |pattern: &str| GitError::ConfigInvalid {
        key: key.to_string(),
        value: pattern.to_string(),
        expected: "a gitignore-style pattern",
    };

    let mut builder = GitignoreBuilder::new(root);
    for pattern in patterns {
        builder
            .add_line(None, pattern)
            .map_err(|_| invalid(pattern))?;
    }
    let matcher = builder
        .build()
        .map_err(|_| invalid(&patterns.join(" ")))?;
    Ok(Some(matcher))
}

/// Match a file path, or any of its parent directories, against `matcher`.
fn matches(matcher: &Gitignore, path: &str) -> bool {
    matcher
        .matched_path_or_any_parents(path, false)
        .is_ignore()
}

/// Copy relative `files` from `source_root` into `dest_root`.
///
/// Regular files keep their modification time; symlinks are recreated with
/// the same target. Sources that vanished since listing are skipped.
pub fn copy_files(
    source_root: &Path,
    dest_root: &Path,
    files: &BTreeSet<String>,
) -> anyhow::Result<usize> {
    let mut copied = 0;
    for relative in files {
        check_cancelled()?;
        let src = source_root.join(relative);
        let dest = dest_root.join(relative);
        let copied_one = copy_entry(&src, &dest).map_err(|e| GitError::CopyFailed {
            path: PathBuf::from(relative),
            error: e.to_string(),
        })?;
        if copied_one {
            copied += 1;
        }
    }
    log::info!("Copied {copied} of {} candidate files", files.len());
    Ok(copied)
}

/// Copy one entry. Returns false when there was nothing to copy.
fn copy_entry(src: &Path, dest: &Path) -> std::io::Result<bool> {
    let metadata = match fs::symlink_metadata(src) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("Skipping {}: no longer exists", src.display());
            return Ok(false);
        }
        Err(e) => return Err(e),
    };
    if metadata.is_dir() {
        // Submodules show up in ls-files as directories
        log::debug!("Skipping directory {}", src.display());
        return Ok(false);
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    remove_existing(dest)?;

    if metadata.file_type().is_symlink() {
        let target = fs::read_link(src)?;
        create_symlink(&target, src, dest)?;
        return Ok(true);
    }

    reflink_copy::reflink_or_copy(src, dest)?;
    let modified = metadata.modified()?;
    fs::File::options()
        .write(true)
        .open(dest)?
        .set_modified(modified)?;
    Ok(true)
}

fn remove_existing(path: &Path) -> std::io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, _src: &Path, dest: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, dest)
}

#[cfg(windows)]
fn create_symlink(target: &Path, src: &Path, dest: &Path) -> std::io::Result<()> {
    // The link type follows what the source link points at
    if src.metadata().map(|m| m.is_dir()).unwrap_or(false) {
        std::os::windows::fs::symlink_dir(target, dest)
    } else {
        std::os::windows::fs::symlink_file(target, dest)
    }
}
