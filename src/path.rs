//! Worktree path resolution.
//!
//! - [`classify_argument`] decides whether a command-line argument addresses an
//!   existing worktree, is a filesystem path, or is a name to create.
//! - [`expand_basedir`] turns the `wt.basedir` template into an absolute directory.
//! - [`check_legacy_layout`] refuses to guess when the old `../<repo>-wt` layout
//!   is still on disk.
//! - [`relative_subdir`] carries the invocation's subdirectory over to the target.

use std::path::{Component, Path, PathBuf};

use normalize_path::NormalizePath;

use crate::git::{GitError, Worktree, deepest_containing};

/// Get the user's home directory.
pub fn home_dir() -> Option<PathBuf> {
    home::home_dir()
}

/// Format a filesystem path for user-facing output.
///
/// Replaces home directory prefix with `~` (e.g., `/Users/alex/projects/wt` -> `~/projects/wt`).
/// Paths outside home are returned unchanged.
pub fn format_path_for_display(path: &Path) -> String {
    if let Some(home) = home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        }

        let mut display_path = PathBuf::from("~");
        display_path.push(stripped);
        return display_path.display().to_string();
    }

    path.display().to_string()
}

/// A classified command-line argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Matches a registered worktree, by name or by path
    Worktree(Worktree),
    /// Shaped like a path but inside no worktree; holds the raw input
    PathHint(String),
    /// A branch or worktree name with no worktree yet
    Name(String),
}

/// Whether `arg` has the shape of a filesystem path rather than a name.
///
/// Branch names may contain `/`, so a name that matches an existing worktree
/// must be checked before this.
pub fn is_path_like(arg: &str) -> bool {
    is_explicit_path(arg) || arg.contains(std::path::MAIN_SEPARATOR) || arg.contains('/')
}

/// Paths that can't be branch names: dot-relative or absolute.
fn is_explicit_path(arg: &str) -> bool {
    arg == "."
        || arg == ".."
        || arg.starts_with("./")
        || arg.starts_with("../")
        || Path::new(arg).is_absolute()
}

/// Classify `arg` against the registered worktrees.
///
/// 1. A worktree whose branch or directory name equals `arg` wins, even when a
///    like-named directory exists under `cwd`.
/// 2. A slashed argument that `is_branch` accepts is a name, even when a
///    directory of that name exists. Explicit paths (`.`, `./x`, `../x`,
///    absolute) skip this check.
/// 3. A path-like argument is canonicalized against `cwd` and matched to the
///    deepest worktree containing it. Inside a bare `main_root` with no
///    containing worktree, it matches the bare entry. A slashed argument
///    that doesn't exist on disk falls through to a name.
/// 4. Anything else is a name.
pub fn classify_argument(
    arg: &str,
    worktrees: &[Worktree],
    main_root: &Path,
    cwd: &Path,
    is_branch: impl Fn(&str) -> bool,
) -> Argument {
    let by_branch = worktrees
        .iter()
        .find(|wt| !wt.bare && wt.branch.as_deref() == Some(arg));
    if let Some(wt) = by_branch.or_else(|| worktrees.iter().find(|wt| wt.matches_name(arg))) {
        return Argument::Worktree(wt.clone());
    }

    if !is_path_like(arg) || (!is_explicit_path(arg) && is_branch(arg)) {
        return Argument::Name(arg.to_string());
    }

    let Ok(path) = dunce::canonicalize(cwd.join(arg)) else {
        // `feature/x` that isn't on disk is a branch name with a slash
        if is_explicit_path(arg) {
            log::debug!("Path argument {arg} does not exist");
            return Argument::PathHint(arg.to_string());
        }
        return Argument::Name(arg.to_string());
    };

    let found = deepest_containing(worktrees, &path).or_else(|| {
        path.starts_with(main_root)
            .then(|| worktrees.iter().find(|wt| wt.bare))
            .flatten()
    });
    match found {
        Some(wt) => Argument::Worktree(wt.clone()),
        None => Argument::PathHint(arg.to_string()),
    }
}

/// Expand a `wt.basedir` template to an absolute, normalized directory.
///
/// `{gitroot}` becomes the repository name and a leading `~` the home
/// directory. A relative result is resolved against `main_root`, never the
/// current directory.
pub fn expand_basedir(template: &str, main_root: &Path, gitroot: &str) -> PathBuf {
    let substituted = template.replace("{gitroot}", gitroot);
    let expanded = shellexpand::tilde(&substituted);
    main_root.join(&*expanded).normalize()
}

/// Directory for a new worktree named `name` under `basedir`.
pub fn worktree_target(basedir: &Path, name: &str) -> PathBuf {
    basedir.join(name).normalize()
}

/// Directory the pre-`.wt` default layout would have used.
pub fn legacy_basedir(main_root: &Path, gitroot: &str) -> Option<PathBuf> {
    main_root
        .parent()
        .map(|parent| parent.join(format!("{gitroot}-wt")))
}

/// Fail if the old default layout exists and `wt.basedir` was never set.
pub fn check_legacy_layout(
    basedir_explicit: bool,
    main_root: &Path,
    gitroot: &str,
) -> Result<(), GitError> {
    if basedir_explicit {
        return Ok(());
    }
    match legacy_basedir(main_root, gitroot) {
        Some(legacy_dir) if legacy_dir.is_dir() => Err(GitError::LegacyLayout {
            legacy_dir,
            gitroot: gitroot.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Append the invocation's subdirectory (relative to `anchor`) to `target`
/// when that subdirectory exists there.
///
/// `anchor` is the root of the worktree the invocation runs in. Nothing is
/// appended when `cwd` is the anchor itself or lies outside it.
pub fn relative_subdir(target: &Path, anchor: &Path, cwd: &Path) -> PathBuf {
    if cwd == anchor || !cwd.starts_with(anchor) {
        return target.to_path_buf();
    }
    let Some(sub) = pathdiff::diff_paths(cwd, anchor) else {
        return target.to_path_buf();
    };
    if sub.components().any(|c| matches!(c, Component::ParentDir)) {
        return target.to_path_buf();
    }

    let candidate = target.join(&sub);
    if candidate.is_dir() {
        candidate
    } else {
        log::debug!(
            "{} does not exist; using worktree root",
            format_path_for_display(&candidate)
        );
        target.to_path_buf()
    }
}
