// Helpers are shared by several test files; not every file uses all of them.
#![allow(dead_code)]

//! # Test utilities for git-wt
//!
//! `TestRepo` creates an isolated repository in a temporary directory with a
//! single commit on `main`. Git and the binary under test both run with an
//! isolated environment:
//! - a private global gitconfig (user identity, `init.defaultBranch = main`)
//! - no system gitconfig
//! - deterministic commit timestamps and locale
//! - no terminal prompts and no inherited `GIT_*` variables
//!
//! Paths are canonicalized so comparisons survive symlinked temp dirs
//! (`/var -> /private/var` on macOS).

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use insta_cmd::get_cargo_bin;
use tempfile::TempDir;

/// Fixed timestamp for commits made by tests.
pub const TEST_DATE: &str = "2025-01-01T00:00:00Z";
pub const TEST_EPOCH: u64 = 1_735_689_600;

pub fn canonicalize(path: &Path) -> std::io::Result<PathBuf> {
    dunce::canonicalize(path)
}

/// Configure a git command with an isolated environment.
pub fn configure_git_cmd(cmd: &mut Command, git_config_path: &Path) {
    for (key, _) in std::env::vars() {
        if key.starts_with("GIT_") {
            cmd.env_remove(&key);
        }
    }
    cmd.env("GIT_CONFIG_GLOBAL", git_config_path);
    cmd.env("GIT_CONFIG_SYSTEM", "/dev/null");
    cmd.env("GIT_AUTHOR_DATE", TEST_DATE);
    cmd.env("GIT_COMMITTER_DATE", TEST_DATE);
    cmd.env("LC_ALL", "C");
    cmd.env("LANG", "C");
    cmd.env("SOURCE_DATE_EPOCH", TEST_EPOCH.to_string());
    cmd.env("GIT_TERMINAL_PROMPT", "0");
}

pub struct TestRepo {
    temp_dir: TempDir,
    root: PathBuf,
    git_config_path: PathBuf,
}

impl TestRepo {
    /// A fresh repository at `<tmp>/repo` with one commit on `main`.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let git_config_path = temp_dir.path().join("test-gitconfig");
        std::fs::write(
            &git_config_path,
            "[user]\n\tname = Test User\n\temail = test@example.com\n\
             [advice]\n\tmergeConflict = false\n\tresolveConflict = false\n\
             [init]\n\tdefaultBranch = main\n",
        )
        .unwrap();

        let root = temp_dir.path().join("repo");
        std::fs::create_dir(&root).unwrap();
        let root = canonicalize(&root).unwrap();

        let repo = Self {
            temp_dir,
            root,
            git_config_path,
        };
        repo.run_git(&["init", "-q", "-b", "main"]);
        repo.commit("Initial commit");
        repo
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Canonical temp directory, parent of the repository.
    pub fn temp_path(&self) -> PathBuf {
        canonicalize(self.temp_dir.path()).unwrap()
    }

    /// Where `git-wt <name>` puts a worktree with the default basedir.
    pub fn worktree_path(&self, name: &str) -> PathBuf {
        self.root.join(".wt").join(name)
    }

    pub fn git_command(&self) -> Command {
        let mut cmd = Command::new("git");
        configure_git_cmd(&mut cmd, &self.git_config_path);
        cmd.current_dir(&self.root);
        cmd
    }

    /// Run git in the repository root, panicking on failure.
    pub fn run_git(&self, args: &[&str]) {
        self.run_git_in(&self.root, args);
    }

    pub fn run_git_in(&self, dir: &Path, args: &[&str]) {
        let output = self.git_command().args(args).current_dir(dir).output().unwrap();
        assert!(
            output.status.success(),
            "git {} failed:\n{}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    /// Stdout of a git command in the repository root, trimmed.
    pub fn git_output(&self, args: &[&str]) -> String {
        let output = self.git_command().args(args).output().unwrap();
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Write `file.txt` with `message` and commit everything.
    pub fn commit(&self, message: &str) {
        std::fs::write(self.root.join("file.txt"), message).unwrap();
        self.run_git(&["add", "."]);
        self.run_git(&["commit", "-q", "-m", message]);
    }

    pub fn branch_exists(&self, branch: &str) -> bool {
        self.git_command()
            .args(["show-ref", "--verify", "--quiet", &format!("refs/heads/{branch}")])
            .status()
            .unwrap()
            .success()
    }

    /// The binary under test, isolated like git and run from the repository root.
    pub fn wt_command(&self) -> Command {
        let mut cmd = Command::new(get_cargo_bin("git-wt"));
        configure_git_cmd(&mut cmd, &self.git_config_path);
        cmd.env_remove("GIT_WT_SHELL_INTEGRATION");
        cmd.env_remove("CLICOLOR_FORCE");
        cmd.env_remove("RUST_LOG");
        cmd.env("NO_COLOR", "1");
        cmd.env("HOME", self.temp_path());
        cmd.current_dir(&self.root);
        cmd
    }

    /// Run the binary with `args` from `cwd`.
    pub fn wt(&self, args: &[&str], cwd: &Path) -> Output {
        self.wt_command().args(args).current_dir(cwd).output().unwrap()
    }

    /// Run the binary with `args` from `cwd`, as called by the shell wrapper.
    pub fn wt_integrated(&self, args: &[&str], cwd: &Path) -> Output {
        self.wt_command()
            .env("GIT_WT_SHELL_INTEGRATION", "1")
            .args(args)
            .current_dir(cwd)
            .output()
            .unwrap()
    }

    /// Run `script` in `shell` from the repository root, with the binary on
    /// `PATH` so `git wt` reaches it.
    pub fn shell_command(&self, shell: &str, script: &str) -> Command {
        let bin = get_cargo_bin("git-wt");
        let bin_dir = bin.parent().unwrap();
        let path = std::env::var_os("PATH").unwrap_or_default();
        let mut paths = vec![bin_dir.to_path_buf()];
        paths.extend(std::env::split_paths(&path));

        let mut cmd = Command::new(shell);
        configure_git_cmd(&mut cmd, &self.git_config_path);
        cmd.env_remove("GIT_WT_SHELL_INTEGRATION");
        cmd.env("NO_COLOR", "1");
        cmd.env("HOME", self.temp_path());
        cmd.env("PATH", std::env::join_paths(paths).unwrap());
        cmd.args(["-c", script]);
        cmd.current_dir(&self.root);
        cmd
    }

    /// Create a worktree through the binary and return its path.
    pub fn create_worktree(&self, name: &str) -> PathBuf {
        let output = self.wt(&[name], &self.root);
        assert_success(&output);
        self.worktree_path(name)
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[rstest::fixture]
pub fn repo() -> TestRepo {
    TestRepo::new()
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed ({:?}):\nstdout: {}\nstderr: {}",
        output.status.code(),
        stdout(output),
        stderr(output)
    );
}

/// Whether `shell` can be spawned on this system.
pub fn shell_available(shell: &str) -> bool {
    Command::new(shell)
        .args(["-c", "true"])
        .output()
        .is_ok_and(|o| o.status.success())
}
