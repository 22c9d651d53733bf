use std::fs;

use rstest::rstest;

use crate::common::{TestRepo, assert_success, repo, stderr, stdout};

#[rstest]
fn test_remove_clean_worktree_and_branch(repo: TestRepo) {
    let path = repo.create_worktree("feature");

    let output = repo.wt(&["-d", "feature"], repo.root_path());
    assert_success(&output);
    assert_eq!(stdout(&output), "");
    assert!(!path.exists());
    assert!(!repo.branch_exists("feature"));

    let err = stderr(&output);
    assert!(err.contains("Removed worktree"), "{err}");
    assert!(err.contains("Deleted branch feature"), "{err}");
}

#[rstest]
fn test_remove_current_worktree_returns_to_main_root(repo: TestRepo) {
    let path = repo.create_worktree("feature");

    let output = repo.wt_integrated(&["-D", "feature"], &path);
    assert_success(&output);
    assert_eq!(
        stdout(&output),
        format!("{}\n", repo.root_path().display())
    );
    assert!(!path.exists());
}

#[rstest]
fn test_remove_current_worktree_without_wrapper_hints(repo: TestRepo) {
    let path = repo.create_worktree("feature");

    let output = repo.wt(&["-d", "."], &path);
    assert_success(&output);
    assert_eq!(stdout(&output), "");
    assert!(stderr(&output).contains("The current directory was removed"));
}

#[rstest]
fn test_remove_refuses_untracked_files(repo: TestRepo) {
    let path = repo.create_worktree("feature");
    fs::write(path.join("scratch.txt"), "wip").unwrap();

    let output = repo.wt(&["-d", "feature"], repo.root_path());
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("has untracked files"), "{err}");
    assert!(err.contains("use -D to force deletion"), "{err}");
    assert!(path.join("scratch.txt").is_file());

    let output = repo.wt(&["-D", "feature"], repo.root_path());
    assert_success(&output);
    assert!(!path.exists());
}

#[rstest]
fn test_remove_refuses_modified_files(repo: TestRepo) {
    let path = repo.create_worktree("feature");
    fs::write(path.join("file.txt"), "changed").unwrap();

    let output = repo.wt(&["-d", "feature"], repo.root_path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("has modified files"));
    assert!(path.is_dir());
}

#[rstest]
fn test_remove_stops_at_first_failure(repo: TestRepo) {
    let a = repo.create_worktree("a");
    let c = repo.create_worktree("c");

    let output = repo.wt(&["-D", "a", "b", "c"], repo.root_path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("no worktree or branch named b"));

    assert!(!a.exists());
    assert!(c.is_dir());
    assert!(repo.branch_exists("c"));
}

#[rstest]
fn test_unmerged_branch_is_retained_with_warning(repo: TestRepo) {
    let path = repo.create_worktree("feature");
    fs::write(path.join("feature.txt"), "work").unwrap();
    repo.run_git_in(&path, &["add", "feature.txt"]);
    repo.run_git_in(&path, &["commit", "-q", "-m", "Feature work"]);

    let output = repo.wt(&["-d", "feature"], repo.root_path());
    assert_success(&output);
    assert!(!path.exists());
    assert!(repo.branch_exists("feature"));

    let err = stderr(&output);
    assert!(err.contains("Branch feature retained"), "{err}");
    assert!(err.contains("use -D to force deletion"), "{err}");
}

#[rstest]
fn test_default_branch_is_retained(repo: TestRepo) {
    repo.run_git(&["switch", "-q", "-c", "develop"]);
    let path = repo.create_worktree("main");

    let output = repo.wt(&["-d", "main"], repo.root_path());
    assert_success(&output);
    assert!(!path.exists());
    assert!(repo.branch_exists("main"));

    let err = stderr(&output);
    assert!(err.contains("Branch main retained"), "{err}");
    assert!(err.contains("--allow-delete-default"), "{err}");

    // With no worktree left, the branch itself is the target
    let output = repo.wt(&["-d", "main"], repo.root_path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("refusing to delete default branch main"));

    let output = repo.wt(&["-d", "--allow-delete-default", "main"], repo.root_path());
    assert_success(&output);
    assert!(!repo.branch_exists("main"));
}

#[rstest]
fn test_remove_branch_without_worktree(repo: TestRepo) {
    repo.run_git(&["branch", "stray"]);

    let output = repo.wt(&["-d", "stray"], repo.root_path());
    assert_success(&output);
    assert!(!repo.branch_exists("stray"));
    assert!(stderr(&output).contains("Deleted branch stray"));
}

#[rstest]
fn test_remove_slashed_branch_shadowed_by_directory(repo: TestRepo) {
    repo.run_git(&["branch", "docs/api"]);
    fs::create_dir_all(repo.root_path().join("docs/api")).unwrap();

    let output = repo.wt(&["-d", "docs/api"], repo.root_path());
    assert_success(&output);
    assert!(!repo.branch_exists("docs/api"));
    assert!(repo.root_path().join("docs/api").is_dir());
}

#[rstest]
fn test_main_worktree_cannot_be_removed(repo: TestRepo) {
    let output = repo.wt(&["-D", "main"], repo.root_path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("cannot delete the main worktree"));
    assert!(repo.root_path().join(".git").is_dir());
}

#[rstest]
fn test_delete_hooks_run_before_removal(repo: TestRepo) {
    let path = repo.create_worktree("feature");
    let marker = repo.temp_path().join("hook-ran.txt");

    let hook = format!("pwd > {}", marker.display());
    let output = repo.wt(&["--deletehook", &hook, "-d", "feature"], repo.root_path());
    assert_success(&output);
    assert_eq!(
        fs::read_to_string(&marker).unwrap(),
        format!("{}\n", path.display())
    );
    assert!(!path.exists());
}

#[rstest]
fn test_failing_delete_hook_keeps_worktree(repo: TestRepo) {
    let path = repo.create_worktree("feature");
    repo.run_git(&["config", "wt.deletehook", "exit 1"]);

    let output = repo.wt(&["-D", "feature"], repo.root_path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("hook failed: exit 1"));
    assert!(path.is_dir());
    assert!(repo.branch_exists("feature"));
}
