use std::fs;

use rstest::rstest;

use crate::common::{TestRepo, assert_success, repo, stderr, stdout};

#[rstest]
fn test_create_worktree_with_new_branch(repo: TestRepo) {
    let output = repo.wt(&["feature"], repo.root_path());
    assert_success(&output);

    let expected = repo.worktree_path("feature");
    assert_eq!(stdout(&output), format!("{}\n", expected.display()));
    assert!(expected.join("file.txt").is_file());
    assert!(repo.branch_exists("feature"));

    let err = stderr(&output);
    assert!(err.contains("Created worktree for feature"), "{err}");
    assert!(err.contains("new branch"), "{err}");
}

#[rstest]
fn test_switch_to_existing_worktree_is_silent(repo: TestRepo) {
    let path = repo.create_worktree("feature");

    let output = repo.wt(&["feature"], repo.root_path());
    assert_success(&output);
    assert_eq!(stdout(&output), format!("{}\n", path.display()));
    assert_eq!(stderr(&output), "");
}

#[rstest]
fn test_switch_by_directory_name_and_path(repo: TestRepo) {
    let path = repo.create_worktree("fix/login");
    // Slashes stay in the directory layout
    assert_eq!(path, repo.root_path().join(".wt/fix/login"));

    let by_branch = repo.wt(&["fix/login"], repo.root_path());
    assert_success(&by_branch);
    assert_eq!(stdout(&by_branch).trim_end(), path.display().to_string());

    let by_path = repo.wt(&[".wt/fix/login"], repo.root_path());
    assert_success(&by_path);
    assert_eq!(stdout(&by_path).trim_end(), path.display().to_string());
}

#[rstest]
fn test_start_point_ignored_for_existing_branch(repo: TestRepo) {
    repo.run_git(&["branch", "existing"]);
    fs::write(repo.root_path().join("new.txt"), "only on main").unwrap();
    repo.run_git(&["add", "new.txt"]);
    repo.run_git(&["commit", "-q", "-m", "Add new.txt"]);

    let output = repo.wt(&["existing", "main"], repo.root_path());
    assert_success(&output);

    let path = repo.worktree_path("existing");
    assert!(path.join("file.txt").is_file());
    assert!(!path.join("new.txt").exists());
}

#[rstest]
fn test_start_point_used_for_new_branch(repo: TestRepo) {
    repo.run_git(&["branch", "base"]);
    repo.commit("Second commit");

    let output = repo.wt(&["topic", "base"], repo.root_path());
    assert_success(&output);

    let path = repo.worktree_path("topic");
    assert_eq!(
        fs::read_to_string(path.join("file.txt")).unwrap(),
        "Initial commit"
    );
    assert!(stderr(&output).contains("new branch from base"));
}

#[rstest]
fn test_name_beats_same_named_directory(repo: TestRepo) {
    let path = repo.create_worktree("test");
    fs::create_dir(repo.root_path().join("test")).unwrap();

    let output = repo.wt(&["test"], repo.root_path());
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), path.display().to_string());
}

#[rstest]
fn test_slashed_branch_beats_same_named_directory(repo: TestRepo) {
    repo.run_git(&["branch", "docs/api"]);
    fs::create_dir_all(repo.root_path().join("docs/api")).unwrap();

    let output = repo.wt(&["docs/api"], repo.root_path());
    assert_success(&output);
    let expected = repo.worktree_path("docs/api");
    assert_eq!(stdout(&output).trim_end(), expected.display().to_string());
    assert!(expected.join("file.txt").is_file());
}

#[rstest]
fn test_path_outside_worktrees_is_rejected(repo: TestRepo) {
    let output = repo.wt(&[".."], repo.root_path());
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "");
    assert!(stderr(&output).contains("is not inside any worktree"));
}

#[rstest]
fn test_legacy_layout_guard(repo: TestRepo) {
    fs::create_dir(repo.temp_path().join("repo-wt")).unwrap();

    let output = repo.wt(&["feature"], repo.root_path());
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "");
    let err = stderr(&output);
    assert!(err.contains("wt.basedir has changed"), "{err}");
    assert!(err.contains("git config wt.basedir '../repo-wt'"), "{err}");
    assert!(!repo.worktree_path("feature").exists());

    // An explicit basedir silences the guard
    let output = repo.wt(&["--basedir", ".wt", "feature"], repo.root_path());
    assert_success(&output);
}

#[rstest]
fn test_basedir_template_from_config(repo: TestRepo) {
    repo.run_git(&["config", "wt.basedir", "../{gitroot}-worktrees"]);

    let output = repo.wt(&["feature"], repo.root_path());
    assert_success(&output);

    let expected = repo.temp_path().join("repo-worktrees").join("feature");
    assert_eq!(stdout(&output).trim_end(), expected.display().to_string());
    assert!(expected.is_dir());
}

#[rstest]
fn test_relative_carries_subdirectory(repo: TestRepo) {
    fs::create_dir(repo.root_path().join("sub")).unwrap();
    fs::write(repo.root_path().join("sub/keep.txt"), "").unwrap();
    repo.run_git(&["add", "sub"]);
    repo.run_git(&["commit", "-q", "-m", "Add sub"]);
    repo.run_git(&["config", "wt.relative", "true"]);

    let sub = repo.root_path().join("sub");
    let output = repo.wt(&["feature"], &sub);
    assert_success(&output);
    assert_eq!(
        stdout(&output).trim_end(),
        repo.worktree_path("feature").join("sub").display().to_string()
    );

    // --relative=false wins over the stored value
    let output = repo.wt(&["--relative=false", "feature"], &sub);
    assert_success(&output);
    assert_eq!(
        stdout(&output).trim_end(),
        repo.worktree_path("feature").display().to_string()
    );
}

#[rstest]
fn test_nocd_marks_targets_for_wrapper(repo: TestRepo) {
    repo.run_git(&["config", "wt.nocd", "create"]);

    let created = repo.wt_integrated(&["feature"], repo.root_path());
    assert_success(&created);
    let path = repo.worktree_path("feature");
    assert_eq!(stdout(&created), format!("nocd:{}\n", path.display()));

    // `create` only suppresses the cd for new worktrees
    let switched = repo.wt_integrated(&["feature"], repo.root_path());
    assert_success(&switched);
    assert_eq!(stdout(&switched), format!("{}\n", path.display()));

    // Without a wrapper the plain path is printed
    let plain = repo.wt(&["--nocd", "feature"], repo.root_path());
    assert_success(&plain);
    assert_eq!(stdout(&plain), format!("{}\n", path.display()));
}

#[rstest]
fn test_create_hooks_run_in_new_worktree(repo: TestRepo) {
    let output = repo.wt(
        &["--hook", "pwd > created-in.txt", "--hook", "echo second >> created-in.txt", "feature"],
        repo.root_path(),
    );
    assert_success(&output);

    let path = repo.worktree_path("feature");
    let log = fs::read_to_string(path.join("created-in.txt")).unwrap();
    assert_eq!(log, format!("{}\nsecond\n", path.display()));
    assert!(stderr(&output).contains("Running hook: pwd > created-in.txt"));
}

#[rstest]
fn test_failing_create_hook_keeps_worktree(repo: TestRepo) {
    let output = repo.wt(&["--hook", "exit 4", "feature"], repo.root_path());
    // The hook's exit code is passed through
    assert_eq!(output.status.code(), Some(4));
    assert_eq!(stdout(&output), "");
    assert!(stderr(&output).contains("hook failed: exit 4"));
    assert!(repo.worktree_path("feature").is_dir());
}

#[rstest]
fn test_usage_errors_exit_with_two(repo: TestRepo) {
    let output = repo.wt(&["a", "b", "c"], repo.root_path());
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout(&output), "");

    let output = repo.wt(&["-d"], repo.root_path());
    assert_eq!(output.status.code(), Some(2));
}
