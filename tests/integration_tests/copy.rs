use std::fs;
use std::time::{Duration, SystemTime};

use rstest::{fixture, rstest};

use crate::common::{TestRepo, assert_success, stderr};

/// A repository whose main worktree has one file of every category:
/// ignored `.env` and `node_modules/lib.js`, untracked `notes.txt`, and a
/// modified `file.txt`.
#[fixture]
fn seeded() -> TestRepo {
    let repo = TestRepo::new();
    let root = repo.root_path();
    fs::write(root.join(".gitignore"), ".env\nnode_modules/\n").unwrap();
    repo.run_git(&["add", ".gitignore"]);
    repo.run_git(&["commit", "-q", "-m", "Add .gitignore"]);

    fs::write(root.join(".env"), "SECRET=1\n").unwrap();
    fs::create_dir(root.join("node_modules")).unwrap();
    fs::write(root.join("node_modules/lib.js"), "module.exports = {}\n").unwrap();
    fs::write(root.join("notes.txt"), "todo\n").unwrap();
    fs::write(root.join("file.txt"), "edited\n").unwrap();
    repo
}

#[rstest]
fn test_nothing_copied_by_default(seeded: TestRepo) {
    let output = seeded.wt(&["feature"], seeded.root_path());
    assert_success(&output);

    let path = seeded.worktree_path("feature");
    assert!(!path.join(".env").exists());
    assert!(!path.join("notes.txt").exists());
    assert_eq!(
        fs::read_to_string(path.join("file.txt")).unwrap(),
        "Initial commit"
    );
    assert!(!stderr(&output).contains("Copied"));
}

#[rstest]
fn test_copy_ignored_respects_nocopy(seeded: TestRepo) {
    let env = seeded.root_path().join(".env");
    let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
    fs::File::options()
        .write(true)
        .open(&env)
        .unwrap()
        .set_modified(mtime)
        .unwrap();

    let output = seeded.wt(
        &["--copyignored", "--nocopy", "node_modules/", "feature"],
        seeded.root_path(),
    );
    assert_success(&output);

    let path = seeded.worktree_path("feature");
    assert_eq!(fs::read_to_string(path.join(".env")).unwrap(), "SECRET=1\n");
    assert_eq!(fs::metadata(path.join(".env")).unwrap().modified().unwrap(), mtime);
    assert!(!path.join("node_modules").exists());
    assert!(!path.join("notes.txt").exists());
    assert!(stderr(&output).contains("Copied 1 file\n"));
}

#[rstest]
fn test_copy_untracked_and_modified(seeded: TestRepo) {
    let output = seeded.wt(
        &["--copyuntracked", "--copymodified", "feature"],
        seeded.root_path(),
    );
    assert_success(&output);

    let path = seeded.worktree_path("feature");
    assert_eq!(fs::read_to_string(path.join("notes.txt")).unwrap(), "todo\n");
    assert_eq!(fs::read_to_string(path.join("file.txt")).unwrap(), "edited\n");
    assert!(!path.join(".env").exists());
    assert!(stderr(&output).contains("Copied 2 files"));
}

#[rstest]
fn test_copy_patterns_match_ignored_files(seeded: TestRepo) {
    seeded.run_git(&["config", "--add", "wt.copy", ".env"]);

    let output = seeded.wt(&["feature"], seeded.root_path());
    assert_success(&output);

    let path = seeded.worktree_path("feature");
    assert!(path.join(".env").is_file());
    assert!(!path.join("node_modules").exists());
}

#[rstest]
fn test_existing_worktrees_are_never_copied(seeded: TestRepo) {
    seeded.create_worktree("first");

    let output = seeded.wt(&["--copyuntracked", "second"], seeded.root_path());
    assert_success(&output);

    let path = seeded.worktree_path("second");
    assert!(path.join("notes.txt").is_file());
    assert!(!path.join(".wt").exists());
}

#[rstest]
fn test_copy_from_linked_worktree(seeded: TestRepo) {
    let first = seeded.create_worktree("first");
    fs::write(first.join(".env"), "FROM_FIRST=1\n").unwrap();

    let output = seeded.wt(&["--copyignored", "second"], &first);
    assert_success(&output);

    // New worktrees still land under the main root's base directory
    let second = seeded.worktree_path("second");
    assert_eq!(
        fs::read_to_string(second.join(".env")).unwrap(),
        "FROM_FIRST=1\n"
    );
    assert!(stderr(&output).contains("Copied 1 file\n"));
}

#[rstest]
fn test_invalid_copy_pattern_creates_nothing(seeded: TestRepo) {
    let output = seeded.wt(&["--copy", "a[z-a]", "feature"], seeded.root_path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("wt.copy"));
    assert!(!seeded.worktree_path("feature").exists());
    assert!(!seeded.branch_exists("feature"));
}
