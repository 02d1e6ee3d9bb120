use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn postview(log_dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("postview").unwrap();
    cmd.env("POSTVIEW_LOG__FILE", log_dir.path().join("postview.log"))
        .arg("--config")
        .arg(log_dir.path().join("absent.yaml"));
    cmd
}

#[test]
fn offline_dump_renders_selected_employee() {
    let dir = tempdir().unwrap();
    postview(&dir)
        .args(["--offline", "--dump", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Post 1 from employee 2"))
        .stdout(predicate::str::contains("Author: Ervin Howell with Deckow-Crist"))
        .stdout(predicate::str::contains(
            "<button data-post-id=\"3\">Show Comments</button>",
        ))
        .stdout(predicate::str::contains(
            "<section class=\"hide\" data-post-id=\"3\">",
        ));
}

#[test]
fn offline_dump_without_selection_uses_fallback_employee() {
    let dir = tempdir().unwrap();
    postview(&dir)
        .args(["--offline", "--dump", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Post 1 from employee 1"))
        .stdout(predicate::str::contains("employee 2").not());
}

#[test]
fn fallback_employee_comes_from_env() {
    let dir = tempdir().unwrap();
    postview(&dir)
        .env("POSTVIEW_VIEW__FALLBACK_USER_ID", "3")
        .args(["--offline", "--dump", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Post 1 from employee 3"));
}

#[test]
fn dump_rejects_bad_user_id() {
    let dir = tempdir().unwrap();
    postview(&dir)
        .args(["--dump", "abc"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid user id"));
}
