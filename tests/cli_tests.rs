use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("stalebot")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("unmark"));
}

#[test]
fn run_requires_repo() {
    Command::cargo_bin("stalebot")
        .unwrap()
        .arg("run")
        .assert()
        .failure();
}

#[test]
fn run_rejects_unknown_item_type() {
    Command::cargo_bin("stalebot")
        .unwrap()
        .args(["run", "--repo", "org/repo", "--only", "donuts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown item type"));
}

#[test]
fn config_show_prints_merged_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stalebot.yml");
    std::fs::write(&path, "daysUntilStale: 15\npulls:\n  limitPerRun: 3\n").unwrap();

    Command::cargo_bin("stalebot")
        .unwrap()
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("daysUntilStale: 15"))
        .stdout(predicate::str::contains("limitPerRun: 3"));
}

#[test]
fn config_show_warns_without_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.yml");

    Command::cargo_bin("stalebot")
        .unwrap()
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("perform: false"));
}
