#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::path::Path;
use tempfile::TempDir;

pub const ADMIN: &str = "ada";
pub const PASSWORD: &str = "analytical-engine";

/// The main binary, with credentials from the environment cleared.
pub fn fatt() -> Command {
    let mut cmd = cargo_bin_cmd!("forum-attendance");
    cmd.env_remove("TF_USER")
        .env_remove("TF_PASSWORD")
        .env("RUST_LOG", "off");
    cmd
}

/// The main binary, acting as the administrator created by [`setup_db`].
pub fn as_admin(db_path: &str) -> Command {
    let mut cmd = fatt();
    cmd.args(["--database", db_path, "--user", ADMIN, "--password", PASSWORD]);
    cmd
}

/// Creates a database in `dir` with one administrator teaching forum `F1`, returning its path.
pub fn setup_db(dir: &TempDir) -> String {
    let db_path = dir
        .path()
        .join("attendance.sqlite3")
        .to_string_lossy()
        .to_string();

    cargo_bin_cmd!("setup")
        .env("RUST_LOG", "off")
        .args([
            "--database",
            &db_path,
            ADMIN,
            "ada@example.edu",
            "--first-name",
            "Ada",
            "--last-name",
            "Lovelace",
            "--forum",
            "F1",
            "--password",
            PASSWORD,
        ])
        .assert()
        .success();

    db_path
}

/// Adds a student through the CLI and returns their ID.
pub fn add_student(db_path: &str, name: &str, forum: &str) -> i64 {
    let output = as_admin(db_path)
        .args(["--json", "students", "add", name, forum])
        .output()
        .expect("failed to add student");
    assert!(output.status.success());

    let student: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    student["id"].as_i64().unwrap()
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().to_string()
}
