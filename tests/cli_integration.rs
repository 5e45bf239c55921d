//! End-to-end tests for the souschef binary
//!
//! Each test runs the compiled binary against a throwaway database so
//! invocations in one test see each other's state and nothing else.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Build a command pointed at an isolated database and config
fn souschef(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("souschef").unwrap();
    cmd.env_remove("SOUSCHEF_DB")
        .env_remove("SOUSCHEF_PROVIDER")
        .arg("--config")
        .arg(dir.path().join("config.yaml"))
        .arg("--db")
        .arg(dir.path().join("souschef.db"));
    cmd
}

fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("souschef").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("recipes"))
        .stdout(predicate::str::contains("prefs"))
        .stdout(predicate::str::contains("admin"))
        .stdout(predicate::str::contains("verify"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("souschef").unwrap();
    cmd.arg("--version");

    cmd.assert().success();
}

#[test]
fn test_unknown_subcommand_fails() {
    let mut cmd = Command::cargo_bin("souschef").unwrap();
    cmd.arg("brew");

    cmd.assert().failure();
}

/// Seeding loads the sample catalog and listing shows it
#[test]
fn test_seed_then_list_recipes() {
    let dir = temp_dir();

    souschef(&dir)
        .arg("admin")
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Seeded 3 sample recipes"));

    souschef(&dir)
        .arg("recipes")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mediterranean Quinoa Bowl"))
        .stdout(predicate::str::contains("Sheet Pan Chicken & Vegetables"))
        .stdout(predicate::str::contains("Creamy Mushroom Pasta"));
}

/// Seeding twice does not duplicate the catalog
#[test]
fn test_seed_is_idempotent() {
    let dir = temp_dir();

    souschef(&dir).arg("admin").arg("seed").assert().success();

    souschef(&dir)
        .arg("admin")
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("already seeded"));
}

#[test]
fn test_list_before_seed_points_at_seed_command() {
    let dir = temp_dir();

    souschef(&dir)
        .arg("recipes")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No recipes found"));
}

/// Tag filtering narrows the listing
#[test]
fn test_list_recipes_filtered_by_tag() {
    let dir = temp_dir();

    souschef(&dir).arg("admin").arg("seed").assert().success();

    souschef(&dir)
        .arg("recipes")
        .arg("list")
        .arg("--tags")
        .arg("vegetarian")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mediterranean Quinoa Bowl"))
        .stdout(predicate::str::contains("Creamy Mushroom Pasta"))
        .stdout(predicate::str::contains("Sheet Pan Chicken & Vegetables").not());
}

#[test]
fn test_featured_honors_count() {
    let dir = temp_dir();

    souschef(&dir).arg("admin").arg("seed").assert().success();

    let output = souschef(&dir)
        .arg("recipes")
        .arg("featured")
        .arg("--count")
        .arg("2")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let shown = [
        "Mediterranean Quinoa Bowl",
        "Sheet Pan Chicken & Vegetables",
        "Creamy Mushroom Pasta",
    ]
    .iter()
    .filter(|name| stdout.contains(*name))
    .count();
    assert_eq!(shown, 2);
}

/// Register, sign in, and inspect the account end to end
#[test]
fn test_auth_register_login_whoami() {
    let dir = temp_dir();

    souschef(&dir)
        .arg("auth")
        .arg("register")
        .arg("cook@example.com")
        .arg("-p")
        .arg("hunter22")
        .assert()
        .success()
        .stdout(predicate::str::contains("Account created for cook@example.com"));

    souschef(&dir)
        .arg("auth")
        .arg("login")
        .arg("cook@example.com")
        .arg("-p")
        .arg("hunter22")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as cook@example.com"))
        .stdout(predicate::str::contains("free"));

    souschef(&dir)
        .arg("auth")
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("cook@example.com"));
}

#[test]
fn test_whoami_before_login_fails() {
    let dir = temp_dir();

    souschef(&dir)
        .arg("auth")
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_register_rejects_duplicate_email() {
    let dir = temp_dir();

    souschef(&dir)
        .arg("auth")
        .arg("register")
        .arg("cook@example.com")
        .arg("-p")
        .arg("hunter22")
        .assert()
        .success();

    souschef(&dir)
        .arg("auth")
        .arg("register")
        .arg("cook@example.com")
        .arg("-p")
        .arg("hunter22")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Email is already in use"));
}

/// An admin can move an account between plans
#[test]
fn test_set_plan_upgrades_account() {
    let dir = temp_dir();

    souschef(&dir)
        .arg("auth")
        .arg("register")
        .arg("cook@example.com")
        .arg("-p")
        .arg("hunter22")
        .assert()
        .success();

    souschef(&dir)
        .arg("admin")
        .arg("set-plan")
        .arg("cook@example.com")
        .arg("premium")
        .assert()
        .success()
        .stdout(predicate::str::contains("premium"));
}

#[test]
fn test_verify_without_credentials_fails() {
    let dir = temp_dir();

    souschef(&dir)
        .arg("verify")
        .env_remove("OPENAI_API_KEY")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Missing credentials for provider: openai",
        ));
}

/// Settings changes persist across invocations
#[test]
fn test_settings_roundtrip() {
    let dir = temp_dir();

    souschef(&dir)
        .arg("admin")
        .arg("settings")
        .arg("set")
        .arg("--session-frequency")
        .arg("3")
        .assert()
        .success();

    souschef(&dir)
        .arg("admin")
        .arg("settings")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("every 3 days"));
}
