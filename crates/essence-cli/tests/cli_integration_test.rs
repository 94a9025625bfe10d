//! End-to-end tests for the `essence` binary.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn essence() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_essence"));
    cmd.env_remove("ESSENCE_PACKAGE_NAME")
        .env_remove("ESSENCE_SRC_DIR")
        .env_remove("ESSENCE_OUT_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_generates_default_layout() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("static")).unwrap();
    fs::write(temp.path().join("static/hello_essence.txt"), "hello essence\n").unwrap();

    let output = essence()
        .current_dir(temp.path())
        .arg("--no-format")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("ESSENCE: embedded file: "));
    assert!(stdout.contains("hello_essence.txt"));
    assert_eq!(stdout.matches("ESSENCE: file written: ").count(), 2);

    assert!(temp.path().join("essence/essence.rs").exists());
    assert!(temp.path().join("essence/essence_dev.rs").exists());
}

#[test]
fn test_env_overrides() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("web")).unwrap();
    fs::write(temp.path().join("web/a.css"), "body{}").unwrap();

    let output = essence()
        .current_dir(temp.path())
        .env("ESSENCE_PACKAGE_NAME", "assets")
        .env("ESSENCE_SRC_DIR", "web")
        .env("ESSENCE_OUT_DIR", "src")
        .arg("--no-format")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    assert!(temp.path().join("src/assets/assets.rs").exists());
    assert!(temp.path().join("src/assets/assets_dev.rs").exists());
}

#[test]
fn test_missing_source_dir_is_fatal() {
    let temp = TempDir::new().unwrap();

    let output = essence().current_dir(temp.path()).output().unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("static"), "{stderr}");
    assert!(!temp.path().join("essence").exists());
}

#[test]
fn test_invalid_package_name_is_fatal() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("static")).unwrap();

    let output = essence()
        .current_dir(temp.path())
        .args(["--package-name", "not-valid"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("package_name"));
}
