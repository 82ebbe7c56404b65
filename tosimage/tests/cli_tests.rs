//! CLI tests for gen-tos-img

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("gen-tos-img").unwrap();
    cmd.arg("--version").assert().success();
}

#[test]
fn test_cli_missing_arguments() {
    let mut cmd = Command::cargo_bin("gen-tos-img").unwrap();
    cmd.assert().failure().code(2);
}

#[test]
fn test_cli_create_image() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tos.bin");
    let output = dir.path().join("tos.img");
    fs::write(&input, b"\xde\xad\xbe\xef").unwrap();

    let mut cmd = Command::cargo_bin("gen-tos-img").unwrap();
    cmd.arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Generate Trusted OS Partition Image File",
        ))
        .stdout(predicate::str::contains("516 bytes total"));

    let image = fs::read(&output).unwrap();
    assert_eq!(image.len(), 516);
    assert_eq!(&image[..7], b"NVTOSP\0");
    assert_eq!(&image[512..], &[0xde, 0xad, 0xbe, 0xef]);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&output).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}

#[test]
fn test_cli_missing_input() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("tos.img");

    let mut cmd = Command::cargo_bin("gen-tos-img").unwrap();
    cmd.arg(dir.path().join("missing.bin"))
        .arg(&output)
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("input file not found"));

    assert!(!output.exists());
}

#[test]
fn test_cli_unwritable_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tos.bin");
    fs::write(&input, b"payload").unwrap();

    let mut cmd = Command::cargo_bin("gen-tos-img").unwrap();
    cmd.arg(&input)
        .arg(dir.path().join("no-such-dir").join("tos.img"))
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("can not write output file"));
}
