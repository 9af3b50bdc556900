//! Runs the `gzcarve` binary against small synthetic images.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn gzcarve(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gzcarve"))
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
}

fn image_with_member(dir: &Path) -> Vec<u8> {
    let member = gzip(b"embedded payload, embedded payload, embedded payload");
    let mut image = vec![0xEEu8; 100];
    image.extend_from_slice(&member);
    image.extend_from_slice(&[0x1F, 0x8B, 0x00]);
    fs::write(dir.join("image.bin"), &image).unwrap();
    member
}

#[test]
fn test_scan_default_output_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let member = image_with_member(tmp.path());

    let output = gzcarve(&["scan", "--no-progress", "image.bin"], tmp.path());
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Occurrences of the magic word"), "{}", stdout);
    assert!(stdout.contains("(0x64)"), "{}", stdout);

    let carved = fs::read(tmp.path().join("image.bin_GZIP").join("100.gz")).unwrap();
    assert_eq!(carved, member);

    // A second run must not touch the first output
    let output = gzcarve(&["scan", "--no-progress", "image.bin"], tmp.path());
    assert!(output.status.success());
    assert!(tmp.path().join("image.bin_GZIP(1)").join("100.gz").exists());
}

#[test]
fn test_scan_json_dry_run() {
    let tmp = tempfile::tempdir().unwrap();
    let member = image_with_member(tmp.path());

    let output = gzcarve(&["scan", "--json", "--dry-run", "image.bin"], tmp.path());
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let file = &report[0];
    let findings = file["findings"].as_array().unwrap();
    assert_eq!(file["valid_files"], 1);
    assert_eq!(findings[0]["offset"], 100);
    assert_eq!(findings[0]["length"], member.len() as u64);

    let trailing = findings.last().unwrap();
    assert_eq!(trailing["offset"], 100 + member.len() as u64);
    assert_eq!(trailing["file_valid"], false);
    assert!(file.get("output_dir").is_none());
    assert!(!tmp.path().join("image.bin_GZIP").exists());
}

#[test]
fn test_existing_member_file_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    image_with_member(tmp.path());
    let out = tmp.path().join("out");
    fs::create_dir(&out).unwrap();
    fs::write(out.join("100.gz"), b"taken").unwrap();

    let output = gzcarve(&["scan", "--no-progress", "-o", "out", "image.bin"], tmp.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error: "));
    assert_eq!(fs::read(out.join("100.gz")).unwrap(), b"taken");
}

#[test]
fn test_not_a_file() {
    let tmp = tempfile::tempdir().unwrap();
    let output = gzcarve(&["scan", "--no-progress", "missing.bin"], tmp.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Not a file:"));
}
