//! End-to-end carving of real gzip members from synthetic host images.

use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use gzcarve_core::{CarveError, Crc32, ErrorClass};
use gzcarve_scan::gzip::flags;
use gzcarve_scan::{CarveOptions, Carver, Finding, ScanSummary, scan};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

fn gzip_named(data: &[u8], name: &str, level: u32) -> Vec<u8> {
    let mut encoder = GzBuilder::new()
        .filename(name)
        .comment("carved by test")
        .extra(vec![b'A', b'B', 2, 0, 1, 2])
        .mtime(1_700_000_000)
        .write(Vec::new(), Compression::new(level));
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn gzip(data: &[u8], level: u32) -> Vec<u8> {
    let mut encoder = GzBuilder::new().write(Vec::new(), Compression::new(level));
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn gunzip(member: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    GzDecoder::new(member).read_to_end(&mut out).unwrap();
    out
}

fn text(size: usize) -> Vec<u8> {
    b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. "
        .iter()
        .copied()
        .cycle()
        .take(size)
        .collect()
}

fn write_host(dir: &Path, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join("image.bin");
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_lone_magic_creates_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let host = write_host(tmp.path(), &[0xAA, 0x1F, 0x8B, 0x00, 0x55]);
    let out = tmp.path().join("out");

    let findings = scan(&host, &out, true).unwrap();
    assert_eq!(findings, vec![Finding::rejected(1, false)]);
    assert!(!out.exists());
}

#[test]
fn test_empty_member_then_member_fast_mode() {
    let first = gzip(b"", 6);
    let second = gzip(&text(3000), 9);
    let mut image = first.clone();
    image.extend_from_slice(&second);

    let tmp = tempfile::tempdir().unwrap();
    let host = write_host(tmp.path(), &image);
    let out = tmp.path().join("out");

    let findings = scan(&host, &out, false).unwrap();
    assert_eq!(findings.len(), 2);
    assert!(findings.iter().all(|f| f.header_valid && f.file_valid));
    assert_eq!(findings[1].offset, first.len() as u64);

    assert_eq!(fs::read(out.join("0.gz")).unwrap(), first);
    let second_path = out.join(format!("{}.gz", first.len()));
    assert_eq!(fs::read(second_path).unwrap(), second);
}

#[test]
fn test_members_in_noise() {
    let payloads = [text(10), text(40_000), (0..=255u8).cycle().take(70_000).collect()];
    let mut image = vec![0x5Au8; 777];
    let mut offsets = Vec::new();

    for (i, payload) in payloads.iter().enumerate() {
        offsets.push(image.len() as u64);
        image.extend(gzip_named(payload, &format!("part{}.txt", i), [0, 6, 9][i]));
        image.extend(std::iter::repeat_n(0xC3u8, 1000 + i));
    }

    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("carved");
    let mut carver = Carver::new(CarveOptions::new().with_thorough(false));
    let findings = carver.scan_buffer(&image, &out).unwrap();

    let valid: Vec<&Finding> = findings.iter().filter(|f| f.file_valid).collect();
    assert_eq!(valid.len(), 3);

    for ((finding, payload), (i, offset)) in valid.iter().zip(&payloads).zip(offsets.iter().enumerate()) {
        assert_eq!(finding.offset, *offset);
        let member = finding.member.as_ref().unwrap();
        assert_eq!(member.name(), Some(format!("part{}.txt", i).as_str()));
        assert_eq!(member.header.extra_len, Some(6));
        assert_eq!(member.header.mtime, 1_700_000_000);
        assert_eq!(member.isize, payload.len() as u32);
        assert_eq!(member.crc32, Crc32::compute(payload));

        let carved = fs::read(out.join(format!("{}.gz", offset))).unwrap();
        assert_eq!(carved.len() as u64, member.length);
        assert_eq!(gunzip(&carved), *payload);
    }

    let summary = ScanSummary::from_findings(&findings);
    assert_eq!(summary.valid_files, 3);
    assert!(summary.occurrences >= 3);
}

#[test]
fn test_thorough_finds_nested_members() {
    // A stored outer member carries the inner member's bytes verbatim
    let inner = gzip(&text(500), 9);
    let mut payload = b"prefix".to_vec();
    payload.extend_from_slice(&inner);
    let outer = gzip(&payload, 0);
    let inner_offset = outer
        .windows(inner.len())
        .position(|w| w == inner.as_slice())
        .unwrap() as u64;

    let fast = Carver::new(CarveOptions::new().with_thorough(false).with_dry_run(true))
        .scan_buffer(&outer, "unused")
        .unwrap();
    assert_eq!(fast.iter().filter(|f| f.file_valid).count(), 1);

    let thorough = Carver::new(CarveOptions::new().with_dry_run(true))
        .scan_buffer(&outer, "unused")
        .unwrap();
    let valid: Vec<u64> = thorough
        .iter()
        .filter(|f| f.file_valid)
        .map(|f| f.offset)
        .collect();
    assert_eq!(valid, vec![0, inner_offset]);
}

#[test]
fn test_corrupted_member_keeps_header_flag() {
    let mut member = gzip(&text(2000), 6);
    let middle = member.len() / 2;
    member[middle] ^= 0x40;
    // Also break the trailer so a lucky decode still fails the CRC
    let crc_at = member.len() - 8;
    member[crc_at] ^= 0xFF;

    let findings = Carver::new(CarveOptions::new().with_dry_run(true))
        .scan_buffer(&member, "unused")
        .unwrap();
    assert!(findings[0].header_valid);
    assert!(!findings[0].file_valid);
    assert!(findings[0].member.is_none());
}

#[test]
fn test_existing_output_is_fatal() {
    let member = gzip(b"payload", 6);
    let mut image = vec![0u8; 16];
    image.extend_from_slice(&member);

    let tmp = tempfile::tempdir().unwrap();
    let host = write_host(tmp.path(), &image);
    let out = tmp.path().join("out");
    fs::create_dir(&out).unwrap();
    fs::write(out.join("16.gz"), b"already here").unwrap();

    let err = scan(&host, &out, true).unwrap_err();
    assert!(matches!(err, CarveError::OutputExists { .. }));
    assert_eq!(err.class(), ErrorClass::ResourceFailure);
    assert_eq!(fs::read(out.join("16.gz")).unwrap(), b"already here");
}

#[test]
fn test_missing_host_file() {
    let tmp = tempfile::tempdir().unwrap();
    let err = scan(tmp.path().join("absent.bin"), tmp.path(), true).unwrap_err();
    assert_eq!(err.class(), ErrorClass::ResourceFailure);
}

#[test]
fn test_dry_run_and_extension() {
    let member = gzip(b"abc", 1);
    let tmp = tempfile::tempdir().unwrap();

    let out = tmp.path().join("dry");
    let findings = Carver::new(CarveOptions::new().with_dry_run(true))
        .scan_buffer(&member, &out)
        .unwrap();
    assert!(findings[0].file_valid);
    assert!(!out.exists());

    let out = tmp.path().join("wet");
    Carver::new(CarveOptions::new().with_extension("gzip"))
        .scan_buffer(&member, &out)
        .unwrap();
    assert_eq!(fs::read(out.join("0.gzip")).unwrap(), member);
}

/// Rebuild a bare 10-byte-header member with FHCRC set.
fn with_header_crc(member: &[u8], corrupt: bool) -> Vec<u8> {
    let mut header = member[..10].to_vec();
    header[3] |= flags::FHCRC;
    let mut crc16 = Crc32::compute(&header) as u16;
    if corrupt {
        crc16 ^= 0x1234;
    }

    let mut out = header;
    out.extend_from_slice(&crc16.to_le_bytes());
    out.extend_from_slice(&member[10..]);
    out
}

#[test]
fn test_header_crc_verification() {
    let member = gzip(&text(100), 6);
    let good = with_header_crc(&member, false);
    let bad = with_header_crc(&member, true);

    let options = CarveOptions::new().with_dry_run(true).with_verify_header_crc(true);
    let findings = Carver::new(options.clone()).scan_buffer(&good, "unused").unwrap();
    assert!(findings[0].file_valid);
    assert_eq!(findings[0].member.as_ref().unwrap().length, good.len() as u64);

    let findings = Carver::new(options).scan_buffer(&bad, "unused").unwrap();
    assert!(!findings[0].header_valid);

    // Without verification the stored value is only recorded
    let findings = Carver::new(CarveOptions::new().with_dry_run(true))
        .scan_buffer(&bad, "unused")
        .unwrap();
    assert!(findings[0].file_valid);
    assert_eq!(gunzip(&good), text(100));
}
