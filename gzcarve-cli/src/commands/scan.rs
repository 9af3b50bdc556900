//! Scan command implementation.

use crate::utils::{MAX_DIR_SUFFIX, create_progress_bar, default_output_dir, format_size};
use gzcarve_core::HostBuffer;
use gzcarve_scan::{CarveOptions, Carver, Finding, ScanSummary};
use serde::Serialize;
use std::path::{Path, PathBuf};

const RULE: &str = "────────────────────────";

/// Arguments of the scan command.
pub struct ScanArgs {
    pub files: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub thorough: bool,
    pub verify_header_crc: bool,
    pub dry_run: bool,
    pub json: bool,
    pub progress: bool,
}

/// JSON serializable finding.
#[derive(Debug, Serialize)]
struct FindingJson {
    offset: u64,
    header_valid: bool,
    file_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    crc32: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    isize: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mtime: Option<u32>,
}

impl FindingJson {
    fn from_finding(finding: &Finding) -> Self {
        let member = finding.member.as_ref();
        Self {
            offset: finding.offset,
            header_valid: finding.header_valid,
            file_valid: finding.file_valid,
            length: member.map(|m| m.length),
            crc32: member.map(|m| m.crc32),
            isize: member.map(|m| m.isize),
            name: member.and_then(|m| m.name().map(str::to_string)),
            mtime: member.map(|m| m.header.mtime).filter(|&t| t != 0),
        }
    }
}

/// JSON report for one scanned file.
#[derive(Debug, Serialize)]
struct FileReportJson {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dir: Option<String>,
    occurrences: usize,
    valid_headers: usize,
    valid_files: usize,
    bytes_carved: u64,
    findings: Vec<FindingJson>,
}

impl FileReportJson {
    fn new(file: &Path, output_dir: Option<&Path>, findings: &[Finding]) -> Self {
        let summary = ScanSummary::from_findings(findings);
        Self {
            file: file.display().to_string(),
            output_dir: output_dir.map(|d| d.display().to_string()),
            occurrences: summary.occurrences,
            valid_headers: summary.valid_headers,
            valid_files: summary.valid_files,
            bytes_carved: summary.bytes_carved,
            findings: findings.iter().map(FindingJson::from_finding).collect(),
        }
    }
}

pub fn cmd_scan(args: &ScanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = CarveOptions::new()
        .with_thorough(args.thorough)
        .with_verify_header_crc(args.verify_header_crc)
        .with_dry_run(args.dry_run);

    let mut reports = Vec::new();

    for file in &args.files {
        if !args.json {
            println!("{}", RULE);
        }

        if !file.is_file() {
            if args.json {
                log::warn!("not a file: {}", file.display());
            } else {
                println!("Not a file:");
                println!("   {}", file.display());
                println!();
            }
            continue;
        }

        let Some(out_dir) = output_dir_for(args, file) else {
            if args.json {
                log::warn!("no free output directory for {}", file.display());
            } else {
                println!("Could not create a folder:");
                println!("   {}_GZIP", file.display());
                println!(
                    "Too many items with that name already exist (tried {} suffixes).",
                    MAX_DIR_SUFFIX
                );
            }
            continue;
        };

        if !args.json {
            println!("Scanning a file for GZIPs:");
            println!("   {}", file.display());
            println!();
        }

        let findings = scan_file(file, &out_dir, options.clone(), args.progress)?;

        if args.json {
            let written = (!args.dry_run && findings.iter().any(|f| f.file_valid))
                .then_some(out_dir.as_path());
            reports.push(FileReportJson::new(file, written, &findings));
        } else {
            print_report(&findings, &out_dir, args.dry_run);
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("{}", RULE);
    }

    Ok(())
}

fn output_dir_for(args: &ScanArgs, file: &Path) -> Option<PathBuf> {
    match &args.output {
        Some(dir) if args.files.len() > 1 => {
            let name = file.file_name().map(Path::new).unwrap_or(file);
            default_output_dir(&dir.join(name))
        }
        Some(dir) => Some(dir.clone()),
        None => default_output_dir(file),
    }
}

fn scan_file(
    file: &Path,
    out_dir: &Path,
    options: CarveOptions,
    progress: bool,
) -> Result<Vec<Finding>, Box<dyn std::error::Error>> {
    let host = HostBuffer::open(file)?;
    log::debug!(
        "{}: {} bytes{}",
        file.display(),
        host.len(),
        if host.is_mapped() { " (mapped)" } else { "" }
    );

    let pb = create_progress_bar(host.len() as u64, progress);
    let findings = {
        let bar = pb.clone();
        let mut carver = Carver::new(options).with_progress(move |position, _| {
            bar.set_position(position);
        });
        carver.scan_buffer(&host, out_dir)
    };
    pb.finish_and_clear();

    Ok(findings?)
}

fn print_report(findings: &[Finding], out_dir: &Path, dry_run: bool) {
    let summary = ScanSummary::from_findings(findings);

    println!(
        "Occurrences of the magic word 0x1F 8B found in the file: {}",
        summary.occurrences
    );
    if summary.occurrences == 0 {
        return;
    }

    println!(
        "   Of those, found to be part of a valid GZIP header: {}",
        summary.valid_headers
    );
    if summary.valid_headers == 0 {
        return;
    }

    println!("      At these addresses:");
    for finding in findings.iter().filter(|f| f.header_valid) {
        println!("      {:>20}   ({:#x})", finding.offset, finding.offset);
    }

    if summary.valid_files == 0 {
        println!("         Of those, none were found to be part of a valid GZIP file.");
        return;
    }

    let verb = if dry_run { "validated" } else { "extracted" };
    println!(
        "         Of those, found to be part of a valid GZIP file and {}: {} ({})",
        verb,
        summary.valid_files,
        format_size(summary.bytes_carved)
    );
    if !dry_run {
        println!("         Written to: {}", out_dir.display());
    }
}
