//! Scanning a host buffer for GZIP members.
//!
//! The carver walks the buffer looking for the magic bytes `1F 8B` and
//! attempts a full member validation at each occurrence. Validation
//! failures only end the current candidate; the scan resumes right after
//! its magic bytes. I/O failures while writing carved members end the scan.
//!
//! In thorough mode the scan also resumes right after the magic bytes of
//! a member that validated, so members nested inside another member's
//! bytes are found too. Otherwise it skips the whole member.

use crate::finding::{Finding, ScanSummary};
use crate::gzip::{GZIP_MAGIC, MemberInfo, MemberValidator, find_magic};
use crate::options::CarveOptions;
use crate::output::OutputDir;
use gzcarve_core::HostBuffer;
use gzcarve_core::error::Result;
use std::path::Path;

/// Callback told the scan position and the buffer length.
type ProgressFn<'a> = Box<dyn FnMut(u64, u64) + 'a>;

/// GZIP member scanner.
pub struct Carver<'a> {
    options: CarveOptions,
    validator: MemberValidator,
    progress: Option<ProgressFn<'a>>,
}

impl std::fmt::Debug for Carver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Carver")
            .field("options", &self.options)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl<'a> Carver<'a> {
    /// Create a carver with the given options.
    pub fn new(options: CarveOptions) -> Self {
        Self {
            validator: MemberValidator::new(options.verify_header_crc),
            options,
            progress: None,
        }
    }

    /// Report progress as `(position, total)` after every candidate.
    pub fn with_progress(mut self, progress: impl FnMut(u64, u64) + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Options in use.
    pub fn options(&self) -> &CarveOptions {
        &self.options
    }

    /// Scan `host`, handing each validated member to `sink`.
    ///
    /// Returns one [`Finding`] per magic occurrence, in offset order. An
    /// error from `sink` stops the scan and is returned.
    pub fn scan_with<F>(&mut self, host: &[u8], mut sink: F) -> Result<Vec<Finding>>
    where
        F: FnMut(&MemberInfo, &[u8]) -> Result<()>,
    {
        let total = host.len() as u64;
        let mut findings = Vec::new();
        let mut position = 0;

        while let Some(offset) = find_magic(host, position) {
            // Backtrack point: just past the magic bytes
            position = offset + GZIP_MAGIC.len();

            let check = self.validator.check(host, offset);
            match check.result {
                Ok(member) => {
                    log::debug!(
                        "member at {:#x}: {} bytes, isize {}, crc {:#010x}",
                        offset,
                        member.length,
                        member.isize,
                        member.crc32
                    );
                    sink(&member, &host[member.range()])?;
                    if !self.options.thorough {
                        position = offset + member.length as usize;
                    }
                    findings.push(Finding::valid(member));
                }
                Err(e) => {
                    log::debug!(
                        "candidate at {:#x} rejected (header valid: {}): {}",
                        offset,
                        check.header_valid,
                        e
                    );
                    findings.push(Finding::rejected(offset as u64, check.header_valid));
                }
            }

            self.report(position as u64, total);
        }

        self.report(total, total);

        let summary = ScanSummary::from_findings(&findings);
        log::info!(
            "scanned {} bytes: {} occurrences, {} valid headers, {} members",
            total,
            summary.occurrences,
            summary.valid_headers,
            summary.valid_files
        );

        Ok(findings)
    }

    /// Scan `host`, writing each validated member into `out_dir`.
    ///
    /// Files are named `<offset>.<extension>`. Nothing is written in dry
    /// run mode.
    pub fn scan_buffer(&mut self, host: &[u8], out_dir: impl AsRef<Path>) -> Result<Vec<Finding>> {
        if self.options.dry_run {
            return self.scan_with(host, |_, _| Ok(()));
        }

        let mut output = OutputDir::new(out_dir.as_ref(), self.options.extension.clone());
        self.scan_with(host, |member, bytes| {
            let path = output.write(member.offset, bytes)?;
            log::debug!("wrote {}", path.display());
            Ok(())
        })
    }

    /// Scan the file at `host_path`, writing members into `out_dir`.
    pub fn scan_file(
        &mut self,
        host_path: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
    ) -> Result<Vec<Finding>> {
        let host = HostBuffer::open(host_path)?;
        self.scan_buffer(&host, out_dir)
    }

    fn report(&mut self, position: u64, total: u64) {
        if let Some(progress) = self.progress.as_mut() {
            progress(position, total);
        }
    }
}

impl Default for Carver<'_> {
    fn default() -> Self {
        Self::new(CarveOptions::default())
    }
}

/// Scan the file at `host_path` and carve every valid member into
/// `out_dir`.
///
/// Fails if the host file cannot be read, the output directory cannot be
/// created, or a target file already exists.
pub fn scan(
    host_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    thorough: bool,
) -> Result<Vec<Finding>> {
    Carver::new(CarveOptions::new().with_thorough(thorough)).scan_file(host_path, out_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_MEMBER: [u8; 20] = [
        0x1F, 0x8B, 8, 0, 0, 0, 0, 0, 0, 3, 0x03, 0x00, 0, 0, 0, 0, 0, 0, 0, 0,
    ];

    fn collect(carver: &mut Carver<'_>, host: &[u8]) -> (Vec<Finding>, Vec<u64>) {
        let mut carved = Vec::new();
        let findings = carver
            .scan_with(host, |member, bytes| {
                assert_eq!(bytes.len() as u64, member.length);
                carved.push(member.offset);
                Ok(())
            })
            .unwrap();
        (findings, carved)
    }

    #[test]
    fn test_no_magic() {
        let mut carver = Carver::default();
        let (findings, carved) = collect(&mut carver, b"nothing to see here");
        assert!(findings.is_empty());
        assert!(carved.is_empty());
    }

    #[test]
    fn test_lone_magic() {
        let mut carver = Carver::default();
        let (findings, carved) = collect(&mut carver, &[0x00, 0x1F, 0x8B, 0x00]);
        assert_eq!(findings, vec![Finding::rejected(1, false)]);
        assert!(carved.is_empty());
    }

    #[test]
    fn test_back_to_back_members() {
        let mut host = EMPTY_MEMBER.to_vec();
        host.extend_from_slice(&EMPTY_MEMBER);

        let mut carver = Carver::new(CarveOptions::new().with_thorough(false));
        let (findings, carved) = collect(&mut carver, &host);

        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.header_valid && f.file_valid));
        let first = findings[0].member.as_ref().unwrap();
        assert_eq!(first.offset + first.length, findings[1].offset);
        assert_eq!(carved, vec![0, 20]);
    }

    #[test]
    fn test_progress_reaches_end() {
        let mut host = vec![0u8; 5];
        host.extend_from_slice(&EMPTY_MEMBER);
        host.extend_from_slice(&[0x1F, 0x8B]);

        let mut seen = Vec::new();
        {
            let mut carver = Carver::new(CarveOptions::new().with_thorough(false))
                .with_progress(|position, total| seen.push((position, total)));
            carver.scan_with(&host, |_, _| Ok(())).unwrap();
        }

        let total = host.len() as u64;
        assert_eq!(seen, vec![(25, total), (27, total), (total, total)]);
    }

    #[test]
    fn test_sink_error_stops_scan() {
        let mut host = EMPTY_MEMBER.to_vec();
        host.extend_from_slice(&EMPTY_MEMBER);

        let mut calls = 0;
        let result = Carver::default().scan_with(&host, |_, _| {
            calls += 1;
            Err(gzcarve_core::CarveError::output_exists("0.gz"))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
