//! Scan results.

use crate::gzip::MemberInfo;

/// One occurrence of the GZIP magic in the host buffer.
///
/// `file_valid` implies `header_valid`; `member` is present exactly when
/// `file_valid` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Offset of the magic bytes.
    pub offset: u64,
    /// The header parsed and data follows it.
    pub header_valid: bool,
    /// The whole member validated.
    pub file_valid: bool,
    /// Details of the validated member.
    pub member: Option<MemberInfo>,
}

impl Finding {
    /// A magic occurrence whose member did not validate.
    pub fn rejected(offset: u64, header_valid: bool) -> Self {
        Self {
            offset,
            header_valid,
            file_valid: false,
            member: None,
        }
    }

    /// A fully validated member.
    pub fn valid(member: MemberInfo) -> Self {
        Self {
            offset: member.offset,
            header_valid: true,
            file_valid: true,
            member: Some(member),
        }
    }
}

/// Totals over a list of findings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Magic occurrences.
    pub occurrences: usize,
    /// Occurrences with a valid header.
    pub valid_headers: usize,
    /// Occurrences that validated completely.
    pub valid_files: usize,
    /// Sum of the on-disk lengths of the valid members.
    pub bytes_carved: u64,
}

impl ScanSummary {
    /// Summarize `findings`.
    pub fn from_findings(findings: &[Finding]) -> Self {
        findings.iter().fold(Self::default(), |mut summary, finding| {
            summary.occurrences += 1;
            summary.valid_headers += usize::from(finding.header_valid);
            summary.valid_files += usize::from(finding.file_valid);
            summary.bytes_carved += finding.member.as_ref().map_or(0, |m| m.length);
            summary
        })
    }
}
