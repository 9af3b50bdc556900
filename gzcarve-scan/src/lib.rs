//! # gzcarve Scan
//!
//! Finds GZIP members embedded anywhere in a binary blob (firmware images,
//! disk dumps, captures) and carves each valid one out as its own file.
//!
//! Every occurrence of the magic bytes is a candidate. A candidate counts
//! only if its header parses, its DEFLATE payload decodes to the end, and
//! the trailing CRC-32 and size match; the carved file is the exact byte
//! range of the member.
//!
//! ## Example
//!
//! ```rust
//! use gzcarve_scan::{CarveOptions, Carver, ScanSummary};
//!
//! let mut blob = b"firmware header".to_vec();
//! blob.extend_from_slice(&[
//!     0x1F, 0x8B, 8, 0, 0, 0, 0, 0, 0, 3, 0x03, 0x00, 0, 0, 0, 0, 0, 0, 0, 0,
//! ]);
//! blob.extend_from_slice(&[0x1F, 0x8B, 0xFF]);
//!
//! let mut carver = Carver::new(CarveOptions::new().with_dry_run(true));
//! let findings = carver.scan_buffer(&blob, "unused").unwrap();
//!
//! let summary = ScanSummary::from_findings(&findings);
//! assert_eq!(summary.occurrences, 2);
//! assert_eq!(summary.valid_files, 1);
//! assert_eq!(findings[0].offset, 15);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod carver;
pub mod finding;
pub mod gzip;
pub mod options;
pub mod output;

// Re-exports
pub use carver::{Carver, scan};
pub use finding::{Finding, ScanSummary};
pub use gzip::{GzipHeader, MemberInfo, MemberValidator};
pub use options::CarveOptions;
pub use output::OutputDir;
