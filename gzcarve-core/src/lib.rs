//! # gzcarve Core
//!
//! Core components for locating and validating GZIP members inside
//! arbitrary binary blobs.
//!
//! - [`bitstream`]: LSB-first bit reader that never reads ahead
//! - [`crc`]: CRC-32 checksum
//! - [`ringbuffer`]: Sliding window sink with running length and CRC-32
//! - [`host`]: Loading the host file to be scanned
//! - [`error`]: Error types and their recoverability
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI                                                 │
//! │     gzcarve scan, report output                        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container + Scanner                                 │
//! │     GZIP member validation, carving                    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     DEFLATE validation (Huffman trie, block decoding)  │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     BitReader, WindowSink, CRC-32                      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use gzcarve_core::bitstream::BitReader;
//! use gzcarve_core::crc::Crc32;
//! use std::io::Cursor;
//!
//! let mut reader = BitReader::new(Cursor::new(vec![0xAB, 0xCD]));
//! let bits = reader.read_bits(12).unwrap();
//! assert_eq!(bits, 0xDAB);
//!
//! assert_eq!(Crc32::compute(b"123456789"), 0xCBF43926);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod crc;
pub mod error;
pub mod host;
pub mod ringbuffer;

// Re-exports for convenience
pub use bitstream::BitReader;
pub use crc::Crc32;
pub use error::{CarveError, ErrorClass, Result};
pub use host::HostBuffer;
pub use ringbuffer::{DEFLATE_WINDOW, RingBuffer, WindowSink};
