//! # gzcarve Deflate
//!
//! DEFLATE (RFC 1951) decoding tuned for validation of untrusted input.
//!
//! The decoder exists to answer one question about a byte position inside
//! an arbitrary blob: does a complete, well-formed DEFLATE stream start
//! here, and if so how long is it and what does it decompress to? It is
//! driven by a scanner that effectively fuzzes it, so every malformed
//! input is reported through [`Result`](gzcarve_core::Result) and nothing
//! is read past the end of the stream.
//!
//! ## Features
//!
//! - Stored, fixed Huffman and dynamic Huffman blocks
//! - Reports compressed length, decompressed length and CRC-32
//! - Bounded memory: only the 32 KB history window is kept unless the
//!   output is captured explicitly
//!
//! ## Example
//!
//! ```rust
//! use gzcarve_deflate::{inflate, validate};
//!
//! // One stored block holding "Hello"
//! let stream = [0x01, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e', b'l', b'l', b'o'];
//!
//! let summary = validate(&stream).unwrap();
//! assert_eq!(summary.decompressed_len, 5);
//! assert_eq!(summary.crc32, 0xF7D18982);
//!
//! assert_eq!(inflate(&stream).unwrap(), b"Hello");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod huffman;
pub mod inflate;
pub mod tables;

// Re-exports
pub use huffman::HuffmanTree;
pub use inflate::{DeflateSummary, DeflateValidator, inflate, validate};
