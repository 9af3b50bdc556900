//! Error types for gzcarve operations.
//!
//! Every failure is sorted into one of three classes (see [`ErrorClass`]).
//! The first two only ever invalidate the candidate being examined; the
//! scanner recovers from them locally and moves on. Resource failures abort
//! the whole scan.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`CarveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The byte or bit source ended before the structure was complete.
    StreamExhausted,
    /// The bytes are present but do not form a valid member.
    StructuralViolation,
    /// Host file or output artifact could not be read or written.
    ResourceFailure,
}

/// The main error type for gzcarve operations.
#[derive(Debug, Error)]
pub enum CarveError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unexpected end of input.
    #[error("Unexpected end of input after {consumed} bytes")]
    UnexpectedEof {
        /// Bytes consumed from the source before it ran dry.
        consumed: u64,
    },

    /// Invalid or reserved header field.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Unsupported compression method.
    #[error("Unsupported compression method: {method}")]
    UnsupportedMethod {
        /// The compression method byte.
        method: u8,
    },

    /// Invalid Huffman code encountered during decoding.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// Corrupted compressed data.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset (relative to the start of the stream) of the problem.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Back-reference pointing before the start of the output.
    #[error("Invalid back-reference: distance {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// Requested distance (1-based).
        distance: usize,
        /// Bytes currently held in the window.
        history_size: usize,
    },

    /// CRC-32 trailer does not match the decompressed data.
    #[error("CRC mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    CrcMismatch {
        /// CRC-32 recorded in the trailer.
        expected: u32,
        /// CRC-32 of the decompressed data.
        computed: u32,
    },

    /// ISIZE trailer does not match the decompressed length.
    #[error("Size mismatch: expected {expected} bytes, decompressed {computed}")]
    SizeMismatch {
        /// ISIZE recorded in the trailer.
        expected: u32,
        /// Decompressed length modulo 2^32.
        computed: u32,
    },

    /// FHCRC header checksum does not match the header bytes.
    #[error("Header CRC mismatch: expected {expected:#06x}, computed {computed:#06x}")]
    HeaderCrcMismatch {
        /// CRC16 stored in the header.
        expected: u16,
        /// Low 16 bits of the CRC-32 of the header bytes.
        computed: u16,
    },

    /// Output artifact already exists.
    #[error("Refusing to overwrite existing file: {}", path.display())]
    OutputExists {
        /// Target path.
        path: PathBuf,
    },

    /// Output directory could not be created or is not a directory.
    #[error("Cannot use output directory {}: {message}", path.display())]
    OutputDirectory {
        /// Directory path.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },
}

/// Result type alias for gzcarve operations.
pub type Result<T> = std::result::Result<T, CarveError>;

impl CarveError {
    /// Create an unexpected EOF error.
    pub fn unexpected_eof(consumed: u64) -> Self {
        Self::UnexpectedEof { consumed }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an unsupported method error.
    pub fn unsupported_method(method: u8) -> Self {
        Self::UnsupportedMethod { method }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create a size mismatch error.
    pub fn size_mismatch(expected: u32, computed: u32) -> Self {
        Self::SizeMismatch { expected, computed }
    }

    /// Create a header CRC mismatch error.
    pub fn header_crc_mismatch(expected: u16, computed: u16) -> Self {
        Self::HeaderCrcMismatch { expected, computed }
    }

    /// Create an output-exists error.
    pub fn output_exists(path: impl Into<PathBuf>) -> Self {
        Self::OutputExists { path: path.into() }
    }

    /// Create an output directory error.
    pub fn output_directory(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::OutputDirectory {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UnexpectedEof { .. } => ErrorClass::StreamExhausted,
            Self::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => ErrorClass::StreamExhausted,
            Self::Io(_) | Self::OutputExists { .. } | Self::OutputDirectory { .. } => {
                ErrorClass::ResourceFailure
            }
            Self::InvalidHeader { .. }
            | Self::UnsupportedMethod { .. }
            | Self::InvalidHuffmanCode { .. }
            | Self::CorruptedData { .. }
            | Self::InvalidDistance { .. }
            | Self::CrcMismatch { .. }
            | Self::SizeMismatch { .. }
            | Self::HeaderCrcMismatch { .. } => ErrorClass::StructuralViolation,
        }
    }

    /// Whether this error only invalidates the current candidate.
    pub fn is_recoverable(&self) -> bool {
        self.class() != ErrorClass::ResourceFailure
    }
}
