//! Validation of one candidate GZIP member inside a host buffer.

use super::header::{GZIP_MAGIC, GzipHeader};
use gzcarve_core::BitReader;
use gzcarve_core::error::{CarveError, Result};
use gzcarve_deflate::DeflateValidator;
use std::io::{Cursor, Read};

/// A GZIP member confirmed valid down to its trailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// Offset of the magic bytes in the host buffer.
    pub offset: u64,
    /// On-disk length, magic through ISIZE.
    pub length: u64,
    /// Parsed header.
    pub header: GzipHeader,
    /// CRC-32 of the decompressed data, as recorded and verified.
    pub crc32: u32,
    /// Decompressed size modulo 2^32, as recorded and verified.
    pub isize: u32,
}

impl MemberInfo {
    /// Byte range of the member within the host buffer.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset as usize..(self.offset + self.length) as usize
    }

    /// Stored original filename, if any.
    pub fn name(&self) -> Option<&str> {
        self.header.filename.as_deref()
    }
}

/// How far validation of one candidate got.
#[derive(Debug)]
pub struct MemberCheck {
    /// The header parsed and at least one byte follows it.
    pub header_valid: bool,
    /// The complete member, or why it was rejected.
    pub result: Result<MemberInfo>,
}

impl MemberCheck {
    fn rejected(header_valid: bool, error: CarveError) -> Self {
        Self {
            header_valid,
            result: Err(error),
        }
    }

    /// Whether the whole member validated.
    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }
}

/// Validates candidate members, reusing one decoder across attempts.
#[derive(Debug, Default)]
pub struct MemberValidator {
    deflate: DeflateValidator,
    verify_header_crc: bool,
}

impl MemberValidator {
    /// Create a validator.
    pub fn new(verify_header_crc: bool) -> Self {
        Self {
            deflate: DeflateValidator::new(),
            verify_header_crc,
        }
    }

    /// Validate the member whose magic bytes sit at `offset` in `host`.
    ///
    /// Nothing outside `host` is touched; on failure the caller simply
    /// resumes scanning from wherever it chooses.
    pub fn check(&mut self, host: &[u8], offset: usize) -> MemberCheck {
        let Some(body) = host
            .get(offset..)
            .filter(|rest| rest.starts_with(&GZIP_MAGIC))
            .map(|rest| &rest[GZIP_MAGIC.len()..])
        else {
            return MemberCheck::rejected(false, CarveError::invalid_header("No GZIP magic"));
        };
        let mut cursor = Cursor::new(body);

        let header = match GzipHeader::read_after_magic(&mut cursor, self.verify_header_crc) {
            Ok(header) => header,
            Err(e) => return MemberCheck::rejected(false, e),
        };

        if cursor.position() as usize >= body.len() {
            return MemberCheck::rejected(false, CarveError::unexpected_eof(header.len));
        }

        let result = self.check_body(&mut cursor, header, offset as u64);
        MemberCheck {
            header_valid: true,
            result,
        }
    }

    fn check_body(
        &mut self,
        cursor: &mut Cursor<&[u8]>,
        header: GzipHeader,
        offset: u64,
    ) -> Result<MemberInfo> {
        // The bit reader pulls one byte at a time, so the cursor ends up
        // exactly after the last byte of the DEFLATE stream.
        let summary = {
            let mut reader = BitReader::new(&mut *cursor);
            self.deflate.validate(&mut reader)?
        };

        let mut trailer = [0u8; 8];
        cursor.read_exact(&mut trailer)?;
        let crc32 = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        let isize = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);

        if crc32 != summary.crc32 {
            return Err(CarveError::crc_mismatch(crc32, summary.crc32));
        }
        if isize != summary.decompressed_len as u32 {
            return Err(CarveError::size_mismatch(
                isize,
                summary.decompressed_len as u32,
            ));
        }

        Ok(MemberInfo {
            offset,
            length: GZIP_MAGIC.len() as u64 + cursor.position(),
            header,
            crc32,
            isize,
        })
    }
}
