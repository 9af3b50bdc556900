//! GZIP header parsing.

use gzcarve_core::Crc32;
use gzcarve_core::error::{CarveError, Result};
use std::io::Read;

/// GZIP magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// GZIP compression method: DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// Operating system byte meaning "unknown".
pub const OS_UNKNOWN: u8 = 255;

/// GZIP header flags.
pub mod flags {
    /// Text file.
    pub const FTEXT: u8 = 0x01;
    /// Header CRC present.
    pub const FHCRC: u8 = 0x02;
    /// Extra field present.
    pub const FEXTRA: u8 = 0x04;
    /// Original filename present.
    pub const FNAME: u8 = 0x08;
    /// Comment present.
    pub const FCOMMENT: u8 = 0x10;
    /// Bits 5-7, which must be zero.
    pub const RESERVED: u8 = 0xE0;
}

/// Whether `os` is one of the operating systems listed in RFC 1952.
pub fn is_known_os(os: u8) -> bool {
    os <= 13 || os == OS_UNKNOWN
}

/// Parsed GZIP member header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipHeader {
    /// Flags.
    pub flags: u8,
    /// Modification time (Unix timestamp).
    pub mtime: u32,
    /// Extra flags.
    pub xfl: u8,
    /// Operating system.
    pub os: u8,
    /// Length of the extra field payload (if FEXTRA flag set).
    pub extra_len: Option<u16>,
    /// Original filename (if FNAME flag set).
    pub filename: Option<String>,
    /// Comment (if FCOMMENT flag set).
    pub comment: Option<String>,
    /// Header CRC16 (if FHCRC flag set).
    pub header_crc: Option<u16>,
    /// Header size in bytes, magic included.
    pub len: u64,
}

impl GzipHeader {
    /// Read a header whose magic bytes have already been consumed.
    ///
    /// When `verify_crc` is set and the header carries FHCRC, the stored
    /// CRC16 must equal the low 16 bits of the CRC-32 of every header byte
    /// before it, magic included.
    pub fn read_after_magic<R: Read>(reader: &mut R, verify_crc: bool) -> Result<Self> {
        let mut reader = HeaderReader::new(reader);

        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;

        let method = buf[0];
        if method != CM_DEFLATE {
            return Err(CarveError::unsupported_method(method));
        }

        let flags = buf[1];
        if flags & flags::RESERVED != 0 {
            return Err(CarveError::invalid_header(format!(
                "Reserved flag bits set: {:#04x}",
                flags
            )));
        }

        let mtime = u32::from_le_bytes([buf[2], buf[3], buf[4], buf[5]]);
        let xfl = buf[6];
        let os = buf[7];
        if !is_known_os(os) {
            return Err(CarveError::invalid_header(format!(
                "Unknown operating system: {}",
                os
            )));
        }

        // Extra field: 2-byte length, payload skipped
        let mut extra_len = None;
        if flags & flags::FEXTRA != 0 {
            let xlen = reader.read_u16_le()?;
            reader.skip(u64::from(xlen))?;
            extra_len = Some(xlen);
        }

        let filename = if flags & flags::FNAME != 0 {
            Some(reader.read_null_terminated()?)
        } else {
            None
        };

        let comment = if flags & flags::FCOMMENT != 0 {
            Some(reader.read_null_terminated()?)
        } else {
            None
        };

        let mut header_crc = None;
        if flags & flags::FHCRC != 0 {
            let computed = reader.crc.value() as u16;
            let stored = reader.read_u16_le()?;
            if verify_crc && stored != computed {
                return Err(CarveError::header_crc_mismatch(stored, computed));
            }
            header_crc = Some(stored);
        }

        Ok(Self {
            flags,
            mtime,
            xfl,
            os,
            extra_len,
            filename,
            comment,
            header_crc,
            len: reader.consumed + GZIP_MAGIC.len() as u64,
        })
    }
}

/// Reader that counts header bytes and folds them into a CRC-32.
struct HeaderReader<'a, R: Read> {
    inner: &'a mut R,
    crc: Crc32,
    consumed: u64,
}

impl<'a, R: Read> HeaderReader<'a, R> {
    fn new(inner: &'a mut R) -> Self {
        let mut crc = Crc32::new();
        crc.update(&GZIP_MAGIC);
        Self {
            inner,
            crc,
            consumed: 0,
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf)?;
        self.crc.update(buf);
        self.consumed += buf.len() as u64;
        Ok(())
    }

    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u16_le(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn skip(&mut self, count: u64) -> Result<()> {
        for _ in 0..count {
            self.read_u8()?;
        }
        Ok(())
    }

    fn read_null_terminated(&mut self) -> Result<String> {
        let mut bytes = Vec::new();
        loop {
            match self.read_u8()? {
                0 => break,
                byte => bytes.push(byte),
            }
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
