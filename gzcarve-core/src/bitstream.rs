//! Bit-level reading for DEFLATE streams.
//!
//! [`BitReader`] turns a byte source into individually fetchable bits.
//!
//! # Bit Ordering
//!
//! DEFLATE packs bits LSB-first within each byte, and multi-bit values are
//! assembled with the first bit fetched in bit 0 of the result.
//!
//! # Refill Policy
//!
//! Bytes are pulled from the source one at a time, and only when the current
//! byte has no unconsumed bits left. The reader therefore never holds more
//! than one byte beyond what the decoder has asked for, so when a DEFLATE
//! stream ends the underlying source is positioned exactly at the first byte
//! after it (the GZIP trailer, for instance).
//!
//! # Example
//!
//! ```
//! use gzcarve_core::bitstream::BitReader;
//! use std::io::Cursor;
//!
//! let mut reader = BitReader::new(Cursor::new([0b1010_1101u8]));
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(5).unwrap(), 0b10101);
//! assert!(reader.read_bits(1).is_err());
//! ```

use crate::error::{CarveError, Result};
use std::io::{ErrorKind, Read};

/// A bit-level reader that wraps any `Read` implementation.
///
/// Once the source runs dry the reader is permanently exhausted: every
/// further fetch fails, even for zero-bit requests.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    /// Underlying reader.
    reader: R,
    /// Partially consumed byte; unconsumed bits sit at the bottom.
    current: u8,
    /// Number of unconsumed bits in `current` (0-7 between calls).
    bits_left: u8,
    /// Total bytes pulled from `reader`.
    bytes_consumed: u64,
    /// Set once the source has ended.
    exhausted: bool,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            current: 0,
            bits_left: 0,
            bytes_consumed: 0,
            exhausted: false,
        }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Consume this `BitReader` and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Total number of source bytes read so far.
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    /// Current bit position (for error reporting).
    pub fn bit_position(&self) -> u64 {
        self.bytes_consumed * 8 - u64::from(self.bits_left)
    }

    /// Whether the source has ended.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Pull the next byte from the source into `current`.
    fn refill(&mut self) -> Result<()> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => {
                    self.exhausted = true;
                    return Err(CarveError::unexpected_eof(self.bytes_consumed));
                }
                Ok(_) => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.exhausted = true;
                    return Err(e.into());
                }
            }
        }

        self.current = byte[0];
        self.bits_left = 8;
        self.bytes_consumed += 1;
        Ok(())
    }

    /// Read up to 32 bits from the stream.
    ///
    /// # Arguments
    ///
    /// * `count` - Number of bits to read (0-32)
    ///
    /// # Returns
    ///
    /// The bits read as a u32, with the first bit read in the LSB position.
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");

        if self.exhausted {
            return Err(CarveError::unexpected_eof(self.bytes_consumed));
        }

        let mut value = 0u32;
        let mut filled = 0u8;
        while filled < count {
            if self.bits_left == 0 {
                self.refill()?;
            }

            // Take as many bits as this byte offers in one go
            let take = (count - filled).min(self.bits_left);
            let mask = (1u32 << take) - 1;
            value |= (u32::from(self.current) & mask) << filled;

            self.current = if take == 8 { 0 } else { self.current >> take };
            self.bits_left -= take;
            filled += take;
        }

        Ok(value)
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Read a whole byte (8 bits, not necessarily aligned).
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Read a 16-bit little-endian value.
    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(self.read_bits(16)? as u16)
    }

    /// Discard the unconsumed bits of the current byte.
    ///
    /// Stored blocks start on a byte boundary; this moves there.
    pub fn align_to_byte(&mut self) {
        self.current = 0;
        self.bits_left = 0;
    }
}
