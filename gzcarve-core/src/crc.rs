//! CRC-32 (ISO 3309) as used by the GZIP trailer.
//!
//! The lookup tables are computed at compile time and shared by every
//! [`Crc32`] instance; nothing is mutated after construction.
//!
//! Bulk updates use the "slicing-by-8" technique for slices of 16 bytes or
//! more, processing 8 bytes per step with 8 lookup tables. The decoder feeds
//! one byte at a time through [`Crc32::add_byte`], which uses the single
//! table.

/// Reflected CRC-32 polynomial.
const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Register value before the first byte and the final XOR mask.
const INITIAL: u32 = 0xFFFF_FFFF;

/// Byte-at-a-time lookup table.
const CRC32_TABLE: [u32; 256] = CRC32_TABLE_SLICE[0];

/// Slicing-by-8 tables; `[k][b]` advances byte `b` through `k` further
/// zero bytes.
const CRC32_TABLE_SLICE: [[u32; 256]; 8] = slice_tables();

const fn byte_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut byte = 0;
    while byte < 256 {
        let mut reg = byte as u32;
        let mut bit = 0;
        while bit < 8 {
            let mask = (reg & 1).wrapping_neg();
            reg = (reg >> 1) ^ (POLYNOMIAL & mask);
            bit += 1;
        }
        table[byte] = reg;
        byte += 1;
    }
    table
}

const fn slice_tables() -> [[u32; 256]; 8] {
    let mut tables = [[0u32; 256]; 8];
    tables[0] = byte_table();

    let mut k = 1;
    while k < 8 {
        let mut byte = 0;
        while byte < 256 {
            let prev = tables[k - 1][byte];
            tables[k][byte] = tables[0][(prev & 0xFF) as usize] ^ (prev >> 8);
            byte += 1;
        }
        k += 1;
    }
    tables
}

/// Streaming CRC-32 calculator.
///
/// - Polynomial: 0x04C11DB7 (reflected: 0xEDB88320)
/// - Initial value: 0xFFFFFFFF
/// - Final XOR: 0xFFFFFFFF
///
/// The CRC of an empty sequence is 0.
///
/// # Example
///
/// ```
/// use gzcarve_core::crc::Crc32;
///
/// let mut crc = Crc32::new();
/// for &b in b"123456789" {
///     crc.add_byte(b);
/// }
/// assert_eq!(crc.value(), 0xCBF43926);
/// ```
#[derive(Debug, Clone)]
pub struct Crc32 {
    reg: u32,
}

impl Crc32 {
    /// Create a new CRC-32 calculator.
    pub fn new() -> Self {
        Self { reg: INITIAL }
    }

    /// Reset the CRC to its initial state.
    pub fn reset(&mut self) {
        self.reg = INITIAL;
    }

    /// Fold a single byte into the CRC.
    #[inline(always)]
    pub fn add_byte(&mut self, byte: u8) {
        self.reg = step(self.reg, byte);
    }

    /// Update the CRC with more data.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        self.reg = if data.len() >= 16 {
            slice8(self.reg, data)
        } else {
            data.iter().fold(self.reg, |reg, &byte| step(reg, byte))
        };
    }

    /// Get the current CRC value.
    #[inline(always)]
    pub fn value(&self) -> u32 {
        self.reg ^ INITIAL
    }

    /// Compute CRC-32 for a slice in one call.
    pub fn compute(data: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(data);
        crc.value()
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(always)]
fn step(reg: u32, byte: u8) -> u32 {
    CRC32_TABLE[((reg ^ u32::from(byte)) & 0xFF) as usize] ^ (reg >> 8)
}

/// Eight bytes per step, then the tail one byte at a time.
fn slice8(mut reg: u32, data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(8);

    for chunk in &mut chunks {
        let lo = reg ^ u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let hi = [chunk[4], chunk[5], chunk[6], chunk[7]];

        reg = lo
            .to_le_bytes()
            .iter()
            .chain(hi.iter())
            .enumerate()
            .fold(0, |acc, (i, &b)| acc ^ CRC32_TABLE_SLICE[7 - i][b as usize]);
    }

    chunks.remainder().iter().fold(reg, |reg, &byte| step(reg, byte))
}
