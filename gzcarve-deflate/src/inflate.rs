//! DEFLATE stream validation (inflate).
//!
//! [`DeflateValidator`] decodes a DEFLATE stream (RFC 1951) block by block
//! into a [`WindowSink`] and reports the decompressed length and CRC-32.
//! All three block types are supported:
//! - Type 0: Stored (uncompressed)
//! - Type 1: Fixed Huffman codes
//! - Type 2: Dynamic Huffman codes
//!
//! The validator is built for speculative decoding: any structural problem
//! or premature end of input is returned as an error and leaves nothing
//! behind but the sink state, which the next attempt resets.

use crate::huffman::{
    CODELEN_ALPHABET_SIZE, DISTANCE_ALPHABET_SIZE, END_OF_BLOCK, HuffmanTree, LITLEN_ALPHABET_SIZE,
};
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS, decode_back_distance,
    decode_length, fixed_distance_tree, fixed_litlen_tree,
};
use gzcarve_core::error::{CarveError, Result};
use gzcarve_core::{BitReader, WindowSink};
use std::io::{Cursor, Read};

/// Length symbol whose 5 extra bits could spell 258, which must be coded
/// as symbol 285 instead.
const LENGTH_284: u16 = 284;

/// Outcome of a successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeflateSummary {
    /// Bytes of compressed input consumed, including the partial last byte.
    pub compressed_len: u64,
    /// Total decompressed bytes.
    pub decompressed_len: u64,
    /// CRC-32 of the decompressed bytes.
    pub crc32: u32,
    /// Number of blocks decoded.
    pub blocks: usize,
}

/// DEFLATE block decoder driving a [`WindowSink`].
#[derive(Debug, Default)]
pub struct DeflateValidator {
    sink: WindowSink,
    blocks: usize,
}

impl DeflateValidator {
    /// Create a validator that keeps only the 32 KB history window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator that also keeps the full decompressed output.
    pub fn capturing() -> Self {
        Self {
            sink: WindowSink::capturing(),
            blocks: 0,
        }
    }

    /// Output sink of the last attempt.
    pub fn sink(&self) -> &WindowSink {
        &self.sink
    }

    /// Take the output captured by the last attempt.
    ///
    /// Returns `None` unless the validator was created with
    /// [`capturing`](Self::capturing).
    pub fn take_output(&mut self) -> Option<Vec<u8>> {
        self.sink.take_output()
    }

    /// Forget everything decoded so far.
    pub fn reset(&mut self) {
        self.sink.reset();
        self.blocks = 0;
    }

    /// Decode one complete DEFLATE stream from `reader`.
    ///
    /// The sink is reset first, so a validator can be reused across
    /// attempts. On success the reader is left just after the final block;
    /// any unused bits of its last byte are padding.
    pub fn validate<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<DeflateSummary> {
        self.reset();
        let start = reader.bytes_consumed();

        loop {
            let final_block = self.inflate_block(reader)?;
            self.blocks += 1;
            if final_block {
                break;
            }
        }

        Ok(DeflateSummary {
            compressed_len: reader.bytes_consumed() - start,
            decompressed_len: self.sink.total_len(),
            crc32: self.sink.crc32(),
            blocks: self.blocks,
        })
    }

    /// Decode a single block; returns its BFINAL flag.
    fn inflate_block<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<bool> {
        let bfinal = reader.read_bit()?;
        let btype = reader.read_bits(2)?;

        log::trace!(
            "block {} at bit {}: type {}, final {}",
            self.blocks,
            reader.bit_position() - 3,
            btype,
            bfinal
        );

        match btype {
            0 => self.inflate_stored(reader)?,
            1 => self.inflate_huffman(reader, fixed_litlen_tree(), fixed_distance_tree())?,
            2 => self.inflate_dynamic(reader)?,
            _ => return Err(CarveError::invalid_header("Reserved block type 3")),
        }

        Ok(bfinal)
    }

    /// Decode a stored (uncompressed) block.
    fn inflate_stored<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<()> {
        reader.align_to_byte();

        let len = reader.read_u16_le()?;
        let nlen = reader.read_u16_le()?;

        if len != !nlen {
            return Err(CarveError::corrupted(
                reader.bytes_consumed(),
                format!("LEN/NLEN mismatch: {:#06x} vs {:#06x}", len, nlen),
            ));
        }

        for _ in 0..len {
            self.sink.append_byte(reader.read_u8()?);
        }

        Ok(())
    }

    /// Decode a block with dynamic Huffman codes.
    fn inflate_dynamic<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<()> {
        let hlit = reader.read_bits(5)? as usize + 257;
        let hdist = reader.read_bits(5)? as usize + 1;
        let hclen = reader.read_bits(4)? as usize + 4;

        if hlit > LITLEN_ALPHABET_SIZE {
            return Err(CarveError::corrupted(
                reader.bytes_consumed(),
                format!("Too many literal/length codes: {}", hlit),
            ));
        }

        let mut code_length_lengths = [0u8; CODELEN_ALPHABET_SIZE];
        for &position in &CODE_LENGTH_ORDER[..hclen] {
            code_length_lengths[position] = reader.read_bits(3)? as u8;
        }
        let code_length_tree = HuffmanTree::from_code_lengths(&code_length_lengths)?;

        // Literal/length and distance lengths form one run-length coded
        // sequence; runs may cross from one alphabet into the other.
        let mut all_lengths = vec![0u8; hlit + hdist];
        let mut i = 0;

        while i < all_lengths.len() {
            let symbol = code_length_tree.decode(reader)?;

            let (value, repeat) = match symbol {
                0..=15 => (symbol as u8, 1),
                16 => {
                    if i == 0 {
                        return Err(CarveError::corrupted(
                            reader.bytes_consumed(),
                            "Code 16 with no previous length",
                        ));
                    }
                    (all_lengths[i - 1], reader.read_bits(2)? as usize + 3)
                }
                17 => (0, reader.read_bits(3)? as usize + 3),
                18 => (0, reader.read_bits(7)? as usize + 11),
                _ => return Err(CarveError::invalid_huffman(reader.bit_position())),
            };

            if i + repeat > all_lengths.len() {
                return Err(CarveError::corrupted(
                    reader.bytes_consumed(),
                    "Code length overflow",
                ));
            }
            all_lengths[i..i + repeat].fill(value);
            i += repeat;
        }

        let (litlen_lengths, dist_lengths) = all_lengths.split_at(hlit);
        let litlen_tree = HuffmanTree::from_code_lengths(litlen_lengths)?;
        let dist_tree = HuffmanTree::from_code_lengths(dist_lengths)?;

        self.inflate_huffman(reader, &litlen_tree, &dist_tree)
    }

    /// Decode literal/length and distance symbols until end of block.
    fn inflate_huffman<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        litlen_tree: &HuffmanTree,
        dist_tree: &HuffmanTree,
    ) -> Result<()> {
        loop {
            let symbol = litlen_tree.decode(reader)?;

            match symbol {
                0..=255 => self.sink.append_byte(symbol as u8),
                END_OF_BLOCK => return Ok(()),
                257..=285 => {
                    let extra_bits = LENGTH_EXTRA_BITS[usize::from(symbol - 257)];
                    let extra = reader.read_bits(extra_bits)?;
                    if symbol == LENGTH_284 && extra == 31 {
                        return Err(CarveError::corrupted(
                            reader.bytes_consumed(),
                            "Length 258 coded with symbol 284",
                        ));
                    }
                    let length = decode_length(symbol, extra);

                    let dist_symbol = dist_tree.decode(reader)?;
                    if usize::from(dist_symbol) >= DISTANCE_ALPHABET_SIZE {
                        return Err(CarveError::corrupted(
                            reader.bytes_consumed(),
                            format!("Invalid distance code: {}", dist_symbol),
                        ));
                    }
                    let extra =
                        reader.read_bits(DISTANCE_EXTRA_BITS[usize::from(dist_symbol)])?;
                    let back_distance = decode_back_distance(dist_symbol, extra);

                    self.sink.repeat_fragment(back_distance, length)?;
                }
                _ => {
                    return Err(CarveError::corrupted(
                        reader.bytes_consumed(),
                        format!("Invalid literal/length code: {}", symbol),
                    ));
                }
            }
        }
    }
}

/// Validate a complete DEFLATE stream held in memory.
pub fn validate(data: &[u8]) -> Result<DeflateSummary> {
    let mut reader = BitReader::new(Cursor::new(data));
    DeflateValidator::new().validate(&mut reader)
}

/// Decompress a complete DEFLATE stream held in memory.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = BitReader::new(Cursor::new(data));
    let mut validator = DeflateValidator::capturing();
    validator.validate(&mut reader)?;
    Ok(validator.take_output().unwrap_or_default())
}
