//! Fixed Huffman trees and symbol tables for DEFLATE (RFC 1951).

use crate::huffman::HuffmanTree;
use std::sync::OnceLock;

/// Get the fixed literal/length Huffman tree (RFC 1951 Section 3.2.6).
///
/// - Symbols 0-143: 8 bits, codes 00110000-10111111
/// - Symbols 144-255: 9 bits, codes 110010000-111111111
/// - Symbols 256-279: 7 bits, codes 0000000-0010111
/// - Symbols 280-285: 8 bits, codes 11000000-11000101
///
/// Symbols 286 and 287 take part in code construction but are never given
/// a leaf, so their bit patterns decode as invalid.
///
/// Built on first use and shared for the rest of the process.
pub fn fixed_litlen_tree() -> &'static HuffmanTree {
    static TREE: OnceLock<HuffmanTree> = OnceLock::new();

    TREE.get_or_init(|| {
        build_fixed(&[
            (256..=279, 0b000_0000, 7),
            (0..=143, 0b0011_0000, 8),
            (280..=285, 0b1100_0000, 8),
            (144..=255, 0b1_1001_0000, 9),
        ])
    })
}

/// Get the fixed distance Huffman tree.
///
/// Symbols 0-29 use 5-bit codes equal to the symbol; 30 and 31 are invalid.
pub fn fixed_distance_tree() -> &'static HuffmanTree {
    static TREE: OnceLock<HuffmanTree> = OnceLock::new();

    TREE.get_or_init(|| build_fixed(&[(0..=29, 0, 5)]))
}

fn build_fixed(ranges: &[(std::ops::RangeInclusive<u16>, u32, u8)]) -> HuffmanTree {
    let mut tree = HuffmanTree::new();
    for (symbols, first_code, length) in ranges {
        for (i, symbol) in symbols.clone().enumerate() {
            tree.place(symbol, first_code + i as u32, *length)
                .expect("Fixed tree construction should never fail");
        }
    }
    tree
}

/// Length code base values (RFC 1951 Section 3.2.5).
///
/// For length codes 257-285, this gives the base length value.
/// Extra bits are added to get the final length.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, // 257-264: 0 extra bits
    11, 13, 15, 17, // 265-268: 1 extra bit
    19, 23, 27, 31, // 269-272: 2 extra bits
    35, 43, 51, 59, // 273-276: 3 extra bits
    67, 83, 99, 115, // 277-280: 4 extra bits
    131, 163, 195, 227, // 281-284: 5 extra bits
    258, // 285: 0 extra bits (special case)
];

/// Number of extra bits for length codes 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, // 257-264
    1, 1, 1, 1, // 265-268
    2, 2, 2, 2, // 269-272
    3, 3, 3, 3, // 273-276
    4, 4, 4, 4, // 277-280
    5, 5, 5, 5, // 281-284
    0, // 285
];

/// Distance code base values (RFC 1951 Section 3.2.5).
///
/// For distance codes 0-29, this gives the base distance value (1-based).
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, // 0-3: 0 extra bits
    5, 7, // 4-5: 1 extra bit
    9, 13, // 6-7: 2 extra bits
    17, 25, // 8-9: 3 extra bits
    33, 49, // 10-11: 4 extra bits
    65, 97, // 12-13: 5 extra bits
    129, 193, // 14-15: 6 extra bits
    257, 385, // 16-17: 7 extra bits
    513, 769, // 18-19: 8 extra bits
    1025, 1537, // 20-21: 9 extra bits
    2049, 3073, // 22-23: 10 extra bits
    4097, 6145, // 24-25: 11 extra bits
    8193, 12289, // 26-27: 12 extra bits
    16385, 24577, // 28-29: 13 extra bits
];

/// Number of extra bits for distance codes 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, // 0-3
    1, 1, // 4-5
    2, 2, // 6-7
    3, 3, // 8-9
    4, 4, // 10-11
    5, 5, // 12-13
    6, 6, // 14-15
    7, 7, // 16-17
    8, 8, // 18-19
    9, 9, // 20-21
    10, 10, // 22-23
    11, 11, // 24-25
    12, 12, // 26-27
    13, 13, // 28-29
];

/// Order of code length codes in dynamic block header.
///
/// Code length codes are transmitted in this order (RFC 1951 Section 3.2.7).
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Decode a length from a length code (257-285) and its extra bits.
pub fn decode_length(code: u16, extra: u32) -> usize {
    debug_assert!((257..=285).contains(&code), "Invalid length code: {}", code);
    LENGTH_BASE[usize::from(code - 257)] as usize + extra as usize
}

/// Decode a zero-based back distance from a distance code (0-29) and its
/// extra bits. Back distance 0 refers to the most recent output byte.
pub fn decode_back_distance(code: u16, extra: u32) -> usize {
    debug_assert!(code < 30, "Invalid distance code: {}", code);
    DISTANCE_BASE[usize::from(code)] as usize - 1 + extra as usize
}
