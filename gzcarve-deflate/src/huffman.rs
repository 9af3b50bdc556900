//! Canonical Huffman decoding for DEFLATE.
//!
//! Codes are stored in a binary trie held in a flat arena: each node is
//! either a branch with up to two children or a leaf carrying a symbol.
//! Decoding walks the trie one bit at a time. A bit that leads nowhere
//! means the input is not a valid code under this table, which is reported
//! as [`CarveError::InvalidHuffmanCode`] rather than treated as a bug: the
//! scanner feeds this decoder arbitrary bytes.
//!
//! # Alphabets
//!
//! DEFLATE uses three Huffman alphabets:
//! - **Literal/Length**: 0-285 (0-255 literals, 256 EOB, 257-285 lengths)
//! - **Distance**: 0-29 (back-reference distances)
//! - **Code Length**: 0-18 (for encoding dynamic Huffman trees)

use gzcarve_core::BitReader;
use gzcarve_core::error::{CarveError, Result};
use std::io::Read;

/// Maximum code length in DEFLATE (15 bits).
pub const MAX_CODE_LENGTH: u8 = 15;

/// Size of the literal/length alphabet (0-285).
pub const LITLEN_ALPHABET_SIZE: usize = 286;

/// Size of the distance alphabet (0-29).
pub const DISTANCE_ALPHABET_SIZE: usize = 30;

/// Size of the code length alphabet (0-18).
pub const CODELEN_ALPHABET_SIZE: usize = 19;

/// End of block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// Child index meaning "no child". The root lives at index 0 and is never
/// anybody's child, so 0 is free to act as the sentinel.
const NO_CHILD: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    /// Children reached by a 0 bit and a 1 bit.
    Branch([u32; 2]),
    Leaf(u16),
}

/// A Huffman decoding trie.
///
/// # Example
///
/// ```
/// use gzcarve_core::BitReader;
/// use gzcarve_deflate::HuffmanTree;
/// use std::io::Cursor;
///
/// // A=0, B=10, C=11
/// let tree = HuffmanTree::from_code_lengths(&[1, 2, 2]).unwrap();
///
/// // Codes are read MSB-first, bits are packed LSB-first: "10" then "0"
/// let mut reader = BitReader::new(Cursor::new([0b001]));
/// assert_eq!(tree.decode(&mut reader).unwrap(), 1);
/// assert_eq!(tree.decode(&mut reader).unwrap(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    leaves: usize,
}

impl HuffmanTree {
    /// Create a tree with no codes.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    fn with_capacity(symbols: usize) -> Self {
        let mut nodes = Vec::with_capacity(2 * symbols + 1);
        nodes.push(Node::Branch([NO_CHILD; 2]));
        Self { nodes, leaves: 0 }
    }

    /// Number of symbols that have a code.
    pub fn symbol_count(&self) -> usize {
        self.leaves
    }

    /// Whether no symbol has a code.
    pub fn is_empty(&self) -> bool {
        self.leaves == 0
    }

    /// Insert `symbol` under the `length`-bit `code`.
    ///
    /// The code is walked from its most significant bit down. Fails if the
    /// length is out of range, the code does not fit in `length` bits, or
    /// the code collides with one already placed (over-subscribed table).
    pub fn place(&mut self, symbol: u16, code: u32, length: u8) -> Result<()> {
        if length == 0 || length > MAX_CODE_LENGTH {
            return Err(CarveError::invalid_header(format!(
                "Code length {} out of range 1-{}",
                length, MAX_CODE_LENGTH
            )));
        }
        if code >> length != 0 {
            return Err(CarveError::invalid_header("Over-subscribed Huffman code"));
        }

        let mut node = 0usize;
        for shift in (0..length).rev() {
            let bit = ((code >> shift) & 1) as usize;
            let last = shift == 0;

            let children = match self.nodes[node] {
                Node::Branch(children) => children,
                Node::Leaf(_) => {
                    return Err(CarveError::invalid_header("Over-subscribed Huffman code"));
                }
            };

            let child = children[bit];
            if child == NO_CHILD {
                let index = self.nodes.len() as u32;
                self.nodes.push(if last {
                    Node::Leaf(symbol)
                } else {
                    Node::Branch([NO_CHILD; 2])
                });
                if let Node::Branch(children) = &mut self.nodes[node] {
                    children[bit] = index;
                }
                node = index as usize;
            } else if last {
                return Err(CarveError::invalid_header("Over-subscribed Huffman code"));
            } else {
                node = child as usize;
            }
        }

        self.leaves += 1;
        Ok(())
    }

    /// Build a canonical Huffman tree from code lengths.
    ///
    /// `code_lengths[i]` is the bit length for symbol `i`; 0 means the
    /// symbol has no code. Codes are handed out in increasing order,
    /// shortest length first and by symbol within a length, shifting left
    /// by one bit each time the length grows (RFC 1951 Section 3.2.2).
    /// An all-zero table yields an empty tree, on which every decode fails.
    pub fn from_code_lengths(code_lengths: &[u8]) -> Result<Self> {
        let mut tree = Self::with_capacity(code_lengths.len());

        let used = code_lengths.iter().copied().filter(|&len| len > 0);
        let (Some(min_length), Some(max_length)) = (used.clone().min(), used.max()) else {
            return Ok(tree);
        };

        let mut code = 0u32;
        for length in min_length..=max_length {
            for (symbol, _) in code_lengths
                .iter()
                .enumerate()
                .filter(|&(_, &len)| len == length)
            {
                tree.place(symbol as u16, code, length)?;
                code += 1;
            }
            code <<= 1;
        }

        Ok(tree)
    }

    /// Decode one symbol from the bit stream.
    #[inline]
    pub fn decode<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u16> {
        let mut node = 0usize;
        loop {
            match self.nodes[node] {
                Node::Leaf(symbol) => return Ok(symbol),
                Node::Branch(children) => {
                    let bit = reader.read_bit()?;
                    let child = children[usize::from(bit)];
                    if child == NO_CHILD {
                        return Err(CarveError::invalid_huffman(reader.bit_position()));
                    }
                    node = child as usize;
                }
            }
        }
    }
}

impl Default for HuffmanTree {
    fn default() -> Self {
        Self::new()
    }
}
