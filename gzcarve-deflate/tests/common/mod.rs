//! Shared helpers for the integration tests.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::{DeflateEncoder, GzEncoder};
use std::io::Write;

/// Repeating English-like text.
pub fn text_like(size: usize) -> Vec<u8> {
    b"It was the best of times, it was the worst of times, it was the age of wisdom. "
        .iter()
        .copied()
        .cycle()
        .take(size)
        .collect()
}

/// Deterministic noise that defeats the compressor.
pub fn noise(size: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    (0..size)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// Raw DEFLATE stream at the given level.
pub fn deflate(data: &[u8], level: u32) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Complete gzip member at the given level.
pub fn gzip(data: &[u8], level: u32) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// LSB-first bit packer for hand-built DEFLATE streams.
#[derive(Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    used: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `count` bits of `value`, least significant first.
    pub fn bits(&mut self, value: u32, count: u8) -> &mut Self {
        for i in 0..count {
            if self.used == 0 {
                self.bytes.push(0);
            }
            let bit = ((value >> i) & 1) as u8;
            *self.bytes.last_mut().unwrap() |= bit << self.used;
            self.used = (self.used + 1) % 8;
        }
        self
    }

    /// Write a Huffman code, most significant bit first.
    pub fn code(&mut self, code: u32, length: u8) -> &mut Self {
        for i in (0..length).rev() {
            self.bits((code >> i) & 1, 1);
        }
        self
    }

    /// Fixed-code literal for a byte below 144.
    pub fn fixed_literal(&mut self, byte: u8) -> &mut Self {
        assert!(byte < 144);
        self.code(0x30 + u32::from(byte), 8)
    }

    /// Fixed-code symbol in 256-279.
    pub fn fixed_short(&mut self, symbol: u16) -> &mut Self {
        assert!((256..=279).contains(&symbol));
        self.code(u32::from(symbol - 256), 7)
    }

    pub fn finish(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}
