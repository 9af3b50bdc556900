//! Sliding window for LZ77 back-references.
//!
//! [`RingBuffer`] keeps the most recent bytes of output. [`WindowSink`]
//! wraps it with the running length and CRC-32 of the *whole* decompressed
//! stream, which is what a GZIP trailer is checked against. Nothing else of
//! the output is retained, so validating a member costs a fixed 32 KB no
//! matter how large it decompresses.

use crate::crc::Crc32;
use crate::error::{CarveError, Result};

/// DEFLATE window size (32 KB).
pub const DEFLATE_WINDOW: usize = 32768;

/// A ring buffer (circular buffer) for maintaining decompression history.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    /// The underlying buffer.
    buffer: Vec<u8>,
    /// Current write position (next byte will be written here).
    position: usize,
    /// Number of bytes held (up to capacity).
    size: usize,
    /// Mask for efficient modulo (capacity - 1).
    mask: usize,
}

impl RingBuffer {
    /// Create a new ring buffer with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of 2 or is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity.is_power_of_two(),
            "Capacity must be a power of 2, got {}",
            capacity
        );

        Self {
            buffer: vec![0; capacity],
            position: 0,
            size: 0,
            mask: capacity - 1,
        }
    }

    /// Get the capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Get the number of bytes currently held.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Forget all held bytes.
    pub fn clear(&mut self) {
        self.position = 0;
        self.size = 0;
    }

    /// Write a single byte, evicting the oldest one when full.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.buffer[self.position] = byte;
        self.position = (self.position + 1) & self.mask;
        if self.size <= self.mask {
            self.size += 1;
        }
    }

    /// Byte that sits `back_distance + 1` positions behind the write head.
    ///
    /// `back_distance` 0 is the most recently written byte.
    pub fn byte_back(&self, back_distance: usize) -> Result<u8> {
        if back_distance >= self.size {
            return Err(CarveError::invalid_distance(back_distance + 1, self.size));
        }

        let index = self.position.wrapping_sub(back_distance + 1) & self.mask;
        Ok(self.buffer[index])
    }

    /// Get the last N bytes written (for debugging/testing).
    pub fn last_bytes(&self, count: usize) -> Vec<u8> {
        let count = count.min(self.size);
        (0..count)
            .map(|i| self.buffer[self.position.wrapping_sub(count - i) & self.mask])
            .collect()
    }
}

/// Output sink for a validation attempt.
///
/// Holds the 32 KB history window plus the total byte count and CRC-32 of
/// everything written since the last [`reset`](Self::reset). A capturing
/// sink additionally keeps the full output.
#[derive(Debug, Clone)]
pub struct WindowSink {
    window: RingBuffer,
    crc: Crc32,
    total: u64,
    capture: Option<Vec<u8>>,
}

impl WindowSink {
    /// Create a sink with the DEFLATE window size.
    pub fn new() -> Self {
        Self::with_window(DEFLATE_WINDOW)
    }

    /// Create a sink with a custom (power of two) window size.
    pub fn with_window(capacity: usize) -> Self {
        Self {
            window: RingBuffer::new(capacity),
            crc: Crc32::new(),
            total: 0,
            capture: None,
        }
    }

    /// Create a DEFLATE-sized sink that also keeps every byte written.
    pub fn capturing() -> Self {
        Self {
            capture: Some(Vec::new()),
            ..Self::new()
        }
    }

    /// Empty the window and restart the length and CRC.
    pub fn reset(&mut self) {
        self.window.clear();
        self.crc.reset();
        self.total = 0;
        if let Some(out) = self.capture.as_mut() {
            out.clear();
        }
    }

    /// Append one decompressed byte.
    #[inline]
    pub fn append_byte(&mut self, byte: u8) {
        self.window.push(byte);
        self.crc.add_byte(byte);
        self.total += 1;
        if let Some(out) = self.capture.as_mut() {
            out.push(byte);
        }
    }

    /// Repeat `length` bytes starting `back_distance + 1` bytes behind the
    /// write position.
    ///
    /// Bytes are copied one at a time, so a fragment longer than its
    /// distance repeats the bytes it has just produced ("AB" with distance
    /// 2 and length 6 gives "ABABAB").
    pub fn repeat_fragment(&mut self, back_distance: usize, length: usize) -> Result<()> {
        if back_distance >= self.window.len() {
            return Err(CarveError::invalid_distance(
                back_distance + 1,
                self.window.len(),
            ));
        }

        for _ in 0..length {
            let byte = self.window.byte_back(back_distance)?;
            self.append_byte(byte);
        }

        Ok(())
    }

    /// Bytes currently held in the window.
    pub fn available_len(&self) -> usize {
        self.window.len()
    }

    /// Total bytes written since the last reset.
    pub fn total_len(&self) -> u64 {
        self.total
    }

    /// CRC-32 of everything written since the last reset.
    pub fn crc32(&self) -> u32 {
        self.crc.value()
    }

    /// The history window.
    pub fn window(&self) -> &RingBuffer {
        &self.window
    }

    /// Take the captured output, leaving an empty capture in place.
    ///
    /// Returns `None` for a non-capturing sink.
    pub fn take_output(&mut self) -> Option<Vec<u8>> {
        self.capture.as_mut().map(std::mem::take)
    }
}

impl Default for WindowSink {
    fn default() -> Self {
        Self::new()
    }
}
