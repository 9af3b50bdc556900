//! GZIP member validation (RFC 1952).
//!
//! A member is accepted only when its header parses, its DEFLATE payload
//! decodes completely, and the trailing CRC-32 and ISIZE match what was
//! decoded.
//!
//! ## Example
//!
//! ```rust
//! use gzcarve_scan::gzip::MemberValidator;
//!
//! let member = [
//!     0x1F, 0x8B, 8, 0, 0, 0, 0, 0, 0, 255, // header
//!     0x03, 0x00, // empty fixed block
//!     0, 0, 0, 0, 0, 0, 0, 0, // CRC-32 and ISIZE of nothing
//! ];
//!
//! let check = MemberValidator::default().check(&member, 0);
//! assert!(check.header_valid);
//! assert_eq!(check.result.unwrap().length, 20);
//! ```

mod header;
mod member;

pub use header::{CM_DEFLATE, GZIP_MAGIC, GzipHeader, OS_UNKNOWN, flags, is_known_os};
pub use member::{MemberCheck, MemberInfo, MemberValidator};

/// Offset of the next GZIP magic at or after `from`.
pub fn find_magic(host: &[u8], from: usize) -> Option<usize> {
    host.get(from..)?
        .windows(GZIP_MAGIC.len())
        .position(|window| window == GZIP_MAGIC)
        .map(|pos| from + pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_magic() {
        let host = [0x00, 0x1F, 0x8B, 0x1F, 0x1F, 0x8B, 0x8B];
        assert_eq!(find_magic(&host, 0), Some(1));
        assert_eq!(find_magic(&host, 2), Some(4));
        assert_eq!(find_magic(&host, 5), None);
        assert_eq!(find_magic(&host, 100), None);
        assert_eq!(find_magic(&[], 0), None);
    }
}
