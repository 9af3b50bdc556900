//! Loading the host file that is scanned for embedded members.
//!
//! A [`HostBuffer`] is the whole host file as one byte slice. By default the
//! file is read into memory. With the `mmap` feature, non-empty files are
//! memory-mapped instead, which lets the operating system page in large disk
//! images on demand.
//!
//! # Safety
//!
//! A memory-mapped host must not be modified by another process while it is
//! being scanned. The mapping is read-only.

use crate::error::Result;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::Mmap;

#[derive(Debug)]
enum Storage {
    Owned(Vec<u8>),
    #[cfg(feature = "mmap")]
    Mapped(Mmap),
}

/// The bytes of a host file.
///
/// # Example
///
/// ```no_run
/// use gzcarve_core::host::HostBuffer;
///
/// let host = HostBuffer::open("firmware.bin")?;
/// println!("{} bytes", host.len());
/// # Ok::<(), gzcarve_core::error::CarveError>(())
/// ```
#[derive(Debug)]
pub struct HostBuffer {
    storage: Storage,
}

impl HostBuffer {
    /// Open and load a host file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CarveError::Io`] if the file cannot be opened,
    /// read or mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_file(file)
    }

    #[cfg(feature = "mmap")]
    fn from_file(file: File) -> Result<Self> {
        // Zero-length mappings are rejected on some platforms
        if file.metadata()?.len() == 0 {
            return Ok(Self::from_vec(Vec::new()));
        }

        // SAFETY: read-only mapping; the host file must not be modified
        // while it is scanned.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            storage: Storage::Mapped(mmap),
        })
    }

    #[cfg(not(feature = "mmap"))]
    fn from_file(mut file: File) -> Result<Self> {
        use std::io::Read;

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(Self::from_vec(data))
    }

    /// Wrap bytes that are already in memory.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            storage: Storage::Owned(data),
        }
    }

    /// Whether the host is memory-mapped.
    pub fn is_mapped(&self) -> bool {
        match self.storage {
            Storage::Owned(_) => false,
            #[cfg(feature = "mmap")]
            Storage::Mapped(_) => true,
        }
    }

    /// The host bytes.
    pub fn as_slice(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(data) => data,
            #[cfg(feature = "mmap")]
            Storage::Mapped(mmap) => mmap,
        }
    }
}

impl Deref for HostBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for HostBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
