//! Writing carved members to disk.

use gzcarve_core::error::{CarveError, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Destination directory for carved members.
///
/// The directory is created on the first write, so a scan that finds
/// nothing leaves no trace. Existing files are never overwritten.
#[derive(Debug, Clone)]
pub struct OutputDir {
    path: PathBuf,
    extension: String,
    ready: bool,
}

impl OutputDir {
    /// Target `path`, naming files `<offset>.<extension>`.
    pub fn new(path: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            extension: extension.into(),
            ready: false,
        }
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the file for a member at `offset`.
    pub fn member_path(&self, offset: u64) -> PathBuf {
        self.path.join(format!("{}.{}", offset, self.extension))
    }

    /// Write the member at `offset`, returning the file path.
    pub fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<PathBuf> {
        self.ensure_dir()?;

        let path = self.member_path(offset);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(CarveError::output_exists(path));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(bytes)?;
        file.flush()?;

        Ok(path)
    }

    fn ensure_dir(&mut self) -> Result<()> {
        if self.ready {
            return Ok(());
        }
        if self.path.exists() && !self.path.is_dir() {
            return Err(CarveError::output_directory(&self.path, "not a directory"));
        }
        fs::create_dir_all(&self.path)
            .map_err(|e| CarveError::output_directory(&self.path, e.to_string()))?;
        self.ready = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gzcarve_core::ErrorClass;

    #[test]
    fn test_write_creates_directory_lazily() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("out");

        let mut output = OutputDir::new(&dir, "gz");
        assert!(!dir.exists());

        let path = output.write(1234, b"abc").unwrap();
        assert_eq!(path, dir.join("1234.gz"));
        assert_eq!(fs::read(&path).unwrap(), b"abc");
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("7.gz"), b"keep").unwrap();

        let mut output = OutputDir::new(tmp.path(), "gz");
        let err = output.write(7, b"new").unwrap_err();
        assert!(matches!(err, CarveError::OutputExists { .. }));
        assert_eq!(err.class(), ErrorClass::ResourceFailure);
        assert_eq!(fs::read(tmp.path().join("7.gz")).unwrap(), b"keep");
    }

    #[test]
    fn test_directory_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("occupied");
        fs::write(&file, b"").unwrap();

        let err = OutputDir::new(&file, "gz").write(0, b"x").unwrap_err();
        assert!(matches!(err, CarveError::OutputDirectory { .. }));
    }
}
