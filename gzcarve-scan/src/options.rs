//! Carving options.

/// Options controlling a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarveOptions {
    /// Re-scan inside members that validated instead of skipping them.
    pub thorough: bool,
    /// Reject members whose FHCRC header checksum is wrong.
    pub verify_header_crc: bool,
    /// Extension of carved files, without the dot.
    pub extension: String,
    /// Validate only, never write files.
    pub dry_run: bool,
}

impl Default for CarveOptions {
    fn default() -> Self {
        Self {
            thorough: true,
            verify_header_crc: false,
            extension: "gz".to_string(),
            dry_run: false,
        }
    }
}

impl CarveOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set thorough mode.
    pub fn with_thorough(mut self, thorough: bool) -> Self {
        self.thorough = thorough;
        self
    }

    /// Set header CRC verification.
    pub fn with_verify_header_crc(mut self, verify: bool) -> Self {
        self.verify_header_crc = verify;
        self
    }

    /// Set the extension of carved files.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
