//! Command implementations for gzcarve CLI.

pub mod scan;

pub use scan::{ScanArgs, cmd_scan};
