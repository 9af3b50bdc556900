//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Number of `(n)` suffixes tried before giving up on an output directory.
pub const MAX_DIR_SUFFIX: u32 = 10;

/// Install the logger. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

/// Pick a fresh output directory for `input`.
///
/// Tries `<input>_GZIP`, then `<input>_GZIP(1)` up to
/// `<input>_GZIP(10)`, and returns the first that does not exist yet.
pub fn default_output_dir(input: &Path) -> Option<PathBuf> {
    let mut base = OsString::from(input.as_os_str());
    base.push("_GZIP");

    (0..=MAX_DIR_SUFFIX)
        .map(|suffix| {
            let mut name = base.clone();
            if suffix > 0 {
                name.push(format!("({})", suffix));
            }
            PathBuf::from(name)
        })
        .find(|candidate| !candidate.exists())
}

/// Format a byte count for humans.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
