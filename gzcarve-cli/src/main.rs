//! gzcarve CLI - finds GZIP members inside binary blobs and carves them out.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{ScanArgs, cmd_scan};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gzcarve")]
#[command(author, version, about = "Carve GZIP members out of arbitrary binary files")]
#[command(long_about = "
gzcarve scans files (firmware images, disk dumps, captures) for embedded
GZIP members. Every occurrence of the magic bytes 0x1F 0x8B is validated
down to the trailing CRC-32, and each valid member is written out as
<offset>.gz.

Examples:
  gzcarve scan firmware.bin
  gzcarve scan dump.img -o carved/
  gzcarve scan --fast --json image1.bin image2.bin
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan files and extract every valid GZIP member
    #[command(alias = "s")]
    Scan {
        /// Files to scan
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory (default: <FILE>_GZIP next to each input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip over validated members instead of re-scanning inside them
        #[arg(long)]
        fast: bool,

        /// Reject members whose header CRC is wrong
        #[arg(long)]
        verify_header_crc: bool,

        /// Validate only, write nothing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Output the findings as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Show debug logging
        #[arg(short, long)]
        verbose: bool,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan {
            files,
            output,
            fast,
            verify_header_crc,
            dry_run,
            json,
            verbose,
            no_progress,
        } => {
            utils::init_logging(verbose);
            cmd_scan(&ScanArgs {
                files,
                output,
                thorough: !fast,
                verify_header_crc,
                dry_run,
                json,
                progress: !no_progress && !json,
            })
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
