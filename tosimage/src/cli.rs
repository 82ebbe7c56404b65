//! Command line interface for gen-tos-img

use crate::VERSION;
use crate::error::Result;
use crate::framer::{FrameReport, frame, set_output_permissions};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "gen-tos-img")]
#[command(version = VERSION)]
#[command(about = "Generate a trusted OS partition image", long_about = None)]
pub struct Args {
    /// Raw trusted OS payload
    pub input: PathBuf,

    /// Partition image to create (overwritten if present)
    pub output: PathBuf,
}

/// Frame the payload, then fix up the image permissions.
pub fn run_cli(args: Args) -> Result<FrameReport> {
    println!("{}", "Generate Trusted OS Partition Image File".bold());

    let report = frame(&args.input, &args.output)?;
    set_output_permissions(&args.output)?;

    println!(
        "{}",
        format!(
            "{}: {} byte payload, {} bytes total",
            args.output.display(),
            report.payload_size,
            report.image_size
        )
        .green()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::try_parse_from(["gen-tos-img", "tos.bin", "tos.img"]).unwrap();
        assert_eq!(args.input, PathBuf::from("tos.bin"));
        assert_eq!(args.output, PathBuf::from("tos.img"));
    }

    #[test]
    fn test_args_require_both_paths() {
        assert!(Args::try_parse_from(["gen-tos-img"]).is_err());
        assert!(Args::try_parse_from(["gen-tos-img", "tos.bin"]).is_err());
        assert!(Args::try_parse_from(["gen-tos-img", "a", "b", "c"]).is_err());
    }
}
