//! Main entry point for the gen-tos-img CLI tool

use clap::Parser;
use colored::Colorize;
use tosimage::cli::{Args, run_cli};

fn main() {
    let args = Args::parse();

    if let Err(e) = run_cli(args) {
        let code = e.exit_code();
        let err = anyhow::Error::new(e);
        eprintln!("{}", format!("Error: {err:#}").red());
        std::process::exit(code);
    }
}
