//! hclmerge CLI
//!
//! Merges two HCL configuration files block by block.

mod cli;
mod error;

use std::io;
use std::path::Path;

use clap::Parser;
use clap::error::ErrorKind;
use hclmerge_fs::OsFileSystem;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::Cli;
use error::Result;

fn main() {
    if let Err(e) = run() {
        println!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => return Err(e.into()),
    };

    // Logs go to stderr so a merge printed to stdout stays clean
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing::debug!("Verbose mode enabled");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    hclmerge_core::merge_file(
        &OsFileSystem,
        Path::new(&cli.file1),
        Path::new(&cli.file2),
        Path::new(&cli.dest),
        &mut out,
    )?;
    Ok(())
}
