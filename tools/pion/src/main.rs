//! Quark boot-image packaging tool.
//!
//! Re-encodes linked ELF32 kernels as raw boot images (flat or behind the
//! legacy 8-word header), dumps named sections behind a small directory,
//! and packages boot objects into signed 512-byte boot sectors.
//!
//! Pipeline: read file → validate header → rebuild memory image →
//!           resolve sections → encode artifact → write output.

mod artifact;
mod cli;
#[cfg(test)]
mod fixtures;
mod image;
mod pipeline;
mod sections;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let artifact = match cli.command {
        cli::Command::Unpack(ref args) => {
            let data = read_input(&args.file)?;
            pipeline::unpack(&data, args.format)?
        }
        cli::Command::Dump(ref args) => {
            let data = read_input(&args.file)?;
            pipeline::dump(&data, &args.sections)?
        }
        cli::Command::Boot(ref args) => {
            let data = read_input(&args.file)?;
            if args.linked {
                pipeline::boot_from_linked(&data)?
            } else {
                pipeline::boot_from_object(&data)?
            }
        }
    };

    if cli.verbose {
        eprintln!("pion: wrote {} bytes", artifact.len());
    }

    write_output(cli.output.as_deref(), &artifact)
}

/// Read the whole input file up front; the pipelines work on one buffer.
fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

/// Write the finished artifact in one shot.
///
/// Nothing reaches the sink until the whole pipeline has succeeded, so a
/// failed run emits no output bytes at all.
fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|()| stdout.flush())
                .context("writing to standard output")
        }
    }
}
