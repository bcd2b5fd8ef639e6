//! Command-line interface definitions for pion.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Quark boot-image packaging tool.
#[derive(Parser)]
#[command(name = "pion", version, about)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Write the artifact here instead of standard output.
    #[arg(long, short = 'o', global = true)]
    pub output: Option<PathBuf>,

    /// Print an artifact summary on stderr.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Re-encode a linked executable as a raw kernel image.
    Unpack(UnpackArgs),
    /// Dump named sections behind (address, length) directory records.
    Dump(DumpArgs),
    /// Package a boot object into a signed 512-byte boot sector.
    Boot(BootArgs),
}

/// Arguments for the `unpack` subcommand.
#[derive(Parser)]
pub struct UnpackArgs {
    /// Output encoding.
    #[arg(value_enum)]
    pub format: UnpackFormat,

    /// Path to the linked ELF executable.
    pub file: PathBuf,
}

/// Output encodings for `unpack`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpackFormat {
    /// Raw text+data+bss with no header.
    Flat,
    /// The fixed 8-word legacy header followed by the flat payload.
    #[value(alias = "legacy")]
    LegacyHeader,
}

/// Arguments for the `dump` subcommand.
#[derive(Parser)]
pub struct DumpArgs {
    /// Section names to dump, in output order.
    #[arg(required = true, num_args = 1.., value_name = "SECTION")]
    pub sections: Vec<String>,

    /// Path to the linked ELF executable.
    pub file: PathBuf,
}

/// Arguments for the `boot` subcommand.
#[derive(Parser)]
pub struct BootArgs {
    /// Treat the input as an already-linked image instead of a
    /// relocatable boot object.
    #[arg(long)]
    pub linked: bool,

    /// Path to the boot object (or linked image with `--linked`).
    pub file: PathBuf,
}
