//! Minimal ELF32 parser for the Quark boot tooling.
//!
//! Parses and strictly validates ELF32 headers, program headers, and section
//! headers from raw byte slices using safe field extraction
//! (`from_le_bytes`). No unsafe code, no allocations.
//!
//! Validation is strict: the parser accepts exactly the
//! two shapes of file the boot tooling consumes (a statically linked
//! 32-bit little-endian executable, or a relocatable boot object) and
//! reports the first violated check as a distinct [`FormatError`].
//!
//! # Usage
//!
//! ```
//! use quark_elf::{ElfFile, Profile};
//!
//! fn inspect(data: &[u8]) {
//!     if let Ok(elf) = ElfFile::parse(data, Profile::Executable) {
//!         let _entry = elf.entry_point();
//!         for _phdr in elf.program_headers() {
//!             // Rebuild the memory image from loadable segments.
//!         }
//!     }
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

pub mod header;
pub mod section;
pub mod segment;

pub use header::{Elf32Header, FormatError, Profile};
pub use section::{
    Elf32SectionHeader, SHT_NOBITS, SHT_NULL, SHT_PROGBITS, SHT_REL, SHT_STRTAB, SHT_SYMTAB,
    SectionIter, StringTable,
};
pub use segment::{
    Elf32ProgramHeader, ElfFile, PF_R, PF_W, PF_X, PT_LOAD, PT_NULL, ProgramHeaderIter,
};
