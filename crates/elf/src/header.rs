//! ELF32 identification-header parsing and validation.
//!
//! Parses the 52-byte ELF32 file header from a raw byte slice using safe
//! field extraction via `from_le_bytes()`, checking every field against one
//! of the two accepted profiles before any byte past the header is
//! interpreted.

use core::fmt;

/// ELF magic bytes: `\x7fELF`.
const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// ELF class: 32-bit.
const ELFCLASS32: u8 = 1;

/// ELF data encoding: little-endian.
const ELFDATA2LSB: u8 = 1;

/// ELF version: current.
const EV_CURRENT: u32 = 1;

/// ELF type: relocatable object.
const ET_REL: u16 = 1;

/// ELF type: executable.
const ET_EXEC: u16 = 2;

/// ELF machine: unspecified.
const EM_NONE: u16 = 0;

/// ELF machine: Intel 80386.
const EM_386: u16 = 3;

/// Size of an ELF32 file header (52 bytes).
pub const ELF32_EHDR_SIZE: usize = 52;

/// Size of an ELF32 program header entry (32 bytes).
pub const ELF32_PHDR_SIZE: usize = 32;

/// Size of an ELF32 section header entry (40 bytes).
pub const ELF32_SHDR_SIZE: usize = 40;

/// Read a little-endian `u16` from `data` at byte offset `off`.
///
/// # Panics
///
/// Panics if `off + 2 > data.len()`. Callers must bounds-check first.
pub(crate) fn le_u16(data: &[u8], off: usize) -> u16 {
    u16::from_le_bytes(*data[off..].first_chunk().unwrap())
}

/// Read a little-endian `u32` from `data` at byte offset `off`.
pub(crate) fn le_u32(data: &[u8], off: usize) -> u32 {
    u32::from_le_bytes(*data[off..].first_chunk().unwrap())
}

/// Which of the two accepted file shapes a header is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// A statically linked `ET_EXEC` image with loadable segments.
    Executable,
    /// An `ET_REL` boot object: no entry point, no program headers.
    Relocatable,
}

impl Profile {
    /// The `e_type` value this profile requires.
    fn elf_type(self) -> u16 {
        match self {
            Self::Executable => ET_EXEC,
            Self::Relocatable => ET_REL,
        }
    }
}

/// Errors reported by header and section-table validation.
///
/// Each violated check has its own variant so callers (and tests) can tell
/// exactly which rule a file broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// The input is shorter than the 52-byte ELF32 header.
    Truncated,
    /// The file does not start with the ELF magic bytes.
    BadMagic,
    /// The class byte is not `ELFCLASS32`.
    BadClass,
    /// The data-encoding byte is not `ELFDATA2LSB`.
    BadEncoding,
    /// The identification version byte is not the current version.
    BadIdentVersion,
    /// The OS/ABI byte is nonzero.
    BadOsAbi,
    /// The ABI version byte is nonzero.
    BadAbiVersion,
    /// The reserved identification padding is not all zero.
    BadIdentPadding,
    /// `e_type` does not match the requested profile.
    WrongType(Profile),
    /// `e_machine` is neither unset nor the supported instruction set.
    BadMachine,
    /// `e_version` is not the current version.
    BadVersion,
    /// `e_flags` is nonzero.
    NonzeroFlags,
    /// `e_ehsize` is not the fixed ELF32 header size.
    BadHeaderSize,
    /// `e_phentsize` differs from the fixed program-header entry size.
    BadProgramEntrySize,
    /// `e_shentsize` differs from the fixed section-header entry size.
    BadSectionEntrySize,
    /// An executable declares no program headers.
    MissingProgramHeaders,
    /// A relocatable object declares a program-header table.
    UnexpectedProgramHeaders,
    /// A relocatable object declares a nonzero entry point.
    NonzeroEntry,
    /// The file declares too few section headers.
    MissingSectionHeaders,
    /// `e_shstrndx` does not name a section.
    BadStringTableIndex,
    /// A header table extends past the end of the file.
    TableOutOfBounds,
    /// The section named by `e_shstrndx` is not a string table.
    NotStringTable,
    /// A non-null program header is not a loadable segment.
    IllegalSegmentType,
    /// A loadable segment is missing the read permission bit.
    NonReadableSegment,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => write!(f, "input shorter than the ELF header"),
            Self::BadMagic => write!(f, "invalid ELF magic number"),
            Self::BadClass => write!(f, "illegal ELF class (only the 32-bit class is supported)"),
            Self::BadEncoding => write!(f, "invalid data encoding (expected little-endian)"),
            Self::BadIdentVersion => write!(f, "unrecognized ELF header version"),
            Self::BadOsAbi => write!(f, "unrecognized OS/ABI type"),
            Self::BadAbiVersion => write!(f, "unrecognized ABI version"),
            Self::BadIdentPadding => write!(f, "illegal padding in ELF header"),
            Self::WrongType(Profile::Executable) => {
                write!(f, "only the executable format is supported here")
            }
            Self::WrongType(Profile::Relocatable) => {
                write!(f, "only the relocatable object format is supported here")
            }
            Self::BadMachine => write!(f, "invalid ELF instruction set"),
            Self::BadVersion => write!(f, "unrecognized ELF version"),
            Self::NonzeroFlags => write!(f, "invalid ELF flags"),
            Self::BadHeaderSize => write!(f, "invalid ELF header size"),
            Self::BadProgramEntrySize => write!(f, "invalid program header size"),
            Self::BadSectionEntrySize => write!(f, "invalid section header size"),
            Self::MissingProgramHeaders => write!(f, "no program headers"),
            Self::UnexpectedProgramHeaders => {
                write!(f, "relocatable object carries a program header table")
            }
            Self::NonzeroEntry => write!(f, "invalid program entry point"),
            Self::MissingSectionHeaders => write!(f, "no section headers"),
            Self::BadStringTableIndex => write!(f, "invalid string table section index"),
            Self::TableOutOfBounds => write!(f, "header table extends past the end of the file"),
            Self::NotStringTable => write!(f, "string table section has the wrong type"),
            Self::IllegalSegmentType => write!(f, "illegal program header type"),
            Self::NonReadableSegment => write!(f, "file contains non-readable code"),
        }
    }
}

impl core::error::Error for FormatError {}

/// Parsed and validated ELF32 file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elf32Header {
    /// ELF type (`ET_EXEC` or `ET_REL`, per the validated profile).
    pub e_type: u16,
    /// Target machine architecture.
    pub e_machine: u16,
    /// Virtual address of the entry point (zero for relocatable objects).
    pub e_entry: u32,
    /// Offset of the program header table in the file.
    pub e_phoff: u32,
    /// Number of program header entries.
    pub e_phnum: u16,
    /// Size of each program header entry.
    pub e_phentsize: u16,
    /// Offset of the section header table in the file.
    pub e_shoff: u32,
    /// Size of each section header entry.
    pub e_shentsize: u16,
    /// Number of section header entries.
    pub e_shnum: u16,
    /// Section header string table index.
    pub e_shstrndx: u16,
}

impl Elf32Header {
    /// Parse and validate an ELF32 file header against `profile`.
    ///
    /// All identification, size, and count fields are checked before any
    /// byte beyond the 52-byte header is interpreted; both header tables
    /// are bounds-checked against the file length with overflow-safe
    /// arithmetic.
    ///
    /// # Errors
    ///
    /// Returns the [`FormatError`] for the first violated check.
    pub fn parse(data: &[u8], profile: Profile) -> Result<Self, FormatError> {
        if data.len() < ELF32_EHDR_SIZE {
            return Err(FormatError::Truncated);
        }

        if data[..4] != ELF_MAGIC {
            return Err(FormatError::BadMagic);
        }
        if data[4] != ELFCLASS32 {
            return Err(FormatError::BadClass);
        }
        if data[5] != ELFDATA2LSB {
            return Err(FormatError::BadEncoding);
        }
        if u32::from(data[6]) != EV_CURRENT {
            return Err(FormatError::BadIdentVersion);
        }
        if data[7] != 0 {
            return Err(FormatError::BadOsAbi);
        }
        if data[8] != 0 {
            return Err(FormatError::BadAbiVersion);
        }
        if data[9..16].iter().any(|&b| b != 0) {
            return Err(FormatError::BadIdentPadding);
        }

        let e_type = le_u16(data, 16);
        if e_type != profile.elf_type() {
            return Err(FormatError::WrongType(profile));
        }

        let e_machine = le_u16(data, 18);
        if e_machine != EM_NONE && e_machine != EM_386 {
            return Err(FormatError::BadMachine);
        }

        if le_u32(data, 20) != EV_CURRENT {
            return Err(FormatError::BadVersion);
        }

        let e_entry = le_u32(data, 24);
        let e_phoff = le_u32(data, 28);
        let e_shoff = le_u32(data, 32);

        if le_u32(data, 36) != 0 {
            return Err(FormatError::NonzeroFlags);
        }
        if le_u16(data, 40) as usize != ELF32_EHDR_SIZE {
            return Err(FormatError::BadHeaderSize);
        }

        let e_phentsize = le_u16(data, 42);
        let e_phnum = le_u16(data, 44);
        let e_shentsize = le_u16(data, 46);
        let e_shnum = le_u16(data, 48);
        let e_shstrndx = le_u16(data, 50);

        if e_shentsize as usize != ELF32_SHDR_SIZE {
            return Err(FormatError::BadSectionEntrySize);
        }

        match profile {
            Profile::Executable => {
                if e_phnum == 0 {
                    return Err(FormatError::MissingProgramHeaders);
                }
                if e_phentsize as usize != ELF32_PHDR_SIZE {
                    return Err(FormatError::BadProgramEntrySize);
                }
                if e_shnum == 0 {
                    return Err(FormatError::MissingSectionHeaders);
                }
                // The table must sit past the header; segment loading
                // consumes the file strictly front to back.
                if (e_phoff as usize) < ELF32_EHDR_SIZE {
                    return Err(FormatError::TableOutOfBounds);
                }
            }
            Profile::Relocatable => {
                if e_entry != 0 {
                    return Err(FormatError::NonzeroEntry);
                }
                if e_phoff != 0 || e_phnum != 0 || e_phentsize != 0 {
                    return Err(FormatError::UnexpectedProgramHeaders);
                }
                if e_shnum < 2 {
                    return Err(FormatError::MissingSectionHeaders);
                }
            }
        }

        if e_shstrndx >= e_shnum {
            return Err(FormatError::BadStringTableIndex);
        }

        let file_len = data.len() as u64;
        let ph_end = u64::from(e_phoff) + u64::from(e_phnum) * u64::from(e_phentsize);
        if ph_end > file_len {
            return Err(FormatError::TableOutOfBounds);
        }
        let sh_end = u64::from(e_shoff) + u64::from(e_shnum) * u64::from(e_shentsize);
        if sh_end > file_len {
            return Err(FormatError::TableOutOfBounds);
        }

        Ok(Self {
            e_type,
            e_machine,
            e_entry,
            e_phoff,
            e_phnum,
            e_phentsize,
            e_shoff,
            e_shentsize,
            e_shnum,
            e_shstrndx,
        })
    }
}
