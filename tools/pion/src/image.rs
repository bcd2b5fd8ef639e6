//! Memory-image reconstruction from ELF32 loadable segments.
//!
//! Rebuilds the contiguous image a linked kernel occupies in memory.
//! Loadable segments are appended in file order; file bytes between the
//! consumed cursor and a segment's offset are carried over verbatim as
//! opaque padding (embedded header or table data, not bss), and the
//! `memsz`/alignment tail of each segment becomes an explicit zero run.
//! The image never contains uninitialized space.

use std::fmt;

use anyhow::{Context, Result, bail};
use quark_elf::{ElfFile, FormatError, PF_R, PT_LOAD, PT_NULL};

/// Violations of the segment or payload layout rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// A segment's file offset lies before bytes already consumed.
    OffsetRegression {
        /// Index of the offending program header.
        index: usize,
    },
    /// A segment's virtual address lies below the end of the image built
    /// so far.
    AddressRegression {
        /// Index of the offending program header.
        index: usize,
    },
    /// A segment's physical address differs from its virtual address.
    PhysicalMismatch {
        /// Index of the offending program header.
        index: usize,
    },
    /// A segment's rounded memory size is smaller than its file size, or
    /// does not fit the 32-bit address space.
    BadSegmentSize {
        /// Index of the offending program header.
        index: usize,
    },
    /// A boot payload exceeds the sector ceiling.
    BootOverflow {
        /// Payload size in bytes.
        size: u64,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::OffsetRegression { index } => {
                write!(f, "segment {index}: invalid program header offset")
            }
            Self::AddressRegression { index } => {
                write!(f, "segment {index}: invalid program header virtual address")
            }
            Self::PhysicalMismatch { index } => {
                write!(f, "segment {index}: invalid program header physical address")
            }
            Self::BadSegmentSize { index } => {
                write!(f, "segment {index}: invalid program header memory size")
            }
            Self::BootOverflow { size } => {
                write!(f, "boot payload is {size} bytes; the sector holds 510")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// Placement record for one loadable segment within the image.
#[derive(Debug, Clone, Copy)]
pub struct SegmentSpan {
    /// Virtual address of the segment's first byte.
    pub vaddr: u32,
    /// File offset of the segment's first byte.
    pub file_offset: u32,
    /// Bytes the segment occupies in the file.
    pub filesz: u32,
    /// Alignment-rounded bytes the segment occupies in memory.
    pub memsz: u32,
    /// Image index of the segment's first byte.
    pub image_start: usize,
}

impl SegmentSpan {
    /// Whether `addr` falls inside this segment's memory range.
    #[must_use]
    pub fn contains_addr(&self, addr: u32) -> bool {
        addr >= self.vaddr && u64::from(addr) < self.mem_end()
    }

    /// One past the segment's last memory address.
    #[must_use]
    pub fn mem_end(&self) -> u64 {
        u64::from(self.vaddr) + u64::from(self.memsz)
    }

    /// Whether the file range `[offset, offset + len)` is backed by this
    /// segment's file bytes.
    #[must_use]
    pub fn covers_file_range(&self, offset: u32, len: u32) -> bool {
        offset >= self.file_offset
            && u64::from(offset) + u64::from(len)
                <= u64::from(self.file_offset) + u64::from(self.filesz)
    }

    /// Image index corresponding to a file offset inside this segment.
    #[must_use]
    pub fn image_offset(&self, file_offset: u32) -> usize {
        self.image_start + (file_offset - self.file_offset) as usize
    }
}

/// The contiguous memory image implied by an executable's loadable
/// segments, indexed from virtual address 0.
#[derive(Debug)]
pub struct ReconstructedImage {
    /// The image bytes; gaps and bss are explicit zero runs.
    pub bytes: Vec<u8>,
    /// One placement record per loadable segment, in ascending order.
    pub spans: Vec<SegmentSpan>,
}

impl ReconstructedImage {
    /// Rebuild the memory image from the executable's program headers.
    ///
    /// Null entries are skipped; any other non-loadable entry is fatal.
    /// Segments must ascend strictly in both file offset and virtual
    /// address, must be flat-mapped (`paddr == vaddr`), and must carry the
    /// read permission.
    ///
    /// # Errors
    ///
    /// [`FormatError`] for segment-type and permission violations,
    /// [`LayoutError`] for ordering and size violations, and an I/O-style
    /// error when a declared range runs past the end of the input.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "rounded memory size is checked against u32::MAX before the cast"
    )]
    pub fn build(elf: &ElfFile<'_>) -> Result<Self> {
        let data = elf.raw_data();
        let header = elf.header();

        let mut image = Self {
            bytes: Vec::new(),
            spans: Vec::new(),
        };

        // The file header and the program-header table are never part of
        // the image; file bytes between the two are.
        let table_start = header.e_phoff as usize;
        let table_end = table_start
            + header.e_phnum as usize * header.e_phentsize as usize;
        image.copy_file_bytes(data, quark_elf::header::ELF32_EHDR_SIZE, table_start)?;
        let mut consumed = table_end;

        for (index, phdr) in elf.program_headers().enumerate() {
            if phdr.p_type == PT_NULL {
                continue;
            }
            if phdr.p_type != PT_LOAD {
                return Err(FormatError::IllegalSegmentType.into());
            }
            if phdr.p_flags & PF_R == 0 {
                return Err(FormatError::NonReadableSegment.into());
            }
            if phdr.p_paddr != phdr.p_vaddr {
                return Err(LayoutError::PhysicalMismatch { index }.into());
            }

            let offset = phdr.p_offset as usize;
            if offset < consumed {
                return Err(LayoutError::OffsetRegression { index }.into());
            }
            if (phdr.p_vaddr as usize) < image.bytes.len() {
                return Err(LayoutError::AddressRegression { index }.into());
            }

            let rounded = align_up(phdr.p_memsz, phdr.p_align);
            if rounded < u64::from(phdr.p_filesz) || rounded > u64::from(u32::MAX) {
                return Err(LayoutError::BadSegmentSize { index }.into());
            }

            // Opaque inter-segment padding, carried over verbatim.
            image.copy_file_bytes(data, consumed, offset)?;

            let image_start = image.bytes.len();
            let end = offset
                .checked_add(phdr.p_filesz as usize)
                .with_context(|| format!("segment {index}: file size overflows"))?;
            image.copy_file_bytes(data, offset, end)?;
            image.push_zeros((rounded - u64::from(phdr.p_filesz)) as usize)?;
            consumed = end;

            image.spans.push(SegmentSpan {
                vaddr: phdr.p_vaddr,
                file_offset: phdr.p_offset,
                filesz: phdr.p_filesz,
                memsz: rounded as u32,
                image_start,
            });
        }

        Ok(image)
    }

    /// The span whose file bytes back the given file offset.
    #[must_use]
    pub fn span_for_file_offset(&self, offset: u32) -> Option<&SegmentSpan> {
        self.spans
            .iter()
            .find(|s| offset >= s.file_offset && offset - s.file_offset < s.filesz)
    }

    /// The span whose memory range contains the given address.
    #[must_use]
    pub fn span_containing_addr(&self, addr: u32) -> Option<&SegmentSpan> {
        self.spans.iter().find(|s| s.contains_addr(addr))
    }

    /// Append `data[from..to]` to the image.
    ///
    /// Callers keep `from <= to`; a range past the end of the file means
    /// the input is truncated.
    fn copy_file_bytes(&mut self, data: &[u8], from: usize, to: usize) -> Result<()> {
        if to > data.len() {
            bail!(
                "input truncated: need file bytes {from}..{to}, file is {} bytes",
                data.len()
            );
        }
        let slice = &data[from..to];
        self.bytes
            .try_reserve_exact(slice.len())
            .context("allocating image buffer")?;
        self.bytes.extend_from_slice(slice);
        Ok(())
    }

    /// Append `count` zero bytes to the image.
    fn push_zeros(&mut self, count: usize) -> Result<()> {
        self.bytes
            .try_reserve_exact(count)
            .context("allocating image buffer")?;
        self.bytes.resize(self.bytes.len() + count, 0);
        Ok(())
    }
}

/// Round `size` up to the next multiple of `align`.
///
/// Alignments of 0 and 1 both mean "no alignment".
fn align_up(size: u32, align: u32) -> u64 {
    let size = u64::from(size);
    if align <= 1 {
        return size;
    }
    let align = u64::from(align);
    size.div_ceil(align) * align
}
