//! Section-directory dump encoding.
//!
//! Output layout, all little-endian: the image entry point (4 bytes), one
//! 8-byte `(address, length)` record per requested section in request
//! order, then the section payloads in the same order. Zero-fill is
//! inserted whenever a section's address lies past the payload cursor,
//! and the payload is finally padded to the end of the segment whose
//! memory range contains the last written address.

use anyhow::{Context, Result, bail};

use crate::image::ReconstructedImage;
use crate::sections::ResolvedSection;

/// Size of one `(address, length)` directory record.
const DIR_ENTRY_SIZE: usize = 8;

/// Encode the requested sections as a directory dump.
///
/// Sections must come in ascending address order; the payload cursor
/// tracks the address space, so identical inputs always produce identical
/// bytes.
#[expect(
    clippy::cast_possible_truncation,
    reason = "fill counts are bounded by 32-bit section addresses and sizes"
)]
pub fn encode(
    entry: u32,
    image: &ReconstructedImage,
    sections: &[ResolvedSection<'_>],
) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.try_reserve_exact(4 + sections.len() * DIR_ENTRY_SIZE)
        .context("allocating output buffer")?;

    out.extend_from_slice(&entry.to_le_bytes());
    for section in sections {
        out.extend_from_slice(&section.addr.to_le_bytes());
        out.extend_from_slice(&section.len.to_le_bytes());
    }

    // Payloads sit at their section addresses relative to address 0; the
    // cursor tracks the address space, not the output stream.
    let mut cursor: u64 = 0;
    for section in sections {
        let addr = u64::from(section.addr);
        if addr < cursor {
            bail!(
                "section {} at address {:#x} overlaps already-written output",
                section.name,
                section.addr
            );
        }
        push_zeros(&mut out, (addr - cursor) as usize)?;
        match section.offset {
            Some(offset) => {
                out.try_reserve_exact(section.len as usize)
                    .context("allocating output buffer")?;
                out.extend_from_slice(&image.bytes[offset..offset + section.len as usize]);
            }
            None => push_zeros(&mut out, section.len as usize)?,
        }
        cursor = addr + u64::from(section.len);
    }

    // Pad to the end of the segment containing the last written address so
    // the covering segment's trailing bss is materialized.
    if cursor > 0 {
        if let Ok(last) = u32::try_from(cursor - 1) {
            if let Some(span) = image.span_containing_addr(last) {
                push_zeros(&mut out, (span.mem_end() - cursor) as usize)?;
            }
        }
    }

    Ok(out)
}

/// Append `count` zero bytes to the output.
fn push_zeros(out: &mut Vec<u8>, count: usize) -> Result<()> {
    out.try_reserve_exact(count)
        .context("allocating output buffer")?;
    out.resize(out.len() + count, 0);
    Ok(())
}
