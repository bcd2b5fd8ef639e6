//! Legacy header+blob encoding.
//!
//! The old-style executable header: eight little-endian 32-bit words
//! (magic, text size, data size, bss size, symbol-table size, entry
//! point, and two relocation sizes) followed by the raw text+data+bss
//! payload. The symbol-table and relocation words are always zero here.

use anyhow::{Context, Result, bail};

use crate::image::ReconstructedImage;
use crate::sections::KernelLayout;

/// Magic constant of the legacy header (old impure-executable format).
const LEGACY_MAGIC: u32 = 0x0107;

/// Size of the legacy header in bytes.
const LEGACY_HEADER_SIZE: usize = 32;

/// Encode the image behind the legacy 8-word header.
///
/// The format cannot express an entry point other than the start of text,
/// so a nonzero entry is rejected.
pub fn encode(entry: u32, image: &ReconstructedImage, layout: &KernelLayout) -> Result<Vec<u8>> {
    if entry != 0 {
        bail!("legacy header format requires entry point 0, found {entry:#x}");
    }

    let payload = &image.bytes[layout.text_start..];
    let mut out = Vec::new();
    out.try_reserve_exact(LEGACY_HEADER_SIZE + payload.len())
        .context("allocating output buffer")?;

    out.extend_from_slice(&LEGACY_MAGIC.to_le_bytes());
    out.extend_from_slice(&layout.text_size.to_le_bytes());
    out.extend_from_slice(&layout.data_size.to_le_bytes());
    out.extend_from_slice(&layout.bss_size.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // symbol-table size
    out.extend_from_slice(&entry.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // text relocation size
    out.extend_from_slice(&0u32.to_le_bytes()); // data relocation size
    debug_assert_eq!(out.len(), LEGACY_HEADER_SIZE);

    out.extend_from_slice(payload);
    Ok(out)
}
