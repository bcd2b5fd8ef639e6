//! End-to-end extraction pipelines.
//!
//! Each operation takes the raw input bytes and returns the finished
//! artifact; nothing is read from or written to the outside world here.
//! A failure at any stage therefore leaves no partial output behind, and
//! every buffer (file contents, image, resolved views) dies with the call.

use anyhow::{Context, Result};
use quark_elf::{ElfFile, Profile};

use crate::artifact;
use crate::cli::UnpackFormat;
use crate::image::{LayoutError, ReconstructedImage};
use crate::sections;

/// Re-encode a linked executable as a flat or legacy-header image.
pub fn unpack(data: &[u8], format: UnpackFormat) -> Result<Vec<u8>> {
    let elf = ElfFile::parse(data, Profile::Executable).context("validating ELF header")?;
    let image = ReconstructedImage::build(&elf)?;
    let layout = sections::resolve_whitelist(&elf, &image)?;

    match format {
        UnpackFormat::Flat => Ok(artifact::flat::encode(&image, &layout)),
        UnpackFormat::LegacyHeader => artifact::legacy::encode(elf.entry_point(), &image, &layout),
    }
}

/// Dump the requested sections of a linked executable behind directory
/// records.
pub fn dump(data: &[u8], names: &[String]) -> Result<Vec<u8>> {
    let elf = ElfFile::parse(data, Profile::Executable).context("validating ELF header")?;
    let image = ReconstructedImage::build(&elf)?;
    let resolved = sections::resolve_directory(&elf, &image, names)?;
    artifact::directory::encode(elf.entry_point(), &image, &resolved)
}

/// Package a relocatable boot object into a signed 512-byte sector.
pub fn boot_from_object(data: &[u8]) -> Result<Vec<u8>> {
    let elf = ElfFile::parse(data, Profile::Relocatable).context("validating boot object")?;
    let text = sections::resolve_boot(&elf)?;

    let offset = text.offset.context(".text has no file-backed content")?;
    let payload = &data[offset..offset + text.len as usize];
    Ok(artifact::boot::seal(payload)?)
}

/// Package the `.text`/`.data`/`.bss` of an already-linked boot image
/// into a signed 512-byte sector.
///
/// Funnels into the same sealing primitive as [`boot_from_object`].
#[expect(
    clippy::cast_possible_truncation,
    reason = "the total is checked against the 510-byte ceiling first"
)]
pub fn boot_from_linked(data: &[u8]) -> Result<Vec<u8>> {
    let elf = ElfFile::parse(data, Profile::Executable).context("validating boot image")?;
    let image = ReconstructedImage::build(&elf)?;
    let layout = sections::resolve_whitelist(&elf, &image)?;

    let total = u64::from(layout.text_size)
        + u64::from(layout.data_size)
        + u64::from(layout.bss_size);
    if total > artifact::boot::SIGNATURE_OFFSET as u64 {
        return Err(LayoutError::BootOverflow { size: total }.into());
    }

    // The image holds text+data and usually the bss zeros too; zero-extend
    // in case the declared bss outruns the reconstructed image.
    let total = total as usize;
    let mut payload = vec![0u8; total];
    let available = image
        .bytes
        .len()
        .saturating_sub(layout.text_start)
        .min(total);
    payload[..available]
        .copy_from_slice(&image.bytes[layout.text_start..layout.text_start + available]);
    Ok(artifact::boot::seal(&payload)?)
}
