//! Named-section resolution.
//!
//! Resolves section names through the section-name string table and turns
//! matches into byte ranges, either in the raw file (relocatable boot
//! objects) or in the reconstructed image (linked executables). Three
//! modes mirror the three consumers: the `.text`/`.data`/`.bss` whitelist
//! for the flat and legacy encodings, an ordered caller-supplied name
//! list for the directory dump, and the `.text`-only boot rule.

use anyhow::{Context, Result, bail};
use quark_elf::{Elf32SectionHeader, ElfFile, SHT_NOBITS, SHT_NULL, StringTable};

use crate::image::ReconstructedImage;

/// Sections that never contribute to an output image; skipped without
/// complaint whatever their size.
const IGNORED_SECTIONS: [&str; 4] = [".symtab", ".strtab", ".shstrtab", ".rel.text"];

/// A named section resolved to a byte range in its backing buffer.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSection<'a> {
    /// The section's name.
    pub name: &'a str,
    /// Memory address of the section.
    pub addr: u32,
    /// Size of the section in bytes.
    pub len: u32,
    /// Offset of the section's first byte in its backing buffer (the
    /// image for executables, the file for boot objects); `None` when the
    /// section occupies no file space and its content is implied zeros.
    pub offset: Option<usize>,
}

/// `.text`/`.data`/`.bss` placement for the flat and legacy encodings.
#[derive(Debug, Clone, Copy)]
pub struct KernelLayout {
    /// Image offset of the first `.text` byte.
    pub text_start: usize,
    /// `.text` size in bytes.
    pub text_size: u32,
    /// `.data` size in bytes (0 when the section is absent).
    pub data_size: u32,
    /// `.bss` size in bytes (0 when the section is absent).
    pub bss_size: u32,
}

/// Resolve the `.text`/`.data`/`.bss` whitelist against a linked
/// executable's image.
///
/// Any other named section with a nonzero size is fatal, except the
/// always-ignored symbol/string/relocation tables.
pub fn resolve_whitelist(elf: &ElfFile<'_>, image: &ReconstructedImage) -> Result<KernelLayout> {
    let strtab = elf.string_table()?;

    let mut text: Option<(usize, u32)> = None;
    let mut data_size: Option<u32> = None;
    let mut bss_size: Option<u32> = None;

    for shdr in elf.sections() {
        if shdr.sh_type == SHT_NULL {
            continue;
        }
        let name = section_name(elf, &strtab, &shdr)?;
        match name {
            ".text" => {
                if text.is_some() {
                    bail!("duplicate .text section in image");
                }
                let offset = image_offset(image, &shdr, name)?
                    .context(".text has no file-backed content")?;
                text = Some((offset, shdr.sh_size));
            }
            ".data" => {
                if data_size.is_some() {
                    bail!("duplicate .data section in image");
                }
                // Only the size is recorded, but the placement must still
                // be sane.
                image_offset(image, &shdr, name)?;
                data_size = Some(shdr.sh_size);
            }
            ".bss" => {
                if bss_size.is_some() {
                    bail!("duplicate .bss section in image");
                }
                bss_size = Some(shdr.sh_size);
            }
            _ if IGNORED_SECTIONS.contains(&name) => {}
            _ if shdr.sh_size != 0 => bail!("illegal {name} section in image"),
            _ => {}
        }
    }

    let (text_start, text_size) = text.context("image has no .text section")?;
    Ok(KernelLayout {
        text_start,
        text_size,
        data_size: data_size.unwrap_or(0),
        bss_size: bss_size.unwrap_or(0),
    })
}

/// Resolve a caller-ordered list of section names against a linked
/// executable's image.
///
/// Every requested name must match exactly one section header; results
/// come back in request order.
pub fn resolve_directory<'a>(
    elf: &ElfFile<'_>,
    image: &ReconstructedImage,
    names: &'a [String],
) -> Result<Vec<ResolvedSection<'a>>> {
    let strtab = elf.string_table()?;

    let mut resolved = Vec::with_capacity(names.len());
    for requested in names {
        let mut found: Option<ResolvedSection<'a>> = None;
        for shdr in elf.sections() {
            if shdr.sh_type == SHT_NULL {
                continue;
            }
            let name = section_name(elf, &strtab, &shdr)?;
            if name != requested {
                continue;
            }
            if found.is_some() {
                bail!("section {requested} matches more than one section header");
            }
            found = Some(ResolvedSection {
                name: requested.as_str(),
                addr: shdr.sh_addr,
                len: shdr.sh_size,
                offset: image_offset(image, &shdr, name)?,
            });
        }
        resolved.push(found.with_context(|| format!("no {requested} section in image"))?);
    }
    Ok(resolved)
}

/// Resolve `.text` from a relocatable boot object as a byte range in the
/// raw file.
///
/// The symbol/string/relocation tables are ignored outright; any other
/// named section with a nonzero size is fatal. `.text` must be present
/// and non-empty.
pub fn resolve_boot<'a>(elf: &ElfFile<'a>) -> Result<ResolvedSection<'a>> {
    let strtab = elf.string_table()?;

    let mut text: Option<ResolvedSection<'a>> = None;
    for shdr in elf.sections() {
        if shdr.sh_type == SHT_NULL {
            continue;
        }
        let name = section_name(elf, &strtab, &shdr)?;
        match name {
            ".text" => {
                if text.is_some() {
                    bail!("duplicate .text section in boot object");
                }
                if elf.section_data(&shdr).is_none() {
                    bail!(".text data is missing or runs past the end of the boot object");
                }
                text = Some(ResolvedSection {
                    name: ".text",
                    addr: shdr.sh_addr,
                    len: shdr.sh_size,
                    offset: Some(shdr.sh_offset as usize),
                });
            }
            _ if IGNORED_SECTIONS.contains(&name) => {}
            _ if shdr.sh_size != 0 => bail!("illegal {name} section in boot"),
            _ => {}
        }
    }

    let text = text.context("boot object has no .text section")?;
    if text.len == 0 {
        bail!("boot object .text section is empty");
    }
    Ok(text)
}

/// A section's name, or an error when the name offset is unresolvable.
fn section_name<'a>(
    elf: &ElfFile<'a>,
    strtab: &StringTable<'a>,
    shdr: &Elf32SectionHeader,
) -> Result<&'a str> {
    elf.section_name(strtab, shdr)
        .with_context(|| format!("section name offset {} does not resolve", shdr.sh_name))
}

/// Translate a section's file range into an image offset through the
/// covering segment span.
///
/// Returns `Ok(None)` for sections with no file-backed content
/// (`SHT_NOBITS` or empty); a file-backed section outside every loadable
/// segment is an error.
fn image_offset(
    image: &ReconstructedImage,
    shdr: &Elf32SectionHeader,
    name: &str,
) -> Result<Option<usize>> {
    if shdr.sh_type == SHT_NOBITS || shdr.sh_size == 0 {
        return Ok(None);
    }
    let span = image
        .span_for_file_offset(shdr.sh_offset)
        .with_context(|| format!("section {name} lies outside every loadable segment"))?;
    if !span.covers_file_range(shdr.sh_offset, shdr.sh_size) {
        bail!("section {name} crosses a segment boundary");
    }
    Ok(Some(span.image_offset(shdr.sh_offset)))
}
