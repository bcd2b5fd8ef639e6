//! Flat binary encoding: `.text` + `.data` + `.bss` with no header.

use crate::image::ReconstructedImage;
use crate::sections::KernelLayout;

/// Encode the image as a raw flat binary.
///
/// The payload is the reconstructed image from the first `.text` byte to
/// the end of the image; bss and alignment tails are already zero runs by
/// construction, so no extra fill is needed.
#[must_use]
pub fn encode(image: &ReconstructedImage, layout: &KernelLayout) -> Vec<u8> {
    image.bytes[layout.text_start..].to_vec()
}
