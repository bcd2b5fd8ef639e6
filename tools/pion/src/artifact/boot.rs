//! Boot-sector packaging.
//!
//! Pads a boot payload to 510 bytes and appends the 2-byte signature.
//! Every boot front end funnels through [`seal`]; the signature is
//! written in exactly one place.

use crate::image::LayoutError;

/// Total size of a boot sector.
pub const SECTOR_SIZE: usize = 512;

/// Offset of the boot signature within the sector, and therefore the
/// payload ceiling.
pub const SIGNATURE_OFFSET: usize = 510;

/// The 2-byte signature marking a sector bootable.
pub const SIGNATURE: [u8; 2] = [0x55, 0xAA];

/// Pad `payload` with zeros to 510 bytes and seal it with the signature.
///
/// # Errors
///
/// [`LayoutError::BootOverflow`] when the payload exceeds 510 bytes;
/// nothing is produced in that case.
pub fn seal(payload: &[u8]) -> Result<Vec<u8>, LayoutError> {
    if payload.len() > SIGNATURE_OFFSET {
        return Err(LayoutError::BootOverflow {
            size: payload.len() as u64,
        });
    }
    let mut sector = vec![0u8; SECTOR_SIZE];
    sector[..payload.len()].copy_from_slice(payload);
    sector[SIGNATURE_OFFSET..].copy_from_slice(&SIGNATURE);
    Ok(sector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_padded_and_signed() {
        let sector = seal(&[0xEB, 0xFE]).expect("sealed");
        assert_eq!(sector.len(), SECTOR_SIZE);
        assert_eq!(&sector[0..2], &[0xEB, 0xFE]);
        assert!(sector[2..SIGNATURE_OFFSET].iter().all(|&b| b == 0));
        assert_eq!(&sector[SIGNATURE_OFFSET..], &SIGNATURE);
    }

    #[test]
    fn full_payload_fits_exactly() {
        let payload = [0x5A; 510];
        let sector = seal(&payload).expect("sealed");
        assert_eq!(sector.len(), 512);
        assert_eq!(&sector[..510], &payload[..]);
        assert_eq!(&sector[510..], &[0x55, 0xAA]);
    }

    #[test]
    fn oversized_payload_rejected() {
        let payload = [0x5A; 511];
        assert_eq!(
            seal(&payload),
            Err(LayoutError::BootOverflow { size: 511 })
        );
    }

    #[test]
    fn empty_payload_is_a_valid_sector() {
        let sector = seal(&[]).expect("sealed");
        assert_eq!(sector.len(), 512);
        assert!(sector[..510].iter().all(|&b| b == 0));
        assert_eq!(&sector[510..], &SIGNATURE);
    }
}
