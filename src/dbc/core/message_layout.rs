use crate::dbc::types::errors::MessageLayoutError;
use crate::kcd::types::signal::Endianness;

/// Converts a Motorola start bit (position of the MSB) into the canonical
/// offset of the LSB, counted from bit 0 of byte 0.
///
/// With `p = 7 - msb % 8 + length - 1`: a signal with `p < 8` stays inside its byte
/// and ends at `msb + 1 - length`; otherwise it ends in byte `msb / 8 + p / 8`
/// at bit `7 - p % 8`.
pub(crate) fn motorola_lsb(msb: u16, length: u16) -> Result<u16, MessageLayoutError> {
    if length == 0 {
        return Err(MessageLayoutError::ZeroBitLength);
    }
    let msb: u32 = u32::from(msb);
    let length: u32 = u32::from(length);
    let p: u32 = 7 - msb % 8 + length - 1;
    let lsb: u32 = if p < 8 {
        msb + 1 - length
    } else {
        (7 - p % 8) + 8 * (p / 8) + 8 * (msb / 8)
    };
    u16::try_from(lsb).map_err(|_| MessageLayoutError::MotorolaOutOfBounds {
        end: lsb as usize,
        total_bits: usize::from(u16::MAX) + 1,
    })
}

/// Verify that (bit_start, bit_length) fits within a payload of `bytes` bytes.
///
/// - Intel: the field occupies bits [start, start + len - 1] on a linear 0..(8*bytes-1) plane.
/// - Motorola: `start` is the MSB; on the sawtooth plane where it sits at
///   `lin = 8 * (start / 8) + 7 - start % 8` the field covers [lin, lin + len - 1].
pub(crate) fn check_signal_fits(
    bytes: u16,
    bit_start: u16,
    bit_length: u16,
    endianness: Endianness,
) -> Result<(), MessageLayoutError> {
    if bit_length == 0 {
        return Err(MessageLayoutError::ZeroBitLength);
    }
    if bit_length > 64 {
        return Err(MessageLayoutError::TooLong { length: bit_length });
    }
    let total_bits: usize = usize::from(bytes) * 8;
    let start: usize = usize::from(bit_start);
    let len: usize = usize::from(bit_length);

    match endianness {
        Endianness::Little => {
            let end: usize = start + len - 1;
            if end < total_bits {
                Ok(())
            } else {
                Err(MessageLayoutError::IntelOutOfBounds { end, total_bits })
            }
        }
        Endianness::Big => {
            let linearized_start: usize = (start & !7) + (7 - (start & 7)); // start=7 -> 0, start=0 -> 7
            let end: usize = linearized_start + len - 1;
            if end < total_bits {
                Ok(())
            } else {
                Err(MessageLayoutError::MotorolaOutOfBounds { end, total_bits })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motorola_lsb() {
        assert_eq!(motorola_lsb(7, 8).unwrap(), 0);
        assert_eq!(motorola_lsb(7, 1).unwrap(), 7);
        assert_eq!(motorola_lsb(0, 1).unwrap(), 0);
        assert_eq!(motorola_lsb(15, 8).unwrap(), 8);
        assert_eq!(motorola_lsb(5, 3).unwrap(), 3);
        assert_eq!(motorola_lsb(7, 16).unwrap(), 8);
        assert_eq!(motorola_lsb(39, 16).unwrap(), 40);
        assert_eq!(motorola_lsb(3, 8).unwrap(), 12);
        // eight full bytes: the LSB is bit 0 of byte 7
        assert_eq!(motorola_lsb(7, 64).unwrap(), 56);
        assert_eq!(motorola_lsb(7, 0), Err(MessageLayoutError::ZeroBitLength));
    }

    #[test]
    fn test_check_signal_fits_intel() {
        assert!(check_signal_fits(8, 56, 8, Endianness::Little).is_ok());
        assert_eq!(
            check_signal_fits(8, 57, 8, Endianness::Little),
            Err(MessageLayoutError::IntelOutOfBounds {
                end: 64,
                total_bits: 64
            })
        );
        assert!(check_signal_fits(64, 0, 64, Endianness::Little).is_ok());
        assert_eq!(
            check_signal_fits(16, 0, 65, Endianness::Little),
            Err(MessageLayoutError::TooLong { length: 65 })
        );
    }

    #[test]
    fn test_check_signal_fits_motorola() {
        assert!(check_signal_fits(8, 7, 64, Endianness::Big).is_ok());
        assert!(check_signal_fits(2, 7, 16, Endianness::Big).is_ok());
        assert!(check_signal_fits(2, 0, 2, Endianness::Big).is_ok());
        assert!(check_signal_fits(1, 7, 9, Endianness::Big).is_err());
        assert!(check_signal_fits(8, 0, 0, Endianness::Big).is_err());
    }
}
