//! Pure conversions between raw register bytes and the values the drivers hand out.
//!
//! Nothing in here touches the bus, every function can be used (and tested) on plain byte
//! slices.

/// Byte order of a two-byte register value as it comes off the wire.
///
/// There is no global default: every driver instance carries its own value because devices
/// sharing a bus do not agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Endianness {
    /// Low byte first.
    Little,
    /// High byte first.
    Big,
}

/// Combine two bytes into an unsigned 16-bit value.
pub fn decode_u16(bytes: [u8; 2], endianness: Endianness) -> u16 {
    match endianness {
        Endianness::Little => u16::from_le_bytes(bytes),
        Endianness::Big => u16::from_be_bytes(bytes),
    }
}

/// Split an unsigned 16-bit value into two bytes; inverse of [`decode_u16`].
pub fn encode_u16(value: u16, endianness: Endianness) -> [u8; 2] {
    match endianness {
        Endianness::Little => value.to_le_bytes(),
        Endianness::Big => value.to_be_bytes(),
    }
}

/// Combine two bytes and reinterpret the 16-bit pattern as two's complement.
pub fn decode_i16(bytes: [u8; 2], endianness: Endianness) -> i16 {
    decode_u16(bytes, endianness) as i16
}

/// Scale a signed raw reading by the resolution of one LSB.
///
/// The resolution has to match the current device configuration, e.g. `0.0625` for a
/// temperature register counting in 1/16 °C.
pub fn scale_temperature(raw: i16, lsb: f32) -> f32 {
    raw as f32 * lsb
}

/// Replace the bits selected by `mask` in `current` with the corresponding bits of `bits`.
///
/// Bits of `bits` outside of `mask` are ignored.  Masks of independent settings sharing one
/// register must not overlap, this is not checked here.
pub fn pack_bitfield(current: u8, bits: u8, mask: u8) -> u8 {
    (current & !mask) | (bits & mask)
}

/// Clamp `value` into `[lo, hi]`.
///
/// `lo` must not be greater than `hi`.  A NaN `value` is passed through unchanged.
pub fn clamp_normalized(value: f32, lo: f32, hi: f32) -> f32 {
    if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

/// Map a raw analog count onto `[-1.0, 1.0]` around `center`.
///
/// `center` maps to `0.0`, `full_scale` to `1.0` and `0` to `-1.0`.  Both halves are scaled
/// separately so a center that is not exactly in the middle of the range still reaches both
/// ends.
pub fn normalize(raw: u16, center: u16, full_scale: u16) -> f32 {
    let offset = raw as f32 - center as f32;
    let span = if raw >= center {
        full_scale.saturating_sub(center)
    } else {
        center
    };
    if span == 0 {
        return if offset > 0.0 { 1.0 } else { 0.0 };
    }
    clamp_normalized(offset / span as f32, -1.0, 1.0)
}

/// Map a raw analog count onto `[0.0, 1.0]`.
pub fn normalize_unipolar(raw: u16, full_scale: u16) -> f32 {
    if full_scale == 0 {
        return 0.0;
    }
    clamp_normalized(raw as f32 / full_scale as f32, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_byte_order() {
        assert_eq!(decode_u16([0x34, 0x12], Endianness::Little), 0x1234);
        assert_eq!(decode_u16([0x12, 0x34], Endianness::Big), 0x1234);
        assert_eq!(encode_u16(0x1234, Endianness::Little), [0x34, 0x12]);
        assert_eq!(encode_u16(0x1234, Endianness::Big), [0x12, 0x34]);
    }

    #[test]
    fn word_reencodes_to_same_bytes() {
        for bytes in [[0x00, 0x00], [0xff, 0x01], [0x80, 0x7f], [0xa5, 0x5a]] {
            for e in [Endianness::Little, Endianness::Big] {
                assert_eq!(encode_u16(decode_u16(bytes, e), e), bytes);
            }
        }
    }

    #[test]
    fn signed_follows_high_bit() {
        assert_eq!(decode_i16([0x80, 0x00], Endianness::Big), -32768);
        assert_eq!(decode_i16([0xff, 0xff], Endianness::Big), -1);
        assert_eq!(decode_i16([0x7f, 0xff], Endianness::Big), 32767);
        assert_eq!(decode_i16([0x00, 0x00], Endianness::Big), 0);
        assert_eq!(decode_i16([0xf0, 0xff], Endianness::Little), -16);

        for hi in (0x80..=0xffu8).step_by(7) {
            let v = decode_i16([hi, 0x3c], Endianness::Big);
            assert!((-32768..=-1).contains(&v));
        }
        for hi in (0x00..0x80u8).step_by(7) {
            let v = decode_i16([hi, 0x3c], Endianness::Big);
            assert!((0..=32767).contains(&v));
        }
    }

    #[test]
    fn temperature_scaling() {
        assert_eq!(scale_temperature(1600, 0.0625), 100.0);
        assert_eq!(scale_temperature(-16, 1.0 / 16.0), -1.0);
        assert_eq!(scale_temperature(0, 0.25), 0.0);
    }

    #[test]
    fn bitfield_only_touches_mask() {
        assert_eq!(pack_bitfield(0b1011_0101, 0b0000_0011, 0b0000_0111), 0b1011_0011);
        assert_eq!(pack_bitfield(0xff, 0x00, 0x80), 0x7f);
        // bits outside the mask are dropped
        assert_eq!(pack_bitfield(0x00, 0xff, 0x1c), 0x1c);
    }

    #[test]
    fn joystick_normalization() {
        assert_eq!(normalize(2048, 2048, 4095), 0.0);
        assert_eq!(normalize(4095, 2048, 4095), 1.0);
        assert_eq!(normalize(0, 2048, 4095), -1.0);
        assert_eq!(normalize(1024, 2048, 4095), -0.5);
        // values beyond full scale are clamped
        assert_eq!(normalize(5000, 2048, 4095), 1.0);
    }

    #[test]
    fn normalization_degenerate_span() {
        assert_eq!(normalize(10, 10, 10), 0.0);
        assert_eq!(normalize(0, 0, 4095), 0.0);
        assert_eq!(normalize_unipolar(100, 0), 0.0);
    }

    #[test]
    fn clamping() {
        assert_eq!(clamp_normalized(1.5, -1.0, 1.0), 1.0);
        assert_eq!(clamp_normalized(-1.5, -1.0, 1.0), -1.0);
        assert_eq!(clamp_normalized(0.25, 0.0, 1.0), 0.25);
        assert!(clamp_normalized(f32::NAN, 0.0, 1.0).is_nan());
        assert_eq!(normalize_unipolar(4095, 4095), 1.0);
        assert_eq!(normalize_unipolar(0, 4095), 0.0);
    }
}
