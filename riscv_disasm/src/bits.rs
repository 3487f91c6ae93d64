//! Bit-field helpers shared by the standard and compressed decoders
//!
//! Both helpers operate on `u32`. Compressed (16-bit) words are widened before
//! extraction so the same code serves both instruction widths.

/// Returns bits `hi..=lo` of `word` as an unsigned value.
///
/// Bit positions are counted from the least significant bit, starting at 0.
/// Requires `hi >= lo` and `hi <= 31`.
#[inline(always)]
pub const fn bits(word: u32, hi: u32, lo: u32) -> u32 {
    debug_assert!(hi >= lo && hi < 32);
    let width = hi - lo + 1;
    let mask = if width == 32 { u32::MAX } else { (1u32 << width) - 1 };
    (word >> lo) & mask
}

/// Returns bit `pos` of `word`.
#[inline(always)]
pub const fn bit(word: u32, pos: u32) -> u32 {
    bits(word, pos, pos)
}

/// Interprets the low `width` bits of `value` as a two's complement number.
///
/// If bit `width - 1` is set the result is `value - 2^width`, otherwise it is
/// `value`. Bits above `width` are ignored. Valid for `1 <= width <= 32`.
#[inline(always)]
pub const fn sign_extend(value: u32, width: u32) -> i64 {
    debug_assert!(width >= 1 && width <= 32);
    let value = if width == 32 { value as u64 } else { (value & ((1u32 << width) - 1)) as u64 };
    if (value >> (width - 1)) & 1 == 1 {
        value as i64 - (1i64 << width)
    } else {
        value as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits() {
        assert_eq!(bits(0b1011_0000, 7, 4), 0b1011);
        assert_eq!(bits(0xDEAD_BEEF, 31, 0), 0xDEAD_BEEF);
        assert_eq!(bits(0x8000_0000, 31, 31), 1);
        assert_eq!(bits(0x0010_0293, 6, 2), 0b00100);
        assert_eq!(bit(0b100, 2), 1);
        assert_eq!(bit(0b100, 1), 0);
    }

    #[test]
    fn test_sign_extend_positive() {
        assert_eq!(sign_extend(0x123, 12), 0x123);
        assert_eq!(sign_extend(0b01111, 5), 15);
        assert_eq!(sign_extend(0, 20), 0);
    }

    #[test]
    fn test_sign_extend_negative() {
        assert_eq!(sign_extend(0x800, 12), -2048);
        assert_eq!(sign_extend(0xFFF, 12), -1);
        assert_eq!(sign_extend(0b10000, 5), -16);
        assert_eq!(sign_extend(0b11_1111, 6), -1);
        assert_eq!(sign_extend(0x100, 9), -256);
        assert_eq!(sign_extend(0x2_0000, 18), -131072);
        assert_eq!(sign_extend(0xFFFF_FFFF, 32), -1);
    }

    #[test]
    fn test_sign_extend_ignores_high_bits() {
        assert_eq!(sign_extend(0xF01, 8), 1);
        assert_eq!(sign_extend(0x1FF, 8), -1);
    }

    #[test]
    fn test_sign_extend_idempotent() {
        for width in [5, 6, 8, 9, 12, 18, 20] {
            for value in [0u32, 1, (1 << (width - 1)) - 1, 1 << (width - 1), (1 << width) - 1] {
                let once = sign_extend(value, width);
                let twice = sign_extend(once as u32, width);
                assert_eq!(twice, once, "width {width}, value {value:#x}");
            }
        }
    }
}
