//! Property-based tests for the instruction decoder.
//!
//! These tests verify invariants that should hold for every input:
//! - Decoding never panics on arbitrary input
//! - The decoded length follows the two low bits of the first byte
//! - Conditional branches always carry a taken and a fall-through edge
//! - A linear sweep covers the whole buffer

use proptest::prelude::*;

use riscv_disasm::bits::sign_extend;
use riscv_disasm::{BranchKind, Disassembled, InstructionDecoder, Target};

// =============================================================================
// Decoder Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10000))]

    /// Decoding arbitrary bytes should never panic.
    #[test]
    fn decode_never_panics(
        bytes in prop::collection::vec(any::<u8>(), 0..8),
        address in any::<u64>(),
    ) {
        let decoder = InstructionDecoder::new();
        let _ = decoder.decode(&bytes, address);
        let _ = decoder.decode_all(&bytes, address);
    }

    /// Decoded length is 4 exactly when the low two bits are `11`.
    #[test]
    fn decoded_length_follows_low_bits(word in any::<u32>()) {
        let bytes = word.to_le_bytes();
        if let Some(decoded) = riscv_disasm::decode(&bytes, 0x1000) {
            let expected = if word & 0b11 == 0b11 { 4 } else { 2 };
            prop_assert_eq!(decoded.length, expected);
            prop_assert_eq!(decoded.is_compressed(), expected == 2);
        }
    }

    /// Decoding is deterministic: same input always produces same output.
    #[test]
    fn decode_is_deterministic(word in any::<u32>(), address in any::<u64>()) {
        let bytes = word.to_le_bytes();
        let decoder = InstructionDecoder::new();
        prop_assert_eq!(decoder.decode(&bytes, address), decoder.decode(&bytes, address));
    }

    /// Decoded instructions have a non-empty mnemonic that starts their text.
    #[test]
    fn decoded_has_mnemonic(word in any::<u32>()) {
        if let Some(decoded) = riscv_disasm::decode(&word.to_le_bytes(), 0) {
            prop_assert!(!decoded.mnemonic.is_empty());
            prop_assert!(decoded.to_string().starts_with(decoded.mnemonic.as_str()));
        }
    }

    /// Conditional branches emit the taken edge then the fall-through edge.
    #[test]
    fn conditional_branches_have_two_edges(
        word in any::<u32>(),
        address in 0u64..0xFFFF_FFFF_0000_0000,
    ) {
        if let Some(decoded) = riscv_disasm::decode(&word.to_le_bytes(), address) {
            if decoded.branches.iter().any(|edge| edge.kind == BranchKind::TrueBranch) {
                prop_assert_eq!(decoded.branches.len(), 2);
                prop_assert_eq!(decoded.branches[1].kind, BranchKind::FalseBranch);
                prop_assert_eq!(decoded.branches[1].target, Some(address + decoded.length as u64));
            }
        }
    }

    /// JAL selects its mnemonic and edge kind from the link register.
    #[test]
    fn jal_selection_by_link_register(imm in 0u32..(1 << 20), rd in 0u32..32) {
        let word = (imm << 12) | (rd << 7) | 0b110_1111;
        let decoded = riscv_disasm::decode(&word.to_le_bytes(), 0x8000_0000);
        prop_assert!(decoded.is_some());
        let decoded = decoded.unwrap();

        let (mnemonic, kind) = match rd {
            0 => ("j", BranchKind::Unconditional),
            1 => ("call", BranchKind::Call),
            _ => ("jal", BranchKind::Call),
        };
        prop_assert_eq!(decoded.mnemonic.as_str(), mnemonic);
        prop_assert_eq!(decoded.branches.len(), 1);
        prop_assert_eq!(decoded.branches[0].kind, kind);
    }

    /// Compressed words never decode on a target without C.
    #[test]
    fn compressed_requires_c_extension(upper in any::<u16>(), quadrant in 0u16..3) {
        let half = (upper & !0b11) | quadrant;
        let decoder = InstructionDecoder::with_target(Target::new().with_64bit().with_m());
        prop_assert!(decoder.decode(&half.to_le_bytes(), 0).is_none());
    }
}

// =============================================================================
// Sweep Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// A sweep covers every byte exactly once with contiguous addresses.
    #[test]
    fn sweep_covers_buffer(
        bytes in prop::collection::vec(any::<u8>(), 0..256),
        base in 0u64..0xFFFF_0000,
    ) {
        let units: Vec<Disassembled> = InstructionDecoder::new().sweep(&bytes, base).collect();

        let mut expected = base;
        for unit in &units {
            prop_assert_eq!(unit.address(), expected);
            prop_assert!(unit.length() >= 1 && unit.length() <= 4);
            expected += unit.length() as u64;
        }
        prop_assert_eq!(expected - base, bytes.len() as u64);
    }

    /// Unknown units never exceed two bytes.
    #[test]
    fn sweep_unknown_units_are_short(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        for unit in InstructionDecoder::new().sweep(&bytes, 0) {
            if let Disassembled::Unknown { length, .. } = unit {
                prop_assert!(length <= 2);
                prop_assert_eq!(unit.text(), "unk");
            }
        }
    }
}

// =============================================================================
// Sign Extension Properties
// =============================================================================

proptest! {
    /// Sign extension stays within the two's complement range of the width.
    #[test]
    fn sign_extend_in_range(value in any::<u32>(), width in 1u32..=32) {
        let extended = sign_extend(value, width);
        let half = 1i64 << (width - 1);
        prop_assert!(extended >= -half && extended < half);
    }

    /// Re-extending an extended value at the same width is a no-op.
    #[test]
    fn sign_extend_is_idempotent(
        value in any::<u32>(),
        width in prop::sample::select(vec![5u32, 6, 8, 9, 12, 18, 20]),
    ) {
        let extended = sign_extend(value, width);
        prop_assert_eq!(sign_extend(extended as u32, width), extended);
    }
}
