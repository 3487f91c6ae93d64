/// Primary opcode groups of the 32-bit encoding
///
/// See: https://riscv-software-src.github.io/riscv-unified-db/manual/html/isa/isa_20240411/chapters/rv-32-64g.html#opcodemap
///
/// The discriminant is the 5-bit group held in bits [6:2]; bits [1:0] are always `0b11`
/// for 32-bit words and are not part of the group. An opcode group generally maps to
/// multiple instructions and `funct3`/`funct7` select the exact one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::unusual_byte_groupings)]
#[repr(u8)]
pub enum Opcode {
    /// Load instructions (lb, lh, lw, ld, lbu, lhu, lwu)
    Load = 0b00_000,

    /// Memory ordering instructions (fence, fence.i)
    MiscMem = 0b00_011,

    /// Immediate arithmetic/logic operations (addi, slti, xori, etc.)
    OpImm = 0b00_100,

    /// Add upper immediate to PC (auipc)
    Auipc = 0b00_101,

    /// 32-bit immediate operations (addiw, slliw, etc.) - RV64I only
    OpImm32 = 0b00_110,

    /// Store instructions (sb, sh, sw, sd)
    Store = 0b01_000,

    /// Register-register operations (add, sub, mul, etc.)
    Op = 0b01_100,

    /// Load upper immediate (lui)
    Lui = 0b01_101,

    /// 32-bit register operations (addw, subw, mulw, etc.) - RV64I only
    Op32 = 0b01_110,

    /// Branch instructions (beq, bne, blt, etc.)
    Branch = 0b11_000,

    /// Jump and link register (jalr)
    Jalr = 0b11_001,

    /// Jump and link (jal)
    Jal = 0b11_011,

    /// System instructions (ecall, ebreak, privileged, csr)
    System = 0b11_100,
}

impl Opcode {
    #[allow(clippy::unusual_byte_groupings)]
    /// Convert a 5-bit opcode group to the Opcode enum
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b00_000 => Some(Opcode::Load),
            0b00_011 => Some(Opcode::MiscMem),
            0b00_100 => Some(Opcode::OpImm),
            0b00_101 => Some(Opcode::Auipc),
            0b00_110 => Some(Opcode::OpImm32),
            0b01_000 => Some(Opcode::Store),
            0b01_100 => Some(Opcode::Op),
            0b01_101 => Some(Opcode::Lui),
            0b01_110 => Some(Opcode::Op32),
            0b11_000 => Some(Opcode::Branch),
            0b11_001 => Some(Opcode::Jalr),
            0b11_011 => Some(Opcode::Jal),
            0b11_100 => Some(Opcode::System),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bits_round_trips_discriminant() {
        for group in 0u8..32 {
            if let Some(opcode) = Opcode::from_bits(group) {
                assert_eq!(opcode as u8, group);
            }
        }
    }

    #[test]
    fn test_unassigned_groups() {
        // AMO, floating point and custom groups are not decoded
        for group in [0b00_001, 0b00_010, 0b01_011, 0b10_000, 0b10_100, 0b11_010, 0b11_111] {
            assert_eq!(Opcode::from_bits(group), None);
        }
    }
}
