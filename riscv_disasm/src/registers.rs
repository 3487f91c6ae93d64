//! RISC-V register names
//!
//! | ABI name | X name | Usage                                |
//! |----------|--------|--------------------------------------|
//! | zero     | x0     | Read always as zero                  |
//! | ra       | x1     | Return address                       |
//! | sp       | x2     | Stack pointer                        |
//! | gp       | x3     | Global pointer                       |
//! | tp       | x4     | Thread pointer                       |
//! | t0-t2    | x5-x7  | Temporaries                          |
//! | s0-s1    | x8-x9  | Saved registers (s0 is frame pointer)|
//! | a0-a7    | x10-17 | Function arguments / return values   |
//! | s2-s11   | x18-27 | Saved registers                      |
//! | t3-t6    | x28-31 | Temporaries                          |
//! | pc       | -      | Program counter (synthetic)          |
//!
//! Ref: https://riscv-non-isa.github.io/riscv-elf-psabi-doc/#_register_convention

/// Base register names indexed by the 5-bit register id, followed by `pc`
pub const REGISTERS: [&str; 33] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6", "pc",
];

/// Registers reachable through the 3-bit register ids of the compressed formats (x8-x15)
pub const RVC_REGISTERS: [&str; 8] = ["s0", "s1", "a0", "a1", "a2", "a3", "a4", "a5"];

/// Index of the synthetic program counter inside [`REGISTERS`]
pub const REG_PC: usize = 32;
pub const REG_ZERO: u8 = 0;
pub const REG_RA: u8 = 1;
pub const REG_SP: u8 = 2;

/// Name of a base register from its 5-bit id
///
/// Only the low 5 bits of `id` are used, so this never indexes out of bounds.
#[inline]
pub fn reg_name(id: u8) -> &'static str {
    REGISTERS[(id & 0b1_1111) as usize]
}

/// Name of a compressed register from its 3-bit id
#[inline]
pub fn rvc_reg_name(id: u8) -> &'static str {
    RVC_REGISTERS[(id & 0b111) as usize]
}
