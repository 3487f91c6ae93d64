//! Compressed (16-bit) RISC-V instruction decoder
//!
//! Implements decoding for the RVC (compressed) extension which provides
//! 16-bit encodings for common RISC-V instructions to improve code density.
//!
//! Compressed instructions are organized by quadrants based on bits [1:0]:
//! - Quadrant 0 (00): Stack-pointer based constructors, loads/stores through rd'/rs1'
//! - Quadrant 1 (01): Control transfers, integer constants and computations
//! - Quadrant 2 (10): Stack-pointer based operations, register moves
//! - Quadrant 3 (11): Reserved for 32-bit instructions
//!
//! Floating point loads/stores are reported as bare placeholders and the
//! quadrant 1 arithmetic group (`funct3 == 0b100`) as the `<c.math>` umbrella.
use tracing::trace;

use crate::{
    bits::{bit, bits, sign_extend},
    instruction::{offset_address, BranchKind, DecodedInstruction, InstructionBuilder},
    registers::{reg_name, rvc_reg_name, REG_RA, REG_SP, REG_ZERO},
    target::Target,
};

/// Size in bytes of every compressed instruction
pub const INSTRUCTION_LENGTH: usize = 2;

/// Mnemonic of the reserved all-zero word
pub const ILLEGAL: &str = "illegal";

/// Mnemonic of the quadrant 1 arithmetic group
pub const MATH_PLACEHOLDER: &str = "<c.math>";

#[inline(always)]
/// Compressed instructions can be identified by checking that the
/// last two bits in the instruction are not `0b11`
pub fn is_compressed(bits: u16) -> bool {
    (bits & 0b11) != 0b11
}

/// Decode a 16-bit compressed RISC-V instruction located at `address`
///
/// Returns `None` when the word does not match any recognized encoding or the
/// target has no C extension.
pub fn decode_compressed_instruction(
    bits: u16,
    address: u64,
    target: &Target,
) -> Option<DecodedInstruction> {
    if !target.compressed_enabled() {
        trace!("compressed word {bits:#06x} at {address:#x} on a target without C");
        return None;
    }

    // Handle special case: all zeros = compressed illegal
    if bits == 0 {
        return Some(simple(ILLEGAL));
    }

    // Parse instruction fields
    let encoded = EncodedInstruction::new(bits);

    // Decode based on quadrant (bits [1:0])
    let decoded = match encoded.quadrant {
        0 => decode_quadrant_0(&encoded, target),
        1 => decode_quadrant_1(&encoded, address, target),
        2 => decode_quadrant_2(&encoded, target),
        // 32-bit instruction
        _ => None,
    };

    if decoded.is_none() {
        trace!(
            "no compressed decoding for {bits:#06x} at {address:#x} (quadrant {}, funct3 {:#05b})",
            encoded.quadrant,
            encoded.funct3
        );
    }
    decoded
}

/// Encoded compressed instruction with extracted fields
///
/// Every field is computed eagerly from the raw word; the decoder picks the ones
/// that are meaningful for the matched format.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EncodedInstruction {
    quadrant: u8,
    funct3: u8,
    /// bit[12], selects between sub-forms in quadrant 2
    funct1: u8,
    /// rd/rs1 (bits[11:7])
    rd: u8,
    /// rs2 (bits[6:2])
    rs2: u8,
    /// Compressed register rd'/rs2' (bits[4:2])
    rd_prime: u8,
    /// Compressed register rs1' (bits[9:7])
    rs1_prime: u8,
    /// CI shift amount (6-bit): shamt[4:0] = bits[6:2], shamt[5] = bit[12]
    shamt6: u32,
    /// CI-format sign-extended immediate used by c.addi, c.addiw and c.li
    ci_imm: i64,
    /// CIW-format scaled immediate of c.addi4spn
    ciw_imm: u32,
    /// CL/CS-format word offset (c.lw, c.sw)
    uimm_word: u32,
    /// CL/CS-format doubleword offset (c.ld, c.sd)
    uimm_double: u32,
    /// CI-format immediate of c.addi16sp
    addi16sp_imm: i64,
    /// CI-format immediate of c.lui
    lui_imm: i64,
    /// CI-format LWSP offset
    uimm_lwsp: u32,
    /// CI-format LDSP offset
    uimm_ldsp: u32,
    /// CSS-format SWSP offset
    uimm_swsp: u32,
    /// CSS-format SDSP offset
    uimm_sdsp: u32,
    /// CJ-format signed jump offset
    cj_offset: i64,
    /// CB-format signed branch offset
    cb_offset: i64,
}

impl EncodedInstruction {
    /// Parse all possible fields from a 16-bit compressed instruction
    pub fn new(raw: u16) -> Self {
        /*
        Note: Compressed instructions use different register encoding:
        - rd/rs1/rs2 (5-bit): Full register x0-x31
        - rd'/rs1'/rs2' (3-bit): Compressed registers x8-x15

        CR-type | funct4 |   rd/rs1   |   rs2    | op |
                | 15-12  |    11-7    |   6-2    | 1-0|
        ------------------------------------------------

        CI-type | funct3 | imm |   rd/rs1   | imm | op |
                | 15-13  | 12  |    11-7    | 6-2 | 1-0|
        ------------------------------------------------

        CSS-type| funct3 |     imm     |   rs2    | op |
                | 15-13  |    12-7     |   6-2    | 1-0|
        ------------------------------------------------

        CIW-type| funct3 |     imm      | rd' | op |
                | 15-13  |     12-5     | 4-2 | 1-0|
        ------------------------------------------

        CL-type | funct3 | imm | rs1' | imm | rd' | op |
                | 15-13  |12-10| 9-7  | 6-5 | 4-2 | 1-0|
        ------------------------------------------------

        CS-type | funct3 | imm | rs1' | imm | rs2'| op |
                | 15-13  |12-10| 9-7  | 6-5 | 4-2 | 1-0|
        ------------------------------------------------

        CB-type | funct3 | off | rs1' |    offset    | op |
                | 15-13  | 12  | 9-7  |   6-2        | 1-0|
        ------------------------------------------------

        CJ-type | funct3 |        jump target        | op |
                | 15-13  |         12-2              | 1-0|
        ------------------------------------------------
        */
        let x = raw as u32;

        Self {
            quadrant: bits(x, 1, 0) as u8,
            funct3: bits(x, 15, 13) as u8,
            funct1: bit(x, 12) as u8,
            rd: bits(x, 11, 7) as u8,
            rs2: bits(x, 6, 2) as u8,
            rd_prime: bits(x, 4, 2) as u8,
            rs1_prime: bits(x, 9, 7) as u8,
            shamt6: (bit(x, 12) << 5) | bits(x, 6, 2),
            ci_imm: sign_extend((bit(x, 12) << 5) | bits(x, 6, 2), 6),
            ciw_imm: extract_ciw_immediate(x),
            uimm_word: extract_cl_word_offset(x),
            uimm_double: extract_cl_double_offset(x),
            addi16sp_imm: extract_ci16sp_immediate(x),
            lui_imm: sign_extend((bit(x, 12) << 17) | (bits(x, 6, 2) << 12), 18),
            uimm_lwsp: extract_ci_lwsp_offset(x),
            uimm_ldsp: extract_ci_ldsp_offset(x),
            uimm_swsp: extract_css_swsp_offset(x),
            uimm_sdsp: extract_css_sdsp_offset(x),
            cj_offset: extract_cj_offset(x),
            cb_offset: extract_cb_offset(x),
        }
    }
}

fn simple(mnemonic: &str) -> DecodedInstruction {
    InstructionBuilder::new(mnemonic, INSTRUCTION_LENGTH).build()
}

/// `rd', [rs1'+offset]` and `rs2', [rs1'+offset]`
fn rvc_memory(mnemonic: &str, reg: u8, base: u8, offset: u32) -> DecodedInstruction {
    InstructionBuilder::new(mnemonic, INSTRUCTION_LENGTH)
        .register(rvc_reg_name(reg))
        .separator()
        .memory(rvc_reg_name(base), offset as i64)
        .build()
}

/// `reg, [sp+offset]`
fn sp_memory(mnemonic: &str, reg: u8, offset: u32) -> DecodedInstruction {
    InstructionBuilder::new(mnemonic, INSTRUCTION_LENGTH)
        .reg(reg)
        .separator()
        .memory(reg_name(REG_SP), offset as i64)
        .build()
}

/// `rd, rd, imm`
fn ci_arith(mnemonic: &str, rd: u8, imm: i64) -> DecodedInstruction {
    InstructionBuilder::new(mnemonic, INSTRUCTION_LENGTH)
        .reg(rd)
        .separator()
        .reg(rd)
        .separator()
        .immediate(imm)
        .build()
}

/// `rd, imm`
fn ci_load_immediate(mnemonic: &str, rd: u8, imm: i64) -> DecodedInstruction {
    InstructionBuilder::new(mnemonic, INSTRUCTION_LENGTH)
        .reg(rd)
        .separator()
        .immediate(imm)
        .build()
}

/// Decode Quadrant 0 instructions (bits [1:0] = 00)
fn decode_quadrant_0(encoded: &EncodedInstruction, target: &Target) -> Option<DecodedInstruction> {
    let is_rv64 = target.is_rv64();

    match encoded.funct3 {
        0b000 => {
            // C.ADDI4SPN - Add scaled immediate to stack pointer
            Some(
                InstructionBuilder::new("c.addi4spn", INSTRUCTION_LENGTH)
                    .register(rvc_reg_name(encoded.rd_prime))
                    .separator()
                    .reg(REG_SP)
                    .separator()
                    .decimal(encoded.ciw_imm as i64)
                    .build(),
            )
        }
        0b001 => Some(simple("c.fld")),
        0b010 => Some(rvc_memory("c.lw", encoded.rd_prime, encoded.rs1_prime, encoded.uimm_word)),
        0b011 if is_rv64 => {
            Some(rvc_memory("c.ld", encoded.rd_prime, encoded.rs1_prime, encoded.uimm_double))
        }
        0b011 => Some(simple("c.flw")),
        // Reserved
        0b100 => None,
        0b101 => Some(simple("c.fsd")),
        0b110 => Some(rvc_memory("c.sw", encoded.rd_prime, encoded.rs1_prime, encoded.uimm_word)),
        0b111 if is_rv64 => {
            Some(rvc_memory("c.sd", encoded.rd_prime, encoded.rs1_prime, encoded.uimm_double))
        }
        _ => Some(simple("c.fsw")),
    }
}

/// Decode Quadrant 1 instructions (bits [1:0] = 01)
fn decode_quadrant_1(
    encoded: &EncodedInstruction,
    address: u64,
    target: &Target,
) -> Option<DecodedInstruction> {
    let rd = encoded.rd;

    match encoded.funct3 {
        0b000 => {
            // C.NOP or C.ADDI
            if rd == REG_ZERO {
                Some(simple("c.nop"))
            } else {
                Some(ci_arith("c.addi", rd, encoded.ci_imm))
            }
        }
        0b001 => {
            if target.is_rv64() {
                // C.ADDIW
                (rd != REG_ZERO).then(|| ci_arith("c.addiw", rd, encoded.ci_imm))
            } else {
                // C.JAL (RV32 only)
                let destination = offset_address(address, encoded.cj_offset);
                Some(
                    InstructionBuilder::new("c.jal", INSTRUCTION_LENGTH)
                        .address(destination)
                        .branch(BranchKind::Call, Some(destination))
                        .build(),
                )
            }
        }
        0b010 => {
            // C.LI - Load immediate
            (rd != REG_ZERO).then(|| ci_load_immediate("c.li", rd, encoded.ci_imm))
        }
        0b011 => {
            // C.ADDI16SP or C.LUI
            if rd == REG_SP {
                Some(
                    InstructionBuilder::new("c.addi16sp", INSTRUCTION_LENGTH)
                        .reg(REG_SP)
                        .separator()
                        .immediate(encoded.addi16sp_imm)
                        .build(),
                )
            } else if rd != REG_ZERO {
                Some(ci_load_immediate("c.lui", rd, encoded.lui_imm))
            } else {
                None
            }
        }
        // c.srli, c.srai, c.andi, c.sub, c.xor, c.or, c.and, c.subw, c.addw
        0b100 => Some(simple(MATH_PLACEHOLDER)),
        0b101 => {
            // C.J - Jump
            let target = offset_address(address, encoded.cj_offset);
            Some(
                InstructionBuilder::new("c.j", INSTRUCTION_LENGTH)
                    .address(target)
                    .branch(BranchKind::Unconditional, Some(target))
                    .build(),
            )
        }
        // C.BEQZ / C.BNEZ
        0b110 => Some(decode_branch("c.beqz", encoded, address)),
        _ => Some(decode_branch("c.bnez", encoded, address)),
    }
}

/// `rs1', target` with the taken edge followed by the fall-through edge
fn decode_branch(mnemonic: &str, encoded: &EncodedInstruction, address: u64) -> DecodedInstruction {
    let target = offset_address(address, encoded.cb_offset);
    let fall_through = offset_address(address, INSTRUCTION_LENGTH as i64);

    InstructionBuilder::new(mnemonic, INSTRUCTION_LENGTH)
        .register(rvc_reg_name(encoded.rs1_prime))
        .separator()
        .address(target)
        .branch(BranchKind::TrueBranch, Some(target))
        .branch(BranchKind::FalseBranch, Some(fall_through))
        .build()
}

/// Decode Quadrant 2 instructions (bits [1:0] = 10)
fn decode_quadrant_2(encoded: &EncodedInstruction, target: &Target) -> Option<DecodedInstruction> {
    let is_rv64 = target.is_rv64();
    let rd = encoded.rd;

    match encoded.funct3 {
        0b000 => {
            // C.SLLI - Shift left logical immediate
            (rd != REG_ZERO).then(|| ci_arith("c.slli", rd, encoded.shamt6 as i64))
        }
        0b001 => Some(simple("c.fldsp")),
        0b010 => {
            // C.LWSP - Load word from stack pointer
            (rd != REG_ZERO).then(|| sp_memory("c.lwsp", rd, encoded.uimm_lwsp))
        }
        0b011 if is_rv64 => {
            // C.LDSP - Load doubleword from stack pointer
            (rd != REG_ZERO).then(|| sp_memory("c.ldsp", rd, encoded.uimm_ldsp))
        }
        0b011 => Some(simple("c.flwsp")),
        0b100 => decode_quadrant_2_misc(encoded),
        0b101 => Some(simple("c.fsdsp")),
        // C.SWSP - Store word to stack pointer
        0b110 => Some(sp_memory("c.swsp", encoded.rs2, encoded.uimm_swsp)),
        // C.SDSP - Store doubleword to stack pointer
        0b111 if is_rv64 => Some(sp_memory("c.sdsp", encoded.rs2, encoded.uimm_sdsp)),
        _ => Some(simple("c.fswsp")),
    }
}

/// Decode Quadrant 2 miscellaneous instructions (funct3 = 100)
///
/// | bit 12 | rd  | rs2 | instruction          |
/// |--------|-----|-----|----------------------|
/// | 0      | 0   | -   | reserved             |
/// | 0      | !=0 | 0   | c.jr (c.ret for ra)  |
/// | 0      | !=0 | !=0 | c.mv                 |
/// | 1      | 0   | 0   | c.ebreak             |
/// | 1      | -   | 0   | c.jalr               |
/// | 1      | -   | !=0 | c.add                |
fn decode_quadrant_2_misc(encoded: &EncodedInstruction) -> Option<DecodedInstruction> {
    let rd = encoded.rd;
    let rs2 = encoded.rs2;

    if encoded.funct1 == 0 {
        if rd == REG_ZERO {
            return None;
        }
        if rs2 != REG_ZERO {
            // C.MV
            return Some(
                InstructionBuilder::new("c.mv", INSTRUCTION_LENGTH)
                    .reg(rd)
                    .separator()
                    .reg(rs2)
                    .build(),
            );
        }
        // C.JR: only a jump through ra is known to be a return
        if rd == REG_RA {
            return Some(
                InstructionBuilder::new("c.ret", INSTRUCTION_LENGTH)
                    .branch(BranchKind::Return, None)
                    .build(),
            );
        }
        Some(
            InstructionBuilder::new("c.jr", INSTRUCTION_LENGTH)
                .reg(rd)
                .branch(BranchKind::Unresolved, None)
                .build(),
        )
    } else if rs2 == REG_ZERO {
        if rd == REG_ZERO {
            return Some(simple("c.ebreak"));
        }
        // C.JALR: jump through a register, destination unknown
        Some(
            InstructionBuilder::new("c.jalr", INSTRUCTION_LENGTH)
                .reg(rd)
                .branch(BranchKind::Unresolved, None)
                .build(),
        )
    } else {
        // C.ADD
        Some(
            InstructionBuilder::new("c.add", INSTRUCTION_LENGTH)
                .reg(rd)
                .separator()
                .reg(rd)
                .separator()
                .reg(rs2)
                .build(),
        )
    }
}

// Immediate extraction functions

/// Extract CIW-format immediate for C.ADDI4SPN
/// The immediate represents nzuimm[9:2], so bits [1:0] are always 0
fn extract_ciw_immediate(x: u32) -> u32 {
    (bits(x, 10, 7) << 6) // bits[10:7] -> imm[9:6]
        | (bits(x, 12, 11) << 4) // bits[12:11] -> imm[5:4]
        | (bit(x, 5) << 3) // bit[5] -> imm[3]
        | (bit(x, 6) << 2) // bit[6] -> imm[2]
}

/// Extract CL/CS-format offset for C.LW and C.SW
fn extract_cl_word_offset(x: u32) -> u32 {
    (bit(x, 5) << 6) // bit[5] -> offset[6]
        | (bits(x, 12, 10) << 3) // bits[12:10] -> offset[5:3]
        | (bit(x, 6) << 2) // bit[6] -> offset[2]
}

/// Extract CL/CS-format offset for C.LD and C.SD
fn extract_cl_double_offset(x: u32) -> u32 {
    (bits(x, 6, 5) << 6) // bits[6:5] -> offset[7:6]
        | (bits(x, 12, 10) << 3) // bits[12:10] -> offset[5:3]
}

/// Extract CI-format immediate for C.ADDI16SP (10-bit, sign-extended)
fn extract_ci16sp_immediate(x: u32) -> i64 {
    let imm = (bit(x, 12) << 9) // bit[12] -> imm[9]
        | (bits(x, 4, 3) << 7) // bits[4:3] -> imm[8:7]
        | (bit(x, 5) << 6) // bit[5] -> imm[6]
        | (bit(x, 2) << 5) // bit[2] -> imm[5]
        | (bit(x, 6) << 4); // bit[6] -> imm[4]
    sign_extend(imm, 10)
}

/// Extract CJ-format offset (12-bit, sign-extended)
fn extract_cj_offset(x: u32) -> i64 {
    let offset = (bit(x, 12) << 11) // bit[12] -> offset[11]
        | (bit(x, 8) << 10) // bit[8] -> offset[10]
        | (bits(x, 10, 9) << 8) // bits[10:9] -> offset[9:8]
        | (bit(x, 6) << 7) // bit[6] -> offset[7]
        | (bit(x, 7) << 6) // bit[7] -> offset[6]
        | (bit(x, 2) << 5) // bit[2] -> offset[5]
        | (bit(x, 11) << 4) // bit[11] -> offset[4]
        | (bits(x, 5, 3) << 1); // bits[5:3] -> offset[3:1]
    sign_extend(offset, 12)
}

/// Extract CB-format offset (9-bit, sign-extended)
fn extract_cb_offset(x: u32) -> i64 {
    let offset = (bit(x, 12) << 8) // bit[12] -> offset[8]
        | (bits(x, 6, 5) << 6) // bits[6:5] -> offset[7:6]
        | (bit(x, 2) << 5) // bit[2] -> offset[5]
        | (bits(x, 11, 10) << 3) // bits[11:10] -> offset[4:3]
        | (bits(x, 4, 3) << 1); // bits[4:3] -> offset[2:1]
    sign_extend(offset, 9)
}

/// Extract CI-format offset for C.LWSP
fn extract_ci_lwsp_offset(x: u32) -> u32 {
    (bits(x, 3, 2) << 6) // bits[3:2] -> offset[7:6]
        | (bit(x, 12) << 5) // bit[12] -> offset[5]
        | (bits(x, 6, 4) << 2) // bits[6:4] -> offset[4:2]
}

/// Extract CI-format offset for C.LDSP
fn extract_ci_ldsp_offset(x: u32) -> u32 {
    (bits(x, 4, 2) << 6) // bits[4:2] -> offset[8:6]
        | (bit(x, 12) << 5) // bit[12] -> offset[5]
        | (bits(x, 6, 5) << 3) // bits[6:5] -> offset[4:3]
}

/// Extract CSS-format offset for C.SWSP
fn extract_css_swsp_offset(x: u32) -> u32 {
    (bits(x, 8, 7) << 6) // bits[8:7] -> offset[7:6]
        | (bits(x, 12, 9) << 2) // bits[12:9] -> offset[5:2]
}

/// Extract CSS-format offset for C.SDSP
fn extract_css_sdsp_offset(x: u32) -> u32 {
    (bits(x, 9, 7) << 6) // bits[9:7] -> offset[8:6]
        | (bits(x, 12, 10) << 3) // bits[12:10] -> offset[5:3]
}
