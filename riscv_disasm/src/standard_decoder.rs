//! Standard (32-bit uncompressed) RISC-V instruction decoder
//!
//! The public API of this module is [`decode_standard_instruction`].
//!
//! Decoding is a two level match: first on the 5-bit opcode group (bits [6:2]),
//! then on `(funct3, funct7)`. Loads, stores and OP-IMM keep a recognized
//! opcode group even when `funct3` is unassigned and report it through a
//! `group?funct3` mnemonic instead of failing.
mod opcode;

pub use opcode::Opcode;

use tracing::trace;

use crate::{
    bits::{bit, bits, sign_extend},
    instruction::{offset_address, BranchKind, DecodedInstruction, InstructionBuilder},
    registers::{reg_name, REG_RA, REG_ZERO},
    target::{Extension, Target},
};

/// Size in bytes of every standard instruction
pub const INSTRUCTION_LENGTH: usize = 4;

/// Decode a 32-bit standard RISC-V instruction located at `address`
///
/// Returns `None` when the word does not match any recognized encoding.
pub fn decode_standard_instruction(
    bits: u32,
    address: u64,
    target: &Target,
) -> Option<DecodedInstruction> {
    // Parse all instruction fields
    let encoded = EncodedInstruction::new(bits);

    // Decode based on opcode enum
    let decoded = match encoded.opcode {
        Some(Opcode::Load) => Some(decode_load_instruction(&encoded, target)),
        Some(Opcode::MiscMem) => decode_fence_instruction(&encoded, target),
        Some(Opcode::OpImm) => Some(decode_op_imm_instruction(&encoded)),
        Some(Opcode::Auipc) => Some(decode_auipc_instruction(&encoded, address)),
        Some(Opcode::OpImm32) => decode_op_imm_32_instruction(&encoded, target),
        Some(Opcode::Store) => Some(decode_store_instruction(&encoded, target)),
        Some(Opcode::Op) => decode_op_instruction(&encoded, target),
        Some(Opcode::Lui) => Some(decode_lui_instruction(&encoded)),
        Some(Opcode::Op32) => decode_op_32_instruction(&encoded, target),
        Some(Opcode::Branch) => decode_branch_instruction(&encoded, address),
        Some(Opcode::Jalr) => Some(decode_jalr_instruction(&encoded, address)),
        Some(Opcode::Jal) => Some(decode_jal_instruction(&encoded, address)),
        Some(Opcode::System) => decode_system_instruction(&encoded, target),

        None => None,
    };

    if decoded.is_none() {
        trace!(
            "no decoding for {:#010x} at {address:#x} (group {:#07b}, f3 {:#05b}, f7 {:#09b})",
            encoded.raw,
            encoded.opcode_group,
            encoded.funct3,
            encoded.funct7
        );
    }
    decoded
}

/// Parsed fields from a 32-bit RISC-V instruction
///
/// This can be seen as a union of all of the formats, and then the decoder
/// picks the relevant fields based on the opcode. Every field is a pure function
/// of `raw`, so construction is total over all 2^32 words.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EncodedInstruction {
    /// Raw 32-bit instruction word
    pub raw: u32,

    /// Opcode group (bits [6:2]) as raw value
    pub opcode_group: u8,

    /// Opcode group as enum (if recognized)
    pub opcode: Option<Opcode>,

    /// Destination register (bits [11:7])
    pub rd: u8,

    /// Function code 3 (bits [14:12])
    pub funct3: u8,

    /// Source register 1 (bits [19:15])
    pub rs1: u8,

    /// Source register 2 (bits [24:20]), also the 5-bit shift amount
    pub rs2: u8,

    /// Function code 7 (bits [31:25])
    pub funct7: u8,

    /// Raw I-type immediate (bits [31:20]), also the CSR address
    pub imm_i: u32,

    /// I-type immediate (sign-extended)
    pub i_immediate: i64,

    /// S-type immediate (split across bits [31:25] and [11:7], sign-extended)
    pub s_immediate: i64,

    /// B-type immediate (branch offset, sign-extended)
    pub b_immediate: i64,

    /// U-type immediate (bits [31:12] kept in place, not sign-extended)
    pub u_immediate: i64,

    /// J-type immediate (jump offset, sign-extended)
    pub j_immediate: i64,
}

impl EncodedInstruction {
    /// Parse all possible fields from a 32-bit instruction
    pub fn new(raw: u32) -> Self {
        /*
        R-type | funct7 |  rs2 |  rs1 | funct3 |   rd  | opcode |
               | 31-25  |24-20 |19-15 | 14-12  | 11-7  | 6-0    |
        --------------------------------------------------------

        I-type |   imm[11:0]    |  rs1 | funct3 |   rd  | opcode |
               |   31-20        |19-15 | 14-12  | 11-7  | 6-0    |
        --------------------------------------------------------

        S-type | imm[11:5] |  rs2 |  rs1 | funct3 | imm[4:0] | opcode |
               | 31-25     |24-20 |19-15 | 14-12  | 11-7     | 6-0    |
        --------------------------------------------------------------

        B-type | imm[12] | imm[10:5] |  rs2 |  rs1 | funct3 | imm[4:1|11] | opcode |
               |   31    | 30-25     |24-20 |19-15 | 14-12  | 11-7        | 6-0    |
        ---------------------------------------------------------------------------

        U-type |                imm[31:12]                 |   rd  | opcode |
               |                31-12                      | 11-7  | 6-0    |
        --------------------------------------------------------------------

        J-type | imm[20] | imm[10:1] | imm[11] | imm[19:12] |   rd  | opcode |
               |   31    | 30-21     |   20    | 19-12      | 11-7  | 6-0    |
        --------------------------------------------------------------------
        */
        let opcode_group = bits(raw, 6, 2) as u8;
        let imm_i = bits(raw, 31, 20);

        Self {
            raw,
            opcode_group,
            opcode: Opcode::from_bits(opcode_group),
            rd: bits(raw, 11, 7) as u8,
            funct3: bits(raw, 14, 12) as u8,
            rs1: bits(raw, 19, 15) as u8,
            rs2: bits(raw, 24, 20) as u8,
            funct7: bits(raw, 31, 25) as u8,
            imm_i,
            i_immediate: sign_extend(imm_i, 12),
            s_immediate: Self::extract_s_immediate(raw),
            b_immediate: Self::extract_b_immediate(raw),
            u_immediate: Self::extract_u_immediate(raw),
            j_immediate: Self::extract_j_immediate(raw),
        }
    }

    /// Extract S-type immediate (12-bit split, sign-extended)
    fn extract_s_immediate(raw: u32) -> i64 {
        let imm = (bits(raw, 31, 25) << 5) | bits(raw, 11, 7);
        sign_extend(imm, 12)
    }

    /// Extract B-type immediate (13-bit branch offset, sign-extended)
    fn extract_b_immediate(raw: u32) -> i64 {
        let imm = (bit(raw, 31) << 12)
            | (bit(raw, 7) << 11)
            | (bits(raw, 30, 25) << 5)
            | (bits(raw, 11, 8) << 1);
        sign_extend(imm, 13)
    }

    /// Extract U-type immediate (bits [31:12] in place)
    fn extract_u_immediate(raw: u32) -> i64 {
        (bits(raw, 31, 12) << 12) as i64
    }

    /// Extract J-type immediate (21-bit jump offset, sign-extended)
    fn extract_j_immediate(raw: u32) -> i64 {
        let imm = (bit(raw, 31) << 20)
            | (bits(raw, 19, 12) << 12)
            | (bit(raw, 20) << 11)
            | (bits(raw, 30, 21) << 1);
        sign_extend(imm, 21)
    }
}

/// `rd, [rs1+imm]`
fn load_instr(mnemonic: impl Into<String>, encoded: &EncodedInstruction) -> DecodedInstruction {
    InstructionBuilder::new(mnemonic, INSTRUCTION_LENGTH)
        .reg(encoded.rd)
        .separator()
        .memory(reg_name(encoded.rs1), encoded.i_immediate)
        .build()
}

/// `rs2, [rs1+imm]`
fn store_instr(mnemonic: impl Into<String>, encoded: &EncodedInstruction) -> DecodedInstruction {
    InstructionBuilder::new(mnemonic, INSTRUCTION_LENGTH)
        .reg(encoded.rs2)
        .separator()
        .memory(reg_name(encoded.rs1), encoded.s_immediate)
        .build()
}

/// `rd, rs1, imm`
fn itype_instr(mnemonic: impl Into<String>, encoded: &EncodedInstruction) -> DecodedInstruction {
    InstructionBuilder::new(mnemonic, INSTRUCTION_LENGTH)
        .reg(encoded.rd)
        .separator()
        .reg(encoded.rs1)
        .separator()
        .immediate(encoded.i_immediate)
        .build()
}

/// `rd, rs1, shamt` where `shamt` is the raw rs2 field
fn itype_shift_instr(mnemonic: &str, encoded: &EncodedInstruction) -> DecodedInstruction {
    InstructionBuilder::new(mnemonic, INSTRUCTION_LENGTH)
        .reg(encoded.rd)
        .separator()
        .reg(encoded.rs1)
        .separator()
        .immediate(encoded.rs2 as i64)
        .build()
}

/// `rd, rs1, rs2`
fn rtype_instr(mnemonic: &str, encoded: &EncodedInstruction) -> DecodedInstruction {
    InstructionBuilder::new(mnemonic, INSTRUCTION_LENGTH)
        .reg(encoded.rd)
        .separator()
        .reg(encoded.rs1)
        .separator()
        .reg(encoded.rs2)
        .build()
}

fn simple(mnemonic: &str) -> DecodedInstruction {
    InstructionBuilder::new(mnemonic, INSTRUCTION_LENGTH).build()
}

/// Decode LOAD instructions
///
/// Unassigned `funct3` values (and the RV64-only ones on RV32) decode as `load?N`.
fn decode_load_instruction(encoded: &EncodedInstruction, target: &Target) -> DecodedInstruction {
    let is_rv64 = target.is_rv64();

    match encoded.funct3 {
        0b000 => load_instr("lb", encoded),
        0b001 => load_instr("lh", encoded),
        0b010 => load_instr("lw", encoded),
        0b011 if is_rv64 => load_instr("ld", encoded),
        0b100 => load_instr("lbu", encoded),
        0b101 => load_instr("lhu", encoded),
        0b110 if is_rv64 => load_instr("lwu", encoded),
        funct3 => load_instr(format!("load?{funct3}"), encoded),
    }
}

/// Decode STORE instructions
///
/// Unassigned `funct3` values decode as `store?N`.
fn decode_store_instruction(encoded: &EncodedInstruction, target: &Target) -> DecodedInstruction {
    let is_rv64 = target.is_rv64();

    match encoded.funct3 {
        0b000 => store_instr("sb", encoded),
        0b001 => store_instr("sh", encoded),
        0b010 => store_instr("sw", encoded),
        0b011 if is_rv64 => store_instr("sd", encoded),
        funct3 => store_instr(format!("store?{funct3}"), encoded),
    }
}

/// Decode OP-IMM instructions (addi, slti, sltiu, xori, ori, andi, slli, srli, srai)
///
/// The shift amount is the raw 5-bit rs2 field. For `funct3 == 0b101`, `funct7`
/// selects between logical (`0b000_0000`) and arithmetic (`0b010_0000`) shifts;
/// any other `funct7` falls back to `itype?5`.
fn decode_op_imm_instruction(encoded: &EncodedInstruction) -> DecodedInstruction {
    match (encoded.funct3, encoded.funct7) {
        (0b000, _) => itype_instr("addi", encoded),
        (0b001, _) => itype_shift_instr("slli", encoded),
        (0b010, _) => itype_instr("slti", encoded),
        (0b011, _) => itype_instr("sltiu", encoded),
        (0b100, _) => itype_instr("xori", encoded),
        (0b101, 0b000_0000) => itype_shift_instr("srli", encoded),
        (0b101, 0b010_0000) => itype_shift_instr("srai", encoded),
        (0b110, _) => itype_instr("ori", encoded),
        (0b111, _) => itype_instr("andi", encoded),
        (funct3, _) => itype_instr(format!("itype?{funct3}"), encoded),
    }
}

/// Decode OP-IMM-32 instructions (RV64I word immediate operations)
fn decode_op_imm_32_instruction(
    encoded: &EncodedInstruction,
    target: &Target,
) -> Option<DecodedInstruction> {
    if !target.is_rv64() {
        return None;
    }

    match (encoded.funct3, encoded.funct7) {
        (0b000, _) => Some(itype_instr("addiw", encoded)),
        (0b001, _) => Some(itype_shift_instr("slliw", encoded)),
        (0b101, 0b000_0000) => Some(itype_shift_instr("srliw", encoded)),
        (0b101, 0b010_0000) => Some(itype_shift_instr("sraiw", encoded)),
        _ => None,
    }
}

/// Decode OP instructions (register-register operations)
///
/// The M extension is selected by the low bit of `funct7`.
fn decode_op_instruction(
    encoded: &EncodedInstruction,
    target: &Target,
) -> Option<DecodedInstruction> {
    let is_m_ext = encoded.funct7 & 1 == 1;
    if is_m_ext && !target.supports_extension(Extension::M) {
        return None;
    }

    let mnemonic = match (is_m_ext, encoded.funct3, encoded.funct7) {
        // RV32M multiply/divide extension
        (true, 0b000, _) => "mul",
        (true, 0b001, _) => "mulh",
        (true, 0b010, _) => "mulhsu",
        (true, 0b011, _) => "mulhu",
        (true, 0b100, _) => "div",
        (true, 0b101, _) => "divu",
        (true, 0b110, _) => "rem",
        (true, 0b111, _) => "remu",

        // Base RV32I arithmetic
        (false, 0b000, 0b000_0000) => "add",
        (false, 0b000, 0b010_0000) => "sub",
        (false, 0b001, _) => "sll",
        (false, 0b010, _) => "slt",
        (false, 0b011, _) => "sltu",
        (false, 0b100, _) => "xor",
        (false, 0b101, 0b000_0000) => "srl",
        (false, 0b101, 0b010_0000) => "sra",
        (false, 0b110, _) => "or",
        (false, 0b111, _) => "and",

        _ => return None,
    };
    Some(rtype_instr(mnemonic, encoded))
}

/// Decode OP-32 instructions (RV64I word register operations)
fn decode_op_32_instruction(
    encoded: &EncodedInstruction,
    target: &Target,
) -> Option<DecodedInstruction> {
    if !target.is_rv64() {
        return None;
    }
    let is_m_ext = encoded.funct7 & 1 == 1;
    if is_m_ext && !target.supports_extension(Extension::M) {
        return None;
    }

    let mnemonic = match (is_m_ext, encoded.funct3, encoded.funct7) {
        // RV64M word multiply/divide extension
        (true, 0b000, _) => "mulw",
        (true, 0b100, _) => "divw",
        (true, 0b101, _) => "divuw",
        (true, 0b110, _) => "remw",
        (true, 0b111, _) => "remuw",

        // Base RV64I word operations
        (false, 0b000, 0b000_0000) => "addw",
        (false, 0b000, 0b010_0000) => "subw",
        (false, 0b001, _) => "sllw",
        (false, 0b101, 0b000_0000) => "srlw",
        (false, 0b101, 0b010_0000) => "sraw",

        _ => return None,
    };
    Some(rtype_instr(mnemonic, encoded))
}

/// Decode LUI instruction: `rd, imm` with the U-immediate used as-is
fn decode_lui_instruction(encoded: &EncodedInstruction) -> DecodedInstruction {
    InstructionBuilder::new("lui", INSTRUCTION_LENGTH)
        .reg(encoded.rd)
        .separator()
        .address(encoded.u_immediate as u64)
        .build()
}

/// Decode AUIPC instruction: `rd, address + imm`
fn decode_auipc_instruction(encoded: &EncodedInstruction, address: u64) -> DecodedInstruction {
    InstructionBuilder::new("auipc", INSTRUCTION_LENGTH)
        .reg(encoded.rd)
        .separator()
        .address(offset_address(address, encoded.u_immediate))
        .build()
}

/// Decode BRANCH instructions
///
/// Always emits the taken edge followed by the fall-through edge.
fn decode_branch_instruction(
    encoded: &EncodedInstruction,
    address: u64,
) -> Option<DecodedInstruction> {
    let mnemonic = match encoded.funct3 {
        0b000 => "beq",
        0b001 => "bne",
        0b100 => "blt",
        0b101 => "bge",
        0b110 => "bltu",
        0b111 => "bgeu",
        _ => return None,
    };
    let target = offset_address(address, encoded.b_immediate);
    let fall_through = offset_address(address, INSTRUCTION_LENGTH as i64);

    Some(
        InstructionBuilder::new(mnemonic, INSTRUCTION_LENGTH)
            .reg(encoded.rs1)
            .separator()
            .reg(encoded.rs2)
            .separator()
            .address(target)
            .branch(BranchKind::TrueBranch, Some(target))
            .branch(BranchKind::FalseBranch, Some(fall_through))
            .build(),
    )
}

/// Decode JAL instruction
///
/// `rd == zero` is a plain jump, `rd == ra` the call convention, anything else
/// is a generic link which is still classified as a call.
fn decode_jal_instruction(encoded: &EncodedInstruction, address: u64) -> DecodedInstruction {
    let target = offset_address(address, encoded.j_immediate);

    match encoded.rd {
        REG_ZERO => InstructionBuilder::new("j", INSTRUCTION_LENGTH)
            .address(target)
            .branch(BranchKind::Unconditional, Some(target)),
        REG_RA => InstructionBuilder::new("call", INSTRUCTION_LENGTH)
            .address(target)
            .branch(BranchKind::Call, Some(target)),
        rd => InstructionBuilder::new("jal", INSTRUCTION_LENGTH)
            .reg(rd)
            .separator()
            .address(target)
            .branch(BranchKind::Call, Some(target)),
    }
    .build()
}

/// Decode JALR instruction
///
/// The base register value is unknown while decoding, so the reported target is
/// `address + offset`, a display approximation rather than the real destination.
fn decode_jalr_instruction(encoded: &EncodedInstruction, address: u64) -> DecodedInstruction {
    let target = offset_address(address, encoded.i_immediate);

    let (builder, kind) = match encoded.rd {
        REG_ZERO => (InstructionBuilder::new("jr", INSTRUCTION_LENGTH), BranchKind::Return),
        REG_RA => (InstructionBuilder::new("call", INSTRUCTION_LENGTH), BranchKind::Call),
        rd => (
            InstructionBuilder::new("jalr", INSTRUCTION_LENGTH).reg(rd).separator(),
            BranchKind::Call,
        ),
    };
    builder.reg(encoded.rs1).text("+").address(target).branch(kind, Some(target)).build()
}

/// Decode FENCE instructions
fn decode_fence_instruction(
    encoded: &EncodedInstruction,
    target: &Target,
) -> Option<DecodedInstruction> {
    match encoded.funct3 {
        0b000 => Some(simple("fence")),
        0b001 if target.supports_extension(Extension::Zifencei) => Some(simple("fence.i")),
        _ => None,
    }
}

/// Decode SYSTEM instructions
///
/// `funct3 == 0` holds ecall/ebreak and the privileged no-operand instructions,
/// every other `funct3` except `0b100` is a CSR read-modify-write.
fn decode_system_instruction(
    encoded: &EncodedInstruction,
    target: &Target,
) -> Option<DecodedInstruction> {
    match encoded.funct3 {
        0b000 => decode_privileged_instruction(encoded),
        0b001 | 0b010 | 0b011 | 0b101 | 0b110 | 0b111 => {
            // CSR instructions require Zicsr
            if !target.supports_extension(Extension::Zicsr) {
                return None;
            }
            let csr = encoded.imm_i;
            let builder = match encoded.funct3 {
                0b001 => InstructionBuilder::new("csrrw", INSTRUCTION_LENGTH).reg(encoded.rd),
                0b010 => InstructionBuilder::new("csrrs", INSTRUCTION_LENGTH).reg(encoded.rd),
                0b011 => InstructionBuilder::new("csrrc", INSTRUCTION_LENGTH).reg(encoded.rd),
                0b101 => InstructionBuilder::new("csrrwi", INSTRUCTION_LENGTH).reg(encoded.rd),
                0b110 => InstructionBuilder::new("csrrsi", INSTRUCTION_LENGTH).reg(encoded.rd),
                _ => InstructionBuilder::new("csrrci", INSTRUCTION_LENGTH).reg(encoded.rd),
            };
            // For CSR immediate instructions, the rs1 field contains the immediate
            let builder = if encoded.funct3 & 0b100 == 0 {
                builder.separator().reg(encoded.rs1)
            } else {
                builder.separator().decimal(sign_extend(encoded.rs1 as u32, 5))
            };
            Some(builder.separator().labelled(format!("csr_{csr}"), csr as i64).build())
        }
        _ => None,
    }
}

/// ecall, ebreak and the privileged instructions sharing `funct3 == 0`
fn decode_privileged_instruction(encoded: &EncodedInstruction) -> Option<DecodedInstruction> {
    match encoded.imm_i {
        0 => return Some(simple("ecall")),
        1 => return Some(simple("ebreak")),
        _ => {}
    }

    let mnemonic = match (encoded.funct7, encoded.rs2) {
        (0b000_0000, 0b00010) => "uret",
        (0b000_1000, 0b00010) => "sret",
        (0b000_1000, 0b00101) => "wfi",
        (0b001_1000, 0b00010) => "mret",
        (0b000_1001, _) => "sfence.vma",
        _ => return None,
    };
    Some(simple(mnemonic))
}
