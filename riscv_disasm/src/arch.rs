//! Architecture description for disassembly hosts
//!
//! Register file, stack pointer and size constants a host needs to register the
//! architecture, and the boundary where an IL lifter plugs in. No lifter is
//! provided: [`NoLifting`] appends nothing.
use crate::{
    instruction::DecodedInstruction,
    registers::{REGISTERS, REG_SP},
    InstructionDecoder,
};

/// Width in bytes of an address and of every register
pub const ADDRESS_SIZE: usize = 8;

/// Longest encoding the decoder produces
pub const MAX_INSTRUCTION_LENGTH: usize = 4;

/// Bytes a host skips when nothing could be decoded
pub const DEFAULT_INSTRUCTION_LENGTH: usize = 2;

pub const STACK_POINTER: &str = REGISTERS[REG_SP as usize];

/// A register as exposed to a host
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegisterInfo {
    pub name: &'static str,
    pub index: usize,
    /// Size in bytes
    pub size: usize,
}

/// All 32 integer registers followed by `pc`
pub fn register_info() -> [RegisterInfo; 33] {
    std::array::from_fn(|index| RegisterInfo { name: REGISTERS[index], index, size: ADDRESS_SIZE })
}

/// Look up a register by its ABI name
pub fn register_by_name(name: &str) -> Option<RegisterInfo> {
    register_info().into_iter().find(|info| info.name == name)
}

/// Sink for the IL expressions of a host
pub trait IlBuilder {
    type Expression;

    fn append(&mut self, expression: Self::Expression);
}

/// Translates a decoded base instruction into IL expressions
///
/// `None` entries are skipped by [`lift_instruction`].
pub trait Lifter<B: IlBuilder> {
    fn lift(
        &self,
        instruction: &DecodedInstruction,
        address: u64,
        il: &mut B,
    ) -> Vec<Option<B::Expression>>;
}

/// Lifter that produces no expressions
#[derive(Debug, Default, Copy, Clone)]
pub struct NoLifting;

impl<B: IlBuilder> Lifter<B> for NoLifting {
    fn lift(&self, _: &DecodedInstruction, _: u64, _: &mut B) -> Vec<Option<B::Expression>> {
        Vec::new()
    }
}

/// Decode the instruction at `address` and hand it to `lifter`
///
/// Compressed instructions are never lifted. Returns the number of bytes
/// consumed, [`DEFAULT_INSTRUCTION_LENGTH`] when nothing could be decoded.
pub fn lift_instruction<B, L>(
    decoder: &InstructionDecoder,
    bytes: &[u8],
    address: u64,
    lifter: &L,
    il: &mut B,
) -> usize
where
    B: IlBuilder,
    L: Lifter<B>,
{
    let Some(instruction) = decoder.decode(bytes, address) else {
        return DEFAULT_INSTRUCTION_LENGTH;
    };

    if !instruction.is_compressed() {
        for expression in lifter.lift(&instruction, address, il).into_iter().flatten() {
            il.append(expression);
        }
    }

    instruction.length
}
