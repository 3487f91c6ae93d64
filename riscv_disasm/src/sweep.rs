//! Linear sweep disassembly over a byte buffer
//!
//! Every position of the buffer is covered by exactly one [`Disassembled`] unit.
//! Words without a decoding are reported as [`Disassembled::Unknown`] and the
//! sweep moves forward by [`DEFAULT_INSTRUCTION_LENGTH`] bytes, so it always
//! makes progress and never fails.
use std::iter::FusedIterator;

use tracing::debug;

use crate::{
    arch::DEFAULT_INSTRUCTION_LENGTH, instruction::DecodedInstruction, InstructionDecoder,
    RawWord,
};

/// Text shown for bytes without a decoding
pub const UNKNOWN_TEXT: &str = "unk";

/// One unit produced by a [`Sweep`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Disassembled {
    Instruction { address: u64, instruction: DecodedInstruction },
    /// Opaque bytes, at most [`DEFAULT_INSTRUCTION_LENGTH`] long
    Unknown { address: u64, length: usize },
}

impl Disassembled {
    pub fn address(&self) -> u64 {
        match self {
            Disassembled::Instruction { address, .. } | Disassembled::Unknown { address, .. } => {
                *address
            }
        }
    }

    /// Number of bytes covered by this unit
    pub fn length(&self) -> usize {
        match self {
            Disassembled::Instruction { instruction, .. } => instruction.length,
            Disassembled::Unknown { length, .. } => *length,
        }
    }

    pub fn instruction(&self) -> Option<&DecodedInstruction> {
        match self {
            Disassembled::Instruction { instruction, .. } => Some(instruction),
            Disassembled::Unknown { .. } => None,
        }
    }

    /// Rendered text, `unk` for opaque bytes
    pub fn text(&self) -> String {
        match self {
            Disassembled::Instruction { instruction, .. } => instruction.to_string(),
            Disassembled::Unknown { .. } => UNKNOWN_TEXT.to_string(),
        }
    }
}

/// Iterator returned by [`InstructionDecoder::sweep`]
#[derive(Debug, Clone)]
pub struct Sweep<'a> {
    decoder: InstructionDecoder,
    bytes: &'a [u8],
    base: u64,
    offset: usize,
}

impl<'a> Sweep<'a> {
    pub fn new(decoder: InstructionDecoder, bytes: &'a [u8], base: u64) -> Self {
        Self { decoder, bytes, base, offset: 0 }
    }

    /// Address of the next unit
    pub fn address(&self) -> u64 {
        self.base.wrapping_add(self.offset as u64)
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> &'a [u8] {
        self.bytes.get(self.offset..).unwrap_or_default()
    }
}

impl Iterator for Sweep<'_> {
    type Item = Disassembled;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.remaining();
        if remaining.is_empty() {
            return None;
        }

        let address = self.address();
        let opaque_length = DEFAULT_INSTRUCTION_LENGTH.min(remaining.len());

        let unit = match RawWord::fetch(remaining) {
            Some(word) => match self.decoder.decode_word(word, address) {
                Some(instruction) => Disassembled::Instruction { address, instruction },
                None => {
                    debug!(
                        "no decoding for {:#x} at {address:#x}, skipping {opaque_length} bytes",
                        word.raw()
                    );
                    Disassembled::Unknown { address, length: opaque_length }
                }
            },
            None => {
                debug!("truncated instruction at {address:#x}: {} byte(s) left", remaining.len());
                Disassembled::Unknown { address, length: opaque_length }
            }
        };

        self.offset += unit.length();
        Some(unit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining().len();
        (remaining.div_ceil(4), Some(remaining.div_ceil(2)))
    }
}

impl FusedIterator for Sweep<'_> {}
