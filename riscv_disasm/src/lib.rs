pub mod arch;
pub mod bits;
pub mod compressed_decoder;
pub mod instruction;
pub mod registers;
pub mod standard_decoder;
pub mod sweep;
pub mod target;

use crate::compressed_decoder::is_compressed;

pub use compressed_decoder::decode_compressed_instruction;
pub use instruction::{
    BranchEdge, BranchKind, DecodedInstruction, InstructionBuilder, Token, TokenKind,
};
pub use standard_decoder::decode_standard_instruction;
pub use sweep::{Disassembled, Sweep};
pub use target::{Extension, Target};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("No decoding for instruction word {raw:#x} at {address:#x}")]
    Undecodable { address: u64, raw: u32 },
    #[error("Tried to read past end of buffer at {address:#x}: {available} byte(s) left")]
    Truncated { address: u64, available: usize },
}

/// Instruction word fetched from the start of a byte buffer
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum RawWord {
    /// 16-bit compressed instruction
    Compressed(u16),
    /// 32-bit standard instruction
    Standard(u32),
}

impl RawWord {
    /// Read a little-endian word whose width is selected by the two low bits
    ///
    /// Returns `None` when `bytes` is shorter than the announced width.
    pub(crate) fn fetch(bytes: &[u8]) -> Option<Self> {
        // Read first 16-bit half
        let first_half = u16::from_le_bytes([*bytes.first()?, *bytes.get(1)?]);

        if is_compressed(first_half) {
            return Some(RawWord::Compressed(first_half));
        }

        // 32-bit instruction - need second half
        let second_half = u16::from_le_bytes([*bytes.get(2)?, *bytes.get(3)?]);
        Some(RawWord::Standard((first_half as u32) | ((second_half as u32) << 16)))
    }

    pub(crate) fn raw(self) -> u32 {
        match self {
            RawWord::Compressed(bits) => bits as u32,
            RawWord::Standard(bits) => bits,
        }
    }
}

/// High-level RISC-V instruction decoder with target configuration
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InstructionDecoder {
    target: Target,
}

impl InstructionDecoder {
    /// Create a new decoder with default RV64GC target
    pub fn new() -> Self {
        Self { target: Target::rv64gc() }
    }

    /// Create a decoder with a specific target
    pub fn with_target(target: Target) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Decode the instruction at the start of `bytes`, located at `address`
    ///
    /// Returns `None` if fewer bytes are available than the instruction needs or
    /// the word has no decoding. Callers typically treat that as an opaque unit of
    /// [`arch::DEFAULT_INSTRUCTION_LENGTH`] bytes.
    pub fn decode(&self, bytes: &[u8], address: u64) -> Option<DecodedInstruction> {
        let word = RawWord::fetch(bytes)?;
        self.decode_word(word, address)
    }

    /// Decode multiple instructions from a byte array (handles mixed 16/32-bit instructions)
    ///
    /// Unlike [`InstructionDecoder::sweep`] this stops at the first word without a
    /// decoding or at a truncated trailing instruction.
    pub fn decode_all(&self, bytes: &[u8], address: u64) -> Result<Vec<DecodedInstruction>, Error> {
        let mut instructions = Vec::with_capacity(bytes.len() / 2);
        let mut i = 0;

        while i < bytes.len() {
            let pc = address.wrapping_add(i as u64);
            let word = RawWord::fetch(&bytes[i..])
                .ok_or(Error::Truncated { address: pc, available: bytes.len() - i })?;
            let instruction = self
                .decode_word(word, pc)
                .ok_or(Error::Undecodable { address: pc, raw: word.raw() })?;

            i += instruction.length;
            instructions.push(instruction);
        }

        Ok(instructions)
    }

    /// Linear sweep over `bytes`, starting at `address`
    pub fn sweep<'a>(&self, bytes: &'a [u8], address: u64) -> Sweep<'a> {
        Sweep::new(*self, bytes, address)
    }

    pub(crate) fn decode_word(&self, word: RawWord, address: u64) -> Option<DecodedInstruction> {
        match word {
            RawWord::Compressed(bits) => decode_compressed_instruction(bits, address, &self.target),
            RawWord::Standard(bits) => decode_standard_instruction(bits, address, &self.target),
        }
    }
}

impl Default for InstructionDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode the instruction at the start of `bytes` with the default RV64GC target
pub fn decode(bytes: &[u8], address: u64) -> Option<DecodedInstruction> {
    InstructionDecoder::new().decode(bytes, address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_selects_width_from_low_bits() {
        assert_eq!(RawWord::fetch(&[0x01, 0x45]), Some(RawWord::Compressed(0x4501)));
        assert_eq!(
            RawWord::fetch(&[0x93, 0x02, 0x10, 0x00]),
            Some(RawWord::Standard(0x0010_0293))
        );
        // trailing bytes beyond the first compressed word are ignored
        assert_eq!(RawWord::fetch(&[0x01, 0x45, 0xFF]), Some(RawWord::Compressed(0x4501)));
    }

    #[test]
    fn test_fetch_short_buffers() {
        assert_eq!(RawWord::fetch(&[]), None);
        assert_eq!(RawWord::fetch(&[0x01]), None);
        assert_eq!(RawWord::fetch(&[0x93, 0x02]), None);
        assert_eq!(RawWord::fetch(&[0x93, 0x02, 0x10]), None);
    }

    #[test]
    fn test_decoder_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Copy>() {}
        assert_send_sync::<InstructionDecoder>();
        assert_eq!(InstructionDecoder::default().target(), &Target::rv64gc());
    }
}
