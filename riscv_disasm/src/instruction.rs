//! Decoded instruction representation
//!
//! Both decoders produce a [`DecodedInstruction`] through [`InstructionBuilder`].
//! The operand list is a flat sequence of [`Token`]s that a renderer can print
//! verbatim, while numeric tokens also carry their value for analysis passes.
use std::fmt;

use crate::registers::reg_name;

/// Kind of an operand token
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    /// Register name
    Register,
    /// Integer immediate
    Immediate,
    /// Opening marker of a memory operand (`[`)
    BeginMemory,
    /// Closing marker of a memory operand (`]`)
    EndMemory,
    /// Absolute address, e.g. a branch or call target
    Address,
    /// Operand separator (`, `)
    Separator,
    /// Plain text
    Text,
}

/// A single operand token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    /// Display text
    pub text: String,
    /// Numeric value for immediates, addresses and CSR ids
    pub value: Option<i64>,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, value: Option<i64>) -> Self {
        Self { kind, text: text.into(), value }
    }
}

/// Control-flow classification of a branch edge
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BranchKind {
    Unconditional,
    Call,
    Return,
    /// Taken side of a conditional branch
    TrueBranch,
    /// Fall-through side of a conditional branch
    FalseBranch,
    /// Indirect transfer whose destination is not known at decode time
    Unresolved,
}

/// An outgoing control-flow edge
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BranchEdge {
    pub kind: BranchKind,
    /// Destination address, `None` when it cannot be computed statically
    pub target: Option<u64>,
}

/// Result of decoding a single instruction
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodedInstruction {
    /// Mnemonic, e.g. `addi` or `c.lw`
    ///
    /// Partially decoded encodings embed the unrecognized sub-opcode, e.g. `store?7`.
    pub mnemonic: String,
    /// Operand tokens in rendering order
    pub operands: Vec<Token>,
    /// Number of bytes consumed: 2 for compressed, 4 for standard instructions
    pub length: usize,
    /// Outgoing control-flow edges
    pub branches: Vec<BranchEdge>,
}

impl DecodedInstruction {
    /// Returns true if the instruction came from the 16-bit encoding space
    pub fn is_compressed(&self) -> bool {
        self.length == 2
    }

    /// Returns true if this instruction transfers control
    pub fn is_branch(&self) -> bool {
        !self.branches.is_empty()
    }

    /// Returns true if any edge is a call
    pub fn is_call(&self) -> bool {
        self.branches.iter().any(|edge| edge.kind == BranchKind::Call)
    }

    /// Returns true if any edge is a function return
    pub fn is_return(&self) -> bool {
        self.branches.iter().any(|edge| edge.kind == BranchKind::Return)
    }

    /// Register names referenced by the operands, in order of appearance
    pub fn registers(&self) -> impl Iterator<Item = &str> + '_ {
        self.operands
            .iter()
            .filter(|token| token.kind == TokenKind::Register)
            .map(|token| token.text.as_str())
    }

    /// Values of the immediate operands, in order of appearance
    pub fn immediates(&self) -> impl Iterator<Item = i64> + '_ {
        self.operands
            .iter()
            .filter(|token| token.kind == TokenKind::Immediate)
            .filter_map(|token| token.value)
    }
}

impl fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mnemonic)?;
        if !self.operands.is_empty() {
            f.write_str(" ")?;
            for token in &self.operands {
                f.write_str(&token.text)?;
            }
        }
        Ok(())
    }
}

/// Render a signed value in hexadecimal with a leading `-` for negative values
pub(crate) fn hex(value: i64) -> String {
    if value < 0 {
        format!("-{:#x}", value.unsigned_abs())
    } else {
        format!("{value:#x}")
    }
}

/// Incremental constructor for [`DecodedInstruction`]
///
/// Operand helpers append tokens in call order; separators are explicit so the
/// decoders control the exact layout of each instruction family.
#[derive(Debug)]
pub struct InstructionBuilder {
    mnemonic: String,
    length: usize,
    operands: Vec<Token>,
    branches: Vec<BranchEdge>,
}

impl InstructionBuilder {
    pub fn new(mnemonic: impl Into<String>, length: usize) -> Self {
        Self { mnemonic: mnemonic.into(), length, operands: Vec::new(), branches: Vec::new() }
    }

    /// Register operand by name
    pub fn register(mut self, name: &str) -> Self {
        self.operands.push(Token::new(TokenKind::Register, name, None));
        self
    }

    /// Base register operand by 5-bit id
    pub fn reg(self, id: u8) -> Self {
        self.register(reg_name(id))
    }

    pub fn separator(mut self) -> Self {
        self.operands.push(Token::new(TokenKind::Separator, ", ", None));
        self
    }

    /// Immediate rendered in hexadecimal
    pub fn immediate(mut self, value: i64) -> Self {
        self.operands.push(Token::new(TokenKind::Immediate, hex(value), Some(value)));
        self
    }

    /// Immediate rendered in decimal
    pub fn decimal(mut self, value: i64) -> Self {
        self.operands.push(Token::new(TokenKind::Immediate, value.to_string(), Some(value)));
        self
    }

    /// `[base+offset]`
    ///
    /// The offset is tagged as a possible address so a host can resolve it
    /// against a known base value.
    pub fn memory(mut self, base: &str, offset: i64) -> Self {
        self.operands.push(Token::new(TokenKind::BeginMemory, "[", None));
        self = self.register(base).text("+");
        self.operands.push(Token::new(TokenKind::Address, hex(offset), Some(offset)));
        self.operands.push(Token::new(TokenKind::EndMemory, "]", None));
        self
    }

    /// Absolute address operand
    pub fn address(mut self, target: u64) -> Self {
        self.operands.push(Token::new(
            TokenKind::Address,
            format!("{target:#x}"),
            Some(target as i64),
        ));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.operands.push(Token::new(TokenKind::Text, text, None));
        self
    }

    /// Text operand that also carries a numeric value (used for CSR ids)
    pub fn labelled(mut self, text: String, value: i64) -> Self {
        self.operands.push(Token::new(TokenKind::Text, text, Some(value)));
        self
    }

    pub fn branch(mut self, kind: BranchKind, target: Option<u64>) -> Self {
        self.branches.push(BranchEdge { kind, target });
        self
    }

    pub fn build(self) -> DecodedInstruction {
        DecodedInstruction {
            mnemonic: self.mnemonic,
            operands: self.operands,
            length: self.length,
            branches: self.branches,
        }
    }
}

/// Add a signed displacement to an address, wrapping on overflow
#[inline]
pub(crate) fn offset_address(address: u64, offset: i64) -> u64 {
    address.wrapping_add_signed(offset)
}
