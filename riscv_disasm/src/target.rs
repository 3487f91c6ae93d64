//! RISC-V target configuration
//!
//! The decoder defaults to [`Target::rv64gc`], which enables every encoding the
//! decoder knows about. Narrower targets turn the corresponding encodings into
//! "no decode" results.
use std::fmt;

/// RISC-V instruction set extensions relevant to decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// RV64I - 64-bit extensions to base (`*w` forms, ld/sd/lwu)
    RV64I,
    /// M - Integer multiply/divide
    M,
    /// C - Compressed instructions
    C,
    /// Zicsr - Control and Status Register instructions
    Zicsr,
    /// Zifencei - Instruction-fetch fence
    Zifencei,
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extension::RV64I => write!(f, "RV64I (64-bit Extensions)"),
            Extension::M => write!(f, "M (Multiply/Divide)"),
            Extension::C => write!(f, "C (Compressed)"),
            Extension::Zicsr => write!(f, "Zicsr (CSR Instructions)"),
            Extension::Zifencei => write!(f, "Zifencei (Instruction Fence)"),
        }
    }
}

/// RISC-V target configuration using builder pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    /// 64-bit extension
    i64: bool,
    /// Multiply/divide extension
    m: bool,
    /// Compressed instruction extension
    c: bool,
    /// CSR extension
    zicsr: bool,
    /// Instruction fence extension
    zifencei: bool,
}

impl Target {
    /// Create a new target with just RV32I base
    pub const fn new() -> Self {
        Self { i64: false, m: false, c: false, zicsr: false, zifencei: false }
    }

    /// Enable multiply/divide extension (M)
    pub const fn with_m(mut self) -> Self {
        self.m = true;
        self
    }

    /// Enable compressed instruction extension (C)
    pub const fn with_c(mut self) -> Self {
        self.c = true;
        self
    }

    /// Enable 64-bit extension (RV64I)
    pub const fn with_64bit(mut self) -> Self {
        self.i64 = true;
        self
    }

    /// Enable CSR extension (Zicsr)
    pub const fn with_zicsr(mut self) -> Self {
        self.zicsr = true;
        self
    }

    /// Enable instruction fence extension (Zifencei)
    pub const fn with_zifencei(mut self) -> Self {
        self.zifencei = true;
        self
    }

    /// Create RV32IMC target
    pub const fn rv32imc() -> Self {
        Self::new().with_m().with_c()
    }

    /// Create RV64IMC target
    pub const fn rv64imc() -> Self {
        Self::new().with_64bit().with_m().with_c()
    }

    /// Create RV64GC target: every integer encoding the decoder recognizes
    pub const fn rv64gc() -> Self {
        Self::rv64imc().with_zicsr().with_zifencei()
    }

    /// Check if an extension is supported
    pub const fn supports_extension(&self, extension: Extension) -> bool {
        match extension {
            Extension::RV64I => self.i64,
            Extension::M => self.m,
            Extension::C => self.c,
            Extension::Zicsr => self.zicsr,
            Extension::Zifencei => self.zifencei,
        }
    }

    /// Whether the 64-bit encodings are enabled
    pub const fn is_rv64(&self) -> bool {
        self.i64
    }

    /// Whether 16-bit encodings decode at all
    pub const fn compressed_enabled(&self) -> bool {
        self.c
    }

    /// Get a string representation of the target, e.g. `RV64IMC_Zicsr_Zifencei`
    pub fn target_string(&self) -> String {
        let mut result = if self.i64 { "RV64I".to_string() } else { "RV32I".to_string() };

        if self.m {
            result.push('M');
        }
        if self.c {
            result.push('C');
        }

        let mut extensions = Vec::new();
        if self.zicsr {
            extensions.push("Zicsr");
        }
        if self.zifencei {
            extensions.push("Zifencei");
        }

        if !extensions.is_empty() {
            result.push('_');
            result.push_str(&extensions.join("_"));
        }

        result
    }

    /// Get all enabled extensions
    pub fn enabled_extensions(&self) -> Vec<Extension> {
        [Extension::RV64I, Extension::M, Extension::C, Extension::Zicsr, Extension::Zifencei]
            .into_iter()
            .filter(|ext| self.supports_extension(*ext))
            .collect()
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::rv64gc()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target_string())
    }
}
