use riscv_disasm::{BranchEdge, BranchKind, Error, InstructionDecoder, Target, TokenKind};

#[test]
fn test_addi_end_to_end() {
    let decoder = InstructionDecoder::new();

    // ADDI x5, x0, 1 -> 0x00100293
    let bytes = vec![0x93, 0x02, 0x10, 0x00];
    let instruction = decoder.decode(&bytes, 0x1000).unwrap();

    assert_eq!(instruction.mnemonic, "addi");
    assert_eq!(instruction.length, 4);
    assert!(!instruction.is_compressed());
    assert!(instruction.branches.is_empty());
    assert_eq!(instruction.registers().collect::<Vec<_>>(), vec!["t0", "zero"]);
    assert_eq!(instruction.immediates().collect::<Vec<_>>(), vec![1]);
    assert_eq!(instruction.to_string(), "addi t0, zero, 0x1");
}

#[test]
fn test_jal_to_self() {
    // JAL x0, 0 -> 0x0000006F
    let instruction = riscv_disasm::decode(&[0x6F, 0x00, 0x00, 0x00], 0x1000).unwrap();

    assert_eq!(instruction.mnemonic, "j");
    assert_eq!(
        instruction.branches,
        vec![BranchEdge { kind: BranchKind::Unconditional, target: Some(0x1000) }]
    );
    assert_eq!(instruction.to_string(), "j 0x1000");
}

#[test]
fn test_jal_link_register_selects_mnemonic() {
    let decoder = InstructionDecoder::new();

    // JAL x1, 8 -> 0x008000EF
    let call = decoder.decode(&0x008000EFu32.to_le_bytes(), 0x1000).unwrap();
    assert_eq!(call.to_string(), "call 0x1008");
    assert_eq!(call.branches, vec![BranchEdge { kind: BranchKind::Call, target: Some(0x1008) }]);

    // JAL x10, 8 -> 0x0080056F
    let jal = decoder.decode(&0x0080056Fu32.to_le_bytes(), 0x1000).unwrap();
    assert_eq!(jal.to_string(), "jal a0, 0x1008");
    assert!(jal.is_call());
}

#[test]
fn test_jalr_through_ra_is_return() {
    let decoder = InstructionDecoder::new();

    // JALR x0, 0(x1) -> 0x00008067
    let instruction = decoder.decode(&[0x67, 0x80, 0x00, 0x00], 0x2000).unwrap();
    assert_eq!(instruction.mnemonic, "jr");
    assert!(instruction.is_return());
    assert_eq!(instruction.to_string(), "jr ra+0x2000");
}

#[test]
fn test_store_unknown_funct3() {
    let decoder = InstructionDecoder::new();

    // STORE opcode with funct3 = 7
    let instruction = decoder.decode(&0x00007023u32.to_le_bytes(), 0).unwrap();
    assert_eq!(instruction.mnemonic, "store?7");
    assert_eq!(instruction.length, 4);
}

#[test]
fn test_branch_edges() {
    let decoder = InstructionDecoder::new();

    // BEQ x1, x2, 16 -> 0x00208863
    let instruction = decoder.decode(&0x00208863u32.to_le_bytes(), 0x1000).unwrap();
    assert_eq!(instruction.to_string(), "beq ra, sp, 0x1010");
    assert_eq!(
        instruction.branches,
        vec![
            BranchEdge { kind: BranchKind::TrueBranch, target: Some(0x1010) },
            BranchEdge { kind: BranchKind::FalseBranch, target: Some(0x1004) },
        ]
    );
    assert_eq!(instruction.operands.last().map(|token| token.kind), Some(TokenKind::Address));
}

#[test]
fn test_load_memory_operand() {
    let decoder = InstructionDecoder::new();

    // LD x10, 8(x2) -> 0x00813503
    let bytes = 0x00813503u32.to_le_bytes();
    let instruction = decoder.decode(&bytes, 0).unwrap();
    assert_eq!(instruction.to_string(), "ld a0, [sp+0x8]");

    let kinds: Vec<_> = instruction.operands.iter().map(|token| token.kind).collect();
    assert_eq!(kinds[2], TokenKind::BeginMemory);
    assert_eq!(kinds[5], TokenKind::Address);
    assert_eq!(kinds[6], TokenKind::EndMemory);
    assert_eq!(instruction.operands[5].value, Some(8));

    // SW x10, -4(x2) -> 0xFEA12E23, negative offsets keep their sign
    let store = decoder.decode(&0xFEA12E23u32.to_le_bytes(), 0).unwrap();
    assert_eq!(store.to_string(), "sw a0, [sp+-0x4]");
    assert_eq!(store.operands[5].kind, TokenKind::Address);
    assert_eq!(store.operands[5].value, Some(-4));

    // RV32 has no LD and keeps the group with an unknown marker
    let rv32 = InstructionDecoder::with_target(Target::rv32imc());
    assert_eq!(rv32.decode(&bytes, 0).unwrap().mnemonic, "load?3");
}

#[test]
fn test_m_extension_gating() {
    // MUL x10, x11, x12 -> 0x02C58533
    let bytes = 0x02C58533u32.to_le_bytes();

    let instruction = InstructionDecoder::new().decode(&bytes, 0).unwrap();
    assert_eq!(instruction.to_string(), "mul a0, a1, a2");

    let without_m = InstructionDecoder::with_target(Target::new().with_64bit().with_c());
    assert!(without_m.decode(&bytes, 0).is_none());
}

#[test]
fn test_fence_i_spelling_and_gating() {
    // FENCE.I -> 0x0000100F
    let bytes = 0x0000100Fu32.to_le_bytes();

    let instruction = InstructionDecoder::new().decode(&bytes, 0x2000).unwrap();
    assert_eq!(instruction.mnemonic, "fence.i");
    assert_eq!(instruction.to_string(), "fence.i");
    assert!(instruction.operands.is_empty());
    assert!(instruction.branches.is_empty());

    let without_zifencei = InstructionDecoder::with_target(Target::rv64imc());
    assert!(without_zifencei.decode(&bytes, 0x2000).is_none());
}

#[test]
fn test_short_input_is_not_decoded() {
    let decoder = InstructionDecoder::new();

    assert!(decoder.decode(&[], 0).is_none());
    assert!(decoder.decode(&[0x93], 0).is_none());
    // 32-bit low bits but only three bytes available
    assert!(decoder.decode(&[0x93, 0x02, 0x10], 0).is_none());
}

#[test]
fn test_decode_all_mixed() {
    let decoder = InstructionDecoder::new();

    // Mix of compressed and uncompressed instructions
    let bytes = vec![
        0x01, 0x00, // C.NOP (0x0001)
        0xB3, 0x00, 0x31, 0x00, // ADD x1, x2, x3 (0x003100B3)
        0x85, 0x00, // C.ADDI x1, 1 (0x0085)
    ];

    let result = decoder.decode_all(&bytes, 0x1000).unwrap();
    let text: Vec<_> = result.iter().map(ToString::to_string).collect();
    assert_eq!(text, vec!["c.nop", "add ra, sp, gp", "c.addi ra, ra, 0x1"]);
    assert_eq!(result.iter().map(|insn| insn.length).sum::<usize>(), bytes.len());
}

#[test]
fn test_decode_all_errors() {
    let decoder = InstructionDecoder::new();

    // C.NOP followed by the first half of a 32-bit instruction
    let truncated = [0x01, 0x00, 0x93, 0x02];
    assert_eq!(
        decoder.decode_all(&truncated, 0x1000),
        Err(Error::Truncated { address: 0x1002, available: 2 })
    );

    // AMO opcode group has no decoding
    let amo = 0x0000202Fu32.to_le_bytes();
    assert_eq!(
        decoder.decode_all(&amo, 0x1000),
        Err(Error::Undecodable { address: 0x1000, raw: 0x202F })
    );
}

#[test]
fn test_rv32_rejects_word_operations() {
    let decoder = InstructionDecoder::with_target(Target::rv32imc());

    // ADDIW x10, x10, 1 -> 0x0015051B
    assert!(decoder.decode(&0x0015051Bu32.to_le_bytes(), 0).is_none());
    assert_eq!(
        InstructionDecoder::new().decode(&0x0015051Bu32.to_le_bytes(), 0).unwrap().mnemonic,
        "addiw"
    );
}
