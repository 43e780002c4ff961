use jrisc_rs::{
    decode, decode_word, encode, AddressableStream, Cpu, FileStream, JriscError, MemoryStream,
    Mnemonic, Operand,
};

fn word(opcode: u16, src: u16, dst: u16) -> u16 {
    (opcode << 10) | (src << 5) | dst
}

#[test]
fn opcode_63_depends_on_cpu_and_source() {
    assert_eq!(decode_word(word(63, 0, 4), Cpu::Gpu, 0).unwrap().mnemonic, Mnemonic::Pack);
    assert_eq!(decode_word(word(63, 1, 4), Cpu::Gpu, 0).unwrap().mnemonic, Mnemonic::Unpack);
    for src in 0..32 {
        let inst = decode_word(word(63, src, 4), Cpu::Dsp, 0).unwrap();
        assert_eq!(inst.mnemonic, Mnemonic::Addqmod);
        assert_eq!(inst.src, Operand::UImm(if src == 0 { 32 } else { src as u8 }));
    }
}

#[test]
fn dsp_variants_of_shared_opcodes() {
    let inst = decode_word(word(48, 3, 7), Cpu::Dsp, 0).unwrap();
    assert_eq!(inst.mnemonic, Mnemonic::Mirror);
    assert_eq!(inst.to_string(), "\tmirror  r7, r3");
    let inst = decode_word(word(32, 0, 2), Cpu::Dsp, 0).unwrap();
    assert_eq!(inst.mnemonic, Mnemonic::Subqmod);
    assert_eq!(inst.to_string(), "\tsubqmod #32, r2");
    let inst = decode_word(word(32, 0, 2), Cpu::Gpu, 0).unwrap();
    assert_eq!(inst.to_string(), "\tsat8    r2");
}

#[test]
fn empty_and_odd_streams_fail_with_io() {
    let mut empty = MemoryStream::from_memory(Vec::new(), 0);
    assert!(matches!(decode(&mut empty, Cpu::Gpu), Err(JriscError::Io(_))));

    let mut odd = MemoryStream::from_memory(vec![0xe4], 0);
    assert!(matches!(decode(&mut odd, Cpu::Gpu), Err(JriscError::Io(_))));
    assert_eq!(odd.read_address(), 0);
}

#[test]
fn invalid_opcode_consumes_the_word() {
    let bytes = word(62, 0, 1).to_be_bytes();
    let mut s = MemoryStream::from_memory(bytes, 0x40);
    let err = decode(&mut s, Cpu::Dsp).unwrap_err();
    assert!(matches!(
        err,
        JriscError::InvalidOpcode { opcode: 62, cpu: Cpu::Dsp, address: 0x40, .. }
    ));
    assert_eq!(s.read_address(), 0x42);
}

#[test]
fn encode_writes_through_write_cursor() {
    let src = [0x98u8, 0x1f, 0x05, 0xbc, 0x00, 0x00, 0xd7, 0xc0];
    let mut s = MemoryStream::with_write_buffer(&src[..], vec![0u8; 8], 0x100);
    let movei = decode(&mut s, Cpu::Gpu).unwrap();
    let jr = decode(&mut s, Cpu::Gpu).unwrap();
    assert_eq!(encode(&mut s, &movei).unwrap(), 0x100);
    assert_eq!(encode(&mut s, &jr).unwrap(), 0x106);
    assert_eq!(s.write_address(), 0x108);
    let (_, written) = s.into_backing().into_parts();
    assert_eq!(written, src);
}

#[test]
fn decode_from_file() {
    let path = std::env::temp_dir().join(format!("jrisc_decode_{}.bin", std::process::id()));
    std::fs::write(&path, [0x00u8, 0x00, 0x98, 0x1f, 0x21, 0x14, 0x00, 0xf0, 0xe4, 0x00]).unwrap();

    let mut s = FileStream::open(&path, 2, 0xf03000).unwrap();
    let movei = decode(&mut s, Cpu::Gpu).unwrap();
    assert_eq!(movei.long_immediate, 0xf02114);
    assert_eq!(movei.address, 0xf03000);
    let nop = decode(&mut s, Cpu::Gpu).unwrap();
    assert_eq!(nop.address, 0xf03006);
    assert!(decode(&mut s, Cpu::Gpu).unwrap_err().is_io());
    drop(s);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn instruction_json_uses_lowercase_mnemonics() {
    let inst = decode_word(word(38, 0, 31), Cpu::Gpu, 0xf03000).unwrap();
    let json = serde_json::to_value(inst).unwrap();
    assert_eq!(json["mnemonic"], "movei");
    assert_eq!(json["address"], 0xf03000);
    let back: jrisc_rs::Instruction = serde_json::from_value(json).unwrap();
    assert_eq!(back, inst);
}
