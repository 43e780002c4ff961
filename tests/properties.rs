use proptest::prelude::*;

use jrisc_rs::decoder::split_word;
use jrisc_rs::{decode, decode_word, find_first, render, Cpu, MemoryStream, RenderFlags, RenderTarget};

#[test]
fn every_decodable_word_reencodes_exactly() {
    for cpu in [Cpu::Gpu, Cpu::Dsp] {
        for w in 0..=u16::MAX {
            let Ok(inst) = decode_word(w, cpu, 0) else {
                continue;
            };
            assert_eq!(inst.opcode_word(), w, "{w:#06x} as {}", inst.mnemonic);
            assert_eq!(inst.opcode, split_word(w).0);
        }
    }
}

#[test]
fn only_unmatched_cpu_rows_fail() {
    // every failure must be an opcode with no row for that CPU/source pair
    for cpu in [Cpu::Gpu, Cpu::Dsp] {
        for w in 0..=u16::MAX {
            if let Err(e) = decode_word(w, cpu, 0) {
                let (opcode, src, _) = split_word(w);
                assert!(find_first(opcode).is_some());
                let expected = match cpu {
                    Cpu::Gpu => opcode == 63 && src > 1,
                    Cpu::Dsp => opcode == 62,
                };
                assert!(expected, "{w:#06x} on {cpu}: {e}");
            }
        }
    }
}

fn flags() -> impl Strategy<Value = RenderFlags> {
    (0u32..4).prop_map(RenderFlags::from_bits_truncate)
}

fn cpu() -> impl Strategy<Value = Cpu> {
    prop_oneof![Just(Cpu::Gpu), Just(Cpu::Dsp)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    #[test]
    fn measure_and_fill_agree(
        w in any::<u16>(),
        imm in any::<u32>(),
        address in any::<u32>(),
        cpu in cpu(),
        flags in flags(),
    ) {
        if let Ok(mut inst) = decode_word(w, cpu, address as u64) {
            inst.long_immediate = imm;
            let needed = render(&inst, flags, RenderTarget::Measure).unwrap();
            let mut buf = vec![0xffu8; needed];
            let filled = render(&inst, flags, RenderTarget::Fill(&mut buf)).unwrap();
            prop_assert_eq!(filled, needed);
            prop_assert_eq!(buf[needed - 1], 0);
            prop_assert!(!buf[..needed - 1].contains(&0));
        }
    }

    #[test]
    fn decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..8), cpu in cpu()) {
        let mut s = MemoryStream::from_memory(bytes, 0);
        let _ = decode(&mut s, cpu);
    }
}
