use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

use crate::cpu::{Cpu, CpuAffinity};
use crate::field::FieldKind;

/// Every mnemonic in the opcode table, declared in table order.
///
/// `Invalid` terminates the list; it bounds table walks and is never the
/// result of a successful decode.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    IntoStaticStr,
    EnumIter,
    EnumCount,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Mnemonic {
    Add,
    Addc,
    Addq,
    Addqt,
    Sub,
    Subc,
    Subq,
    Subqt,
    Neg,
    And,
    Or,
    Xor,
    Not,
    Btst,
    Bset,
    Bclr,
    Mult,
    Imult,
    Imultn,
    Resmac,
    Imacn,
    Div,
    Abs,
    Sh,
    Shlq,
    Shrq,
    Sha,
    Sharq,
    Ror,
    Rorq,
    Cmp,
    Cmpq,
    Sat8,
    Subqmod,
    Sat16,
    Sat16s,
    Move,
    Moveq,
    Moveta,
    Movefa,
    Movei,
    Loadb,
    Loadw,
    Load,
    Loadp,
    Sat32s,
    Loadr14n,
    Loadr15n,
    Storeb,
    Storew,
    Store,
    Storep,
    Mirror,
    Storer14n,
    Storer15n,
    Movepc,
    Jump,
    Jr,
    Mmult,
    Mtoi,
    Normi,
    Nop,
    Loadr14r,
    Loadr15r,
    Storer14r,
    Storer15r,
    Sat24,
    Addqmod,
    Pack,
    Unpack,
    Invalid,
}

impl Mnemonic {
    /// Name as written in assembler source.
    ///
    /// The indexed load/store forms share the plain `load`/`store` name and
    /// `movepc` is spelled `move PC,rN`.
    pub fn asm_name(self) -> &'static str {
        use Mnemonic::*;
        match self {
            Loadr14n | Loadr14r | Loadr15n | Loadr15r => "load",
            Storer14n | Storer14r | Storer15n | Storer15r => "store",
            Movepc => "move",
            other => other.into(),
        }
    }

    /// Implicit base register of the indexed addressing forms.
    pub fn base_register(self) -> Option<u8> {
        use Mnemonic::*;
        match self {
            Loadr14n | Loadr14r | Storer14n | Storer14r => Some(14),
            Loadr15n | Loadr15r | Storer15n | Storer15r => Some(15),
            _ => None,
        }
    }

    /// Mnemonics whose 32-bit immediate follows in the next two words.
    pub fn has_long_immediate(self) -> bool {
        self == Mnemonic::Movei
    }

    pub fn entry(self) -> Option<&'static OpcodeEntry> {
        OPCODE_TABLE.get(self as usize)
    }
}

/// One row of the opcode catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeEntry {
    pub mnemonic: Mnemonic,
    pub opcode: u8,
    pub src_kind: FieldKind,
    pub dst_kind: FieldKind,
    /// Store-class rows are encoded like their load and displayed swapped.
    pub swap_on_display: bool,
    pub affinity: CpuAffinity,
}

impl OpcodeEntry {
    /// Whether this row decodes `opcode` with source field `raw_src` on `cpu`.
    pub fn matches(&self, opcode: u8, raw_src: u8, cpu: Cpu) -> bool {
        if self.opcode != opcode || !self.affinity.accepts(cpu) {
            return false;
        }
        // pack and unpack share an opcode and differ in the source field
        match self.mnemonic {
            Mnemonic::Pack => raw_src == 0,
            Mnemonic::Unpack => raw_src == 1,
            _ => true,
        }
    }
}

const fn row(
    mnemonic: Mnemonic,
    opcode: u8,
    src_kind: FieldKind,
    dst_kind: FieldKind,
    swap_on_display: bool,
    affinity: CpuAffinity,
) -> OpcodeEntry {
    OpcodeEntry {
        mnemonic,
        opcode,
        src_kind,
        dst_kind,
        swap_on_display,
        affinity,
    }
}

use CpuAffinity::{Dsp, Either, Gpu};
use FieldKind::{Condition, Flag, Indirect, PcOffset, Reg, SImm, ShlImm, UImm, Unused, ZUImm};
use Mnemonic::*;

/// The Jaguar RISC opcode catalog, sorted by opcode.
///
/// The first row for opcode `n` is never before index `n`, and row `i` holds
/// mnemonic `i`.
pub static OPCODE_TABLE: [OpcodeEntry; Mnemonic::COUNT - 1] = [
    row(Add, 0, Reg, Reg, false, Either),
    row(Addc, 1, Reg, Reg, false, Either),
    row(Addq, 2, UImm, Reg, false, Either),
    row(Addqt, 3, UImm, Reg, false, Either),
    row(Sub, 4, Reg, Reg, false, Either),
    row(Subc, 5, Reg, Reg, false, Either),
    row(Subq, 6, UImm, Reg, false, Either),
    row(Subqt, 7, UImm, Reg, false, Either),
    row(Neg, 8, Unused, Reg, false, Either),
    row(And, 9, Reg, Reg, false, Either),
    row(Or, 10, Reg, Reg, false, Either),
    row(Xor, 11, Reg, Reg, false, Either),
    row(Not, 12, Unused, Reg, false, Either),
    row(Btst, 13, ZUImm, Reg, false, Either),
    row(Bset, 14, ZUImm, Reg, false, Either),
    row(Bclr, 15, ZUImm, Reg, false, Either),
    row(Mult, 16, Reg, Reg, false, Either),
    row(Imult, 17, Reg, Reg, false, Either),
    row(Imultn, 18, Reg, Reg, false, Either),
    row(Resmac, 19, Unused, Reg, false, Either),
    row(Imacn, 20, Reg, Reg, false, Either),
    row(Div, 21, Reg, Reg, false, Either),
    row(Abs, 22, Unused, Reg, false, Either),
    row(Sh, 23, Reg, Reg, false, Either),
    row(Shlq, 24, ShlImm, Reg, false, Either),
    row(Shrq, 25, UImm, Reg, false, Either),
    row(Sha, 26, Reg, Reg, false, Either),
    row(Sharq, 27, UImm, Reg, false, Either),
    row(Ror, 28, Reg, Reg, false, Either),
    row(Rorq, 29, UImm, Reg, false, Either),
    row(Cmp, 30, Reg, Reg, false, Either),
    row(Cmpq, 31, SImm, Reg, false, Either),
    row(Sat8, 32, Unused, Reg, false, Gpu),
    row(Subqmod, 32, UImm, Reg, false, Dsp),
    row(Sat16, 33, Unused, Reg, false, Gpu),
    row(Sat16s, 33, Unused, Reg, false, Dsp),
    row(Move, 34, Reg, Reg, false, Either),
    row(Moveq, 35, ZUImm, Reg, false, Either),
    row(Moveta, 36, Reg, Reg, false, Either),
    row(Movefa, 37, Reg, Reg, false, Either),
    row(Movei, 38, Unused, Reg, false, Either),
    row(Loadb, 39, Indirect, Reg, false, Either),
    row(Loadw, 40, Indirect, Reg, false, Either),
    row(Load, 41, Indirect, Reg, false, Either),
    row(Loadp, 42, Indirect, Reg, false, Gpu),
    row(Sat32s, 42, Unused, Reg, false, Dsp),
    row(Loadr14n, 43, UImm, Reg, false, Either),
    row(Loadr15n, 44, UImm, Reg, false, Either),
    row(Storeb, 45, Indirect, Reg, true, Either),
    row(Storew, 46, Indirect, Reg, true, Either),
    row(Store, 47, Indirect, Reg, true, Either),
    row(Storep, 48, Indirect, Reg, true, Gpu),
    row(Mirror, 48, Reg, Reg, true, Dsp),
    row(Storer14n, 49, UImm, Reg, true, Either),
    row(Storer15n, 50, UImm, Reg, true, Either),
    // Unverified against hardware documentation; treated as valid on both CPUs.
    row(Movepc, 51, Unused, Reg, true, Either),
    row(Jump, 52, Indirect, Condition, true, Either),
    row(Jr, 53, PcOffset, Condition, true, Either),
    row(Mmult, 54, Reg, Reg, false, Either),
    row(Mtoi, 55, Reg, Reg, false, Either),
    row(Normi, 56, Reg, Reg, false, Either),
    row(Nop, 57, Unused, Unused, false, Either),
    row(Loadr14r, 58, Reg, Reg, false, Either),
    row(Loadr15r, 59, Reg, Reg, false, Either),
    row(Storer14r, 60, Reg, Reg, true, Either),
    row(Storer15r, 61, Reg, Reg, true, Either),
    row(Sat24, 62, Unused, Reg, false, Gpu),
    row(Addqmod, 63, UImm, Reg, false, Dsp),
    row(Pack, 63, Flag, Reg, false, Gpu),
    row(Unpack, 63, Flag, Reg, false, Gpu),
];

/// Index of the first table row for `opcode`.
pub fn find_first(opcode: u8) -> Option<usize> {
    OPCODE_TABLE
        .iter()
        .enumerate()
        .skip(opcode as usize)
        .take_while(|(_, e)| e.opcode <= opcode)
        .find(|(_, e)| e.opcode == opcode)
        .map(|(i, _)| i)
}

/// The rows sharing `opcode`, in table order.
pub fn rows_for(opcode: u8) -> &'static [OpcodeEntry] {
    let Some(first) = find_first(opcode) else {
        return &[];
    };
    let len = OPCODE_TABLE[first..]
        .iter()
        .take_while(|e| e.opcode == opcode)
        .count();
    &OPCODE_TABLE[first..first + len]
}

/// First row that decodes `opcode` with source field `raw_src` on `cpu`.
pub fn lookup(opcode: u8, raw_src: u8, cpu: Cpu) -> Option<&'static OpcodeEntry> {
    rows_for(opcode).iter().find(|e| e.matches(opcode, raw_src, cpu))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn rows_are_indexed_by_mnemonic() {
        for (i, e) in OPCODE_TABLE.iter().enumerate() {
            assert_eq!(e.mnemonic as usize, i, "{}", e.mnemonic);
        }
        assert_eq!(Mnemonic::Invalid as usize, OPCODE_TABLE.len());
        assert!(Mnemonic::Invalid.entry().is_none());
    }

    #[test]
    fn table_is_sorted_and_bounded() {
        for pair in OPCODE_TABLE.windows(2) {
            assert!(pair[0].opcode <= pair[1].opcode);
        }
        for (i, e) in OPCODE_TABLE.iter().enumerate() {
            let first = find_first(e.opcode).unwrap();
            assert!(first <= i);
            assert!(first >= e.opcode as usize);
            assert!(OPCODE_TABLE[..first].iter().all(|o| o.opcode != e.opcode));
        }
    }

    #[test]
    fn every_opcode_has_a_row() {
        for op in 0..64u8 {
            assert!(find_first(op).is_some(), "opcode {op}");
        }
        assert_eq!(find_first(64), None);
    }

    #[test]
    fn shared_opcodes_split_by_cpu() {
        let pairs = [
            (32, Sat8, Subqmod),
            (33, Sat16, Sat16s),
            (42, Loadp, Sat32s),
            (48, Storep, Mirror),
        ];
        for (op, gpu, dsp) in pairs {
            assert_eq!(lookup(op, 3, Cpu::Gpu).unwrap().mnemonic, gpu);
            assert_eq!(lookup(op, 3, Cpu::Dsp).unwrap().mnemonic, dsp);
        }
    }

    #[test]
    fn opcode_63_uses_source_field() {
        assert_eq!(lookup(63, 0, Cpu::Gpu).unwrap().mnemonic, Pack);
        assert_eq!(lookup(63, 1, Cpu::Gpu).unwrap().mnemonic, Unpack);
        assert!(lookup(63, 2, Cpu::Gpu).is_none());
        for src in 0..32 {
            assert_eq!(lookup(63, src, Cpu::Dsp).unwrap().mnemonic, Addqmod);
        }
    }

    #[test]
    fn names() {
        assert_eq!(Mnemonic::Sat16s.to_string(), "sat16s");
        assert_eq!(Mnemonic::Loadr15r.asm_name(), "load");
        assert_eq!(Mnemonic::Storer14n.asm_name(), "store");
        assert_eq!(Mnemonic::Movepc.asm_name(), "move");
        assert_eq!(Mnemonic::Storer15n.base_register(), Some(15));
        assert_eq!(Mnemonic::Store.base_register(), None);
        let indexed = Mnemonic::iter().filter(|m| m.base_register().is_some()).count();
        assert_eq!(indexed, 8);
    }
}
