//! Operand field kinds and the raw <-> value mapping for each of them.

use serde::{Deserialize, Serialize};

use crate::error::{JriscError, Result};

pub const FIELD_MASK: u8 = 0x1f;

/// How a 5-bit operand slot is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Reg,
    Indirect,
    Condition,
    /// Signed immediate [-16, 15].
    SImm,
    /// Unsigned immediate [1, 32].
    UImm,
    /// Unsigned immediate [0, 31].
    ZUImm,
    /// Shift left immediate, 32 - [1, 32].
    ShlImm,
    PcOffset,
    Flag,
    Unused,
}

/// Numeric kind codes, for building opcode tables from external data.
impl TryFrom<u8> for FieldKind {
    type Error = JriscError;

    fn try_from(code: u8) -> Result<Self> {
        Ok(match code {
            0 => FieldKind::Reg,
            1 => FieldKind::Indirect,
            2 => FieldKind::Condition,
            3 => FieldKind::SImm,
            4 => FieldKind::UImm,
            5 => FieldKind::ZUImm,
            6 => FieldKind::ShlImm,
            7 => FieldKind::PcOffset,
            8 => FieldKind::Flag,
            9 => FieldKind::Unused,
            other => return Err(JriscError::InvalidFieldKind(other)),
        })
    }
}

/// A decoded operand slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    Reg(u8),
    Indirect(u8),
    Condition(u8),
    SImm(i8),
    UImm(u8),
    ZUImm(u8),
    /// Holds the shift amount as displayed, 0..=31.
    ShlImm(u8),
    /// Word displacement relative to the instruction after this one.
    PcOffset(i8),
    Flag(bool),
    /// Bits the instruction ignores, kept so the word can be rebuilt.
    Unused(u8),
}

fn sign_extend5(raw: u8) -> i8 {
    if raw & 0x10 != 0 {
        (raw | 0xe0) as i8
    } else {
        raw as i8
    }
}

fn unsigned_value(raw: u8) -> u8 {
    if raw == 0 {
        32
    } else {
        raw
    }
}

impl Operand {
    /// Interpret `raw` as a field of the given kind.
    pub fn from_raw(kind: FieldKind, raw: u8) -> Result<Self> {
        let check = |raw: u8| {
            if raw & !FIELD_MASK != 0 {
                Err(JriscError::InvalidValue { kind, raw })
            } else {
                Ok(raw)
            }
        };

        Ok(match kind {
            FieldKind::Reg | FieldKind::Indirect => {
                if raw & !FIELD_MASK != 0 {
                    return Err(JriscError::InvalidRegister(raw));
                }
                if kind == FieldKind::Reg {
                    Operand::Reg(raw)
                } else {
                    Operand::Indirect(raw)
                }
            }
            FieldKind::Condition => Operand::Condition(check(raw)?),
            FieldKind::SImm => Operand::SImm(sign_extend5(check(raw)?)),
            FieldKind::PcOffset => Operand::PcOffset(sign_extend5(check(raw)?)),
            FieldKind::UImm => Operand::UImm(unsigned_value(check(raw)?)),
            FieldKind::ZUImm => Operand::ZUImm(check(raw)?),
            FieldKind::ShlImm => Operand::ShlImm(32 - unsigned_value(check(raw)?)),
            FieldKind::Flag => match raw {
                0 => Operand::Flag(false),
                1 => Operand::Flag(true),
                _ => return Err(JriscError::InvalidValue { kind, raw }),
            },
            FieldKind::Unused => Operand::Unused(raw & FIELD_MASK),
        })
    }

    /// The 5-bit field this operand was decoded from.
    pub fn to_raw(self) -> u8 {
        let raw = match self {
            Operand::Reg(r) | Operand::Indirect(r) => r,
            Operand::Condition(c) => c,
            Operand::SImm(v) | Operand::PcOffset(v) => v as u8,
            Operand::UImm(v) => {
                if v == 32 {
                    0
                } else {
                    v
                }
            }
            Operand::ZUImm(v) => v,
            Operand::ShlImm(v) => 32u8.wrapping_sub(v),
            Operand::Flag(f) => f as u8,
            Operand::Unused(raw) => raw,
        };
        raw & FIELD_MASK
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Operand::Reg(_) => FieldKind::Reg,
            Operand::Indirect(_) => FieldKind::Indirect,
            Operand::Condition(_) => FieldKind::Condition,
            Operand::SImm(_) => FieldKind::SImm,
            Operand::UImm(_) => FieldKind::UImm,
            Operand::ZUImm(_) => FieldKind::ZUImm,
            Operand::ShlImm(_) => FieldKind::ShlImm,
            Operand::PcOffset(_) => FieldKind::PcOffset,
            Operand::Flag(_) => FieldKind::Flag,
            Operand::Unused(_) => FieldKind::Unused,
        }
    }

    /// Branch target of a PC-relative operand for an instruction at `address`,
    /// wrapped to the 32-bit address space.
    pub fn pc_target(self, address: u64) -> Option<u64> {
        match self {
            Operand::PcOffset(v) => {
                let target = (address as u32).wrapping_add_signed(byte_displacement(v) as i32);
                Some(target as u64)
            }
            _ => None,
        }
    }
}

/// Displacement in bytes from the instruction's own address.
pub fn byte_displacement(words: i8) -> i64 {
    (words as i64 + 1) * 2
}
