use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::cpu::{Cpu, CpuAffinity};
use crate::error::{JriscError, Result};
use crate::field::{Operand, FIELD_MASK};
use crate::instructions::{self, Mnemonic, OpcodeEntry};
use crate::stream::AddressableStream;

pub const OPCODE_SHIFT: u32 = 10;
pub const SRC_SHIFT: u32 = 5;

/// A decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub opcode: u8,
    pub src: Operand,
    pub dst: Operand,
    pub swap_on_display: bool,
    pub affinity: CpuAffinity,
    /// Only meaningful for `movei`.
    pub long_immediate: u32,
    /// Logical address of the opcode word.
    pub address: u64,
}

/// Split a word into its opcode, source and destination fields.
pub fn split_word(word: u16) -> (u8, u8, u8) {
    let opcode = (word >> OPCODE_SHIFT) as u8;
    let src = (word >> SRC_SHIFT) as u8 & FIELD_MASK;
    let dst = word as u8 & FIELD_MASK;
    (opcode, src, dst)
}

impl Instruction {
    fn from_entry(entry: &OpcodeEntry, src: Operand, dst: Operand, address: u64) -> Self {
        Self {
            mnemonic: entry.mnemonic,
            opcode: entry.opcode,
            src,
            dst,
            swap_on_display: entry.swap_on_display,
            affinity: entry.affinity,
            long_immediate: 0,
            address,
        }
    }

    /// The opcode word rebuilt from the decoded fields.
    pub fn opcode_word(&self) -> u16 {
        ((self.opcode as u16) << OPCODE_SHIFT)
            | ((self.src.to_raw() as u16) << SRC_SHIFT)
            | self.dst.to_raw() as u16
    }

    pub fn long_immediate_low(&self) -> u16 {
        self.long_immediate as u16
    }

    pub fn long_immediate_high(&self) -> u16 {
        (self.long_immediate >> 16) as u16
    }

    /// Every word of the encoding, in stream order.
    pub fn words(&self) -> Vec<u16> {
        let mut words = vec![self.opcode_word()];
        if self.mnemonic.has_long_immediate() {
            words.push(self.long_immediate_low());
            words.push(self.long_immediate_high());
        }
        words
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> u64 {
        if self.mnemonic.has_long_immediate() {
            6
        } else {
            2
        }
    }

    /// Branch target for `jr`.
    pub fn branch_target(&self) -> Option<u64> {
        self.src.pc_target(self.address)
    }
}

/// Decode an opcode word already fetched from `address`.
///
/// The long immediate of `movei` is not part of the word and is left zero.
pub fn decode_word(word: u16, cpu: Cpu, address: u64) -> Result<Instruction> {
    let (opcode, raw_src, raw_dst) = split_word(word);
    let invalid = || JriscError::InvalidOpcode {
        opcode,
        src: raw_src,
        cpu,
        address,
    };

    let entry = instructions::lookup(opcode, raw_src, cpu).ok_or_else(invalid)?;
    trace!(address, word, mnemonic = %entry.mnemonic, "matched");

    let src = Operand::from_raw(entry.src_kind, raw_src)?;
    let dst = Operand::from_raw(entry.dst_kind, raw_dst)?;
    Ok(Instruction::from_entry(entry, src, dst, address))
}

/// Read and decode one instruction from `stream`.
///
/// On failure the stream keeps whatever words were already consumed.
pub fn decode<S: AddressableStream + ?Sized>(stream: &mut S, cpu: Cpu) -> Result<Instruction> {
    let (address, word) = stream.read_be_u16()?;
    let mut inst = decode_word(word, cpu, address).map_err(|e| {
        debug!(address, word, error = %e, "decode failed");
        e
    })?;

    if inst.mnemonic.has_long_immediate() {
        let (_, low) = stream.read_be_u16()?;
        let (_, high) = stream.read_be_u16()?;
        inst.long_immediate = ((high as u32) << 16) | low as u32;
        trace!(address, value = inst.long_immediate, "long immediate");
    }

    Ok(inst)
}

/// Write `inst`'s words big-endian; returns the address of the first one.
pub fn encode<S: AddressableStream + ?Sized>(stream: &mut S, inst: &Instruction) -> Result<u64> {
    let mut bytes = Vec::with_capacity(6);
    for word in inst.words() {
        bytes.extend_from_slice(&word.to_be_bytes());
    }
    stream.write(&bytes)
}

pub trait Decoder {
    fn decode(&self, stream: &mut dyn AddressableStream) -> Result<Instruction>;
}

/// Decoder bound to one processor.
#[derive(Debug, Clone, Copy)]
pub struct JriscDecoder {
    pub cpu: Cpu,
}

impl JriscDecoder {
    pub fn new(cpu: Cpu) -> Self {
        Self { cpu }
    }

    pub fn iter<'s, S: AddressableStream + ?Sized>(&self, stream: &'s mut S) -> Instructions<'s, S> {
        Instructions {
            stream,
            cpu: self.cpu,
            done: false,
        }
    }
}

impl Decoder for JriscDecoder {
    fn decode(&self, stream: &mut dyn AddressableStream) -> Result<Instruction> {
        decode(stream, self.cpu)
    }
}

/// Sequential decode; yields the first error and then stops.
pub struct Instructions<'s, S: ?Sized> {
    stream: &'s mut S,
    cpu: Cpu,
    done: bool,
}

impl<S: AddressableStream + ?Sized> Iterator for Instructions<'_, S> {
    type Item = Result<Instruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let res = decode(&mut *self.stream, self.cpu);
        self.done = res.is_err();
        Some(res)
    }
}
