//! Assembler-syntax rendering of decoded instructions.
//!
//! Output matches the reference Jaguar tools byte for byte, e.g. with
//! address and machine code enabled:
//!
//! ```text
//! 00000000: 981f 05bc 0000  movei   #$5bc, r31
//! 00000006: bfe0            store   r0, (r31)
//! ```

use std::fmt;
use std::io;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::cpu::DisasmConfig;
use crate::decoder::{Instruction, JriscDecoder};
use crate::error::{JriscError, Result};
use crate::field::{byte_displacement, Operand};
use crate::instructions::Mnemonic;
use crate::memory::MemoryStream;

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RenderFlags: u32 {
const ADDRESS = 1 << 0; // prefix with the instruction address
const MACHINE_CODE = 1 << 1; // prefix with the encoded words
}
}

/// What a [`render`] call does with the text.
pub enum RenderTarget<'a> {
    /// Only compute the length.
    Measure,
    /// Write the text and a terminating NUL into the buffer.
    Fill(&'a mut [u8]),
}

/// Render `inst`, returning the length of the text plus its terminating NUL.
///
/// Measuring first and then filling a buffer of the returned length always
/// succeeds and produces exactly that many bytes.
pub fn render(inst: &Instruction, flags: RenderFlags, target: RenderTarget<'_>) -> Result<usize> {
    let mut counter = Counter(0);
    emit(&mut counter, inst, flags).map_err(|_| JriscError::OutOfMemory)?;
    let needed = counter.0 + 1;

    match target {
        RenderTarget::Measure => Ok(needed),
        RenderTarget::Fill(buf) => {
            let available = buf.len();
            if available < needed {
                return Err(JriscError::BufferTooSmall { needed, available });
            }
            let mut out = SliceWriter { buf, pos: 0 };
            emit(&mut out, inst, flags)
                .map_err(|_| JriscError::BufferTooSmall { needed, available })?;
            out.buf[out.pos] = 0;
            Ok(out.pos + 1)
        }
    }
}

/// Render into a fresh `String`.
pub fn render_string(inst: &Instruction, flags: RenderFlags) -> String {
    let mut s = String::new();
    // writing into a String cannot fail
    let _ = emit(&mut s, inst, flags);
    s
}

const STACK_LINE: usize = 32;

/// Write one rendered line plus newline to `out`.
///
/// Short lines are rendered on the stack; longer ones get a heap buffer
/// sized by a measuring pass.
pub fn print_instruction<W: io::Write>(out: &mut W, inst: &Instruction, flags: RenderFlags) -> Result<()> {
    let mut stack = [0u8; STACK_LINE];
    let mut heap = Vec::new();
    let needed = render(inst, flags, RenderTarget::Measure)?;

    let buf: &mut [u8] = if needed <= STACK_LINE {
        &mut stack
    } else {
        heap.try_reserve_exact(needed)
            .map_err(|_| JriscError::OutOfMemory)?;
        heap.resize(needed, 0);
        &mut heap
    };

    let len = render(inst, flags, RenderTarget::Fill(buf))?;
    out.write_all(&buf[..len - 1])?;
    out.write_all(b"\n")?;
    Ok(())
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        emit(f, self, RenderFlags::empty())
    }
}

/// Decode `bytes` until the first error and render every instruction.
pub fn disassemble(bytes: &[u8], cfg: &DisasmConfig) -> Vec<String> {
    let mut stream = MemoryStream::from_memory(bytes, cfg.base_address());
    JriscDecoder::new(cfg.cpu)
        .iter(&mut stream)
        .map_while(|r| r.ok())
        .map(|inst| render_string(&inst, cfg.flags))
        .collect()
}

struct Counter(usize);

impl fmt::Write for Counter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos + s.len();
        // keep room for the NUL
        if end >= self.buf.len() {
            return Err(fmt::Error);
        }
        self.buf[self.pos..end].copy_from_slice(s.as_bytes());
        self.pos = end;
        Ok(())
    }
}

fn condition_name(cc: u8) -> Option<&'static str> {
    Some(match cc {
        0x01 => "NE",
        0x02 => "EQ",
        0x04 => "CC",
        0x05 => "HI",
        0x08 => "CS",
        0x14 => "PL",
        0x18 => "MI",
        _ => return None,
    })
}

/// Writes one operand; returns whether anything visible was written.
fn emit_operand<W: fmt::Write>(
    w: &mut W,
    op: Operand,
    base: Option<u8>,
    flags: RenderFlags,
    address: u64,
) -> std::result::Result<bool, fmt::Error> {
    match (op, base) {
        (Operand::Reg(r), Some(b)) => write!(w, "(r{b}+r{r})")?,
        (Operand::Reg(r), None) => write!(w, "r{r}")?,
        (Operand::Indirect(r), _) => write!(w, "(r{r})")?,
        // always
        (Operand::Condition(0), _) => return Ok(false),
        (Operand::Condition(cc), _) => match condition_name(cc) {
            Some(name) => w.write_str(name)?,
            None => write!(w, "${cc:x}")?,
        },
        (Operand::UImm(v), Some(b)) => write!(w, "(r{b}+{v})")?,
        (Operand::UImm(v), None) => write!(w, "#{v}")?,
        (Operand::ZUImm(v), _) | (Operand::ShlImm(v), _) => write!(w, "#{v}")?,
        (Operand::SImm(v), _) => write!(w, "#{v}")?,
        (Operand::PcOffset(v), _) => {
            if flags.contains(RenderFlags::ADDRESS) {
                let target = (address as u32).wrapping_add_signed(byte_displacement(v) as i32);
                write!(w, "${target:x}")?
            } else {
                write!(w, "*{:+}", byte_displacement(v))?
            }
        }
        (Operand::Flag(_), _) | (Operand::Unused(_), _) => return Ok(false),
    }
    Ok(true)
}

fn emit<W: fmt::Write>(w: &mut W, inst: &Instruction, flags: RenderFlags) -> fmt::Result {
    let mut first = inst.src;
    let mut second = inst.dst;
    let mut first_base = inst.mnemonic.base_register();
    let mut second_base = None;
    if inst.swap_on_display {
        std::mem::swap(&mut first, &mut second);
        std::mem::swap(&mut first_base, &mut second_base);
    }

    let mut indent = if flags.is_empty() { "\t" } else { "" };

    if flags.contains(RenderFlags::ADDRESS) {
        // addresses are 32 bits wide on the target
        write!(w, "{:08x}:", inst.address as u32)?;
        indent = " ";
    }

    if flags.contains(RenderFlags::MACHINE_CODE) {
        write!(w, "{indent}{:04x}", inst.opcode_word())?;
        indent = "  ";
        if inst.mnemonic.has_long_immediate() {
            write!(
                w,
                " {:04x} {:04x}",
                inst.long_immediate_low(),
                inst.long_immediate_high()
            )?;
        } else {
            w.write_str("          ")?;
        }
    }

    let name = inst.mnemonic.asm_name();
    let bare = matches!(first, Operand::Unused(_)) && matches!(second, Operand::Unused(_));
    if bare {
        write!(w, "{indent}{name}")?;
    } else {
        write!(w, "{indent}{name:<8}")?;
    }

    let visible = match inst.mnemonic {
        Mnemonic::Movei => {
            write!(w, "#${:x}", inst.long_immediate)?;
            true
        }
        Mnemonic::Movepc => {
            w.write_str("PC,")?;
            second = first;
            second_base = first_base;
            false
        }
        _ => emit_operand(w, first, first_base, flags, inst.address)?,
    };

    if visible {
        w.write_str(", ")?;
    }
    emit_operand(w, second, second_base, flags, inst.address)?;
    Ok(())
}
