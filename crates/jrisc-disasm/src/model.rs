use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use jrisc_rs::{
    render_string, AddressableStream, Cpu, FileStream, Instruction, JriscDecoder, RenderFlags,
};

/// A raw machine-code file opened for streaming.
pub struct Input {
    pub stream: FileStream,
    /// File offset of the first byte decoded.
    pub skip: u64,
    pub base: u64,
    /// Bytes available for decoding after `skip`, capped by `len`.
    pub size: u64,
}

pub fn open_input(path: &Path, base: u64, skip: u64, len: Option<u64>) -> Result<Input> {
    let file_len = std::fs::metadata(path)?.len();
    anyhow::ensure!(skip <= file_len, "--skip exceeds file size");
    let mut size = file_len - skip;
    if let Some(lim) = len {
        anyhow::ensure!(lim <= size, "--len exceeds remaining file size after skip");
        size = lim;
    }
    let stream = FileStream::open(path, skip, base)?;
    Ok(Input { stream, skip, base, size })
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingLine {
    pub address: u64,
    pub words: Vec<u16>,
    pub text: String,
    pub instruction: Instruction,
}

/// Where and why decoding stopped early.
#[derive(Debug, Clone, Serialize)]
pub struct Stop {
    pub address: u64,
    /// Offset into the input file.
    pub offset: u64,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Listing {
    pub lines: Vec<ListingLine>,
    pub stop: Option<Stop>,
}

/// Decode `input` front to back, stopping at its end or the first error.
pub fn disassemble_input(input: &mut Input, cpu: Cpu, flags: RenderFlags) -> Listing {
    let (base, skip) = (input.base, input.skip);
    let end = base.wrapping_add(input.size);
    let decoder = JriscDecoder::new(cpu);
    let mut listing = Listing::default();
    if input.size == 0 {
        return listing;
    }

    for res in decoder.iter(&mut input.stream) {
        let stop_at = |address: u64, error: String| Stop {
            address,
            offset: skip + address.wrapping_sub(base),
            error,
        };
        match res {
            Ok(inst) if inst.address.wrapping_add(inst.size()) > end => {
                listing.stop = Some(stop_at(inst.address, "instruction runs past --len".into()));
                break;
            }
            Ok(inst) => {
                listing.lines.push(ListingLine {
                    address: inst.address,
                    words: inst.words(),
                    text: render_string(&inst, flags),
                    instruction: inst,
                });
                if inst.address.wrapping_add(inst.size()) == end {
                    break;
                }
            }
            Err(e) => {
                let address = listing
                    .lines
                    .last()
                    .map(|l| l.address.wrapping_add(l.instruction.size()))
                    .unwrap_or(base);
                // running out of input exactly between instructions is the normal end
                if !(e.is_io() && address == end) {
                    listing.stop = Some(stop_at(address, e.to_string()));
                }
            }
        }
    }
    listing
}

/// Parse a hex (`0x` prefixed) or decimal number.
pub fn parse_u64(s: &str) -> Result<u64> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u64::from_str_radix(hex, 16)?)
    } else if let Some(hex) = s.strip_prefix('$') {
        Ok(u64::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u64>()?)
    }
}
