//! Decoder, encoder and renderer for the Atari Jaguar GPU/DSP RISC
//! instruction set.

pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod error;
pub mod field;
pub mod file;
pub mod instructions;
pub mod memory;
pub mod stream;

pub use cpu::{Cpu, CpuAffinity, DisasmConfig, DSP_RAM, GPU_RAM};
pub use decoder::{decode, decode_word, encode, Decoder, Instruction, Instructions, JriscDecoder};
pub use disasm::{disassemble, print_instruction, render, render_string, RenderFlags, RenderTarget};
pub use error::{JriscError, Result};
pub use field::{FieldKind, Operand};
pub use file::{FileBacking, FileStream};
pub use instructions::{find_first, Mnemonic, OpcodeEntry, OPCODE_TABLE};
pub use memory::{MemoryBacking, MemoryStream};
pub use stream::{AddressableStream, Backing, Stream};
