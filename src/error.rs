use std::io;

use crate::cpu::Cpu;
use crate::field::FieldKind;

/// Everything the decoder, encoder, streams and renderer can fail with.
#[derive(thiserror::Error, Debug)]
pub enum JriscError {
    #[error("out of memory")]
    OutOfMemory,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid {kind:?} field value {raw:#04x}")]
    InvalidValue { kind: FieldKind, raw: u8 },
    #[error("invalid register r{0}")]
    InvalidRegister(u8),
    #[error("invalid operand field kind {0}")]
    InvalidFieldKind(u8),
    #[error("invalid opcode {opcode} (src field {src:#04x}) for {cpu} at {address:#010x}")]
    InvalidOpcode {
        opcode: u8,
        src: u8,
        cpu: Cpu,
        address: u64,
    },
    #[error("render buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

impl JriscError {
    /// Short or out-of-range transfer on a backing medium.
    pub(crate) fn short_transfer(what: &str, location: u64, size: usize) -> Self {
        JriscError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("{what} of {size} bytes at {location:#x} out of range"),
        ))
    }

    pub fn is_io(&self) -> bool {
        matches!(self, JriscError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, JriscError>;
