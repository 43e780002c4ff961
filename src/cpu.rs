use std::fmt;

use serde::{Deserialize, Serialize};

use crate::disasm::RenderFlags;

/// GPU local RAM, where GPU code is normally loaded and run.
pub const GPU_RAM: u64 = 0x00F0_3000;
/// DSP local RAM.
pub const DSP_RAM: u64 = 0x00F1_B000;

/// The processor a decode request is made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cpu {
    Gpu,
    Dsp,
}

impl Cpu {
    pub fn local_ram_base(self) -> u64 {
        match self {
            Cpu::Gpu => GPU_RAM,
            Cpu::Dsp => DSP_RAM,
        }
    }
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cpu::Gpu => f.write_str("GPU"),
            Cpu::Dsp => f.write_str("DSP"),
        }
    }
}

/// Which processors an opcode table row applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CpuAffinity {
    Either,
    Dsp,
    Gpu,
}

impl CpuAffinity {
    pub fn accepts(self, cpu: Cpu) -> bool {
        match self {
            CpuAffinity::Either => true,
            CpuAffinity::Dsp => cpu == Cpu::Dsp,
            CpuAffinity::Gpu => cpu == Cpu::Gpu,
        }
    }
}

/// Settings for disassembling a whole buffer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DisasmConfig {
    pub cpu: Cpu,
    /// Logical address of the first byte; `None` picks the CPU's local RAM.
    pub base: Option<u64>,
    pub flags: RenderFlags,
}

impl DisasmConfig {
    pub fn base_address(&self) -> u64 {
        self.base.unwrap_or_else(|| self.cpu.local_ram_base())
    }
}

impl Default for DisasmConfig {
    fn default() -> Self {
        Self {
            cpu: Cpu::Gpu,
            base: None,
            flags: RenderFlags::ADDRESS | RenderFlags::MACHINE_CODE,
        }
    }
}
