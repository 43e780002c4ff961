use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use std::fmt::Write as _;
use std::path::PathBuf;

use jrisc_disasm::{disassemble_input, open_input, parse_u64, Listing};
use jrisc_rs::{Cpu, DisasmConfig, RenderFlags};

#[derive(Parser, Debug)]
#[command(author, version, about = "Jaguar GPU/DSP disassembler", long_about = None)]
struct Cli {
    /// Raw machine-code file
    #[arg(value_name = "BINFILE")]
    input: PathBuf,
    /// Address of the first decoded byte (hex or dec; default: CPU local RAM)
    #[arg(long, value_parser = parse_u64)]
    base: Option<u64>,
    /// Decode for the DSP instead of the GPU
    #[arg(long)]
    dsp: bool,
    /// Skip N bytes at start of file
    #[arg(long, default_value = "0", value_parser = parse_u64)]
    skip: u64,
    /// Limit bytes decoded (default: to EOF after --skip)
    #[arg(long, value_parser = parse_u64)]
    len: Option<u64>,
    /// Show instruction words
    #[arg(long)]
    show_bytes: bool,
    /// Omit the address column
    #[arg(long)]
    no_address: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write output to file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    fn config(&self) -> DisasmConfig {
        let mut flags = RenderFlags::empty();
        flags.set(RenderFlags::ADDRESS, !self.no_address);
        flags.set(RenderFlags::MACHINE_CODE, self.show_bytes);
        DisasmConfig {
            cpu: if self.dsp { Cpu::Dsp } else { Cpu::Gpu },
            base: self.base,
            flags,
        }
    }
}

fn format_text(listing: &Listing) -> String {
    let mut buf = String::new();
    for line in &listing.lines {
        let _ = writeln!(buf, "{}", line.text);
    }
    buf
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = cli.config();
    let base = cfg.base_address();
    info!(cpu = %cfg.cpu, base, skip = cli.skip, "disassembling {}", cli.input.display());

    let mut input = open_input(&cli.input, base, cli.skip, cli.len)?;
    let listing = disassemble_input(&mut input, cfg.cpu, cfg.flags);
    if let Some(stop) = &listing.stop {
        warn!(
            offset = stop.offset,
            address = stop.address,
            "stopped at byte offset {:#x}: {}",
            stop.offset,
            stop.error
        );
    }

    let text = match cli.format {
        OutputFormat::Text => format_text(&listing),
        OutputFormat::Json => serde_json::to_string_pretty(&listing.lines)? + "\n",
    };
    if let Some(path) = cli.out {
        std::fs::write(path, text)?;
    } else {
        print!("{text}");
    }
    Ok(())
}
