use crate::{EmulatorConfig, StimulusConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
pub struct Args {
    /// Path to the raw firmware image (e.g. produced with `objcopy -O binary`)
    pub image: PathBuf,

    /// Load the image at this address (hex: 0x1234 or decimal: 1234)
    #[arg(long, value_parser = parse_hex_or_dec)]
    pub load_addr: Option<u64>,

    /// Start executing at this address instead of the load address
    #[arg(long, value_parser = parse_hex_or_dec)]
    pub entry: Option<u64>,

    /// Stop when the core reaches this PC (hex: 0x1234 or decimal: 1234)
    #[arg(long, value_parser = parse_hex_or_dec)]
    pub stop_pc: Option<u64>,

    /// Stop after this many cycles (time parked in wait-for-interrupt counts)
    #[arg(long, short = 'i')]
    pub max_instructions: Option<u64>,

    /// Give up after this many milliseconds of wall-clock time
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Stop once the output pin has toggled this many times
    #[arg(long)]
    pub expect_toggles: Option<u64>,

    /// Wire the start-signal pin back to the trigger pin
    #[arg(long)]
    pub loopback: bool,

    /// Pulse the trigger pin every N cycles
    #[arg(long)]
    pub trigger_period: Option<u64>,
}

impl Args {
    /// Validate that the arguments are consistent
    pub fn validate(&self) -> Result<(), String> {
        for (flag, value) in [("--load-addr", self.load_addr), ("--entry", self.entry)] {
            if let Some(addr) = value
                && addr > u32::MAX as u64
            {
                return Err(format!("{} {:#X} is not a 32-bit address", flag, addr));
            }
        }
        if self.trigger_period == Some(0) {
            return Err("--trigger-period must be non-zero".to_string());
        }
        Ok(())
    }

    /// Convert Args to EmulatorConfig
    pub fn to_emulator_config(&self) -> EmulatorConfig {
        EmulatorConfig {
            load_address: self.load_addr.map(|v| v as u32),
            entry: self.entry.map(|v| v as u32),
            stop_pc: self.stop_pc,
            max_instructions: self.max_instructions.map(|v| v as usize),
            timeout_ms: self.timeout_ms,
            expect_toggles: self.expect_toggles,
            stimulus: StimulusConfig {
                loopback: self.loopback,
                trigger_period: self.trigger_period,
            },
        }
    }
}

pub fn parse_hex_or_dec(s: &str) -> Result<u64, std::num::ParseIntError> {
    if let Some(hex) = s.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else {
        s.parse()
    }
}

/// Load the firmware image from the filesystem
pub fn load_image_data(args: &Args) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    use tracing::info;

    info!("Loading image from file: {:?}", args.image);
    let data = std::fs::read(&args.image)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal() {
        assert_eq!(parse_hex_or_dec("0x10000"), Ok(0x10000));
        assert_eq!(parse_hex_or_dec("65536"), Ok(0x10000));
        assert!(parse_hex_or_dec("0xZZ").is_err());
    }

    #[test]
    fn builds_config_from_flags() {
        let args = Args::parse_from([
            "vpbemu-cli",
            "irq_in.bin",
            "--load-addr",
            "0x8000",
            "--expect-toggles",
            "4",
            "--loopback",
            "--trigger-period",
            "20000",
        ]);
        assert!(args.validate().is_ok());

        let config = args.to_emulator_config();
        assert_eq!(config.load_address, Some(0x8000));
        assert_eq!(config.entry, None);
        assert_eq!(config.expect_toggles, Some(4));
        assert!(config.stimulus.loopback);
        assert_eq!(config.stimulus.trigger_period, Some(20000));
    }

    #[test]
    fn rejects_out_of_range_load_address() {
        let args = Args::parse_from(["vpbemu-cli", "irq_in.bin", "--load-addr", "0x100000000"]);
        assert!(args.validate().is_err());
    }
}
