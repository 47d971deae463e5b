//! PL011 UART model.
//!
//! Transmit only: every byte written to the data register is kept, and each
//! completed line is logged. The transmitter is always ready, so the flag
//! register permanently reports empty FIFOs.

use tracing::{info, instrument, trace, warn};
use unicorn_engine::Unicorn;
use versatilepb_hw::mmio::uart::{flags, registers as hw_regs};

#[derive(Debug, Default)]
pub struct UartState {
    pub int_mask: u32,
    /// Every byte transmitted since reset
    pub transmitted: Vec<u8>,
    line: Vec<u8>,
}

impl UartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything transmitted so far, lossily decoded
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.transmitted).into_owned()
    }

    pub fn write(&mut self, offset: u32, _size: usize, value: u32) {
        match offset {
            hw_regs::DR => self.transmit(value as u8),
            hw_regs::IMSC => {
                self.int_mask = value;
                trace!("UART interrupt mask: {:#X}", value);
            }
            _ => {
                warn!(
                    "Unknown UART register write: offset={:#X}, value={:#X}",
                    offset, value
                );
            }
        }
    }

    pub fn read(&self, offset: u32, _size: usize) -> u32 {
        match offset {
            hw_regs::DR => 0,
            hw_regs::FR => flags::TXFE | flags::RXFE,
            hw_regs::IMSC => self.int_mask,
            _ => {
                warn!("Unknown UART register read: offset={:#X}", offset);
                0
            }
        }
    }

    fn transmit(&mut self, byte: u8) {
        self.transmitted.push(byte);
        if byte == b'\n' {
            info!(target: "uart", "{}", String::from_utf8_lossy(&self.line));
            self.line.clear();
        } else {
            self.line.push(byte);
        }
    }
}

// ============================================================================
// Unicorn MMIO Adapters
// ============================================================================

#[instrument(level = "trace", skip(uc))]
pub fn read_handler(uc: &mut Unicorn<'_, super::EmulatorState>, addr: u64, size: usize) -> u64 {
    uc.get_data().uart.read(addr as u32, size) as u64
}

#[instrument(level = "trace", skip(uc))]
pub fn write_handler(
    uc: &mut Unicorn<'_, super::EmulatorState>,
    addr: u64,
    size: usize,
    value: u64,
) {
    uc.get_data_mut().uart.write(addr as u32, size, value as u32);
}
