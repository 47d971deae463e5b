//! Memory setup for the Versatile/PB926EJ-S.
//!
//! RAM starts at address 0, so the exception vectors the firmware relocates
//! there are ordinary writable memory. The four peripheral blocks the
//! firmware uses get their models; everything else stays unmapped so a stray
//! access faults instead of silently succeeding.

use crate::image::Image;
use crate::mmio;
use tracing::debug;
use unicorn_engine::{Unicorn, unicorn_const::Prot};
use versatilepb_hw::memory_map::{peripherals, ram};

pub const RAM_BASE: u32 = ram::BASE;
pub const RAM_SIZE: usize = ram::SIZE;

type ReadHandler = fn(&mut Unicorn<'_, mmio::EmulatorState>, u64, usize) -> u64;
type WriteHandler = fn(&mut Unicorn<'_, mmio::EmulatorState>, u64, usize, u64);

/// Modelled peripheral blocks: name, base and handlers
const PERIPHERALS: [(&str, u32, ReadHandler, WriteHandler); 4] = [
    (
        "VIC",
        peripherals::VIC,
        mmio::vic::read_handler,
        mmio::vic::write_handler,
    ),
    (
        "Timer 0/1",
        peripherals::TIMER0,
        mmio::timer::read_handler,
        mmio::timer::write_handler,
    ),
    (
        "GPIO 0",
        peripherals::GPIO0,
        mmio::gpio::read_handler,
        mmio::gpio::write_handler,
    ),
    (
        "UART 0",
        peripherals::UART0,
        mmio::uart::read_handler,
        mmio::uart::write_handler,
    ),
];

/// Set up the board memory map
pub fn setup_memory(emu: &mut Unicorn<mmio::EmulatorState>) -> Result<(), String> {
    debug!(
        "  Mapping RAM at {:#X} ({}MB)",
        RAM_BASE,
        RAM_SIZE / (1024 * 1024)
    );
    emu.mem_map(RAM_BASE as u64, RAM_SIZE as u64, Prot::ALL)
        .map_err(|e| format!("Failed to map RAM: {:?}", e))?;

    for (name, base, read, write) in PERIPHERALS {
        debug!(
            "  Mapping {} MMIO region {:#X} - {:#X}",
            name,
            base,
            base as usize + peripherals::BLOCK_SIZE
        );
        emu.mmio_map(
            base as u64,
            peripherals::BLOCK_SIZE as u64,
            Some(read),
            Some(write),
        )
        .map_err(|e| format!("Failed to map {} MMIO region: {:?}", name, e))?;
    }

    Ok(())
}

/// Copy the image into RAM
pub fn load_image(emu: &mut Unicorn<mmio::EmulatorState>, image: &Image) -> Result<(), String> {
    debug!(
        "  Image: {:#X} - {:#X} ({:#X} bytes), entry={:#X}",
        image.load_address,
        image.end(),
        image.data.len(),
        image.entry
    );
    emu.mem_write(image.load_address as u64, image.data)
        .map_err(|e| format!("Failed to write image: {:?}", e))
}
