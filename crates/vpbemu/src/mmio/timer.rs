//! SP804 dual timer model (timer 0 only).
//!
//! The counter decrements once per emulated tick while the run bit is set.
//! Reaching zero latches the raw interrupt. In one-shot mode the counter
//! then halts at zero until it is reloaded or re-enabled; otherwise it
//! reloads from the load register (periodic) or wraps (free-running).
//!
//! # References
//! - [SP804 TRM](https://developer.arm.com/documentation/ddi0271/latest/)

use tracing::{debug, instrument, trace, warn};
use unicorn_engine::Unicorn;
use versatilepb_hw::mmio::timer::{control, registers as hw_regs};

const fn bit(n: u32) -> u32 {
    1 << n
}

#[derive(Debug)]
pub struct TimerState {
    pub load: u32,
    pub value: u32,
    pub control: u32,
    pub raw_interrupt: bool,
    /// One-shot counter sitting at zero after expiry
    halted: bool,
    /// Number of times the counter reached zero
    pub expirations: u64,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerState {
    pub fn new() -> Self {
        Self {
            load: 0,
            value: u32::MAX,
            control: control::RESET_VALUE,
            raw_interrupt: false,
            halted: false,
            expirations: 0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.control & bit(control::ENABLE) != 0
    }

    pub fn oneshot(&self) -> bool {
        self.control & bit(control::ONESHOT) != 0
    }

    pub fn periodic(&self) -> bool {
        self.control & bit(control::PERIODIC) != 0
    }

    fn width_mask(&self) -> u32 {
        if self.control & bit(control::SIZE_32) != 0 {
            u32::MAX
        } else {
            0xFFFF
        }
    }

    /// Value of the masked interrupt status register
    pub fn masked_status(&self) -> u32 {
        u32::from(self.raw_interrupt && self.control & bit(control::INT_ENABLE) != 0)
    }

    /// Level of the interrupt line towards the VIC
    pub fn interrupt(&self) -> bool {
        self.masked_status() != 0
    }

    pub fn write(&mut self, offset: u32, _size: usize, value: u32) {
        trace!(
            "Timer register write: offset={:#X}, value={:#X}",
            offset, value
        );

        match offset {
            hw_regs::LOAD => {
                self.load = value;
                self.value = value & self.width_mask();
                self.halted = false;
                debug!("Timer load: {:#X}", value);
            }
            hw_regs::CONTROL => {
                let was_enabled = self.enabled();
                self.control = value;
                if !was_enabled && self.enabled() {
                    if self.value == 0 {
                        self.value = self.load & self.width_mask();
                    }
                    self.halted = false;
                    debug!("Timer armed: value={:#X}, control={:#X}", self.value, value);
                } else if was_enabled && !self.enabled() {
                    debug!("Timer disarmed: value={:#X}", self.value);
                }
            }
            hw_regs::INTCLR => {
                self.raw_interrupt = false;
                trace!("Timer interrupt cleared");
            }
            hw_regs::BGLOAD => {
                self.load = value;
            }
            _ => {
                warn!(
                    "Unknown or read-only timer register write: offset={:#X}, value={:#X}",
                    offset, value
                );
            }
        }
    }

    pub fn read(&self, offset: u32, _size: usize) -> u32 {
        trace!("Timer register read: offset={:#X}", offset);

        match offset {
            hw_regs::LOAD | hw_regs::BGLOAD => self.load,
            hw_regs::VALUE => self.value,
            hw_regs::CONTROL => self.control,
            hw_regs::RIS => u32::from(self.raw_interrupt),
            hw_regs::MIS => self.masked_status(),
            _ => {
                warn!("Unknown or write-only timer register read: offset={:#X}", offset);
                0
            }
        }
    }

    /// Advance the counter by `ticks`.
    pub fn tick(&mut self, ticks: u64) {
        if !self.enabled() || self.halted {
            return;
        }

        let mut remaining = ticks;
        while remaining > 0 {
            if u64::from(self.value) > remaining {
                self.value -= remaining as u32;
                return;
            }
            remaining -= u64::from(self.value);
            self.expire();

            if self.oneshot() {
                self.value = 0;
                self.halted = true;
                return;
            }

            let reload = if self.periodic() {
                self.load & self.width_mask()
            } else {
                self.width_mask()
            };
            if reload == 0 {
                self.value = 0;
                return;
            }
            self.value = reload;
        }
    }

    fn expire(&mut self) {
        self.raw_interrupt = true;
        self.expirations += 1;
        debug!("Timer expired (#{})", self.expirations);
    }
}

// ============================================================================
// Unicorn MMIO Adapters
// ============================================================================

#[instrument(level = "trace", skip(uc))]
pub fn read_handler(uc: &mut Unicorn<'_, super::EmulatorState>, addr: u64, size: usize) -> u64 {
    uc.get_data().timer.read(addr as u32, size) as u64
}

#[instrument(level = "trace", skip(uc))]
pub fn write_handler(
    uc: &mut Unicorn<'_, super::EmulatorState>,
    addr: u64,
    size: usize,
    value: u64,
) {
    uc.get_data_mut().timer.write(addr as u32, size, value as u32);
}
