//! PL061 GPIO model (block 0).
//!
//! Pin levels are the output latch for pins configured as outputs and the
//! externally driven level for inputs. Data accesses go through the masked
//! window: address bits [9:2] select the pins a read returns or a write
//! changes. Edge detection runs whenever a level changes, whichever side
//! changed it.
//!
//! # References
//! - [PL061 TRM](https://developer.arm.com/documentation/ddi0190/latest/)

use tracing::{debug, info, instrument, trace, warn};
use unicorn_engine::Unicorn;
use versatilepb_hw::mmio::gpio::{self as hw, registers as hw_regs};
use versatilepb_hw::pins;

const PIN_MASK: u32 = (1 << hw::PIN_COUNT) - 1;

#[derive(Debug, Default)]
pub struct GpioState {
    /// Output latch
    pub data: u32,
    /// Levels driven onto the pins from outside the chip
    pub inputs: u32,
    pub dir: u32,
    pub sense: u32,
    pub both_edges: u32,
    pub event: u32,
    pub int_enable: u32,
    pub raw_status: u32,
    /// Output pin level changes seen so far
    pub output_toggles: u64,
    /// Mirror the start-signal output onto the trigger input
    loopback: bool,
}

impl GpioState {
    pub fn new(loopback: bool) -> Self {
        Self {
            loopback,
            ..Self::default()
        }
    }

    /// Current level of every pin
    pub fn levels(&self) -> u32 {
        ((self.data & self.dir) | (self.inputs & !self.dir)) & PIN_MASK
    }

    pub fn level(&self, pin: u32) -> bool {
        self.levels() & (1 << pin) != 0
    }

    pub fn masked_status(&self) -> u32 {
        self.raw_status & self.int_enable
    }

    /// Level of the interrupt line towards the VIC
    pub fn interrupt(&self) -> bool {
        self.masked_status() != 0
    }

    /// Drive an input pin from outside. Has no visible effect on pins
    /// configured as outputs until they are switched to inputs.
    pub fn drive_input(&mut self, pin: u32, high: bool) {
        let before = self.levels();
        if high {
            self.inputs |= 1 << pin;
        } else {
            self.inputs &= !(1 << pin);
        }
        trace!("GPIO pin {} driven {}", pin, if high { "high" } else { "low" });
        self.levels_changed(before);
    }

    pub fn write(&mut self, offset: u32, _size: usize, value: u32) {
        trace!(
            "GPIO register write: offset={:#X}, value={:#X}",
            offset, value
        );

        let before = self.levels();
        match offset {
            o if o < hw_regs::DATA_WINDOW_END => {
                let mask = hw::data_mask(o);
                self.data = (self.data & !mask) | (value & mask);
            }
            hw_regs::DIR => {
                self.dir = value & PIN_MASK;
                debug!("GPIO direction: {:#010b}", self.dir);
            }
            hw_regs::IS => self.sense = value & PIN_MASK,
            hw_regs::IBE => self.both_edges = value & PIN_MASK,
            hw_regs::IEV => self.event = value & PIN_MASK,
            hw_regs::IE => {
                self.int_enable = value & PIN_MASK;
                debug!("GPIO interrupt enable: {:#010b}", self.int_enable);
            }
            hw_regs::IC => {
                self.raw_status &= !value;
                trace!("GPIO interrupt clear: {:#010b}", value);
            }
            _ => {
                warn!(
                    "Unknown or read-only GPIO register write: offset={:#X}, value={:#X}",
                    offset, value
                );
                return;
            }
        }
        self.levels_changed(before);
    }

    pub fn read(&self, offset: u32, _size: usize) -> u32 {
        trace!("GPIO register read: offset={:#X}", offset);

        match offset {
            o if o < hw_regs::DATA_WINDOW_END => self.levels() & hw::data_mask(o),
            hw_regs::DIR => self.dir,
            hw_regs::IS => self.sense,
            hw_regs::IBE => self.both_edges,
            hw_regs::IEV => self.event,
            hw_regs::IE => self.int_enable,
            hw_regs::RIS => self.raw_status,
            hw_regs::MIS => self.masked_status(),
            _ => {
                warn!("Unknown or write-only GPIO register read: offset={:#X}", offset);
                0
            }
        }
    }

    fn levels_changed(&mut self, before: u32) {
        if self.loopback {
            let start = self.data & self.dir & (1 << pins::START_SIGNAL) != 0;
            if start {
                self.inputs |= 1 << pins::TRIGGER;
            } else {
                self.inputs &= !(1 << pins::TRIGGER);
            }
        }

        let after = self.levels();
        let changed = before ^ after;
        if changed == 0 {
            self.update_level_interrupts(after);
            return;
        }

        if changed & (1 << pins::OUTPUT) != 0 {
            self.output_toggles += 1;
            info!(
                "Output pin {} (toggle #{})",
                if after & (1 << pins::OUTPUT) != 0 { "high" } else { "low" },
                self.output_toggles
            );
        }
        if changed & (1 << pins::START_SIGNAL) != 0 {
            debug!("Start signal {}", if after & (1 << pins::START_SIGNAL) != 0 { "high" } else { "low" });
        }

        let rising = !before & after;
        let falling = before & !after;
        let single = (rising & self.event) | (falling & !self.event);
        let edges = (single & !self.both_edges) | ((rising | falling) & self.both_edges);
        let detected = edges & !self.sense & !self.dir;
        if detected != 0 {
            self.raw_status |= detected;
            debug!("GPIO edge detected: {:#010b}", detected);
        }

        self.update_level_interrupts(after);
    }

    fn update_level_interrupts(&mut self, levels: u32) {
        let matching = !(levels ^ self.event) & PIN_MASK;
        self.raw_status = (self.raw_status & !self.sense) | (matching & self.sense & !self.dir);
    }
}

// ============================================================================
// Unicorn MMIO Adapters
// ============================================================================

#[instrument(level = "trace", skip(uc))]
pub fn read_handler(uc: &mut Unicorn<'_, super::EmulatorState>, addr: u64, size: usize) -> u64 {
    uc.get_data().gpio.read(addr as u32, size) as u64
}

#[instrument(level = "trace", skip(uc))]
pub fn write_handler(
    uc: &mut Unicorn<'_, super::EmulatorState>,
    addr: u64,
    size: usize,
    value: u64,
) {
    uc.get_data_mut().gpio.write(addr as u32, size, value as u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: u32 = 1 << pins::OUTPUT;
    const TRIGGER: u32 = 1 << pins::TRIGGER;
    const START: u32 = 1 << pins::START_SIGNAL;

    /// GPIO as the firmware leaves it after bring-up, minus the start signal
    fn configured(loopback: bool) -> GpioState {
        let mut gpio = GpioState::new(loopback);
        gpio.write(hw_regs::DIR, 4, OUTPUT | START);
        gpio.write(hw_regs::IEV, 4, TRIGGER);
        gpio.write(hw_regs::IE, 4, TRIGGER);
        gpio
    }

    #[test]
    fn data_window_masks_by_address() {
        let mut gpio = configured(false);
        gpio.write(hw::data_offset(START), 4, 0xFF);

        assert_eq!(gpio.levels(), START);
        assert_eq!(gpio.read(hw::data_offset(OUTPUT), 4), 0);
        assert_eq!(gpio.read(hw::data_offset(START), 4), START);
        assert_eq!(gpio.read(hw::data_offset(0xFF), 4), START);
    }

    #[test]
    fn rising_edge_on_trigger_latches_interrupt() {
        let mut gpio = configured(false);
        gpio.drive_input(pins::TRIGGER, true);

        assert_eq!(gpio.masked_status(), TRIGGER);
        assert!(gpio.interrupt());
    }

    #[test]
    fn falling_edge_is_ignored_for_rising_config() {
        let mut gpio = configured(false);
        gpio.drive_input(pins::TRIGGER, true);
        gpio.write(hw_regs::IC, 4, TRIGGER);

        gpio.drive_input(pins::TRIGGER, false);
        assert_eq!(gpio.masked_status(), 0);
    }

    #[test]
    fn clear_is_write_one_to_clear() {
        let mut gpio = configured(false);
        gpio.write(hw_regs::IE, 4, TRIGGER | 1 << 3);
        gpio.drive_input(pins::TRIGGER, true);
        gpio.write(hw_regs::IEV, 4, TRIGGER | 1 << 3);
        gpio.drive_input(3, true);
        assert_eq!(gpio.masked_status(), TRIGGER | 1 << 3);

        gpio.write(hw_regs::IC, 4, TRIGGER);
        assert_eq!(gpio.masked_status(), 1 << 3);
    }

    #[test]
    fn output_pins_do_not_see_external_drive() {
        let mut gpio = configured(false);
        gpio.drive_input(pins::OUTPUT, true);
        assert!(!gpio.level(pins::OUTPUT));
        assert_eq!(gpio.raw_status, 0);
    }

    #[test]
    fn output_toggles_are_counted() {
        let mut gpio = configured(false);
        let window = hw::data_offset(OUTPUT);
        gpio.write(window, 4, OUTPUT);
        gpio.write(window, 4, OUTPUT);
        gpio.write(window, 4, 0);

        assert_eq!(gpio.output_toggles, 2);
    }

    #[test]
    fn loopback_turns_start_signal_into_trigger_edge() {
        let mut gpio = configured(true);
        gpio.write(hw::data_offset(START), 4, START);

        assert!(gpio.level(pins::TRIGGER));
        assert_eq!(gpio.masked_status(), TRIGGER);
    }

    #[test]
    fn level_sensitive_pins_track_the_level() {
        let mut gpio = GpioState::new(false);
        gpio.write(hw_regs::IS, 4, TRIGGER);
        gpio.write(hw_regs::IEV, 4, TRIGGER);
        gpio.write(hw_regs::IE, 4, TRIGGER);

        gpio.drive_input(pins::TRIGGER, true);
        assert_eq!(gpio.masked_status(), TRIGGER);

        gpio.drive_input(pins::TRIGGER, false);
        assert_eq!(gpio.masked_status(), 0);
    }
}
