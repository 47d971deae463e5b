//! PL190 vectored interrupt controller model.
//!
//! Only the non-vectored IRQ path is modelled: a line raises the core's IRQ
//! input while it is asserted by its peripheral, enabled, and not steered to
//! FIQ. Peripheral lines are level sensitive, so the status registers are
//! computed from the peripherals on every read instead of being latched.
//!
//! # References
//! - [PL190 TRM](https://developer.arm.com/documentation/ddi0181/latest/)

use tracing::{debug, instrument, trace, warn};
use unicorn_engine::Unicorn;
use versatilepb_hw::mmio::vic::registers as hw_regs;

#[derive(Debug, Default)]
pub struct VicState {
    pub enable: u32,
    pub select: u32,
    pub soft: u32,
}

impl VicState {
    pub fn new() -> Self {
        Self::default()
    }

    fn asserted(&self, raw: u32) -> u32 {
        (raw | self.soft) & self.enable
    }

    pub fn irq_status(&self, raw: u32) -> u32 {
        self.asserted(raw) & !self.select
    }

    pub fn fiq_status(&self, raw: u32) -> u32 {
        self.asserted(raw) & self.select
    }

    /// `raw` is the current level of every peripheral line.
    pub fn read(&self, offset: u32, _size: usize, raw: u32) -> u32 {
        trace!("VIC register read: offset={:#X}", offset);

        match offset {
            hw_regs::IRQ_STATUS => self.irq_status(raw),
            hw_regs::FIQ_STATUS => self.fiq_status(raw),
            hw_regs::RAW_INTR => raw | self.soft,
            hw_regs::INT_SELECT => self.select,
            hw_regs::INT_ENABLE => self.enable,
            hw_regs::SOFT_INT => self.soft,
            _ => {
                warn!("Unknown VIC register read: offset={:#X}", offset);
                0
            }
        }
    }

    pub fn write(&mut self, offset: u32, _size: usize, value: u32) {
        trace!(
            "VIC register write: offset={:#X}, value={:#X}",
            offset, value
        );

        match offset {
            hw_regs::INT_ENABLE => {
                self.enable |= value;
                debug!("VIC lines enabled: {:#010X}", self.enable);
            }
            hw_regs::INT_EN_CLEAR => {
                self.enable &= !value;
                debug!("VIC lines enabled: {:#010X}", self.enable);
            }
            hw_regs::INT_SELECT => self.select = value,
            hw_regs::SOFT_INT => self.soft |= value,
            hw_regs::SOFT_INT_CLEAR => self.soft &= !value,
            _ => {
                warn!(
                    "Unknown VIC register write: offset={:#X}, value={:#X}",
                    offset, value
                );
            }
        }
    }
}

// ============================================================================
// Unicorn MMIO Adapters
// ============================================================================

#[instrument(level = "trace", skip(uc))]
pub fn read_handler(uc: &mut Unicorn<'_, super::EmulatorState>, addr: u64, size: usize) -> u64 {
    let state = uc.get_data();
    state.vic.read(addr as u32, size, state.raw_lines()) as u64
}

#[instrument(level = "trace", skip(uc))]
pub fn write_handler(
    uc: &mut Unicorn<'_, super::EmulatorState>,
    addr: u64,
    size: usize,
    value: u64,
) {
    uc.get_data_mut().vic.write(addr as u32, size, value as u32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use versatilepb_hw::mmio::vic::lines;

    const TIMER: u32 = 1 << lines::TIMER01;
    const GPIO: u32 = 1 << lines::GPIO0;

    #[test]
    fn disabled_lines_do_not_raise_irq() {
        let vic = VicState::new();
        assert_eq!(vic.irq_status(TIMER | GPIO), 0);
        assert_eq!(vic.read(hw_regs::RAW_INTR, 4, TIMER), TIMER);
    }

    #[test]
    fn enable_is_cumulative_and_readable() {
        let mut vic = VicState::new();
        vic.write(hw_regs::INT_ENABLE, 4, TIMER);
        vic.write(hw_regs::INT_ENABLE, 4, GPIO);

        assert_eq!(vic.read(hw_regs::INT_ENABLE, 4, 0), TIMER | GPIO);
        assert_eq!(vic.irq_status(GPIO), GPIO);
    }

    #[test]
    fn enable_clear_masks_a_line() {
        let mut vic = VicState::new();
        vic.write(hw_regs::INT_ENABLE, 4, TIMER | GPIO);
        vic.write(hw_regs::INT_EN_CLEAR, 4, TIMER);

        assert_eq!(vic.irq_status(TIMER | GPIO), GPIO);
    }

    #[test]
    fn selected_lines_go_to_fiq() {
        let mut vic = VicState::new();
        vic.write(hw_regs::INT_ENABLE, 4, TIMER);
        vic.write(hw_regs::INT_SELECT, 4, TIMER);

        assert_eq!(vic.irq_status(TIMER), 0);
        assert_eq!(vic.fiq_status(TIMER), TIMER);
    }
}
