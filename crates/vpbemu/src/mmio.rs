//! Memory-mapped I/O models for the Versatile/PB926EJ-S.
//!
//! Each block the firmware touches has a model with its register state;
//! the Unicorn read/write adapters in each module forward offsets into the
//! shared [`EmulatorState`].
//!
//! # Memory Map
//! - `0x10140000`: VIC (PL190)
//! - `0x101E2000`: Timer 0/1 (SP804)
//! - `0x101E4000`: GPIO 0 (PL061)
//! - `0x101F1000`: UART 0 (PL011)

use crate::cpu_types::Exception;
use crate::stimulus::StimulusConfig;
use versatilepb_hw::mmio::vic::lines;

pub mod gpio;
pub mod timer;
pub mod uart;
pub mod vic;

// Re-export types for convenience
pub use gpio::GpioState;
pub use timer::TimerState;
pub use uart::UartState;
pub use vic::VicState;

/// Core state that is not a register: what the CPU hooks observe.
#[derive(Debug, Default)]
pub struct CpuState {
    /// Parked in wait-for-interrupt
    pub waiting: bool,
    /// Instructions executed since reset
    pub instructions: u64,
    /// Emulated time in timer ticks (one per instruction, plus idle time)
    pub ticks: u64,
    /// Address of the instruction most recently started
    pub last_insn: u64,
    /// Exception raised during the current quantum, and its instruction
    pub exception: Option<(Exception, u64)>,
    /// Interrupt number Unicorn reported that has no ARM exception
    pub unknown_interrupt: Option<u32>,
}

/// Shared emulator state accessible from MMIO callbacks and main loop
#[derive(Debug)]
pub struct EmulatorState {
    pub uart: UartState,
    pub timer: TimerState,
    pub gpio: GpioState,
    pub vic: VicState,
    pub cpu: CpuState,
}

impl EmulatorState {
    pub fn new(stimulus: &StimulusConfig) -> Self {
        Self {
            uart: UartState::new(),
            timer: TimerState::new(),
            gpio: GpioState::new(stimulus.loopback),
            vic: VicState::new(),
            cpu: CpuState::default(),
        }
    }

    /// Level of every peripheral line into the VIC
    pub fn raw_lines(&self) -> u32 {
        let mut raw = 0;
        if self.timer.interrupt() {
            raw |= 1 << lines::TIMER01;
        }
        if self.gpio.interrupt() {
            raw |= 1 << lines::GPIO0;
        }
        raw
    }

    /// Whether the core's IRQ input is asserted
    pub fn irq_asserted(&self) -> bool {
        self.vic.irq_status(self.raw_lines()) != 0
    }

    /// Whether the core's FIQ input is asserted
    pub fn fiq_asserted(&self) -> bool {
        self.vic.fiq_status(self.raw_lines()) != 0
    }

    /// Let `ticks` of emulated time pass.
    pub fn advance(&mut self, ticks: u64) {
        self.cpu.ticks += ticks;
        self.timer.tick(ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use versatilepb_hw::mmio::{gpio as hw_gpio, timer as hw_timer, vic as hw_vic};
    use versatilepb_hw::pins;

    fn board(loopback: bool) -> EmulatorState {
        let mut state = EmulatorState::new(&StimulusConfig {
            loopback,
            ..Default::default()
        });
        state.vic.write(hw_vic::registers::INT_ENABLE, 4, 1 << lines::TIMER01 | 1 << lines::GPIO0);
        state
    }

    #[test]
    fn no_lines_no_irq() {
        assert!(!board(false).irq_asserted());
    }

    #[test]
    fn trigger_edge_reaches_the_core() {
        let mut state = board(false);
        state.gpio.write(hw_gpio::registers::IEV, 4, 1 << pins::TRIGGER);
        state.gpio.write(hw_gpio::registers::IE, 4, 1 << pins::TRIGGER);
        state.gpio.drive_input(pins::TRIGGER, true);

        assert_eq!(state.raw_lines(), 1 << lines::GPIO0);
        assert!(state.irq_asserted());
    }

    #[test]
    fn timer_expiry_reaches_the_core_after_enough_ticks() {
        let mut state = board(false);
        let ctl = hw_timer::control::RESET_VALUE
            | 1 << hw_timer::control::PERIODIC
            | 1 << hw_timer::control::ONESHOT
            | 1 << hw_timer::control::ENABLE;
        state.timer.write(hw_timer::registers::LOAD, 4, 0x2710);
        state.timer.write(hw_timer::registers::CONTROL, 4, ctl);

        state.advance(0x2710 - 1);
        assert!(!state.irq_asserted());
        state.advance(1);
        assert_eq!(state.raw_lines(), 1 << lines::TIMER01);
        assert!(state.irq_asserted());
        assert_eq!(state.cpu.ticks, 0x2710);
    }

    #[test]
    fn line_steered_to_fiq_leaves_irq_quiet() {
        let mut state = board(false);
        state.vic.write(hw_vic::registers::INT_SELECT, 4, 1 << lines::GPIO0);
        state.gpio.write(hw_gpio::registers::IEV, 4, 1 << pins::TRIGGER);
        state.gpio.write(hw_gpio::registers::IE, 4, 1 << pins::TRIGGER);
        state.gpio.drive_input(pins::TRIGGER, true);

        assert!(!state.irq_asserted());
        assert!(state.fiq_asserted());
    }
}
