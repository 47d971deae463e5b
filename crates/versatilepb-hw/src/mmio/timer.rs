//! # References
//! - <https://developer.arm.com/documentation/ddi0271/latest/> (SP804 TRM)

pub use crate::memory_map::peripherals::TIMER0 as BASE;

/// Register offsets for timer 0 (relative to `BASE`)
pub mod registers {
    /// Load register; a write also restarts the counter from the new value
    pub const LOAD: u32 = 0x000;
    /// Current value register (read only)
    pub const VALUE: u32 = 0x004;
    /// Control register
    pub const CONTROL: u32 = 0x008;
    /// Interrupt clear register; any write clears the interrupt
    pub const INTCLR: u32 = 0x00C;
    /// Raw interrupt status register
    pub const RIS: u32 = 0x010;
    /// Masked interrupt status register
    pub const MIS: u32 = 0x014;
    /// Background load register
    pub const BGLOAD: u32 = 0x018;
}

/// Control register bit positions
pub mod control {
    /// One-shot mode
    pub const ONESHOT: u32 = 0;
    /// 32-bit counter when set, 16-bit otherwise
    pub const SIZE_32: u32 = 1;
    /// Interrupt enable
    pub const INT_ENABLE: u32 = 5;
    /// Periodic mode
    pub const PERIODIC: u32 = 6;
    /// Timer enable (run bit)
    pub const ENABLE: u32 = 7;

    /// Control register value out of reset (interrupt enabled, timer stopped)
    pub const RESET_VALUE: u32 = 1 << INT_ENABLE;
}

/// Masked status value when the timer has fired
pub const MIS_FIRED: u32 = 0x1;
