//! # References
//! - <https://developer.arm.com/documentation/ddi0181/latest/> (PL190 TRM)

pub use crate::memory_map::peripherals::VIC as BASE;

/// Register offsets (relative to `BASE`)
pub mod registers {
    /// IRQ status (raw & enabled & !select)
    pub const IRQ_STATUS: u32 = 0x000;
    /// FIQ status
    pub const FIQ_STATUS: u32 = 0x004;
    /// Raw interrupt status
    pub const RAW_INTR: u32 = 0x008;
    /// Interrupt select (1 = FIQ)
    pub const INT_SELECT: u32 = 0x00C;
    /// Interrupt enable; writing 1 enables a line, reads return enabled lines
    pub const INT_ENABLE: u32 = 0x010;
    /// Interrupt enable clear (write 1 to disable)
    pub const INT_EN_CLEAR: u32 = 0x014;
    /// Software interrupt
    pub const SOFT_INT: u32 = 0x018;
    /// Software interrupt clear
    pub const SOFT_INT_CLEAR: u32 = 0x01C;
}

/// Interrupt line numbers on the primary controller
pub mod lines {
    /// Timers 0 and 1
    pub const TIMER01: u32 = 4;
    /// GPIO block 0
    pub const GPIO0: u32 = 6;
}
