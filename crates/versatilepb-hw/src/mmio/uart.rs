//! # References
//! - <https://developer.arm.com/documentation/ddi0183/latest/> (PL011 TRM)

pub use crate::memory_map::peripherals::UART0 as BASE;

/// Register offsets (relative to `BASE`)
pub mod registers {
    /// Data register; a write transmits one byte
    pub const DR: u32 = 0x000;
    /// Flag register
    pub const FR: u32 = 0x018;
    /// Interrupt mask set/clear register
    pub const IMSC: u32 = 0x038;
}

/// Flag register bits
pub mod flags {
    /// Receive FIFO empty
    pub const RXFE: u32 = 1 << 4;
    /// Transmit FIFO empty
    pub const TXFE: u32 = 1 << 7;
}
