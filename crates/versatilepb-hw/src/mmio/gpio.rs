//! # References
//! - <https://developer.arm.com/documentation/ddi0190/latest/> (PL061 TRM)

pub use crate::memory_map::peripherals::GPIO0 as BASE;

/// Number of pins per block
pub const PIN_COUNT: u32 = 8;

/// Register offsets (relative to `BASE`)
pub mod registers {
    /// Start of the masked data window. Address bits [9:2] select which
    /// pins a data access reads or writes.
    pub const DATA_WINDOW_START: u32 = 0x000;
    /// End of the masked data window (exclusive)
    pub const DATA_WINDOW_END: u32 = 0x400;
    /// Direction register (1 = output)
    pub const DIR: u32 = 0x400;
    /// Interrupt sense register (1 = level, 0 = edge)
    pub const IS: u32 = 0x404;
    /// Interrupt both-edges register
    pub const IBE: u32 = 0x408;
    /// Interrupt event register (1 = rising edge / high level)
    pub const IEV: u32 = 0x40C;
    /// Interrupt mask register (1 = enabled)
    pub const IE: u32 = 0x410;
    /// Raw interrupt status register
    pub const RIS: u32 = 0x414;
    /// Masked interrupt status register
    pub const MIS: u32 = 0x418;
    /// Interrupt clear register (write 1 to clear)
    pub const IC: u32 = 0x41C;
}

/// Offset of the data register that exposes exactly the pins in `mask`.
pub const fn data_offset(mask: u32) -> u32 {
    (mask & 0xFF) << 2
}

/// Pin mask selected by an offset inside the data window.
pub const fn data_mask(offset: u32) -> u32 {
    (offset >> 2) & 0xFF
}
