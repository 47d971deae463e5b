//! # References
//! - <https://developer.arm.com/documentation/dui0224/latest/> section 4.1, "Memory map"

/// Dynamic memory, starting at the exception vector base
pub mod ram {
    /// RAM base address (also the fixed exception vector base)
    pub const BASE: u32 = 0x0000_0000;
    /// RAM size (128 MB)
    pub const SIZE: usize = 128 * 1024 * 1024;
}

/// Exception vector layout at [`ram::BASE`]
pub mod vectors {
    /// Address the core fetches exception entries from
    pub const BASE: u32 = super::ram::BASE;
    /// Number of exception entries (reset, undef, swi, pabt, dabt, reserved, irq, fiq)
    pub const ENTRIES: usize = 8;
    /// Offset of the undefined-instruction entry
    pub const UNDEFINED: u32 = 0x04;
    /// Offset of the software-interrupt entry
    pub const SWI: u32 = 0x08;
    /// Offset of the prefetch-abort entry
    pub const PREFETCH_ABORT: u32 = 0x0C;
    /// Offset of the data-abort entry
    pub const DATA_ABORT: u32 = 0x10;
    /// Offset of the IRQ entry
    pub const IRQ: u32 = 0x18;
    /// Offset of the FIQ entry
    pub const FIQ: u32 = 0x1C;
}

/// Where the boot loader places the firmware image
pub mod image {
    /// Default load (and entry) address
    pub const LOAD_ADDRESS: u32 = 0x0001_0000;
}

/// Peripheral block base addresses
pub mod peripherals {
    /// Vectored interrupt controller (PL190)
    pub const VIC: u32 = 0x1014_0000;
    /// Dual timer 0/1 (SP804)
    pub const TIMER0: u32 = 0x101E_2000;
    /// GPIO 0 (PL061)
    pub const GPIO0: u32 = 0x101E_4000;
    /// UART 0 (PL011)
    pub const UART0: u32 = 0x101F_1000;
    /// Size of each peripheral block's register window
    pub const BLOCK_SIZE: usize = 0x1000;
}
