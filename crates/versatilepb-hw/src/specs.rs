/// Timer specifications
pub mod timer {
    /// Reference clock feeding the SP804 (1 MHz)
    pub const CLOCK_HZ: u64 = 1_000_000;

    /// Reload value the firmware programs for its one-shot delay (10 ms at 1 MHz)
    pub const ONESHOT_RELOAD: u32 = 0x2710;
}
