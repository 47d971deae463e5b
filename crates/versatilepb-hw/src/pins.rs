//! Pin assignments on GPIO block 0 used by the interrupt demo.

/// Driven output (the LED)
pub const OUTPUT: u32 = 0;
/// Input trigger; a rising edge arms the timer
pub const TRIGGER: u32 = 1;
/// Driven high once the firmware is ready
pub const START_SIGNAL: u32 = 2;
