//! Register offsets and bit definitions for the peripheral blocks the
//! firmware touches. Offsets are relative to the block bases in
//! [`crate::memory_map::peripherals`].

pub mod gpio;
pub mod timer;
pub mod uart;
pub mod vic;
