//! Hardware definitions for the ARM Versatile Platform Baseboard (ARM926EJ-S).
//!
//! Shared between the bare-metal guest and the emulator so both agree on the
//! wire-level contract: base addresses, register offsets and bit positions.
//!
//! # References
//! - <https://developer.arm.com/documentation/dui0224/latest/> (Versatile/PB926EJ-S user guide)

#![no_std]

pub mod memory_map;
pub mod mmio;
pub mod pins;
pub mod specs;
