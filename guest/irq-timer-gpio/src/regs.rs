//! Typed access to memory-mapped 32-bit registers.
//!
//! Every access goes through a [`RegisterBus`] so the ordering the caller
//! writes is the ordering the hardware sees. On the target the bus is
//! [`Volatile`]; host tests substitute a simulated bus.

/// A 32-bit memory-mapped register space.
pub trait RegisterBus {
    /// Read the 32-bit cell at `addr`.
    fn read(&self, addr: usize) -> u32;

    /// Write `value` to the 32-bit cell at `addr`.
    fn write(&self, addr: usize, value: u32);
}

/// Direct volatile access to physical addresses.
///
/// On ARM the accesses are single `ldr`/`str` instructions emitted through
/// inline assembly. This keeps them unreorderable and uncached by the
/// compiler, and lets the vector relocator store to address zero without a
/// null-pointer dereference in Rust's eyes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Volatile;

impl RegisterBus for Volatile {
    #[inline(always)]
    fn read(&self, addr: usize) -> u32 {
        #[cfg(target_arch = "arm")]
        {
            let value: u32;
            // SAFETY: `addr` names a word-aligned register or RAM word that is
            // mapped for the lifetime of the image.
            unsafe {
                core::arch::asm!(
                    "ldr {value}, [{addr}]",
                    addr = in(reg) addr,
                    value = out(reg) value,
                    options(nostack, preserves_flags),
                );
            }
            value
        }
        #[cfg(not(target_arch = "arm"))]
        {
            // SAFETY: same contract as above.
            unsafe { core::ptr::read_volatile(addr as *const u32) }
        }
    }

    #[inline(always)]
    fn write(&self, addr: usize, value: u32) {
        #[cfg(target_arch = "arm")]
        {
            // SAFETY: `addr` names a word-aligned register or RAM word that is
            // mapped and writable for the lifetime of the image.
            unsafe {
                core::arch::asm!(
                    "str {value}, [{addr}]",
                    addr = in(reg) addr,
                    value = in(reg) value,
                    options(nostack, preserves_flags),
                );
            }
        }
        #[cfg(not(target_arch = "arm"))]
        {
            // SAFETY: same contract as above.
            unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
        }
    }
}

/// Handle to a single register at a fixed address.
///
/// No accessor validates bit indices; callers pass correct masks.
pub struct Reg<'a, B: RegisterBus> {
    bus: &'a B,
    addr: usize,
}

impl<'a, B: RegisterBus> Reg<'a, B> {
    pub const fn new(bus: &'a B, addr: usize) -> Self {
        Self { bus, addr }
    }

    pub const fn addr(&self) -> usize {
        self.addr
    }

    #[inline(always)]
    pub fn read(&self) -> u32 {
        self.bus.read(self.addr)
    }

    #[inline(always)]
    pub fn write(&self, value: u32) {
        self.bus.write(self.addr, value)
    }

    /// Read-modify-write: `reg |= mask`.
    #[inline(always)]
    pub fn set_bits(&self, mask: u32) {
        self.write(self.read() | mask)
    }

    /// Read-modify-write: `reg &= !mask`.
    #[inline(always)]
    pub fn clear_bits(&self, mask: u32) {
        self.write(self.read() & !mask)
    }

    /// True when every bit of `mask` reads as one.
    #[inline(always)]
    pub fn is_set(&self, mask: u32) -> bool {
        self.read() & mask == mask
    }
}

/// Single-bit mask for bit `n`.
pub const fn bit(n: u32) -> u32 {
    1 << n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimBus;

    const ADDR: usize = 0x2000_0000;

    #[test]
    fn set_and_clear_touch_only_masked_bits() {
        let bus = SimBus::new();
        let reg = Reg::new(&bus, ADDR);
        reg.write(0b1010);

        reg.set_bits(0b0001);
        assert_eq!(reg.read(), 0b1011);

        reg.clear_bits(0b1000);
        assert_eq!(reg.read(), 0b0011);
    }

    #[test]
    fn is_set_requires_every_masked_bit() {
        let bus = SimBus::new();
        let reg = Reg::new(&bus, ADDR);
        reg.write(0b0110);

        assert!(reg.is_set(0b0100));
        assert!(reg.is_set(0b0110));
        assert!(!reg.is_set(0b0111));
    }
}
