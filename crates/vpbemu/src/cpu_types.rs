//! CPU-related type definitions
//!
//! Program status register layout for the ARMv5 core, as needed to enter
//! an exception by hand.

use versatilepb_hw::memory_map::vectors;

/// Mode field of the CPSR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CpuMode {
    User = 0x10,
    Fiq = 0x11,
    Irq = 0x12,
    Supervisor = 0x13,
    Abort = 0x17,
    Undefined = 0x1B,
    System = 0x1F,
}

impl CpuMode {
    pub fn from_cpsr(cpsr: u32) -> Option<Self> {
        match cpsr & psr::MODE_MASK {
            0x10 => Some(CpuMode::User),
            0x11 => Some(CpuMode::Fiq),
            0x12 => Some(CpuMode::Irq),
            0x13 => Some(CpuMode::Supervisor),
            0x17 => Some(CpuMode::Abort),
            0x1B => Some(CpuMode::Undefined),
            0x1F => Some(CpuMode::System),
            _ => None,
        }
    }
}

/// CPSR bits
pub mod psr {
    pub const MODE_MASK: u32 = 0x1F;
    /// Thumb state
    pub const T: u32 = 1 << 5;
    /// FIQ masked
    pub const F: u32 = 1 << 6;
    /// IRQ masked
    pub const I: u32 = 1 << 7;
}

/// CPSR out of reset: supervisor mode, IRQ and FIQ masked, ARM state
pub const RESET_CPSR: u32 = CpuMode::Supervisor as u32 | psr::I | psr::F;

/// Exceptions the emulator raises on the core's behalf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    Undefined,
    SoftwareInterrupt,
    PrefetchAbort,
    DataAbort,
    Irq,
    Fiq,
}

impl Exception {
    /// Map a Unicorn interrupt number (QEMU `EXCP_*`) to the exception taken
    pub fn from_interrupt(intno: u32) -> Option<Self> {
        match intno {
            1 => Some(Exception::Undefined),
            2 => Some(Exception::SoftwareInterrupt),
            // BKPT is a prefetch abort on ARMv5
            3 | 7 => Some(Exception::PrefetchAbort),
            4 => Some(Exception::DataAbort),
            5 => Some(Exception::Irq),
            6 => Some(Exception::Fiq),
            _ => None,
        }
    }

    /// Offset of the exception's entry from the vector base
    pub fn vector_offset(self) -> u32 {
        match self {
            Exception::Undefined => vectors::UNDEFINED,
            Exception::SoftwareInterrupt => vectors::SWI,
            Exception::PrefetchAbort => vectors::PREFETCH_ABORT,
            Exception::DataAbort => vectors::DATA_ABORT,
            Exception::Irq => vectors::IRQ,
            Exception::Fiq => vectors::FIQ,
        }
    }

    pub fn mode(self) -> CpuMode {
        match self {
            Exception::Undefined => CpuMode::Undefined,
            Exception::SoftwareInterrupt => CpuMode::Supervisor,
            Exception::PrefetchAbort | Exception::DataAbort => CpuMode::Abort,
            Exception::Irq => CpuMode::Irq,
            Exception::Fiq => CpuMode::Fiq,
        }
    }

    /// LR on entry. `insn` is the instruction the exception belongs to: the
    /// faulting one for aborts and undefined, the `svc` itself, or the next
    /// one to execute for interrupts.
    pub fn link_address(self, insn: u64) -> u64 {
        match self {
            Exception::DataAbort => insn + 8,
            _ => insn + 4,
        }
    }

    /// CPSR on entry from `cpsr`: exception mode, IRQ masked, ARM state. FIQ
    /// is masked only by an FIQ.
    pub fn entry_cpsr(self, cpsr: u32) -> u32 {
        let mut entered = (cpsr & !(psr::MODE_MASK | psr::T)) | self.mode() as u32 | psr::I;
        if self == Exception::Fiq {
            entered |= psr::F;
        }
        entered
    }
}
