//! ARM926 CP15 Coprocessor Emulation
//!
//! The firmware's only CP15 access is the ARM926 wait-for-interrupt
//! operation, `MCR p15, 0, Rd, c7, c0, 4`. The emulated core does not
//! implement it, so a code hook intercepts it: the core is parked, emulation
//! stops, and the scheduler advances time until an interrupt is pending.
//!
//! All other CP15 instructions are logged as warnings and skipped.
//!
//! # References
//! - [ARM926EJ-S Technical Reference Manual](https://developer.arm.com/documentation/ddi0198/latest/)

use crate::mmio::EmulatorState;
use tracing::{trace, warn};
use unicorn_engine::{RegisterARM, Unicorn};

/// Coprocessor register transfer (MCR/MRC) mask
const CP_TRANSFER_MASK: u32 = 0x0F00_0010;

/// Coprocessor register transfer value
const CP_TRANSFER_VALUE: u32 = 0x0E00_0010;

/// Coprocessor number field
const CP_NUM_MASK: u32 = 0x0000_0F00;

/// CP15 coprocessor number
const CP15: u32 = 0x0000_0F00;

/// ARM instruction size in bytes
const ARM_INSN_SIZE: u64 = 4;

/// A decoded `MCR`/`MRC p15` instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cp15Op {
    pub is_mcr: bool,
    pub opc1: u32,
    pub crn: u32,
    pub rd: u32,
    pub opc2: u32,
    pub crm: u32,
}

impl Cp15Op {
    /// Decode `insn`, or `None` if it is not a CP15 register transfer.
    pub fn decode(insn: u32) -> Option<Self> {
        if insn & CP_TRANSFER_MASK != CP_TRANSFER_VALUE || insn & CP_NUM_MASK != CP15 {
            return None;
        }

        Some(Self {
            is_mcr: insn & (1 << 20) == 0, // Bit 20 = 0 for MCR, 1 for MRC
            opc1: (insn >> 21) & 0x7,
            crn: (insn >> 16) & 0xF,
            rd: (insn >> 12) & 0xF,
            opc2: (insn >> 5) & 0x7,
            crm: insn & 0xF,
        })
    }

    /// `MCR p15, 0, Rd, c7, c0, 4`
    pub fn is_wait_for_interrupt(&self) -> bool {
        self.is_mcr && self.opc1 == 0 && self.crn == 7 && self.crm == 0 && self.opc2 == 4
    }
}

/// Handles CP15 coprocessor instructions
///
/// Called from a code hook before `insn` executes. Returns true if a CP15
/// instruction was handled (and skipped), false otherwise.
pub fn handle_cp15_instruction(
    uc: &mut Unicorn<'_, EmulatorState>,
    addr: u64,
    insn: u32,
) -> bool {
    let Some(op) = Cp15Op::decode(insn) else {
        return false;
    };

    if op.is_wait_for_interrupt() {
        trace!("CP15 {:#X}: wait for interrupt", addr);
        uc.get_data_mut().cpu.waiting = true;
        let _ = uc.reg_write(RegisterARM::PC, addr + ARM_INSN_SIZE);
        let _ = uc.emu_stop();
        return true;
    }

    let mnemonic = if op.is_mcr { "MCR" } else { "MRC" };
    warn!(
        "Unsupported CP15 instruction at {:#X}: {} p15, {}, r{}, c{}, c{}, {} (skipping)",
        addr, mnemonic, op.opc1, op.rd, op.crn, op.crm, op.opc2
    );

    // Skip the CP15 instruction by advancing PC
    let _ = uc.reg_write(RegisterARM::PC, addr + ARM_INSN_SIZE);

    true
}
