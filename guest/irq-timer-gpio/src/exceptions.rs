//! Fail-stop handling for every exception class except IRQ.
//!
//! There is no recovery path: the sink prints one line naming the class and
//! spins with interrupts masked.

use crate::board::Board;
use crate::console::Console;
use crate::regs::RegisterBus;
use core::fmt::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ExceptionKind {
    Undefined = 0,
    SoftwareInterrupt = 1,
    PrefetchAbort = 2,
    DataAbort = 3,
    Fiq = 4,
}

impl ExceptionKind {
    pub const fn name(self) -> &'static str {
        match self {
            ExceptionKind::Undefined => "undefined instruction",
            ExceptionKind::SoftwareInterrupt => "software interrupt",
            ExceptionKind::PrefetchAbort => "prefetch abort",
            ExceptionKind::DataAbort => "data abort",
            ExceptionKind::Fiq => "FIQ",
        }
    }

    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(ExceptionKind::Undefined),
            1 => Some(ExceptionKind::SoftwareInterrupt),
            2 => Some(ExceptionKind::PrefetchAbort),
            3 => Some(ExceptionKind::DataAbort),
            4 => Some(ExceptionKind::Fiq),
            _ => None,
        }
    }
}

/// Emit the terminal diagnostic for `kind`.
pub fn report<B: RegisterBus>(board: &Board<B>, kind: ExceptionKind) {
    let _ = writeln!(
        Console::new(board),
        "Unhandled {} exception reached. This is the end...",
        kind.name()
    );
}

/// Never return.
pub fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}

pub fn unhandled<B: RegisterBus>(board: &Board<B>, kind: ExceptionKind) -> ! {
    report(board, kind);
    halt()
}

/// Terminal diagnostic for a Rust panic, in the same shape as the exception
/// classes.
pub fn report_panic<B: RegisterBus>(board: &Board<B>, message: &dyn fmt::Display) {
    let _ = writeln!(
        Console::new(board),
        "Unhandled panic ({}) reached. This is the end...",
        message
    );
}

pub fn unhandled_panic<B: RegisterBus>(board: &Board<B>, message: &dyn fmt::Display) -> ! {
    report_panic(board, message);
    halt()
}

#[cfg(all(target_arch = "arm", target_os = "none"))]
#[unsafe(no_mangle)]
extern "C" fn unhandled_exception(raw: u32) -> ! {
    let board = &crate::board::BOARD;
    match ExceptionKind::from_raw(raw) {
        Some(kind) => unhandled(board, kind),
        None => {
            crate::console::print(board, "Unhandled exception reached. This is the end...\n");
            halt()
        }
    }
}

// Each entry drops to supervisor mode with IRQ and FIQ masked (the abort and
// undefined modes have no stack of their own) and hands its class to the
// sink. Nothing returns, so the foreground stack is fair game.
#[cfg(all(target_arch = "arm", target_os = "none"))]
macro_rules! exception_entry {
    ($name:ident, $kind:expr) => {
        #[unsafe(naked)]
        #[unsafe(no_mangle)]
        extern "C" fn $name() -> ! {
            core::arch::naked_asm!(
                "msr cpsr_c, #{svc_masked}",
                "mov r0, #{kind}",
                "b unhandled_exception",
                svc_masked = const crate::rt::SVC_MODE_MASKED,
                kind = const $kind as u32,
            )
        }
    };
}

#[cfg(all(target_arch = "arm", target_os = "none"))]
exception_entry!(undefined_entry, ExceptionKind::Undefined);
#[cfg(all(target_arch = "arm", target_os = "none"))]
exception_entry!(swi_entry, ExceptionKind::SoftwareInterrupt);
#[cfg(all(target_arch = "arm", target_os = "none"))]
exception_entry!(prefetch_abort_entry, ExceptionKind::PrefetchAbort);
#[cfg(all(target_arch = "arm", target_os = "none"))]
exception_entry!(data_abort_entry, ExceptionKind::DataAbort);
#[cfg(all(target_arch = "arm", target_os = "none"))]
exception_entry!(fiq_entry, ExceptionKind::Fiq);
