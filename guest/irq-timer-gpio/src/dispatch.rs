//! IRQ dispatch: pick the pending source, acknowledge it, react.
//!
//! Every IRQ exception lands in [`dispatch`] with the core in IRQ mode and
//! IRQs masked, so a dispatch runs to completion without preemption. Each
//! branch clears the hardware flag of the source it handled before
//! returning; a flag left set re-raises the exception the moment the core
//! returns.

use crate::board::Board;
use crate::console;
use crate::output;
use crate::regs::{RegisterBus, bit};
use versatilepb_hw::mmio::timer;
use versatilepb_hw::pins;

/// Proof that the caller is running in IRQ context.
///
/// Handed out by the IRQ entry and required by [`output::toggle`], so the
/// output pin cannot gain a writer in the foreground loop by accident.
pub struct IrqContext {
    _private: (),
}

impl IrqContext {
    /// # Safety
    /// Only the IRQ entry (or a test standing in for it) may create one.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }
}

/// What a single dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Rising edge on the trigger pin: arm the timer.
    GpioTrigger,
    /// The one-shot timer expired: disarm it and toggle the output.
    TimerFired,
    /// Nothing we know about is pending.
    Unrecognized,
}

type Pending<B> = fn(&Board<B>) -> bool;

fn trigger_pending<B: RegisterBus>(board: &Board<B>) -> bool {
    board.gpio_masked_status().is_set(bit(pins::TRIGGER))
}

fn timer_pending<B: RegisterBus>(board: &Board<B>) -> bool {
    board.timer_masked_status().read() == timer::MIS_FIRED
}

impl Reaction {
    /// Scan the sources in priority order and return the first one pending.
    ///
    /// The trigger pin always wins. When both are pending only the GPIO
    /// branch runs; the timer flag stays set and the controller re-raises
    /// the IRQ for it straight after return. This is fixed priority, not
    /// round-robin.
    pub fn select<B: RegisterBus>(board: &Board<B>) -> Self {
        let scan: [(Pending<B>, Reaction); 2] = [
            (trigger_pending::<B>, Reaction::GpioTrigger),
            (timer_pending::<B>, Reaction::TimerFired),
        ];

        scan.iter()
            .find(|(pending, _)| pending(board))
            .map_or(Reaction::Unrecognized, |&(_, reaction)| reaction)
    }
}

/// Handle one IRQ exception.
pub fn dispatch<B: RegisterBus>(board: &Board<B>, cx: &IrqContext) -> Reaction {
    let reaction = Reaction::select(board);

    match reaction {
        Reaction::GpioTrigger => {
            board.timer_control().set_bits(bit(timer::control::ENABLE));
            board.gpio_int_clear().write(bit(pins::TRIGGER));
            trace(board, "Interrupt from GPIO 1\n");
        }
        Reaction::TimerFired => {
            board.timer_control().clear_bits(bit(timer::control::ENABLE));
            board.timer_int_clear().write(1);
            output::toggle(board, cx);
            trace(board, "Interrupt from timer 0\n");
        }
        Reaction::Unrecognized => {
            console::print(board, "Unknown interrupt source\n");
        }
    }

    reaction
}

#[cfg(feature = "trace-irq")]
fn trace<B: RegisterBus>(board: &Board<B>, msg: &str) {
    console::print(board, msg);
}

#[cfg(not(feature = "trace-irq"))]
fn trace<B: RegisterBus>(_board: &Board<B>, _msg: &str) {}

/// Called from the IRQ vector trampoline.
#[cfg(all(target_arch = "arm", target_os = "none"))]
#[unsafe(no_mangle)]
extern "C" fn irq_dispatch() {
    // SAFETY: this is the IRQ entry.
    let cx = unsafe { IrqContext::new() };
    dispatch(&crate::board::BOARD, &cx);
}
