//! Bring-up sequence and the foreground wait loop.

use crate::board::Board;
use crate::console;
use crate::regs::{RegisterBus, bit};
use versatilepb_hw::mmio::{timer, vic};
use versatilepb_hw::{pins, specs};

/// Configure the board for the trigger/timer/toggle cycle.
///
/// The order is part of the contract: the timer must be in one-shot mode and
/// the trigger edge configured before the start signal goes out, because
/// whatever is wired to the start signal may raise the trigger at once. The
/// timer run bit is left clear; only a trigger edge sets it.
pub fn configure<B: RegisterBus>(board: &Board<B>) {
    console::print(board, "Starting\n");

    let dir = board.gpio_direction();
    dir.write(bit(pins::OUTPUT));
    // Zero-shifted on purpose: the trigger pin stays an input.
    dir.set_bits(0 << pins::TRIGGER);
    dir.set_bits(bit(pins::START_SIGNAL));

    let vic_enable = board.vic_int_enable();
    vic_enable.set_bits(bit(vic::lines::TIMER01));
    vic_enable.set_bits(bit(vic::lines::GPIO0));

    board.timer_load().write(specs::timer::ONESHOT_RELOAD);
    // One-shot mode only takes effect with periodic mode selected too.
    let control = board.timer_control();
    control.set_bits(bit(timer::control::PERIODIC));
    control.set_bits(bit(timer::control::ONESHOT));

    board.gpio_int_event().set_bits(bit(pins::TRIGGER));
    board.gpio_int_enable().set_bits(bit(pins::TRIGGER));

    console::print(board, "Initialized\n");

    board.gpio_start_data().set_bits(bit(pins::START_SIGNAL));
}

/// Configure the board, then doze until an interrupt does the work. Never
/// returns.
pub fn run<B: RegisterBus>(board: &Board<B>) -> ! {
    configure(board);
    loop {
        wait_for_interrupt();
    }
}

/// ARM926 "wait for interrupt": the core stops clocking until an IRQ or FIQ
/// arrives, then takes the exception and resumes after this instruction.
#[inline(always)]
pub fn wait_for_interrupt() {
    #[cfg(target_arch = "arm")]
    // SAFETY: CP15 c7,c0,4 only idles the core; r0 contents are ignored.
    unsafe {
        core::arch::asm!("mcr p15, 0, {zero}, c7, c0, 4", zero = in(reg) 0u32, options(nostack, preserves_flags));
    }
    #[cfg(not(target_arch = "arm"))]
    core::hint::spin_loop();
}
