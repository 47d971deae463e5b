//! Fail-stop check: configure the board, then execute an undefined
//! instruction. The relocated vector table must route it to the sink, which
//! prints its terminal line and spins.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
#[unsafe(no_mangle)]
pub extern "C" fn main() -> ! {
    irq_timer_gpio::init::configure(&irq_timer_gpio::BOARD);
    // SAFETY: traps into the undefined-instruction vector, which never returns.
    unsafe {
        core::arch::asm!(".inst 0xe7f000f0", options(noreturn));
    }
}

#[cfg(not(target_os = "none"))]
fn main() {
    eprintln!("undefined_halt is a bare-metal image; build it with --target armv5te-none-eabi");
    std::process::exit(1);
}
