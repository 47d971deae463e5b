//! Firmware image: configure the board and wait for interrupts.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
#[unsafe(no_mangle)]
pub extern "C" fn main() -> ! {
    irq_timer_gpio::init::run(&irq_timer_gpio::BOARD)
}

#[cfg(not(target_os = "none"))]
fn main() {
    eprintln!("irq_in is a bare-metal image; build it with --target armv5te-none-eabi");
    std::process::exit(1);
}
