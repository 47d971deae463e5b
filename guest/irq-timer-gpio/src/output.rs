//! The driven output pin.

use crate::board::Board;
use crate::dispatch::IrqContext;
use crate::regs::{RegisterBus, bit};
use versatilepb_hw::pins;

const OUTPUT: u32 = bit(pins::OUTPUT);

/// Flip the output pin: high goes low, low goes high.
///
/// Only callable from IRQ context, which makes the interrupt path the sole
/// writer of the output pin. A foreground writer would race this
/// read-modify-write and would have to mask IRQs around its access.
pub fn toggle<B: RegisterBus>(board: &Board<B>, _cx: &IrqContext) {
    let data = board.gpio_output_data();
    if data.is_set(OUTPUT) {
        data.clear_bits(OUTPUT);
    } else {
        data.set_bits(OUTPUT);
    }
}

/// Current level of the output pin.
pub fn is_high<B: RegisterBus>(board: &Board<B>) -> bool {
    board.gpio_output_data().is_set(OUTPUT)
}
