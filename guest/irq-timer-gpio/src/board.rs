//! Named handles to the registers the firmware uses.

use crate::regs::{Reg, RegisterBus, Volatile};
use versatilepb_hw::mmio::{gpio, timer, uart, vic};
use versatilepb_hw::pins;

const fn at(base: u32, offset: u32) -> usize {
    (base + offset) as usize
}

/// The four peripheral blocks, reached through one register bus.
///
/// The firmware has exactly one of these for the lifetime of the image,
/// [`BOARD`]. The output pin data register has a single writer: the toggle
/// reaction running in IRQ context (see [`crate::dispatch::IrqContext`]).
pub struct Board<B: RegisterBus> {
    bus: B,
}

/// The physical board.
pub static BOARD: Board<Volatile> = Board::new(Volatile);

impl<B: RegisterBus> Board<B> {
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    fn reg(&self, addr: usize) -> Reg<'_, B> {
        Reg::new(&self.bus, addr)
    }

    // Serial

    /// Transmit data register
    pub fn uart_data(&self) -> Reg<'_, B> {
        self.reg(at(uart::BASE, uart::registers::DR))
    }

    /// Serial interrupt mask
    pub fn uart_int_mask(&self) -> Reg<'_, B> {
        self.reg(at(uart::BASE, uart::registers::IMSC))
    }

    // Timer 0

    pub fn timer_load(&self) -> Reg<'_, B> {
        self.reg(at(timer::BASE, timer::registers::LOAD))
    }

    pub fn timer_control(&self) -> Reg<'_, B> {
        self.reg(at(timer::BASE, timer::registers::CONTROL))
    }

    pub fn timer_int_clear(&self) -> Reg<'_, B> {
        self.reg(at(timer::BASE, timer::registers::INTCLR))
    }

    pub fn timer_masked_status(&self) -> Reg<'_, B> {
        self.reg(at(timer::BASE, timer::registers::MIS))
    }

    // GPIO 0

    /// Data register exposing only the output pin
    pub fn gpio_output_data(&self) -> Reg<'_, B> {
        self.reg(at(gpio::BASE, gpio::data_offset(1 << pins::OUTPUT)))
    }

    /// Data register exposing only the start-signal pin
    pub fn gpio_start_data(&self) -> Reg<'_, B> {
        self.reg(at(gpio::BASE, gpio::data_offset(1 << pins::START_SIGNAL)))
    }

    pub fn gpio_direction(&self) -> Reg<'_, B> {
        self.reg(at(gpio::BASE, gpio::registers::DIR))
    }

    pub fn gpio_int_enable(&self) -> Reg<'_, B> {
        self.reg(at(gpio::BASE, gpio::registers::IE))
    }

    /// Edge select: 1 = rising
    pub fn gpio_int_event(&self) -> Reg<'_, B> {
        self.reg(at(gpio::BASE, gpio::registers::IEV))
    }

    pub fn gpio_masked_status(&self) -> Reg<'_, B> {
        self.reg(at(gpio::BASE, gpio::registers::MIS))
    }

    pub fn gpio_int_clear(&self) -> Reg<'_, B> {
        self.reg(at(gpio::BASE, gpio::registers::IC))
    }

    // Interrupt controller

    pub fn vic_int_enable(&self) -> Reg<'_, B> {
        self.reg(at(vic::BASE, vic::registers::INT_ENABLE))
    }
}
