//! Host-side stand-in for the board's register space.
//!
//! Plain RAM semantics everywhere, except where the firmware depends on
//! hardware behaviour: the serial data register collects transmitted bytes,
//! the interrupt-clear registers clear their status, and the GPIO data window
//! applies its address mask.

use crate::regs::RegisterBus;
use std::cell::RefCell;
use std::collections::BTreeMap;
use versatilepb_hw::mmio::{gpio, timer, uart};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read(usize),
    Write(usize, u32),
}

#[derive(Default)]
pub struct SimBus {
    cells: RefCell<BTreeMap<usize, u32>>,
    gpio_data: RefCell<u32>,
    serial: RefCell<String>,
    log: RefCell<Vec<Access>>,
}

const fn at(base: u32, offset: u32) -> usize {
    (base + offset) as usize
}

const UART_DR: usize = at(uart::BASE, uart::registers::DR);
const TIMER_INTCLR: usize = at(timer::BASE, timer::registers::INTCLR);
const TIMER_MIS: usize = at(timer::BASE, timer::registers::MIS);
const GPIO_DATA_START: usize = at(gpio::BASE, gpio::registers::DATA_WINDOW_START);
const GPIO_DATA_END: usize = at(gpio::BASE, gpio::registers::DATA_WINDOW_END);
const GPIO_MIS: usize = at(gpio::BASE, gpio::registers::MIS);
const GPIO_IC: usize = at(gpio::BASE, gpio::registers::IC);

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell without logging the access.
    pub fn poke(&self, addr: usize, value: u32) {
        self.cells.borrow_mut().insert(addr, value);
    }

    /// Read a cell without logging the access.
    pub fn peek(&self, addr: usize) -> u32 {
        self.cells.borrow().get(&addr).copied().unwrap_or(0)
    }

    /// Latch a GPIO interrupt for `pin`.
    pub fn raise_gpio(&self, pin: u32) {
        let mis = self.peek(GPIO_MIS);
        self.poke(GPIO_MIS, mis | 1 << pin);
    }

    /// Latch the timer interrupt.
    pub fn fire_timer(&self) {
        self.poke(TIMER_MIS, timer::MIS_FIRED);
    }

    pub fn gpio_pending(&self) -> u32 {
        self.peek(GPIO_MIS)
    }

    pub fn timer_pending(&self) -> u32 {
        self.peek(TIMER_MIS)
    }

    /// Levels of all GPIO pins as seen through the full data window.
    pub fn gpio_levels(&self) -> u32 {
        *self.gpio_data.borrow()
    }

    pub fn serial(&self) -> String {
        self.serial.borrow().clone()
    }

    pub fn log(&self) -> Vec<Access> {
        self.log.borrow().clone()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
        self.serial.borrow_mut().clear();
    }

    /// Values written to `addr`, in order.
    pub fn writes_to(&self, addr: usize) -> Vec<u32> {
        self.log
            .borrow()
            .iter()
            .filter_map(|access| match *access {
                Access::Write(a, v) if a == addr => Some(v),
                _ => None,
            })
            .collect()
    }

    fn in_data_window(addr: usize) -> bool {
        (GPIO_DATA_START..GPIO_DATA_END).contains(&addr)
    }

    fn data_mask(addr: usize) -> u32 {
        gpio::data_mask((addr - GPIO_DATA_START) as u32)
    }
}

impl RegisterBus for SimBus {
    fn read(&self, addr: usize) -> u32 {
        self.log.borrow_mut().push(Access::Read(addr));
        match addr {
            GPIO_IC | TIMER_INTCLR | UART_DR => 0,
            a if Self::in_data_window(a) => *self.gpio_data.borrow() & Self::data_mask(a),
            a => self.peek(a),
        }
    }

    fn write(&self, addr: usize, value: u32) {
        self.log.borrow_mut().push(Access::Write(addr, value));
        match addr {
            UART_DR => self.serial.borrow_mut().push(value as u8 as char),
            GPIO_IC => {
                let mis = self.peek(GPIO_MIS);
                self.poke(GPIO_MIS, mis & !value);
            }
            TIMER_INTCLR => self.poke(TIMER_MIS, 0),
            a if Self::in_data_window(a) => {
                let mask = Self::data_mask(a);
                let mut data = self.gpio_data.borrow_mut();
                *data = (*data & !mask) | (value & mask);
            }
            a => self.poke(a, value),
        }
    }
}
