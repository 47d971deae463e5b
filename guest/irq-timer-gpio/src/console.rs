//! Diagnostic output over the serial line.
//!
//! Each byte goes straight to the transmit register. There is no flow
//! control; the emulated UART always accepts.

use crate::board::Board;
use crate::regs::RegisterBus;
use core::fmt;

pub struct Console<'a, B: RegisterBus> {
    board: &'a Board<B>,
}

impl<'a, B: RegisterBus> Console<'a, B> {
    pub fn new(board: &'a Board<B>) -> Self {
        Self { board }
    }

    pub fn print(&mut self, s: &str) {
        let data = self.board.uart_data();
        for byte in s.bytes() {
            data.write(u32::from(byte));
        }
    }
}

impl<B: RegisterBus> fmt::Write for Console<'_, B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s);
        Ok(())
    }
}

/// Print a string to the board's serial line.
pub fn print<B: RegisterBus>(board: &Board<B>, s: &str) {
    Console::new(board).print(s);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimBus;
    use core::fmt::Write;

    #[test]
    fn bytes_go_out_one_write_each() {
        let board = Board::new(SimBus::new());
        print(&board, "ok\n");

        let dr = board.uart_data().addr();
        assert_eq!(board.bus().writes_to(dr), vec![b'o' as u32, b'k' as u32, b'\n' as u32]);
    }

    #[test]
    fn formatted_output_reaches_the_line() {
        let board = Board::new(SimBus::new());
        write!(Console::new(&board), "line {}", 6).unwrap();
        assert_eq!(board.bus().serial(), "line 6");
    }
}
