//! Interrupt-driven LED toggle for the Versatile/PB926EJ-S.
//!
//! A rising edge on the trigger pin arms a one-shot timer; when the timer
//! fires the output pin flips. Between events the core dozes in a
//! wait-for-interrupt loop. Everything below [`rt`] is target independent
//! and runs on the host against a simulated register bus in tests.

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod console;
pub mod dispatch;
pub mod exceptions;
pub mod init;
pub mod output;
pub mod regs;
pub mod rt;
pub mod vectors;

#[cfg(test)]
mod testing;

pub use board::{BOARD, Board};
pub use dispatch::{IrqContext, Reaction, dispatch};
pub use exceptions::ExceptionKind;
