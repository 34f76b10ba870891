//! # CellConsole
//!
//! Interrupt-fed serial command console for cellular boards.
//!
//! ## Architecture
//!
//! Two sides meet at [`ConsoleState`]:
//! - Receive interrupts call `feed_byte`, which assembles lines in a pair of
//!   alternating buffers and releases a one-token signal per completed line
//! - One console thread waits on that signal, classifies the line
//!   (comment, replay, command) and dispatches it to a registered handler
//!
//! Modules contribute commands through [`Console::register`] at start-up.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod config;
pub mod console;
pub mod diag;
pub mod fault;
pub mod hal;
pub mod log_drain;
pub mod log_globals;
pub mod logging;

pub use console::{Console, ConsoleError, ConsoleState, HandoffSignal, Step};
pub use fault::{FaultCode, FaultState, Severity};
pub use log_globals::{CONSOLE_LOG_STREAM, FAULT_STATE, RX_LOG_STREAM};
