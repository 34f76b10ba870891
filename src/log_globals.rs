//! Global log stream and fault instances.
//!
//! One stream per side of the hand-off: the receive interrupts write to
//! `RX_LOG_STREAM`, the console thread writes to `CONSOLE_LOG_STREAM`.

use crate::fault::FaultState;
use crate::logging::LogStream;

/// Receive-side log stream (console and link UART interrupts).
pub static RX_LOG_STREAM: LogStream = LogStream::new();

/// Console thread log stream (engine, registry, built-in commands).
pub static CONSOLE_LOG_STREAM: LogStream = LogStream::new();

/// Process-wide fault state.
pub static FAULT_STATE: FaultState = FaultState::new();
