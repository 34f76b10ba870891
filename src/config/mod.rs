//! Module: config
//!
//! Purpose: Build-time configuration for CellConsole.
//!
//! Architecture:
//! - Every limit here is fixed at compile time
//! - Buffers and the command table are sized from these constants
//! - Nothing is runtime configurable except UART wiring

/// Maximum line length, terminator included.
pub const LINE_SIZE: usize = 100;

/// Commands contributed by a customer application on top of the stock set.
pub const CUSTOM_COMMANDS: usize = 0;

/// Maximum number of registered commands.
pub const MAX_COMMANDS: usize = 22 + CUSTOM_COMMANDS;

/// Column at which help descriptions start.
pub const ALIGN_COLUMN: usize = 16;

/// Maximum number of arguments a handler tokenizes.
pub const MAX_ARGS: usize = 10;

/// Console prompt.
pub const PROMPT: &str = "$>";

/// Line terminator for everything the console prints.
pub const NEWLINE: &str = "\r\n";

/// Pause between the reset notice and the hardware reset.
pub const RESET_DELAY_MS: u32 = 1000;

/// UART wiring for the console and link ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    pub baud_rate: u32,
    pub tx_pin: u8,
    pub rx_pin: u8,
}

impl UartConfig {
    /// Link UART defaults (UART1 on the board header).
    pub const fn link() -> Self {
        Self {
            baud_rate: 115200,
            tx_pin: 17,
            rx_pin: 18,
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            tx_pin: 43, // UART0 TX, routed to the USB-UART bridge
            rx_pin: 44,
        }
    }
}
