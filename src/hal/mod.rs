//! Hardware Abstraction Layer for CellConsole.
//!
//! Thin wrappers around the board services the console needs.
//! Business logic stays in the console, HAL is just I/O.

#[cfg(target_os = "espidf")]
pub mod esp;
#[cfg(all(feature = "std", not(target_os = "espidf")))]
pub mod host;

#[cfg(target_os = "espidf")]
pub use esp::{EspLinkPort, EspPlatform};
#[cfg(all(feature = "std", not(target_os = "espidf")))]
pub use host::{HostPlatform, WriteLinkPort};

/// Board services used by the console loop.
pub trait Platform {
    /// Sleep the calling task.
    fn delay_ms(&mut self, ms: u32);

    /// Reset the board. Never returns.
    fn system_reset(&mut self) -> !;
}

/// Transmit side of the link UART.
pub trait LinkPort {
    /// Send raw bytes. Transmit errors are not reported.
    fn send(&mut self, bytes: &[u8]);
}
