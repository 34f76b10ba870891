//! ESP-IDF board services.

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::uart::UartTxDriver;

use super::{LinkPort, Platform};

/// FreeRTOS delay and chip restart.
pub struct EspPlatform;

impl Platform for EspPlatform {
    fn delay_ms(&mut self, ms: u32) {
        FreeRtos::delay_ms(ms);
    }

    fn system_reset(&mut self) -> ! {
        // SAFETY: esp_restart is always safe to call and does not return
        unsafe { esp_idf_svc::sys::esp_restart() }
    }
}

/// Link UART transmitter.
pub struct EspLinkPort<'d> {
    tx: UartTxDriver<'d>,
}

impl<'d> EspLinkPort<'d> {
    pub fn new(tx: UartTxDriver<'d>) -> Self {
        Self { tx }
    }
}

impl LinkPort for EspLinkPort<'_> {
    fn send(&mut self, bytes: &[u8]) {
        let _ = self.tx.write(bytes);
    }
}
