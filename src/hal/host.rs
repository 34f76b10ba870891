//! Hosted board services, for running the console on a PC.

use std::io::Write;
use std::time::Duration;

use super::{LinkPort, Platform};

/// Thread sleep and process exit.
pub struct HostPlatform;

impl Platform for HostPlatform {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }

    fn system_reset(&mut self) -> ! {
        std::process::exit(0)
    }
}

/// Link port over any `io::Write` (a pipe, a serial device file, ...).
pub struct WriteLinkPort<W> {
    inner: W,
}

impl<W: Write> WriteLinkPort<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> LinkPort for WriteLinkPort<W> {
    fn send(&mut self, bytes: &[u8]) {
        let _ = self.inner.write_all(bytes).and_then(|_| self.inner.flush());
    }
}
