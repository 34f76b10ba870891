//! Shared test helpers

#![allow(dead_code)]

/// Console output sink backed by a fixed buffer.
pub struct TestOutput {
    buf: [u8; 4096],
    len: usize,
}

impl TestOutput {
    pub fn new() -> Self {
        Self { buf: [0u8; 4096], len: 0 }
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    pub fn contains(&self, s: &str) -> bool {
        self.as_str().contains(s)
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl core::fmt::Write for TestOutput {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let available = self.buf.len() - self.len;
        let to_copy = bytes.len().min(available);
        self.buf[self.len..self.len + to_copy].copy_from_slice(&bytes[..to_copy]);
        self.len += to_copy;
        Ok(())
    }
}
