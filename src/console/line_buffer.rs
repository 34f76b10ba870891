//! Fixed-size line storage
//!
//! Used for both halves of the receive double buffer and for the
//! remembered last command. Capacity includes the terminating NUL, so a
//! buffer holds at most `LINE_SIZE - 1` characters.

use crate::config::LINE_SIZE;

/// Line storage with an explicit length and a NUL terminator.
#[derive(Clone)]
pub struct LineBuffer {
    buf: [u8; LINE_SIZE],
    len: usize,
}

impl LineBuffer {
    /// Largest number of characters a line can hold.
    pub const MAX_CHARS: usize = LINE_SIZE - 1;

    /// Create empty buffer
    pub const fn new() -> Self {
        Self {
            buf: [0u8; LINE_SIZE],
            len: 0,
        }
    }

    /// Store a byte at the cursor.
    ///
    /// Returns `false` (and stores nothing) once `MAX_CHARS` is reached.
    pub fn push(&mut self, c: u8) -> bool {
        if self.len >= Self::MAX_CHARS {
            return false;
        }
        self.buf[self.len] = c;
        self.len += 1;
        true
    }

    /// Move the cursor back one byte, if any.
    pub fn backspace(&mut self) {
        if self.len > 0 {
            self.len -= 1;
        }
    }

    /// Write the NUL terminator at the cursor.
    pub fn terminate(&mut self) {
        self.buf[self.len] = 0;
    }

    /// Clear buffer
    pub fn clear(&mut self) {
        self.len = 0;
        self.buf[0] = 0;
    }

    /// Replace contents, truncating to `MAX_CHARS`.
    pub fn set(&mut self, s: &str) {
        self.set_bytes(s.as_bytes());
    }

    /// Replace contents from raw bytes, truncating to `MAX_CHARS`.
    pub fn set_bytes(&mut self, bytes: &[u8]) {
        let copy_len = bytes.len().min(Self::MAX_CHARS);
        self.buf[..copy_len].copy_from_slice(&bytes[..copy_len]);
        self.len = copy_len;
        self.terminate();
    }

    /// Replace every non-ASCII byte with `with` if the contents are not
    /// valid UTF-8. Length is unchanged.
    ///
    /// Returns `true` if anything was replaced.
    pub fn replace_invalid(&mut self, with: u8) -> bool {
        if core::str::from_utf8(self.as_bytes()).is_ok() {
            return false;
        }
        for b in &mut self.buf[..self.len] {
            if !b.is_ascii() {
                *b = with;
            }
        }
        true
    }

    /// Contents as text. Invalid UTF-8 is cut at the first bad byte; call
    /// [`replace_invalid`](Self::replace_invalid) first to keep the full line.
    pub fn as_str(&self) -> &str {
        let bytes = self.as_bytes();
        match core::str::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
        }
    }

    /// Get buffer length (cursor position)
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if the cursor reached the forced-completion boundary.
    pub fn is_full(&self) -> bool {
        self.len >= Self::MAX_CHARS
    }

    /// Raw bytes before the cursor.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Bytes including the terminator.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf[..=self.len]
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for LineBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("LineBuffer").field(&self.as_str()).finish()
    }
}
