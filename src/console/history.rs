//! Last command memory
//!
//! A blank line replays the last command. Only lines longer than one
//! character are remembered, so a stray single key never replaces it.
//! The slot is overwritten, never cleared.

use super::line_buffer::LineBuffer;

/// Single-slot command history.
pub struct History {
    last: LineBuffer,
}

impl History {
    /// Create empty history
    pub const fn new() -> Self {
        Self {
            last: LineBuffer::new(),
        }
    }

    /// Remember `line` if it is longer than one character.
    ///
    /// Returns whether the line was stored.
    pub fn remember(&mut self, line: &str) -> bool {
        if line.len() > 1 {
            self.last.set(line);
            true
        } else {
            false
        }
    }

    /// The line a blank input replays, if any.
    pub fn last(&self) -> Option<&str> {
        if self.last.is_empty() {
            None
        } else {
            Some(self.last.as_str())
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
