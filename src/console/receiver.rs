//! Interrupt-side line assembly
//!
//! Turns a byte stream into NUL-terminated lines using two buffers whose
//! roles alternate. The receiver only ever writes the active buffer; a
//! completed line becomes the ready buffer by swapping indices, never by
//! copying bytes. The console copies the ready buffer out after being
//! signalled.
//!
//! ```text
//! feed_byte()                       take_line()
//! ───────────                       ───────────
//! [active] ← bytes                  wait signal
//!    │ CR / full                       │
//!    └─ swap(active, ready) ─ release ─┘
//!                                   copy [ready] out
//! ```
//!
//! The swap publishes the line's source in a one-slot mailbox inside the
//! same critical section. The console takes the mailbox and copies the
//! line in one critical section too, so a line is handed out at most once
//! and always together with the buffer it was published with. A token
//! whose line was already taken finds the mailbox empty and is skipped.

use core::cell::{Cell, RefCell};

use critical_section::{CriticalSection, Mutex};

use super::line_buffer::LineBuffer;
use super::signal::HandoffSignal;
use crate::rt_warn;

const CR: u8 = b'\r';
const LF: u8 = b'\n';
const BS: u8 = 0x08;

/// Which UART a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Source {
    /// Console UART (operator terminal).
    Console = 0,
    /// Link UART (companion board).
    Link = 1,
}

/// What a single byte did to the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxEvent {
    /// Byte stored at the cursor.
    Stored,
    /// Backspace consumed (cursor moved back, or already at zero).
    Erased,
    /// Line feed dropped.
    Ignored,
    /// Line completed; `forced` when the buffer filled up before CR.
    Completed { len: usize, forced: bool },
}

struct RxState {
    lines: [LineBuffer; 2],
    /// Index of the buffer being filled; the other one is ready.
    active: usize,
    completed: u32,
    forced: u32,
}

impl RxState {
    const fn new() -> Self {
        Self {
            lines: [LineBuffer::new(), LineBuffer::new()],
            active: 0,
            completed: 0,
            forced: 0,
        }
    }

    fn ready(&self) -> &LineBuffer {
        &self.lines[self.active ^ 1]
    }
}

/// Byte-to-line accumulator for one UART.
pub struct LineReceiver {
    ignore_lf: bool,
    state: Mutex<RefCell<RxState>>,
}

impl LineReceiver {
    /// Receiver for the operator console. Drops `\n`, so CRLF terminals work.
    pub const fn console() -> Self {
        Self {
            ignore_lf: true,
            state: Mutex::new(RefCell::new(RxState::new())),
        }
    }

    /// Receiver for the link UART. `\n` is stored like any other byte.
    pub const fn link() -> Self {
        Self {
            ignore_lf: false,
            state: Mutex::new(RefCell::new(RxState::new())),
        }
    }

    /// Accumulate one byte. Never blocks.
    ///
    /// The caller must release the hand-off signal on `Completed`;
    /// [`ConsoleState`] does that.
    pub fn feed_byte(&self, byte: u8) -> RxEvent {
        critical_section::with(|cs| self.feed_locked(cs, byte))
    }

    fn feed_locked(&self, cs: CriticalSection<'_>, byte: u8) -> RxEvent {
        if self.ignore_lf && byte == LF {
            return RxEvent::Ignored;
        }

        let mut st = self.state.borrow_ref_mut(cs);
        let active = st.active;

        if byte == CR || st.lines[active].is_full() {
            let forced = byte != CR;
            let line = &mut st.lines[active];
            let len = line.len();
            line.terminate();

            st.active = active ^ 1;
            st.lines[active ^ 1].clear();
            st.completed = st.completed.wrapping_add(1);
            if forced {
                st.forced = st.forced.wrapping_add(1);
            }
            RxEvent::Completed { len, forced }
        } else if byte == BS {
            st.lines[active].backspace();
            RxEvent::Erased
        } else {
            st.lines[active].push(byte);
            RxEvent::Stored
        }
    }

    /// Copy the most recently completed line into `dst`.
    pub fn copy_ready(&self, dst: &mut LineBuffer) {
        critical_section::with(|cs| self.copy_locked(cs, dst))
    }

    fn copy_locked(&self, cs: CriticalSection<'_>, dst: &mut LineBuffer) {
        dst.set_bytes(self.state.borrow_ref(cs).ready().as_bytes());
    }

    /// Characters accumulated on the line in progress.
    pub fn pending_len(&self) -> usize {
        critical_section::with(|cs| {
            let st = self.state.borrow_ref(cs);
            st.lines[st.active].len()
        })
    }

    /// Lines completed since start-up.
    pub fn completed_count(&self) -> u32 {
        critical_section::with(|cs| self.state.borrow_ref(cs).completed)
    }

    /// Lines cut short by the buffer limit since start-up.
    pub fn forced_count(&self) -> u32 {
        critical_section::with(|cs| self.state.borrow_ref(cs).forced)
    }
}

/// Everything both sides of the console share.
///
/// Built once at start-up (usually as a `static`) and passed by reference
/// to the receive path and to the console loop.
pub struct ConsoleState<S> {
    signal: S,
    /// Source of the completed line not yet taken.
    mailbox: Mutex<Cell<Option<Source>>>,
    console_rx: LineReceiver,
    link_rx: LineReceiver,
}

impl<S: HandoffSignal> ConsoleState<S> {
    pub const fn new(signal: S) -> Self {
        Self {
            signal,
            mailbox: Mutex::new(Cell::new(None)),
            console_rx: LineReceiver::console(),
            link_rx: LineReceiver::link(),
        }
    }

    /// Console UART receive callback.
    #[inline]
    pub fn feed_byte(&self, byte: u8) -> RxEvent {
        self.feed(Source::Console, byte)
    }

    /// Link UART receive callback.
    #[inline]
    pub fn feed_link_byte(&self, byte: u8) -> RxEvent {
        self.feed(Source::Link, byte)
    }

    /// Feed one byte from `source`; releases the signal on completion.
    pub fn feed(&self, source: Source, byte: u8) -> RxEvent {
        let event = critical_section::with(|cs| {
            let event = self.receiver(source).feed_locked(cs, byte);
            if let RxEvent::Completed { .. } = event {
                self.mailbox.borrow(cs).set(Some(source));
            }
            event
        });

        if let RxEvent::Completed { len, forced } = event {
            self.signal.release();
            if forced {
                rt_warn!(crate::RX_LOG_STREAM, "RX", "{:?} line forced at {} chars", source, len);
            }
        }

        event
    }

    /// Block until a line completes, then copy it into `dst`.
    ///
    /// Returns the source the line came from.
    pub fn take_line(&self, dst: &mut LineBuffer) -> Source {
        loop {
            self.signal.acquire();
            if let Some(source) = self.take_published(dst) {
                return source;
            }
        }
    }

    /// Non-blocking variant of [`take_line`](Self::take_line).
    pub fn try_take_line(&self, dst: &mut LineBuffer) -> Option<Source> {
        while self.signal.try_acquire() {
            if let Some(source) = self.take_published(dst) {
                return Some(source);
            }
        }
        None
    }

    /// Empty the mailbox and copy the line it names.
    fn take_published(&self, dst: &mut LineBuffer) -> Option<Source> {
        critical_section::with(|cs| {
            let source = self.mailbox.borrow(cs).take()?;
            self.receiver(source).copy_locked(cs, dst);
            Some(source)
        })
    }

    /// Receiver for `source`.
    pub fn receiver(&self, source: Source) -> &LineReceiver {
        match source {
            Source::Console => &self.console_rx,
            Source::Link => &self.link_rx,
        }
    }

    /// The hand-off signal.
    pub fn signal(&self) -> &S {
        &self.signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::signal::SpinSignal;

    fn feed_str(state: &ConsoleState<SpinSignal>, s: &str) {
        for b in s.bytes() {
            state.feed_byte(b);
        }
    }

    #[test]
    fn test_roles_swap_on_completion() {
        let rx = LineReceiver::console();
        for b in b"ab" {
            rx.feed_byte(*b);
        }
        assert_eq!(rx.feed_byte(b'\r'), RxEvent::Completed { len: 2, forced: false });

        critical_section::with(|cs| {
            let st = rx.state.borrow_ref(cs);
            assert_eq!(st.active, 1);
            assert_eq!(st.ready().as_bytes_with_nul(), b"ab\0");
        });
    }

    #[test]
    fn test_link_keeps_line_feed() {
        let rx = LineReceiver::link();
        assert_eq!(rx.feed_byte(b'\n'), RxEvent::Stored);
        assert_eq!(rx.pending_len(), 1);
    }

    #[test]
    fn test_latest_source_wins() {
        let state = ConsoleState::new(SpinSignal::new());
        feed_str(&state, "first\r");
        for b in b"second\r" {
            state.feed_link_byte(*b);
        }

        let mut line = LineBuffer::new();
        assert_eq!(state.try_take_line(&mut line), Some(Source::Link));
        assert_eq!(line.as_str(), "second");
        assert_eq!(state.try_take_line(&mut line), None);
    }

    #[test]
    fn test_stale_token_is_skipped() {
        let state = ConsoleState::new(SpinSignal::new());
        feed_str(&state, "once\r");

        let mut line = LineBuffer::new();
        assert_eq!(state.try_take_line(&mut line), Some(Source::Console));

        // token without a published line
        state.signal().release();
        assert_eq!(state.try_take_line(&mut line), None);
        assert!(!state.signal().try_acquire());
    }
}
