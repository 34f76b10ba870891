//! Interrupt-safe logging for CellConsole.
//!
//! # Architecture
//!
//! ```text
//! RX interrupt           LogStream            Console thread
//! ────────────           ─────────            ──────────────
//!
//! rt_warn!() ──────────▶ [L0][L1][L2] ──────▶ log_drain → sink
//! non-blocking            fixed ring          blocking ok
//! ```
//!
//! # Rules
//!
//! - The receive path never calls a blocking print
//! - Console output and log output never share a lock
//! - Log messages may be dropped if the ring is full; drops are counted

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 96;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 64;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    /// Convert to string for output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Timestamp in microseconds.
    pub timestamp_us: i64,
    /// Log level.
    pub level: LogLevel,
    /// Short module tag ("RX", "CMD", ...).
    pub tag: &'static str,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        tag: "",
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text.
    pub fn text(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Non-blocking log stream.
///
/// - Producers are serialized by a critical section
/// - Push never blocks (drops message if full)
/// - A single consumer drains at leisure
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: Producers are serialized by a critical section, the single
// consumer only reads slots below write_idx.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Create a new empty log stream.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push a log entry (never blocks).
    ///
    /// Returns `true` if message was queued, `false` if dropped (ring full).
    ///
    /// Producers are serialized by a short critical section, so the
    /// receive interrupts of both UARTs may log concurrently.
    #[inline]
    pub fn push(&self, timestamp_us: i64, level: LogLevel, tag: &'static str, msg: &[u8]) -> bool {
        critical_section::with(|_| {
            let write = self.write_idx.load(Ordering::Relaxed);
            let read = self.read_idx.load(Ordering::Acquire);

            if write.wrapping_sub(read) >= N as u32 {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }

            let idx = (write as usize) & Self::MASK;

            // SAFETY: Producers are serialized by the critical section and the
            // consumer never reads at or past write_idx.
            unsafe {
                let entry = &mut (*self.entries.get())[idx];
                entry.timestamp_us = timestamp_us;
                entry.level = level;
                entry.tag = tag;
                entry.len = msg.len().min(MAX_MSG_LEN) as u8;
                entry.msg[..entry.len as usize].copy_from_slice(&msg[..entry.len as usize]);
            }

            self.write_idx.store(write.wrapping_add(1), Ordering::Release);
            true
        })
    }

    /// Drain next log entry.
    ///
    /// Returns `None` if no entries available.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;

        // SAFETY: Single consumer, slot published by write_idx
        let entry = unsafe { (*self.entries.get())[idx] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Get count of dropped messages.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Check if there are entries to drain.
    #[inline]
    pub fn has_entries(&self) -> bool {
        self.pending() != 0
    }

    /// Get number of entries waiting to be drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// Truncating `fmt::Write` over a byte slice.
pub(crate) struct BufWriter<'a> {
    pub(crate) buf: &'a mut [u8],
    pub(crate) pos: usize,
}

impl core::fmt::Write for BufWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buf.len() - self.pos;
        let to_write = bytes.len().min(remaining);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        Ok(())
    }
}

/// Current time in microseconds for log stamps.
#[cfg(target_os = "espidf")]
#[inline]
pub fn timestamp_us() -> i64 {
    // SAFETY: esp_timer_get_time is callable from any context
    unsafe { esp_idf_svc::sys::esp_timer_get_time() }
}

/// Current time in microseconds for log stamps.
#[cfg(all(not(target_os = "espidf"), feature = "std"))]
#[inline]
pub fn timestamp_us() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

/// Current time in microseconds for log stamps.
#[cfg(all(not(target_os = "espidf"), not(feature = "std")))]
#[inline]
pub fn timestamp_us() -> i64 {
    0
}

/// Interrupt-safe log macro.
///
/// # Example
///
/// ```ignore
/// rt_log!(LogLevel::Warn, RX_LOG_STREAM, "RX", "forced completion at {}", pos);
/// ```
#[macro_export]
macro_rules! rt_log {
    ($level:expr, $stream:expr, $tag:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($crate::logging::timestamp_us(), $level, $tag, &buf[..len]);
    }};
}

/// Info log.
#[macro_export]
macro_rules! rt_info {
    ($stream:expr, $tag:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Info, $stream, $tag, $($arg)*)
    };
}

/// Warning log.
#[macro_export]
macro_rules! rt_warn {
    ($stream:expr, $tag:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Warn, $stream, $tag, $($arg)*)
    };
}

/// Error log.
#[macro_export]
macro_rules! rt_error {
    ($stream:expr, $tag:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Error, $stream, $tag, $($arg)*)
    };
}

/// Debug log.
#[macro_export]
macro_rules! rt_debug {
    ($stream:expr, $tag:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Debug, $stream, $tag, $($arg)*)
    };
}

/// Trace log (maximum verbosity).
#[macro_export]
macro_rules! rt_trace {
    ($stream:expr, $tag:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Trace, $stream, $tag, $($arg)*)
    };
}
