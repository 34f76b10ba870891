//! Log output.
//!
//! Drains the log streams into a text sink. Runs on the console side
//! (never in interrupt context), so blocking writes are fine here.
//!
//! ```text
//! RX_LOG_STREAM ──┐
//!                 ├──▶ drain_into() ──▶ UART / stdout
//! CONSOLE_LOG_STREAM ┘
//! ```

use core::fmt::Write;

use crate::logging::{LogEntry, LogStream};

/// Write one entry.
///
/// Format: `[timestamp_us] LEVEL TAG: message\r\n`
pub fn write_entry(entry: &LogEntry, out: &mut dyn Write) -> core::fmt::Result {
    write!(
        out,
        "[{:10}] {} {}: {}\r\n",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.tag,
        entry.text()
    )
}

/// Drain every stream in order, then report drops once.
///
/// Streams earlier in the slice have priority. Returns the number of
/// entries written.
pub fn drain_into<const N: usize>(streams: &[&LogStream<N>], out: &mut dyn Write) -> usize {
    let mut written = 0;

    for stream in streams {
        while let Some(entry) = stream.drain() {
            let _ = write_entry(&entry, out);
            written += 1;
        }
    }

    let dropped: u32 = streams.iter().map(|s| s.dropped()).sum();
    if dropped > 0 {
        let _ = write!(out, "[WARN] Dropped: {} log entries\r\n", dropped);
        for stream in streams {
            stream.reset_dropped();
        }
    }

    written
}

/// Drain both global streams, receive side first.
pub fn drain_globals(out: &mut dyn Write) -> usize {
    drain_into(
        &[&crate::RX_LOG_STREAM, &crate::CONSOLE_LOG_STREAM],
        out,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    #[test]
    fn test_write_entry_format() {
        let stream = LogStream::<4>::new();
        stream.push(1234567, LogLevel::Info, "CMD", b"Hello world");
        let entry = stream.drain().unwrap();

        let mut out = String::new();
        write_entry(&entry, &mut out).unwrap();

        assert!(out.contains("1234567"));
        assert!(out.contains("INFO CMD: Hello world"));
        assert!(out.ends_with("\r\n"));
    }

    #[test]
    fn test_drain_order_and_count() {
        let rx = LogStream::<4>::new();
        let console = LogStream::<4>::new();
        console.push(2, LogLevel::Debug, "CMD", b"second");
        rx.push(1, LogLevel::Warn, "RX", b"first");

        let mut out = String::new();
        let n = drain_into(&[&rx, &console], &mut out);

        assert_eq!(n, 2);
        let first = out.find("first").unwrap();
        let second = out.find("second").unwrap();
        assert!(first < second, "receive side drains first");
    }

    #[test]
    fn test_drops_reported_once() {
        let rx = LogStream::<2>::new();
        for _ in 0..3 {
            rx.push(0, LogLevel::Warn, "RX", b"x");
        }

        let mut out = String::new();
        drain_into(&[&rx], &mut out);
        assert!(out.contains("Dropped: 1"));
        assert_eq!(rx.dropped(), 0);

        let mut again = String::new();
        drain_into(&[&rx], &mut again);
        assert!(again.is_empty());
    }
}
